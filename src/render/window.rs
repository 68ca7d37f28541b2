//! Desktop window rendering backend
//! Draws the bound primitive into a winit window and paints the egui panel on top

use super::{
    FrameInputs, FrameView, GpuBackend, MeshHandle, RenderError, RenderResult, RenderSubmission,
    VertexLayout,
};
use crate::camera::{CameraInput, MoveKey};
use crate::config::{ViewerConfig, WindowSettings};
use crate::mesh::Mesh;
use crate::scene::SceneController;
use crate::texture::TextureLibrary;
use crate::ui::ViewerPanel;
use image::RgbaImage;
use pollster::block_on;
use std::sync::Arc;
use std::time::Instant;
use wgpu::util::DeviceExt;
use winit::{
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_projection: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
}

/// egui output of one frame, painted after the scene pass.
pub struct UiOverlay {
    pub paint_jobs: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

impl UiOverlay {
    /// Replaces the geometry with `newer` while keeping every texture update
    /// not yet applied. egui only sends the font atlas once.
    pub fn merge(&mut self, newer: UiOverlay) {
        self.textures_delta.append(newer.textures_delta);
        self.paint_jobs = newer.paint_jobs;
        self.pixels_per_point = newer.pixels_per_point;
    }
}

struct GpuMesh {
    handle: MeshHandle,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
}

struct GeometryPipeline {
    render_pipeline: wgpu::RenderPipeline,
    vertex_layout: VertexLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

pub struct WindowBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    geometry: GeometryPipeline,
    texture_bind_group: Option<wgpu::BindGroup>,
    mesh: Option<GpuMesh>,
    next_mesh_id: u64,
    egui_renderer: egui_wgpu::Renderer,
    overlay: Option<UiOverlay>,
}

impl WindowBackend {
    pub fn initialize(settings: &WindowSettings, window: Arc<Window>) -> RenderResult<Self> {
        block_on(Self::initialize_async(settings, window))
    }

    async fn initialize_async(settings: &WindowSettings, window: Arc<Window>) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(Arc::clone(&window))
            .map_err(|_| RenderError::Backend("failed to create wgpu surface from window"))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::Backend(
                "failed to find a compatible GPU adapter for window rendering",
            ))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Viewer Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .map_err(|_| RenderError::Backend("failed to create wgpu device for window"))?;

        log::info!(
            "[render] window backend initialized (adapter: {:?})",
            adapter.get_info().name
        );

        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .ok_or(RenderError::Backend("surface reports no supported formats"))?;

        let size = window.inner_size();
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if settings.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = create_depth_view(&device, surface_config.width, surface_config.height);
        let geometry = create_geometry_pipeline(&device, format)?;
        let egui_renderer = egui_wgpu::Renderer::new(&device, format, None, 1);

        log::info!(
            "[render] window surface configured ({}x{}, format: {:?})",
            surface_config.width,
            surface_config.height,
            format
        );

        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
            surface,
            surface_config,
            depth_view,
            geometry,
            texture_bind_group: None,
            mesh: None,
            next_mesh_id: 1,
            egui_renderer,
            overlay: None,
        })
    }

    /// Applies pending egui texture uploads for a frame that is not
    /// presented. Frees stay queued until a frame is drawn.
    fn skip_frame(&mut self, inputs: &FrameInputs) -> RenderSubmission {
        if let Some(overlay) = self.overlay.as_mut() {
            for (id, image_delta) in std::mem::take(&mut overlay.textures_delta.set) {
                self.egui_renderer
                    .update_texture(&self.device, &self.queue, id, &image_delta);
            }
        }
        RenderSubmission {
            frame_index: inputs.frame_index,
        }
    }

    fn paint_overlay(
        &mut self,
        overlay: &UiOverlay,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, image_delta) in &overlay.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.surface_config.width, self.surface_config.height],
            pixels_per_point: overlay.pixels_per_point,
        };
        let command_buffers = self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            encoder,
            &overlay.paint_jobs,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Viewer UI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui_renderer
                .render(&mut render_pass, &overlay.paint_jobs, &screen_descriptor);
        }

        command_buffers
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Viewer Depth Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    depth_texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn vertex_format(components: u32) -> RenderResult<wgpu::VertexFormat> {
    match components {
        1 => Ok(wgpu::VertexFormat::Float32),
        2 => Ok(wgpu::VertexFormat::Float32x2),
        3 => Ok(wgpu::VertexFormat::Float32x3),
        4 => Ok(wgpu::VertexFormat::Float32x4),
        _ => Err(RenderError::Backend("unsupported vertex attribute width")),
    }
}

fn wgpu_attributes(layout: &VertexLayout) -> RenderResult<Vec<wgpu::VertexAttribute>> {
    layout
        .attributes
        .iter()
        .map(|attribute| {
            Ok(wgpu::VertexAttribute {
                offset: attribute.offset,
                shader_location: attribute.slot,
                format: vertex_format(attribute.components)?,
            })
        })
        .collect()
}

fn create_geometry_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
) -> RenderResult<GeometryPipeline> {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Viewer Textured Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/textured.wgsl").into()),
    });

    let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Viewer Uniform Buffer"),
        size: std::mem::size_of::<Uniforms>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let uniform_bind_group_layout =
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Viewer Uniform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

    let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Viewer Uniform Bind Group"),
        layout: &uniform_bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });

    let texture_bind_group_layout =
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Viewer Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Viewer Texture Sampler"),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Viewer Geometry Pipeline Layout"),
        bind_group_layouts: &[&uniform_bind_group_layout, &texture_bind_group_layout],
        push_constant_ranges: &[],
    });

    let vertex_layout = VertexLayout::for_vertex();
    let attributes = wgpu_attributes(&vertex_layout)?;

    let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Viewer Geometry Render Pipeline"),
        layout: Some(&render_pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: vertex_layout.stride,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &attributes,
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // generated strips mix windings, draw both sides
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    });

    Ok(GeometryPipeline {
        render_pipeline,
        vertex_layout,
        uniform_buffer,
        uniform_bind_group,
        texture_bind_group_layout,
        sampler,
    })
}

impl GpuBackend for WindowBackend {
    fn label(&self) -> &'static str {
        "Window Backend (Desktop)"
    }

    fn viewport(&self) -> [u32; 2] {
        [self.surface_config.width, self.surface_config.height]
    }

    fn resize(&mut self, size: [u32; 2]) {
        self.surface_config.width = size[0].max(1);
        self.surface_config.height = size[1].max(1);
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(
            &self.device,
            self.surface_config.width,
            self.surface_config.height,
        );
        log::debug!("[render] window resized to {}x{}", size[0], size[1]);
    }

    fn upload_mesh(&mut self, mesh: &Mesh, layout: &VertexLayout) -> RenderResult<MeshHandle> {
        if *layout != self.geometry.vertex_layout {
            return Err(RenderError::Backend(
                "mesh vertex layout does not match the geometry pipeline",
            ));
        }

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Viewer Vertex Buffer"),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Viewer Index Buffer"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        if let Some(err) = block_on(self.device.pop_error_scope()) {
            return Err(RenderError::GpuResource(err.to_string()));
        }

        let handle = MeshHandle {
            id: self.next_mesh_id,
            vertex_count: mesh.vertex_count() as u32,
            index_count: mesh.indices.len() as u32,
        };
        self.next_mesh_id += 1;

        // previous buffers are released on drop
        self.mesh = Some(GpuMesh {
            handle,
            vertex_buffer,
            index_buffer,
        });
        Ok(handle)
    }

    fn upload_texture(&mut self, image: &RgbaImage) -> RenderResult<()> {
        let (width, height) = image.dimensions();
        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Viewer Albedo Texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        if let Some(err) = block_on(self.device.pop_error_scope()) {
            return Err(RenderError::GpuResource(err.to_string()));
        }

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            extent,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.texture_bind_group = Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Viewer Texture Bind Group"),
            layout: &self.geometry.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.geometry.sampler),
                },
            ],
        }));
        Ok(())
    }

    fn queue_overlay(&mut self, overlay: UiOverlay) {
        match self.overlay.as_mut() {
            Some(pending) => pending.merge(overlay),
            None => self.overlay = Some(overlay),
        }
    }

    fn render_frame(
        &mut self,
        inputs: &FrameInputs,
        view: &FrameView,
    ) -> RenderResult<RenderSubmission> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("[render] surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(self.skip_frame(inputs));
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(RenderError::GpuResource(
                    "out of memory acquiring swapchain texture".to_string(),
                ));
            }
            Err(err) => {
                log::warn!("[render] skipping frame {}: {err}", inputs.frame_index);
                return Ok(self.skip_frame(inputs));
            }
        };

        let target = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Viewer Frame Encoder"),
            });

        let uniforms = Uniforms {
            view_projection: view.view_projection,
            model: view.model,
        };
        self.queue.write_buffer(
            &self.geometry.uniform_buffer,
            0,
            bytemuck::cast_slice(&[uniforms]),
        );

        let [r, g, b, a] = view.clear_color.map(f64::from);
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Viewer Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let bound = self
                .mesh
                .as_ref()
                .filter(|mesh| Some(mesh.handle) == view.mesh);
            if let (Some(mesh), Some(texture_bind_group)) = (bound, &self.texture_bind_group) {
                render_pass.set_pipeline(&self.geometry.render_pipeline);
                render_pass.set_bind_group(0, &self.geometry.uniform_bind_group, &[]);
                render_pass.set_bind_group(1, texture_bind_group, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass
                    .set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.handle.index_count, 0, 0..1);
            }
        }

        let overlay = self.overlay.take();
        let ui_buffers = match &overlay {
            Some(overlay) => self.paint_overlay(overlay, &mut encoder, &target),
            None => Vec::new(),
        };

        self.queue
            .submit(ui_buffers.into_iter().chain(std::iter::once(encoder.finish())));
        frame.present();

        if let Some(overlay) = overlay {
            for id in &overlay.textures_delta.free {
                self.egui_renderer.free_texture(id);
            }
        }

        Ok(RenderSubmission {
            frame_index: inputs.frame_index,
        })
    }
}

/// Event loop wrapper for desktop window rendering
pub struct WindowEventLoop {
    event_loop: EventLoop<()>,
}

impl WindowEventLoop {
    pub fn new() -> RenderResult<Self> {
        let event_loop =
            EventLoop::new().map_err(|_| RenderError::Backend("failed to create event loop"))?;
        Ok(Self { event_loop })
    }

    pub fn run<F>(self, mut app_factory: F) -> RenderResult<()>
    where
        F: FnMut(&EventLoopWindowTarget<()>) -> RenderResult<Box<dyn WindowAppTrait>> + 'static,
    {
        use winit::event::{Event, StartCause};

        let mut app: Option<Box<dyn WindowAppTrait>> = None;

        self.event_loop
            .run(move |event, event_loop_target| match event {
                Event::NewEvents(StartCause::Init) => match app_factory(event_loop_target) {
                    Ok(new_app) => {
                        log::info!("[render] window application initialized");
                        app = Some(new_app);
                    }
                    Err(err) => {
                        log::error!("[render] failed to initialize window app: {err}");
                        event_loop_target.exit();
                    }
                },
                Event::WindowEvent { window_id, event } => {
                    if let Some(app) = app.as_mut() {
                        app.handle_window_event(event_loop_target, window_id, event);
                    }
                }
                Event::AboutToWait => {
                    if let Some(app) = app.as_mut() {
                        app.request_redraw();
                    }
                }
                _ => {}
            })
            .map_err(|_| RenderError::Backend("event loop terminated with error"))?;

        Ok(())
    }
}

/// Trait for window application implementations
pub trait WindowAppTrait {
    fn handle_window_event(
        &mut self,
        event_loop: &EventLoopWindowTarget<()>,
        window_id: WindowId,
        event: WindowEvent,
    );
    fn request_redraw(&self);
    fn render_frame(&mut self) -> RenderResult<()>;
}

/// Viewer application: window, renderer, scene and UI panel
pub struct WindowApp {
    window: Arc<Window>,
    renderer: super::Renderer,
    scene: SceneController,
    panel: ViewerPanel,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    cursor: [f32; 2],
    last_frame: Instant,
}

impl WindowApp {
    pub fn new(event_loop: &EventLoopWindowTarget<()>, config: &ViewerConfig) -> RenderResult<Self> {
        use winit::dpi::LogicalSize;

        let settings = &config.window;
        let window = winit::window::WindowBuilder::new()
            .with_title(settings.title.clone())
            .with_inner_size(LogicalSize::new(settings.width, settings.height))
            .with_resizable(settings.resizable)
            .build(event_loop)
            .map_err(|_| RenderError::Backend("failed to create window"))?;
        let window = Arc::new(window);

        let backend = WindowBackend::initialize(settings, Arc::clone(&window))?;
        let renderer = super::Renderer::new(
            Box::new(backend),
            TextureLibrary::new(config.asset_dir.clone()),
        );

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &*window,
            Some(window.scale_factor() as f32),
            None,
        );

        Ok(Self {
            window,
            renderer,
            scene: SceneController::new(config),
            panel: ViewerPanel::new(),
            egui_ctx,
            egui_state,
            cursor: [0.0, 0.0],
            last_frame: Instant::now(),
        })
    }

    fn handle_camera_event(&mut self, event: &WindowEvent, ui_consumed: bool) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = [position.x as f32, position.y as f32];
                self.scene.handle_camera_input(CameraInput::CursorMoved {
                    x: self.cursor[0],
                    y: self.cursor[1],
                });
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Right,
                ..
            } => match state {
                ElementState::Pressed if !ui_consumed => {
                    self.scene.handle_camera_input(CameraInput::DragStart {
                        x: self.cursor[0],
                        y: self.cursor[1],
                    });
                }
                ElementState::Released => self.scene.handle_camera_input(CameraInput::DragEnd),
                _ => {}
            },
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let Some(key) = move_key(code) else {
                    return;
                };
                let pressed = event.state == ElementState::Pressed;
                if pressed && ui_consumed {
                    return;
                }
                self.scene
                    .handle_camera_input(CameraInput::Key { key, pressed });
            }
            _ => {}
        }
    }
}

fn move_key(code: KeyCode) -> Option<MoveKey> {
    match code {
        KeyCode::KeyW => Some(MoveKey::Forward),
        KeyCode::KeyS => Some(MoveKey::Backward),
        KeyCode::KeyA => Some(MoveKey::Left),
        KeyCode::KeyD => Some(MoveKey::Right),
        KeyCode::KeyE => Some(MoveKey::Up),
        KeyCode::KeyQ => Some(MoveKey::Down),
        _ => None,
    }
}

impl WindowAppTrait for WindowApp {
    fn handle_window_event(
        &mut self,
        event_loop: &EventLoopWindowTarget<()>,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let response = self.egui_state.on_window_event(&self.window, &event);
        self.handle_camera_event(&event, response.consumed);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("[render] window close requested");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. }
                if !response.consumed
                    && event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                log::info!("[render] escape pressed, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.renderer
                    .backend_mut()
                    .resize([size.width, size.height]);
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.render_frame() {
                    log::error!("[render] redraw failed: {err}");
                }
            }
            _ => {}
        }
    }

    fn request_redraw(&self) {
        self.window.request_redraw();
    }

    fn render_frame(&mut self) -> RenderResult<()> {
        let now = Instant::now();
        let delta_seconds = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let stats = self.renderer.mesh_stats();
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.panel.show(ctx, &mut self.scene, stats);
        });
        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        let paint_jobs = self.egui_ctx.tessellate(full_output.shapes, pixels_per_point);
        self.renderer.backend_mut().queue_overlay(UiOverlay {
            paint_jobs,
            textures_delta: full_output.textures_delta,
            pixels_per_point,
        });

        self.renderer.render(delta_seconds, &mut self.scene)
    }
}
