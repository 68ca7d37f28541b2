#[cfg(feature = "render-wgpu")]
pub mod window;

#[cfg(feature = "render-wgpu")]
pub use window::{UiOverlay, WindowApp, WindowAppTrait, WindowBackend, WindowEventLoop};

use crate::mesh::{Mesh, MeshError, MeshStats, Vertex};
use crate::scene::{MeshSlot, SceneController};
use crate::texture::{TextureError, TextureLibrary};
use image::RgbaImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("gpu resource allocation failed: {0}")]
    GpuResource(String),
    #[error("renderer expected frame {expected} but backend produced {got}")]
    FrameOutOfOrder { expected: u64, got: u64 },
    #[error("gpu backend failure: {0}")]
    Backend(&'static str),
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    Texture(#[from] TextureError),
}

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub slot: u32,
    pub components: u32,
    /// Byte offset inside one vertex record.
    pub offset: u64,
}

/// Float attribute layout of an interleaved vertex buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    pub stride: u64,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    pub fn new(stride: u64) -> Self {
        Self {
            stride,
            attributes: Vec::new(),
        }
    }

    pub fn describe_attribute(mut self, slot: u32, components: u32, offset: u64) -> Self {
        self.attributes.push(VertexAttribute {
            slot,
            components,
            offset,
        });
        self
    }

    /// Position in slot 0, UV in slot 1.
    pub fn for_vertex() -> Self {
        let float = std::mem::size_of::<f32>() as u64;
        Self::new(std::mem::size_of::<Vertex>() as u64)
            .describe_attribute(0, 3, 0)
            .describe_attribute(1, 2, 3 * float)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshHandle {
    pub id: u64,
    pub vertex_count: u32,
    pub index_count: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct FrameInputs {
    pub frame_index: u64,
    pub delta_seconds: f32,
}

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameView {
    pub view_projection: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub clear_color: [f32; 4],
    pub mesh: Option<MeshHandle>,
}

#[derive(Debug)]
pub struct RenderSubmission {
    pub frame_index: u64,
}

pub trait GpuBackend {
    fn label(&self) -> &'static str;

    /// Drawable size in pixels.
    fn viewport(&self) -> [u32; 2];

    fn resize(&mut self, _size: [u32; 2]) {}

    /// Uploads vertex and index buffers, replacing the previously bound mesh.
    fn upload_mesh(&mut self, mesh: &Mesh, layout: &VertexLayout) -> RenderResult<MeshHandle>;

    fn upload_texture(&mut self, image: &RgbaImage) -> RenderResult<()>;

    /// UI geometry painted over the next frame. Headless backends drop it.
    #[cfg(feature = "render-wgpu")]
    fn queue_overlay(&mut self, _overlay: window::UiOverlay) {}

    fn render_frame(
        &mut self,
        inputs: &FrameInputs,
        view: &FrameView,
    ) -> RenderResult<RenderSubmission>;
}

pub fn aspect_ratio(viewport: [u32; 2]) -> f32 {
    viewport[0].max(1) as f32 / viewport[1].max(1) as f32
}

/// Drives one backend frame by frame: keeps the bound mesh and texture in
/// sync with the scene, then submits the draw.
pub struct Renderer {
    backend: Box<dyn GpuBackend>,
    textures: TextureLibrary,
    mesh_slot: MeshSlot,
    frame_index: u64,
}

impl Renderer {
    pub fn new(backend: Box<dyn GpuBackend>, textures: TextureLibrary) -> Self {
        Self {
            backend,
            textures,
            mesh_slot: MeshSlot::new(),
            frame_index: 0,
        }
    }

    pub fn render(&mut self, delta_seconds: f32, scene: &mut SceneController) -> RenderResult<()> {
        let next_index = self.frame_index + 1;

        scene.advance(delta_seconds);
        self.mesh_slot
            .sync(&scene.shape_parameters(), self.backend.as_mut())?;

        if let Some(kind) = scene.take_texture_change() {
            let image = self.textures.load(kind);
            if let Err(err) = self.backend.upload_texture(&image) {
                scene.invalidate_texture();
                return Err(err);
            }
        }

        let inputs = FrameInputs {
            frame_index: next_index,
            delta_seconds,
        };
        let view = scene.frame_view(
            aspect_ratio(self.backend.viewport()),
            self.mesh_slot.handle(),
        );

        let submission = self.backend.render_frame(&inputs, &view)?;
        if submission.frame_index != next_index {
            return Err(RenderError::FrameOutOfOrder {
                expected: next_index,
                got: submission.frame_index,
            });
        }

        self.frame_index = next_index;
        Ok(())
    }

    pub fn backend_label(&self) -> &'static str {
        self.backend.label()
    }

    pub fn backend(&self) -> &dyn GpuBackend {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> &mut dyn GpuBackend {
        self.backend.as_mut()
    }

    pub fn mesh_stats(&self) -> MeshStats {
        self.mesh_slot.stats()
    }

    pub fn mesh_slot(&self) -> &MeshSlot {
        &self.mesh_slot
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

/// Backend without a device. Hands out mesh ids and counts uploads.
#[derive(Debug)]
pub struct NullGpuBackend {
    viewport: [u32; 2],
    next_mesh_id: u64,
    mesh_uploads: u64,
    texture_uploads: u64,
    failing_uploads: u32,
    failing_texture_uploads: u32,
}

impl NullGpuBackend {
    pub fn new(viewport: [u32; 2]) -> Self {
        Self {
            viewport,
            next_mesh_id: 1,
            mesh_uploads: 0,
            texture_uploads: 0,
            failing_uploads: 0,
            failing_texture_uploads: 0,
        }
    }

    /// Makes the next `count` mesh uploads fail with `GpuResource`.
    pub fn fail_next_uploads(&mut self, count: u32) {
        self.failing_uploads = count;
    }

    /// Makes the next `count` texture uploads fail with `GpuResource`.
    pub fn fail_next_texture_uploads(&mut self, count: u32) {
        self.failing_texture_uploads = count;
    }

    pub fn mesh_uploads(&self) -> u64 {
        self.mesh_uploads
    }

    pub fn texture_uploads(&self) -> u64 {
        self.texture_uploads
    }
}

impl Default for NullGpuBackend {
    fn default() -> Self {
        Self::new([1280, 720])
    }
}

impl GpuBackend for NullGpuBackend {
    fn label(&self) -> &'static str {
        "Null GPU Backend"
    }

    fn viewport(&self) -> [u32; 2] {
        self.viewport
    }

    fn resize(&mut self, size: [u32; 2]) {
        self.viewport = size;
    }

    fn upload_mesh(&mut self, mesh: &Mesh, _layout: &VertexLayout) -> RenderResult<MeshHandle> {
        if self.failing_uploads > 0 {
            self.failing_uploads -= 1;
            return Err(RenderError::GpuResource(format!(
                "simulated failure for {} vertices",
                mesh.vertex_count()
            )));
        }

        let handle = MeshHandle {
            id: self.next_mesh_id,
            vertex_count: mesh.vertex_count() as u32,
            index_count: mesh.indices.len() as u32,
        };
        self.next_mesh_id += 1;
        self.mesh_uploads += 1;
        Ok(handle)
    }

    fn upload_texture(&mut self, image: &RgbaImage) -> RenderResult<()> {
        if self.failing_texture_uploads > 0 {
            self.failing_texture_uploads -= 1;
            let (width, height) = image.dimensions();
            return Err(RenderError::GpuResource(format!(
                "simulated failure for {width}x{height} texture"
            )));
        }
        self.texture_uploads += 1;
        Ok(())
    }

    fn render_frame(
        &mut self,
        inputs: &FrameInputs,
        view: &FrameView,
    ) -> RenderResult<RenderSubmission> {
        log::trace!(
            "[render] frame {} (Δ {:.3} s) - mesh {:?}",
            inputs.frame_index,
            inputs.delta_seconds,
            view.mesh.map(|mesh| mesh.id)
        );

        Ok(RenderSubmission {
            frame_index: inputs.frame_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::ShapeKind;
    use std::sync::{Arc, Mutex};

    fn null_renderer() -> Renderer {
        let dir = std::env::temp_dir().join("primitive-viewer-missing-assets");
        Renderer::new(
            Box::new(NullGpuBackend::default()),
            TextureLibrary::new(dir),
        )
    }

    #[test]
    fn vertex_layout_matches_vertex_record() {
        let layout = VertexLayout::for_vertex();
        assert_eq!(layout.stride, 20);
        assert_eq!(
            layout.attributes,
            vec![
                VertexAttribute {
                    slot: 0,
                    components: 3,
                    offset: 0
                },
                VertexAttribute {
                    slot: 1,
                    components: 2,
                    offset: 12
                },
            ]
        );
    }

    #[test]
    fn null_pipeline_advances_frame_index() {
        let mut renderer = null_renderer();
        let mut scene = SceneController::default();

        renderer
            .render(0.016, &mut scene)
            .expect("null pipeline should not fail");
        assert_eq!(renderer.frame_index(), 1);
        assert_eq!(renderer.mesh_stats().triangles, 12);
    }

    #[test]
    fn mesh_is_regenerated_only_on_change() {
        let mut renderer = null_renderer();
        let mut scene = SceneController::default();

        for _ in 0..5 {
            renderer.render(0.016, &mut scene).expect("frame");
        }
        assert_eq!(renderer.mesh_slot().upload_count(), 1);

        scene.select_shape(ShapeKind::Torus);
        renderer.render(0.016, &mut scene).expect("frame");
        renderer.render(0.016, &mut scene).expect("frame");
        assert_eq!(renderer.mesh_slot().upload_count(), 2);
        assert_eq!(renderer.mesh_stats().vertices, 25);
    }

    struct TestBackend {
        forced_frame_index: Option<u64>,
        log: Option<Arc<Mutex<Vec<(FrameInputs, FrameView)>>>>,
        textures: Arc<Mutex<u32>>,
    }

    impl TestBackend {
        fn new() -> Self {
            Self {
                forced_frame_index: None,
                log: None,
                textures: Arc::new(Mutex::new(0)),
            }
        }

        fn with_forced_index(mut self, frame_index: u64) -> Self {
            self.forced_frame_index = Some(frame_index);
            self
        }

        fn with_log(mut self, log: Arc<Mutex<Vec<(FrameInputs, FrameView)>>>) -> Self {
            self.log = Some(log);
            self
        }
    }

    impl GpuBackend for TestBackend {
        fn label(&self) -> &'static str {
            "Test Backend"
        }

        fn viewport(&self) -> [u32; 2] {
            [800, 600]
        }

        fn upload_mesh(&mut self, mesh: &Mesh, _layout: &VertexLayout) -> RenderResult<MeshHandle> {
            Ok(MeshHandle {
                id: 1,
                vertex_count: mesh.vertex_count() as u32,
                index_count: mesh.indices.len() as u32,
            })
        }

        fn upload_texture(&mut self, _image: &RgbaImage) -> RenderResult<()> {
            *self.textures.lock().unwrap() += 1;
            Ok(())
        }

        fn render_frame(
            &mut self,
            inputs: &FrameInputs,
            view: &FrameView,
        ) -> RenderResult<RenderSubmission> {
            if let Some(log) = &self.log {
                log.lock().unwrap().push((*inputs, *view));
            }

            Ok(RenderSubmission {
                frame_index: self.forced_frame_index.unwrap_or(inputs.frame_index),
            })
        }
    }

    #[test]
    fn renderer_detects_out_of_order_frames() {
        let backend = TestBackend::new().with_forced_index(0);
        let mut renderer = Renderer::new(Box::new(backend), TextureLibrary::default());
        let mut scene = SceneController::default();

        let err = renderer
            .render(0.016, &mut scene)
            .expect_err("should detect out-of-order frames");
        match err {
            RenderError::FrameOutOfOrder { expected, got } => {
                assert_eq!(expected, 1);
                assert_eq!(got, 0);
            }
            other => panic!("unexpected render error: {other}"),
        }
    }

    #[test]
    fn backend_receives_bound_mesh_and_model_matrix() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let backend = TestBackend::new().with_log(log.clone());
        let mut renderer = Renderer::new(Box::new(backend), TextureLibrary::default());
        let mut scene = SceneController::default();
        scene.transform.animate = true;
        scene.transform.rotation_speed = glam::Vec3::new(0.0, 90.0, 0.0);

        renderer.render(0.25, &mut scene).expect("first frame OK");
        scene.select_shape(ShapeKind::Torus);
        renderer.render(0.5, &mut scene).expect("second frame OK");

        let records = log.lock().unwrap().clone();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0.frame_index, 1);
        assert_eq!(records[0].0.delta_seconds, 0.25);
        assert_eq!(records[0].1.mesh.map(|mesh| mesh.index_count), Some(36));
        assert_eq!(records[1].0.frame_index, 2);
        assert_eq!(records[1].1.mesh.map(|mesh| mesh.index_count), Some(6 * 16));

        // 90 deg/s for 0.25 s then 0.5 s
        let first = glam::Mat4::from_rotation_y(22.5f32.to_radians());
        let second = glam::Mat4::from_rotation_y(67.5f32.to_radians());
        let model = |index: usize| glam::Mat4::from_cols_array_2d(&records[index].1.model);
        assert!(model(0).abs_diff_eq(first, 1e-5));
        assert!(model(1).abs_diff_eq(second, 1e-5));
        assert_eq!(records[1].1.clear_color, scene.clear_color());
    }

    #[test]
    fn failed_texture_upload_is_retried_next_frame() {
        let mut backend = NullGpuBackend::default();
        backend.fail_next_texture_uploads(1);
        let mut renderer = Renderer::new(
            Box::new(backend),
            TextureLibrary::new(std::env::temp_dir().join("primitive-viewer-missing-assets")),
        );
        let mut scene = SceneController::default();

        let err = renderer
            .render(0.016, &mut scene)
            .expect_err("texture allocation failure surfaces");
        assert!(matches!(err, RenderError::GpuResource(_)));
        assert_eq!(renderer.frame_index(), 0);

        renderer.render(0.016, &mut scene).expect("retry succeeds");
        assert_eq!(renderer.frame_index(), 1);
        assert_eq!(scene.take_texture_change(), None);
    }

    #[test]
    fn texture_is_uploaded_once_per_selection() {
        let backend = TestBackend::new();
        let uploads = backend.textures.clone();
        let mut renderer = Renderer::new(Box::new(backend), TextureLibrary::default());
        let mut scene = SceneController::default();

        renderer.render(0.016, &mut scene).expect("frame");
        renderer.render(0.016, &mut scene).expect("frame");
        assert_eq!(*uploads.lock().unwrap(), 1);

        scene.select_texture(crate::texture::TextureKind::Earth);
        renderer.render(0.016, &mut scene).expect("frame");
        assert_eq!(*uploads.lock().unwrap(), 2);
    }
}
