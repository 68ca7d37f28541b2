pub mod camera;
pub mod config;
pub mod mesh;
pub mod render;
pub mod scene;
pub mod texture;
#[cfg(feature = "render-wgpu")]
pub mod ui;

/// Opens the viewer window and runs until it is closed.
#[cfg(feature = "render-wgpu")]
pub fn run(config: config::ViewerConfig) -> render::RenderResult<()> {
    use render::{WindowApp, WindowAppTrait, WindowEventLoop};

    let event_loop = WindowEventLoop::new()?;
    event_loop.run(move |target| {
        WindowApp::new(target, &config).map(|app| Box::new(app) as Box<dyn WindowAppTrait>)
    })
}
