//! Primitive viewer window.
//! Run with: cargo run --bin viewer --features render-wgpu -- [config.json]

#[cfg(feature = "render-wgpu")]
fn main() {
    env_logger::init();

    if let Err(err) = run() {
        eprintln!("[viewer] error: {err}");
        std::process::exit(1);
    }
}

#[cfg(feature = "render-wgpu")]
fn run() -> Result<(), Box<dyn std::error::Error>> {
    use primitive_viewer::config::ViewerConfig;
    use std::path::PathBuf;

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = ViewerConfig::load_or_default(config_path.as_deref())?;
    log::info!(
        "[viewer] starting with {} / {}",
        config.shape.label(),
        config.texture.label()
    );

    println!("Right-drag to look around, WASD/QE to move, ESC to exit");
    primitive_viewer::run(config)?;
    Ok(())
}

#[cfg(not(feature = "render-wgpu"))]
fn main() {
    eprintln!("The viewer requires the 'render-wgpu' feature.");
    eprintln!("Run with: cargo run --bin viewer --features render-wgpu");
    std::process::exit(1);
}
