//! Physics sandbox
//!
//! Usage: `physics-sandbox <model.gltf> [config.ron|config.json]`

use physics_sandbox::prelude::*;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let Some(app) = create_application(&args) else {
        eprintln!("Usage: physics-sandbox <model.gltf> [config.ron|config.json]");
        std::process::exit(1);
    };

    let config = EngineConfig::default()
        .with_title("Physics Sandbox")
        .with_size(1280, 720)
        .with_vsync(true);

    if let Err(e) = Engine::new(config, app).run() {
        eprintln!("Engine error: {}", e);
    }
}
