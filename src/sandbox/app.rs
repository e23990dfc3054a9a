//! Windowed application around [`Sandbox`]

use std::path::Path;

use winit::keyboard::KeyCode;

use super::controller::Sandbox;
use crate::assets::{AssetError, load_gltf};
use crate::core::{ConfigError, EngineContext, EngineEvent, Game, SandboxConfig};
use crate::physics::PhysicsError;

/// The sandbox as an engine [`Game`]
pub struct SandboxApp {
    sandbox: Sandbox,
}

impl SandboxApp {
    /// Load the config (if given) and the model, then build the sandbox
    ///
    /// # Errors
    ///
    /// Returns an error if the config or model cannot be loaded or the
    /// sandbox cannot be built
    pub fn new(model_path: impl AsRef<Path>, config_path: Option<&Path>) -> Result<Self, SandboxError> {
        let config = match config_path {
            Some(path) => SandboxConfig::load(path)?,
            None => SandboxConfig::default(),
        };
        let model = load_gltf(model_path)?;
        let mut sandbox = Sandbox::new(config)?;
        sandbox.set_imported_model(model);
        Ok(Self { sandbox })
    }
}

impl Game for SandboxApp {
    fn init(&mut self, ctx: &mut EngineContext) {
        let clear = self.sandbox.config().lighting.clear_color;
        if let Some(renderer) = ctx.renderer_mut() {
            renderer.clear_color = wgpu::Color {
                r: f64::from(clear.x),
                g: f64::from(clear.y),
                b: f64::from(clear.z),
                a: 1.0,
            };
        }
        self.sandbox.handle_event(&EngineEvent::Resized {
            width: ctx.width(),
            height: ctx.height(),
        });
    }

    fn update(&mut self, ctx: &mut EngineContext) {
        if ctx.input.is_key_just_pressed(KeyCode::Escape) {
            ctx.quit();
            return;
        }

        for event in ctx.events.drain() {
            self.sandbox.handle_event(&event);
        }
        self.sandbox.update(ctx.time.delta_seconds(), &ctx.input);
    }

    fn render(&mut self, ctx: &mut EngineContext) {
        let Some(renderer) = ctx.renderer_mut() else {
            return;
        };
        renderer.update_camera(self.sandbox.camera());
        renderer.set_lighting(self.sandbox.lighting());
        renderer.render(self.sandbox.visible());
    }

    fn shutdown(&mut self, _ctx: &mut EngineContext) {
        log::info!(
            "Shutting down with {} bodies",
            self.sandbox.physics().body_count()
        );
    }
}

/// Build the application from command-line arguments.
///
/// `args[1]` is the model to import and `args[2]` an optional config file.
/// Any failure is logged and turned into `None`.
pub fn create_application(args: &[String]) -> Option<SandboxApp> {
    let Some(model_path) = args.get(1) else {
        log::error!("{}", SandboxError::MissingArgument("model path"));
        return None;
    };
    let config_path = args.get(2).map(Path::new);

    match SandboxApp::new(model_path, config_path) {
        Ok(app) => {
            log::info!("Loaded sandbox with model {model_path}");
            Some(app)
        }
        Err(e) => {
            log::error!("Failed to create application: {e}");
            None
        }
    }
}

/// Errors that prevent the sandbox from starting
#[derive(Debug, Clone)]
pub enum SandboxError {
    /// A required command-line argument is missing
    MissingArgument(&'static str),
    Config(ConfigError),
    Asset(AssetError),
    Physics(PhysicsError),
}

impl std::fmt::Display for SandboxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingArgument(name) => write!(f, "Missing argument: {name}"),
            Self::Config(e) => write!(f, "Config error: {e}"),
            Self::Asset(e) => write!(f, "Asset error: {e}"),
            Self::Physics(e) => write!(f, "Physics error: {e}"),
        }
    }
}

impl std::error::Error for SandboxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MissingArgument(_) => None,
            Self::Config(e) => Some(e),
            Self::Asset(e) => Some(e),
            Self::Physics(e) => Some(e),
        }
    }
}

impl From<ConfigError> for SandboxError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<AssetError> for SandboxError {
    fn from(e: AssetError) -> Self {
        Self::Asset(e)
    }
}

impl From<PhysicsError> for SandboxError {
    fn from(e: PhysicsError) -> Self {
        Self::Physics(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_arguments_gives_no_application() {
        assert!(create_application(&[]).is_none());
        assert!(create_application(&args(&["physics-sandbox"])).is_none());
    }

    #[test]
    fn test_missing_model_gives_no_application() {
        let app = create_application(&args(&["physics-sandbox", "/nonexistent/model.gltf"]));
        assert!(app.is_none());
    }

    /// Quad drawn as a four-index triangle strip, buffer embedded as base64
    const STRIP_QUAD: &str = r#"{
  "asset": { "version": "2.0" },
  "buffers": [{ "byteLength": 56,
    "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAAAAAAIC/AACAPwAAAAAAAIC/AAABAAIAAwA=" }],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 48 },
    { "buffer": 0, "byteOffset": 48, "byteLength": 8 }
  ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 4, "type": "VEC3",
      "min": [0.0, 0.0, -1.0], "max": [1.0, 0.0, 0.0] },
    { "bufferView": 1, "componentType": 5123, "count": 4, "type": "SCALAR" }
  ],
  "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1, "mode": 5 }] }]
}"#;

    #[test]
    fn test_strip_model_starts_with_import_shape() {
        let path = std::env::temp_dir().join("physics_sandbox_app_strip.gltf");
        std::fs::write(&path, STRIP_QUAD).unwrap();

        let app = create_application(&args(&["physics-sandbox", path.to_str().unwrap()]));
        let app = app.expect("strip model should load");
        assert!(app.sandbox.has_import_shape());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_missing_model_is_asset_error() {
        let err = SandboxApp::new("/nonexistent/model.gltf", None).err().unwrap();
        assert!(matches!(err, SandboxError::Asset(AssetError::Import(_))));
    }

    #[test]
    fn test_bad_config_is_reported_before_model() {
        let err = SandboxApp::new(
            "/nonexistent/model.gltf",
            Some(Path::new("/nonexistent/sandbox.toml")),
        )
        .err()
        .unwrap();
        assert!(matches!(err, SandboxError::Config(_)));
    }
}
