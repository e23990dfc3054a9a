//! Sandbox configuration
//!
//! Loaded from RON (Rusty Object Notation) or JSON, picked by file extension.
//! Every field has a default, so a config file only needs the values it
//! overrides.

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Tunables for the interactive sandbox
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Maximum distance of crosshair ray casts
    pub ray_distance: f32,
    /// Magnitude of the left-click impulse along the view direction
    pub poke_impulse: f32,
    /// Upward force applied per frame while anti-gravity is held
    pub anti_gravity_force: f32,
    /// Height above the hit point at which dynamic bodies spawn
    pub spawn_height: f32,
    /// Height above the hit point at which the imported model is placed
    pub import_height: f32,
    /// Distance between the two halves of a dumbbell
    pub dumbbell_spacing: f32,
    /// Impulse applied to every scene-bound body on launch
    pub launch_impulse: Vec3,
    /// Offset from the body center at which the launch impulse is applied
    pub launch_offset: Vec3,
    /// Camera settings
    pub camera: CameraConfig,
    /// Physics settings
    pub physics: PhysicsConfig,
    /// Lighting and clear color
    pub lighting: LightingConfig,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            ray_distance: 100.0,
            poke_impulse: 20.0,
            anti_gravity_force: 300.0,
            spawn_height: 20.0,
            import_height: 1.0,
            dumbbell_spacing: 5.0,
            launch_impulse: Vec3::new(0.0, 22.0, -4.0),
            launch_offset: Vec3::new(0.2, 0.0, 0.0),
            camera: CameraConfig::default(),
            physics: PhysicsConfig::default(),
            lighting: LightingConfig::default(),
        }
    }
}

/// Free camera settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Start position
    pub position: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Movement speed in units per second
    pub move_speed: f32,
    /// Rotation speed in radians per second
    pub look_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 8.0),
            fov_y: 0.4 * std::f32::consts::PI,
            near: 0.1,
            far: 500.0,
            move_speed: 8.0,
            look_speed: 1.5,
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// World gravity
    pub gravity: Vec3,
    /// Fixed simulation step in seconds
    pub fixed_timestep: f32,
    /// Maximum substeps consumed per frame
    pub max_substeps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 4,
        }
    }
}

/// Directional light and background
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Direction towards the light (normalized on use)
    pub direction: Vec3,
    /// Light color
    pub color: Vec3,
    /// Ambient term
    pub ambient: Vec3,
    /// Background clear color
    pub clear_color: Vec3,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            direction: Vec3::new(1.0, 0.5, 1.0),
            color: Vec3::new(1.0, 0.8, 0.6),
            ambient: Vec3::splat(0.08),
            clear_color: Vec3::new(0.01, 0.02, 0.03),
        }
    }
}

impl SandboxConfig {
    /// Load a config from a `.ron` or `.json` file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unknown
    /// extension, or fails to parse
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ron") => Self::from_ron(&content),
            Some("json") => Self::from_json(&content),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    /// Parse a config from RON text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid RON for this type
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse a config from JSON text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON for this type
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Errors that can occur while loading configuration
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error
    Io(String),
    /// Parse or serialization error
    Parse(String),
    /// File extension is neither `ron` nor `json`
    UnsupportedFormat(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Parse(e) => write!(f, "Config parse error: {e}"),
            Self::UnsupportedFormat(ext) => write!(f, "Unsupported config format: '{ext}'"),
        }
    }
}

impl std::error::Error for ConfigError {}
