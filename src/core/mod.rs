//! Core engine module
//!
//! Engine loop, frame timing, events and configuration

mod config;
mod engine;
mod events;
mod time;

pub use config::{CameraConfig, ConfigError, LightingConfig, PhysicsConfig, SandboxConfig};
pub use engine::{Engine, EngineConfig, EngineContext, Game};
pub use events::{EngineEvent, EventDispatcher, EventHandler, EventKind, EventQueue, KeyState};
pub use time::Time;
