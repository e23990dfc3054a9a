//! Input handling module
//!
//! Raw key/mouse state plus the key to action table.

mod bindings;
mod state;

pub use bindings::{InputMapper, SandboxAction};
pub use state::Input;
