//! Configuration management for view engines
//!
//! - `types`: option and configuration value types
//! - `store`: the validating configuration setter

pub mod store;
pub mod types;

pub use store::{ConfigStore, ConfigUpdate};
pub use types::{CompileOptions, ConfigWarning, RenderConfig, RenderOptions};
