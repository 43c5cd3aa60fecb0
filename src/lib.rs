/// Handles argument parsing and the command-line runner.
pub mod cli;

/// Defines custom error types.
pub mod error;

/// Constants shared across modules.
pub mod constants;

/// Extension traits for standard library types.
pub mod ext;

/// A set of helpers for working with the file system.
pub mod ioutils;

/// Template identifier to file path resolution.
pub mod resolver;

/// Compiled template cache keyed by resolved path.
pub mod cache;

/// Helper discovery and the helper table.
pub mod helpers;

/// Templating engine seam and the MiniJinja backend.
pub mod renderer;

/// Configuration handling for view engines.
pub mod config;

/// Host framework integration.
pub mod context;

/// The view engine: resolution, caching, locals merging and output shaping.
pub mod engine;

pub use context::{HostApp, RequestContext, Response, Views};
pub use engine::{CallOptions, Rendered, ViewEngine, VERSION};
pub use error::{Error, Result};
pub use helpers::{HelperEntry, HelperSource, HelperTable};
