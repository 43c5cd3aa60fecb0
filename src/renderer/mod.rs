//! Seam to the templating engine and its MiniJinja implementation.
pub mod filters;
pub mod interface;
pub mod minijinja;

pub use interface::{CompiledRenderer, CompiledTemplate, TemplateCompiler};
pub use self::minijinja::MiniJinjaCompiler;
