use crate::config::CompileOptions;
use crate::error::Result;
use minijinja::Value;
use std::sync::Arc;

/// A compiled template, ready to be evaluated any number of times.
pub trait CompiledTemplate: Send + Sync {
    /// Evaluates the template with the given locals.
    ///
    /// # Arguments
    /// * `locals` - Map of names visible to the template
    ///
    /// # Returns
    /// * `Result<String>` - Rendered output
    fn render(&self, locals: &Value) -> Result<String>;
}

/// Shared handle to a compiled template, as stored in the renderer cache.
pub type CompiledRenderer = Arc<dyn CompiledTemplate>;

/// Trait for templating engines able to turn source text into a
/// [`CompiledRenderer`].
pub trait TemplateCompiler: Send + Sync {
    /// Compiles template source.
    ///
    /// # Arguments
    /// * `name` - Name of the template, the resolved path for files (used in error messages)
    /// * `source` - Template source text
    /// * `options` - Compile options baked into the returned renderer
    ///
    /// # Returns
    /// * `Result<CompiledRenderer>` - The compiled template or `Error::CompileError`
    fn compile(
        &self,
        name: &str,
        source: String,
        options: &CompileOptions,
    ) -> Result<CompiledRenderer>;
}
