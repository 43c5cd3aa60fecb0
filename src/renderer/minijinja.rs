use super::filters::register_filters;
use crate::config::CompileOptions;
use crate::error::{Error, Result};
use crate::renderer::interface::{CompiledRenderer, CompiledTemplate, TemplateCompiler};
use minijinja::{path_loader, AutoEscape, Environment, UndefinedBehavior, Value};
use std::sync::Arc;

/// MiniJinja-based template compiler.
///
/// Every compiled template owns its environment, so compile options never
/// leak between templates.
#[derive(Debug, Default, Clone, Copy)]
pub struct MiniJinjaCompiler;

impl MiniJinjaCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Builds an environment configured from the compile options.
    fn environment(options: &CompileOptions) -> Environment<'static> {
        let mut env = Environment::new();
        register_filters(&mut env);

        env.set_debug(options.compile_debug);
        // Compact output strips whitespace around block tags
        env.set_trim_blocks(!options.pretty);
        env.set_lstrip_blocks(!options.pretty);
        env.set_keep_trailing_newline(options.pretty);
        env.set_undefined_behavior(if options.strict {
            UndefinedBehavior::Strict
        } else {
            UndefinedBehavior::Lenient
        });

        let auto_escape =
            if options.autoescape { AutoEscape::Html } else { AutoEscape::None };
        env.set_auto_escape_callback(move |_| auto_escape);

        if let Some(basedir) = &options.basedir {
            env.set_loader(path_loader(basedir.clone()));
        }
        env
    }
}

/// A template compiled into its own environment.
struct MiniJinjaTemplate {
    env: Environment<'static>,
    name: String,
}

impl CompiledTemplate for MiniJinjaTemplate {
    fn render(&self, locals: &Value) -> Result<String> {
        let tmpl = self.env.get_template(&self.name)?;
        Ok(tmpl.render(locals)?)
    }
}

impl TemplateCompiler for MiniJinjaCompiler {
    fn compile(
        &self,
        name: &str,
        source: String,
        options: &CompileOptions,
    ) -> Result<CompiledRenderer> {
        let mut env = Self::environment(options);
        env.add_template_owned(name.to_string(), source).map_err(|source| {
            Error::CompileError { template: name.to_string(), source }
        })?;
        Ok(Arc::new(MiniJinjaTemplate { env, name: name.to_string() }))
    }
}
