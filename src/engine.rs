use indexmap::IndexMap;
use log::{debug, warn};
use minijinja::value::ValueKind;
use minijinja::Value;
use serde_json::Map;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::cache::RendererCache;
use crate::config::types::deep_merge;
use crate::config::{
    CompileOptions, ConfigStore, ConfigWarning, RenderConfig, RenderOptions,
};
use crate::constants::{config_keys, HTML_CONTENT_TYPE, INLINE_TEMPLATE_NAME};
use crate::context::{HostApp, RequestContext, Response, Views};
use crate::error::Result;
use crate::ext::PathExt;
use crate::helpers::{self, HelperSource, HelperTable};
use crate::ioutils::read_template;
use crate::renderer::{MiniJinjaCompiler, TemplateCompiler};
use crate::resolver::PathResolver;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The `options` argument of a render call.
#[derive(Debug, Clone, Default)]
pub enum CallOptions {
    #[default]
    None,
    /// Shorthand for an explicit skip-cache flag. Takes precedence over the
    /// `skip_cache` argument.
    SkipCache(bool),
    /// Render directives and compile options. Anything but a JSON object is
    /// ignored.
    Object(serde_json::Value),
}

impl From<bool> for CallOptions {
    fn from(skip_cache: bool) -> Self {
        CallOptions::SkipCache(skip_cache)
    }
}

impl From<serde_json::Value> for CallOptions {
    fn from(options: serde_json::Value) -> Self {
        CallOptions::Object(options)
    }
}

/// Result of a render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// `returnString` was set.
    Text(String),
    /// The output was written into the request context.
    Attached,
}

/// Resolves, compiles, caches and renders views.
///
/// An engine owns its configuration, helper table and renderer cache;
/// several engines never share state. Wrap it in [`Views`] to hand it to a
/// host application.
pub struct ViewEngine {
    config: RwLock<ConfigStore>,
    helpers: RwLock<HelperTable>,
    cache: RendererCache,
    resolver: PathResolver,
    compiler: Box<dyn TemplateCompiler>,
}

impl ViewEngine {
    /// Creates a MiniJinja-backed engine configured with `options` laid over
    /// `{compileDebug: false, pretty: false}`.
    pub fn new(options: &serde_json::Value) -> Result<Self> {
        Self::with_compiler(MiniJinjaCompiler::new(), options)
    }

    pub fn with_compiler(
        compiler: impl TemplateCompiler + 'static,
        options: &serde_json::Value,
    ) -> Result<Self> {
        Self::with_parts(ConfigStore::new(), Box::new(compiler), options)
    }

    /// Creates an engine around an existing store, e.g. one with a specific
    /// working directory.
    pub fn with_parts(
        store: ConfigStore,
        compiler: Box<dyn TemplateCompiler>,
        options: &serde_json::Value,
    ) -> Result<Self> {
        let engine = Self {
            config: RwLock::new(store),
            helpers: RwLock::new(HelperTable::new()),
            cache: RendererCache::new(),
            resolver: PathResolver::default(),
            compiler,
        };

        let mut initial = Map::new();
        initial.insert(config_keys::COMPILE_DEBUG.to_string(), false.into());
        initial.insert(config_keys::PRETTY.to_string(), false.into());
        if let Some(options) = options.as_object() {
            initial.extend(options.clone());
        }
        engine.configure(&serde_json::Value::Object(initial))?;
        Ok(engine)
    }

    /// Shares the engine with a host application.
    pub fn install<A: HostApp + ?Sized>(views: &Views, app: &mut A) {
        app.install_views(Arc::clone(views));
    }

    /// Applies a configuration object and merges any helper sources it
    /// names into the helper table. Dropped inputs are returned as warnings.
    pub fn configure(&self, options: &serde_json::Value) -> Result<Vec<ConfigWarning>> {
        let update = self.write_config().apply(options);
        if !update.helper_sources.is_empty() {
            self.register_helpers(&update.helper_sources)?;
        }
        Ok(update.warnings)
    }

    /// Loads helper sources and merges them into the helper table; existing
    /// helpers with the same names are replaced.
    pub fn register_helpers(&self, sources: &[HelperSource]) -> Result<()> {
        let loaded = helpers::load(sources)?;
        self.helpers.write().unwrap_or_else(PoisonError::into_inner).extend(loaded);
        Ok(())
    }

    /// Registers a single helper, typically a function.
    pub fn register_helper(&self, name: impl Into<String>, value: Value) {
        self.helpers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), value);
    }

    pub fn helpers(&self) -> HelperTable {
        self.read_helpers().clone()
    }

    pub fn config(&self) -> RenderConfig {
        self.read_config().config().clone()
    }

    /// Configured compile defaults (without the built-in layer).
    pub fn compile_defaults(&self) -> Map<String, serde_json::Value> {
        self.read_config().config().compile_defaults.clone()
    }

    pub fn locals(&self) -> IndexMap<String, Value> {
        self.read_config().config().default_locals.clone()
    }

    /// Replaces the default locals; `None` clears them.
    pub fn set_locals(&self, locals: Option<&serde_json::Value>) -> Option<ConfigWarning> {
        self.write_config().set_locals(locals)
    }

    pub fn cache(&self) -> &RendererCache {
        &self.cache
    }

    /// Renders a view for a request.
    ///
    /// `template` is an identifier resolved below the view root, or template
    /// source when `fromString` is set. Locals merge in increasing
    /// precedence: helpers, default locals, `ctx.state()`, `locals`.
    ///
    /// The cache is skipped when `options` is a boolean `true`, else when
    /// `skip_cache` is `Some(true)`, else when `noCache` is configured.
    ///
    /// With `returnString` set the output is returned; otherwise it becomes
    /// the body of `ctx` along with an HTML content type.
    pub fn render<C: RequestContext + ?Sized>(
        &self,
        ctx: &mut C,
        template: &str,
        locals: Value,
        options: impl Into<CallOptions>,
        skip_cache: Option<bool>,
    ) -> Result<Rendered> {
        let config = self.config();
        let (mut render_options, skip_shorthand) =
            merge_options(&config.compile_defaults, options.into());
        render_options
            .compile
            .basedir
            .get_or_insert_with(|| config.view_root.clone());

        let locals = {
            let helpers = self.read_helpers();
            merge_locals(&helpers, &config.default_locals, &ctx.state(), &locals)
        };

        let output = if render_options.from_string {
            debug!("Rendering inline template");
            self.compiler
                .compile(INLINE_TEMPLATE_NAME, template.to_string(), &render_options.compile)?
                .render(&locals)?
        } else {
            let bypass = skip_shorthand.or(skip_cache).unwrap_or(config.no_cache);
            let path = self.resolver.resolve(template, &config.view_root)?;
            let renderer = self.cache.get_or_compile(&path, bypass, || {
                let source = read_template(&path)?;
                self.compiler.compile(path.to_str_checked()?, source, &render_options.compile)
            })?;
            renderer.render(&locals)?
        };

        if render_options.return_string {
            return Ok(Rendered::Text(output));
        }
        ctx.set_body(output);
        ctx.set_content_type(HTML_CONTENT_TYPE);
        Ok(Rendered::Attached)
    }

    /// Renders without a request context and returns the output.
    pub fn render_to_string(
        &self,
        template: &str,
        locals: Value,
        options: impl Into<CallOptions>,
    ) -> Result<String> {
        let mut response = Response::new();
        match self.render(&mut response, template, locals, options, None)? {
            Rendered::Text(output) => Ok(output),
            Rendered::Attached => Ok(response.body.unwrap_or_default()),
        }
    }

    fn read_config(&self) -> RwLockReadGuard<'_, ConfigStore> {
        self.config.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_config(&self) -> RwLockWriteGuard<'_, ConfigStore> {
        self.config.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_helpers(&self) -> RwLockReadGuard<'_, HelperTable> {
        self.helpers.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Merges built-in defaults < configured defaults < call options. Call
/// options that are not an object are ignored, as is every call option of
/// the wrong type. Returns the boolean shorthand separately.
fn merge_options(
    configured: &Map<String, serde_json::Value>,
    options: CallOptions,
) -> (RenderOptions, Option<bool>) {
    let mut merged = CompileOptions::builtin_defaults();
    deep_merge(&mut merged, configured);

    let shorthand = match options {
        CallOptions::None => None,
        CallOptions::SkipCache(skip) => Some(skip),
        CallOptions::Object(serde_json::Value::Object(call)) => {
            let accepted: Map<String, serde_json::Value> = call
                .into_iter()
                .filter(|(key, value)| match RenderOptions::check_entry(key, value) {
                    Some(warning) => {
                        warn!("Render call: {warning}");
                        false
                    }
                    None => true,
                })
                .collect();
            deep_merge(&mut merged, &accepted);
            None
        }
        CallOptions::Object(other) => {
            debug!("Ignoring render options that are not an object: {other}");
            None
        }
    };

    let options = RenderOptions::from_map(&merged).unwrap_or_else(|e| {
        warn!("Ignoring render options: {e}");
        RenderOptions::default()
    });
    (options, shorthand)
}

/// Flattens the locals layers into one map, later layers winning.
fn merge_locals(
    helpers: &HelperTable,
    defaults: &IndexMap<String, Value>,
    state: &Value,
    call: &Value,
) -> Value {
    let mut merged = helpers.clone();
    merged.extend(defaults.iter().map(|(key, value)| (key.clone(), value.clone())));
    extend_from_map_value(&mut merged, state);
    extend_from_map_value(&mut merged, call);
    Value::from_iter(merged)
}

fn extend_from_map_value(target: &mut IndexMap<String, Value>, value: &Value) {
    if value.kind() != ValueKind::Map {
        if !value.is_undefined() && !value.is_none() {
            debug!("Ignoring locals of kind {:?}", value.kind());
        }
        return;
    }
    let Ok(keys) = value.try_iter() else {
        return;
    };
    for key in keys {
        if let (Some(name), Ok(item)) = (key.as_str(), value.get_item(&key)) {
            target.insert(name.to_string(), item);
        }
    }
}
