//! Configuration value types

use crate::constants::config_keys;
use indexmap::IndexMap;
use minijinja::Value;
use serde::Deserialize;
use serde_json::{json, Map};
use std::path::PathBuf;
use thiserror::Error;

/// Options baked into a compiled template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    /// Keep whitespace around block tags and the trailing newline.
    pub pretty: bool,
    /// Attach source context to template errors.
    pub compile_debug: bool,
    /// HTML-escape every printed value.
    pub autoescape: bool,
    /// Fail on undefined variables instead of printing nothing.
    pub strict: bool,
    /// Root for `include`, `extends` and `import`.
    pub basedir: Option<PathBuf>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            compile_debug: false,
            autoescape: true,
            strict: false,
            basedir: None,
        }
    }
}

impl CompileOptions {
    /// The lowest-precedence layer of every option merge.
    pub fn builtin_defaults() -> Map<String, serde_json::Value> {
        [
            (config_keys::PRETTY, false),
            (config_keys::COMPILE_DEBUG, false),
            (config_keys::AUTOESCAPE, true),
            (config_keys::STRICT, false),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), json!(value)))
        .collect()
    }
}

/// Merged options of one render call: directives plus compile options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    /// Treat the input as template source instead of an identifier.
    #[serde(default)]
    pub from_string: bool,
    /// Return the output instead of attaching it to the request context.
    #[serde(default)]
    pub return_string: bool,
    #[serde(flatten)]
    pub compile: CompileOptions,
}

impl RenderOptions {
    pub fn from_map(map: &Map<String, serde_json::Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(map.clone()))
    }

    /// Checks one render option entry. Known keys holding a value of the
    /// wrong type yield a warning; unknown keys pass.
    pub fn check_entry(key: &str, value: &serde_json::Value) -> Option<ConfigWarning> {
        let expected = match key {
            config_keys::FROM_STRING | config_keys::RETURN_STRING => "a boolean",
            key if config_keys::BOOLEAN_COMPILE_OPTIONS.contains(&key) => "a boolean",
            config_keys::BASEDIR => "a string",
            _ => return None,
        };
        let matches = match value {
            serde_json::Value::Bool(_) => expected == "a boolean",
            serde_json::Value::String(_) | serde_json::Value::Null => {
                key == config_keys::BASEDIR
            }
            _ => false,
        };
        (!matches).then(|| ConfigWarning::WrongType { key: key.to_string(), expected })
    }
}

/// Active configuration of a view engine.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub view_root: PathBuf,
    pub default_locals: IndexMap<String, Value>,
    /// Configured compile defaults, merged over the built-in ones.
    pub compile_defaults: Map<String, serde_json::Value>,
    pub no_cache: bool,
    pub debug: bool,
}

impl RenderConfig {
    pub fn new(view_root: PathBuf) -> Self {
        Self {
            view_root,
            default_locals: IndexMap::new(),
            compile_defaults: Map::new(),
            no_cache: false,
            debug: false,
        }
    }
}

/// Configuration input that was dropped instead of applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    #[error("Configuration must be an object, got {found}; ignored.")]
    NotAnObject { found: &'static str },

    #[error("Option '{key}' must be {expected}; ignored.")]
    WrongType { key: String, expected: &'static str },

    #[error("Unknown option '{key}'; ignored.")]
    UnknownKey { key: String },
}

/// Names the JSON type of a value for diagnostics.
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Merges `overlay` into `target` key by key, descending into nested
/// objects instead of replacing them.
pub fn deep_merge(
    target: &mut Map<String, serde_json::Value>,
    overlay: &Map<String, serde_json::Value>,
) {
    for (key, value) in overlay {
        match (target.get_mut(key), value) {
            (Some(serde_json::Value::Object(existing)), serde_json::Value::Object(nested)) => {
                deep_merge(existing, nested);
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_defaults_parse_to_default_options() {
        let options = RenderOptions::from_map(&CompileOptions::builtin_defaults()).unwrap();
        assert_eq!(options, RenderOptions::default());
        assert!(options.compile.autoescape);
    }

    #[test]
    fn test_render_options_parse_directives_and_compile_options() {
        let map = json!({"fromString": true, "pretty": true, "basedir": "/views", "other": 1});
        let options = RenderOptions::from_map(map.as_object().unwrap()).unwrap();
        assert!(options.from_string);
        assert!(!options.return_string);
        assert!(options.compile.pretty);
        assert_eq!(options.compile.basedir, Some(PathBuf::from("/views")));
    }

    #[test]
    fn test_render_options_reject_wrong_types() {
        let map = json!({"pretty": "yes"});
        assert!(RenderOptions::from_map(map.as_object().unwrap()).is_err());
    }

    #[test]
    fn test_check_entry() {
        assert_eq!(RenderOptions::check_entry("returnString", &json!(true)), None);
        assert_eq!(RenderOptions::check_entry("basedir", &json!("/views")), None);
        assert_eq!(RenderOptions::check_entry("basedir", &json!(null)), None);
        assert_eq!(RenderOptions::check_entry("other", &json!([1])), None);
        assert_eq!(
            RenderOptions::check_entry("pretty", &json!("no")),
            Some(ConfigWarning::WrongType { key: "pretty".into(), expected: "a boolean" })
        );
        assert_eq!(
            RenderOptions::check_entry("basedir", &json!(true)),
            Some(ConfigWarning::WrongType { key: "basedir".into(), expected: "a string" })
        );
    }

    #[test]
    fn test_deep_merge_merges_nested_objects() {
        let mut target = json!({"a": 1, "nested": {"x": 1, "y": 2}});
        let overlay = json!({"b": 2, "nested": {"y": 3, "z": 4}});
        deep_merge(target.as_object_mut().unwrap(), overlay.as_object().unwrap());
        assert_eq!(target, json!({"a": 1, "b": 2, "nested": {"x": 1, "y": 3, "z": 4}}));
    }

    #[test]
    fn test_deep_merge_replaces_non_objects() {
        let mut target = json!({"nested": {"x": 1}});
        let overlay = json!({"nested": false});
        deep_merge(target.as_object_mut().unwrap(), overlay.as_object().unwrap());
        assert_eq!(target, json!({"nested": false}));
    }

    #[test]
    fn test_config_warning_messages() {
        let warning = ConfigWarning::WrongType { key: "noCache".into(), expected: "a boolean" };
        assert_eq!(warning.to_string(), "Option 'noCache' must be a boolean; ignored.");
    }
}
