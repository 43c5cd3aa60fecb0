//! Validating configuration setter

use crate::config::types::{json_type_name, ConfigWarning, RenderConfig};
use crate::constants::config_keys;
use crate::helpers::HelperSource;
use indexmap::IndexMap;
use log::{debug, warn};
use minijinja::Value;
use serde_json::Map;
use std::path::PathBuf;

/// Keys [`ConfigStore::apply`] understands.
const KNOWN_KEYS: &[&str] = &[
    config_keys::VIEW_PATH,
    config_keys::LOCALS,
    config_keys::NO_CACHE,
    config_keys::HELPER_PATH,
    config_keys::DEBUG,
    config_keys::PRETTY,
    config_keys::COMPILE_DEBUG,
    config_keys::AUTOESCAPE,
    config_keys::STRICT,
    config_keys::BASEDIR,
    config_keys::APP,
];

/// Outcome of applying a configuration object.
#[derive(Debug, Default)]
pub struct ConfigUpdate {
    /// Inputs that were dropped, in the order they were found.
    pub warnings: Vec<ConfigWarning>,
    /// Helper sources to merge into the helper table.
    pub helper_sources: Vec<HelperSource>,
}

impl ConfigUpdate {
    fn warn(&mut self, warning: ConfigWarning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }

    fn wrong_type(&mut self, key: &str, expected: &'static str) {
        self.warn(ConfigWarning::WrongType { key: key.to_string(), expected });
    }
}

/// Owns the [`RenderConfig`] of an engine and validates every change to it.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config: RenderConfig,
    /// View root used when a configuration omits `viewPath`.
    working_dir: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    /// Creates a store rooted at the process working directory.
    pub fn new() -> Self {
        Self::with_working_dir(std::env::current_dir().unwrap_or_default())
    }

    pub fn with_working_dir(working_dir: PathBuf) -> Self {
        Self { config: RenderConfig::new(working_dir.clone()), working_dir }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Applies a configuration object.
    ///
    /// A non-object changes nothing. `{}` clears the configured compile
    /// defaults and nothing else. Otherwise the view root is replaced (the
    /// working directory when `viewPath` is absent) and every recognised key
    /// of the right type is applied; everything else becomes a warning.
    pub fn apply(&mut self, value: &serde_json::Value) -> ConfigUpdate {
        let mut update = ConfigUpdate::default();

        let Some(options) = value.as_object() else {
            update.warn(ConfigWarning::NotAnObject { found: json_type_name(value) });
            return update;
        };

        if options.is_empty() {
            debug!("Empty configuration, clearing compile defaults");
            self.config.compile_defaults.clear();
            return update;
        }

        self.config.view_root = match options.get(config_keys::VIEW_PATH) {
            Some(serde_json::Value::String(path)) => PathBuf::from(path),
            Some(_) => {
                update.wrong_type(config_keys::VIEW_PATH, "a string");
                self.working_dir.clone()
            }
            None => self.working_dir.clone(),
        };

        match options.get(config_keys::LOCALS) {
            Some(serde_json::Value::Object(locals)) => {
                self.config.default_locals = locals_from_json(locals);
            }
            Some(_) => update.wrong_type(config_keys::LOCALS, "an object"),
            None => {}
        }

        match options.get(config_keys::NO_CACHE) {
            Some(serde_json::Value::Bool(no_cache)) => self.config.no_cache = *no_cache,
            Some(_) => update.wrong_type(config_keys::NO_CACHE, "a boolean"),
            None => {}
        }

        if let Some(helper_path) = options.get(config_keys::HELPER_PATH) {
            match HelperSource::list_from_json(helper_path) {
                Some((sources, rejected)) => {
                    for index in rejected {
                        let key = format!("{}[{index}]", config_keys::HELPER_PATH);
                        update.wrong_type(&key, "a string or an object");
                    }
                    update.helper_sources = sources;
                }
                None => update.wrong_type(config_keys::HELPER_PATH, "a string or a list"),
            }
        }

        self.apply_compile_flags(options, &mut update);

        match options.get(config_keys::BASEDIR) {
            Some(basedir @ serde_json::Value::String(_)) => {
                self.config
                    .compile_defaults
                    .insert(config_keys::BASEDIR.to_string(), basedir.clone());
            }
            Some(_) => update.wrong_type(config_keys::BASEDIR, "a string"),
            None => {}
        }

        if options.contains_key(config_keys::APP) {
            debug!("Ignoring '{}'; install the engine with ViewEngine::install", config_keys::APP);
        }

        for key in options.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                update.warn(ConfigWarning::UnknownKey { key: key.clone() });
            }
        }

        update
    }

    /// `debug` drives `pretty` and `compileDebug` together; without it each
    /// boolean compile option is copied on its own.
    fn apply_compile_flags(
        &mut self,
        options: &Map<String, serde_json::Value>,
        update: &mut ConfigUpdate,
    ) {
        match options.get(config_keys::DEBUG) {
            Some(serde_json::Value::Bool(debug)) => {
                let defaults = &mut self.config.compile_defaults;
                defaults.insert(config_keys::PRETTY.to_string(), (*debug).into());
                defaults.insert(config_keys::COMPILE_DEBUG.to_string(), (*debug).into());
                self.config.debug = *debug;
                return;
            }
            Some(_) => update.wrong_type(config_keys::DEBUG, "a boolean"),
            None => {}
        }

        for key in config_keys::BOOLEAN_COMPILE_OPTIONS {
            match options.get(*key) {
                Some(flag @ serde_json::Value::Bool(_)) => {
                    self.config.compile_defaults.insert(key.to_string(), flag.clone());
                }
                Some(_) => update.wrong_type(key, "a boolean"),
                None => {}
            }
        }
    }

    /// Replaces the default locals. `None` or JSON `null` clears them; a
    /// value that is not a map is ignored with a warning.
    pub fn set_locals(&mut self, locals: Option<&serde_json::Value>) -> Option<ConfigWarning> {
        match locals {
            None | Some(serde_json::Value::Null) => {
                self.config.default_locals.clear();
                None
            }
            Some(serde_json::Value::Object(map)) => {
                self.config.default_locals = locals_from_json(map);
                None
            }
            Some(other) => {
                let warning = ConfigWarning::WrongType {
                    key: config_keys::LOCALS.to_string(),
                    expected: "an object",
                };
                warn!("{warning} (got {})", json_type_name(other));
                Some(warning)
            }
        }
    }
}

fn locals_from_json(map: &Map<String, serde_json::Value>) -> IndexMap<String, Value> {
    map.iter().map(|(key, value)| (key.clone(), Value::from_serialize(value))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> ConfigStore {
        ConfigStore::with_working_dir(PathBuf::from("/srv/app"))
    }

    #[test]
    fn test_non_object_is_ignored_with_warning() {
        let mut store = store();
        store.apply(&json!({"viewPath": "/views", "noCache": true}));

        let update = store.apply(&json!("not a config"));
        assert_eq!(update.warnings, vec![ConfigWarning::NotAnObject { found: "a string" }]);
        assert_eq!(store.config().view_root, PathBuf::from("/views"));
        assert!(store.config().no_cache);
    }

    #[test]
    fn test_empty_object_clears_compile_defaults_only() {
        let mut store = store();
        store.apply(&json!({"viewPath": "/views", "pretty": true, "locals": {"a": 1}}));
        assert!(!store.config().compile_defaults.is_empty());

        let update = store.apply(&json!({}));
        assert!(update.warnings.is_empty());
        assert!(store.config().compile_defaults.is_empty());
        assert_eq!(store.config().view_root, PathBuf::from("/views"));
        assert_eq!(store.config().default_locals.len(), 1);
    }

    #[test]
    fn test_missing_view_path_falls_back_to_working_dir() {
        let mut store = store();
        store.apply(&json!({"viewPath": "/views"}));
        store.apply(&json!({"noCache": false}));
        assert_eq!(store.config().view_root, PathBuf::from("/srv/app"));
    }

    #[test]
    fn test_debug_sets_pretty_and_compile_debug() {
        let mut store = store();
        store.apply(&json!({"debug": true, "pretty": false}));
        let defaults = &store.config().compile_defaults;
        assert_eq!(defaults["pretty"], json!(true));
        assert_eq!(defaults["compileDebug"], json!(true));
        assert!(store.config().debug);
    }

    #[test]
    fn test_individual_flags_are_copied() {
        let mut store = store();
        store.apply(&json!({"pretty": true, "strict": true}));
        let defaults = &store.config().compile_defaults;
        assert_eq!(defaults["pretty"], json!(true));
        assert_eq!(defaults["strict"], json!(true));
        assert!(!defaults.contains_key("compileDebug"));
    }

    #[test]
    fn test_wrong_types_become_warnings() {
        let mut store = store();
        let update = store.apply(&json!({
            "noCache": "yes",
            "locals": [1],
            "pretty": 1,
            "helperPath": 3,
        }));
        assert_eq!(update.warnings.len(), 4);
        assert!(!store.config().no_cache);
        assert!(store.config().default_locals.is_empty());
        assert!(update.helper_sources.is_empty());
    }

    #[test]
    fn test_unknown_keys_become_warnings() {
        let mut store = store();
        let update = store.apply(&json!({"viewPath": "/views", "colour": "red"}));
        assert_eq!(update.warnings, vec![ConfigWarning::UnknownKey { key: "colour".into() }]);
    }

    #[test]
    fn test_app_key_is_accepted_quietly() {
        let mut store = store();
        let update = store.apply(&json!({"viewPath": "/views", "app": {"name": "site"}}));
        assert!(update.warnings.is_empty());
        assert_eq!(store.config().view_root, PathBuf::from("/views"));
    }

    #[test]
    fn test_helper_path_yields_sources() {
        let mut store = store();
        let update = store.apply(&json!({"helperPath": ["/helpers", {"year": 2026}]}));
        assert_eq!(update.helper_sources.len(), 2);
    }

    #[test]
    fn test_malformed_helper_path_items_become_warnings() {
        let mut store = store();
        let update = store.apply(&json!({"helperPath": ["/helpers", 3, true]}));
        assert_eq!(update.helper_sources.len(), 1);
        assert_eq!(
            update.warnings,
            vec![
                ConfigWarning::WrongType {
                    key: "helperPath[1]".into(),
                    expected: "a string or an object"
                },
                ConfigWarning::WrongType {
                    key: "helperPath[2]".into(),
                    expected: "a string or an object"
                },
            ]
        );
    }

    #[test]
    fn test_locals_replaced_wholesale() {
        let mut store = store();
        store.apply(&json!({"locals": {"a": 1, "b": 2}}));
        store.apply(&json!({"locals": {"c": 3}}));
        let keys: Vec<_> = store.config().default_locals.keys().cloned().collect();
        assert_eq!(keys, vec!["c".to_string()]);
    }

    #[test]
    fn test_set_locals() {
        let mut store = store();
        assert!(store.set_locals(Some(&json!({"site": "Docs"}))).is_none());
        assert_eq!(store.config().default_locals.len(), 1);

        assert!(store.set_locals(Some(&json!(42))).is_some());
        assert_eq!(store.config().default_locals.len(), 1);

        assert!(store.set_locals(None).is_none());
        assert!(store.config().default_locals.is_empty());
    }
}
