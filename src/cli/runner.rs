use crate::{
    cli::Args,
    constants::{config_keys, STDIN_INDICATOR},
    engine::ViewEngine,
    error::{Error, Result},
    ioutils::{parse_string_to_json, read_from, write_file},
};
use log::info;
use minijinja::Value;
use serde_json::{json, Map};
use std::path::Path;

/// Renders one template as described by the command line.
pub struct Runner {
    args: Args,
}

impl Runner {
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    /// Builds an engine, renders the template and writes the output.
    pub fn run(self) -> Result<()> {
        let output = self.render()?;
        match &self.args.output {
            Some(path) => {
                write_file(&output, path)?;
                info!("Rendered '{}' into {}", self.args.template, path.display());
            }
            None => println!("{output}"),
        }
        Ok(())
    }

    /// Renders the template and returns the output.
    pub fn render(&self) -> Result<String> {
        let engine = ViewEngine::new(&self.configuration()?)?;
        let locals = Value::from_serialize(self.locals()?);
        let mut options = Map::new();
        options.insert(config_keys::FROM_STRING.to_string(), json!(self.args.from_string));
        options.insert(config_keys::RETURN_STRING.to_string(), json!(true));
        engine.render_to_string(&self.args.template, locals, serde_json::Value::Object(options))
    }

    /// The configuration file, overridden by command-line flags.
    fn configuration(&self) -> Result<serde_json::Value> {
        let mut configuration = match &self.args.config {
            Some(path) => load_config_file(path)?,
            None => Map::new(),
        };

        if let Some(views) = &self.args.views {
            configuration
                .insert(config_keys::VIEW_PATH.to_string(), json!(views.display().to_string()));
        }
        if !self.args.helpers.is_empty() {
            let helpers: Vec<String> =
                self.args.helpers.iter().map(|path| path.display().to_string()).collect();
            configuration.insert(config_keys::HELPER_PATH.to_string(), json!(helpers));
        }
        if self.args.no_cache {
            configuration.insert(config_keys::NO_CACHE.to_string(), json!(true));
        }
        if self.args.debug {
            configuration.insert(config_keys::DEBUG.to_string(), json!(true));
        }
        Ok(serde_json::Value::Object(configuration))
    }

    fn locals(&self) -> Result<Map<String, serde_json::Value>> {
        match self.args.locals.as_deref() {
            None => Ok(Map::new()),
            Some(STDIN_INDICATOR) => parse_string_to_json(read_from(std::io::stdin())?),
            Some(raw) => parse_string_to_json(raw.to_string()),
        }
    }
}

/// Reads a configuration object from a JSON or YAML file.
fn load_config_file(path: &Path) -> Result<Map<String, serde_json::Value>> {
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
        Some("json") => serde_json::from_str(&content)?,
        _ => {
            return Err(Error::Other(anyhow::anyhow!(
                "Unsupported configuration file '{}', expected .json, .yaml or .yml",
                path.display()
            )))
        }
    };
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(Error::Other(anyhow::anyhow!(
            "Configuration file '{}' must contain an object",
            path.display()
        ))),
    }
}

/// Runs the CLI with the given arguments.
pub fn run(args: Args) -> Result<()> {
    Runner::new(args).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;

    #[test]
    fn test_renders_view_with_locals_and_helpers() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("views")).unwrap();
        fs::create_dir_all(dir.path().join("helpers")).unwrap();
        fs::write(dir.path().join("views/page.j2"), "{{ siteName }}: {{ name }}").unwrap();
        fs::write(dir.path().join("helpers/site-name.txt"), "Docs").unwrap();

        let args = Args::parse_from([
            "viewrender".to_string(),
            "page".to_string(),
            "--views".to_string(),
            dir.path().join("views").display().to_string(),
            "--helpers".to_string(),
            dir.path().join("helpers").display().to_string(),
            "--locals".to_string(),
            r#"{"name": "Ada"}"#.to_string(),
        ]);
        assert_eq!(Runner::new(args).render().unwrap(), "Docs: Ada");
    }

    #[test]
    fn test_renders_inline_source() {
        let args = Args::parse_from([
            "viewrender",
            "Hi {{ name }}",
            "--from-string",
            "--locals",
            r#"{"name": "Ada"}"#,
        ]);
        assert_eq!(Runner::new(args).render().unwrap(), "Hi Ada");
    }

    #[test]
    fn test_config_file_is_overridden_by_flags() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("views.yaml");
        fs::write(&config, "viewPath: /nowhere\nnoCache: false\nlocals:\n  site: Docs\n")
            .unwrap();

        let args = Args::parse_from([
            "viewrender".to_string(),
            "page".to_string(),
            "--config".to_string(),
            config.display().to_string(),
            "--views".to_string(),
            "/views".to_string(),
            "--no-cache".to_string(),
        ]);
        let configuration = Runner::new(args).configuration().unwrap();
        assert_eq!(configuration["viewPath"], json!("/views"));
        assert_eq!(configuration["noCache"], json!(true));
        assert_eq!(configuration["locals"], json!({"site": "Docs"}));
    }

    #[test]
    fn test_unsupported_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("views.toml");
        fs::write(&config, "").unwrap();
        assert!(matches!(load_config_file(&config), Err(Error::Other(_))));
    }

    #[test]
    fn test_missing_template_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args::parse_from([
            "viewrender".to_string(),
            "missing".to_string(),
            "--views".to_string(),
            dir.path().display().to_string(),
        ]);
        assert!(matches!(Runner::new(args).render(), Err(Error::TemplateNotFound { .. })));
    }
}
