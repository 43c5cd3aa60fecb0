use minijinja::Value;
use std::path::Path;

use crate::constants::helper_meta;
use crate::error::{Error, Result};
use crate::renderer::filters::to_camel_case;

/// A helper file turned into a value.
#[derive(Debug)]
pub struct HelperUnit {
    /// Name the file declares for itself through `moduleName`.
    pub declared_name: Option<String>,
    pub value: Value,
}

/// Kind of helper file, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
    Text,
}

impl Format {
    fn of(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Some(Format::Json),
            Some("yaml") | Some("yml") => Some(Format::Yaml),
            Some("txt") => Some(Format::Text),
            _ => None,
        }
    }
}

/// Imports a helper file. Returns `None` for files of unsupported kinds.
pub fn import(path: &Path) -> Result<Option<HelperUnit>> {
    let Some(format) = Format::of(path) else {
        return Ok(None);
    };
    let content = std::fs::read_to_string(path)?;
    let parse_error =
        |e: String| Error::HelperParse { path: path.display().to_string(), e };

    let document: serde_json::Value = match format {
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?,
        Format::Yaml => serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string()))?,
        Format::Text => {
            return Ok(Some(HelperUnit { declared_name: None, value: Value::from(content) }));
        }
    };

    Ok(Some(unit_from_document(document)))
}

/// Derives the helper key of a file from its stem: `format-date.json`
/// becomes `formatDate`.
pub fn derive_key(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let key = to_camel_case(stem);
    (!key.is_empty()).then_some(key)
}

fn unit_from_document(document: serde_json::Value) -> HelperUnit {
    if let serde_json::Value::Object(map) = &document {
        if let (Some(serde_json::Value::String(name)), Some(body)) =
            (map.get(helper_meta::NAME), map.get(helper_meta::BODY))
        {
            return HelperUnit {
                declared_name: Some(name.clone()),
                value: Value::from_serialize(body),
            };
        }
    }
    HelperUnit { declared_name: None, value: Value::from_serialize(&document) }
}
