//! Helper discovery: builds the flat name → value table merged into every
//! render's locals.
//!
//! Sources are processed in order and later sources override earlier ones.
//! Functions are registered explicitly through [`HelperSource::Values`]
//! (e.g. with [`minijinja::Value::from_function`]); files and directories
//! contribute data helpers (see [`file::import`]).
use indexmap::IndexMap;
use log::{debug, info, warn};
use minijinja::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};

pub mod file;

/// Mapping from helper name to value.
pub type HelperTable = IndexMap<String, Value>;

/// Value of a named entry in a [`HelperSource::Mapping`].
#[derive(Debug, Clone)]
pub enum HelperEntry {
    /// Load the file or directory at this path under the entry's name.
    Path(PathBuf),
    /// Use the value verbatim.
    Value(Value),
}

#[derive(Debug, Clone)]
pub enum HelperSource {
    /// A helper file, or a directory walked recursively.
    Path(PathBuf),
    /// Named entries, each either a path to load or a literal value.
    Mapping(IndexMap<String, HelperEntry>),
    /// Already resolved helpers.
    Values(IndexMap<String, Value>),
}

impl HelperSource {
    /// Reads one source from configuration: a string is a path, an object
    /// maps names to paths (strings) or literal values (anything else).
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(path) => Some(HelperSource::Path(PathBuf::from(path))),
            serde_json::Value::Object(map) => Some(HelperSource::Mapping(
                map.iter()
                    .map(|(name, value)| {
                        let entry = match value {
                            serde_json::Value::String(path) => {
                                HelperEntry::Path(PathBuf::from(path))
                            }
                            other => HelperEntry::Value(Value::from_serialize(other)),
                        };
                        (name.clone(), entry)
                    })
                    .collect(),
            )),
            _ => None,
        }
    }

    /// Reads the `helperPath` configuration value: a single path or a list
    /// of sources. Returns the sources along with the indices of list items
    /// of any other shape, which are skipped.
    pub fn list_from_json(value: &serde_json::Value) -> Option<(Vec<Self>, Vec<usize>)> {
        match value {
            serde_json::Value::String(_) => {
                Self::from_json(value).map(|source| (vec![source], Vec::new()))
            }
            serde_json::Value::Array(items) => {
                let mut sources = Vec::with_capacity(items.len());
                let mut rejected = Vec::new();
                for (index, item) in items.iter().enumerate() {
                    match Self::from_json(item) {
                        Some(source) => sources.push(source),
                        None => rejected.push(index),
                    }
                }
                Some((sources, rejected))
            }
            _ => None,
        }
    }
}

/// Loads all sources into a fresh table.
pub fn load(sources: &[HelperSource]) -> Result<HelperTable> {
    let mut table = HelperTable::new();
    for source in sources {
        match source {
            HelperSource::Path(path) => load_path(path, None, &mut table)?,
            HelperSource::Mapping(entries) => {
                for (name, entry) in entries {
                    match entry {
                        HelperEntry::Path(path) => load_path(path, Some(name), &mut table)?,
                        HelperEntry::Value(value) => insert(&mut table, name, value.clone()),
                    }
                }
            }
            HelperSource::Values(values) => {
                for (name, value) in values {
                    insert(&mut table, name, value.clone());
                }
            }
        }
    }
    info!("Loaded {} helper(s)", table.len());
    Ok(table)
}

/// Loads a file or directory. `name` overrides the key of a single file;
/// files inside a directory always use their own key.
fn load_path(path: &Path, name: Option<&str>, table: &mut HelperTable) -> Result<()> {
    if !path.exists() {
        return Err(Error::HelperNotFound { path: path.display().to_string() });
    }

    if path.is_dir() {
        return load_dir(path, table);
    }

    match file::import(path)? {
        Some(unit) => {
            let key = name
                .map(str::to_string)
                .or(unit.declared_name)
                .or_else(|| file::derive_key(path));
            match key {
                Some(key) => insert(table, &key, unit.value),
                None => warn!("Cannot derive a helper name for '{}'", path.display()),
            }
        }
        None => warn!("Skipping helper '{}': unsupported file type", path.display()),
    }
    Ok(())
}

/// Walks a directory in file name order. A key produced by two files of the
/// same walk is reported; the later file wins.
fn load_dir(dir: &Path, table: &mut HelperTable) -> Result<()> {
    let mut seen = HashSet::new();
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name().min_depth(1) {
        let entry = entry.map_err(|e| Error::HelperParse {
            path: dir.display().to_string(),
            e: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(unit) = file::import(path)? else {
            debug!("Skipping helper '{}': unsupported file type", path.display());
            continue;
        };
        let Some(key) = unit.declared_name.or_else(|| file::derive_key(path)) else {
            warn!("Cannot derive a helper name for '{}'", path.display());
            continue;
        };
        if !seen.insert(key.clone()) {
            warn!(
                "Helper '{}' defined more than once under '{}', using '{}'",
                key,
                dir.display(),
                path.display()
            );
        }
        insert(table, &key, unit.value);
    }
    Ok(())
}

fn insert(table: &mut HelperTable, name: &str, value: Value) {
    if table.insert(name.to_string(), value).is_some() {
        debug!("Helper '{name}' overridden by a later source");
    }
}
