use log::debug;
use std::path::{Path, PathBuf};

use crate::constants::{INDEX_STEM, TEMPLATE_EXTENSION};
use crate::error::{Error, Result};
use crate::ext::PathExt;

/// Maps template identifiers to template files below a view root.
///
/// Resolution order for an identifier `id`:
/// 1. `id` already ends in `.{extension}`: `<root>/<id>`
/// 2. `<root>/<id>.{extension}`
/// 3. `<root>/<id>/index.{extension}` when `<root>/<id>` is a directory
///
/// The file with the extension wins over a directory with the same stem.
#[derive(Debug, Clone)]
pub struct PathResolver {
    extension: String,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(TEMPLATE_EXTENSION)
    }
}

impl PathResolver {
    /// Creates a resolver for the given template extension (without the dot).
    pub fn new(extension: impl Into<String>) -> Self {
        Self { extension: extension.into() }
    }

    /// Resolves `template` against `view_root` into an absolute, lexically
    /// normalised path of an existing template file.
    ///
    /// Absolute identifiers are used as they are. Relative identifiers must
    /// stay inside the view root once `..` components are folded.
    pub fn resolve(&self, template: &str, view_root: &Path) -> Result<PathBuf> {
        let root = std::path::absolute(view_root)?.normalize_path();
        let requested = Path::new(template);
        let joined = root.join(requested).normalize_path();

        if !requested.is_absolute() && !joined.starts_with(&root) {
            return Err(Error::OutsideViewRoot {
                template: template.to_string(),
                view_root: root.display().to_string(),
            });
        }

        let not_found = || Error::TemplateNotFound {
            template: template.to_string(),
            view_root: root.display().to_string(),
        };

        let resolved = if self.has_template_extension(requested) {
            joined
        } else {
            let with_extension = joined.with_appended_extension(&self.extension);
            if with_extension.is_file() || !joined.is_dir() {
                with_extension
            } else {
                joined.join(format!("{INDEX_STEM}.{}", self.extension))
            }
        };

        if !resolved.is_file() {
            return Err(not_found());
        }

        debug!("Resolved template '{}' to '{}'", template, resolved.display());
        Ok(resolved)
    }

    fn has_template_extension(&self, path: &Path) -> bool {
        path.extension().and_then(|ext| ext.to_str()) == Some(self.extension.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn views() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("page.j2"), "page").unwrap();
        fs::create_dir_all(dir.path().join("users")).unwrap();
        fs::write(dir.path().join("users/index.j2"), "users").unwrap();
        fs::create_dir_all(dir.path().join("both")).unwrap();
        fs::write(dir.path().join("both/index.j2"), "dir").unwrap();
        fs::write(dir.path().join("both.j2"), "file").unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        dir
    }

    #[test]
    fn test_resolves_identifier_with_extension() {
        let dir = views();
        let resolved = PathResolver::default().resolve("page.j2", dir.path()).unwrap();
        assert_eq!(resolved, dir.path().join("page.j2"));
    }

    #[test]
    fn test_appends_extension() {
        let dir = views();
        let resolved = PathResolver::default().resolve("page", dir.path()).unwrap();
        assert_eq!(resolved, dir.path().join("page.j2"));
    }

    #[test]
    fn test_falls_back_to_directory_index() {
        let dir = views();
        let resolved = PathResolver::default().resolve("users", dir.path()).unwrap();
        assert_eq!(resolved, dir.path().join("users/index.j2"));
    }

    #[test]
    fn test_file_wins_over_directory_with_same_stem() {
        let dir = views();
        let resolved = PathResolver::default().resolve("both", dir.path()).unwrap();
        assert_eq!(resolved, dir.path().join("both.j2"));
    }

    #[test]
    fn test_directory_without_index_is_not_found() {
        let dir = views();
        let result = PathResolver::default().resolve("empty", dir.path());
        assert!(matches!(result, Err(Error::TemplateNotFound { .. })));
    }

    #[test]
    fn test_missing_template_is_not_found() {
        let dir = views();
        let result = PathResolver::default().resolve("nope", dir.path());
        assert!(matches!(result, Err(Error::TemplateNotFound { .. })));
        let result = PathResolver::default().resolve("nope.j2", dir.path());
        assert!(matches!(result, Err(Error::TemplateNotFound { .. })));
    }

    #[test]
    fn test_identifiers_for_same_file_resolve_to_same_path() {
        let dir = views();
        let resolver = PathResolver::default();
        let a = resolver.resolve("page", dir.path()).unwrap();
        let b = resolver.resolve("./users/../page.j2", dir.path()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, resolver.resolve("page", dir.path()).unwrap());
    }

    #[test]
    fn test_absolute_identifier_ignores_view_root() {
        let dir = views();
        let other = tempfile::tempdir().unwrap();
        let absolute = dir.path().join("page").display().to_string();
        let resolved = PathResolver::default().resolve(&absolute, other.path()).unwrap();
        assert_eq!(resolved, dir.path().join("page.j2"));
    }

    #[test]
    fn test_relative_identifier_cannot_escape_view_root() {
        let dir = views();
        let root = dir.path().join("users");
        let result = PathResolver::default().resolve("../page", &root);
        assert!(matches!(result, Err(Error::OutsideViewRoot { .. })));
    }

    #[test]
    fn test_relative_view_root_resolves_against_working_dir() {
        let dir = tempfile::tempdir_in(".").unwrap();
        fs::write(dir.path().join("page.j2"), "page").unwrap();
        let relative = PathBuf::from(".").join(dir.path().file_name().unwrap());

        let resolved = PathResolver::default().resolve("page", &relative).unwrap();
        assert!(resolved.is_absolute());
        let expected = std::env::current_dir().unwrap().join(&relative).normalize_path();
        assert_eq!(resolved, expected.join("page.j2"));
    }
}
