use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Extension trait for Path used by template resolution and cache keys.
pub trait PathExt {
    /// Converts a path to a string slice, returning an error if the path
    /// contains invalid Unicode characters.
    ///
    /// # Examples
    /// ```
    /// use viewrender::ext::PathExt;
    /// use std::path::Path;
    ///
    /// let path = Path::new("views/page.j2");
    /// assert_eq!(path.to_str_checked().unwrap(), "views/page.j2");
    /// ```
    fn to_str_checked(&self) -> Result<&str>;

    /// Lexically normalises the path: removes `.` components and folds `..`
    /// into the preceding component. The filesystem is never consulted, so
    /// symlinks are not resolved.
    ///
    /// # Examples
    /// ```
    /// use viewrender::ext::PathExt;
    /// use std::path::{Path, PathBuf};
    ///
    /// let path = Path::new("/views/users/../pages/./home.j2");
    /// assert_eq!(path.normalize_path(), PathBuf::from("/views/pages/home.j2"));
    /// ```
    fn normalize_path(&self) -> PathBuf;

    /// Appends `.{extension}` to the final component without replacing an
    /// existing extension (`page.v2` becomes `page.v2.j2`).
    fn with_appended_extension(&self, extension: &str) -> PathBuf;
}

impl PathExt for Path {
    fn to_str_checked(&self) -> Result<&str> {
        self.to_str().ok_or_else(|| {
            Error::Other(anyhow::anyhow!(
                "Path '{}' contains invalid Unicode characters",
                self.display()
            ))
        })
    }

    fn normalize_path(&self) -> PathBuf {
        let mut normalized = PathBuf::new();
        for component in self.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    if !normalized.pop() {
                        normalized.push(component.as_os_str());
                    }
                }
                other => normalized.push(other.as_os_str()),
            }
        }
        normalized
    }

    fn with_appended_extension(&self, extension: &str) -> PathBuf {
        let mut raw = self.as_os_str().to_os_string();
        raw.push(".");
        raw.push(extension);
        PathBuf::from(raw)
    }
}
