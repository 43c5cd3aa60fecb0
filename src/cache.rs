use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::Result;
use crate::renderer::CompiledRenderer;

/// Memoizes compiled templates by resolved absolute path.
///
/// Compile options are not part of the key: the options of the first
/// compilation of a path govern every later cached render of it. Callers
/// needing different options for one call pass `bypass`.
///
/// Entries are never evicted.
#[derive(Default)]
pub struct RendererCache {
    entries: Mutex<HashMap<PathBuf, CompiledRenderer>>,
    compiles: AtomicUsize,
}

impl RendererCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached renderer for `path`, or runs `compile`.
    ///
    /// With `bypass` set the freshly compiled renderer is returned without
    /// being stored. A failed compilation stores nothing.
    ///
    /// Compilation runs outside the lock: two callers missing on the same
    /// path both compile and the later insert wins.
    pub fn get_or_compile<F>(
        &self,
        path: &Path,
        bypass: bool,
        compile: F,
    ) -> Result<CompiledRenderer>
    where
        F: FnOnce() -> Result<CompiledRenderer>,
    {
        if bypass {
            debug!("Cache bypassed for '{}'", path.display());
            return self.compile_counted(compile);
        }

        if let Some(renderer) = self.entries().get(path) {
            debug!("Cache hit for '{}'", path.display());
            return Ok(renderer.clone());
        }

        debug!("Cache miss for '{}'", path.display());
        let renderer = self.compile_counted(compile)?;
        self.entries().insert(path.to_path_buf(), renderer.clone());
        Ok(renderer)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries().contains_key(path)
    }

    /// Number of cached paths.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of compilations run through this cache, bypassed ones included.
    pub fn compile_count(&self) -> usize {
        self.compiles.load(Ordering::Relaxed)
    }

    fn compile_counted<F>(&self, compile: F) -> Result<CompiledRenderer>
    where
        F: FnOnce() -> Result<CompiledRenderer>,
    {
        self.compiles.fetch_add(1, Ordering::Relaxed);
        compile()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PathBuf, CompiledRenderer>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
