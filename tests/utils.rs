use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use viewrender::config::CompileOptions;
use viewrender::renderer::{CompiledRenderer, MiniJinjaCompiler, TemplateCompiler};

/// Creates a temporary directory holding the given files (relative path, content).
pub fn fixture(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, content) in files {
        write(dir.path(), path, content);
    }
    dir
}

pub fn write(root: &Path, path: &str, content: &str) {
    let path = root.join(path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// MiniJinja compiler that counts its compilations.
#[derive(Clone, Default)]
pub struct CountingCompiler {
    inner: MiniJinjaCompiler,
    compiles: Arc<AtomicUsize>,
}

impl CountingCompiler {
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.compiles)
    }
}

impl TemplateCompiler for CountingCompiler {
    fn compile(
        &self,
        name: &str,
        source: String,
        options: &CompileOptions,
    ) -> viewrender::Result<CompiledRenderer> {
        self.compiles.fetch_add(1, Ordering::SeqCst);
        self.inner.compile(name, source, options)
    }
}
