//! Destinations for generated stub files.

use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Component, Path, PathBuf},
    sync::{Arc, Mutex},
};

use crate::error::{Result, StubError};

/// Creates writable destinations for stub files.
pub trait OutputSink: Sync {
    /// Open the destination for `file_name` in the package at `package_path`.
    fn create(&self, package_path: &str, file_name: &str) -> Result<Box<dyn Write + Send>>;

    /// Where `file_name` of `package_path` ends up, for reporting.
    fn location(&self, package_path: &str, file_name: &str) -> PathBuf {
        Path::new(package_path).join(file_name)
    }
}

/// Writes stubs into a directory tree, one directory per package path.
#[derive(Debug, Clone)]
pub struct DirSink {
    /// Output root.
    root: PathBuf,
}

impl DirSink {
    /// A sink writing below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The output root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Whether `path` names something strictly below the directory it is joined to.
fn stays_below(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

impl OutputSink for DirSink {
    /// Package paths and file names that would leave the root are rejected.
    fn create(&self, package_path: &str, file_name: &str) -> Result<Box<dyn Write + Send>> {
        let relative = Path::new(package_path).join(file_name);
        if !stays_below(&relative) || Path::new(file_name).components().count() != 1 {
            return Err(StubError::OutputWrite {
                path: relative,
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "destination escapes the output directory",
                ),
            });
        }
        let path = self.location(package_path, file_name);
        let write_error = |source| StubError::OutputWrite {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        let file = File::create(&path).map_err(write_error)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn location(&self, package_path: &str, file_name: &str) -> PathBuf {
        self.root.join(package_path).join(file_name)
    }
}

/// Shared buffer behind a [`MemorySink`] writer.
#[derive(Debug)]
struct MemoryWriter {
    /// Key of the file being written.
    key: PathBuf,
    /// Bytes written so far.
    buf: Vec<u8>,
    /// Where finished files land.
    files: Arc<Mutex<BTreeMap<PathBuf, String>>>,
}

impl Write for MemoryWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let text = String::from_utf8_lossy(&self.buf).into_owned();
        self.files
            .lock()
            .map_err(|_| io::Error::other("memory sink poisoned"))?
            .insert(self.key.clone(), text);
        Ok(())
    }
}

/// Keeps stubs in memory, keyed by `<package path>/<file name>`.
///
/// A file becomes visible once its writer is flushed.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Finished files.
    files: Arc<Mutex<BTreeMap<PathBuf, String>>>,
}

impl MemorySink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the files written so far, ordered by location.
    pub fn files(&self) -> BTreeMap<PathBuf, String> {
        self.files
            .lock()
            .map(|files| files.clone())
            .unwrap_or_default()
    }
}

impl OutputSink for MemorySink {
    fn create(&self, package_path: &str, file_name: &str) -> Result<Box<dyn Write + Send>> {
        Ok(Box::new(MemoryWriter {
            key: self.location(package_path, file_name),
            buf: Vec::new(),
            files: Arc::clone(&self.files),
        }))
    }
}
