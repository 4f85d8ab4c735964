//! Where tile bytes come from
//!
//! A tile pool is an ordered list of identifiers plus a [`TileSource`] that can
//! resolve each identifier to encoded image bytes. Order matters: it breaks
//! ties during matching.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::io::configuration::ALLOWED_EXTENSIONS;
use crate::io::error::{CascadeError, Result};

/// Resolves tile identifiers to encoded image bytes
pub trait TileSource: Sync {
    /// Fetch the bytes behind an identifier
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier cannot be resolved or read
    fn resolve(&self, id: &str) -> std::io::Result<Vec<u8>>;
}

/// Identifiers are filesystem paths
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl TileSource for FileSource {
    fn resolve(&self, id: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(id)
    }
}

/// Identifiers are keys into an in-memory map
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes under an identifier, replacing any previous entry
    pub fn insert(&mut self, id: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(id.into(), bytes);
    }

    /// Number of registered identifiers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no identifier is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TileSource for MemorySource {
    fn resolve(&self, id: &str) -> std::io::Result<Vec<u8>> {
        self.entries.get(id).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no tile registered as '{id}'"),
            )
        })
    }
}

/// Whether a path carries one of the accepted image extensions
pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

/// List tile identifiers from files and directories
///
/// Files are taken as given. Directories contribute their image files (by
/// extension, non-recursive) in sorted order.
///
/// # Errors
///
/// Returns an error if a path does not exist or a directory cannot be read
pub fn collect_tile_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<String>> {
    let mut ids = Vec::new();

    for path in paths {
        let path = path.as_ref();
        if path.is_file() {
            ids.push(path.to_string_lossy().into_owned());
        } else if path.is_dir() {
            let mut found = list_image_files(path)?;
            found.sort();
            ids.extend(
                found
                    .into_iter()
                    .map(|file| file.to_string_lossy().into_owned()),
            );
        } else {
            return Err(CascadeError::FileSystem {
                path: path.to_path_buf(),
                operation: "locate tiles",
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "not a file or directory",
                ),
            });
        }
    }

    Ok(ids)
}

fn list_image_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_error = |source| CascadeError::FileSystem {
        path: dir.to_path_buf(),
        operation: "read directory",
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        if path.is_file() && has_image_extension(&path) {
            files.push(path);
        }
    }
    Ok(files)
}
