use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::cleaner::{clean, CleanRules};
use super::error::LoadError;
use super::loader::load_file;
use super::model::CleanedDataset;

// ---------------------------------------------------------------------------
// Source identity
// ---------------------------------------------------------------------------

/// What makes two reads of a source interchangeable: same file, same
/// modification time, same size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceIdentity {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl SourceIdentity {
    pub fn probe(path: &Path) -> Result<Self, LoadError> {
        let unreadable = |source| LoadError::Unreadable {
            path: path.to_path_buf(),
            source,
        };
        let meta = std::fs::metadata(path).map_err(unreadable)?;
        let canonical = std::fs::canonicalize(path).map_err(unreadable)?;
        Ok(Self {
            path: canonical,
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Cleaned datasets keyed by source path. An entry is reused only while the
/// file's identity is unchanged; otherwise it is dropped and recomputed.
#[derive(Debug, Default)]
pub struct DatasetCache {
    rules: CleanRules,
    entries: HashMap<PathBuf, (SourceIdentity, Arc<CleanedDataset>)>,
}

impl DatasetCache {
    pub fn new(rules: CleanRules) -> Self {
        Self {
            rules,
            entries: HashMap::new(),
        }
    }

    /// Return the cleaned dataset for `path`, reading and cleaning it only if
    /// it is not cached or the file changed since it was cached.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<CleanedDataset>, LoadError> {
        let identity = SourceIdentity::probe(path)?;

        if let Some((cached, dataset)) = self.entries.get(&identity.path) {
            if *cached == identity {
                log::debug!("Cache hit for {}", identity.path.display());
                return Ok(Arc::clone(dataset));
            }
            log::info!(
                "Source {} changed on disk, invalidating cached dataset",
                identity.path.display()
            );
            self.entries.remove(&identity.path);
        }

        let raw = load_file(path)?;
        let dataset = Arc::new(clean(&raw, &self.rules)?);
        self.entries
            .insert(identity.path.clone(), (identity, Arc::clone(&dataset)));
        log::debug!("{} cleaned dataset(s) cached", self.len());
        Ok(dataset)
    }

    /// Forget the entry for `path`. Returns whether one existed.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.entries.remove(&key).is_some()
    }

    /// Number of cached sources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
