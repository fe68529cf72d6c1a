use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;
use tracing::debug;

use super::store::ConfigStore;
use crate::error::NetbillError;
use crate::NetbillResult;

/// Process-wide memo of loaded stores for long-lived hosts.
///
/// The bundled store and each configuration directory are loaded at most
/// once; later calls hand out the same `Arc`. A failed load is not cached.
#[derive(Debug, Default)]
pub struct StoreCache {
    bundled: OnceCell<Arc<ConfigStore>>,
    dirs: Mutex<HashMap<PathBuf, Arc<ConfigStore>>>,
}

impl StoreCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bundled(&self) -> NetbillResult<Arc<ConfigStore>> {
        self.bundled
            .get_or_try_init(|| ConfigStore::bundled().map(Arc::new))
            .cloned()
    }

    /// Store for `dir`; the directory is read on first use only.
    pub fn from_dir<P: AsRef<Path>>(&self, dir: P) -> NetbillResult<Arc<ConfigStore>> {
        let dir = dir.as_ref();
        let mut dirs = self.dirs.lock().map_err(|_| NetbillError::Config {
            path: dir.display().to_string(),
            reason: "configuration cache lock poisoned".into(),
        })?;
        if let Some(store) = dirs.get(dir) {
            return Ok(Arc::clone(store));
        }

        debug!(path = %dir.display(), "caching configuration directory");
        let store = Arc::new(ConfigStore::from_dir(dir)?);
        dirs.insert(dir.to_path_buf(), Arc::clone(&store));
        Ok(store)
    }

    /// `from_dir` when a directory is given, the bundled store otherwise.
    pub fn get(&self, dir: Option<&Path>) -> NetbillResult<Arc<ConfigStore>> {
        match dir {
            Some(dir) => self.from_dir(dir),
            None => self.bundled(),
        }
    }
}
