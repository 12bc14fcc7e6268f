use super::catalog_store::CatalogStore;
use super::fs_backend::FsBackend;
use std::path::PathBuf;

/// Production store: a JSON catalog inside a data directory.
pub type FileStore = CatalogStore<FsBackend>;

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        CatalogStore::with_backend(FsBackend::new(root))
    }

    pub fn with_file_name(root: PathBuf, file_name: &str) -> Self {
        CatalogStore::with_backend(FsBackend::new(root).with_file_name(file_name))
    }
}
