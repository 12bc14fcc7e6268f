use super::backend::StorageBackend;
use super::CatalogSnapshot;
use crate::error::{CatalogError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const DEFAULT_FILE_NAME: &str = "catalog.json";

/// Filesystem backend: one pretty-printed JSON document per data directory.
pub struct FsBackend {
    root: PathBuf,
    file_name: String,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }

    pub fn with_file_name(mut self, name: &str) -> Self {
        self.file_name = name.to_string();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(&self.file_name)
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(CatalogError::Io)?;
        }
        Ok(())
    }
}

impl StorageBackend for FsBackend {
    fn load_catalog(&self) -> Result<CatalogSnapshot> {
        let data_file = self.catalog_path();
        if !data_file.exists() {
            return Ok(CatalogSnapshot::default());
        }
        let content = fs::read_to_string(data_file).map_err(CatalogError::Io)?;
        let catalog = serde_json::from_str(&content).map_err(CatalogError::Serialization)?;
        Ok(catalog)
    }

    fn save_catalog(&self, catalog: &CatalogSnapshot) -> Result<()> {
        self.ensure_dir(&self.root)?;

        let content =
            serde_json::to_string_pretty(catalog).map_err(CatalogError::Serialization)?;

        let tmp_file = self.root.join(format!(".catalog-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(CatalogError::Io)?;
        fs::rename(&tmp_file, self.catalog_path()).map_err(CatalogError::Io)?;

        Ok(())
    }
}
