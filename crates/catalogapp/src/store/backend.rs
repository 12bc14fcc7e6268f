use super::CatalogSnapshot;
use crate::error::Result;

/// Abstract interface for raw storage I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while CatalogStore handles the "what" (lookups, constraints, transactions).
pub trait StorageBackend {
    /// Load the whole catalog. A missing store is an empty catalog, not an error.
    fn load_catalog(&self) -> Result<CatalogSnapshot>;

    /// Replace the stored catalog.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn save_catalog(&self, catalog: &CatalogSnapshot) -> Result<()>;
}
