use super::backend::StorageBackend;
use super::CatalogSnapshot;
use crate::error::{CatalogError, Result};
use std::cell::RefCell;

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability so the `StorageBackend` trait can take
/// `&self` for all methods.
#[derive(Default)]
pub struct MemBackend {
    catalog: RefCell<CatalogSnapshot>,
    simulate_write_error: RefCell<bool>,
    saves: RefCell<usize>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: CatalogSnapshot) -> Self {
        Self {
            catalog: RefCell::new(catalog),
            ..Self::default()
        }
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl StorageBackend for MemBackend {
    fn load_catalog(&self) -> Result<CatalogSnapshot> {
        Ok(self.catalog.borrow().clone())
    }

    fn save_catalog(&self, catalog: &CatalogSnapshot) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(CatalogError::Store("Simulated write error".to_string()));
        }
        *self.catalog.borrow_mut() = catalog.clone();
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}
