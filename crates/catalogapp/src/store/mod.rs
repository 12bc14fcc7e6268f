//! # Storage Layer
//!
//! This module defines the storage abstraction for the attribute engine. The
//! [`DataStore`] trait is what commands and the resolver talk to; it behaves like
//! a small relational store with three tables and one unique constraint:
//!
//! - **definitions**: attribute schema, unique by `key`
//! - **owners**: products and variants (a variant references exactly one product)
//! - **values**: attribute value rows, unique by `(owner, definition_id)`
//!
//! ## Layers
//!
//! - [`backend::StorageBackend`]: the "how" of persistence. Loads and saves a
//!   whole [`CatalogSnapshot`]; knows nothing about rows or constraints.
//! - [`catalog_store::CatalogStore`]: the "what". Implements [`DataStore`] on top
//!   of any backend: lookups, create-or-update, cascade deletes, transactions.
//!
//! ## Transactions
//!
//! Outside a transaction every write is load-modify-save. Inside
//! [`DataStore::transaction`] the store stages one snapshot, all reads and writes
//! go to the staged copy, and the snapshot is saved exactly once when the closure
//! returns `Ok`. When the closure returns `Err` (or the final save fails) the staged
//! copy is dropped, so a batch either lands completely or not at all.
//!
//! Nested `transaction` calls join the outer one.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: JSON file on disk (`catalog.json`), written atomically.
//! - [`memory::InMemoryStore`]: for testing logic without filesystem I/O.
//!
//! ## Storage Layout
//!
//! ```text
//! <data dir>/
//! ├── catalog.json        # definitions, products, variants, values
//! └── catalog.toml        # optional configuration
//! ```

use crate::attributes::{AttributeDefinition, AttributeValue};
use crate::error::Result;
use crate::model::{OwnerRef, Product, Variant};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod backend;
pub mod catalog_store;
pub mod fs;
pub mod fs_backend;
pub mod mem_backend;
pub mod memory;

/// Everything the engine persists, as one serializable document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub definitions: Vec<AttributeDefinition>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub values: Vec<AttributeValue>,
}

/// Abstract interface for catalog storage.
pub trait DataStore {
    /// All definitions ordered by `sort_order`, then `key`.
    fn definitions(&self) -> Result<Vec<AttributeDefinition>>;

    /// Look up a definition by key. `Ok(None)` for unknown keys.
    fn definition(&self, key: &str) -> Result<Option<AttributeDefinition>>;

    fn definition_by_id(&self, id: &Uuid) -> Result<Option<AttributeDefinition>>;

    /// Create or replace a definition (matched by id). Keys stay unique.
    fn save_definition(&mut self, definition: &AttributeDefinition) -> Result<()>;

    fn product(&self, id: &Uuid) -> Result<Option<Product>>;

    fn variant(&self, id: &Uuid) -> Result<Option<Variant>>;

    fn variants_of(&self, product_id: &Uuid) -> Result<Vec<Variant>>;

    /// Find a product or variant by SKU (products first).
    fn find_by_sku(&self, sku: &str) -> Result<Option<OwnerRef>>;

    fn save_product(&mut self, product: &Product) -> Result<()>;

    /// Fails with `OwnerNotFound` if the variant's product does not exist.
    fn save_variant(&mut self, variant: &Variant) -> Result<()>;

    /// Delete an owner and cascade to its rows (and, for products, its variants).
    fn delete_owner(&mut self, owner: OwnerRef) -> Result<()>;

    /// The row for `(owner, definition)`, if any.
    fn value(&self, owner: OwnerRef, definition_id: &Uuid) -> Result<Option<AttributeValue>>;

    /// All rows attached to an owner.
    fn values(&self, owner: OwnerRef) -> Result<Vec<AttributeValue>>;

    /// Create-or-update on `(owner, definition_id)`.
    fn save_value(&mut self, value: &AttributeValue) -> Result<()>;

    /// Delete the row for `(owner, definition)`. Returns whether a row existed.
    fn delete_value(&mut self, owner: OwnerRef, definition_id: &Uuid) -> Result<bool>;

    /// Run `f` against a staged snapshot; commit on `Ok`, discard on `Err`.
    fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T>;

    fn owner_exists(&self, owner: OwnerRef) -> Result<bool> {
        Ok(match owner {
            OwnerRef::Product(id) => self.product(&id)?.is_some(),
            OwnerRef::Variant(id) => self.variant(&id)?.is_some(),
        })
    }

    /// The owner's parent: a variant's product. Products have none.
    fn parent_of(&self, owner: OwnerRef) -> Result<Option<OwnerRef>> {
        Ok(match owner {
            OwnerRef::Product(_) => None,
            OwnerRef::Variant(id) => self.variant(&id)?.map(|v| v.parent()),
        })
    }
}
