use super::catalog_store::CatalogStore;
use super::mem_backend::MemBackend;

pub type InMemoryStore = CatalogStore<MemBackend>;

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        CatalogStore::with_backend(MemBackend::new())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::attributes::{AttributeDefinition, AttributeValue};
    use crate::model::{OwnerRef, Product, Variant};
    use crate::store::DataStore;

    /// Builds a catalog directly through the store, bypassing commands.
    pub struct CatalogFixture {
        pub store: InMemoryStore,
    }

    impl Default for CatalogFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl CatalogFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        pub fn define(&mut self, definition: AttributeDefinition) -> AttributeDefinition {
            self.store.save_definition(&definition).unwrap();
            definition
        }

        pub fn product(&mut self, sku: &str) -> Product {
            let product = Product::new(sku, sku);
            self.store.save_product(&product).unwrap();
            product
        }

        pub fn variant(&mut self, product: &Product, sku: &str) -> Variant {
            let variant = Variant::new(product, sku, sku);
            self.store.save_variant(&variant).unwrap();
            variant
        }

        /// Store an explicit, valid value row.
        pub fn set(&mut self, owner: OwnerRef, key: &str, raw: &str) -> AttributeValue {
            let definition = self.store.definition(key).unwrap().unwrap();
            let mut row = self
                .store
                .value(owner, &definition.id)
                .unwrap()
                .unwrap_or_else(|| AttributeValue::new(owner, &definition));
            row.set_value(&definition, raw).unwrap();
            self.store.save_value(&row).unwrap();
            row
        }

        /// Store an override row.
        pub fn set_override(&mut self, owner: OwnerRef, key: &str, raw: &str) -> AttributeValue {
            let definition = self.store.definition(key).unwrap().unwrap();
            let mut row = AttributeValue::new(owner, &definition);
            row.override_value(&definition, raw).unwrap();
            self.store.save_value(&row).unwrap();
            row
        }

        /// Store a row exactly as given, bypassing validation.
        pub fn put_raw(&mut self, row: AttributeValue) -> AttributeValue {
            self.store.save_value(&row).unwrap();
            row
        }

        /// Materialize the parent's current value on a variant.
        pub fn inherit(&mut self, variant: &Variant, key: &str) -> AttributeValue {
            let definition = self.store.definition(key).unwrap().unwrap();
            let parent = self
                .store
                .value(variant.parent(), &definition.id)
                .unwrap()
                .unwrap();
            let mut row = AttributeValue::new(variant.owner(), &definition);
            row.inherit_from(&definition, &parent).unwrap();
            self.store.save_value(&row).unwrap();
            row
        }

        pub fn row(&self, owner: OwnerRef, key: &str) -> Option<AttributeValue> {
            let definition = self.store.definition(key).unwrap()?;
            self.store.value(owner, &definition.id).unwrap()
        }
    }
}
