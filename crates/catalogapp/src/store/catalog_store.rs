use super::backend::StorageBackend;
use super::{CatalogSnapshot, DataStore};
use crate::attributes::{AttributeDefinition, AttributeValue};
use crate::error::{CatalogError, Result};
use crate::model::{OwnerRef, Product, Variant};
use uuid::Uuid;

pub struct CatalogStore<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    /// Snapshot staged by an open transaction.
    staged: Option<CatalogSnapshot>,
}

impl<B: StorageBackend> CatalogStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            staged: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn in_transaction(&self) -> bool {
        self.staged.is_some()
    }

    /// Copy of the full catalog as currently visible (staged state included).
    pub fn snapshot(&self) -> Result<CatalogSnapshot> {
        self.read(|catalog| catalog.clone())
    }

    fn read<T>(&self, f: impl FnOnce(&CatalogSnapshot) -> T) -> Result<T> {
        match &self.staged {
            Some(catalog) => Ok(f(catalog)),
            None => {
                let catalog = self.backend.load_catalog()?;
                Ok(f(&catalog))
            }
        }
    }

    fn write<T>(&mut self, f: impl FnOnce(&mut CatalogSnapshot) -> Result<T>) -> Result<T> {
        if let Some(catalog) = self.staged.as_mut() {
            return f(catalog);
        }
        let mut catalog = self.backend.load_catalog()?;
        let out = f(&mut catalog)?;
        self.backend.save_catalog(&catalog)?;
        Ok(out)
    }
}

fn owner_exists_in(catalog: &CatalogSnapshot, owner: OwnerRef) -> bool {
    match owner {
        OwnerRef::Product(id) => catalog.products.iter().any(|p| p.id == id),
        OwnerRef::Variant(id) => catalog.variants.iter().any(|v| v.id == id),
    }
}

impl<B: StorageBackend> DataStore for CatalogStore<B> {
    fn definitions(&self) -> Result<Vec<AttributeDefinition>> {
        self.read(|catalog| {
            let mut definitions = catalog.definitions.clone();
            definitions.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.key.cmp(&b.key)));
            definitions
        })
    }

    fn definition(&self, key: &str) -> Result<Option<AttributeDefinition>> {
        self.read(|catalog| catalog.definitions.iter().find(|d| d.key == key).cloned())
    }

    fn definition_by_id(&self, id: &Uuid) -> Result<Option<AttributeDefinition>> {
        self.read(|catalog| catalog.definitions.iter().find(|d| d.id == *id).cloned())
    }

    fn save_definition(&mut self, definition: &AttributeDefinition) -> Result<()> {
        self.write(|catalog| {
            if catalog
                .definitions
                .iter()
                .any(|d| d.key == definition.key && d.id != definition.id)
            {
                return Err(CatalogError::Store(format!(
                    "Attribute key '{}' is already defined",
                    definition.key
                )));
            }
            match catalog.definitions.iter_mut().find(|d| d.id == definition.id) {
                Some(existing) => *existing = definition.clone(),
                None => catalog.definitions.push(definition.clone()),
            }
            Ok(())
        })
    }

    fn product(&self, id: &Uuid) -> Result<Option<Product>> {
        self.read(|catalog| catalog.products.iter().find(|p| p.id == *id).cloned())
    }

    fn variant(&self, id: &Uuid) -> Result<Option<Variant>> {
        self.read(|catalog| catalog.variants.iter().find(|v| v.id == *id).cloned())
    }

    fn variants_of(&self, product_id: &Uuid) -> Result<Vec<Variant>> {
        self.read(|catalog| {
            catalog
                .variants
                .iter()
                .filter(|v| v.product_id == *product_id)
                .cloned()
                .collect()
        })
    }

    fn find_by_sku(&self, sku: &str) -> Result<Option<OwnerRef>> {
        self.read(|catalog| {
            catalog
                .products
                .iter()
                .find(|p| p.sku == sku)
                .map(Product::owner)
                .or_else(|| {
                    catalog
                        .variants
                        .iter()
                        .find(|v| v.sku == sku)
                        .map(Variant::owner)
                })
        })
    }

    fn save_product(&mut self, product: &Product) -> Result<()> {
        self.write(|catalog| {
            match catalog.products.iter_mut().find(|p| p.id == product.id) {
                Some(existing) => *existing = product.clone(),
                None => catalog.products.push(product.clone()),
            }
            Ok(())
        })
    }

    fn save_variant(&mut self, variant: &Variant) -> Result<()> {
        self.write(|catalog| {
            if !owner_exists_in(catalog, variant.parent()) {
                return Err(CatalogError::OwnerNotFound(variant.parent()));
            }
            match catalog.variants.iter_mut().find(|v| v.id == variant.id) {
                Some(existing) => *existing = variant.clone(),
                None => catalog.variants.push(variant.clone()),
            }
            Ok(())
        })
    }

    fn delete_owner(&mut self, owner: OwnerRef) -> Result<()> {
        self.write(|catalog| {
            if !owner_exists_in(catalog, owner) {
                return Err(CatalogError::OwnerNotFound(owner));
            }
            let mut doomed = vec![owner];
            match owner {
                OwnerRef::Product(id) => {
                    doomed.extend(
                        catalog
                            .variants
                            .iter()
                            .filter(|v| v.product_id == id)
                            .map(Variant::owner),
                    );
                    catalog.products.retain(|p| p.id != id);
                    catalog.variants.retain(|v| v.product_id != id);
                }
                OwnerRef::Variant(id) => catalog.variants.retain(|v| v.id != id),
            }
            catalog.values.retain(|row| !doomed.contains(&row.owner));
            Ok(())
        })
    }

    fn value(&self, owner: OwnerRef, definition_id: &Uuid) -> Result<Option<AttributeValue>> {
        self.read(|catalog| {
            catalog
                .values
                .iter()
                .find(|row| row.owner == owner && row.definition_id == *definition_id)
                .cloned()
        })
    }

    fn values(&self, owner: OwnerRef) -> Result<Vec<AttributeValue>> {
        self.read(|catalog| {
            catalog
                .values
                .iter()
                .filter(|row| row.owner == owner)
                .cloned()
                .collect()
        })
    }

    fn save_value(&mut self, value: &AttributeValue) -> Result<()> {
        self.write(|catalog| {
            if !owner_exists_in(catalog, value.owner) {
                return Err(CatalogError::OwnerNotFound(value.owner));
            }
            if !catalog.definitions.iter().any(|d| d.id == value.definition_id) {
                return Err(CatalogError::Store(format!(
                    "Unknown attribute definition {}",
                    value.definition_id
                )));
            }
            match catalog
                .values
                .iter_mut()
                .find(|row| row.owner == value.owner && row.definition_id == value.definition_id)
            {
                Some(existing) => *existing = value.clone(),
                None => catalog.values.push(value.clone()),
            }
            Ok(())
        })
    }

    fn delete_value(&mut self, owner: OwnerRef, definition_id: &Uuid) -> Result<bool> {
        // Skip the save when nothing matches.
        let exists = self.value(owner, definition_id)?.is_some();
        if !exists {
            return Ok(false);
        }
        self.write(|catalog| {
            catalog
                .values
                .retain(|row| !(row.owner == owner && row.definition_id == *definition_id));
            Ok(true)
        })
    }

    fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        if self.staged.is_some() {
            return f(self);
        }

        self.staged = Some(self.backend.load_catalog()?);
        let outcome = f(self);
        let staged = self.staged.take();

        match outcome {
            Ok(value) => {
                if let Some(catalog) = staged {
                    if let Err(e) = self.backend.save_catalog(&catalog) {
                        tracing::warn!(error = %e, "transaction commit failed; changes discarded");
                        return Err(e);
                    }
                }
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(error = %e, "transaction rolled back");
                Err(e)
            }
        }
    }
}
