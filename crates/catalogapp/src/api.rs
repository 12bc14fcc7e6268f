//! # API Facade
//!
//! A **thin facade** over the command layer and the resolver. Every client (the
//! `catalog` CLI, an importer, a web handler) goes through [`CatalogApi`].
//!
//! The facade:
//! - **Dispatches** to the matching command or resolver function
//! - **Normalizes inputs**: owner selectors become [`OwnerRef`]s
//! - **Applies configuration** defaults (cleanup action, reported channels)
//!
//! It holds no business logic and performs no terminal I/O.
//!
//! ## Owner Selectors
//!
//! | Selector | Meaning |
//! |----------|---------|
//! | `product:<sku or uuid>` | a product |
//! | `variant:<sku or uuid>` | a variant |
//! | `<sku or uuid>` | whichever owner has that SKU or id (products first) |
//!
//! ## Generic Over DataStore
//!
//! - Production: `CatalogApi<FileStore>`
//! - Testing: `CatalogApi<InMemoryStore>`

use crate::attributes::{AttributeDefinition, TypedValue, ValueSource};
use crate::commands::cleanup::{self, CleanupAction, CleanupReport};
use crate::commands::inherit::{self, InheritReport};
use crate::commands::refresh::{self, RefreshReport};
use crate::commands::set::{self, SyncReport};
use crate::commands::sync::{self, MarkSyncedReport, SyncStatusReport};
use crate::commands::validate::{self, ValidationReport};
use crate::commands::variants::{self, VariantBatch};
use crate::commands::{overrides, Outcome};
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::model::{Channel, OwnerKind, OwnerRef, Product, Variant};
use crate::resolver::{self, ResolutionPath};
use crate::store::DataStore;
use chrono::Utc;
use std::collections::BTreeMap;
use uuid::Uuid;

/// The main API facade for catalog attribute operations.
pub struct CatalogApi<S: DataStore> {
    store: S,
    config: CatalogConfig,
}

impl<S: DataStore> CatalogApi<S> {
    pub fn new(store: S, config: CatalogConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    // --- Schema and owners ---

    pub fn define_attribute(&mut self, definition: &AttributeDefinition) -> Result<()> {
        self.store.save_definition(definition)
    }

    pub fn definitions(&self) -> Result<Vec<AttributeDefinition>> {
        self.store.definitions()
    }

    pub fn add_product(&mut self, product: &Product) -> Result<()> {
        self.store.save_product(product)
    }

    pub fn add_variant(&mut self, variant: &Variant) -> Result<()> {
        self.store.save_variant(variant)
    }

    /// Delete an owner with all its rows (and, for a product, its variants).
    pub fn delete_owner(&mut self, selector: &str) -> Result<OwnerRef> {
        let owner = self.resolve_owner(selector)?;
        self.store.delete_owner(owner)?;
        Ok(owner)
    }

    /// Ids of every variant under the selected product.
    pub fn variant_ids(&self, product: &str) -> Result<Vec<Uuid>> {
        match self.resolve_owner(product)? {
            OwnerRef::Product(id) => Ok(self
                .store
                .variants_of(&id)?
                .into_iter()
                .map(|v| v.id)
                .collect()),
            OwnerRef::Variant(_) => Err(CatalogError::Api(format!(
                "'{}' is a variant, expected a product",
                product
            ))),
        }
    }

    // --- Reads ---

    pub fn get_value(&self, owner: &str, key: &str) -> Result<Option<TypedValue>> {
        let owner = self.resolve_owner(owner)?;
        resolver::effective_value(&self.store, owner, key)
    }

    /// The resolution path for `key`. Fails for unknown keys.
    pub fn explain(&self, owner: &str, key: &str) -> Result<ResolutionPath> {
        let owner = self.resolve_owner(owner)?;
        resolver::inheritance_path(&self.store, owner, key)?
            .ok_or_else(|| CatalogError::Api(format!("Unknown attribute '{}'", key)))
    }

    pub fn get_all(&self, owner: &str) -> Result<Vec<ResolutionPath>> {
        let owner = self.resolve_owner(owner)?;
        resolver::effective_attributes(&self.store, owner)
    }

    // --- Writes ---

    pub fn set_attribute(
        &mut self,
        owner: &str,
        key: &str,
        raw: &str,
        source: ValueSource,
    ) -> Result<Outcome> {
        let owner = self.resolve_owner(owner)?;
        set::set_attribute(&mut self.store, owner, key, raw, source)
    }

    pub fn set_attributes(
        &mut self,
        owner: &str,
        values: &BTreeMap<String, String>,
        source: ValueSource,
    ) -> Result<SyncReport> {
        let owner = self.resolve_owner(owner)?;
        set::set_attributes(&mut self.store, owner, values, source)
    }

    pub fn remove_attribute(&mut self, owner: &str, key: &str) -> Result<Outcome> {
        let owner = self.resolve_owner(owner)?;
        set::remove_attribute(&mut self.store, owner, key)
    }

    pub fn inherit_attribute(&mut self, owner: &str, key: &str) -> Result<Outcome> {
        let owner = self.resolve_owner(owner)?;
        inherit::inherit_attribute(&mut self.store, owner, key)
    }

    pub fn inherit_all(&mut self, owner: &str, force: bool) -> Result<InheritReport> {
        let owner = self.resolve_owner(owner)?;
        inherit::inherit_all_attributes(&mut self.store, owner, force)
    }

    pub fn bulk_inherit(&mut self, owner: &str, keys: &[String]) -> Result<InheritReport> {
        let owner = self.resolve_owner(owner)?;
        inherit::bulk_inherit_attributes(&mut self.store, owner, keys)
    }

    pub fn refresh(&mut self, owner: &str, keys: Option<&[String]>) -> Result<RefreshReport> {
        let owner = self.resolve_owner(owner)?;
        refresh::refresh_inheritance(&mut self.store, owner, keys)
    }

    pub fn override_attribute(&mut self, owner: &str, key: &str, raw: &str) -> Result<Outcome> {
        let owner = self.resolve_owner(owner)?;
        overrides::override_attribute(&mut self.store, owner, key, raw)
    }

    pub fn clear_override(&mut self, owner: &str, key: &str) -> Result<Outcome> {
        let owner = self.resolve_owner(owner)?;
        overrides::clear_attribute_override(&mut self.store, owner, key)
    }

    pub fn validate(&mut self, owner: &str) -> Result<ValidationReport> {
        let owner = self.resolve_owner(owner)?;
        validate::validate_all_attributes(&mut self.store, owner)
    }

    /// Clean up invalid rows; `None` uses the configured `cleanup_action`.
    pub fn cleanup(&mut self, owner: &str, action: Option<CleanupAction>) -> Result<CleanupReport> {
        let owner = self.resolve_owner(owner)?;
        let action = match action {
            Some(action) => action,
            None => self.config.cleanup_action()?,
        };
        cleanup::clean_up_invalid_attributes(&mut self.store, owner, action)
    }

    /// Sync status for one channel, or for every configured channel.
    pub fn sync_status(&self, owner: &str, channel: Option<Channel>) -> Result<SyncStatusReport> {
        let owner = self.resolve_owner(owner)?;
        let channels = match channel {
            Some(channel) => vec![channel],
            None => self.config.sync_channels(),
        };
        sync::attributes_sync_status(&self.store, owner, &channels)
    }

    pub fn mark_synced(
        &mut self,
        owner: &str,
        channel: Channel,
        keys: Option<&[String]>,
    ) -> Result<MarkSyncedReport> {
        let owner = self.resolve_owner(owner)?;
        sync::mark_attributes_synced(&mut self.store, owner, channel, keys, Utc::now())
    }

    // --- Variant batches ---

    pub fn inherit_for_variants<I: AsRef<str>>(
        &mut self,
        selectors: &[I],
        force: bool,
    ) -> Result<VariantBatch<InheritReport>> {
        let ids = self.variant_selectors(selectors)?;
        variants::inherit_for_variants(&mut self.store, &ids, force)
    }

    pub fn refresh_variants<I: AsRef<str>>(
        &mut self,
        selectors: &[I],
        keys: Option<&[String]>,
    ) -> Result<VariantBatch<RefreshReport>> {
        let ids = self.variant_selectors(selectors)?;
        variants::refresh_variants(&mut self.store, &ids, keys)
    }

    pub fn override_for_variants<I: AsRef<str>>(
        &mut self,
        selectors: &[I],
        key: &str,
        raw: &str,
    ) -> Result<VariantBatch<Outcome>> {
        let ids = self.variant_selectors(selectors)?;
        variants::override_for_variants(&mut self.store, &ids, key, raw)
    }

    // --- Selectors ---

    /// Turn an owner selector into an [`OwnerRef`] that exists in the store.
    pub fn resolve_owner(&self, selector: &str) -> Result<OwnerRef> {
        let (kind, needle) = parse_selector(selector);
        let found = match Uuid::parse_str(needle) {
            Ok(id) => self.owner_by_id(kind, id)?,
            Err(_) => self
                .store
                .find_by_sku(needle)?
                .filter(|owner| kind.map_or(true, |k| owner.kind() == k)),
        };
        found.ok_or_else(|| CatalogError::Api(format!("No owner matches '{}'", selector)))
    }

    fn owner_by_id(&self, kind: Option<OwnerKind>, id: Uuid) -> Result<Option<OwnerRef>> {
        let candidates = match kind {
            Some(OwnerKind::Product) => vec![OwnerRef::Product(id)],
            Some(OwnerKind::Variant) => vec![OwnerRef::Variant(id)],
            None => vec![OwnerRef::Product(id), OwnerRef::Variant(id)],
        };
        for owner in candidates {
            if self.store.owner_exists(owner)? {
                return Ok(Some(owner));
            }
        }
        Ok(None)
    }

    /// Variant ids for a batch. Bare UUIDs pass through unchecked so the batch
    /// can report them as unknown; SKUs must resolve to a variant.
    fn variant_selectors<I: AsRef<str>>(&self, selectors: &[I]) -> Result<Vec<Uuid>> {
        let mut ids = Vec::with_capacity(selectors.len());
        for selector in selectors {
            let selector = selector.as_ref();
            let (_, needle) = parse_selector(selector);
            if let Ok(id) = Uuid::parse_str(needle) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
                continue;
            }
            match self.resolve_owner(selector)? {
                OwnerRef::Variant(id) => {
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
                OwnerRef::Product(_) => {
                    return Err(CatalogError::Api(format!(
                        "'{}' is a product, expected a variant",
                        selector
                    )))
                }
            }
        }
        Ok(ids)
    }
}

/// Split an optional `product:` / `variant:` prefix off a selector.
pub fn parse_selector(selector: &str) -> (Option<OwnerKind>, &str) {
    let selector = selector.trim();
    if let Some(rest) = selector.strip_prefix("product:") {
        (Some(OwnerKind::Product), rest.trim())
    } else if let Some(rest) = selector.strip_prefix("variant:") {
        (Some(OwnerKind::Variant), rest.trim())
    } else {
        (None, selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{DataType, InheritanceStrategy};
    use crate::store::memory::InMemoryStore;

    fn api() -> (CatalogApi<InMemoryStore>, Product, Variant) {
        let mut api = CatalogApi::new(InMemoryStore::new(), CatalogConfig::default());
        api.define_attribute(
            &AttributeDefinition::new("light_filtering", DataType::Enum)
                .with_enum_values(["Blackout", "Sheer"])
                .inheritable(InheritanceStrategy::Always),
        )
        .unwrap();
        let product = Product::new("BLIND", "Roller blind");
        let variant = Variant::new(&product, "BLIND-60", "60 cm");
        api.add_product(&product).unwrap();
        api.add_variant(&variant).unwrap();
        (api, product, variant)
    }

    #[test]
    fn test_parse_selector() {
        assert_eq!(
            parse_selector("product:ABC"),
            (Some(OwnerKind::Product), "ABC")
        );
        assert_eq!(
            parse_selector(" variant: X-1 "),
            (Some(OwnerKind::Variant), "X-1")
        );
        assert_eq!(parse_selector("ABC"), (None, "ABC"));
    }

    #[test]
    fn test_resolve_owner_by_sku_and_uuid() {
        let (api, product, variant) = api();
        assert_eq!(api.resolve_owner("BLIND").unwrap(), product.owner());
        assert_eq!(api.resolve_owner("variant:BLIND-60").unwrap(), variant.owner());
        assert_eq!(
            api.resolve_owner(&variant.id.to_string()).unwrap(),
            variant.owner()
        );
        assert_eq!(
            api.resolve_owner(&format!("product:{}", product.id)).unwrap(),
            product.owner()
        );
    }

    #[test]
    fn test_resolve_owner_kind_mismatch_fails() {
        let (api, _, _) = api();
        assert!(api.resolve_owner("variant:BLIND").is_err());
        assert!(api.resolve_owner("NOPE").is_err());
    }

    #[test]
    fn test_scenario_through_api() {
        let (mut api, _, _) = api();
        api.set_attribute("BLIND", "light_filtering", "Blackout", ValueSource::Manual)
            .unwrap();
        assert_eq!(
            api.get_value("BLIND-60", "light_filtering").unwrap(),
            Some(TypedValue::Enum("Blackout".into()))
        );

        let outcome = api
            .override_attribute("BLIND-60", "light_filtering", "Sheer")
            .unwrap();
        assert!(outcome.is_success());
        assert_eq!(
            api.get_value("BLIND-60", "light_filtering").unwrap(),
            Some(TypedValue::Enum("Sheer".into()))
        );

        api.clear_override("BLIND-60", "light_filtering").unwrap();
        assert_eq!(
            api.get_value("BLIND-60", "light_filtering").unwrap(),
            Some(TypedValue::Enum("Blackout".into()))
        );
    }

    #[test]
    fn test_explain_unknown_key_is_error() {
        let (api, _, _) = api();
        assert!(matches!(
            api.explain("BLIND", "nope"),
            Err(CatalogError::Api(_))
        ));
    }

    #[test]
    fn test_cleanup_uses_configured_action() {
        let (mut api, _, _) = api();
        let report = api.cleanup("BLIND", None).unwrap();
        assert_eq!(report.action, CleanupAction::Report);
    }

    #[test]
    fn test_sync_status_uses_configured_channels() {
        let mut api = CatalogApi::new(
            InMemoryStore::new(),
            CatalogConfig {
                sync_channels: Some(vec![Channel::Ebay]),
                ..Default::default()
            },
        );
        api.define_attribute(
            &AttributeDefinition::new("title", DataType::String)
                .syncs_to(Channel::Ebay)
                .syncs_to(Channel::Shopify),
        )
        .unwrap();
        api.add_product(&Product::new("MUG", "Mug")).unwrap();

        let report = api.sync_status("MUG", None).unwrap();
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].channel, Channel::Ebay);

        let report = api.sync_status("MUG", Some(Channel::Shopify)).unwrap();
        assert_eq!(report.entries[0].channel, Channel::Shopify);
    }

    #[test]
    fn test_variant_batches_accept_skus_and_report_unknown_ids() {
        let (mut api, _, variant) = api();
        api.set_attribute("BLIND", "light_filtering", "Blackout", ValueSource::Manual)
            .unwrap();
        let ghost = Uuid::new_v4().to_string();

        let batch = api
            .inherit_for_variants(&["BLIND-60", ghost.as_str()], false)
            .unwrap();
        assert_eq!(batch.unknown.len(), 1);
        assert_eq!(batch.results[&variant.id].inherited, vec!["light_filtering"]);

        assert!(api.inherit_for_variants(&["BLIND"], false).is_err());
        assert_eq!(api.variant_ids("BLIND").unwrap(), vec![variant.id]);
    }

    #[test]
    fn test_delete_product_cascades() {
        let (mut api, _, _) = api();
        api.set_attribute("BLIND", "light_filtering", "Sheer", ValueSource::Manual)
            .unwrap();
        api.delete_owner("BLIND").unwrap();
        assert!(api.resolve_owner("BLIND-60").is_err());
        assert!(api.store().snapshot().unwrap().values.is_empty());
    }
}
