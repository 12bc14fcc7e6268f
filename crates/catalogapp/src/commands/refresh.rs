//! Bring materialized copies back in line with their parent.
//!
//! Inherited rows are snapshots; nothing updates them behind the caller's back.
//! [`refresh_inheritance`] is the only place they follow the parent again.

use super::helpers::{keyed_rows, require_owner};
use crate::error::Result;
use crate::model::OwnerRef;
use crate::store::DataStore;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshedValue {
    pub key: String,
    pub old: String,
    pub new: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefreshReport {
    pub updated: Vec<RefreshedValue>,
    /// Copies deleted because the parent no longer has the attribute
    pub removed: Vec<String>,
    pub unchanged: Vec<String>,
    pub errors: BTreeMap<String, String>,
}

impl RefreshReport {
    pub fn changed(&self) -> usize {
        self.updated.len() + self.removed.len()
    }
}

/// Re-sync the owner's inherited rows with the parent.
///
/// `keys` restricts the refresh; `None` covers every inherited row. Explicit and
/// override rows are never touched.
#[tracing::instrument(skip(store))]
pub fn refresh_inheritance<S: DataStore>(
    store: &mut S,
    owner: OwnerRef,
    keys: Option<&[String]>,
) -> Result<RefreshReport> {
    store.transaction(|store| {
        require_owner(store, owner)?;
        let mut report = RefreshReport::default();

        if let Some(keys) = keys {
            for key in keys {
                if store.definition(key)?.is_none() {
                    report
                        .errors
                        .insert(key.clone(), format!("unknown attribute '{}'", key));
                }
            }
        }

        let parent = store.parent_of(owner)?;
        let inherited = store
            .values(owner)?
            .into_iter()
            .filter(|row| row.is_inherited)
            .collect();

        for (definition, mut row) in keyed_rows(store, inherited)? {
            let key = definition.key.clone();
            if keys.is_some_and(|keys| !keys.contains(&key)) {
                continue;
            }

            let parent_row = match parent {
                Some(parent) => store.value(parent, &definition.id)?,
                None => None,
            };
            let Some(parent_row) = parent_row else {
                store.delete_value(owner, &definition.id)?;
                debug!(%owner, %key, "parent value gone; inherited copy removed");
                report.removed.push(key);
                continue;
            };

            if parent_row.raw == row.raw {
                report.unchanged.push(key);
                continue;
            }

            let old = row.raw.clone();
            match row.inherit_from(&definition, &parent_row) {
                Ok(_) => {
                    store.save_value(&row)?;
                    debug!(%owner, %key, %old, new = %row.raw, "inherited copy refreshed");
                    report.updated.push(RefreshedValue {
                        key,
                        old,
                        new: row.raw,
                    });
                }
                Err(err) => {
                    report.errors.insert(key, err.to_string());
                }
            }
        }

        info!(
            updated = report.updated.len(),
            removed = report.removed.len(),
            unchanged = report.unchanged.len(),
            "refresh finished"
        );
        Ok(report)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{AttributeDefinition, DataType, InheritanceStrategy, TypedValue};
    use crate::model::Variant;
    use crate::resolver::effective_value;
    use crate::store::memory::fixtures::CatalogFixture;

    fn setup() -> (CatalogFixture, OwnerRef, Variant) {
        let mut fx = CatalogFixture::new();
        for key in ["material", "finish", "care"] {
            fx.define(
                AttributeDefinition::new(key, DataType::String)
                    .inheritable(InheritanceStrategy::Fallback),
            );
        }
        let product = fx.product("DESK");
        let variant = fx.variant(&product, "DESK-120");
        for key in ["material", "finish", "care"] {
            fx.set(product.owner(), key, "original");
            fx.inherit(&variant, key);
        }
        (fx, product.owner(), variant)
    }

    #[test]
    fn refresh_propagates_updates_and_deletes() {
        let (mut fx, product, variant) = setup();
        fx.set(product, "material", "steel");
        let care = fx.store.definition("care").unwrap().unwrap();
        fx.store.delete_value(product, &care.id).unwrap();

        let report = refresh_inheritance(&mut fx.store, variant.owner(), None).unwrap();

        assert_eq!(
            report.updated,
            vec![RefreshedValue {
                key: "material".into(),
                old: "original".into(),
                new: "steel".into(),
            }]
        );
        assert_eq!(report.removed, vec!["care"]);
        assert_eq!(report.unchanged, vec!["finish"]);
        assert_eq!(report.changed(), 2);

        assert_eq!(
            effective_value(&fx.store, variant.owner(), "material").unwrap(),
            Some(TypedValue::String("steel".into()))
        );
        assert!(fx.row(variant.owner(), "care").is_none());
    }

    #[test]
    fn refresh_leaves_explicit_rows_alone() {
        let (mut fx, product, variant) = setup();
        fx.set_override(variant.owner(), "finish", "matte");
        fx.set(product, "finish", "gloss");

        let report = refresh_inheritance(&mut fx.store, variant.owner(), None).unwrap();

        assert!(report.updated.is_empty());
        assert_eq!(fx.row(variant.owner(), "finish").unwrap().raw, "matte");
    }

    #[test]
    fn refresh_restricted_to_keys() {
        let (mut fx, product, variant) = setup();
        fx.set(product, "material", "steel");
        fx.set(product, "finish", "gloss");

        let keys = vec!["finish".to_string(), "bogus".to_string()];
        let report =
            refresh_inheritance(&mut fx.store, variant.owner(), Some(keys.as_slice())).unwrap();

        assert_eq!(report.updated.len(), 1);
        assert_eq!(report.updated[0].key, "finish");
        assert!(report.errors.contains_key("bogus"));
        assert_eq!(fx.row(variant.owner(), "material").unwrap().raw, "original");
    }

    #[test]
    fn reads_never_refresh() {
        let (mut fx, product, variant) = setup();
        fx.set(product, "material", "steel");

        for _ in 0..3 {
            effective_value(&fx.store, variant.owner(), "material").unwrap();
        }
        assert_eq!(fx.row(variant.owner(), "material").unwrap().raw, "original");
    }

    #[test]
    fn refresh_with_nothing_to_do_is_empty() {
        let (mut fx, _, variant) = setup();
        let report = refresh_inheritance(&mut fx.store, variant.owner(), None).unwrap();
        assert_eq!(report.changed(), 0);
        assert_eq!(report.unchanged.len(), 3);
    }
}
