//! Channel sync bookkeeping.
//!
//! The engine does not talk to sales channels. It only tracks, per row and per
//! channel, when a value was last pushed, and compares that stamp against the
//! row's `updated_at` to tell which attributes need pushing again.

use super::helpers::require_owner;
use crate::attributes::TypedValue;
use crate::error::Result;
use crate::model::{Channel, OwnerRef};
use crate::resolver::{resolve, ResolutionLevel};
use crate::store::DataStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Pushed since the last change
    Synced,
    NeverSynced,
    /// Changed after the last push
    Stale,
    /// Stored value fails validation
    Invalid,
    /// Nothing resolves for this attribute
    Missing,
}

impl SyncState {
    /// Whether the attribute can be pushed as-is.
    pub fn is_pushable(&self) -> bool {
        !matches!(self, SyncState::Invalid | SyncState::Missing)
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncState::Synced => "synced",
            SyncState::NeverSynced => "never synced",
            SyncState::Stale => "stale",
            SyncState::Invalid => "invalid",
            SyncState::Missing => "missing",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeSyncStatus {
    pub key: String,
    pub channel: Channel,
    pub state: SyncState,
    pub value: Option<TypedValue>,
    pub resolved_by: ResolutionLevel,
    pub required: bool,
    pub last_synced_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncStatusReport {
    pub owner: OwnerRef,
    pub entries: Vec<AttributeSyncStatus>,
}

impl SyncStatusReport {
    /// No required attribute is missing or invalid on any channel.
    pub fn ready(&self) -> bool {
        self.entries
            .iter()
            .filter(|e| e.required)
            .all(|e| e.state.is_pushable())
    }

    pub fn in_state(&self, state: SyncState) -> Vec<&AttributeSyncStatus> {
        self.entries.iter().filter(|e| e.state == state).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkSyncedReport {
    pub marked: Vec<String>,
    pub skipped: BTreeMap<String, String>,
}

/// Per-attribute readiness of `owner` for each of `channels`.
///
/// Only attributes that apply to the owner's kind and sync to the channel are
/// listed. Values supplied by the parent or a default have no row of their own
/// to stamp, so they report `never_synced`.
///
/// `invalid` covers rows still flagged `is_valid = false` even when their raw
/// value casts under the current definition (the resolver already serves such
/// values). The flag clears on the next `validate_all_attributes`.
pub fn attributes_sync_status<S: DataStore>(
    store: &S,
    owner: OwnerRef,
    channels: &[Channel],
) -> Result<SyncStatusReport> {
    require_owner(store, owner)?;
    let mut entries = Vec::new();

    for definition in store.definitions()? {
        if !definition.applies_to.includes(owner.kind()) {
            continue;
        }
        let wanted: Vec<Channel> = channels
            .iter()
            .copied()
            .filter(|c| definition.syncs_to_channel(*c))
            .collect();
        if wanted.is_empty() {
            continue;
        }

        let path = resolve(store, owner, &definition)?;
        let row = store.value(owner, &definition.id)?;
        let row_invalid = row
            .as_ref()
            .is_some_and(|r| !r.is_valid || r.typed_value(&definition).is_none());

        for channel in wanted {
            let last_synced_at = row.as_ref().and_then(|r| r.last_synced(channel));
            let state = if row_invalid {
                SyncState::Invalid
            } else if path.value.is_none() {
                SyncState::Missing
            } else {
                match (&row, last_synced_at) {
                    (Some(row), Some(at)) if row.updated_at > at => SyncState::Stale,
                    (Some(_), Some(_)) => SyncState::Synced,
                    _ => SyncState::NeverSynced,
                }
            };
            entries.push(AttributeSyncStatus {
                key: definition.key.clone(),
                channel,
                state,
                value: path.value.clone(),
                resolved_by: path.resolved_by,
                required: definition.is_required,
                last_synced_at,
            });
        }
    }

    Ok(SyncStatusReport { owner, entries })
}

/// Stamp the owner's rows as pushed to `channel` at `at`.
///
/// `keys` restricts the stamp; `None` stamps every row that syncs to the
/// channel. Invalid rows are never stamped.
#[tracing::instrument(skip(store))]
pub fn mark_attributes_synced<S: DataStore>(
    store: &mut S,
    owner: OwnerRef,
    channel: Channel,
    keys: Option<&[String]>,
    at: DateTime<Utc>,
) -> Result<MarkSyncedReport> {
    store.transaction(|store| {
        require_owner(store, owner)?;
        let mut report = MarkSyncedReport::default();

        let candidates: Vec<String> = match keys {
            Some(keys) => keys.to_vec(),
            None => store
                .definitions()?
                .into_iter()
                .filter(|d| d.syncs_to_channel(channel))
                .map(|d| d.key)
                .collect(),
        };

        for key in candidates {
            let Some(definition) = store.definition(&key)? else {
                report.skipped.insert(key, "unknown attribute".to_string());
                continue;
            };
            if !definition.syncs_to_channel(channel) {
                report
                    .skipped
                    .insert(key, format!("not synced to {}", channel));
                continue;
            }
            let Some(mut row) = store.value(owner, &definition.id)? else {
                if keys.is_some() {
                    report.skipped.insert(key, "no value on owner".to_string());
                }
                continue;
            };
            if !row.is_valid {
                report.skipped.insert(key, "invalid value".to_string());
                continue;
            }
            row.mark_synced(channel, at);
            store.save_value(&row)?;
            debug!(%owner, %key, %channel, "marked synced");
            report.marked.push(key);
        }

        info!(
            %channel,
            marked = report.marked.len(),
            skipped = report.skipped.len(),
            "sync stamps written"
        );
        Ok(report)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{
        AttributeDefinition, AttributeValue, DataType, InheritanceStrategy, TypedValue,
    };
    use crate::commands::validate::validate_all_attributes;
    use crate::model::Variant;
    use crate::store::memory::fixtures::CatalogFixture;
    use chrono::Duration;

    fn setup() -> (CatalogFixture, OwnerRef, Variant) {
        let mut fx = CatalogFixture::new();
        fx.define(
            AttributeDefinition::new("title", DataType::String)
                .syncs_to(Channel::Shopify)
                .syncs_to(Channel::Ebay)
                .required()
                .sort_order(0),
        );
        fx.define(
            AttributeDefinition::new("material", DataType::String)
                .syncs_to(Channel::Shopify)
                .inheritable(InheritanceStrategy::Fallback)
                .sort_order(1),
        );
        fx.define(
            AttributeDefinition::new("internal_note", DataType::String).sort_order(2),
        );
        let product = fx.product("LAMP");
        let variant = fx.variant(&product, "LAMP-BRASS");
        (fx, product.owner(), variant)
    }

    #[test]
    fn status_lists_only_synced_attributes() {
        let (mut fx, product, _) = setup();
        fx.set(product, "title", "Brass lamp");
        fx.set(product, "internal_note", "n/a");

        let report = attributes_sync_status(&fx.store, product, &Channel::ALL).unwrap();

        let keys: Vec<_> = report
            .entries
            .iter()
            .map(|e| (e.key.as_str(), e.channel))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("title", Channel::Ebay),
                ("title", Channel::Shopify),
                ("material", Channel::Shopify),
            ]
        );
    }

    #[test]
    fn never_synced_then_synced_then_stale() {
        let (mut fx, product, _) = setup();
        fx.set(product, "title", "Brass lamp");

        let status = attributes_sync_status(&fx.store, product, &[Channel::Shopify]).unwrap();
        assert_eq!(status.entries[0].state, SyncState::NeverSynced);

        let later = Utc::now() + Duration::seconds(5);
        let marked =
            mark_attributes_synced(&mut fx.store, product, Channel::Shopify, None, later).unwrap();
        assert_eq!(marked.marked, vec!["title"]);

        let status = attributes_sync_status(&fx.store, product, &[Channel::Shopify]).unwrap();
        assert_eq!(status.entries[0].state, SyncState::Synced);
        assert_eq!(status.entries[0].last_synced_at, Some(later));

        let mut row = fx.row(product, "title").unwrap();
        row.raw = "Brushed brass lamp".into();
        row.updated_at = later + Duration::seconds(1);
        fx.put_raw(row);

        let status = attributes_sync_status(&fx.store, product, &[Channel::Shopify]).unwrap();
        assert_eq!(status.entries[0].state, SyncState::Stale);
    }

    #[test]
    fn missing_and_invalid_block_readiness() {
        let (mut fx, product, _) = setup();

        let status = attributes_sync_status(&fx.store, product, &[Channel::Ebay]).unwrap();
        assert_eq!(status.entries[0].state, SyncState::Missing);
        assert!(!status.ready());

        let def = fx.store.definition("title").unwrap().unwrap();
        let mut row = AttributeValue::new(product, &def);
        row.raw = "Lamp".into();
        row.is_valid = false;
        fx.put_raw(row);

        let status = attributes_sync_status(&fx.store, product, &[Channel::Ebay]).unwrap();
        assert_eq!(status.in_state(SyncState::Invalid).len(), 1);
        assert!(!status.ready());
    }

    #[test]
    fn flagged_row_is_invalid_until_revalidated() {
        let (mut fx, product, _) = setup();
        let def = fx.store.definition("title").unwrap().unwrap();
        let mut row = AttributeValue::new(product, &def);
        row.raw = "Lamp".into();
        row.is_valid = false;
        fx.put_raw(row);

        let status = attributes_sync_status(&fx.store, product, &[Channel::Ebay]).unwrap();
        assert_eq!(status.entries[0].state, SyncState::Invalid);
        assert_eq!(status.entries[0].value, Some(TypedValue::String("Lamp".into())));
        assert_eq!(status.entries[0].resolved_by, ResolutionLevel::Explicit);

        validate_all_attributes(&mut fx.store, product).unwrap();

        let status = attributes_sync_status(&fx.store, product, &[Channel::Ebay]).unwrap();
        assert_eq!(status.entries[0].state, SyncState::NeverSynced);
        assert!(status.ready());
    }

    #[test]
    fn parent_supplied_value_is_never_synced() {
        let (mut fx, product, variant) = setup();
        fx.set(product, "material", "brass");

        let status =
            attributes_sync_status(&fx.store, variant.owner(), &[Channel::Shopify]).unwrap();
        let material = status.entries.iter().find(|e| e.key == "material").unwrap();
        assert_eq!(material.state, SyncState::NeverSynced);
        assert_eq!(material.resolved_by, ResolutionLevel::Parent);
    }

    #[test]
    fn mark_synced_reports_skips() {
        let (mut fx, product, _) = setup();
        fx.set(product, "internal_note", "n/a");
        let keys = vec![
            "title".to_string(),
            "internal_note".to_string(),
            "bogus".to_string(),
        ];

        let report = mark_attributes_synced(
            &mut fx.store,
            product,
            Channel::Shopify,
            Some(keys.as_slice()),
            Utc::now(),
        )
        .unwrap();

        assert!(report.marked.is_empty());
        assert_eq!(report.skipped["title"], "no value on owner");
        assert_eq!(report.skipped["internal_note"], "not synced to shopify");
        assert_eq!(report.skipped["bogus"], "unknown attribute");
    }
}
