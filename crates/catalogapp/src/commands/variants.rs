//! Batch operations over an explicit list of variants.
//!
//! Callers pass the ids they want touched; nothing is remembered between calls.
//! Every batch runs in one transaction. Unknown ids are listed in the result
//! rather than aborting the batch.

use super::inherit::{inherit_all_attributes, InheritReport};
use super::overrides::override_attribute;
use super::refresh::{refresh_inheritance, RefreshReport};
use super::Outcome;
use crate::error::Result;
use crate::model::OwnerRef;
use crate::store::DataStore;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantBatch<T> {
    pub results: BTreeMap<Uuid, T>,
    pub unknown: Vec<Uuid>,
}

impl<T> Default for VariantBatch<T> {
    fn default() -> Self {
        Self {
            results: BTreeMap::new(),
            unknown: Vec::new(),
        }
    }
}

fn for_each_variant<S, T, F>(store: &mut S, ids: &[Uuid], mut op: F) -> Result<VariantBatch<T>>
where
    S: DataStore,
    F: FnMut(&mut S, OwnerRef) -> Result<T>,
{
    store.transaction(|store| {
        let mut batch = VariantBatch::default();
        for id in ids {
            if store.variant(id)?.is_none() {
                batch.unknown.push(*id);
                continue;
            }
            let result = op(store, OwnerRef::Variant(*id))?;
            batch.results.insert(*id, result);
        }
        info!(
            processed = batch.results.len(),
            unknown = batch.unknown.len(),
            "variant batch finished"
        );
        Ok(batch)
    })
}

#[tracing::instrument(skip(store, ids), fields(variants = ids.len()))]
pub fn inherit_for_variants<S: DataStore>(
    store: &mut S,
    ids: &[Uuid],
    force: bool,
) -> Result<VariantBatch<InheritReport>> {
    for_each_variant(store, ids, |store, owner| {
        inherit_all_attributes(store, owner, force)
    })
}

#[tracing::instrument(skip(store, ids), fields(variants = ids.len()))]
pub fn refresh_variants<S: DataStore>(
    store: &mut S,
    ids: &[Uuid],
    keys: Option<&[String]>,
) -> Result<VariantBatch<RefreshReport>> {
    for_each_variant(store, ids, |store, owner| {
        refresh_inheritance(store, owner, keys)
    })
}

#[tracing::instrument(skip(store, ids), fields(variants = ids.len()))]
pub fn override_for_variants<S: DataStore>(
    store: &mut S,
    ids: &[Uuid],
    key: &str,
    raw: &str,
) -> Result<VariantBatch<Outcome>> {
    for_each_variant(store, ids, |store, owner| {
        override_attribute(store, owner, key, raw)
    })
}
