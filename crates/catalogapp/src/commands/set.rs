//! Explicit assignment: the values a merchant types in or an import delivers.

use super::helpers::{assignable_target, require_owner, target, Target};
use super::{Outcome, Rejection};
use crate::attributes::{AttributeValue, ValueSource};
use crate::error::Result;
use crate::model::OwnerRef;
use crate::store::DataStore;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Summary of a multi-key assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    pub errors: BTreeMap<String, String>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Store an explicit value for `key` on `owner`.
///
/// An invalid value is rejected with its validation errors and the stored row
/// (if any) is left exactly as it was.
pub fn set_attribute<S: DataStore>(
    store: &mut S,
    owner: OwnerRef,
    key: &str,
    raw: &str,
    source: ValueSource,
) -> Result<Outcome> {
    let Target { definition, row } = match assignable_target(store, owner, key)? {
        Ok(target) => target,
        Err(rejection) => return Ok(rejection.into()),
    };

    let existed = row.is_some();
    let before = row.clone();
    let mut row = row.unwrap_or_else(|| AttributeValue::new(owner, &definition));

    if let Err(errors) = row.set_value_from(&definition, raw, source) {
        debug!(%owner, key, ?errors, "rejected value");
        return Ok(Rejection::Invalid(errors).into());
    }

    if before.as_ref() == Some(&row) {
        return Ok(Outcome::Unchanged(row));
    }

    store.save_value(&row)?;
    debug!(%owner, key, raw = %row.raw, "value set");
    Ok(if existed {
        Outcome::Updated(row)
    } else {
        Outcome::Created(row)
    })
}

/// Assign several keys at once. Per-key failures are collected, not raised.
#[tracing::instrument(skip(store, values), fields(keys = values.len()))]
pub fn set_attributes<S: DataStore>(
    store: &mut S,
    owner: OwnerRef,
    values: &BTreeMap<String, String>,
    source: ValueSource,
) -> Result<SyncReport> {
    store.transaction(|store| {
        require_owner(store, owner)?;
        let mut report = SyncReport::default();

        for (key, raw) in values {
            match set_attribute(store, owner, key, raw, source)? {
                Outcome::Created(_) => report.created.push(key.clone()),
                Outcome::Updated(_) => report.updated.push(key.clone()),
                Outcome::Rejected(rejection) => {
                    report.errors.insert(key.clone(), rejection.to_string());
                }
                _ => report.unchanged.push(key.clone()),
            }
        }

        info!(
            created = report.created.len(),
            updated = report.updated.len(),
            errors = report.errors.len(),
            "attributes assigned"
        );
        Ok(report)
    })
}

/// Delete whatever row `owner` holds for `key` (explicit, inherited or override).
pub fn remove_attribute<S: DataStore>(
    store: &mut S,
    owner: OwnerRef,
    key: &str,
) -> Result<Outcome> {
    let Target { definition, row } = match target(store, owner, key)? {
        Ok(target) => target,
        Err(rejection) => return Ok(rejection.into()),
    };
    if row.is_none() {
        return Ok(Rejection::NoValue(key.to_string()).into());
    }
    store.delete_value(owner, &definition.id)?;
    debug!(%owner, key, "value removed");
    Ok(Outcome::Removed)
}
