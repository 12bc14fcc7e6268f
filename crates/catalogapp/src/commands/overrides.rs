//! Overrides: a value the owner holds on purpose, in place of what the parent
//! would offer. Clearing one hands the key back to inheritance when possible.

use super::helpers::{assignable_target, target, Target};
use super::{Outcome, Rejection};
use crate::attributes::AttributeValue;
use crate::error::Result;
use crate::model::OwnerRef;
use crate::store::DataStore;
use tracing::debug;

/// Set an override for `key`, creating the row if needed.
///
/// Replaces whatever the owner held before (explicit or inherited). Invalid
/// values are rejected and nothing is written.
pub fn override_attribute<S: DataStore>(
    store: &mut S,
    owner: OwnerRef,
    key: &str,
    raw: &str,
) -> Result<Outcome> {
    let Target { definition, row } = match assignable_target(store, owner, key)? {
        Ok(target) => target,
        Err(rejection) => return Ok(rejection.into()),
    };

    let before = row.clone();
    let mut row = row.unwrap_or_else(|| AttributeValue::new(owner, &definition));
    if let Err(errors) = row.override_value(&definition, raw) {
        debug!(%owner, key, ?errors, "override rejected");
        return Ok(Rejection::Invalid(errors).into());
    }

    match before {
        Some(before) if before == row => Ok(Outcome::Unchanged(row)),
        before => {
            store.save_value(&row)?;
            debug!(%owner, key, raw = %row.raw, "override set");
            Ok(if before.is_some() {
                Outcome::Updated(row)
            } else {
                Outcome::Created(row)
            })
        }
    }
}

/// Drop the override on `key`.
///
/// When the parent still holds the attribute and it is inheritable, the row is
/// re-materialized as an inherited copy (`Reverted`); otherwise it is deleted.
pub fn clear_attribute_override<S: DataStore>(
    store: &mut S,
    owner: OwnerRef,
    key: &str,
) -> Result<Outcome> {
    let Target { definition, row } = match target(store, owner, key)? {
        Ok(target) => target,
        Err(rejection) => return Ok(rejection.into()),
    };
    let Some(mut row) = row.filter(|row| row.is_override) else {
        return Ok(Rejection::NotOverridden(key.to_string()).into());
    };

    let parent_row = match store.parent_of(owner)? {
        Some(parent) if definition.supports_inheritance() => {
            store.value(parent, &definition.id)?
        }
        _ => None,
    };

    if let Some(parent_row) = parent_row {
        if row.inherit_from(&definition, &parent_row).is_ok() {
            store.save_value(&row)?;
            debug!(%owner, key, raw = %row.raw, "override cleared; inherited again");
            return Ok(Outcome::Reverted(row));
        }
    }

    store.delete_value(owner, &definition.id)?;
    debug!(%owner, key, "override cleared; row removed");
    Ok(Outcome::Removed)
}
