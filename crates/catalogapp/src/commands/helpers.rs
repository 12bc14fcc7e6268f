use super::Rejection;
use crate::attributes::{AttributeDefinition, AttributeValue};
use crate::error::{CatalogError, Result};
use crate::model::OwnerRef;
use crate::store::DataStore;

/// A lookup that can fail either way: `Err` for storage, `Ok(Err)` for bad input.
pub type Checked<T> = std::result::Result<T, Rejection>;

/// The definition for `key` and the owner's current row for it.
#[derive(Debug, Clone)]
pub struct Target {
    pub definition: AttributeDefinition,
    pub row: Option<AttributeValue>,
}

/// Resolve `(owner, key)` for a write: owner must exist, key must be defined.
pub fn target<S: DataStore>(store: &S, owner: OwnerRef, key: &str) -> Result<Checked<Target>> {
    if !store.owner_exists(owner)? {
        return Ok(Err(Rejection::UnknownOwner(owner)));
    }
    let Some(definition) = store.definition(key)? else {
        return Ok(Err(Rejection::UnknownAttribute(key.to_string())));
    };
    let row = store.value(owner, &definition.id)?;
    Ok(Ok(Target { definition, row }))
}

/// Like [`target`], also requiring the definition to apply to the owner's kind.
pub fn assignable_target<S: DataStore>(
    store: &S,
    owner: OwnerRef,
    key: &str,
) -> Result<Checked<Target>> {
    Ok(target(store, owner, key)?.and_then(|t| {
        if t.definition.applies_to.includes(owner.kind()) {
            Ok(t)
        } else {
            Err(Rejection::NotApplicable {
                key: key.to_string(),
                kind: owner.kind(),
            })
        }
    }))
}

/// Batch operations address one owner; a missing owner is a caller bug, not a
/// per-key failure.
pub fn require_owner<S: DataStore>(store: &S, owner: OwnerRef) -> Result<()> {
    if store.owner_exists(owner)? {
        Ok(())
    } else {
        Err(CatalogError::OwnerNotFound(owner))
    }
}

/// Definition keys for a set of rows, skipping rows whose definition is gone.
pub fn keyed_rows<S: DataStore>(
    store: &S,
    rows: Vec<AttributeValue>,
) -> Result<Vec<(AttributeDefinition, AttributeValue)>> {
    let mut keyed = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(definition) = store.definition_by_id(&row.definition_id)? {
            keyed.push((definition, row));
        }
    }
    keyed.sort_by(|(a, _), (b, _)| a.sort_order.cmp(&b.sort_order).then(a.key.cmp(&b.key)));
    Ok(keyed)
}
