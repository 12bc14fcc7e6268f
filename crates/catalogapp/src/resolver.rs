//! # Resolver: Effective Attribute Values
//!
//! Computes the value an owner effectively has for an attribute key. Resolution
//! is a pure read: it never creates, updates or deletes rows, and in particular
//! never refreshes stale inherited copies (that is `refresh_inheritance`'s job,
//! and only when explicitly asked).
//!
//! ## Precedence
//!
//! First match wins:
//!
//! 1. **Explicit**: a non-inherited row on the owner (manual, imported or
//!    override).
//! 2. **Inherited**: a materialized inherited row on the owner. This is a
//!    snapshot taken when it was inherited, not the parent's live value.
//! 3. **Parent**: when the definition supports inheritance (`fallback` or
//!    `always`) and the owner's parent has its own row, the parent's value,
//!    computed at read time.
//! 4. **Default**: the definition's `default_value`, cast.
//! 5. **Null**: nothing applies.
//!
//! Explicit and inherited rows win even under `always`; the strategy only
//! decides whether the parent is consulted at all.
//!
//! A row whose raw value no longer casts under the current definition does not
//! match its level; resolution moves on and the path records why.
//!
//! [`effective_value`] and [`inheritance_path`] share one implementation, so the
//! diagnostic path can never disagree with the value.

use crate::attributes::{AttributeDefinition, AttributeValue, TypedValue, ValueSource};
use crate::error::Result;
use crate::model::OwnerRef;
use crate::store::DataStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionLevel {
    Explicit,
    Inherited,
    Parent,
    Default,
    Null,
}

impl std::fmt::Display for ResolutionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResolutionLevel::Explicit => "explicit",
            ResolutionLevel::Inherited => "inherited",
            ResolutionLevel::Parent => "parent",
            ResolutionLevel::Default => "default",
            ResolutionLevel::Null => "null",
        };
        f.write_str(name)
    }
}

/// Where a matched value came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    OwnRow {
        row_id: Uuid,
        source: ValueSource,
        is_override: bool,
    },
    InheritedRow {
        row_id: Uuid,
        inherited_at: Option<DateTime<Utc>>,
    },
    ParentRow {
        parent: OwnerRef,
        row_id: Uuid,
    },
    SchemaDefault,
}

/// One level visited during resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionStep {
    pub level: ResolutionLevel,
    pub matched: bool,
    pub value: Option<TypedValue>,
    pub provenance: Option<Provenance>,
    /// Why the level did not match
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionPath {
    pub owner: OwnerRef,
    pub key: String,
    pub steps: Vec<ResolutionStep>,
    pub resolved_by: ResolutionLevel,
    pub value: Option<TypedValue>,
}

impl ResolutionPath {
    fn start(owner: OwnerRef, key: &str) -> Self {
        Self {
            owner,
            key: key.to_string(),
            steps: Vec::new(),
            resolved_by: ResolutionLevel::Null,
            value: None,
        }
    }

    fn miss(&mut self, level: ResolutionLevel, note: impl Into<String>) {
        self.steps.push(ResolutionStep {
            level,
            matched: false,
            value: None,
            provenance: None,
            note: Some(note.into()),
        });
    }

    fn hit(mut self, level: ResolutionLevel, value: TypedValue, provenance: Provenance) -> Self {
        self.steps.push(ResolutionStep {
            level,
            matched: true,
            value: Some(value.clone()),
            provenance: Some(provenance),
            note: None,
        });
        self.resolved_by = level;
        self.value = Some(value);
        self
    }

    fn unresolved(mut self) -> Self {
        self.steps.push(ResolutionStep {
            level: ResolutionLevel::Null,
            matched: true,
            value: None,
            provenance: None,
            note: None,
        });
        self.resolved_by = ResolutionLevel::Null;
        self
    }
}

/// The effective typed value of `key` on `owner`.
///
/// `Ok(None)` both for unknown keys and for attributes that resolve to null.
pub fn effective_value<S: DataStore>(
    store: &S,
    owner: OwnerRef,
    key: &str,
) -> Result<Option<TypedValue>> {
    Ok(inheritance_path(store, owner, key)?.and_then(|path| path.value))
}

/// Resolve `key` on `owner`, recording every level visited.
///
/// `Ok(None)` when no definition exists for `key`.
pub fn inheritance_path<S: DataStore>(
    store: &S,
    owner: OwnerRef,
    key: &str,
) -> Result<Option<ResolutionPath>> {
    let Some(definition) = store.definition(key)? else {
        return Ok(None);
    };
    resolve(store, owner, &definition).map(Some)
}

/// Resolution paths for every attribute that applies to the owner's kind, in
/// definition order.
pub fn effective_attributes<S: DataStore>(
    store: &S,
    owner: OwnerRef,
) -> Result<Vec<ResolutionPath>> {
    store
        .definitions()?
        .iter()
        .filter(|d| d.applies_to.includes(owner.kind()))
        .map(|d| resolve(store, owner, d))
        .collect()
}

pub(crate) fn resolve<S: DataStore>(
    store: &S,
    owner: OwnerRef,
    definition: &AttributeDefinition,
) -> Result<ResolutionPath> {
    use ResolutionLevel::*;

    let mut path = ResolutionPath::start(owner, &definition.key);
    let own = store.value(owner, &definition.id)?;

    // 1. Explicit row
    match own.as_ref().filter(|row| row.is_explicit()) {
        Some(row) => match row.typed_value(definition) {
            Some(value) => return Ok(path.hit(Explicit, value, own_provenance(row))),
            None => path.miss(Explicit, "stored value fails validation"),
        },
        None => path.miss(Explicit, "no explicit value"),
    }

    // 2. Materialized inherited row
    match own.as_ref().filter(|row| row.is_inherited) {
        Some(row) => match row.typed_value(definition) {
            Some(value) => {
                let provenance = Provenance::InheritedRow {
                    row_id: row.id,
                    inherited_at: row.inherited_at,
                };
                return Ok(path.hit(Inherited, value, provenance));
            }
            None => path.miss(Inherited, "inherited copy fails validation"),
        },
        None => path.miss(Inherited, "no inherited copy"),
    }

    // 3. Parent's own row, read live
    if !definition.supports_inheritance() {
        path.miss(Parent, "attribute is not inherited");
    } else {
        match store.parent_of(owner)? {
            None => path.miss(Parent, "no parent"),
            Some(parent) => match store.value(parent, &definition.id)? {
                None => path.miss(Parent, "parent has no value"),
                Some(row) => match row.typed_value(definition) {
                    Some(value) => {
                        let provenance = Provenance::ParentRow {
                            parent,
                            row_id: row.id,
                        };
                        return Ok(path.hit(Parent, value, provenance));
                    }
                    None => path.miss(Parent, "parent value fails validation"),
                },
            },
        }
    }

    // 4. Schema default
    match (&definition.default_value, definition.typed_default()) {
        (_, Some(value)) => return Ok(path.hit(Default, value, Provenance::SchemaDefault)),
        (Some(_), None) => path.miss(Default, "default fails validation"),
        (None, None) => path.miss(Default, "no default"),
    }

    // 5. Null
    Ok(path.unresolved())
}

fn own_provenance(row: &AttributeValue) -> Provenance {
    Provenance::OwnRow {
        row_id: row.id,
        source: row.source,
        is_override: row.is_override,
    }
}
