//! Materialized inheritance: copy a product's value onto its variant as the
//! variant's own row, so later changes to the product do not leak through until
//! the copy is refreshed.

use super::helpers::{require_owner, target, Target};
use super::{Outcome, Rejection};
use crate::attributes::{check_inheritance, AttributeValue, InheritanceError};
use crate::error::Result;
use crate::model::{OwnerKind, OwnerRef};
use crate::store::DataStore;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

/// Why a key was left alone by a batch inherit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadyInherited,
    ExplicitlySet,
    ParentMissing,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::AlreadyInherited => "already inherited",
            SkipReason::ExplicitlySet => "explicitly set",
            SkipReason::ParentMissing => "product does not have this attribute",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub key: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InheritReport {
    pub inherited: Vec<String>,
    pub skipped: Vec<Skipped>,
    pub errors: BTreeMap<String, String>,
}

impl InheritReport {
    fn skip(&mut self, key: &str, reason: SkipReason) {
        self.skipped.push(Skipped {
            key: key.to_string(),
            reason,
        });
    }

    pub fn skipped_because(&self, reason: SkipReason) -> Vec<&str> {
        self.skipped
            .iter()
            .filter(|s| s.reason == reason)
            .map(|s| s.key.as_str())
            .collect()
    }
}

/// Copy the parent's current value for `key` onto `owner`.
///
/// Creates the row or converts the existing one into an inherited copy.
/// Idempotent: inheriting the same parent value twice reports `Unchanged` and
/// keeps the original `inherited_at`.
pub fn inherit_attribute<S: DataStore>(
    store: &mut S,
    owner: OwnerRef,
    key: &str,
) -> Result<Outcome> {
    let Target { definition, row } = match target(store, owner, key)? {
        Ok(target) => target,
        Err(rejection) => return Ok(rejection.into()),
    };
    if let Err(err) = check_inheritance(&definition, owner) {
        return Ok(Rejection::from(err).into());
    }
    let Some(parent) = store.parent_of(owner)? else {
        return Ok(Rejection::from(InheritanceError::NoParent(owner)).into());
    };
    let Some(parent_row) = store.value(parent, &definition.id)? else {
        let err = InheritanceError::ParentMissingAttribute(key.to_string());
        return Ok(Rejection::from(err).into());
    };

    let existed = row.is_some();
    let mut row = row.unwrap_or_else(|| AttributeValue::new(owner, &definition));
    match row.inherit_from(&definition, &parent_row) {
        Ok(false) => Ok(Outcome::Unchanged(row)),
        Ok(true) => {
            store.save_value(&row)?;
            debug!(%owner, key, raw = %row.raw, "inherited");
            Ok(if existed {
                Outcome::Updated(row)
            } else {
                Outcome::Created(row)
            })
        }
        Err(err) => Ok(Rejection::from(err).into()),
    }
}

/// Inherit every inheritable attribute the parent product offers.
///
/// Without `force`, keys the variant already holds (as an inherited copy or an
/// explicit value) are skipped and reported with their reason.
#[tracing::instrument(skip(store))]
pub fn inherit_all_attributes<S: DataStore>(
    store: &mut S,
    owner: OwnerRef,
    force: bool,
) -> Result<InheritReport> {
    store.transaction(|store| {
        require_owner(store, owner)?;
        let parent = store.parent_of(owner)?;
        let mut report = InheritReport::default();

        for definition in store.definitions()? {
            if !definition.supports_inheritance() {
                continue;
            }
            let key = definition.key.as_str();
            if !definition.applies_to.includes(OwnerKind::Variant) {
                let err = InheritanceError::NotApplicableToVariants(key.to_string());
                report.errors.insert(key.to_string(), err.to_string());
                continue;
            }
            let Some(parent_owner) = parent else {
                let err = InheritanceError::NoParent(owner);
                report.errors.insert(key.to_string(), err.to_string());
                continue;
            };
            if store.value(parent_owner, &definition.id)?.is_none() {
                report.skip(key, SkipReason::ParentMissing);
                continue;
            }
            if !force {
                if let Some(existing) = store.value(owner, &definition.id)? {
                    let reason = if existing.is_inherited {
                        SkipReason::AlreadyInherited
                    } else {
                        SkipReason::ExplicitlySet
                    };
                    report.skip(key, reason);
                    continue;
                }
            }

            match inherit_attribute(store, owner, key)? {
                Outcome::Rejected(rejection) => {
                    report.errors.insert(key.to_string(), rejection.to_string());
                }
                Outcome::Unchanged(_) => report.skip(key, SkipReason::AlreadyInherited),
                _ => report.inherited.push(key.to_string()),
            }
        }

        info!(
            inherited = report.inherited.len(),
            skipped = report.skipped.len(),
            errors = report.errors.len(),
            "inherit all finished"
        );
        Ok(report)
    })
}

/// Inherit an explicit list of keys. Each key is attempted independently.
#[tracing::instrument(skip(store))]
pub fn bulk_inherit_attributes<S: DataStore>(
    store: &mut S,
    owner: OwnerRef,
    keys: &[String],
) -> Result<InheritReport> {
    store.transaction(|store| {
        require_owner(store, owner)?;
        let mut report = InheritReport::default();

        for key in keys {
            match inherit_attribute(store, owner, key)? {
                Outcome::Rejected(rejection) => {
                    report.errors.insert(key.clone(), rejection.to_string());
                }
                Outcome::Unchanged(_) => report.skip(key, SkipReason::AlreadyInherited),
                _ => report.inherited.push(key.clone()),
            }
        }

        info!(
            inherited = report.inherited.len(),
            errors = report.errors.len(),
            "bulk inherit finished"
        );
        Ok(report)
    })
}
