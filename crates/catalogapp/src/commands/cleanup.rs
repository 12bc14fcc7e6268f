use super::helpers::{keyed_rows, require_owner};
use crate::error::Result;
use crate::model::OwnerRef;
use crate::store::DataStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// What to do with rows that fail validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupAction {
    /// Revalidate; drop the row when a valid default exists; otherwise mark unfixable
    Fix,
    /// Delete invalid rows
    Remove,
    /// List invalid rows, change nothing
    #[default]
    Report,
}

impl fmt::Display for CleanupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CleanupAction::Fix => "fix",
            CleanupAction::Remove => "remove",
            CleanupAction::Report => "report",
        };
        f.write_str(name)
    }
}

impl FromStr for CleanupAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fix" => Ok(CleanupAction::Fix),
            "remove" => Ok(CleanupAction::Remove),
            "report" => Ok(CleanupAction::Report),
            other => Err(format!(
                "unknown cleanup action '{}' (expected fix, remove or report)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanupReport {
    pub action: CleanupAction,
    /// Keys found invalid before any action was taken
    pub invalid: Vec<String>,
    /// Valid again after revalidation
    pub fixed: Vec<String>,
    /// Row dropped so resolution falls through to the parent or the default
    pub defaulted: Vec<String>,
    pub removed: Vec<String>,
    /// Still invalid, kept with `is_valid = false`
    pub unfixable: Vec<String>,
}

/// Find the owner's invalid rows and deal with them according to `action`.
///
/// A row counts as invalid when it is flagged invalid or its raw value no longer
/// casts under the current definition.
#[tracing::instrument(skip(store))]
pub fn clean_up_invalid_attributes<S: DataStore>(
    store: &mut S,
    owner: OwnerRef,
    action: CleanupAction,
) -> Result<CleanupReport> {
    store.transaction(|store| {
        require_owner(store, owner)?;
        let mut report = CleanupReport {
            action,
            ..Default::default()
        };

        let rows = store.values(owner)?;
        for (definition, row) in keyed_rows(store, rows)? {
            let key = definition.key.clone();
            let mut checked = row.clone();
            let valid_now = checked.revalidate(&definition);
            if row.is_valid && valid_now {
                continue;
            }
            report.invalid.push(key.clone());

            match action {
                CleanupAction::Report => {}
                CleanupAction::Remove => {
                    store.delete_value(owner, &definition.id)?;
                    debug!(%owner, %key, "invalid row removed");
                    report.removed.push(key);
                }
                CleanupAction::Fix if valid_now => {
                    store.save_value(&checked)?;
                    debug!(%owner, %key, "row valid after revalidation");
                    report.fixed.push(key);
                }
                CleanupAction::Fix => {
                    let default_casts = definition
                        .default_value
                        .as_deref()
                        .is_some_and(|raw| definition.cast_value(raw).is_ok());
                    if default_casts {
                        store.delete_value(owner, &definition.id)?;
                        debug!(%owner, %key, "invalid row dropped; default applies");
                        report.defaulted.push(key);
                    } else {
                        store.save_value(&checked)?;
                        debug!(%owner, %key, "row unfixable");
                        report.unfixable.push(key);
                    }
                }
            }
        }

        info!(
            %action,
            invalid = report.invalid.len(),
            "cleanup finished"
        );
        Ok(report)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{
        AttributeDefinition, AttributeValue, DataType, InheritanceStrategy, TypedValue,
        ValidationRules,
    };
    use crate::resolver::effective_value;
    use crate::store::memory::fixtures::CatalogFixture;

    /// Three broken rows on one product: one that is actually fine now, one with a
    /// usable default, one beyond repair.
    fn setup() -> (CatalogFixture, OwnerRef) {
        let mut fx = CatalogFixture::new();
        let stale = fx.define(AttributeDefinition::new("care", DataType::String));
        let defaulted = fx.define(
            AttributeDefinition::new("warranty_years", DataType::Number)
                .with_rules(ValidationRules {
                    min: Some(0.0),
                    ..Default::default()
                })
                .with_default("1"),
        );
        let hopeless = fx.define(AttributeDefinition::new("is_fragile", DataType::Boolean));
        fx.define(AttributeDefinition::new("finish", DataType::String));
        let product = fx.product("TEAPOT");
        let owner = product.owner();

        let mut row = AttributeValue::new(owner, &stale);
        row.raw = "hand wash".into();
        row.is_valid = false;
        fx.put_raw(row);

        let mut row = AttributeValue::new(owner, &defaulted);
        row.raw = "-2".into();
        row.is_valid = false;
        fx.put_raw(row);

        let mut row = AttributeValue::new(owner, &hopeless);
        row.raw = "perhaps".into();
        fx.put_raw(row);

        fx.set(owner, "finish", "glazed");
        (fx, owner)
    }

    #[test]
    fn report_mutates_nothing() {
        let (mut fx, owner) = setup();
        let before = fx.store.values(owner).unwrap();

        let report = clean_up_invalid_attributes(&mut fx.store, owner, CleanupAction::Report)
            .unwrap();

        assert_eq!(report.invalid, vec!["care", "is_fragile", "warranty_years"]);
        assert!(report.fixed.is_empty() && report.removed.is_empty());
        assert_eq!(fx.store.values(owner).unwrap(), before);
    }

    #[test]
    fn fix_revalidates_defaults_or_gives_up() {
        let (mut fx, owner) = setup();

        let report =
            clean_up_invalid_attributes(&mut fx.store, owner, CleanupAction::Fix).unwrap();

        assert_eq!(report.fixed, vec!["care"]);
        assert_eq!(report.defaulted, vec!["warranty_years"]);
        assert_eq!(report.unfixable, vec!["is_fragile"]);

        assert!(fx.row(owner, "warranty_years").is_none());
        assert_eq!(
            effective_value(&fx.store, owner, "warranty_years").unwrap(),
            Some(TypedValue::Number(1.0))
        );

        let fragile = fx.row(owner, "is_fragile").unwrap();
        assert!(!fragile.is_valid);
        assert!(!fragile.validation_errors.is_empty());
        assert_eq!(fragile.raw, "perhaps");

        assert!(fx.row(owner, "care").unwrap().is_valid);
    }

    #[test]
    fn fix_lets_the_parent_value_show_through() {
        let mut fx = CatalogFixture::new();
        let warranty = fx.define(
            AttributeDefinition::new("warranty_years", DataType::Number)
                .with_rules(ValidationRules {
                    min: Some(0.0),
                    ..Default::default()
                })
                .with_default("1")
                .inheritable(InheritanceStrategy::Fallback),
        );
        let product = fx.product("KETTLE");
        let variant = fx.variant(&product, "KETTLE-RED");
        fx.set(product.owner(), "warranty_years", "5");

        let mut row = AttributeValue::new(variant.owner(), &warranty);
        row.raw = "-2".into();
        row.is_valid = false;
        fx.put_raw(row);

        let report =
            clean_up_invalid_attributes(&mut fx.store, variant.owner(), CleanupAction::Fix)
                .unwrap();

        assert_eq!(report.defaulted, vec!["warranty_years"]);
        assert!(fx.row(variant.owner(), "warranty_years").is_none());
        assert_eq!(
            effective_value(&fx.store, variant.owner(), "warranty_years").unwrap(),
            Some(TypedValue::Number(5.0))
        );
    }

    #[test]
    fn remove_deletes_only_invalid_rows() {
        let (mut fx, owner) = setup();

        let report =
            clean_up_invalid_attributes(&mut fx.store, owner, CleanupAction::Remove).unwrap();

        assert_eq!(report.removed.len(), 3);
        let remaining = fx.store.values(owner).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].raw, "glazed");
    }

    #[test]
    fn action_parses_and_displays() {
        assert_eq!("FIX".parse::<CleanupAction>(), Ok(CleanupAction::Fix));
        assert_eq!(CleanupAction::default(), CleanupAction::Report);
        assert_eq!(CleanupAction::Remove.to_string(), "remove");
        assert!("purge".parse::<CleanupAction>().is_err());
    }
}
