use super::helpers::{keyed_rows, require_owner};
use crate::error::Result;
use crate::model::OwnerRef;
use crate::store::DataStore;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: BTreeMap<String, Vec<String>>,
    pub validated_count: usize,
}

/// Re-run validation on every row the owner holds against the current
/// definitions, persisting the refreshed `is_valid` / `validation_errors`.
///
/// Needed after schema edits (a tightened range, a removed enum value) since rows
/// only validate on write.
#[tracing::instrument(skip(store))]
pub fn validate_all_attributes<S: DataStore>(
    store: &mut S,
    owner: OwnerRef,
) -> Result<ValidationReport> {
    store.transaction(|store| {
        require_owner(store, owner)?;
        let mut report = ValidationReport::default();

        let rows = store.values(owner)?;
        for (definition, mut row) in keyed_rows(store, rows)? {
            let was_valid = row.is_valid;
            if !row.revalidate(&definition) {
                report
                    .errors
                    .insert(definition.key.clone(), row.validation_errors.clone());
            }
            if was_valid != row.is_valid {
                debug!(%owner, key = %definition.key, valid = row.is_valid, "validity changed");
            }
            store.save_value(&row)?;
            report.validated_count += 1;
        }

        report.valid = report.errors.is_empty();
        info!(
            validated = report.validated_count,
            invalid = report.errors.len(),
            "validation finished"
        );
        Ok(report)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{AttributeDefinition, DataType, ValidationRules};
    use crate::store::memory::fixtures::CatalogFixture;

    #[test]
    fn schema_change_flags_existing_rows() {
        let mut fx = CatalogFixture::new();
        let mut def = fx.define(AttributeDefinition::new("warranty_years", DataType::Number));
        fx.define(AttributeDefinition::new("care", DataType::String));
        let product = fx.product("KETTLE");
        fx.set(product.owner(), "warranty_years", "-1");
        fx.set(product.owner(), "care", "wipe clean");

        def.validation_rules = ValidationRules {
            min: Some(0.0),
            ..Default::default()
        };
        fx.store.save_definition(&def).unwrap();

        let report = validate_all_attributes(&mut fx.store, product.owner()).unwrap();

        assert!(!report.valid);
        assert_eq!(report.validated_count, 2);
        assert_eq!(report.errors["warranty_years"].len(), 1);

        let row = fx.row(product.owner(), "warranty_years").unwrap();
        assert!(!row.is_valid);
        assert_eq!(row.validation_errors, report.errors["warranty_years"]);
        assert_eq!(row.raw, "-1");
    }

    #[test]
    fn revalidation_clears_stale_errors() {
        let mut fx = CatalogFixture::new();
        let def = fx.define(AttributeDefinition::new("care", DataType::String));
        let product = fx.product("KETTLE");

        let mut row = crate::attributes::AttributeValue::new(product.owner(), &def);
        row.raw = "descale monthly".into();
        row.is_valid = false;
        row.validation_errors = vec!["old complaint".into()];
        fx.put_raw(row);

        let report = validate_all_attributes(&mut fx.store, product.owner()).unwrap();
        assert!(report.valid);
        let row = fx.row(product.owner(), "care").unwrap();
        assert!(row.is_valid);
        assert!(row.validation_errors.is_empty());
    }

    #[test]
    fn owner_without_rows_is_valid() {
        let mut fx = CatalogFixture::new();
        let product = fx.product("KETTLE");
        let report = validate_all_attributes(&mut fx.store, product.owner()).unwrap();
        assert!(report.valid);
        assert_eq!(report.validated_count, 0);
    }
}
