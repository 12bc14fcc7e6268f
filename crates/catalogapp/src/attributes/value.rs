//! Attribute values: typed results and the persisted value rows.
//!
//! [`TypedValue`] is the runtime form of a value after casting. [`AttributeValue`]
//! is the stored row: one per (owner, definition), holding the canonical raw
//! string plus its inheritance and validation bookkeeping.
//!
//! All row mutations go through the owning definition, so `raw` is always stored
//! in canonical form and `is_valid` always reflects the last validation run.

use super::definition::AttributeDefinition;
use super::validation::{error_messages, ValidationError};
use crate::model::{Channel, OwnerKind, OwnerRef};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Runtime representation of a cast attribute value.
///
/// Serializes as `{"type": "number", "value": 2.5}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum TypedValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Enum(String),
    Date(NaiveDate),
}

impl TypedValue {
    /// Canonical string form, as stored in `AttributeValue::raw`.
    pub fn to_raw(&self) -> String {
        match self {
            TypedValue::String(s) | TypedValue::Enum(s) => s.clone(),
            TypedValue::Number(n) => n.to_string(),
            TypedValue::Boolean(b) => b.to_string(),
            TypedValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    /// Get the string if this is a String or Enum.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) | TypedValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            TypedValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            TypedValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl std::fmt::Display for TypedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_raw())
    }
}

/// Where a row's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Manual,
    Inherited,
    Import,
    System,
}

/// Why a value could not be taken from (or reverted to) the parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InheritanceError {
    /// Definition is not inheritable or its strategy is `never`
    NotInheritable(String),
    /// Definition is product-only
    NotApplicableToVariants(String),
    /// Owner has no parent to inherit from
    NoParent(OwnerRef),
    /// Parent has no row for this attribute
    ParentMissingAttribute(String),
}

impl std::fmt::Display for InheritanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InheritanceError::NotInheritable(key) => {
                write!(f, "attribute '{}' does not support inheritance", key)
            }
            InheritanceError::NotApplicableToVariants(key) => {
                write!(f, "attribute '{}' does not apply to variants", key)
            }
            InheritanceError::NoParent(owner) => {
                write!(f, "{} has no parent product to inherit from", owner)
            }
            InheritanceError::ParentMissingAttribute(_) => {
                write!(f, "product does not have this attribute")
            }
        }
    }
}

impl std::error::Error for InheritanceError {}

/// Whether `owner` may hold an inherited copy of `definition` at all.
pub fn check_inheritance(
    definition: &AttributeDefinition,
    owner: OwnerRef,
) -> Result<(), InheritanceError> {
    if !definition.supports_inheritance() {
        return Err(InheritanceError::NotInheritable(definition.key.clone()));
    }
    if !definition.applies_to.includes(OwnerKind::Variant) {
        return Err(InheritanceError::NotApplicableToVariants(
            definition.key.clone(),
        ));
    }
    if owner.kind() != OwnerKind::Variant {
        return Err(InheritanceError::NoParent(owner));
    }
    Ok(())
}

/// A stored attribute value for one owner and one definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub id: Uuid,
    pub owner: OwnerRef,
    pub definition_id: Uuid,
    /// Canonical string-serialized value
    pub raw: String,
    pub is_inherited: bool,
    pub is_override: bool,
    pub source: ValueSource,
    pub inherited_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub validation_errors: Vec<String>,
    pub is_valid: bool,
    #[serde(default)]
    pub last_synced_at: BTreeMap<Channel, DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Last time `raw` changed
    pub updated_at: DateTime<Utc>,
}

impl AttributeValue {
    /// An empty row, not yet holding a value. Callers fill it through
    /// [`set_value`](Self::set_value), [`inherit_from`](Self::inherit_from) or
    /// [`override_value`](Self::override_value) before persisting it.
    pub fn new(owner: OwnerRef, definition: &AttributeDefinition) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner,
            definition_id: definition.id,
            raw: String::new(),
            is_inherited: false,
            is_override: false,
            source: ValueSource::Manual,
            inherited_at: None,
            validation_errors: Vec::new(),
            is_valid: true,
            last_synced_at: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Cast `raw` through the definition. `None` if it no longer validates.
    pub fn typed_value(&self, definition: &AttributeDefinition) -> Option<TypedValue> {
        definition.cast_value(&self.raw).ok()
    }

    /// Set an explicit value.
    ///
    /// On failure the errors are recorded on the row and `raw` is left untouched.
    pub fn set_value(
        &mut self,
        definition: &AttributeDefinition,
        raw: &str,
    ) -> Result<(), Vec<ValidationError>> {
        self.set_value_from(definition, raw, ValueSource::Manual)
    }

    /// Like [`set_value`](Self::set_value) with an explicit provenance (import, system).
    pub fn set_value_from(
        &mut self,
        definition: &AttributeDefinition,
        raw: &str,
        source: ValueSource,
    ) -> Result<(), Vec<ValidationError>> {
        let typed = self.cast_or_record(definition, raw)?;
        self.assign(typed.to_raw());
        self.is_inherited = false;
        self.is_override = false;
        self.inherited_at = None;
        self.source = source;
        Ok(())
    }

    /// Set an override that takes precedence over anything the parent offers.
    pub fn override_value(
        &mut self,
        definition: &AttributeDefinition,
        raw: &str,
    ) -> Result<(), Vec<ValidationError>> {
        let typed = self.cast_or_record(definition, raw)?;
        self.assign(typed.to_raw());
        self.is_override = true;
        self.is_inherited = false;
        self.inherited_at = None;
        self.source = ValueSource::Manual;
        Ok(())
    }

    /// Copy the parent's row into this one and mark it inherited.
    ///
    /// Returns `Ok(false)` when the row already holds an inherited copy of the
    /// same raw value, so repeated calls never touch `inherited_at`.
    pub fn inherit_from(
        &mut self,
        definition: &AttributeDefinition,
        parent: &AttributeValue,
    ) -> Result<bool, InheritanceError> {
        check_inheritance(definition, self.owner)?;

        if self.is_inherited && self.raw == parent.raw {
            return Ok(false);
        }

        self.assign(parent.raw.clone());
        self.is_inherited = true;
        self.is_override = false;
        self.source = ValueSource::Inherited;
        self.inherited_at = Some(Utc::now());
        self.revalidate(definition);
        Ok(true)
    }

    /// Re-run validation against the current definition (after schema edits).
    pub fn revalidate(&mut self, definition: &AttributeDefinition) -> bool {
        match definition.cast_value(&self.raw) {
            Ok(_) => {
                self.validation_errors.clear();
                self.is_valid = true;
            }
            Err(errors) => {
                self.validation_errors = error_messages(&errors);
                self.is_valid = false;
            }
        }
        self.is_valid
    }

    /// Whether this row holds an explicit (non-inherited) value.
    pub fn is_explicit(&self) -> bool {
        !self.is_inherited
    }

    pub fn mark_synced(&mut self, channel: Channel, at: DateTime<Utc>) {
        self.last_synced_at.insert(channel, at);
    }

    pub fn last_synced(&self, channel: Channel) -> Option<DateTime<Utc>> {
        self.last_synced_at.get(&channel).copied()
    }

    fn cast_or_record(
        &mut self,
        definition: &AttributeDefinition,
        raw: &str,
    ) -> Result<TypedValue, Vec<ValidationError>> {
        definition.cast_value(raw).inspect_err(|errors| {
            self.validation_errors = error_messages(errors);
            self.is_valid = false;
        })
    }

    fn assign(&mut self, raw: String) {
        if self.raw != raw {
            self.raw = raw;
            self.updated_at = Utc::now();
        }
        self.validation_errors.clear();
        self.is_valid = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::definition::{
        AppliesTo, DataType, InheritanceStrategy, ValidationRules,
    };

    fn warranty() -> AttributeDefinition {
        AttributeDefinition::new("warranty_years", DataType::Number)
            .with_rules(ValidationRules {
                min: Some(0.0),
                ..Default::default()
            })
            .inheritable(InheritanceStrategy::Fallback)
    }

    fn variant_row(def: &AttributeDefinition) -> AttributeValue {
        AttributeValue::new(OwnerRef::Variant(Uuid::new_v4()), def)
    }

    fn product_row(def: &AttributeDefinition, raw: &str) -> AttributeValue {
        let mut row = AttributeValue::new(OwnerRef::Product(Uuid::new_v4()), def);
        row.set_value(def, raw).unwrap();
        row
    }

    #[test]
    fn typed_value_round_trips_canonical_raw() {
        assert_eq!(TypedValue::Number(2.0).to_raw(), "2");
        assert_eq!(TypedValue::Number(2.5).to_raw(), "2.5");
        assert_eq!(TypedValue::Boolean(true).to_raw(), "true");
        let d = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(TypedValue::Date(d).to_raw(), "2024-01-05");
    }

    #[test]
    fn typed_value_serializes_tagged() {
        let json = serde_json::to_value(TypedValue::Number(2.5)).unwrap();
        assert_eq!(json["type"], "number");
        assert_eq!(json["value"], 2.5);
    }

    #[test]
    fn accessors_match_variant() {
        assert_eq!(TypedValue::Enum("Sheer".into()).as_str(), Some("Sheer"));
        assert_eq!(TypedValue::Number(1.0).as_number(), Some(1.0));
        assert_eq!(TypedValue::Boolean(false).as_bool(), Some(false));
        assert_eq!(TypedValue::Boolean(false).as_str(), None);
    }

    #[test]
    fn set_value_stores_canonical_form() {
        let def = warranty();
        let mut row = variant_row(&def);
        row.set_value(&def, " 3.50 ").unwrap();
        assert_eq!(row.raw, "3.5");
        assert!(row.is_valid);
        assert_eq!(row.source, ValueSource::Manual);
        assert_eq!(row.typed_value(&def), Some(TypedValue::Number(3.5)));
    }

    #[test]
    fn set_value_failure_records_errors_and_keeps_raw() {
        let def = warranty();
        let mut row = variant_row(&def);
        row.set_value(&def, "2").unwrap();

        let err = row.set_value(&def, "-1").unwrap_err();
        assert!(matches!(err[0], ValidationError::BelowMinimum { .. }));
        assert_eq!(row.raw, "2");
        assert!(!row.is_valid);
        assert_eq!(row.validation_errors.len(), 1);
    }

    #[test]
    fn set_value_clears_inheritance_flags() {
        let def = warranty();
        let parent = product_row(&def, "5");
        let mut row = variant_row(&def);
        row.inherit_from(&def, &parent).unwrap();

        row.set_value(&def, "1").unwrap();
        assert!(!row.is_inherited);
        assert!(!row.is_override);
        assert!(row.inherited_at.is_none());
    }

    #[test]
    fn override_value_sets_exclusive_flag() {
        let def = warranty();
        let parent = product_row(&def, "5");
        let mut row = variant_row(&def);
        row.inherit_from(&def, &parent).unwrap();

        row.override_value(&def, "1").unwrap();
        assert!(row.is_override);
        assert!(!row.is_inherited);
        assert_eq!(row.raw, "1");
    }

    #[test]
    fn inherit_from_copies_and_is_idempotent() {
        let def = warranty();
        let parent = product_row(&def, "5");
        let mut row = variant_row(&def);

        assert_eq!(row.inherit_from(&def, &parent), Ok(true));
        assert!(row.is_inherited);
        assert_eq!(row.source, ValueSource::Inherited);
        let stamped = row.inherited_at;
        assert!(stamped.is_some());

        assert_eq!(row.inherit_from(&def, &parent), Ok(false));
        assert_eq!(row.inherited_at, stamped);
    }

    #[test]
    fn inherit_from_replaces_override() {
        let def = warranty();
        let parent = product_row(&def, "5");
        let mut row = variant_row(&def);
        row.override_value(&def, "5").unwrap();

        assert_eq!(row.inherit_from(&def, &parent), Ok(true));
        assert!(row.is_inherited);
        assert!(!row.is_override);
    }

    #[test]
    fn inherit_from_rejects_non_inheritable_definitions() {
        let def = AttributeDefinition::new("ean", DataType::String)
            .inheritable(InheritanceStrategy::Never);
        let parent = product_row(&def, "123");
        let mut row = variant_row(&def);
        assert_eq!(
            row.inherit_from(&def, &parent),
            Err(InheritanceError::NotInheritable("ean".into()))
        );
    }

    #[test]
    fn inherit_from_rejects_product_only_definitions() {
        let def = warranty().applies_to(AppliesTo::Product);
        let parent = product_row(&def, "2");
        let mut row = variant_row(&def);
        assert!(matches!(
            row.inherit_from(&def, &parent),
            Err(InheritanceError::NotApplicableToVariants(_))
        ));
    }

    #[test]
    fn inherit_from_requires_variant_owner() {
        let def = warranty();
        let parent = product_row(&def, "2");
        let mut row = product_row(&def, "1");
        assert!(matches!(
            row.inherit_from(&def, &parent),
            Err(InheritanceError::NoParent(_))
        ));
    }

    #[test]
    fn revalidate_tracks_schema_changes() {
        let def = warranty();
        let mut row = variant_row(&def);
        row.set_value(&def, "4").unwrap();

        let stricter = def.clone().with_rules(ValidationRules {
            max: Some(3.0),
            ..Default::default()
        });
        assert!(!row.revalidate(&stricter));
        assert!(!row.is_valid);
        assert_eq!(row.validation_errors.len(), 1);

        assert!(row.revalidate(&def));
        assert!(row.validation_errors.is_empty());
    }

    #[test]
    fn updated_at_only_moves_when_raw_changes() {
        let def = warranty();
        let mut row = variant_row(&def);
        row.set_value(&def, "2").unwrap();
        let first = row.updated_at;
        row.set_value(&def, "2.0").unwrap();
        assert_eq!(row.updated_at, first);
    }

    #[test]
    fn sync_stamps_are_per_channel() {
        let def = warranty();
        let mut row = variant_row(&def);
        let now = Utc::now();
        row.mark_synced(Channel::Ebay, now);
        assert_eq!(row.last_synced(Channel::Ebay), Some(now));
        assert_eq!(row.last_synced(Channel::Shopify), None);

        let json = serde_json::to_string(&row).unwrap();
        let back: AttributeValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back.last_synced(Channel::Ebay), Some(now));
    }
}
