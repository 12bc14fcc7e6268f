//! Attribute definitions: the schema side of the attribute system.
//!
//! A definition declares what an attribute is (key, data type, validation rules),
//! where it may live (`applies_to`), how variants relate to their product's value
//! (`is_inheritable` + `inheritance_strategy`) and which channels it syncs to.
//! Definitions are authored elsewhere and are read-only to the engine.

use super::validation::{check_rules, ValidationError};
use super::value::TypedValue;
use crate::model::{Channel, OwnerKind};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of value an attribute holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Boolean,
    /// Closed set of strings declared in `enum_values`
    Enum,
    /// Calendar date, stored as `YYYY-MM-DD`
    Date,
}

type CastFn = fn(&AttributeDefinition, &str) -> Result<TypedValue, ValidationError>;

impl DataType {
    /// Cast table: one parser per data type.
    fn caster(self) -> CastFn {
        match self {
            DataType::String => cast_string,
            DataType::Number => cast_number,
            DataType::Boolean => cast_boolean,
            DataType::Enum => cast_enum,
            DataType::Date => cast_date,
        }
    }
}

/// When a variant consults its product's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InheritanceStrategy {
    /// Never inherit; the product's value is invisible to variants
    Never,
    /// Use the product's value when the variant has none of its own
    #[default]
    Fallback,
    /// Always offer the product's value below the variant's own rows
    Always,
}

/// Which owner kinds may carry a value for the attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppliesTo {
    Product,
    Variant,
    #[default]
    Both,
}

impl AppliesTo {
    pub fn includes(&self, kind: OwnerKind) -> bool {
        matches!(
            (self, kind),
            (AppliesTo::Both, _)
                | (AppliesTo::Product, OwnerKind::Product)
                | (AppliesTo::Variant, OwnerKind::Variant)
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub id: Uuid,
    /// Stable unique identifier (e.g. "light_filtering")
    pub key: String,
    pub name: String,
    pub data_type: DataType,
    #[serde(default)]
    pub enum_values: Vec<String>,
    #[serde(default)]
    pub validation_rules: ValidationRules,
    /// Raw default, cast lazily; never persisted as a value row
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub is_inheritable: bool,
    #[serde(default)]
    pub inheritance_strategy: InheritanceStrategy,
    #[serde(default)]
    pub applies_to: AppliesTo,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub sync_to_mirakl: bool,
    #[serde(default)]
    pub sync_to_ebay: bool,
    #[serde(default)]
    pub sync_to_shopify: bool,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

impl AttributeDefinition {
    /// Create a definition with no rules, no default and inheritance disabled.
    pub fn new(key: impl Into<String>, data_type: DataType) -> Self {
        let key = key.into();
        Self {
            id: Uuid::new_v4(),
            name: key.replace('_', " "),
            key,
            data_type,
            enum_values: Vec::new(),
            validation_rules: ValidationRules::default(),
            default_value: None,
            is_inheritable: false,
            inheritance_strategy: InheritanceStrategy::default(),
            applies_to: AppliesTo::Both,
            is_required: false,
            sync_to_mirakl: false,
            sync_to_ebay: false,
            sync_to_shopify: false,
            group: None,
            sort_order: 0,
        }
    }

    pub fn inheritable(mut self, strategy: InheritanceStrategy) -> Self {
        self.is_inheritable = true;
        self.inheritance_strategy = strategy;
        self
    }

    pub fn with_enum_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.validation_rules = rules;
        self
    }

    pub fn with_default(mut self, raw: impl Into<String>) -> Self {
        self.default_value = Some(raw.into());
        self
    }

    pub fn applies_to(mut self, applies_to: AppliesTo) -> Self {
        self.applies_to = applies_to;
        self
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn syncs_to(mut self, channel: Channel) -> Self {
        match channel {
            Channel::Mirakl => self.sync_to_mirakl = true,
            Channel::Ebay => self.sync_to_ebay = true,
            Channel::Shopify => self.sync_to_shopify = true,
        }
        self
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn sort_order(mut self, order: i32) -> Self {
        self.sort_order = order;
        self
    }

    /// Whether variants can take this attribute from their product at all.
    pub fn supports_inheritance(&self) -> bool {
        self.is_inheritable && self.inheritance_strategy != InheritanceStrategy::Never
    }

    pub fn syncs_to_channel(&self, channel: Channel) -> bool {
        match channel {
            Channel::Mirakl => self.sync_to_mirakl,
            Channel::Ebay => self.sync_to_ebay,
            Channel::Shopify => self.sync_to_shopify,
        }
    }

    /// Channels this attribute is pushed to, in declaration order.
    pub fn sync_channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|c| self.syncs_to_channel(*c))
            .collect()
    }

    /// Convert a raw string into a typed value, enforcing every validation rule.
    ///
    /// Deterministic and side-effect free. A parse failure is reported alone;
    /// once parsed, all rule violations are reported together.
    pub fn cast_value(&self, raw: &str) -> Result<TypedValue, Vec<ValidationError>> {
        let typed = (self.data_type.caster())(self, raw).map_err(|e| vec![e])?;
        let errors = check_rules(&typed, &self.validation_rules);
        if errors.is_empty() {
            Ok(typed)
        } else {
            Err(errors)
        }
    }

    /// The default value, cast. `None` when unset or when it fails validation.
    pub fn typed_default(&self) -> Option<TypedValue> {
        self.default_value
            .as_deref()
            .and_then(|raw| self.cast_value(raw).ok())
    }
}

fn cast_string(_def: &AttributeDefinition, raw: &str) -> Result<TypedValue, ValidationError> {
    Ok(TypedValue::String(raw.to_string()))
}

fn cast_number(_def: &AttributeDefinition, raw: &str) -> Result<TypedValue, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(TypedValue::Number)
        .ok_or_else(|| ValidationError::NotANumber(raw.to_string()))
}

fn cast_boolean(_def: &AttributeDefinition, raw: &str) -> Result<TypedValue, ValidationError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(TypedValue::Boolean(true)),
        "false" | "0" | "no" | "off" => Ok(TypedValue::Boolean(false)),
        _ => Err(ValidationError::NotABoolean(raw.to_string())),
    }
}

fn cast_enum(def: &AttributeDefinition, raw: &str) -> Result<TypedValue, ValidationError> {
    if def.enum_values.is_empty() {
        return Err(ValidationError::MissingEnumValues);
    }
    let candidate = raw.trim();
    def.enum_values
        .iter()
        .find(|v| v.as_str() == candidate)
        .map(|v| TypedValue::Enum(v.clone()))
        .ok_or_else(|| ValidationError::NotInEnum {
            value: raw.to_string(),
            allowed: def.enum_values.clone(),
        })
}

fn cast_date(_def: &AttributeDefinition, raw: &str) -> Result<TypedValue, ValidationError> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.date_naive()))
        .map(TypedValue::Date)
        .map_err(|_| ValidationError::NotADate(raw.to_string()))
}
