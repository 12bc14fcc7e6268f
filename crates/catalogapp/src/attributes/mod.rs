//! # Attribute System
//!
//! Catalog entities carry an open-ended set of named attributes (material,
//! warranty, light filtering, ...). This module provides the typed core of that
//! system:
//!
//! - **Definitions**: the schema for each attribute key (data type, rules,
//!   default, inheritance policy, channel flags)
//! - **Typed values**: the result of casting a raw string through a definition
//! - **Value rows**: the persisted, per-owner value with inheritance and
//!   validation bookkeeping
//! - **Validation**: rule checks shared by every cast
//!
//! ## Data Types
//!
//! | Type | Raw form | Typed form |
//! |------|----------|------------|
//! | `string` | as given | `TypedValue::String` |
//! | `number` | `2`, `3.5` | `TypedValue::Number` |
//! | `boolean` | `true`/`false` (also yes/no, 1/0, on/off) | `TypedValue::Boolean` |
//! | `enum` | one of `enum_values` | `TypedValue::Enum` |
//! | `date` | `YYYY-MM-DD` | `TypedValue::Date` |
//!
//! ## Usage
//!
//! ```
//! use catalogapp::attributes::{AttributeDefinition, DataType, InheritanceStrategy, TypedValue};
//!
//! let def = AttributeDefinition::new("light_filtering", DataType::Enum)
//!     .with_enum_values(["Blackout", "Sheer"])
//!     .inheritable(InheritanceStrategy::Always);
//!
//! assert_eq!(def.cast_value("Sheer"), Ok(TypedValue::Enum("Sheer".into())));
//! assert!(def.cast_value("Opaque").is_err());
//! ```

mod definition;
mod validation;
mod value;

pub use definition::{
    AppliesTo, AttributeDefinition, DataType, InheritanceStrategy, ValidationRules,
};
pub use validation::{check_rules, error_messages, ValidationError};
pub use value::{check_inheritance, AttributeValue, InheritanceError, TypedValue, ValueSource};
