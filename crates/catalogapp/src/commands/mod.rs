//! # Command Layer
//!
//! The **business logic** of the attribute engine. Each operation lives in its own
//! submodule as a plain function over a [`DataStore`](crate::store::DataStore):
//!
//! ```ignore
//! pub fn override_attribute<S: DataStore>(store: &mut S, owner: OwnerRef, key: &str, raw: &str)
//!     -> Result<Outcome>
//! ```
//!
//! ## Two kinds of failure
//!
//! - **Infrastructure** failures (storage, serialization) are `Err(CatalogError)`.
//!   They propagate with `?` and abort the enclosing transaction.
//! - **Expected** failures (unknown key, invalid value, nothing to inherit from)
//!   are data. Single-item operations return [`Outcome::Rejected`] with a
//!   [`Rejection`]; batch operations collect them per key in their report and keep
//!   going with the remaining keys.
//!
//! Batch operations run inside one [`DataStore::transaction`](crate::store::DataStore::transaction),
//! so the batch's writes land together or not at all.
//!
//! ## What Commands Do NOT Do
//!
//! - No terminal output, no argument parsing, no exit codes.
//! - No implicit writes on read: only explicitly invoked operations touch rows.
//!
//! ## Command Modules
//!
//! - [`set`]: explicit assignment and removal, including the `{created, updated,
//!   errors}` batch used by imports
//! - [`inherit`]: materialize parent values on variants
//! - [`refresh`]: bring inherited copies back in line with the parent
//! - [`overrides`]: set and clear overrides
//! - [`validate`]: re-run validation for an owner
//! - [`cleanup`]: fix, remove or report invalid rows
//! - [`sync`]: per-channel readiness and sync stamps
//! - [`variants`]: run the above across an explicit list of variants

use crate::attributes::{error_messages, AttributeValue, InheritanceError, ValidationError};
use crate::model::{OwnerKind, OwnerRef};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

pub mod cleanup;
pub mod helpers;
pub mod inherit;
pub mod overrides;
pub mod refresh;
pub mod set;
pub mod sync;
pub mod validate;
pub mod variants;

/// Why a single-item operation did not change anything.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    UnknownAttribute(String),
    UnknownOwner(OwnerRef),
    /// Definition's `applies_to` excludes this owner kind
    NotApplicable { key: String, kind: OwnerKind },
    Invalid(Vec<ValidationError>),
    Inheritance(InheritanceError),
    /// `clear_attribute_override` on a row that is not an override
    NotOverridden(String),
    /// Nothing stored for this key on the owner
    NoValue(String),
}

impl Rejection {
    /// Stable machine-readable name.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::UnknownAttribute(_) => "unknown_attribute",
            Rejection::UnknownOwner(_) => "unknown_owner",
            Rejection::NotApplicable { .. } => "not_applicable",
            Rejection::Invalid(_) => "invalid",
            Rejection::Inheritance(_) => "inheritance",
            Rejection::NotOverridden(_) => "not_overridden",
            Rejection::NoValue(_) => "no_value",
        }
    }

    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Rejection::Invalid(errors) => errors,
            _ => &[],
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::UnknownAttribute(key) => write!(f, "unknown attribute '{}'", key),
            Rejection::UnknownOwner(owner) => write!(f, "{} does not exist", owner),
            Rejection::NotApplicable { key, kind } => {
                write!(f, "attribute '{}' does not apply to {}s", key, kind)
            }
            Rejection::Invalid(errors) => f.write_str(&error_messages(errors).join("; ")),
            Rejection::Inheritance(err) => write!(f, "{}", err),
            Rejection::NotOverridden(key) => write!(f, "attribute '{}' is not overridden", key),
            Rejection::NoValue(key) => write!(f, "no value stored for '{}'", key),
        }
    }
}

impl Serialize for Rejection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Rejection", 3)?;
        state.serialize_field("reason", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.serialize_field("errors", &error_messages(self.validation_errors()))?;
        state.end()
    }
}

impl From<InheritanceError> for Rejection {
    fn from(err: InheritanceError) -> Self {
        Rejection::Inheritance(err)
    }
}

/// Result of a single-item operation: the change made, or why none was made.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    Created(AttributeValue),
    Updated(AttributeValue),
    /// Row already held exactly this state
    Unchanged(AttributeValue),
    /// Override cleared; row re-materialized from the parent
    Reverted(AttributeValue),
    Removed,
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Rejected(_))
    }

    /// Whether the operation wrote anything.
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            Outcome::Created(_) | Outcome::Updated(_) | Outcome::Reverted(_) | Outcome::Removed
        )
    }

    /// The row after the operation, when one remains.
    pub fn row(&self) -> Option<&AttributeValue> {
        match self {
            Outcome::Created(row)
            | Outcome::Updated(row)
            | Outcome::Unchanged(row)
            | Outcome::Reverted(row) => Some(row),
            Outcome::Removed | Outcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }

    pub fn validation_errors(&self) -> &[ValidationError] {
        self.rejection()
            .map(Rejection::validation_errors)
            .unwrap_or(&[])
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Created(_) => "created",
            Outcome::Updated(_) => "updated",
            Outcome::Unchanged(_) => "unchanged",
            Outcome::Reverted(_) => "reverted",
            Outcome::Removed => "removed",
            Outcome::Rejected(_) => "rejected",
        }
    }
}

impl From<Rejection> for Outcome {
    fn from(rejection: Rejection) -> Self {
        Outcome::Rejected(rejection)
    }
}
