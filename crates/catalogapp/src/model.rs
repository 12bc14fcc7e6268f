//! # Domain Model: Catalog Entities
//!
//! The engine only knows two kinds of attribute owners:
//!
//! - **Products**: top-level entities with no parent.
//! - **Variants**: sellable children of exactly one product (a size, a colour, ...).
//!
//! Both are addressed through [`OwnerRef`], a small tagged id. Nothing in the
//! engine holds owners by reference; every lookup goes through the store, which
//! keeps owners and their attribute rows in id-indexed tables.
//!
//! ## Channels
//!
//! Attribute values are pushed to marketplaces ("channels"). Which attributes go
//! where is declared per definition (`sync_to_*` flags), and each value row keeps
//! a per-channel `last_synced_at` stamp used for sync-readiness reporting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    Product,
    Variant,
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerKind::Product => write!(f, "product"),
            OwnerKind::Variant => write!(f, "variant"),
        }
    }
}

/// Reference to the entity an attribute value is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum OwnerRef {
    Product(Uuid),
    Variant(Uuid),
}

impl OwnerRef {
    pub fn kind(&self) -> OwnerKind {
        match self {
            OwnerRef::Product(_) => OwnerKind::Product,
            OwnerRef::Variant(_) => OwnerKind::Variant,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            OwnerRef::Product(id) | OwnerRef::Variant(id) => *id,
        }
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(sku: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sku: sku.into(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    pub fn owner(&self) -> OwnerRef {
        OwnerRef::Product(self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Variant {
    pub fn new(product: &Product, sku: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id: product.id,
            sku: sku.into(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    pub fn owner(&self) -> OwnerRef {
        OwnerRef::Variant(self.id)
    }

    pub fn parent(&self) -> OwnerRef {
        OwnerRef::Product(self.product_id)
    }
}

/// Marketplaces attribute values are synced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Mirakl,
    Ebay,
    Shopify,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Mirakl, Channel::Ebay, Channel::Shopify];

    pub fn name(&self) -> &'static str {
        match self {
            Channel::Mirakl => "mirakl",
            Channel::Ebay => "ebay",
            Channel::Shopify => "shopify",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown channel '{}' (expected mirakl, ebay or shopify)", s))
    }
}
