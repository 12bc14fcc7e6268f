//! # Catalog Attribute Engine
//!
//! Typed product attributes with product→variant inheritance. A product carries
//! attribute values; each of its variants either holds its own value, holds a
//! materialized copy of the product's value, or falls back to the product (or the
//! schema default) at read time.
//!
//! This is a library that happens to have a CLI client (`catalog`), not the other
//! way around.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (crates/catalog)                                       │
//! │  - Parses arguments, renders reports, owns exit codes       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade; turns owner selectors into OwnerRefs        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────┬──────────────────────────────┐
//! │  Commands (commands/*.rs)    │  Resolver (resolver.rs)      │
//! │  - Every write operation     │  - Pure precedence reads     │
//! └──────────────────────────────┴──────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - DataStore trait, transactions                            │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes Rust arguments and returns Rust types. It
//! never prints and never exits; it only emits `tracing` events, which the binary
//! decides whether to show.
//!
//! ## Module Overview
//!
//! - [`api`]: The facade, entry point for all operations
//! - [`attributes`]: Definitions, casting, validation, value rows
//! - [`resolver`]: Effective values and resolution paths
//! - [`commands`]: Inheritance, overrides, assignment, cleanup, sync bookkeeping
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Products, variants, owners, channels
//! - [`config`]: Configuration loading
//! - [`error`]: Error types

pub mod api;
pub mod attributes;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod resolver;
pub mod store;
