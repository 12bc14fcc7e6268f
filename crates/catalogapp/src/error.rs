use crate::model::OwnerRef;
use thiserror::Error;

/// Infrastructure failures.
///
/// Bad input (unknown keys, invalid values, impossible inheritance) is never
/// reported through this type; see [`crate::commands::Rejection`]. Anything that
/// surfaces as a `CatalogError` aborts the enclosing transaction.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Owner not found: {0}")]
    OwnerNotFound(OwnerRef),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] confique::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
