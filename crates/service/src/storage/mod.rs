//! Document store abstractions for the service layer
//!
//! A store hands out named collections of schemaless documents keyed by a
//! store-assigned identifier. Both the HTTP API and the client fallback path
//! go through these traits.

pub mod json_collection;

use std::sync::Arc;

use async_trait::async_trait;
use models::Document;

use crate::errors::ServiceError;

/// One flat collection of documents.
///
/// No transactions and no version checks: concurrent writers race and the last write wins.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    fn name(&self) -> &str;

    /// Every document merged with its identifier under `id`.
    async fn list(&self) -> Result<Vec<Document>, ServiceError>;

    async fn get(&self, id: &str) -> Result<Option<Document>, ServiceError>;

    /// Insert under a fresh identifier and stamp `createdAt`/`updatedAt`; returns the identifier.
    async fn create(&self, data: Document) -> Result<String, ServiceError>;

    /// Merge top-level fields into an existing document and stamp `updatedAt`.
    async fn update(&self, id: &str, data: Document) -> Result<(), ServiceError>;

    /// Remove by identifier; returns whether it existed. Missing ids are not an error.
    async fn delete(&self, id: &str) -> Result<bool, ServiceError>;
}

/// Trait abstraction for the document store itself.
pub trait DocumentStore: Send + Sync {
    fn collection(&self, name: &str) -> Result<Arc<dyn DocumentCollection>, ServiceError>;
}

/// Collection names become file names; keep them to `[a-z0-9_-]`.
pub fn validate_collection_name(name: &str) -> Result<(), ServiceError> {
    let ok = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(ServiceError::Validation(format!("invalid collection name: {name:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_names_are_restricted() {
        assert!(validate_collection_name("providers").is_ok());
        assert!(validate_collection_name("service_types-2").is_ok());
        assert!(validate_collection_name("").is_err());
        assert!(validate_collection_name("../etc").is_err());
        assert!(validate_collection_name("Providers").is_err());
    }
}
