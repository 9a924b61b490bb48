//! Resilient data client: primary HTTP call first, direct document store on any failure.

use std::sync::Arc;

use common::metrics::{FALLBACK_TOTAL, PRIMARY_FAILURES_TOTAL};
use models::{Category, Document, Resource};
use service::adapters::list_categories_with_counts;
use service::errors::ServiceError;
use service::storage::{DocumentCollection, DocumentStore};
use tracing::{debug, warn};

use crate::errors::{Action, ClientError, PrimaryFailure};
use crate::primary::{expect_ack, expect_created_id, expect_documents, Operation, PrimaryApi};

#[derive(Clone)]
pub struct ResilientDataClient {
    primary: PrimaryApi,
    store: Arc<dyn DocumentStore>,
}

impl ResilientDataClient {
    pub fn new(primary: PrimaryApi, store: Arc<dyn DocumentStore>) -> Self {
        Self { primary, store }
    }

    pub fn primary(&self) -> &PrimaryApi { &self.primary }

    /// Every record of `resource`, each carrying its `id`.
    pub async fn list(&self, resource: &str) -> Result<Vec<Document>, ClientError> {
        let primary = self.primary.send(resource, Operation::List).await.and_then(expect_documents);
        match primary {
            Ok(docs) => Ok(docs),
            Err(failure) => {
                note_failure(resource, Action::Read, &failure);
                if resource == Category::COLLECTION {
                    return finish(resource, Action::Read, list_categories_with_counts(self.store.as_ref()).await);
                }
                let col = self.fallback_collection(resource, Action::Read)?;
                finish(resource, Action::Read, col.list().await)
            }
        }
    }

    /// Create a record and return its newly assigned identifier.
    pub async fn create(&self, resource: &str, payload: Document) -> Result<String, ClientError> {
        let primary = self
            .primary
            .send(resource, Operation::Create(&payload))
            .await
            .and_then(expect_created_id);
        match primary {
            Ok(id) => Ok(id),
            Err(failure) => {
                note_failure(resource, Action::Create, &failure);
                let col = self.fallback_collection(resource, Action::Create)?;
                finish(resource, Action::Create, col.create(payload).await)
            }
        }
    }

    pub async fn update(&self, resource: &str, id: &str, payload: Document) -> Result<(), ClientError> {
        let primary = self
            .primary
            .send(resource, Operation::Update(id, &payload))
            .await
            .and_then(expect_ack);
        match primary {
            Ok(()) => Ok(()),
            Err(failure) => {
                note_failure(resource, Action::Update, &failure);
                let col = self.fallback_collection(resource, Action::Update)?;
                finish(resource, Action::Update, col.update(id, payload).await)
            }
        }
    }

    /// Deleting an id that does not exist succeeds.
    pub async fn delete(&self, resource: &str, id: &str) -> Result<(), ClientError> {
        let primary = self.primary.send(resource, Operation::Delete(id)).await.and_then(expect_ack);
        match primary {
            Ok(()) => Ok(()),
            Err(failure) => {
                note_failure(resource, Action::Delete, &failure);
                let col = self.fallback_collection(resource, Action::Delete)?;
                finish(resource, Action::Delete, col.delete(id).await.map(|_existed| ()))
            }
        }
    }

    fn fallback_collection(&self, resource: &str, action: Action) -> Result<Arc<dyn DocumentCollection>, ClientError> {
        self.store.collection(resource).map_err(|source| {
            FALLBACK_TOTAL.with_label_values(&[resource, action.as_str(), "error"]).inc();
            ClientError::Fallback { resource: resource.to_string(), action, source }
        })
    }
}

fn note_failure(resource: &str, action: Action, failure: &PrimaryFailure) {
    let cause = failure.cause();
    PRIMARY_FAILURES_TOTAL.with_label_values(&[resource, cause]).inc();
    match failure {
        PrimaryFailure::Status { status, body } if failure.is_rejection() => warn!(
            resource,
            action = %action,
            cause,
            status,
            body = %body,
            "primary API rejected the request; using the document store directly, backend validation is bypassed"
        ),
        _ => warn!(
            resource,
            action = %action,
            cause,
            error = %failure,
            "primary API unavailable; using the document store directly"
        ),
    }
}

fn finish<T>(resource: &str, action: Action, result: Result<T, ServiceError>) -> Result<T, ClientError> {
    match result {
        Ok(v) => {
            FALLBACK_TOTAL.with_label_values(&[resource, action.as_str(), "ok"]).inc();
            debug!(resource, action = %action, "fallback completed");
            Ok(v)
        }
        Err(source) => {
            FALLBACK_TOTAL.with_label_values(&[resource, action.as_str(), "error"]).inc();
            Err(ClientError::Fallback { resource: resource.to_string(), action, source })
        }
    }
}
