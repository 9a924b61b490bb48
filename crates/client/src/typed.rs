use std::marker::PhantomData;

use models::{to_document, Booking, Category, Provider, Resource, Service, Stored};
use tracing::warn;

use crate::errors::ClientError;
use crate::resilient::ResilientDataClient;

/// Typed view over the resilient client for one record kind.
pub struct TypedClient<T> {
    inner: ResilientDataClient,
    _record: PhantomData<fn() -> T>,
}

pub type ProvidersClient = TypedClient<Provider>;
pub type ServicesClient = TypedClient<Service>;
pub type CategoriesClient = TypedClient<Category>;
pub type BookingsClient = TypedClient<Booking>;

impl<T> Clone for TypedClient<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone(), _record: PhantomData }
    }
}

impl<T: Resource> TypedClient<T> {
    pub fn new(inner: ResilientDataClient) -> Self {
        Self { inner, _record: PhantomData }
    }

    pub async fn list(&self) -> Result<Vec<Stored<T>>, ClientError> {
        let docs = self.inner.list(T::COLLECTION).await?;
        let mut out = Vec::with_capacity(docs.len());
        for doc in docs {
            match Stored::<T>::from_document(doc) {
                Ok(rec) => out.push(rec),
                Err(e) => warn!(resource = T::COLLECTION, error = %e, "skipping record that does not match its type"),
            }
        }
        Ok(out)
    }

    pub async fn create(&self, record: &T) -> Result<String, ClientError> {
        self.inner.create(T::COLLECTION, to_document(record)?).await
    }

    pub async fn update(&self, id: &str, record: &T) -> Result<(), ClientError> {
        self.inner.update(T::COLLECTION, id, to_document(record)?).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.inner.delete(T::COLLECTION, id).await
    }
}
