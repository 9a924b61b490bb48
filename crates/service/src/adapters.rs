//! Typed adapters mapping domain records onto document collections.

use std::{collections::HashMap, marker::PhantomData, sync::Arc};

use models::{errors::ModelError, to_document, Booking, Category, Document, Provider, Resource, Service, Stored};
use tracing::warn;

use crate::errors::ServiceError;
use crate::storage::{DocumentCollection, DocumentStore};

/// Every collection the console persists.
pub const COLLECTIONS: [&str; 4] = [
    Service::COLLECTION,
    Category::COLLECTION,
    Provider::COLLECTION,
    Booking::COLLECTION,
];

pub fn is_known_collection(name: &str) -> bool {
    COLLECTIONS.iter().any(|c| *c == name)
}

fn check<T: Resource>(doc: &Document, validate: fn(&T) -> Result<(), ModelError>) -> Result<(), ServiceError> {
    let record: T = serde_json::from_value(serde_json::Value::Object(doc.clone()))
        .map_err(|e| ModelError::Malformed(e.to_string()))?;
    validate(&record)?;
    Ok(())
}

/// Check a raw document against the record type stored in `collection`.
pub fn validate_document(collection: &str, doc: &Document) -> Result<(), ServiceError> {
    match collection {
        Service::COLLECTION => check::<Service>(doc, Service::validate),
        Category::COLLECTION => check::<Category>(doc, Category::validate),
        Provider::COLLECTION => check::<Provider>(doc, Provider::validate),
        Booking::COLLECTION => check::<Booking>(doc, Booking::validate),
        other => Err(ServiceError::not_found(other)),
    }
}

pub struct ResourceAdapter<T> {
    collection: Arc<dyn DocumentCollection>,
    _record: PhantomData<fn() -> T>,
}

pub type ServicesAdapter = ResourceAdapter<Service>;
pub type CategoriesAdapter = ResourceAdapter<Category>;
pub type ProvidersAdapter = ResourceAdapter<Provider>;
pub type BookingsAdapter = ResourceAdapter<Booking>;

impl<T> Clone for ResourceAdapter<T> {
    fn clone(&self) -> Self {
        Self { collection: Arc::clone(&self.collection), _record: PhantomData }
    }
}

impl<T: Resource> ResourceAdapter<T> {
    pub fn new(store: &dyn DocumentStore) -> Result<Self, ServiceError> {
        Ok(Self { collection: store.collection(T::COLLECTION)?, _record: PhantomData })
    }

    /// All records; documents that no longer fit the record shape are skipped with a warning.
    pub async fn list(&self) -> Result<Vec<Stored<T>>, ServiceError> {
        let docs = self.collection.list().await?;
        let mut out = Vec::with_capacity(docs.len());
        for doc in docs {
            match Stored::<T>::from_document(doc) {
                Ok(rec) => out.push(rec),
                Err(e) => warn!(collection = T::COLLECTION, error = %e, "skipping malformed document"),
            }
        }
        Ok(out)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Stored<T>>, ServiceError> {
        match self.collection.get(id).await? {
            Some(doc) => Ok(Some(Stored::<T>::from_document(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, record: &T) -> Result<String, ServiceError> {
        self.collection.create(to_document(record)?).await
    }

    pub async fn update(&self, id: &str, record: &T) -> Result<(), ServiceError> {
        self.collection.update(id, to_document(record)?).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        self.collection.delete(id).await
    }
}

impl CategoriesAdapter {
    /// Categories with `service_count` filled from the given services.
    pub async fn list_with_service_counts(&self, services: &ServicesAdapter) -> Result<Vec<Stored<Category>>, ServiceError> {
        let categories = self.list().await?;
        let services = services.list().await?;
        Ok(with_service_counts(categories, &services))
    }
}

fn count_by_category<'a>(categories: impl Iterator<Item = &'a str>) -> HashMap<&'a str, u32> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for c in categories {
        *counts.entry(c).or_default() += 1;
    }
    counts
}

pub fn with_service_counts(mut categories: Vec<Stored<Category>>, services: &[Stored<Service>]) -> Vec<Stored<Category>> {
    let counts = count_by_category(services.iter().map(|s| s.record.category.as_str()));
    for c in &mut categories {
        c.record.service_count = Some(counts.get(c.id.as_str()).copied().unwrap_or(0));
    }
    categories
}

/// Document-level variant of [`with_service_counts`] for untyped listings.
pub fn attach_service_counts(categories: &mut [Document], services: &[Document]) {
    let counts = count_by_category(
        services
            .iter()
            .filter_map(|s| s.get("category").and_then(serde_json::Value::as_str)),
    );
    for c in categories.iter_mut() {
        let n = c
            .get(models::ID_FIELD)
            .and_then(serde_json::Value::as_str)
            .and_then(|id| counts.get(id).copied())
            .unwrap_or(0);
        c.insert("serviceCount".to_string(), n.into());
    }
}

/// Category documents of `store` with `serviceCount` filled from the services collection.
pub async fn list_categories_with_counts(store: &dyn DocumentStore) -> Result<Vec<Document>, ServiceError> {
    let mut categories = store.collection(Category::COLLECTION)?.list().await?;
    let services = store.collection(Service::COLLECTION)?.list().await?;
    attach_service_counts(&mut categories, &services);
    Ok(categories)
}
