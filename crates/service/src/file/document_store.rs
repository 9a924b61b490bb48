use std::{path::PathBuf, sync::Arc};

use dashmap::DashMap;

use crate::errors::ServiceError;
use crate::storage::{json_collection::JsonCollection, validate_collection_name, DocumentCollection, DocumentStore};

/// File-backed document store: one `<collection>.json` per collection under `data_dir`.
#[derive(Clone)]
pub struct FileDocumentStore {
    data_dir: PathBuf,
    collections: Arc<DashMap<String, Arc<JsonCollection>>>,
}

impl FileDocumentStore {
    /// Initialize the store and open the given collections eagerly.
    pub async fn open<P: Into<PathBuf>>(data_dir: P, collections: &[&str]) -> Result<Arc<Self>, ServiceError> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| ServiceError::Db(format!("cannot create {}: {e}", data_dir.display())))?;
        let opened = DashMap::new();
        for name in collections {
            validate_collection_name(name)?;
            let col = JsonCollection::open(name, data_dir.join(format!("{name}.json"))).await?;
            opened.insert(name.to_string(), Arc::new(col));
        }
        Ok(Arc::new(Self { data_dir, collections: Arc::new(opened) }))
    }

    pub fn data_dir(&self) -> &std::path::Path { &self.data_dir }
}

impl DocumentStore for FileDocumentStore {
    /// Only collections opened at startup are served; unknown names are a validation error.
    fn collection(&self, name: &str) -> Result<Arc<dyn DocumentCollection>, ServiceError> {
        validate_collection_name(name)?;
        match self.collections.get(name) {
            Some(col) => Ok(Arc::clone(col.value()) as Arc<dyn DocumentCollection>),
            None => Err(ServiceError::not_found(&format!("collection {name}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[tokio::test]
    async fn serves_opened_collections_only() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("doc_store_{}", Uuid::new_v4()));
        let store = FileDocumentStore::open(&dir, &["providers", "services"]).await?;
        assert!(dir.join("providers.json").exists());

        let providers = store.collection("providers")?;
        let Some(payload) = json!({"name": "نور"}).as_object().cloned() else { unreachable!() };
        providers.create(payload).await?;
        assert_eq!(store.collection("providers")?.list().await?.len(), 1);

        assert!(matches!(store.collection("bookings"), Err(ServiceError::NotFound(_))));
        assert!(matches!(store.collection("../x"), Err(ServiceError::Validation(_))));

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
