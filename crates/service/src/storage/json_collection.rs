use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use dashmap::DashMap;
use models::{Document, CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD};
use once_cell::sync::Lazy;
use serde_json::Value;
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

use common::metrics::STORE_WRITES_TOTAL;

use crate::errors::ServiceError;
use crate::storage::DocumentCollection;

/// One writer lock per collection file, shared by every handle in the process.
static FILE_LOCKS: Lazy<DashMap<PathBuf, Arc<Mutex<()>>>> = Lazy::new(DashMap::new);

fn lock_for(path: &Path) -> Arc<Mutex<()>> {
    Arc::clone(FILE_LOCKS.entry(path.to_path_buf()).or_insert_with(|| Arc::new(Mutex::new(()))).value())
}

/// JSON file-backed document collection.
///
/// The whole file is read for every operation and replaced wholesale on every
/// write (temp file plus rename), so several handles on the same file (server
/// and client fallback) observe each other's writes and never see a partial file.
/// Writers on the same file are serialised within the process; across processes
/// the last write wins.
pub struct JsonCollection {
    name: String,
    file_path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

fn now_stamp() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl JsonCollection {
    /// Open the collection file, creating it with an empty map if missing.
    ///
    /// The path is canonicalised so every handle on one file shares its writer lock.
    pub async fn open<P: Into<PathBuf>>(name: &str, path: P) -> Result<Self, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }
        match fs::OpenOptions::new().write(true).create_new(true).open(&file_path).await {
            Ok(mut file) => {
                file.write_all(b"{}").await.map_err(|e| ServiceError::Db(e.to_string()))?;
                file.flush().await.map_err(|e| ServiceError::Db(e.to_string()))?;
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(ServiceError::Db(e.to_string())),
        }
        let canonical = fs::canonicalize(&file_path).await;
        let file_path = canonical.unwrap_or(file_path);
        let write_lock = lock_for(&file_path);
        Ok(Self { name: name.to_string(), file_path, write_lock })
    }

    async fn read_map(&self) -> Result<Option<BTreeMap<String, Document>>, ServiceError> {
        match fs::read(&self.file_path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Some(BTreeMap::new())),
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(map) => Ok(Some(map)),
                Err(e) => {
                    warn!(collection = %self.name, error = %e, "collection file is not valid JSON");
                    Ok(None)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Some(BTreeMap::new())),
            Err(e) => Err(ServiceError::Db(e.to_string())),
        }
    }

    /// Read path: an unreadable file lists as empty.
    async fn load(&self) -> Result<BTreeMap<String, Document>, ServiceError> {
        Ok(self.read_map().await?.unwrap_or_default())
    }

    /// Write path: refuse to rewrite a file that does not parse.
    async fn load_for_write(&self) -> Result<BTreeMap<String, Document>, ServiceError> {
        self.read_map().await?.ok_or_else(|| {
            ServiceError::Db(format!("{} is not valid JSON; refusing to overwrite it", self.file_path.display()))
        })
    }

    async fn save(&self, map: &BTreeMap<String, Document>) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(map).map_err(|e| ServiceError::Db(e.to_string()))?;
        let file_name = self.file_path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let tmp = self.file_path.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()));
        if let Err(e) = fs::write(&tmp, data).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::Db(e.to_string()));
        }
        if let Err(e) = fs::rename(&tmp, &self.file_path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::Db(e.to_string()));
        }
        Ok(())
    }
}

fn with_id(id: &str, mut doc: Document) -> Document {
    doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    doc
}

fn strip_store_owned(data: &mut Document) {
    data.remove(ID_FIELD);
    data.remove(CREATED_AT_FIELD);
    data.remove(UPDATED_AT_FIELD);
}

#[async_trait]
impl DocumentCollection for JsonCollection {
    fn name(&self) -> &str { &self.name }

    async fn list(&self) -> Result<Vec<Document>, ServiceError> {
        let map = self.load().await?;
        let mut docs: Vec<Document> = map.into_iter().map(|(id, doc)| with_id(&id, doc)).collect();
        // oldest first, id as tie-breaker (BTreeMap order already sorts by id)
        docs.sort_by(|a, b| {
            let ka = a.get(CREATED_AT_FIELD).and_then(Value::as_str).unwrap_or_default();
            let kb = b.get(CREATED_AT_FIELD).and_then(Value::as_str).unwrap_or_default();
            ka.cmp(kb)
        });
        Ok(docs)
    }

    async fn get(&self, id: &str) -> Result<Option<Document>, ServiceError> {
        let map = self.load().await?;
        Ok(map.get(id).cloned().map(|doc| with_id(id, doc)))
    }

    async fn create(&self, mut data: Document) -> Result<String, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load_for_write().await?;
        let id = Uuid::new_v4().simple().to_string();
        strip_store_owned(&mut data);
        let stamp = now_stamp();
        data.insert(CREATED_AT_FIELD.to_string(), stamp.clone());
        data.insert(UPDATED_AT_FIELD.to_string(), stamp);
        map.insert(id.clone(), data);
        self.save(&map).await?;
        STORE_WRITES_TOTAL.with_label_values(&[self.name.as_str(), "create"]).inc();
        debug!(collection = %self.name, %id, "document created");
        Ok(id)
    }

    async fn update(&self, id: &str, mut data: Document) -> Result<(), ServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load_for_write().await?;
        let existing = map.get_mut(id).ok_or_else(|| ServiceError::not_found(&format!("{} document {id}", self.name)))?;
        strip_store_owned(&mut data);
        existing.extend(data);
        existing.insert(UPDATED_AT_FIELD.to_string(), now_stamp());
        self.save(&map).await?;
        STORE_WRITES_TOTAL.with_label_values(&[self.name.as_str(), "update"]).inc();
        debug!(collection = %self.name, %id, "document updated");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load_for_write().await?;
        let existed = map.remove(id).is_some();
        if existed {
            self.save(&map).await?;
            STORE_WRITES_TOTAL.with_label_values(&[self.name.as_str(), "delete"]).inc();
        }
        debug!(collection = %self.name, %id, existed, "document delete");
        Ok(existed)
    }
}
