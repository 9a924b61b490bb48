//! Domain records of the marketplace console.
//!
//! The document store is schemaless: records are converted to and from plain
//! JSON object maps ([`Document`]) at the store boundary. Typed records here are
//! what forms and typed clients work with.

pub mod booking;
pub mod category;
pub mod errors;
pub mod provider;
pub mod service;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

pub use booking::{Booking, BookingStatus};
pub use category::Category;
pub use errors::ModelError;
pub use provider::Provider;
pub use service::{Destination, Service, ServiceKind, TripRoute};

/// A schemaless document: field name to JSON value.
pub type Document = Map<String, Value>;

pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "createdAt";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// A record kind persisted in its own collection.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;

    /// Fields computed on read that must never be written back.
    fn derived_fields() -> &'static [&'static str] { &[] }

    /// Optional fields written as explicit `null` when unset, so a merging update clears them.
    fn clearable_fields() -> &'static [&'static str] { &[] }
}

/// A record as read back from the store: assigned id, write timestamps and the record fields.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stored<T> {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub record: T,
}

impl<T: Resource> Stored<T> {
    pub fn from_document(doc: Document) -> Result<Self, ModelError> {
        serde_json::from_value(Value::Object(doc)).map_err(|e| ModelError::Malformed(e.to_string()))
    }
}

/// Convert a record into the document written to the store.
///
/// Identifier, timestamps and derived fields are stripped; the writing layer owns them.
/// Unset clearable fields come out as `null`.
pub fn to_document<T: Resource>(record: &T) -> Result<Document, ModelError> {
    match serde_json::to_value(record).map_err(|e| ModelError::Malformed(e.to_string()))? {
        Value::Object(mut map) => {
            for key in [ID_FIELD, CREATED_AT_FIELD, UPDATED_AT_FIELD].iter().chain(T::derived_fields()) {
                map.remove(*key);
            }
            for key in T::clearable_fields() {
                map.entry(key.to_string()).or_insert(Value::Null);
            }
            Ok(map)
        }
        other => Err(ModelError::Malformed(format!("expected an object, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stored_reads_id_timestamps_and_fields() {
        let doc = json!({
            "id": "p1",
            "createdAt": "2024-05-01T10:00:00Z",
            "name": "أبو فهد",
            "category": "internal_delivery",
            "phone": "0500000000",
            "whatsapp": "0500000000",
            "services": ["توصيل"],
            "rating": 4.5,
            "available": true
        });
        let Value::Object(doc) = doc else { unreachable!() };
        let stored = Stored::<Provider>::from_document(doc).unwrap();
        assert_eq!(stored.id, "p1");
        assert!(stored.created_at.is_some());
        assert!(stored.updated_at.is_none());
        assert_eq!(stored.record.name, "أبو فهد");
    }

    #[test]
    fn to_document_strips_store_owned_fields() {
        let cat = Category {
            name: "توصيل".into(),
            description: String::new(),
            icon: "🚚".into(),
            color: "#22c55e".into(),
            service_count: Some(3),
        };
        let doc = to_document(&cat).unwrap();
        assert!(!doc.contains_key("serviceCount"));
        assert_eq!(doc["name"], "توصيل");
    }

    #[test]
    fn unset_optionals_are_written_as_null() {
        let service = Service { name: "توصيل".into(), category: "c1".into(), ..Service::default() };
        let doc = to_document(&service).unwrap();
        for key in ["mainImage", "serviceType", "serviceOptions", "destinations", "startLocation", "endLocation"] {
            assert_eq!(doc.get(key), Some(&Value::Null), "{key}");
        }

        let delivery = Service {
            kind: Some(ServiceKind::internal_delivery(vec!["سريع".into()])),
            main_image: Some("https://img/a.jpg".into()),
            ..service
        };
        let doc = to_document(&delivery).unwrap();
        assert_eq!(doc["serviceType"], "internal_delivery");
        assert_eq!(doc["serviceOptions"], json!(["سريع"]));
        assert_eq!(doc["mainImage"], "https://img/a.jpg");
        assert_eq!(doc["startLocation"], Value::Null);

        // nulls read back as unset
        let stored = Stored::<Service>::from_document(with_id(to_document(&Service::default()).unwrap())).unwrap();
        assert_eq!(stored.record.kind, None);
        assert_eq!(stored.record.main_image, None);
    }

    fn with_id(mut doc: Document) -> Document {
        doc.insert(ID_FIELD.into(), json!("s1"));
        doc
    }
}
