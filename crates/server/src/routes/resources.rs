//! `/api/{resource}` handlers. Bodies are schemaless JSON objects; ids travel in the `id` query parameter.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use common::types::{Ack, Created};
use models::{Category, Document, Resource};
use serde::Deserialize;
use serde_json::Value;
use service::adapters::{is_known_collection, list_categories_with_counts, validate_document};
use service::storage::DocumentCollection;
use tracing::info;
use utoipa::IntoParams;

use super::ServerState;
use crate::errors::JsonApiError;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IdQuery {
    /// Document identifier.
    pub id: Option<String>,
}

impl IdQuery {
    fn require(self) -> Result<String, JsonApiError> {
        match self.id.map(|id| id.trim().to_string()) {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(JsonApiError::bad_request("missing id query parameter")),
        }
    }
}

fn collection(state: &ServerState, resource: &str) -> Result<Arc<dyn DocumentCollection>, JsonApiError> {
    if !is_known_collection(resource) {
        return Err(JsonApiError::not_found(format!("unknown resource: {resource}")));
    }
    Ok(state.store.collection(resource)?)
}

fn into_object(body: Value) -> Result<Document, JsonApiError> {
    match body {
        Value::Object(doc) => Ok(doc),
        other => Err(JsonApiError::bad_request(format!("expected a JSON object, got {}", kind_of(&other)))),
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[utoipa::path(
    get,
    path = "/api/{resource}",
    tag = "resources",
    params(("resource" = String, Path, description = "services, categories, providers or bookings")),
    responses(
        (status = 200, description = "All documents of the collection", body = [crate::openapi::ProviderDoc]),
        (status = 404, description = "Unknown resource", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    Path(resource): Path<String>,
) -> Result<Json<Vec<Document>>, JsonApiError> {
    let col = collection(&state, &resource)?;
    let docs = if resource == Category::COLLECTION {
        list_categories_with_counts(state.store.as_ref()).await?
    } else {
        col.list().await?
    };
    info!(%resource, count = docs.len(), "list documents");
    Ok(Json(docs))
}

#[utoipa::path(
    post,
    path = "/api/{resource}",
    tag = "resources",
    params(("resource" = String, Path, description = "services, categories, providers or bookings")),
    request_body(content = crate::openapi::ProviderDoc, description = "Record fields; the shape depends on the resource"),
    responses(
        (status = 200, description = "Created", body = crate::openapi::CreatedDoc),
        (status = 400, description = "Body is not a valid record", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Unknown resource", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    Path(resource): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Created>, JsonApiError> {
    let col = collection(&state, &resource)?;
    let doc = into_object(body)?;
    validate_document(&resource, &doc)?;
    let id = col.create(doc).await?;
    info!(%resource, %id, "created document");
    Ok(Json(Created { id, success: true }))
}

#[utoipa::path(
    put,
    path = "/api/{resource}",
    tag = "resources",
    params(("resource" = String, Path, description = "services, categories, providers or bookings"), IdQuery),
    request_body(content = crate::openapi::ProviderDoc, description = "Fields to merge into the document"),
    responses(
        (status = 200, description = "Updated", body = crate::openapi::AckDoc),
        (status = 400, description = "Missing id or non-object body", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Unknown resource or document", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(resource): Path<String>,
    Query(q): Query<IdQuery>,
    Json(body): Json<Value>,
) -> Result<Json<Ack>, JsonApiError> {
    let col = collection(&state, &resource)?;
    let id = q.require()?;
    let doc = into_object(body)?;
    col.update(&id, doc).await?;
    info!(%resource, %id, "updated document");
    Ok(Json(Ack::ok()))
}

#[utoipa::path(
    delete,
    path = "/api/{resource}",
    tag = "resources",
    params(("resource" = String, Path, description = "services, categories, providers or bookings"), IdQuery),
    responses(
        (status = 200, description = "Deleted, or already absent", body = crate::openapi::AckDoc),
        (status = 400, description = "Missing id", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Unknown resource", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    Path(resource): Path<String>,
    Query(q): Query<IdQuery>,
) -> Result<Json<Ack>, JsonApiError> {
    let col = collection(&state, &resource)?;
    let id = q.require()?;
    let existed = col.delete(&id).await?;
    info!(%resource, %id, existed, "deleted document");
    Ok(Json(Ack::ok()))
}
