//! Primary path: the HTTP API in front of the document store.

use std::time::Duration;

use models::Document;
use serde_json::Value;
use tracing::debug;

use crate::errors::{ClientError, PrimaryFailure};

/// One CRUD call against `{base_url}/{resource}`.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    List,
    Create(&'a Document),
    Update(&'a str, &'a Document),
    Delete(&'a str),
}

impl Operation<'_> {
    pub fn method(&self) -> reqwest::Method {
        match self {
            Operation::List => reqwest::Method::GET,
            Operation::Create(_) => reqwest::Method::POST,
            Operation::Update(..) => reqwest::Method::PUT,
            Operation::Delete(_) => reqwest::Method::DELETE,
        }
    }
}

#[derive(Clone)]
pub struct PrimaryApi {
    http: reqwest::Client,
    base_url: String,
}

impl PrimaryApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn from_config(cfg: &configs::ApiConfig) -> Result<Self, ClientError> {
        Self::new(cfg.base_url(), Duration::from_secs(cfg.request_timeout_secs))
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    /// Issue the call and return the parsed JSON body.
    ///
    /// The body is read as text first; see [`classify_body`] for how it is judged.
    pub async fn send(&self, resource: &str, op: Operation<'_>) -> Result<Value, PrimaryFailure> {
        let url = format!("{}/{}", self.base_url, resource);
        let mut req = self.http.request(op.method(), &url);
        req = match op {
            Operation::List => req,
            Operation::Create(body) => req.json(body),
            Operation::Update(id, body) => req.query(&[("id", id)]).json(body),
            Operation::Delete(id) => req.query(&[("id", id)]),
        };

        let resp = req.send().await.map_err(|e| PrimaryFailure::Transport(e.to_string()))?;
        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(|e| PrimaryFailure::Transport(e.to_string()))?;
        debug!(%url, status, bytes = text.len(), "primary API responded");
        classify_body(status, &text)
    }
}

/// Judge a primary response body. Status is only looked at after a successful parse.
pub fn classify_body(status: u16, body: &str) -> Result<Value, PrimaryFailure> {
    let trimmed = body.trim_start_matches('\u{feff}').trim_start();
    if trimmed.is_empty() {
        return Err(PrimaryFailure::EmptyBody { status });
    }
    if looks_like_html(trimmed) {
        return Err(PrimaryFailure::HtmlBody { status });
    }
    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| PrimaryFailure::MalformedJson { status, error: e.to_string() })?;
    if !(200..300).contains(&status) {
        return Err(PrimaryFailure::Status { status, body: value });
    }
    Ok(value)
}

fn looks_like_html(trimmed: &str) -> bool {
    if !trimmed.starts_with('<') {
        return false;
    }
    let head: String = trimmed.chars().take(16).collect::<String>().to_ascii_lowercase();
    ["<!doctype", "<html", "<head", "<body", "<!--"].iter().any(|p| head.starts_with(p))
}

/// `GET` must answer with an array of objects.
pub fn expect_documents(value: Value) -> Result<Vec<Document>, PrimaryFailure> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(doc) => Ok(doc),
                other => Err(PrimaryFailure::UnexpectedShape(format!("list item is not an object: {other}"))),
            })
            .collect(),
        other => Err(PrimaryFailure::UnexpectedShape(format!("expected an array, got {}", kind_of(&other)))),
    }
}

/// `POST` must answer with an object carrying the new string `id`.
pub fn expect_created_id(value: Value) -> Result<String, PrimaryFailure> {
    match value.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        _ => Err(PrimaryFailure::UnexpectedShape("create response has no id".into())),
    }
}

/// `PUT`/`DELETE` accept any JSON except an explicit `"success": false`.
pub fn expect_ack(value: Value) -> Result<(), PrimaryFailure> {
    match value.get("success") {
        Some(Value::Bool(false)) => Err(PrimaryFailure::UnexpectedShape("success is false".into())),
        _ => Ok(()),
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn html_error_page_is_not_a_parse_error() {
        let page = "\n  <!DOCTYPE html><html><body>404 Not Found</body></html>";
        assert!(matches!(classify_body(200, page), Err(PrimaryFailure::HtmlBody { status: 200 })));
        assert!(matches!(classify_body(502, "<HTML>bad gateway"), Err(PrimaryFailure::HtmlBody { status: 502 })));
    }

    #[test]
    fn empty_and_whitespace_bodies_fail_over() {
        assert!(matches!(classify_body(200, ""), Err(PrimaryFailure::EmptyBody { .. })));
        assert!(matches!(classify_body(204, " \n\t"), Err(PrimaryFailure::EmptyBody { status: 204 })));
    }

    #[test]
    fn malformed_json_is_reported_with_status() {
        match classify_body(200, "{\"id\": ") {
            Err(PrimaryFailure::MalformedJson { status, .. }) => assert_eq!(status, 200),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn status_is_checked_after_parse() {
        // a 500 with a non-JSON body is a parse failure, not a status failure
        assert!(matches!(classify_body(500, "oops"), Err(PrimaryFailure::MalformedJson { status: 500, .. })));
        match classify_body(422, r#"{"error":"invalid"}"#) {
            Err(PrimaryFailure::Status { status, body }) => {
                assert_eq!(status, 422);
                assert_eq!(body["error"], "invalid");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(classify_body(200, "[]").unwrap(), json!([]));
    }

    #[test]
    fn response_shapes_are_validated() {
        assert_eq!(expect_documents(json!([{"id": "a"}])).unwrap().len(), 1);
        assert!(expect_documents(json!({"items": []})).is_err());
        assert!(expect_documents(json!([1, 2])).is_err());
        assert_eq!(expect_created_id(json!({"id": "x1", "success": true})).unwrap(), "x1");
        assert!(expect_created_id(json!({"success": true})).is_err());
        assert!(expect_ack(json!({"success": true})).is_ok());
        assert!(expect_ack(json!({"success": false})).is_err());
    }
}
