use std::net::SocketAddr;
use std::path::PathBuf;

use reqwest::StatusCode;
use serde_json::{json, Value};
use server::routes::{self, ServerState};
use service::{adapters::COLLECTIONS, file::document_store::FileDocumentStore};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

struct TestApp {
    base_url: String,
    root: PathBuf,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn start_server() -> anyhow::Result<TestApp> {
    let root = std::env::temp_dir().join(format!("server_api_{}", Uuid::new_v4()));
    let frontend = root.join("frontend");
    tokio::fs::create_dir_all(&frontend).await?;
    tokio::fs::write(frontend.join("index.html"), "<!doctype html><title>لوحة التحكم</title>").await?;
    let store = FileDocumentStore::open(root.join("data"), &COLLECTIONS).await?;

    let app = routes::build_router(
        ServerState::new(store),
        &frontend.to_string_lossy(),
        CorsLayer::very_permissive(),
    );
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });
    Ok(TestApp { base_url: format!("http://{}", addr), root })
}

#[tokio::test]
async fn provider_crud_over_http() -> anyhow::Result<()> {
    let app = start_server().await?;
    let http = reqwest::Client::new();

    let created: Value = http
        .post(app.url("/api/providers"))
        .json(&json!({"name": "أبو فهد", "category": "c1", "phone": "0500000000", "rating": 4.5}))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(created["success"], json!(true));
    let id = created["id"].as_str().expect("id").to_string();

    let list: Vec<Value> = http.get(app.url("/api/providers")).send().await?.json().await?;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], json!(id));
    assert_eq!(list[0]["name"], json!("أبو فهد"));
    assert!(list[0]["createdAt"].is_string());

    let res = http
        .put(app.url(&format!("/api/providers?id={id}")))
        .json(&json!({"available": false}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let ack: Value = res.json().await?;
    assert_eq!(ack, json!({"success": true}));

    let list: Vec<Value> = http.get(app.url("/api/providers")).send().await?.json().await?;
    assert_eq!(list[0]["available"], json!(false));
    assert_eq!(list[0]["phone"], json!("0500000000"));

    let res = http.delete(app.url(&format!("/api/providers?id={id}"))).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let list: Vec<Value> = http.get(app.url("/api/providers")).send().await?.json().await?;
    assert!(list.is_empty());

    // deleting again still succeeds
    let res = http.delete(app.url(&format!("/api/providers?id={id}"))).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let _ = tokio::fs::remove_dir_all(&app.root).await;
    Ok(())
}

#[tokio::test]
async fn request_errors_are_json() -> anyhow::Result<()> {
    let app = start_server().await?;
    let http = reqwest::Client::new();

    let res = http.get(app.url("/api/users")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], json!("Not Found"));

    let res = http.put(app.url("/api/services")).json(&json!({"name": "x"})).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = http.delete(app.url("/api/services?id=")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = http.post(app.url("/api/categories")).json(&json!(["not", "an", "object"])).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert!(body["details"].as_str().unwrap_or_default().contains("array"));

    // categories need a name
    let res = http.post(app.url("/api/categories")).json(&json!({"icon": "🚚"})).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = http
        .put(app.url("/api/categories?id=missing"))
        .json(&json!({"name": "x"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let _ = tokio::fs::remove_dir_all(&app.root).await;
    Ok(())
}

#[tokio::test]
async fn health_metrics_and_frontend() -> anyhow::Result<()> {
    let app = start_server().await?;
    let http = reqwest::Client::new();

    let health: Value = http.get(app.url("/health")).send().await?.json().await?;
    assert_eq!(health, json!({"status": "ok"}));

    let res = http.get(app.url("/metrics")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = http.get(app.url("/api-docs/openapi.json")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let doc: Value = res.json().await?;
    assert!(doc["paths"]["/api/{resource}"].is_object());

    // unknown console routes fall back to index.html
    let page = http.get(app.url("/providers/edit")).send().await?.text().await?;
    assert!(page.contains("لوحة التحكم"));

    let _ = tokio::fs::remove_dir_all(&app.root).await;
    Ok(())
}

#[tokio::test]
async fn categories_list_counts_their_services() -> anyhow::Result<()> {
    let app = start_server().await?;
    let http = reqwest::Client::new();

    let created: Value = http
        .post(app.url("/api/categories"))
        .json(&json!({"name": "صيانة منزلية", "icon": "🔧"}))
        .send()
        .await?
        .json()
        .await?;
    let category = created["id"].as_str().expect("id").to_string();
    let empty: Value = http.post(app.url("/api/categories")).json(&json!({"name": "رحلات"})).send().await?.json().await?;

    for name in ["سباكة", "كهرباء"] {
        let res = http
            .post(app.url("/api/services"))
            .json(&json!({"name": name, "category": category, "price": "100 ريال"}))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let list: Vec<Value> = http.get(app.url("/api/categories")).send().await?.json().await?;
    let count = |id: &Value| list.iter().find(|c| &c["id"] == id).map(|c| c["serviceCount"].clone());
    assert_eq!(count(&json!(category)), Some(json!(2)));
    assert_eq!(count(&empty["id"]), Some(json!(0)));

    let _ = tokio::fs::remove_dir_all(&app.root).await;
    Ok(())
}
