use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

/// Largest image accepted by the upload client (10 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub image_host: ImageHostConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 3001, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApiMode {
    #[default]
    Development,
    Production,
}

/// Where the data client sends its primary calls.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub mode: ApiMode,
    #[serde(default = "default_dev_port")]
    pub dev_port: u16,
    #[serde(default = "default_production_base_url")]
    pub production_base_url: String,
    /// Explicit override, wins over `mode`.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_dev_port() -> u16 { 3001 }
fn default_production_base_url() -> String { "/.netlify/functions/api".into() }
fn default_request_timeout() -> u64 { 10 }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            mode: ApiMode::default(),
            dev_port: default_dev_port(),
            production_base_url: default_production_base_url(),
            base_url: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    pub fn base_url(&self) -> String {
        if let Some(url) = self.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return url.trim_end_matches('/').to_string();
        }
        match self.mode {
            ApiMode::Development => format!("http://localhost:{}/api", self.dev_port),
            ApiMode::Production => self.production_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: String,
}

fn default_data_dir() -> String { "data".into() }
fn default_frontend_dir() -> String { "frontend".into() }

impl Default for StoreConfig {
    fn default() -> Self {
        Self { data_dir: default_data_dir(), frontend_dir: default_frontend_dir() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageHostConfig {
    #[serde(default)]
    pub cloud_name: String,
    #[serde(default)]
    pub upload_preset: String,
    /// Full endpoint override; defaults to the Cloudinary unsigned upload URL for `cloud_name`.
    #[serde(default)]
    pub upload_url: Option<String>,
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

fn default_max_bytes() -> u64 { DEFAULT_MAX_IMAGE_BYTES }

impl Default for ImageHostConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            upload_preset: String::new(),
            upload_url: None,
            max_bytes: default_max_bytes(),
        }
    }
}

impl ImageHostConfig {
    pub fn endpoint(&self) -> String {
        match self.upload_url.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(url) => url.to_string(),
            None => format!("https://api.cloudinary.com/v1_1/{}/image/upload", self.cloud_name),
        }
    }
}

/// `CONFIG_PATH` (default `config.toml`); defaults when the file does not exist.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_or_default(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

/// Like [`load_from_file`], but a missing file yields the defaults. Read and parse errors propagate.
pub fn load_or_default(path: &str) -> Result<AppConfig> {
    match load_from_file(path) {
        Ok(cfg) => Ok(cfg),
        Err(e) if is_missing_file(&e) => Ok(AppConfig::default()),
        Err(e) => Err(e.context(format!("cannot load {path}"))),
    }
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

impl AppConfig {
    /// Load `config.toml` (or defaults when absent), apply env overrides and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_env(|key| std::env::var(key).ok());
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay values from an environment lookup.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") { self.server.host = host; }
        if let Some(port) = lookup("SERVER_PORT").and_then(|p| p.parse().ok()) { self.server.port = port; }
        if let Some(w) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.parse().ok()) {
            self.server.worker_threads = Some(w);
        }
        match lookup("API_MODE").as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("production") => self.api.mode = ApiMode::Production,
            Some("development") => self.api.mode = ApiMode::Development,
            _ => {}
        }
        if let Some(url) = lookup("API_BASE_URL") { self.api.base_url = Some(url); }
        if let Some(dir) = lookup("DATA_DIR") { self.store.data_dir = dir; }
        if let Some(dir) = lookup("FRONTEND_DIR") { self.store.frontend_dir = dir; }
        if let Some(name) = lookup("CLOUDINARY_CLOUD_NAME") { self.image_host.cloud_name = name; }
        if let Some(preset) = lookup("CLOUDINARY_UPLOAD_PRESET") { self.image_host.upload_preset = preset; }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        if self.api.request_timeout_secs == 0 {
            return Err(anyhow!("api.request_timeout_secs must be a positive number of seconds"));
        }
        if self.store.data_dir.trim().is_empty() {
            self.store.data_dir = default_data_dir();
        }
        if self.image_host.max_bytes == 0 {
            self.image_host.max_bytes = DEFAULT_MAX_IMAGE_BYTES;
        }
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn parses_toml_sections_with_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [api]
            mode = "production"

            [image_host]
            cloud_name = "demo"
            upload_preset = "unsigned"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.api.base_url(), "/.netlify/functions/api");
        assert_eq!(cfg.store.data_dir, "data");
        assert_eq!(cfg.image_host.max_bytes, DEFAULT_MAX_IMAGE_BYTES);
        assert_eq!(cfg.image_host.endpoint(), "https://api.cloudinary.com/v1_1/demo/image/upload");
    }

    #[test]
    fn development_mode_targets_local_port() {
        let api = ApiConfig { dev_port: 4000, ..ApiConfig::default() };
        assert_eq!(api.base_url(), "http://localhost:4000/api");
    }

    #[test]
    fn env_overrides_win() {
        let env: HashMap<&str, &str> = [
            ("API_MODE", "Production"),
            ("API_BASE_URL", "http://127.0.0.1:9/api/"),
            ("CLOUDINARY_CLOUD_NAME", "env-cloud"),
            ("SERVER_PORT", "9090"),
        ]
        .into_iter()
        .collect();
        let mut cfg = AppConfig::default();
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string()));
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.api.mode, ApiMode::Production);
        assert_eq!(cfg.api.base_url(), "http://127.0.0.1:9/api");
        assert_eq!(cfg.image_host.cloud_name, "env-cloud");
        assert_eq!(cfg.server.port, 9090);
    }

    #[test]
    fn rejects_zero_port_and_timeout() {
        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.api.request_timeout_secs = 0;
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn missing_file_means_defaults_but_typos_fail() {
        let dir = std::env::temp_dir().join(format!("configs_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let missing = dir.join("absent.toml");
        let cfg = load_or_default(&missing.to_string_lossy()).unwrap();
        assert_eq!(cfg.server.port, 3001);

        let broken = dir.join("broken.toml");
        std::fs::write(&broken, "[server\nport = 8080\n").unwrap();
        let err = load_or_default(&broken.to_string_lossy()).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
