//! Connection settings: parse/write `connection.conf` and layer CLI overrides on top.
//!
//! The file uses the same `key = value` format as the theme and keybinding files.
//! Unknown keys are ignored; malformed numbers keep the default.
use clap::Parser;
use std::time::Duration;

use super::conf::{self, parse_bool};
use crate::model::ResourceKind;

/// Where the API lives and how the list screen talks to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Root of the REST API; resource endpoints are appended to it.
    pub api_url: String,
    /// Prefix for photo URLs.
    pub image_url: String,
    /// Path (under `api_url`) receiving multipart photo uploads.
    pub upload_endpoint: String,
    /// Bearer token sent with every request, if any.
    pub token: Option<String>,
    pub page_size: u32,
    /// Idle time after the last keystroke before a search is applied. 0 = every keystroke.
    pub search_debounce_ms: u64,
    pub timeout_secs: u64,
    /// Use the built-in demo data instead of the network.
    pub offline: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000/api/v1/".to_string(),
            image_url: "http://localhost:8000/upload/".to_string(),
            upload_endpoint: "auth/upload".to_string(),
            token: None,
            page_size: 10,
            search_debounce_ms: 250,
            timeout_secs: 15,
            offline: false,
        }
    }
}

impl ConnectionConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Read `path`, or the first `connection.conf` found in the config directories;
    /// if none exists write the defaults to `path` and use them.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        if let Some(existing) = conf::config_file_read_path("connection.conf") {
            return Self::from_file(&existing).unwrap_or_default();
        }
        let cfg = Self::default();
        if let Err(err) = cfg.write_file(path) {
            tracing::warn!(path, error = %err, "could not write default connection.conf");
        }
        cfg
    }

    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    pub fn parse(contents: &str) -> Self {
        let mut cfg = Self::default();
        for (key, value) in conf::entries(contents) {
            match key {
                "api_url" => cfg.api_url = value.to_string(),
                "image_url" => cfg.image_url = value.to_string(),
                "upload_endpoint" => cfg.upload_endpoint = value.to_string(),
                "token" => cfg.token = Some(value.to_string()),
                "page_size" => cfg.page_size = value.parse().unwrap_or(cfg.page_size).max(1),
                "search_debounce_ms" => {
                    cfg.search_debounce_ms = value.parse().unwrap_or(cfg.search_debounce_ms)
                }
                "timeout_secs" => cfg.timeout_secs = value.parse().unwrap_or(cfg.timeout_secs),
                "offline" => cfg.offline = parse_bool(value),
                _ => tracing::debug!(key, "unknown connection.conf key"),
            }
        }
        cfg
    }

    /// Persist the settings. The token is never written back.
    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# records-console connection settings\n");
        buf.push_str("# token = <bearer token>   (optional; prefer RECORDS_TOKEN)\n\n");
        let _ = writeln!(buf, "api_url = {}", self.api_url);
        let _ = writeln!(buf, "image_url = {}", self.image_url);
        let _ = writeln!(buf, "upload_endpoint = {}", self.upload_endpoint);
        let _ = writeln!(buf, "page_size = {}", self.page_size);
        let _ = writeln!(buf, "search_debounce_ms = {}", self.search_debounce_ms);
        let _ = writeln!(buf, "timeout_secs = {}", self.timeout_secs);
        let _ = writeln!(buf, "offline = {}", self.offline);
        std::fs::write(path, buf)
    }
}

/// Command-line flags. Every flag can also come from the environment and wins
/// over `connection.conf`.
#[derive(Debug, Parser)]
#[command(name = "records-console", version, about)]
pub struct Cli {
    /// API root, e.g. https://example.com/api/v1/
    #[arg(long, env = "RECORDS_API_URL")]
    pub api_url: Option<String>,
    /// Prefix for photo URLs.
    #[arg(long, env = "RECORDS_IMAGE_URL")]
    pub image_url: Option<String>,
    #[arg(long, env = "RECORDS_UPLOAD_ENDPOINT")]
    pub upload_endpoint: Option<String>,
    #[arg(long, env = "RECORDS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    #[arg(long, env = "RECORDS_PAGE_SIZE")]
    pub page_size: Option<u32>,
    #[arg(long, env = "RECORDS_SEARCH_DEBOUNCE_MS")]
    pub search_debounce_ms: Option<u64>,
    /// Work on built-in demo data; nothing goes over the network.
    #[arg(long, env = "RECORDS_OFFLINE")]
    pub offline: bool,
    /// Tab to start on: users or posts.
    #[arg(long, default_value = "users", value_parser = parse_resource)]
    pub resource: ResourceKind,
    /// Path of connection.conf (default: config directory).
    #[arg(long)]
    pub config: Option<String>,
    #[arg(long, env = "RECORDS_LOG_FILE", default_value = "records-console.log")]
    pub log_file: String,
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

fn parse_resource(s: &str) -> Result<ResourceKind, String> {
    ResourceKind::parse(s).ok_or_else(|| format!("unknown resource '{s}' (expected users or posts)"))
}

impl Cli {
    pub fn apply_to(&self, cfg: &mut ConnectionConfig) {
        if let Some(v) = &self.api_url {
            cfg.api_url = v.clone();
        }
        if let Some(v) = &self.image_url {
            cfg.image_url = v.clone();
        }
        if let Some(v) = &self.upload_endpoint {
            cfg.upload_endpoint = v.clone();
        }
        if self.token.is_some() {
            cfg.token = self.token.clone();
        }
        if let Some(v) = self.page_size {
            cfg.page_size = v.max(1);
        }
        if let Some(v) = self.search_debounce_ms {
            cfg.search_debounce_ms = v;
        }
        cfg.offline |= self.offline;
    }
}
