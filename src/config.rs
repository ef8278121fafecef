use std::path::{Path, PathBuf};
use std::time::Duration;
use std::fs;

use serde::Deserialize;
use tracing::{info, warn};

use crate::app::routes::Route;

pub const CONFIG_FILE: &str = "config.json";
pub const LOCAL_DB_DIR: &str = "db";
pub const LOCAL_STORE_DB_FILE: &str = "cinelist_store.db";

const DEFAULT_CATALOG_SOURCE: &str = "assets/media.json";
const DEFAULT_CACHE_DIR: &str = ".cinelist_cache";
const DEFAULT_DEBOUNCE_MS: u64 = 300;
const DEFAULT_POSTER_WORKERS: usize = 4;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Local path or http(s) URL of the catalog document.
    pub catalog_source: String,
    pub store_path: PathBuf,
    pub cache_dir: PathBuf,
    pub filter_debounce: Duration,
    pub poster_workers: usize,
    pub start_route: Option<Route>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_source: DEFAULT_CATALOG_SOURCE.to_string(),
            store_path: PathBuf::from(LOCAL_DB_DIR).join(LOCAL_STORE_DB_FILE),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            filter_debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            poster_workers: DEFAULT_POSTER_WORKERS,
            start_route: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    catalog_source: Option<String>,
    store_path: Option<String>,
    cache_dir: Option<String>,
    filter_debounce_ms: Option<u64>,
    poster_workers: Option<usize>,
    start_route: Option<String>,
}

pub fn load_config() -> AppConfig {
    load_config_from(Path::new(CONFIG_FILE))
}

pub fn load_config_from(cfg_path: &Path) -> AppConfig {
    let mut cfg = AppConfig::default();

    let raw = match fs::read_to_string(cfg_path) {
        Ok(raw) => raw,
        Err(_) => {
            info!("No {} found; using defaults", cfg_path.display());
            return cfg;
        }
    };

    let parsed = match serde_json::from_str::<RawConfig>(&raw) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!("Failed to parse {} ({}). Using defaults.", cfg_path.display(), err);
            return cfg;
        }
    };

    if let Some(src) = parsed.catalog_source.filter(|s| !s.trim().is_empty()) {
        cfg.catalog_source = src.trim().to_string();
    }
    if let Some(p) = parsed.store_path.filter(|s| !s.trim().is_empty()) {
        cfg.store_path = PathBuf::from(p);
    }
    if let Some(p) = parsed.cache_dir.filter(|s| !s.trim().is_empty()) {
        cfg.cache_dir = PathBuf::from(p);
    }
    if let Some(ms) = parsed.filter_debounce_ms {
        cfg.filter_debounce = Duration::from_millis(ms.min(5_000));
    }
    if let Some(n) = parsed.poster_workers {
        let clamped = n.clamp(1, 16);
        if clamped != n {
            warn!("poster_workers {n} out of range; using {clamped}");
        }
        cfg.poster_workers = clamped;
    }
    if let Some(path) = parsed.start_route {
        cfg.start_route = Some(Route::parse(&path));
    }

    info!("Loaded config from {}", cfg_path.display());
    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_cfg(body: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, body).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.json"));
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.filter_debounce, Duration::from_millis(300));
    }

    #[test]
    fn fields_override_defaults() {
        let (_dir, path) = write_cfg(
            r#"{"catalog_source": "https://example.com/media.json",
                "filter_debounce_ms": 150, "poster_workers": 64,
                "start_route": "/favorites"}"#,
        );
        let cfg = load_config_from(&path);
        assert_eq!(cfg.catalog_source, "https://example.com/media.json");
        assert_eq!(cfg.filter_debounce, Duration::from_millis(150));
        assert_eq!(cfg.poster_workers, 16);
        assert_eq!(cfg.start_route, Some(Route::Favorites));
        assert_eq!(cfg.cache_dir, PathBuf::from(DEFAULT_CACHE_DIR));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let (_dir, path) = write_cfg(r#"{"theme": "dark", "cache_dir": "c"}"#);
        let cfg = load_config_from(&path);
        assert_eq!(cfg.catalog_source, DEFAULT_CATALOG_SOURCE);
        assert_eq!(cfg.cache_dir, PathBuf::from("c"));
    }

    #[test]
    fn broken_json_falls_back() {
        let (_dir, path) = write_cfg("{ nope");
        assert_eq!(load_config_from(&path), AppConfig::default());
    }
}
