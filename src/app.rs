use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const BASE_URL_ENV: &str = "REALMATE_API_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { base_url: default_base_url() }
    }
}

impl AppConfig {
    fn toml_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("realmate.toml"))
    }

    /// Environment variable first, then `realmate.toml` in the config dir, then the dev default.
    pub fn load() -> Self {
        let env = std::env::var(BASE_URL_ENV).ok();
        let file = Self::toml_path().and_then(|p| Self::from_file(&p));
        Self::resolve(env.as_deref(), file)
    }

    fn resolve(env: Option<&str>, file: Option<AppConfig>) -> Self {
        let mut config = match env {
            Some(url) if !url.trim().is_empty() => Self { base_url: url.to_string() },
            _ => file.unwrap_or_default(),
        };
        config.base_url = crate::utils::normalize_url(&config.base_url);
        config
    }

    pub fn from_file(path: &Path) -> Option<Self> {
        let text = fs::read_to_string(path).ok()?;
        match toml::from_str::<AppConfig>(&text) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Ignoring unreadable config {}: {e}", path.display());
                None
            }
        }
    }
}

#[cfg(feature = "gui")]
pub fn build_ui(app: &adw::Application) {
    let config = AppConfig::load();
    log::info!("Using API at {}", config.base_url);
    crate::ui::main_window::show_main_window(app, &config);
}
