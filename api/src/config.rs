//! Server configuration
//!
//! TOML file (path from `GALA_CONFIG`, default `gala.toml`), then
//! environment overrides. A missing file means defaults.

use gala_forms::SubmitScope;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "GALA_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "gala.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Origin used to build registrant self-service links
    pub public_origin: String,
    /// CMS overlay document; absent means static copy only
    pub content_path: Option<PathBuf>,
    pub upload_dir: PathBuf,
    /// URL prefix uploaded files are served under
    pub upload_base_url: String,
    pub submit_scope: SubmitScope,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".into(),
            public_origin: "http://localhost:8080".into(),
            content_path: None,
            upload_dir: PathBuf::from("uploads"),
            upload_base_url: "/uploads".into(),
            submit_scope: SubmitScope::Everything,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ServerConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let mut config = Self::from_file(Path::new(&path))?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_toml(&raw),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read { path: path.to_path_buf(), source }),
        }
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("GALA_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(origin) = lookup("GALA_PUBLIC_ORIGIN") {
            self.public_origin = origin;
        }
        if let Some(path) = lookup("GALA_CONTENT_PATH") {
            self.content_path = Some(PathBuf::from(path)).filter(|p| !p.as_os_str().is_empty());
        }
        if let Some(dir) = lookup("GALA_UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ServerConfig::from_toml(
            r#"
            public_origin = "https://gala.example.com"
            submit_scope = "visible_only"
            "#,
        )
        .unwrap();
        assert_eq!(config.public_origin, "https://gala.example.com");
        assert_eq!(config.submit_scope, SubmitScope::VisibleOnly);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.content_path, None);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("GALA_BIND_ADDR", "127.0.0.1:9000"),
            ("GALA_CONTENT_PATH", "content/registration.json"),
        ]
        .into_iter()
        .collect();
        let mut config = ServerConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.content_path, Some(PathBuf::from("content/registration.json")));
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = ServerConfig::from_file(Path::new("/nonexistent/gala.toml")).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_bad_toml_rejected() {
        assert!(matches!(ServerConfig::from_toml("bind_addr = 42"), Err(ConfigError::Parse(_))));
    }
}
