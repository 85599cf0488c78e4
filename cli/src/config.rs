//! CLI Configuration
//!
//! `~/.gala/config.toml`, or `config.<profile>.toml` when a profile is given.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::output::OutputFormat;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub api_url: Option<String>,
    pub admin_token: Option<String>,
    pub default_format: Option<OutputFormat>,
}

pub const KEYS: [&str; 3] = ["api_url", "admin_token", "default_format"];

impl Config {
    pub fn load(profile: Option<&str>) -> anyhow::Result<Self> {
        let path = Self::config_path(profile)?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn save(&self, profile: Option<&str>) -> anyhow::Result<PathBuf> {
        let path = Self::config_path(profile)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(path)
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "api_url" => self.api_url = Some(value.trim_end_matches('/').to_string()),
            "admin_token" => self.admin_token = Some(value.to_string()),
            "default_format" => {
                let format = <OutputFormat as clap::ValueEnum>::from_str(value, true)
                    .map_err(|_| anyhow::anyhow!("Unknown format: {value} (table, json, yaml)"))?;
                self.default_format = Some(format);
            }
            _ => anyhow::bail!("Unknown config key: {key}"),
        }
        Ok(())
    }

    /// Display value; the token is masked
    pub fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(match key {
            "api_url" => self.api_url.clone(),
            "admin_token" => self.admin_token.as_deref().map(mask),
            "default_format" => self.default_format.map(|f| format!("{f:?}").to_lowercase()),
            _ => anyhow::bail!("Unknown config key: {key}"),
        })
    }

    fn config_path(profile: Option<&str>) -> anyhow::Result<PathBuf> {
        let home = dirs::home_dir().context("Cannot find home directory")?;
        let filename = match profile {
            Some(p) => format!("config.{}.toml", p),
            None => "config.toml".to_string(),
        };
        Ok(home.join(".gala").join(filename))
    }
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}****")
}
