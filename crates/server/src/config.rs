use std::{collections::HashMap, env};

use anyhow::{anyhow, Context};
use config::{Config, Environment, File};
use serde::Deserialize;

const DEFAULT_ALLOWED_ORIGINS: [&str; 2] =
    ["https://lead-enrich-data.vercel.app", "http://localhost:3000"];

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub bind_addr: String,
    pub google_api_key: Option<String>,
    pub model: String,
    pub generator_base_url: String,
    pub allowed_origins: Vec<String>,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".into(),
            google_api_key: None,
            model: "gemini-pro".into(),
            generator_base_url: "https://generativelanguage.googleapis.com".into(),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.map(String::from).to_vec(),
            max_body_bytes: 64 * 1024,
        }
    }
}

impl Settings {
    pub fn api_key(&self) -> anyhow::Result<&str> {
        self.google_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                anyhow!("API key missing. Please set the GOOGLE_API_KEY environment variable.")
            })
    }
}

/// Layers defaults, `server.toml` (optional), legacy variables and `APP__*` variables.
pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from("server", env::vars().collect())
}

pub(crate) fn load_settings_from(
    config_file: &str,
    vars: HashMap<String, String>,
) -> anyhow::Result<Settings> {
    let defaults = Settings::default();
    let mut builder = Config::builder()
        .set_default("bind_addr", defaults.bind_addr)?
        .set_default("model", defaults.model)?
        .set_default("generator_base_url", defaults.generator_base_url)?
        .set_default("allowed_origins", defaults.allowed_origins)?
        .set_default("max_body_bytes", defaults.max_body_bytes as u64)?
        .add_source(File::with_name(config_file).required(false));

    if let Some(key) = legacy_unless_app(&vars, "GOOGLE_API_KEY", "GOOGLE_API_KEY") {
        builder = builder.set_override("google_api_key", key)?;
    }
    if let Some(port) = legacy_unless_app(&vars, "PORT", "BIND_ADDR") {
        builder = builder.set_override("bind_addr", format!("0.0.0.0:{}", port.trim()))?;
    }

    let app_vars: HashMap<String, String> = vars
        .into_iter()
        .filter(|(name, _)| name.starts_with("APP__"))
        .collect();
    builder = builder.add_source(
        Environment::with_prefix("APP")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("allowed_origins")
            .source(Some(app_vars)),
    );

    builder
        .build()
        .context("failed to assemble server settings")?
        .try_deserialize()
        .context("invalid server settings")
}

/// Legacy variables apply unless the `APP__` form of the same setting is present.
fn legacy_unless_app(
    vars: &HashMap<String, String>,
    legacy_name: &str,
    app_key: &str,
) -> Option<String> {
    if vars.contains_key(&format!("APP__{app_key}")) {
        return None;
    }
    vars.get(legacy_name).cloned()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
