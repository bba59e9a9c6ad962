use std::{collections::HashMap, fs, path::Path, path::PathBuf};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "pass.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub identity_provider: String,
    pub web_id: Option<String>,
    pub access_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub selected_user: Option<String>,
    pub storage_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            identity_provider: "https://opencommons.net/".into(),
            web_id: None,
            access_token: None,
            client_id: None,
            client_secret: None,
            selected_user: None,
            storage_path: None,
        }
    }
}

impl Settings {
    /// Where the local storage file lives unless `storage_path` overrides it.
    pub fn storage_file(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.storage_path {
            return Ok(path.clone());
        }
        let base = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("unable to resolve user config dir"))?;
        Ok(base.join("pass").join("local_storage.json"))
    }
}

/// Defaults, then `pass.toml` (or `path`), then `PASS_*` / `APP__*` variables.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

fn load_settings_with(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(file) {
        Ok(raw) => {
            let file_cfg = toml::from_str::<HashMap<String, String>>(&raw)
                .with_context(|| format!("invalid config file '{}'", file.display()))?;
            apply(&mut settings, |key| file_cfg.get(key).cloned());
        }
        Err(err) if path.is_some() => {
            return Err(err).with_context(|| format!("failed to read '{}'", file.display()));
        }
        Err(_) => {}
    }

    apply(&mut settings, |key| {
        env(&format!("PASS_{}", key.to_ascii_uppercase()))
    });
    apply(&mut settings, |key| {
        env(&format!("APP__{}", key.to_ascii_uppercase()))
    });

    Ok(settings)
}

fn apply(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("identity_provider") {
        settings.identity_provider = v;
    }
    if let Some(v) = lookup("web_id") {
        settings.web_id = Some(v);
    }
    if let Some(v) = lookup("access_token") {
        settings.access_token = Some(v);
    }
    if let Some(v) = lookup("client_id") {
        settings.client_id = Some(v);
    }
    if let Some(v) = lookup("client_secret") {
        settings.client_secret = Some(v);
    }
    if let Some(v) = lookup("selected_user") {
        settings.selected_user = Some(v);
    }
    if let Some(v) = lookup("storage_path") {
        settings.storage_path = Some(PathBuf::from(v));
    }
}
