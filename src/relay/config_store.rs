//! Persisted connection settings: the API key and server base URL.
//!
//! This is the only durable state in the whole tool. It is written solely by
//! explicit user action (the CLI, or a save message over the bridge) and
//! read on every outbound request; it never expires on its own.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Where imports go when the user has not configured a server yet.
pub const DEFAULT_SERVER_BASE: &str = "http://localhost:3000";

/// Issued keys are `pk_<64 hex chars>`; anything else is a paste mistake.
pub const API_KEY_PREFIX: &str = "pk_";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    pub api_key: Option<String>,
    pub server_base_url: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            server_base_url: DEFAULT_SERVER_BASE.to_string(),
        }
    }
}

/// File-backed store for [`ConnectionConfig`].
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: ConnectionConfig,
}

impl ConfigStore {
    /// Default location: `<user config dir>/leadscout/config.json`.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("could not determine the user config directory")?;
        Ok(dir.join("leadscout").join("config.json"))
    }

    /// Open the store at `path`, creating a default config when none exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let config = Self::load(&path)?;
        Ok(Self { path, config })
    }

    /// Re-read the config from disk, picking up changes made by another
    /// process (e.g. `leadscout connect` while a session is live).
    pub fn reload(&mut self) -> Result<()> {
        self.config = Self::load(&self.path)?;
        Ok(())
    }

    fn load(path: &Path) -> Result<ConnectionConfig> {
        if !path.exists() {
            return Ok(ConnectionConfig::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("config at {} is not valid JSON", path.display()))
    }

    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.config.api_key.as_deref()
    }

    #[must_use]
    pub fn server_base_url(&self) -> &str {
        &self.config.server_base_url
    }

    /// Validate and persist a new API key.
    pub fn set_api_key(&mut self, key: &str) -> Result<()> {
        let key = key.trim();
        if !key.starts_with(API_KEY_PREFIX) {
            bail!("invalid key: it should start with {API_KEY_PREFIX}");
        }
        self.config.api_key = Some(key.to_string());
        self.save()
    }

    /// Validate and persist a new server base URL. Trailing slashes are
    /// stripped so endpoint paths can be appended uniformly.
    pub fn set_server_base(&mut self, base: &str) -> Result<()> {
        let base = base.trim().trim_end_matches('/');
        Url::parse(base).with_context(|| format!("invalid server URL: {base}"))?;
        self.config.server_base_url = base.to_string();
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(&self.config).context("failed to encode config")?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("failed to write config to {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> ConfigStore {
        ConfigStore::open(dir.path().join("config.json")).expect("open store")
    }

    #[test]
    fn starts_empty_with_default_base() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.api_key(), None);
        assert_eq!(store.server_base_url(), DEFAULT_SERVER_BASE);
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        {
            let mut store = ConfigStore::open(&path).unwrap();
            store.set_api_key("pk_0123abcd").unwrap();
            store.set_server_base("https://pipeline.example.com/").unwrap();
        }
        let store = ConfigStore::open(&path).unwrap();
        assert_eq!(store.api_key(), Some("pk_0123abcd"));
        assert_eq!(store.server_base_url(), "https://pipeline.example.com");
    }

    #[test]
    fn reload_picks_up_changes_from_another_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut live = ConfigStore::open(&path).unwrap();
        assert_eq!(live.api_key(), None);

        // A second process (the CLI) writes a key to the same file.
        let mut cli = ConfigStore::open(&path).unwrap();
        cli.set_api_key("pk_fresh").unwrap();

        assert_eq!(live.api_key(), None);
        live.reload().unwrap();
        assert_eq!(live.api_key(), Some("pk_fresh"));
    }

    #[test]
    fn rejects_malformed_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        assert!(store.set_api_key("sk_wrong_prefix").is_err());
        assert!(store.set_api_key("").is_err());
        assert_eq!(store.api_key(), None);
    }

    #[test]
    fn rejects_unparseable_server_urls() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        assert!(store.set_server_base("not a url").is_err());
        assert_eq!(store.server_base_url(), DEFAULT_SERVER_BASE);
    }
}
