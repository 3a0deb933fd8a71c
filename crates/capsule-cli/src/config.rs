use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use capsule_core::notify::DEFAULT_BASE_URL;

#[derive(Debug, Serialize, Deserialize)]
pub struct CapsuleConfig {
    pub store: StoreSection,
    #[serde(default)]
    pub notify: NotifySection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreSection {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotifySection {
    pub base_url: String,
}

impl Default for NotifySection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl CapsuleConfig {
    pub fn new(store_path: PathBuf, base_url: Option<String>) -> Self {
        Self {
            store: StoreSection {
                path: store_path.to_string_lossy().to_string(),
            },
            notify: NotifySection {
                base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            },
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_store_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("capsules.db"))
}

pub fn read_config(path: &Path) -> anyhow::Result<CapsuleConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &CapsuleConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("capsule"));
        }
    }
    Ok(home_dir()?.join(".config").join("capsule"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("capsule"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("capsule"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capsule").join("config.toml");
        let config = CapsuleConfig::new(
            PathBuf::from("/tmp/capsules.db"),
            Some("https://capsule.example".to_string()),
        );

        write_config(&path, &config).unwrap();
        let loaded = read_config(&path).unwrap();

        assert_eq!(loaded.store.path, "/tmp/capsules.db");
        assert_eq!(loaded.notify.base_url, "https://capsule.example");
    }

    #[test]
    fn test_notify_section_defaults() {
        let config: CapsuleConfig = toml::from_str("[store]\npath = \"/tmp/c.db\"\n").unwrap();
        assert_eq!(config.notify.base_url, DEFAULT_BASE_URL);
    }
}
