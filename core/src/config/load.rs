use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default maactl data directory: ~/.maactl
pub fn get_maactl_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".maactl"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.maactl/config.toml (highest)
    let data_dir = get_maactl_data_dir()?;
    let user_config = data_dir.join("config.toml");

    // Priority 2: ./maactl.toml (current directory)
    let local_config = Path::new("maactl.toml");

    let cfg = if user_config.exists() {
        load_from_path(&user_config)?
    } else if local_config.exists() {
        load_from_path(local_config)?
    } else {
        AppConfig::default()
    };

    Ok(apply_env_overrides(cfg, |key| std::env::var(key).ok()))
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let cfg = toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?;
    Ok(cfg)
}

/// Environment variable overrides (Priority 0: highest).
pub fn apply_env_overrides<F>(mut cfg: AppConfig, var: F) -> AppConfig
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty("MAACTL_SERVER_URL") {
        cfg.server.base_url = v;
    }
    if let Some(v) = non_empty("MAACTL_LOOKUP_URL") {
        cfg.lookup.base_url = v;
    }
    if let Some(v) = non_empty("MAACTL_API_KEY") {
        cfg.server.api_key = v;
    }
    cfg
}
