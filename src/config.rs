use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub backend: BackendConfig,
  /// Custom title for the header (defaults to the backend host if not set)
  pub title: Option<String>,
  /// How long the roster exclusion cache stays fresh, in seconds
  #[serde(default = "default_roster_ttl_secs")]
  pub roster_ttl_secs: u64,
  /// How often the dispatch scheduler wakes up, in seconds
  #[serde(default = "default_scheduler_tick_secs")]
  pub scheduler_tick_secs: u64,
}

fn default_roster_ttl_secs() -> u64 {
  300
}

fn default_scheduler_tick_secs() -> u64 {
  15
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
  /// Base URL of the managed backend (REST and function endpoints)
  pub url: String,
  /// Project API key, sent as the `apikey` header
  pub api_key: String,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./selah.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/selah/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/selah/config.yaml"
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("selah.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("selah").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Get the backend access token from environment variables.
  ///
  /// Checks SELAH_BACKEND_TOKEN first, then BACKEND_ACCESS_TOKEN as fallback.
  pub fn get_access_token() -> Result<String> {
    std::env::var("SELAH_BACKEND_TOKEN")
      .or_else(|_| std::env::var("BACKEND_ACCESS_TOKEN"))
      .map_err(|_| {
        eyre!(
          "Backend access token not found. Set SELAH_BACKEND_TOKEN or BACKEND_ACCESS_TOKEN environment variable."
        )
      })
  }
}
