//! Configuration for the data layer.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub service: ServiceConfig,
  #[serde(default)]
  pub offline: OfflineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
  /// Base URL of the remote note service.
  pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfflineConfig {
  /// Where the offline store lives (defaults to the platform data dir).
  pub db_path: Option<PathBuf>,
}

impl Config {
  /// Minimal configuration pointing at a service URL.
  pub fn for_service(url: impl Into<String>) -> Self {
    Self {
      service: ServiceConfig { url: url.into() },
      offline: OfflineConfig::default(),
    }
  }

  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./noteshelf.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/noteshelf/config.yaml
  /// 4. ~/.config/noteshelf/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(Error::Config(format!("config file not found: {}", p.display())));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(Error::Config(
        "no configuration file found; create one at ~/.config/noteshelf/config.yaml".to_string(),
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("noteshelf.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("noteshelf").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| Error::Config(format!("failed to read config file {}: {}", path.display(), e)))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| Error::Config(format!("failed to parse config file {}: {}", path.display(), e)))?;

    Ok(config)
  }

  /// Get the service API token from environment variables.
  ///
  /// Checks NOTESHELF_TOKEN first, then NOTES_API_TOKEN as fallback.
  pub fn get_api_token() -> Result<String> {
    std::env::var("NOTESHELF_TOKEN")
      .or_else(|_| std::env::var("NOTES_API_TOKEN"))
      .map_err(|_| {
        Error::Config(
          "service API token not found; set NOTESHELF_TOKEN or NOTES_API_TOKEN".to_string(),
        )
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn loads_a_minimal_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noteshelf.yaml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "service:\n  url: https://notes.example.org/api/").unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.service.url, "https://notes.example.org/api/");
    assert_eq!(config.offline.db_path, None);
  }

  #[test]
  fn loads_offline_db_path_when_present() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noteshelf.yaml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
      file,
      "service:\n  url: https://notes.example.org/api/\noffline:\n  db_path: /tmp/offline.db"
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(
      config.offline.db_path,
      Some(PathBuf::from("/tmp/offline.db"))
    );
  }

  #[test]
  fn missing_explicit_path_is_an_error() {
    let result = Config::load(Some(Path::new("/nonexistent/noteshelf.yaml")));
    assert!(matches!(result, Err(Error::Config(_))));
  }
}
