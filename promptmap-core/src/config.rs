//! Configuration management for promptmap

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::graph::EMPTY_DOCUMENT;
use crate::layout::LayoutConfig;
use crate::markdown::SerializeOptions;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Render each block by its stored type instead of its depth
    pub use_explicit_types: bool,
    /// Written instead of Markdown when a graph has no exportable root
    pub empty_placeholder: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            use_explicit_types: true,
            empty_placeholder: EMPTY_DOCUMENT.to_string(),
        }
    }
}

impl ExportConfig {
    pub fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions {
            use_explicit_types: self.use_explicit_types,
        }
    }
}

impl Config {
    /// Get the platform-specific config file path
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "promptmap")
            .map(|proj_dirs| proj_dirs.config_dir().join("promptmap.toml"))
    }

    /// Load configuration from file, falling back to defaults if missing
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                log::debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        // Check config file permissions (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = std::fs::metadata(path)
                .with_context(|| format!("Failed to stat config file: {}", path.display()))?;
            if metadata.permissions().mode() & 0o002 != 0 {
                anyhow::bail!(
                    "Config file {} is world-writable (insecure permissions)",
                    path.display()
                );
            }
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.layout.horizontal_gap, 50.0);
        assert_eq!(config.layout.vertical_gap, 20.0);
        assert_eq!(config.layout.node_width, 250.0);
        assert_eq!(config.layout.node_height, 50.0);
        assert!(config.export.use_explicit_types);
        assert_eq!(config.export.empty_placeholder, "# Empty\n");
    }

    #[test]
    fn test_load_valid_toml() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(
            b"[layout]\n\
horizontal_gap = 80.0\n\
vertical_gap = 10.0\n\
node_width = 200.0\n\
node_height = 40.0\n\
\n\
[export]\n\
use_explicit_types = false\n\
empty_placeholder = \"# Untitled\\n\"\n",
        )?;

        let config = Config::load_from(file.path())?;
        assert_eq!(config.layout.horizontal_gap, 80.0);
        assert_eq!(config.layout.node_height, 40.0);
        assert!(!config.export.use_explicit_types);
        assert_eq!(config.export.empty_placeholder, "# Untitled\n");
        assert_eq!(
            config.export.serialize_options(),
            SerializeOptions::inferred()
        );

        Ok(())
    }

    #[test]
    fn test_load_partial_toml() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"[layout]\nnode_width = 320.0\n")?;

        let config = Config::load_from(file.path())?;
        assert_eq!(config.layout.node_width, 320.0);
        assert_eq!(config.layout.horizontal_gap, 50.0);
        assert_eq!(config.export, ExportConfig::default());

        Ok(())
    }

    #[test]
    fn test_load_empty_file_gives_defaults() -> Result<()> {
        let file = NamedTempFile::new()?;
        assert_eq!(Config::load_from(file.path())?, Config::default());
        Ok(())
    }

    #[test]
    fn test_load_invalid_toml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"invalid toml [[[syntax").unwrap();

        let result = Config::load_from(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from(&dir.path().join("missing.toml")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_world_writable_config_is_rejected() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let file = NamedTempFile::new()?;
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o666))?;

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("world-writable"));
        Ok(())
    }

    #[test]
    fn test_config_path_returns_some() {
        let path = Config::config_path();
        assert!(path.is_some());
        if let Some(p) = path {
            assert!(p.to_string_lossy().contains("promptmap"));
            assert!(p.to_string_lossy().ends_with("promptmap.toml"));
        }
    }

    #[test]
    fn test_config_serialization() -> Result<()> {
        let mut config = Config::default();
        config.layout.vertical_gap = 33.0;

        let toml_str = toml::to_string(&config)?;
        assert!(toml_str.contains("vertical_gap = 33.0"));

        let parsed: Config = toml::from_str(&toml_str)?;
        assert_eq!(parsed, config);

        Ok(())
    }
}
