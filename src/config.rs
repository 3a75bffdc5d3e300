//! Configuration for manifest conversion and dataset traversal
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (plugins.toml)
//! - Environment variables (PLUGINS__*)
//!
//! ## Example config file (plugins.toml):
//! ```toml
//! [manifest]
//! default_locale = "en"
//! official_plugin_name = "reearth"
//! system = false
//!
//! [dataset]
//! graph_max_depth = 5
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::i18n::DEFAULT_LOCALE;
use crate::id::OFFICIAL_PLUGIN_NAME;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    #[serde(default)]
    pub manifest: ManifestConfig,

    #[serde(default)]
    pub dataset: DatasetConfig,
}

/// Manifest conversion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// Locale of the literal strings in manifests
    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Manifest id reserved for the official plugin
    #[serde(default = "default_official_plugin_name")]
    pub official_plugin_name: String,

    /// Allow system-only extension types
    #[serde(default)]
    pub system: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// How many reference hops a dataset graph walk follows
    #[serde(default = "default_graph_max_depth")]
    pub graph_max_depth: usize,
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_official_plugin_name() -> String {
    OFFICIAL_PLUGIN_NAME.to_string()
}

fn default_graph_max_depth() -> usize {
    5
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            official_plugin_name: default_official_plugin_name(),
            system: false,
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            graph_max_depth: default_graph_max_depth(),
        }
    }
}

impl PluginConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering `config_path` over the default locations
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        for location in ["plugins.toml", ".plugins.toml", "config/plugins.toml"] {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("dev", "reearth", "plugins") {
            let xdg_config = dirs.config_dir().join("plugins.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // PLUGINS__MANIFEST__SYSTEM=true
        builder = builder.add_source(
            Environment::with_prefix("PLUGINS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ConvertOptions;

    #[test]
    fn test_default_config() {
        let config = PluginConfig::default();
        assert_eq!(config.manifest.default_locale, "en");
        assert_eq!(config.manifest.official_plugin_name, "reearth");
        assert_eq!(config.dataset.graph_max_depth, 5);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        let mut config = PluginConfig::default();
        config.manifest.system = true;
        config.dataset.graph_max_depth = 2;
        config.save(path.to_str().unwrap()).unwrap();

        let toml_str = std::fs::read_to_string(&path).unwrap();
        assert!(toml_str.contains("[manifest]"));

        let loaded = PluginConfig::load_from(path.to_str()).unwrap();
        assert!(loaded.manifest.system);
        assert_eq!(loaded.dataset.graph_max_depth, 2);
    }

    #[test]
    fn test_convert_options_from_config() {
        let mut config = PluginConfig::default();
        config.manifest.default_locale = "ja".to_string();
        let opts = ConvertOptions::from(&config);
        assert_eq!(opts.default_locale, "ja");
        assert!(!opts.system);
    }
}
