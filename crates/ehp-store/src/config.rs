//! `config.toml` in the data directory. Every key is optional.
//!
//! ```toml
//! default_dataset = "main"
//!
//! [view]
//! category = "synthetic"
//! page = 1
//! all_diffs = true
//! truncation_top = 20
//!
//! [server]
//! listen = "127.0.0.1:3417"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use ehp_core::{Category, Truncation, ViewParameters};

use crate::error::{Result, StoreError};

pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:3417";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Dataset used when a command names none.
    pub default_dataset: Option<String>,
    pub view: ViewConfig,
    pub server: ServerConfig,
}

/// Starting point for every projection before per-request overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    pub category: Category,
    pub page: i32,
    pub all_diffs: bool,
    pub truncation_top: Option<i32>,
    pub truncation_bottom: Option<i32>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            category: Category::Synthetic,
            page: 1,
            all_diffs: true,
            truncation_top: None,
            truncation_bottom: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
        }
    }
}

/// Per-command or per-request changes to [`ViewConfig`]. Also the query
/// string of the HTTP projection endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOverrides {
    pub category: Option<Category>,
    pub page: Option<i32>,
    pub all_diffs: Option<bool>,
    pub top: Option<i32>,
    pub bottom: Option<i32>,
    pub stem: Option<i32>,
    pub tau: Option<bool>,
}

impl ViewConfig {
    pub fn truncation(&self) -> Truncation {
        Truncation::new(self.truncation_top, self.truncation_bottom)
    }

    pub fn resolve(&self, overrides: &ViewOverrides) -> ViewParameters {
        ViewParameters {
            category: overrides.category.unwrap_or(self.category),
            page: overrides.page.unwrap_or(self.page),
            truncation: Truncation::new(
                overrides.top.or(self.truncation_top),
                overrides.bottom.or(self.truncation_bottom),
            ),
            include_all_fired: overrides.all_diffs.unwrap_or(self.all_diffs),
            stem_window: overrides.stem,
            tau_finalization: overrides.tau.unwrap_or(false),
        }
    }
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.view.page < 1 {
            return Err(StoreError::Config(format!(
                "view.page must be at least 1, got {}",
                config.view.page
            )));
        }
        Ok(config)
    }

    /// Read `config.toml` from `dir`. A missing file gives the defaults.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(StoreError::Config(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server.listen, DEFAULT_LISTEN);
        assert_eq!(config.view.page, 1);
        assert!(config.view.all_diffs);
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
            default_dataset = "stable"

            [view]
            category = "algebraic"
            page = 4
            all_diffs = false
            truncation_top = 12
            truncation_bottom = 2

            [server]
            listen = "0.0.0.0:9000"
            "#,
        )
        .unwrap();
        assert_eq!(config.default_dataset.as_deref(), Some("stable"));
        assert_eq!(config.view.category, Category::Algebraic);
        assert_eq!(config.view.truncation(), Truncation::new(Some(12), Some(2)));
        assert!(!config.view.all_diffs);
        assert_eq!(config.server.listen, "0.0.0.0:9000");
    }

    #[test]
    fn test_bad_values_are_config_errors() {
        assert!(matches!(
            Config::parse("[view]\ncategory = \"cubical\""),
            Err(StoreError::Config(_))
        ));
        assert!(matches!(
            Config::parse("[view]\npage = 0"),
            Err(StoreError::Config(_))
        ));
        assert!(matches!(
            Config::parse("colour = \"blue\""),
            Err(StoreError::Config(_))
        ));
    }

    #[test]
    fn test_overrides_win() {
        let view = ViewConfig {
            truncation_top: Some(10),
            ..ViewConfig::default()
        };
        let params = view.resolve(&ViewOverrides::default());
        assert_eq!(params.category, Category::Synthetic);
        assert_eq!(params.truncation.top, Some(10));
        assert!(params.include_all_fired);
        assert!(!params.tau_finalization);

        let params = view.resolve(&ViewOverrides {
            category: Some(Category::Geometric),
            page: Some(7),
            all_diffs: Some(false),
            top: Some(4),
            stem: Some(3),
            tau: Some(true),
            ..ViewOverrides::default()
        });
        assert_eq!(params.category, Category::Geometric);
        assert_eq!(params.page, 7);
        assert_eq!(params.truncation.top, Some(4));
        assert_eq!(params.stem_window, Some(3));
        assert!(!params.include_all_fired);
        assert!(params.tau_finalization);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), Config::default());

        fs::write(dir.path().join(CONFIG_FILE), "[server]\nlisten = \"127.0.0.1:1\"").unwrap();
        assert_eq!(Config::load(dir.path()).unwrap().server.listen, "127.0.0.1:1");
    }
}
