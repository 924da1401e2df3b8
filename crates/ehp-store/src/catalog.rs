use std::path::{Path, PathBuf};
use std::{env, fs};

use ehp_core::{Dataset, verify_against_reference_tables};

use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::json_bridge::ensure_usable;
use crate::store::{DatasetSummary, Store};

pub const CATALOG_FILE: &str = "catalog.db";

/// Default base directory for all ehp storage.
pub fn default_base_dir() -> PathBuf {
    dirs_home().join(".ehp-chart")
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Named datasets plus the configuration they are viewed with.
///
/// Layout:
/// ```text
/// ~/.ehp-chart/
/// ├── catalog.db
/// └── config.toml   (optional)
/// ```
pub struct Catalog {
    store: Store,
    config: Config,
    base_dir: Option<PathBuf>,
}

impl Catalog {
    /// Open the catalog, creating the directory as needed.
    /// `base_dir`: override the base directory (for testing).
    pub fn open(base_dir: Option<&Path>) -> Result<Self> {
        let base = base_dir.map(PathBuf::from).unwrap_or_else(default_base_dir);
        fs::create_dir_all(&base).map_err(|e| {
            StoreError::InvalidData(format!("failed to create {}: {e}", base.display()))
        })?;

        let config = Config::load(&base)?;
        let store = Store::open(&base.join(CATALOG_FILE))?;
        tracing::debug!("opened catalog at {}", base.display());

        Ok(Self {
            store,
            config,
            base_dir: Some(base),
        })
    }

    /// In-memory catalog with default configuration (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            store: Store::open_in_memory()?,
            config: Config::default(),
            base_dir: None,
        })
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    pub fn list(&self) -> Result<Vec<DatasetSummary>> {
        self.store.list_datasets()
    }

    /// Dataset to use when the caller may not have named one: the explicit
    /// name, else `default_dataset` from the config, else the only dataset.
    pub fn resolve_name(&self, explicit: Option<&str>) -> Result<String> {
        if let Some(name) = explicit.or(self.config.default_dataset.as_deref()) {
            return Ok(name.to_string());
        }
        let mut all = self.store.list_datasets()?;
        match all.len() {
            1 => Ok(all.remove(0).name),
            0 => Err(StoreError::NoDataset(
                "none imported yet (run `ehp import`)".to_string(),
            )),
            n => Err(StoreError::NoDataset(format!(
                "{n} datasets available, pass --dataset or set default_dataset"
            ))),
        }
    }

    /// Load a dataset, refusing it on a fatal integrity issue.
    pub fn load(&self, name: &str) -> Result<Dataset> {
        let dataset = self.store.load_dataset(name)?;
        ensure_usable(name, &dataset)?;
        tracing::debug!("loaded dataset '{name}' ({} generators)", dataset.len());
        Ok(dataset)
    }

    /// Every usable dataset; unusable ones are logged and skipped. Each loaded
    /// dataset is checked once against the stable stems; disagreement is
    /// logged and the dataset is kept.
    pub fn load_all(&self) -> Result<Vec<(String, Dataset)>> {
        let mut loaded = Vec::new();
        for summary in self.store.list_datasets()? {
            match self.load(&summary.name) {
                Ok(dataset) => {
                    if !verify_against_reference_tables(&dataset) {
                        tracing::warn!(
                            "dataset '{}' disagrees with the stable stems",
                            summary.name
                        );
                    }
                    loaded.push((summary.name, dataset));
                }
                Err(e) => tracing::warn!("skipping dataset '{}': {e}", summary.name),
            }
        }
        Ok(loaded)
    }

    pub fn import_json_file(&self, name: &str, path: &Path) -> Result<Dataset> {
        self.store.import_json_file(name, path)
    }

    pub fn export_json_file(&self, name: &str, path: &Path) -> Result<()> {
        self.store.export_json_file(name, path)
    }

    pub fn delete(&self, name: &str) -> Result<bool> {
        self.store.delete_dataset(name)
    }
}
