use std::fs;
use std::path::Path;

use ehp_core::{Dataset, check_integrity, export_json, import_json};

use crate::error::{Result, StoreError};
use crate::store::Store;

/// Refuse datasets with a fatal integrity issue. Findings are logged either way.
pub fn ensure_usable(name: &str, dataset: &Dataset) -> Result<()> {
    let report = check_integrity(dataset);
    report.log();
    match report.first_fatal() {
        None => Ok(()),
        Some(issue) => Err(StoreError::Integrity(format!("{name}: {issue}"))),
    }
}

impl Store {
    /// Import a JSON dataset file under `name`.
    pub fn import_json_file(&self, name: &str, path: &Path) -> Result<Dataset> {
        let json = fs::read_to_string(path).map_err(|e| {
            StoreError::InvalidData(format!("failed to read {}: {e}", path.display()))
        })?;
        self.import_json_from(name, &json, &path.display().to_string())
    }

    /// Import a JSON dataset string under `name`.
    pub fn import_json_str(&self, name: &str, json: &str) -> Result<Dataset> {
        self.import_json_from(name, json, "")
    }

    fn import_json_from(&self, name: &str, json: &str, source: &str) -> Result<Dataset> {
        let dataset =
            import_json(json).map_err(|e| StoreError::InvalidData(format!("invalid JSON: {e}")))?;
        ensure_usable(name, &dataset)?;
        self.save_dataset(name, &dataset, source)?;
        Ok(dataset)
    }

    /// Export dataset `name` to a JSON file.
    pub fn export_json_file(&self, name: &str, path: &Path) -> Result<()> {
        let json = self.export_json_string(name)?;
        fs::write(path, json).map_err(|e| {
            StoreError::InvalidData(format!("failed to write {}: {e}", path.display()))
        })
    }

    /// Export dataset `name` as a JSON string.
    pub fn export_json_string(&self, name: &str) -> Result<String> {
        let dataset = self.load_dataset(name)?;
        export_json(&dataset)
            .map_err(|e| StoreError::InvalidData(format!("JSON export failed: {e}")))
    }
}
