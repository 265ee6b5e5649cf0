//! JSON persistence for [`SchemaData`].

use std::fs;
use std::path::Path;

use crate::error::{AnalysisError, AnalysisResult};
use crate::model::SchemaData;

/// Default artifact name written by the CLI.
pub const DEFAULT_OUTPUT: &str = "database-schema.json";

/// Write `schema` as pretty-printed JSON, creating parent directories.
pub fn export_json(schema: &SchemaData, path: &Path) -> AnalysisResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AnalysisError::export(path.display(), e))?;
    }
    let json =
        serde_json::to_string_pretty(schema).map_err(|e| AnalysisError::export(path.display(), e))?;
    fs::write(path, json).map_err(|e| AnalysisError::export(path.display(), e))
}

/// Read a previously exported artifact.
pub fn import_json(path: &Path) -> AnalysisResult<SchemaData> {
    let json = fs::read_to_string(path).map_err(|e| AnalysisError::export(path.display(), e))?;
    serde_json::from_str(&json).map_err(|e| AnalysisError::export(path.display(), e))
}
