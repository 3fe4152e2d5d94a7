//! CSV-based default table loader
//!
//! Loads the active default input table from `data/defaults.csv`. Rows are
//! `section,key,field,value` in model units, e.g. `macro,us,current_tbill,0.0367`
//! or `asset,bonds_hy,duration,4.0`.

use std::collections::BTreeSet;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;

use super::data::AllInputs;
use super::fields::{AssetClass, AssetField, FieldKey, MacroField, Region};
use crate::error::{CmeError, Result};

/// Default path to the defaults table
pub const DEFAULT_DEFAULTS_PATH: &str = "data/defaults.csv";

/// Source of the active default table
pub trait DefaultsProvider {
    fn fetch(&self) -> Result<AllInputs>;
}

/// Reads the table from a CSV file
#[derive(Debug, Clone)]
pub struct CsvDefaults {
    path: PathBuf,
}

impl CsvDefaults {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for CsvDefaults {
    fn default() -> Self {
        Self::new(DEFAULT_DEFAULTS_PATH)
    }
}

impl DefaultsProvider for CsvDefaults {
    fn fetch(&self) -> Result<AllInputs> {
        let file = std::fs::File::open(&self.path)?;
        load_defaults_from_reader(file)
    }
}

/// Serves the built-in table
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackDefaults;

impl DefaultsProvider for FallbackDefaults {
    fn fetch(&self) -> Result<AllInputs> {
        Ok(AllInputs::fallback())
    }
}

#[derive(Debug, Deserialize)]
struct DefaultsRow {
    section: String,
    key: String,
    field: String,
    value: f64,
}

impl DefaultsRow {
    fn to_field_key(&self) -> Result<FieldKey> {
        match self.section.as_str() {
            "macro" => {
                let region: Region = self.key.parse()?;
                let field: MacroField = self.field.parse()?;
                Ok(FieldKey::Macro(region, field))
            }
            "asset" => {
                let asset: AssetClass = self.key.parse()?;
                let field: AssetField = self.field.parse()?;
                Ok(FieldKey::Asset(asset, field))
            }
            other => Err(CmeError::Defaults(format!("unknown section: {}", other))),
        }
    }
}

/// Load a complete default table from any reader.
///
/// Every field must appear exactly once; a partial table is an error rather
/// than a silent blend with the built-in values.
pub fn load_defaults_from_reader<R: Read>(reader: R) -> Result<AllInputs> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut inputs = AllInputs::fallback();
    let mut seen = BTreeSet::new();

    for result in csv_reader.deserialize() {
        let row: DefaultsRow = result?;
        let key = row.to_field_key()?;
        if !seen.insert(key) {
            return Err(CmeError::Defaults(format!("duplicate row for {}", key)));
        }
        inputs.set(key, row.value)?;
    }

    let missing: Vec<String> = AllInputs::keys()
        .into_iter()
        .filter(|key| !seen.contains(key))
        .map(|key| key.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CmeError::Defaults(format!(
            "{} fields missing (first: {})",
            missing.len(),
            missing[0]
        )));
    }

    debug!("Loaded {} default values", seen.len());
    Ok(inputs)
}

/// Write a table in the same format the loader reads
pub fn write_defaults_csv<W: Write>(inputs: &AllInputs, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["section", "key", "field", "value"])?;
    for key in AllInputs::keys() {
        let value = inputs.get(key)?.to_string();
        match key {
            FieldKey::Macro(region, field) => {
                csv_writer.write_record(["macro", region.as_str(), field.as_str(), value.as_str()])?
            }
            FieldKey::Asset(asset, field) => {
                csv_writer.write_record(["asset", asset.as_str(), field.as_str(), value.as_str()])?
            }
        }
    }
    csv_writer.flush()?;
    Ok(())
}

/// Fetch from the provider, falling back to the built-in table on any failure
pub fn load_defaults_or_fallback(provider: &dyn DefaultsProvider) -> AllInputs {
    match provider.fetch() {
        Ok(inputs) => inputs,
        Err(e) => {
            warn!("Default table unavailable, using built-in values: {}", e);
            AllInputs::fallback()
        }
    }
}
