//! Sparse override payload: only the fields a user actually changed

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::data::AllInputs;
use super::fields::{AssetClass, AssetField, FieldKey, MacroField, Region};
use crate::error::{CmeError, Result};

/// Override payload in model units.
///
/// Wire format mirrors [`AllInputs`]:
/// `{"macro": {"us": {"rgdp_growth": 0.015}}, "bonds_hy": {"duration": 4.5}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overrides {
    #[serde(rename = "macro", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub macro_inputs: BTreeMap<Region, BTreeMap<MacroField, f64>>,
    #[serde(flatten)]
    pub assets: BTreeMap<AssetClass, BTreeMap<AssetField, f64>>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON payload; unknown regions, assets or fields are rejected
    pub fn from_json(json: &str) -> Result<Self> {
        let overrides: Overrides =
            serde_json::from_str(json).map_err(|e| CmeError::InvalidOverrides(e.to_string()))?;
        Ok(overrides)
    }

    pub fn is_empty(&self) -> bool {
        self.macro_inputs.values().all(BTreeMap::is_empty)
            && self.assets.values().all(BTreeMap::is_empty)
    }

    pub fn len(&self) -> usize {
        self.macro_inputs.values().map(BTreeMap::len).sum::<usize>()
            + self.assets.values().map(BTreeMap::len).sum::<usize>()
    }

    pub fn insert(&mut self, key: FieldKey, value: f64) {
        match key {
            FieldKey::Macro(region, field) => {
                self.macro_inputs.entry(region).or_default().insert(field, value);
            }
            FieldKey::Asset(asset, field) => {
                self.assets.entry(asset).or_default().insert(field, value);
            }
        }
    }

    pub fn get(&self, key: FieldKey) -> Option<f64> {
        match key {
            FieldKey::Macro(region, field) => {
                self.macro_inputs.get(&region).and_then(|m| m.get(&field)).copied()
            }
            FieldKey::Asset(asset, field) => {
                self.assets.get(&asset).and_then(|m| m.get(&field)).copied()
            }
        }
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.get(key).is_some()
    }

    pub fn has_macro(&self, region: Region, field: MacroField) -> bool {
        self.contains(FieldKey::Macro(region, field))
    }

    /// All entries, macro first
    pub fn entries(&self) -> Vec<(FieldKey, f64)> {
        let macro_entries = self.macro_inputs.iter().flat_map(|(&region, fields)| {
            fields
                .iter()
                .map(move |(&field, &value)| (FieldKey::Macro(region, field), value))
        });
        let asset_entries = self.assets.iter().flat_map(|(&asset, fields)| {
            fields
                .iter()
                .map(move |(&field, &value)| (FieldKey::Asset(asset, field), value))
        });
        macro_entries.chain(asset_entries).collect()
    }

    /// Check every entry is finite and addresses a real field
    pub fn validate(&self) -> Result<()> {
        for (key, value) in self.entries() {
            if !value.is_finite() {
                return Err(CmeError::InvalidOverrides(format!(
                    "non-finite value {} for {}",
                    value, key
                )));
            }
            if let FieldKey::Asset(asset, field) = key {
                if !asset.fields().contains(&field) {
                    return Err(CmeError::InvalidOverrides(format!(
                        "field {} does not apply to {}",
                        field, asset
                    )));
                }
            }
        }
        Ok(())
    }

    /// Merge onto a full input set
    pub fn apply_to(&self, inputs: &mut AllInputs) -> Result<()> {
        self.validate()?;
        for (key, value) in self.entries() {
            inputs.set(key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_payload() {
        let json = r#"{
            "macro": {"us": {"rgdp_growth": 0.015, "my_ratio": 2.4}},
            "bonds_hy": {"duration": 4.5},
            "equity_japan": {"current_pe": 16}
        }"#;
        let overrides = Overrides::from_json(json).unwrap();
        assert_eq!(overrides.len(), 4);
        assert_eq!(overrides.get(FieldKey::Macro(Region::Us, MacroField::RgdpGrowth)), Some(0.015));
        assert_eq!(
            overrides.get(FieldKey::Asset(AssetClass::EquityJapan, AssetField::CurrentPe)),
            Some(16.0)
        );
    }

    #[test]
    fn test_unknown_asset_rejected() {
        assert!(matches!(
            Overrides::from_json(r#"{"crypto": {"duration": 1.0}}"#),
            Err(CmeError::InvalidOverrides(_))
        ));
        assert!(Overrides::from_json(r#"{"macro": {"mars": {}}}"#).is_err());
    }

    #[test]
    fn test_validate_rejects_misplaced_field() {
        let mut overrides = Overrides::new();
        overrides.insert(FieldKey::Asset(AssetClass::BondsGlobal, AssetField::TargetPe), 15.0);
        assert!(overrides.validate().is_err());
    }

    #[test]
    fn test_empty_payload() {
        let overrides = Overrides::from_json("{}").unwrap();
        assert!(overrides.is_empty());
        assert_eq!(overrides, Overrides::default());
        assert_eq!(serde_json::to_string(&overrides).unwrap(), "{}");
    }

    #[test]
    fn test_apply_to_inputs() {
        let mut inputs = AllInputs::fallback();
        let mut overrides = Overrides::new();
        overrides.insert(FieldKey::Macro(Region::Em, MacroField::CurrentTbill), 0.05);
        overrides.insert(FieldKey::Asset(AssetClass::AbsoluteReturn, AssetField::BetaMarket), 0.5);
        overrides.apply_to(&mut inputs).unwrap();
        assert_eq!(inputs.macro_for(Region::Em).building_blocks.current_tbill, 0.05);
        assert_eq!(inputs.absolute_return.betas.market, 0.5);
    }
}
