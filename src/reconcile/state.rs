//! Working copy of every input with default / computed / override tracking

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::dirty::DirtyFieldSet;
use crate::config::MacroParams;
use crate::error::{CmeError, Result};
use crate::inputs::{
    AllInputs, AssetClass, AssetField, BuildingBlocks, FieldKey, MacroField, Overrides, Region,
    DISPLAY_TOLERANCE,
};
use crate::models::macro_forecast::{forecast, MacroForecast};

/// State of a field relative to the active defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldState {
    /// Untouched, equals the active default
    Default,
    /// Direct forecast tracking the building blocks, away from its default
    Computed,
    /// Explicitly set by the user; immune to auto-sync
    Override,
}

fn differs(a: f64, b: f64) -> bool {
    (a - b).abs() > DISPLAY_TOLERANCE
}

/// Single-writer input state.
///
/// Values are held in display units (percentage points for rates) and
/// converted to model units when exported as overrides. Callers serialize
/// writes; there is no internal locking.
#[derive(Debug, Clone)]
pub struct InputState {
    defaults: AllInputs,
    default_values: BTreeMap<FieldKey, f64>,
    values: BTreeMap<FieldKey, f64>,
    dirty: DirtyFieldSet,
    params: MacroParams,
}

impl InputState {
    pub fn new(defaults: AllInputs, params: MacroParams) -> Self {
        let default_values = Self::display_table(&defaults);
        Self {
            values: default_values.clone(),
            default_values,
            defaults,
            dirty: DirtyFieldSet::new(),
            params,
        }
    }

    fn display_table(inputs: &AllInputs) -> BTreeMap<FieldKey, f64> {
        AllInputs::keys()
            .into_iter()
            .filter_map(|key| inputs.get(key).ok().map(|v| (key, key.unit().to_display(v))))
            .collect()
    }

    /// Active default table, model units
    pub fn defaults(&self) -> &AllInputs {
        &self.defaults
    }

    pub fn macro_params(&self) -> &MacroParams {
        &self.params
    }

    /// Current value in display units
    pub fn value(&self, key: FieldKey) -> Option<f64> {
        self.values.get(&key).copied()
    }

    /// Active default in display units
    pub fn default_value(&self, key: FieldKey) -> Option<f64> {
        self.default_values.get(&key).copied()
    }

    pub fn dirty_fields(&self) -> &DirtyFieldSet {
        &self.dirty
    }

    pub fn is_dirty(&self, region: Region, field: MacroField) -> bool {
        self.dirty.contains(region, field)
    }

    pub fn field_state(&self, key: FieldKey) -> FieldState {
        if let FieldKey::Macro(region, field) = key {
            if self.dirty.contains(region, field) {
                return FieldState::Override;
            }
        }
        match (self.value(key), self.default_value(key)) {
            (Some(v), Some(d)) if differs(v, d) => {
                if key.is_direct() {
                    FieldState::Computed
                } else {
                    FieldState::Override
                }
            }
            _ => FieldState::Default,
        }
    }

    fn write(&mut self, key: FieldKey, value: f64) -> Result<()> {
        if !value.is_finite() {
            warn!("Rejected non-finite write {} to {}", value, key);
            return Err(CmeError::NonFiniteValue { field: key.to_string(), value });
        }
        match self.values.get_mut(&key) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => match key {
                FieldKey::Asset(asset, field) => Err(CmeError::FieldNotApplicable { asset, field }),
                FieldKey::Macro(_, field) => Err(CmeError::UnknownField(field.to_string())),
            },
        }
    }

    /// Set a direct forecast (display units). Always marks it dirty.
    pub fn set_direct(&mut self, region: Region, field: MacroField, value: f64) -> Result<()> {
        if !field.is_direct() {
            return Err(CmeError::UnknownField(format!("{} is not a direct forecast", field)));
        }
        self.write(FieldKey::Macro(region, field), value)?;
        self.dirty.mark(region, field);
        Ok(())
    }

    /// Set a building block (display units). Never touches dirty flags.
    pub fn set_building_block(&mut self, region: Region, field: MacroField, value: f64) -> Result<()> {
        if field.is_direct() {
            return Err(CmeError::UnknownField(format!("{} is not a building block", field)));
        }
        self.write(FieldKey::Macro(region, field), value)
    }

    /// Set an asset input (display units)
    pub fn set_asset(&mut self, asset: AssetClass, field: AssetField, value: f64) -> Result<()> {
        self.write(FieldKey::Asset(asset, field), value)
    }

    /// Building blocks for a region in model units
    pub fn building_blocks(&self, region: Region) -> BuildingBlocks {
        let mut blocks = self.defaults.macro_for(region).building_blocks;
        for field in MacroField::ALL.iter().copied().filter(|f| !f.is_direct()) {
            let key = FieldKey::Macro(region, field);
            if let (Some(value), Some(slot)) = (self.value(key), blocks.field_mut(field)) {
                *slot = key.unit().to_model(value);
            }
        }
        blocks
    }

    /// Live forecast implied by the current building blocks
    pub fn preview(&self, region: Region) -> MacroForecast {
        forecast(region, &self.building_blocks(region), &self.params)
    }

    /// Copy computed direct values (model units) into fields that are not
    /// dirty. Dirty fields are never touched. Returns the fields updated.
    pub fn sync_computed(&mut self, region: Region, computed: &[(MacroField, f64)]) -> Vec<MacroField> {
        let mut updated = Vec::new();
        for &(field, model_value) in computed {
            if !field.is_direct() || self.dirty.contains(region, field) || !model_value.is_finite() {
                continue;
            }
            let key = FieldKey::Macro(region, field);
            let display = key.unit().to_display(model_value);
            if let Some(slot) = self.values.get_mut(&key) {
                if differs(*slot, display) {
                    *slot = display;
                    updated.push(field);
                }
            }
        }
        updated
    }

    /// Sync all three direct fields from a forecast
    pub fn sync_forecast(&mut self, forecast: &MacroForecast) -> Vec<MacroField> {
        let computed: Vec<(MacroField, f64)> = MacroField::DIRECT
            .iter()
            .filter_map(|&field| forecast.direct(field).map(|v| (field, v)))
            .collect();
        self.sync_computed(forecast.region, &computed)
    }

    /// A dirty field whose stored value disagrees with what the building
    /// blocks imply
    pub fn conflict(&self, region: Region, field: MacroField) -> bool {
        if !self.dirty.contains(region, field) {
            return false;
        }
        let key = FieldKey::Macro(region, field);
        match (self.preview(region).direct(field), self.value(key)) {
            (Some(computed), Some(stored)) => differs(key.unit().to_display(computed), stored),
            _ => false,
        }
    }

    /// Minimal payload of everything the user changed, in model units.
    ///
    /// Direct fields are included iff dirty, whatever their value. All other
    /// fields are included iff they differ from the active default.
    pub fn get_overrides(&self) -> Overrides {
        let mut overrides = Overrides::new();
        for (&key, &value) in &self.values {
            let include = match key {
                FieldKey::Macro(region, field) if field.is_direct() => self.dirty.contains(region, field),
                _ => self
                    .default_value(key)
                    .map_or(true, |default| differs(value, default)),
            };
            if include {
                overrides.insert(key, key.unit().to_model(value));
            }
        }
        overrides
    }

    /// Merge a saved payload (model units) onto the current state. Direct
    /// forecasts in the payload become dirty. Non-finite or misplaced entries
    /// are skipped. Returns the number of fields applied.
    pub fn load_scenario(&mut self, overrides: &Overrides) -> usize {
        let mut applied = 0;
        for (key, model_value) in overrides.entries() {
            let display = key.unit().to_display(model_value);
            match self.write(key, display) {
                Ok(()) => {
                    if let FieldKey::Macro(region, field) = key {
                        self.dirty.mark(region, field);
                    }
                    applied += 1;
                }
                Err(e) => warn!("Skipped scenario entry {}: {}", key, e),
            }
        }
        debug!("Loaded scenario: {} of {} fields applied", applied, overrides.len());
        applied
    }

    /// Restore every field from the active defaults and clear the dirty set
    pub fn reset_to_defaults(&mut self) {
        self.values = self.default_values.clone();
        self.dirty.clear();
    }

    /// Replace the active default table wholesale. There is nothing to
    /// preserve yet, so all values reset and the dirty set clears.
    pub fn refresh_defaults(&mut self, defaults: AllInputs) {
        self.default_values = Self::display_table(&defaults);
        self.defaults = defaults;
        self.reset_to_defaults();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn state() -> InputState {
        InputState::new(AllInputs::fallback(), MacroParams::default())
    }

    fn us(field: MacroField) -> FieldKey {
        FieldKey::Macro(Region::Us, field)
    }

    #[test]
    fn test_fresh_state_has_no_overrides() {
        let s = state();
        assert!(s.get_overrides().is_empty());
        assert_eq!(s.field_state(us(MacroField::TbillForecast)), FieldState::Default);
        assert_abs_diff_eq!(s.value(us(MacroField::InflationForecast)).unwrap(), 2.29, epsilon = 1e-9);
    }

    #[test]
    fn test_set_direct_marks_dirty_and_exports() {
        let mut s = state();
        s.set_direct(Region::Us, MacroField::RgdpGrowth, 2.0).unwrap();
        assert!(s.is_dirty(Region::Us, MacroField::RgdpGrowth));
        assert_eq!(s.field_state(us(MacroField::RgdpGrowth)), FieldState::Override);
        let overrides = s.get_overrides();
        assert_abs_diff_eq!(overrides.get(us(MacroField::RgdpGrowth)).unwrap(), 0.02, epsilon = 1e-12);
        assert_eq!(overrides.len(), 1);
    }

    #[test]
    fn test_edited_inputs_report_override() {
        let mut s = state();
        s.set_building_block(Region::Us, MacroField::CurrentTbill, 5.0).unwrap();
        s.set_asset(AssetClass::BondsHy, AssetField::DefaultRate, 6.0).unwrap();
        let tbill = us(MacroField::CurrentTbill);
        let hy = FieldKey::Asset(AssetClass::BondsHy, AssetField::DefaultRate);
        assert_eq!(s.field_state(tbill), FieldState::Override);
        assert_eq!(s.field_state(hy), FieldState::Override);

        let overrides = s.get_overrides();
        assert_abs_diff_eq!(overrides.get(tbill).unwrap(), 0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(overrides.get(hy).unwrap(), 0.06, epsilon = 1e-12);

        // The synced direct forecast tracks the building blocks
        let preview = s.preview(Region::Us);
        s.sync_forecast(&preview);
        assert_eq!(s.field_state(us(MacroField::TbillForecast)), FieldState::Computed);
    }

    #[test]
    fn test_dirty_field_exported_even_at_default_value() {
        let mut s = state();
        let default = s.default_value(us(MacroField::InflationForecast)).unwrap();
        s.set_direct(Region::Us, MacroField::InflationForecast, default).unwrap();
        assert!(s.get_overrides().contains(us(MacroField::InflationForecast)));
    }

    #[test]
    fn test_sticky_override_survives_sync() {
        let mut s = state();
        s.set_direct(Region::Us, MacroField::TbillForecast, 5.0).unwrap();
        let updated = s.sync_computed(Region::Us, &[(MacroField::TbillForecast, 0.09)]);
        assert!(updated.is_empty());
        assert_eq!(s.value(us(MacroField::TbillForecast)), Some(5.0));
    }

    #[test]
    fn test_sync_updates_clean_direct_fields() {
        let mut s = state();
        s.set_building_block(Region::Us, MacroField::CurrentTbill, 5.0).unwrap();
        let preview = s.preview(Region::Us);
        let updated = s.sync_forecast(&preview);
        assert_eq!(updated, vec![MacroField::TbillForecast]);
        assert_abs_diff_eq!(
            s.value(us(MacroField::TbillForecast)).unwrap(),
            preview.tbill * 100.0,
            epsilon = 1e-9
        );
        assert_eq!(s.field_state(us(MacroField::TbillForecast)), FieldState::Computed);
        // Computed direct values are not user intent
        let overrides = s.get_overrides();
        assert!(!overrides.contains(us(MacroField::TbillForecast)));
        assert_abs_diff_eq!(overrides.get(us(MacroField::CurrentTbill)).unwrap(), 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_building_block_within_tolerance_not_exported() {
        let mut s = state();
        s.set_building_block(Region::Eurozone, MacroField::MyRatio, 2.3005).unwrap();
        assert!(s.get_overrides().is_empty());
        s.set_building_block(Region::Eurozone, MacroField::MyRatio, 2.4).unwrap();
        let overrides = s.get_overrides();
        // my_ratio is not a percentage, so no unit conversion
        assert_abs_diff_eq!(
            overrides.get(FieldKey::Macro(Region::Eurozone, MacroField::MyRatio)).unwrap(),
            2.4,
            epsilon = 1e-12
        );
        assert!(!s.is_dirty(Region::Eurozone, MacroField::MyRatio));
    }

    #[test]
    fn test_asset_fields_diffed_against_defaults() {
        let mut s = state();
        s.set_asset(AssetClass::BondsHy, AssetField::Duration, 4.5).unwrap();
        s.set_asset(AssetClass::BondsHy, AssetField::DefaultRate, 6.0).unwrap();
        let overrides = s.get_overrides();
        assert_eq!(overrides.get(FieldKey::Asset(AssetClass::BondsHy, AssetField::Duration)), Some(4.5));
        assert_abs_diff_eq!(
            overrides.get(FieldKey::Asset(AssetClass::BondsHy, AssetField::DefaultRate)).unwrap(),
            0.06,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_reset_round_trip() {
        let mut s = state();
        s.set_direct(Region::Japan, MacroField::InflationForecast, 3.0).unwrap();
        s.set_building_block(Region::Em, MacroField::PopulationGrowth, 2.0).unwrap();
        s.set_asset(AssetClass::EquityUs, AssetField::CurrentPe, 30.0).unwrap();
        s.reset_to_defaults();
        assert_eq!(s.get_overrides(), Overrides::default());
        assert!(s.dirty_fields().is_empty());
    }

    #[test]
    fn test_load_then_export_keeps_direct_fields() {
        let mut payload = Overrides::new();
        payload.insert(FieldKey::Macro(Region::Em, MacroField::RgdpGrowth), 0.05);
        payload.insert(FieldKey::Macro(Region::Us, MacroField::TbillForecast), 0.03);
        payload.insert(FieldKey::Macro(Region::Us, MacroField::CurrentTbill), 0.045);
        payload.insert(FieldKey::Asset(AssetClass::EquityEurope, AssetField::FairCaey), 0.06);

        let mut s = state();
        assert_eq!(s.load_scenario(&payload), 4);
        assert!(s.is_dirty(Region::Em, MacroField::RgdpGrowth));
        assert!(s.is_dirty(Region::Us, MacroField::TbillForecast));

        // Loaded intent survives a sync from building blocks
        let preview = s.preview(Region::Us);
        s.sync_forecast(&preview);

        let exported = s.get_overrides();
        for (key, value) in payload.entries() {
            assert_abs_diff_eq!(exported.get(key).unwrap(), value, epsilon = 1e-12);
        }
        assert_eq!(
            s.field_state(FieldKey::Macro(Region::Em, MacroField::RgdpGrowth)),
            FieldState::Override
        );
    }

    #[test]
    fn test_load_skips_bad_entries() {
        let mut payload = Overrides::new();
        payload.insert(FieldKey::Macro(Region::Us, MacroField::RgdpGrowth), f64::NAN);
        payload.insert(FieldKey::Asset(AssetClass::BondsGlobal, AssetField::TargetPe), 12.0);
        payload.insert(FieldKey::Asset(AssetClass::BondsGlobal, AssetField::Duration), 6.0);
        let mut s = state();
        assert_eq!(s.load_scenario(&payload), 1);
        assert!(!s.is_dirty(Region::Us, MacroField::RgdpGrowth));
        assert_eq!(s.value(FieldKey::Asset(AssetClass::BondsGlobal, AssetField::Duration)), Some(6.0));
    }

    #[test]
    fn test_non_finite_write_rejected() {
        let mut s = state();
        let before = s.value(us(MacroField::CurrentTbill));
        assert!(s.set_building_block(Region::Us, MacroField::CurrentTbill, f64::NAN).is_err());
        assert!(s.set_direct(Region::Us, MacroField::TbillForecast, f64::INFINITY).is_err());
        assert_eq!(s.value(us(MacroField::CurrentTbill)), before);
        assert!(!s.is_dirty(Region::Us, MacroField::TbillForecast));
    }

    #[test]
    fn test_setter_kind_checked() {
        let mut s = state();
        assert!(s.set_direct(Region::Us, MacroField::CurrentTbill, 1.0).is_err());
        assert!(s.set_building_block(Region::Us, MacroField::TbillForecast, 1.0).is_err());
        assert!(s.set_asset(AssetClass::Liquidity, AssetField::Duration, 1.0).is_err());
    }

    #[test]
    fn test_conflict_flags_disagreeing_override() {
        let mut s = state();
        assert!(!s.conflict(Region::Us, MacroField::TbillForecast));
        s.set_direct(Region::Us, MacroField::TbillForecast, 6.0).unwrap();
        assert!(s.conflict(Region::Us, MacroField::TbillForecast));
        let implied = s.preview(Region::Us).tbill * 100.0;
        s.set_direct(Region::Us, MacroField::TbillForecast, implied).unwrap();
        assert!(!s.conflict(Region::Us, MacroField::TbillForecast));
    }

    #[test]
    fn test_refresh_defaults_clears_dirty() {
        let mut s = state();
        s.set_direct(Region::Us, MacroField::RgdpGrowth, 3.0).unwrap();
        let mut fetched = AllInputs::fallback();
        fetched.bonds_global.duration = 6.5;
        s.refresh_defaults(fetched);
        assert!(s.dirty_fields().is_empty());
        assert!(s.get_overrides().is_empty());
        assert_eq!(
            s.value(FieldKey::Asset(AssetClass::BondsGlobal, AssetField::Duration)),
            Some(6.5)
        );
    }

    #[test]
    fn test_building_blocks_in_model_units() {
        let mut s = state();
        s.set_building_block(Region::Us, MacroField::ProductivityGrowth, 1.5).unwrap();
        let blocks = s.building_blocks(Region::Us);
        assert_abs_diff_eq!(blocks.productivity_growth, 0.015, epsilon = 1e-12);
        assert_abs_diff_eq!(blocks.my_ratio, 2.1, epsilon = 1e-12);
    }
}
