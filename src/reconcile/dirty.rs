use std::collections::BTreeSet;

use crate::inputs::{MacroField, Region};

/// Direct-forecast fields the user explicitly set.
///
/// Only direct fields (`inflation_forecast`, `rgdp_growth`, `tbill_forecast`)
/// can be marked; building blocks never carry a flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyFieldSet {
    fields: BTreeSet<(Region, MacroField)>,
}

impl DirtyFieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false (and records nothing) for building-block fields
    pub fn mark(&mut self, region: Region, field: MacroField) -> bool {
        if !field.is_direct() {
            return false;
        }
        self.fields.insert((region, field));
        true
    }

    pub fn contains(&self, region: Region, field: MacroField) -> bool {
        self.fields.contains(&(region, field))
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Region, MacroField)> {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_direct_fields_marked() {
        let mut dirty = DirtyFieldSet::new();
        assert!(dirty.mark(Region::Us, MacroField::TbillForecast));
        assert!(!dirty.mark(Region::Us, MacroField::CurrentTbill));
        assert!(dirty.contains(Region::Us, MacroField::TbillForecast));
        assert!(!dirty.contains(Region::Us, MacroField::CurrentTbill));
        assert_eq!(dirty.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut dirty = DirtyFieldSet::new();
        dirty.mark(Region::Em, MacroField::RgdpGrowth);
        dirty.mark(Region::Japan, MacroField::InflationForecast);
        dirty.clear();
        assert!(dirty.is_empty());
    }
}
