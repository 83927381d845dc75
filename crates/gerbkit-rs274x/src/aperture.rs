//! Aperture table
//!
//! D-codes are pre-allocated as a contiguous range of slots. An aperture
//! definition fills in a slot; a definition for a D-code outside the
//! range is accepted and dropped.

use gerbkit_core::IntPoint;
use serde::{Deserialize, Serialize};

/// Standard aperture shapes plus macro-based apertures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ApertureShape {
    #[default]
    Circle,
    Rectangle,
    Oval,
    Polygon,
    /// Shape given by a named aperture macro
    Macro,
}

impl ApertureShape {
    /// Shape for the letter following the D-code in `%AD`
    pub fn from_letter(letter: u8) -> Option<Self> {
        match letter {
            b'C' => Some(Self::Circle),
            b'R' => Some(Self::Rectangle),
            b'O' => Some(Self::Oval),
            b'P' => Some(Self::Polygon),
            _ => None,
        }
    }
}

/// Hole in the middle of a flashed aperture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrillShape {
    #[default]
    None,
    /// Single diameter
    Round,
    /// Separate X and Y sizes
    Slot,
}

/// One D-code slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApertureDefinition {
    pub dcode: i64,
    pub shape: ApertureShape,
    /// Width and height in internal units
    pub size: IntPoint,
    /// Drill hole size in internal units
    pub drill: IntPoint,
    pub drill_shape: DrillShape,
    /// Polygon vertex count (`P` apertures)
    pub vertices: Option<u32>,
    /// Polygon rotation in degrees (`P` apertures)
    pub rotation: Option<f64>,
    /// Macro name (`Macro` apertures)
    pub macro_name: Option<String>,
    /// Raw parameters passed to the macro
    pub macro_params: Vec<f64>,
    /// Set once an `%AD` command has filled the slot
    pub defined: bool,
}

impl ApertureDefinition {
    pub fn new(dcode: i64) -> Self {
        Self {
            dcode,
            ..Self::default()
        }
    }

    pub fn has_drill(&self) -> bool {
        self.drill_shape != DrillShape::None
    }
}

/// Pre-allocated D-code slots `first..=last`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApertureTable {
    first: i64,
    slots: Vec<ApertureDefinition>,
}

impl ApertureTable {
    pub fn new(first: i64, last: i64) -> Self {
        let slots = (first..=last).map(ApertureDefinition::new).collect();
        Self { first, slots }
    }

    fn index(&self, dcode: i64) -> Option<usize> {
        let idx = usize::try_from(dcode.checked_sub(self.first)?).ok()?;
        (idx < self.slots.len()).then_some(idx)
    }

    pub fn get(&self, dcode: i64) -> Option<&ApertureDefinition> {
        self.index(dcode).map(|i| &self.slots[i])
    }

    pub fn get_mut(&mut self, dcode: i64) -> Option<&mut ApertureDefinition> {
        self.index(dcode).map(move |i| &mut self.slots[i])
    }

    /// Slots filled by an aperture definition
    pub fn defined(&self) -> impl Iterator<Item = &ApertureDefinition> {
        self.slots.iter().filter(|a| a.defined)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl Default for ApertureTable {
    fn default() -> Self {
        Self::new(10, 999)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_are_preallocated() {
        let table = ApertureTable::new(10, 19);
        assert_eq!(table.capacity(), 10);
        assert_eq!(table.get(10).map(|a| a.dcode), Some(10));
        assert_eq!(table.get(19).map(|a| a.dcode), Some(19));
        assert!(table.get(9).is_none());
        assert!(table.get(20).is_none());
        assert!(table.get(i64::MIN).is_none());
        assert_eq!(table.defined().count(), 0);
    }

    #[test]
    fn test_get_mut_updates_slot() {
        let mut table = ApertureTable::default();
        if let Some(slot) = table.get_mut(11) {
            slot.shape = ApertureShape::Oval;
            slot.defined = true;
        }
        let defined: Vec<_> = table.defined().map(|a| a.dcode).collect();
        assert_eq!(defined, vec![11]);
    }

    #[test]
    fn test_shape_letters() {
        assert_eq!(ApertureShape::from_letter(b'C'), Some(ApertureShape::Circle));
        assert_eq!(ApertureShape::from_letter(b'P'), Some(ApertureShape::Polygon));
        assert_eq!(ApertureShape::from_letter(b'X'), None);
    }
}
