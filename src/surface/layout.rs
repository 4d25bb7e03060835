//! Physical control layout
//!
//! Fixed identifier tables for every control. Index order decides MIDI
//! assignments: sliders map to CC 1-5, knobs to CC 6-9, and button pin
//! numbers are used directly as note pitches.

use serde::{Deserialize, Serialize};

pub const BUTTON_COUNT: usize = 5;
pub const SLIDER_COUNT: usize = 5;
pub const KNOB_COUNT: usize = 4;

/// CC number of the first slider
pub const SLIDER_CC_BASE: u8 = 1;

/// CC number of the first knob
pub const KNOB_CC_BASE: u8 = 6;

/// Pin identifiers of all tracked controls
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SurfaceLayout {
    #[serde(default = "default_upper_buttons")]
    pub upper_buttons: [u8; BUTTON_COUNT],
    #[serde(default = "default_lower_buttons")]
    pub lower_buttons: [u8; BUTTON_COUNT],
    #[serde(default = "default_sliders")]
    pub sliders: [u8; SLIDER_COUNT],
    #[serde(default = "default_knobs")]
    pub knobs: [u8; KNOB_COUNT],
}

impl SurfaceLayout {
    /// Both button rows, lower first
    pub fn buttons(&self) -> impl Iterator<Item = u8> + '_ {
        self.lower_buttons
            .iter()
            .chain(self.upper_buttons.iter())
            .copied()
    }

    /// Index of the upper button with pin `pin`, if any
    pub fn upper_index(&self, pin: u8) -> Option<usize> {
        self.upper_buttons.iter().position(|&p| p == pin)
    }
}

impl Default for SurfaceLayout {
    fn default() -> Self {
        Self {
            upper_buttons: default_upper_buttons(),
            lower_buttons: default_lower_buttons(),
            sliders: default_sliders(),
            knobs: default_knobs(),
        }
    }
}

// Arduino Mega/Due numbering: A0 is pin 54
fn default_upper_buttons() -> [u8; BUTTON_COUNT] { [44, 45, 46, 47, 48] }
fn default_lower_buttons() -> [u8; BUTTON_COUNT] { [49, 50, 51, 52, 53] }
fn default_sliders() -> [u8; SLIDER_COUNT] { [54, 55, 56, 57, 58] }
fn default_knobs() -> [u8; KNOB_COUNT] { [61, 62, 59, 60] }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables() {
        let layout = SurfaceLayout::default();
        assert_eq!(layout.upper_index(46), Some(2));
        assert_eq!(layout.upper_index(49), None);
        assert_eq!(layout.buttons().count(), 2 * BUTTON_COUNT);
        assert_eq!(layout.buttons().next(), Some(49));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let layout: SurfaceLayout = serde_yaml::from_str("knobs: [1, 2, 3, 4]").unwrap();
        assert_eq!(layout.knobs, [1, 2, 3, 4]);
        assert_eq!(layout.sliders, default_sliders());
    }

    #[test]
    fn test_wrong_table_length_is_rejected() {
        let result: Result<SurfaceLayout, _> = serde_yaml::from_str("knobs: [1, 2, 3]");
        assert!(result.is_err());
    }
}
