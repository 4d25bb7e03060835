//! Analog sample quantizer
//!
//! Converts raw ADC readings into 7-bit MIDI values and decides whether a
//! change is large enough to be worth an event. The conversion divisor doubles
//! as the noise floor, so a control has to move by about one output step
//! before anything is emitted.

use thiserror::Error;

/// Default ADC resolution in bits
pub const DEFAULT_RESOLUTION: u8 = 12;

/// Smallest resolution that still yields a non-zero conversion factor
pub const MIN_RESOLUTION: u8 = 7;

/// Largest resolution whose samples fit in a `u16`
pub const MAX_RESOLUTION: u8 = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantizerError {
    #[error("ADC resolution {0} bits is out of range ({MIN_RESOLUTION}-{MAX_RESOLUTION})")]
    Resolution(u8),
}

/// Sample-to-MIDI quantizer for a fixed ADC resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantizer {
    resolution: u8,
    conversion_factor: u16,
}

impl Quantizer {
    /// Create a quantizer for an ADC with `resolution` bits
    pub fn new(resolution: u8) -> Result<Self, QuantizerError> {
        if !(MIN_RESOLUTION..=MAX_RESOLUTION).contains(&resolution) {
            return Err(QuantizerError::Resolution(resolution));
        }

        // 2^R / 128, computed wide so R=16 does not overflow
        let conversion_factor = ((1u32 << resolution) / 128) as u16;

        Ok(Self {
            resolution,
            conversion_factor,
        })
    }

    pub fn resolution(&self) -> u8 {
        self.resolution
    }

    /// Raw units per MIDI step, also the significance threshold
    pub fn conversion_factor(&self) -> u16 {
        self.conversion_factor
    }

    /// Highest sample the ADC can produce
    pub fn max_sample(&self) -> u16 {
        ((1u32 << self.resolution) - 1) as u16
    }

    /// Convert a raw sample to a 7-bit value (truncating)
    ///
    /// Samples above the ADC range saturate at 127.
    pub fn to_seven_bit(&self, sample: u16) -> u8 {
        (sample / self.conversion_factor).min(127) as u8
    }

    /// Whether `current` moved far enough from `last` to emit an event
    pub fn is_significant(&self, current: u16, last: u16) -> bool {
        current.abs_diff(last) > self.conversion_factor
    }
}

impl Default for Quantizer {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            conversion_factor: 32,
        }
    }
}
