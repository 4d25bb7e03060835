//! Configuration management for the control surface
//!
//! Handles loading, parsing and validation of the YAML configuration file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tokio::fs;

use crate::quantizer::{Quantizer, MAX_RESOLUTION, MIN_RESOLUTION};
use crate::surface::SurfaceLayout;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub surface: SurfaceConfig,
    #[serde(default)]
    pub leds: LedConfig,
    #[serde(default)]
    pub midi: MidiConfig,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

/// Control layout and MIDI mapping
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SurfaceConfig {
    /// MIDI channel (0-15) used for every outgoing message
    #[serde(default)]
    pub channel: u8,
    /// ADC resolution in bits
    #[serde(default = "default_adc_resolution")]
    pub adc_resolution: u8,
    #[serde(flatten)]
    pub layout: SurfaceLayout,
}

/// LED strip configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedConfig {
    #[serde(default = "default_led_count")]
    pub count: usize,
    /// Global brightness (0-255)
    #[serde(default = "default_brightness")]
    pub brightness: u8,
}

/// MIDI port configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MidiConfig {
    #[serde(default = "default_client_name")]
    pub client_name: String,
    /// Output port name pattern (case-insensitive substring)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_port: Option<String>,
    /// Input port name pattern (case-insensitive substring)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_port: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("MIDI channel {0} is invalid (must be 0-15)")]
    Channel(u8),

    #[error("ADC resolution {0} is invalid (must be {MIN_RESOLUTION}-{MAX_RESOLUTION} bits)")]
    Resolution(u8),

    #[error("button pin {0} is used more than once")]
    DuplicateButton(u8),

    #[error("button pin {0} cannot be sent as a note number (must be 0-127)")]
    ButtonPitch(u8),

    #[error("LED count {count} is too small for {required} upper buttons")]
    LedCount { count: usize, required: usize },

    #[error("poll interval must be at least 1 ms")]
    PollInterval,

    #[error("MIDI client name cannot be empty")]
    ClientName,
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config = Self::from_yaml(&contents)
            .with_context(|| format!("Invalid config file: {}", path))?;

        Ok(config)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: AppConfig =
            serde_yaml::from_str(contents).context("Failed to parse YAML config")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let surface = &self.surface;

        if surface.channel > 15 {
            return Err(ConfigError::Channel(surface.channel));
        }

        if !(MIN_RESOLUTION..=MAX_RESOLUTION).contains(&surface.adc_resolution) {
            return Err(ConfigError::Resolution(surface.adc_resolution));
        }

        // Button pins double as note numbers, so they must be unique 7-bit values
        let mut seen = HashSet::new();
        for pin in surface.layout.buttons() {
            if pin > 127 {
                return Err(ConfigError::ButtonPitch(pin));
            }
            if !seen.insert(pin) {
                return Err(ConfigError::DuplicateButton(pin));
            }
        }

        let required = surface.layout.upper_buttons.len();
        if self.leds.count < required {
            return Err(ConfigError::LedCount {
                count: self.leds.count,
                required,
            });
        }

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::PollInterval);
        }

        if self.midi.client_name.trim().is_empty() {
            return Err(ConfigError::ClientName);
        }

        Ok(())
    }

    /// Quantizer for the configured ADC resolution
    pub fn quantizer(&self) -> Result<Quantizer, ConfigError> {
        Quantizer::new(self.surface.adc_resolution)
            .map_err(|_| ConfigError::Resolution(self.surface.adc_resolution))
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            channel: 0,
            adc_resolution: default_adc_resolution(),
            layout: SurfaceLayout::default(),
        }
    }
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            count: default_led_count(),
            brightness: default_brightness(),
        }
    }
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            client_name: default_client_name(),
            output_port: None,
            input_port: None,
        }
    }
}

// Default value functions
fn default_poll_interval() -> u64 { 1 }
fn default_adc_resolution() -> u8 { 12 }
fn default_led_count() -> usize { 5 }
fn default_brightness() -> u8 { 100 }
fn default_client_name() -> String { "midi-surface".to_string() }
