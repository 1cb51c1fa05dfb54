//! Top-level machine configuration.

use kc_ac1::Ac1Config;
use kc_core::RamInit;
use kc_spectrum::SpectrumConfig;
use serde::Deserialize;
use thiserror::Error;

/// Errors in a machine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed machine configuration")]
    Parse(#[from] serde_json::Error),
    #[error("CPU speed must be at least 1 kHz")]
    ZeroSpeed,
    #[error("brightness {0} is outside 0.0..=1.0")]
    Brightness(f32),
}

/// Which hardware model to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineKind {
    #[default]
    Spectrum,
    Ac1,
}

/// Everything needed to build one machine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub kind: MachineKind,
    /// RAM content after power-on.
    pub ram_init: RamInit,
    /// Re-read user ROM files on every power-on reset.
    pub reload_roms_on_power_on: bool,
    /// CPU clock override; the model's own default when absent.
    pub speed_khz: Option<u32>,
    pub spectrum: SpectrumConfig,
    pub ac1: Ac1Config,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            kind: MachineKind::default(),
            ram_init: RamInit::default(),
            reload_roms_on_power_on: true,
            speed_khz: None,
            spectrum: SpectrumConfig::default(),
            ac1: Ac1Config::default(),
        }
    }
}

impl MachineConfig {
    /// Parse and validate a JSON configuration. Missing fields take their
    /// defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the type system cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.speed_khz == Some(0) {
            return Err(ConfigError::ZeroSpeed);
        }
        let brightness = self.spectrum.brightness;
        if !(0.0..=1.0).contains(&brightness) {
            return Err(ConfigError::Brightness(brightness));
        }
        Ok(())
    }
}
