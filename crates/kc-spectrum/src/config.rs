//! Spectrum model configuration.

use serde::Deserialize;

/// Name of the built-in OS ROM in the host's ROM cache.
pub const ROM_SLOT: &str = "spectrum48k";

/// Configuration for creating a Spectrum instance.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpectrumConfig {
    /// User OS ROM file, loaded through the host's ROM loader. Falls back
    /// to the built-in image when absent or unreadable.
    pub rom_file: Option<String>,
    /// Palette brightness, 0.0 to 1.0.
    pub brightness: f32,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            rom_file: None,
            brightness: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: SpectrumConfig = serde_json::from_str(r#"{"rom_file":"48.rom"}"#)
            .expect("valid json");
        assert_eq!(config.rom_file.as_deref(), Some("48.rom"));
        assert!((config.brightness - 1.0).abs() < f32::EPSILON);
    }
}
