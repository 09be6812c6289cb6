//! Machine configuration
//!
//! One serde document covering every tunable of the machine. Missing
//! sections fall back to the product defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use cf_audio::{DEFAULT_SAMPLE_RATE, SfxConfig};
use cf_core::{CfError, CfResult};
use cf_music::MusicConfig;
use cf_roulette::{Geometry, SpinTiming, StripConfig, TierTable};

/// Initial audio settings of a machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub sfx_enabled: bool,
    /// 0.0 - 1.0
    pub sfx_volume: f32,
    pub music_enabled: bool,
    /// 0.0 - 1.0
    pub music_volume: f32,
    /// Render rate for offline output
    pub sample_rate: u32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sfx_enabled: true,
            sfx_volume: 0.8,
            music_enabled: true,
            music_volume: 0.6,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

/// Complete machine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub tiers: TierTable,
    pub strip: StripConfig,
    pub geometry: Geometry,
    pub timing: SpinTiming,
    pub sfx: SfxConfig,
    pub music: MusicConfig,
    pub audio: AudioSettings,
    /// Share message; `{name}` is replaced by the prize name
    pub share_template: String,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            tiers: TierTable::standard(),
            strip: StripConfig::default(),
            geometry: Geometry::default(),
            timing: SpinTiming::normal(),
            sfx: SfxConfig::default(),
            music: MusicConfig::default(),
            audio: AudioSettings::default(),
            share_template: "I just pulled {name} from the ClawForge machine!".into(),
        }
    }
}

impl MachineConfig {
    /// Parse from JSON (missing fields take defaults)
    pub fn from_json_str(json: &str) -> CfResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> CfResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded machine config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> CfResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every section
    pub fn validate(&self) -> CfResult<()> {
        self.tiers.validate()?;
        self.strip.validate()?;
        self.geometry.validate_for(&self.strip)?;
        self.timing.validate()?;
        self.sfx.validate()?;
        self.music.validate()?;

        for (name, volume) in [
            ("sfx", self.audio.sfx_volume),
            ("music", self.audio.music_volume),
        ] {
            if !(0.0..=1.0).contains(&volume) {
                return Err(CfError::InvalidConfig(format!(
                    "{name} volume must be in [0, 1], got {volume}"
                )));
            }
        }
        if self.audio.sample_rate == 0 {
            return Err(CfError::InvalidConfig("sample rate must be > 0".into()));
        }
        Ok(())
    }
}
