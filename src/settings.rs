//! Animation and audio settings
//!
//! Read as JSON: LocalStorage on the web, a file on native.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{GROWTH_DURATION_MS, MAX_DELTA_TICKS, NUM_STARS, TICK_UNIT_MS};

/// Upper bound on stars regardless of configuration
pub const MAX_STARS: usize = 20_000;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Star field size for this preset
    pub fn star_count(&self) -> usize {
        match self {
            QualityPreset::Low => NUM_STARS / 2,
            QualityPreset::Medium => NUM_STARS,
            QualityPreset::High => NUM_STARS * 2,
        }
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityPreset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(QualityPreset::Low),
            "medium" | "med" => Ok(QualityPreset::Medium),
            "high" => Ok(QualityPreset::High),
            _ => anyhow::bail!("unknown quality preset {s:?}"),
        }
    }
}

/// Animation settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Explicit star count (overrides the preset)
    pub star_count: Option<usize>,

    // === Timing ===
    /// Wall-clock length of the growth phase
    pub growth_duration_ms: f32,
    /// Nominal tick length used to normalize frame gaps
    pub tick_unit_ms: f32,
    /// Largest delta one frame may apply
    pub max_delta_ticks: f32,
    /// Reset everything this long after the black hole appears (`null` turns it off)
    pub auto_reset_ms: Option<f64>,

    /// RNG seed for the star field (wall clock when unset)
    pub seed: Option<u64>,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            star_count: None,

            growth_duration_ms: GROWTH_DURATION_MS,
            tick_unit_ms: TICK_UNIT_MS,
            max_delta_ticks: MAX_DELTA_TICKS,
            auto_reset_ms: Some(f64::from(GROWTH_DURATION_MS)),

            seed: None,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective star count (explicit override, else preset), capped
    pub fn star_count(&self) -> usize {
        self.star_count
            .unwrap_or_else(|| self.quality.star_count())
            .min(MAX_STARS)
    }

    /// Effective sound volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Replace out-of-range values with usable ones
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.growth_duration_ms.is_finite() && self.growth_duration_ms > 0.0) {
            log::warn!("Invalid growth duration {}, using default", self.growth_duration_ms);
            self.growth_duration_ms = defaults.growth_duration_ms;
        }
        if !(self.tick_unit_ms.is_finite() && self.tick_unit_ms > 0.0) {
            log::warn!("Invalid tick unit {}, using default", self.tick_unit_ms);
            self.tick_unit_ms = defaults.tick_unit_ms;
        }
        if !(self.max_delta_ticks.is_finite() && self.max_delta_ticks > 0.0) {
            self.max_delta_ticks = defaults.max_delta_ticks;
        }
        self.auto_reset_ms = self.auto_reset_ms.filter(|ms| ms.is_finite() && *ms >= 0.0);
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "black_hole_calc_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Load settings from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_file(path: &std::path::Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings = Self::from_json(&json)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}
