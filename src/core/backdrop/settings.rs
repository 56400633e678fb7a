//! Tuning presets, hard caps, and the options a host passes to the backdrop

use serde::{Deserialize, Serialize};

use super::tier::ForceMode;

/// Hard cap on particles in the accelerated field
pub const MAX_PARTICLES: usize = 300;

/// Hard cap on precomputed connections in the accelerated field
pub const MAX_CONNECTIONS: usize = 150;

/// Hard cap on particles in the SVG fallback
pub const MAX_SIMPLE_PARTICLES: usize = 50;

/// Bounds for the frame-rate limiter
pub const MIN_FRAME_RATE: u32 = 1;
pub const MAX_FRAME_RATE: u32 = 120;

/// Particles examined after each particle when linking the accelerated field
pub const OPTIMIZED_NEIGHBOR_WINDOW: usize = 10;

/// Attribute on `<html>` carrying the serialized [`BackdropOptions`]
pub const OPTIONS_ATTRIBUTE: &str = "data-backdrop";

/// Quality preset picked from the device profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    High,
    Medium,
    Low,
}

impl QualityPreset {
    pub fn settings(&self) -> TierSettings {
        match self {
            QualityPreset::High => TierSettings {
                particle_count: 300,
                connection_distance: 8.0,
                max_connections: 150,
                frame_rate: 60,
            },
            QualityPreset::Medium => TierSettings {
                particle_count: 200,
                connection_distance: 6.0,
                max_connections: 100,
                frame_rate: 30,
            },
            QualityPreset::Low => TierSettings {
                particle_count: 100,
                connection_distance: 4.0,
                max_connections: 50,
                frame_rate: 15,
            },
        }
    }
}

/// Numeric knobs for the accelerated particle field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierSettings {
    pub particle_count: usize,
    /// World-space distance under which two particles are linked
    pub connection_distance: f32,
    pub max_connections: usize,
    /// Target frames per second for the render loop
    pub frame_rate: u32,
}

impl TierSettings {
    /// Clamp every knob into its hard bounds
    pub fn clamped(self) -> Self {
        let connection_distance = if self.connection_distance.is_finite() {
            self.connection_distance.max(0.0)
        } else {
            0.0
        };

        Self {
            particle_count: self.particle_count.min(MAX_PARTICLES),
            connection_distance,
            max_connections: self.max_connections.min(MAX_CONNECTIONS),
            frame_rate: self.frame_rate.clamp(MIN_FRAME_RATE, MAX_FRAME_RATE),
        }
    }

    /// Minimum milliseconds between two rendered frames
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / f64::from(self.frame_rate.clamp(MIN_FRAME_RATE, MAX_FRAME_RATE))
    }
}

impl Default for TierSettings {
    fn default() -> Self {
        QualityPreset::Medium.settings()
    }
}

/// Knobs for the SVG fallback network
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimpleSettings {
    pub particle_count: usize,
    /// Distance in percent-of-viewport units
    pub connection_distance: f32,
    /// How many following particles each particle is compared against
    pub neighbor_window: usize,
}

impl SimpleSettings {
    pub fn clamped(self) -> Self {
        Self {
            particle_count: self.particle_count.min(MAX_SIMPLE_PARTICLES),
            ..self
        }
    }
}

impl Default for SimpleSettings {
    fn default() -> Self {
        Self {
            particle_count: 50,
            connection_distance: 20.0,
            neighbor_window: 2,
        }
    }
}

fn default_performance_mode() -> bool {
    true
}

/// Options a page passes to the backdrop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackdropOptions {
    #[serde(default)]
    pub force_mode: ForceMode,
    /// Enables the adaptive quality monitor
    #[serde(default = "default_performance_mode")]
    pub enable_performance_mode: bool,
    /// Replaces the profile-derived preset for the accelerated tier
    #[serde(default)]
    pub tuning: Option<TierSettings>,
}

impl BackdropOptions {
    /// Settings for the accelerated tier: the override if any, else the
    /// preset, always clamped
    pub fn resolve_settings(&self, preset: QualityPreset) -> TierSettings {
        self.tuning.unwrap_or_else(|| preset.settings()).clamped()
    }

    /// Parse options serialized into the page, falling back to defaults
    pub fn from_json_or_default(raw: Option<&str>) -> Self {
        raw.and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for BackdropOptions {
    fn default() -> Self {
        Self {
            force_mode: ForceMode::Auto,
            enable_performance_mode: true,
            tuning: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_respect_caps() {
        for preset in [QualityPreset::High, QualityPreset::Medium, QualityPreset::Low] {
            let settings = preset.settings();
            assert!(settings.particle_count <= MAX_PARTICLES);
            assert!(settings.max_connections <= MAX_CONNECTIONS);
            assert_eq!(settings, settings.clamped());
        }
    }

    #[test]
    fn test_clamped_enforces_caps() {
        let wild = TierSettings {
            particle_count: 10_000,
            connection_distance: f32::NAN,
            max_connections: 9_999,
            frame_rate: 0,
        }
        .clamped();

        assert_eq!(wild.particle_count, MAX_PARTICLES);
        assert_eq!(wild.max_connections, MAX_CONNECTIONS);
        assert_eq!(wild.connection_distance, 0.0);
        assert_eq!(wild.frame_rate, MIN_FRAME_RATE);
    }

    #[test]
    fn test_frame_interval() {
        assert!((QualityPreset::High.settings().frame_interval_ms() - 16.666).abs() < 0.01);
        assert_eq!(QualityPreset::Low.settings().frame_interval_ms(), 1000.0 / 15.0);
    }

    #[test]
    fn test_options_resolve_tuning_override() {
        let options = BackdropOptions {
            tuning: Some(TierSettings {
                particle_count: 500,
                connection_distance: 5.0,
                max_connections: 20,
                frame_rate: 24,
            }),
            ..BackdropOptions::default()
        };

        let resolved = options.resolve_settings(QualityPreset::High);
        assert_eq!(resolved.particle_count, MAX_PARTICLES);
        assert_eq!(resolved.max_connections, 20);
        assert_eq!(resolved.frame_rate, 24);

        let plain = BackdropOptions::default().resolve_settings(QualityPreset::Low);
        assert_eq!(plain, QualityPreset::Low.settings());
    }

    #[test]
    fn test_options_from_page_json() {
        let options =
            BackdropOptions::from_json_or_default(Some(r#"{"force_mode":"simple"}"#));
        assert_eq!(options.force_mode, ForceMode::Simple);
        assert!(options.enable_performance_mode);
        assert!(options.tuning.is_none());

        let json = BackdropOptions {
            force_mode: ForceMode::None,
            enable_performance_mode: false,
            tuning: None,
        }
        .to_json();
        let options = BackdropOptions::from_json_or_default(Some(json.as_str()));
        assert_eq!(options.force_mode, ForceMode::None);
        assert!(!options.enable_performance_mode);

        assert_eq!(
            BackdropOptions::from_json_or_default(Some("not json")),
            BackdropOptions::default()
        );
        assert_eq!(
            BackdropOptions::from_json_or_default(None),
            BackdropOptions::default()
        );
    }

    #[test]
    fn test_simple_settings_cap() {
        let settings = SimpleSettings {
            particle_count: 400,
            ..SimpleSettings::default()
        }
        .clamped();
        assert_eq!(settings.particle_count, MAX_SIMPLE_PARTICLES);
    }
}
