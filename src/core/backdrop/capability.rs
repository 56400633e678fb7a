//! Capability detection
//!
//! Turns a one-time snapshot of the host environment into a coarse
//! [`DeviceProfile`]. The browser-side probe that fills [`Environment`] lives
//! in the UI layer; everything here is pure so it runs the same on the server
//! and in tests.

use serde::{Deserialize, Serialize};

use super::settings::{QualityPreset, TierSettings};

/// User-agent fragments that identify a mobile device (matched lowercase)
const MOBILE_MARKERS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Core count assumed when the host does not report one
pub const DEFAULT_CORE_COUNT: u32 = 4;

/// Raw environment reads taken once at mount
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Environment {
    pub user_agent: String,
    /// Whether a hardware drawing context could be created
    pub accelerated_graphics: bool,
    /// `navigator.hardwareConcurrency`
    pub hardware_concurrency: Option<u32>,
    /// `navigator.deviceMemory` in gigabytes
    pub device_memory_gb: Option<f64>,
    /// `(prefers-reduced-motion: reduce)` matched
    pub prefers_reduced_motion: bool,
}

/// Coarse memory classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryTier {
    Low,
    #[default]
    Medium,
    High,
}

impl MemoryTier {
    fn from_hint(device_memory_gb: Option<f64>) -> Self {
        match device_memory_gb {
            Some(gb) if gb > 0.0 && gb <= 2.0 => MemoryTier::Low,
            Some(gb) if gb >= 8.0 => MemoryTier::High,
            _ => MemoryTier::Medium,
        }
    }

    /// One step down, with low as the floor for anything below high
    fn mobile_adjusted(self) -> Self {
        match self {
            MemoryTier::High => MemoryTier::Medium,
            MemoryTier::Medium | MemoryTier::Low => MemoryTier::Low,
        }
    }
}

/// Snapshot of the host's rendering capability, computed once per mount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub is_mobile: bool,
    pub is_low_end: bool,
    pub supports_accelerated_graphics: bool,
    pub memory_tier: MemoryTier,
}

impl DeviceProfile {
    /// Classify an environment snapshot
    pub fn detect(env: &Environment) -> Self {
        let is_mobile = is_mobile_user_agent(&env.user_agent);

        let low_memory = matches!(env.device_memory_gb, Some(gb) if gb > 0.0 && gb <= 2.0);
        let cores = env.hardware_concurrency.unwrap_or(DEFAULT_CORE_COUNT);
        let mut memory_tier = MemoryTier::from_hint(env.device_memory_gb);

        let mut is_low_end = low_memory || cores <= 2 || env.prefers_reduced_motion;

        // Mobile is always treated as low end for the accelerated path
        if is_mobile {
            is_low_end = true;
            memory_tier = memory_tier.mobile_adjusted();
        }

        Self {
            is_mobile,
            is_low_end,
            supports_accelerated_graphics: env.accelerated_graphics,
            memory_tier,
        }
    }

    pub fn quality_preset(&self) -> QualityPreset {
        if self.memory_tier == MemoryTier::High && !self.is_mobile {
            QualityPreset::High
        } else if self.memory_tier == MemoryTier::Low || self.is_mobile {
            QualityPreset::Low
        } else {
            QualityPreset::Medium
        }
    }

    /// Tuning for the accelerated tier on this device
    pub fn tier_settings(&self) -> TierSettings {
        self.quality_preset().settings()
    }

    /// Whether the SVG fallback should run its pulse animation
    pub fn animate_fallback(&self) -> bool {
        !self.is_low_end
    }
}

pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    MOBILE_MARKERS.iter().any(|marker| ua.contains(marker))
}
