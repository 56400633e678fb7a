//! Render tiers and the force-mode override

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::capability::{DeviceProfile, MemoryTier};
use super::error::BackdropError;

/// Discrete quality level of the background renderer, cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderTier {
    /// Static gradient, no animation
    None,
    /// Declarative SVG network with CSS pulse
    Simple,
    /// Accelerated particle field with a frame loop
    Optimized,
}

impl RenderTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderTier::None => "none",
            RenderTier::Simple => "simple",
            RenderTier::Optimized => "optimized",
        }
    }

    /// Next cheaper tier, or `None` when already at the floor
    pub fn cheaper(&self) -> Option<RenderTier> {
        match self {
            RenderTier::Optimized => Some(RenderTier::Simple),
            RenderTier::Simple => Some(RenderTier::None),
            RenderTier::None => None,
        }
    }

    /// Hard upper bound on particles for this tier
    pub fn particle_cap(&self) -> usize {
        match self {
            RenderTier::Optimized => super::settings::MAX_PARTICLES,
            RenderTier::Simple => super::settings::MAX_SIMPLE_PARTICLES,
            RenderTier::None => 0,
        }
    }
}

impl fmt::Display for RenderTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Override for automatic tier selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForceMode {
    #[default]
    Auto,
    Optimized,
    Simple,
    None,
}

impl ForceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForceMode::Auto => "auto",
            ForceMode::Optimized => "optimized",
            ForceMode::Simple => "simple",
            ForceMode::None => "none",
        }
    }

    /// The forced tier, or `None` for automatic selection
    pub fn forced_tier(&self) -> Option<RenderTier> {
        match self {
            ForceMode::Auto => None,
            ForceMode::Optimized => Some(RenderTier::Optimized),
            ForceMode::Simple => Some(RenderTier::Simple),
            ForceMode::None => Some(RenderTier::None),
        }
    }
}

impl FromStr for ForceMode {
    type Err = BackdropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ForceMode::Auto),
            "optimized" => Ok(ForceMode::Optimized),
            "simple" => Ok(ForceMode::Simple),
            "none" => Ok(ForceMode::None),
            _ => Err(BackdropError::InvalidForceMode(s.to_string())),
        }
    }
}

impl fmt::Display for ForceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the tier to mount first.
///
/// A forced mode always wins. Otherwise only a capable, high-memory desktop
/// gets the accelerated field; everything else starts on the SVG fallback.
pub fn select_initial_tier(profile: &DeviceProfile, force_mode: ForceMode) -> RenderTier {
    if let Some(tier) = force_mode.forced_tier() {
        return tier;
    }

    if !profile.supports_accelerated_graphics || profile.is_low_end {
        RenderTier::Simple
    } else if profile.memory_tier == MemoryTier::High && !profile.is_mobile {
        RenderTier::Optimized
    } else {
        RenderTier::Simple
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desktop(memory_tier: MemoryTier) -> DeviceProfile {
        DeviceProfile {
            is_mobile: false,
            is_low_end: false,
            supports_accelerated_graphics: true,
            memory_tier,
        }
    }

    #[test]
    fn test_force_mode_parsing() {
        assert_eq!("auto".parse::<ForceMode>(), Ok(ForceMode::Auto));
        assert_eq!("Optimized".parse::<ForceMode>(), Ok(ForceMode::Optimized));
        assert_eq!(" simple ".parse::<ForceMode>(), Ok(ForceMode::Simple));
        assert_eq!("NONE".parse::<ForceMode>(), Ok(ForceMode::None));
        assert_eq!(
            "fancy".parse::<ForceMode>(),
            Err(BackdropError::InvalidForceMode("fancy".to_string()))
        );
    }

    #[test]
    fn test_high_memory_desktop_gets_optimized() {
        assert_eq!(
            select_initial_tier(&desktop(MemoryTier::High), ForceMode::Auto),
            RenderTier::Optimized
        );
    }

    #[test]
    fn test_medium_memory_desktop_gets_simple() {
        assert_eq!(
            select_initial_tier(&desktop(MemoryTier::Medium), ForceMode::Auto),
            RenderTier::Simple
        );
    }

    #[test]
    fn test_no_acceleration_never_optimized() {
        for memory_tier in [MemoryTier::Low, MemoryTier::Medium, MemoryTier::High] {
            for is_mobile in [false, true] {
                for is_low_end in [false, true] {
                    let profile = DeviceProfile {
                        is_mobile,
                        is_low_end,
                        supports_accelerated_graphics: false,
                        memory_tier,
                    };
                    assert_ne!(
                        select_initial_tier(&profile, ForceMode::Auto),
                        RenderTier::Optimized
                    );
                }
            }
        }
    }

    #[test]
    fn test_low_end_never_optimized() {
        for memory_tier in [MemoryTier::Low, MemoryTier::Medium, MemoryTier::High] {
            let profile = DeviceProfile {
                is_low_end: true,
                ..desktop(memory_tier)
            };
            assert_ne!(
                select_initial_tier(&profile, ForceMode::Auto),
                RenderTier::Optimized
            );
        }
    }

    #[test]
    fn test_force_mode_overrides_profile() {
        let weak = DeviceProfile {
            is_mobile: true,
            is_low_end: true,
            supports_accelerated_graphics: false,
            memory_tier: MemoryTier::Low,
        };
        let strong = desktop(MemoryTier::High);

        for profile in [weak, strong] {
            assert_eq!(
                select_initial_tier(&profile, ForceMode::Optimized),
                RenderTier::Optimized
            );
            assert_eq!(
                select_initial_tier(&profile, ForceMode::Simple),
                RenderTier::Simple
            );
            assert_eq!(
                select_initial_tier(&profile, ForceMode::None),
                RenderTier::None
            );
        }
    }

    #[test]
    fn test_cheaper_chain_ends_at_none() {
        assert_eq!(RenderTier::Optimized.cheaper(), Some(RenderTier::Simple));
        assert_eq!(RenderTier::Simple.cheaper(), Some(RenderTier::None));
        assert_eq!(RenderTier::None.cheaper(), None);
        assert!(RenderTier::None < RenderTier::Simple);
        assert!(RenderTier::Simple < RenderTier::Optimized);
    }
}
