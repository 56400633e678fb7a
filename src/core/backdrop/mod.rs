//! Adaptive particle backdrop
//!
//! Everything here is host-independent:
//! - Capability detection ([`DeviceProfile`]) and initial tier selection
//! - Tier presets and caps ([`TierSettings`], [`SimpleSettings`])
//! - Particle simulation for the accelerated tier ([`ParticleField`])
//! - Network layout for the SVG fallback ([`SimpleField`])
//! - Frame loop, frame limiting and frame-rate driven demotion
//! - The single-strategy [`BackgroundRenderer`] and the [`AdaptiveBackdrop`] on top
//!
//! Browser bindings (drawing context, `requestAnimationFrame`, DOM) live in
//! `crate::ui::backdrop` and plug in through [`StrategyFactory`] and
//! [`FrameScheduler`].

mod adaptive;
mod capability;
mod error;
mod frame_loop;
mod frame_rate;
mod particles;
mod projection;
mod renderer;
mod settings;
mod simple;
mod tier;

pub use adaptive::AdaptiveBackdrop;
pub use capability::{DeviceProfile, Environment, MemoryTier, is_mobile_user_agent};
pub use error::{BackdropError, BackdropResult};
pub use frame_loop::{AnimationLoop, FrameCallback, FrameHandle, FrameScheduler};
pub use frame_rate::{
    DemotionPolicy, FrameLimiter, FrameRateSample, FrameRateSampler, QualityMonitor,
};
pub use glam::{Mat4, Vec3};
pub use particles::{Connection, Particle, ParticleField, PointerPosition, link_neighbors};
pub use projection::{Camera, backing_size};
pub use renderer::{
    BackgroundRenderer, RenderStrategy, SharedRenderer, StrategyFactory, TransitionOutcome,
    request_tier,
};
pub use settings::{
    BackdropOptions, MAX_CONNECTIONS, MAX_PARTICLES, MAX_SIMPLE_PARTICLES, OPTIONS_ATTRIBUTE, QualityPreset,
    SimpleSettings, TierSettings,
};
pub use simple::{SimpleConnection, SimpleField, SimpleParticle};
pub use tier::{ForceMode, RenderTier, select_initial_tier};

#[cfg(test)]
pub(crate) mod testing {
    pub(crate) use super::frame_loop::manual::ManualScheduler;
    pub(crate) use super::renderer::spy::{Event, SpyFactory};
}
