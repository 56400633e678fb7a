//! Strategy factory for the browser

use std::rc::Rc;

use leptos::prelude::*;
use web_sys::HtmlElement;

use super::webgl::OptimizedStrategy;
use crate::core::backdrop::{
    BackdropOptions, BackdropResult, DeviceProfile, FrameScheduler, RenderStrategy, RenderTier,
    SimpleField, SimpleSettings, StrategyFactory,
};

/// Builds strategies against the mounted backdrop container.
///
/// The SVG tier is rendered declaratively: its strategy only publishes the
/// generated network into `simple_field` and clears it again on dispose.
pub struct DomStrategyFactory {
    container: HtmlElement,
    profile: DeviceProfile,
    options: BackdropOptions,
    scheduler: Rc<dyn FrameScheduler>,
    simple_field: RwSignal<Option<SimpleField>>,
}

impl DomStrategyFactory {
    pub fn new(
        container: HtmlElement,
        profile: DeviceProfile,
        options: BackdropOptions,
        scheduler: Rc<dyn FrameScheduler>,
        simple_field: RwSignal<Option<SimpleField>>,
    ) -> Self {
        Self {
            container,
            profile,
            options,
            scheduler,
            simple_field,
        }
    }
}

impl StrategyFactory for DomStrategyFactory {
    fn create(&mut self, tier: RenderTier) -> BackdropResult<Box<dyn RenderStrategy>> {
        match tier {
            RenderTier::Optimized => {
                let settings = self.options.resolve_settings(self.profile.quality_preset());
                let strategy =
                    OptimizedStrategy::mount(&self.container, settings, self.scheduler.clone())?;
                Ok(Box::new(strategy))
            }
            RenderTier::Simple => {
                let field = SimpleField::generate(
                    &SimpleSettings::default(),
                    self.profile.animate_fallback(),
                    &mut rand::thread_rng(),
                );
                let _ = self.simple_field.try_set(Some(field));
                Ok(Box::new(SimpleStrategy {
                    field: Some(self.simple_field),
                }))
            }
            RenderTier::None => Ok(Box::new(StaticStrategy)),
        }
    }
}

struct SimpleStrategy {
    field: Option<RwSignal<Option<SimpleField>>>,
}

impl RenderStrategy for SimpleStrategy {
    fn tier(&self) -> RenderTier {
        RenderTier::Simple
    }

    fn dispose(&mut self) {
        if let Some(field) = self.field.take() {
            let _ = field.try_set(None);
        }
    }
}

/// Gradient only; the layer paints it regardless of tier
struct StaticStrategy;

impl RenderStrategy for StaticStrategy {
    fn tier(&self) -> RenderTier {
        RenderTier::None
    }

    fn dispose(&mut self) {}
}
