//! Client-side lifetime of one mounted backdrop

use std::rc::Rc;

use leptos::logging::{log, warn};
use leptos::prelude::*;
use web_sys::HtmlElement;

use super::probe::probe_environment;
use super::scheduler::{RafScheduler, now_ms};
use super::strategies::DomStrategyFactory;
use crate::core::backdrop::{
    AdaptiveBackdrop, BackdropOptions, DeviceProfile, FrameScheduler, RenderTier, SimpleField,
    TransitionOutcome,
};

pub struct BackdropRuntime {
    backdrop: AdaptiveBackdrop<DomStrategyFactory>,
}

impl BackdropRuntime {
    /// Probe the browser once, mount the initial tier into `container` and
    /// start the quality monitor
    pub fn mount(
        container: HtmlElement,
        options: BackdropOptions,
        tier: RwSignal<Option<RenderTier>>,
        simple_field: RwSignal<Option<SimpleField>>,
    ) -> Self {
        let profile = DeviceProfile::detect(&probe_environment());
        log!("[backdrop] device profile: {:?}", profile);

        let scheduler: Rc<dyn FrameScheduler> = Rc::new(RafScheduler);
        let factory =
            DomStrategyFactory::new(container, profile, options, scheduler.clone(), simple_field);

        let backdrop = AdaptiveBackdrop::mount(
            factory,
            profile,
            &options,
            scheduler,
            now_ms(),
            move |outcome| report(outcome, tier),
        );

        Self { backdrop }
    }

    pub fn teardown(&mut self) {
        self.backdrop.teardown();
    }
}

fn report(outcome: &TransitionOutcome, tier: RwSignal<Option<RenderTier>>) {
    match outcome {
        TransitionOutcome::Switched {
            from,
            requested,
            active,
            failures,
        } => {
            for (failed, err) in failures {
                warn!("[backdrop] {} tier unavailable: {}", failed, err);
            }
            match from {
                Some(from) => log!("[backdrop] {} -> {} (requested {})", from, active, requested),
                None => log!("[backdrop] mounted {} (requested {})", active, requested),
            }
            let _ = tier.try_set(Some(*active));
        }
        TransitionOutcome::Unchanged(active) => {
            let _ = tier.try_set(Some(*active));
        }
        TransitionOutcome::Busy => warn!("[backdrop] transition already running, request dropped"),
        TransitionOutcome::Disposed => {}
    }
}
