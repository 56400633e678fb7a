//! Adaptive backdrop: initial tier selection plus runtime demotion
//!
//! Mounting picks a tier from the device profile and forced mode, then (when
//! performance mode is on) runs a separate frame loop that counts host frames
//! and asks the renderer to step down whenever a window measures too slow.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::capability::DeviceProfile;
use super::frame_loop::{AnimationLoop, FrameScheduler};
use super::frame_rate::QualityMonitor;
use super::renderer::{BackgroundRenderer, SharedRenderer, StrategyFactory, TransitionOutcome, request_tier};
use super::settings::BackdropOptions;
use super::tier::{RenderTier, select_initial_tier};

/// Mounted backdrop; dropping it tears everything down
pub struct AdaptiveBackdrop<F: StrategyFactory + 'static> {
    renderer: SharedRenderer<F>,
    monitor: Option<AnimationLoop>,
    alive: Rc<Cell<bool>>,
    profile: DeviceProfile,
}

impl<F: StrategyFactory + 'static> AdaptiveBackdrop<F> {
    /// Select and mount the initial tier, then start the quality monitor.
    ///
    /// `on_transition` sees the initial mount and every later demotion.
    pub fn mount(
        factory: F,
        profile: DeviceProfile,
        options: &BackdropOptions,
        scheduler: Rc<dyn FrameScheduler>,
        now: f64,
        on_transition: impl Fn(&TransitionOutcome) + 'static,
    ) -> Self {
        let renderer: SharedRenderer<F> = Rc::new(RefCell::new(BackgroundRenderer::new(factory)));
        let initial = select_initial_tier(&profile, options.force_mode);
        let outcome = request_tier(&renderer, initial);
        on_transition(&outcome);

        let alive = Rc::new(Cell::new(true));
        let active = outcome.active_tier().unwrap_or(RenderTier::None);

        // Nothing cheaper than the static tier to fall back to
        let monitor = (options.enable_performance_mode && active != RenderTier::None).then(|| {
            let mut quality = QualityMonitor::default();
            quality.start(now);
            let renderer = Rc::downgrade(&renderer);
            let alive = alive.clone();

            AnimationLoop::start(scheduler, move |now| {
                if !alive.get() {
                    return;
                }
                let Some(renderer) = renderer.upgrade() else {
                    return;
                };
                let current = match renderer.try_borrow() {
                    Ok(renderer) => renderer.tier(),
                    Err(_) => return,
                };
                let Some(current) = current else {
                    return;
                };
                if let Some(next) = quality.on_frame(now, current) {
                    let outcome = request_tier(&renderer, next);
                    if !alive.get() {
                        // Torn down from inside the transition, while the
                        // renderer was still borrowed
                        dispose_renderer(&renderer);
                        return;
                    }
                    on_transition(&outcome);
                }
            })
        });

        Self {
            renderer,
            monitor,
            alive,
            profile,
        }
    }

    pub fn tier(&self) -> Option<RenderTier> {
        self.renderer.try_borrow().ok().and_then(|renderer| renderer.tier())
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitor.as_ref().is_some_and(AnimationLoop::is_running)
    }

    pub fn is_torn_down(&self) -> bool {
        !self.alive.get()
    }

    /// Stop monitoring and dispose the active strategy. Idempotent.
    pub fn teardown(&mut self) {
        self.alive.set(false);
        if let Some(monitor) = self.monitor.take() {
            monitor.cancel();
        }
        // A running transition holds the borrow; the monitor tick that owns
        // it disposes once it returns, and drop retries as a last resort
        dispose_renderer(&self.renderer);
    }
}

fn dispose_renderer<F: StrategyFactory>(renderer: &SharedRenderer<F>) {
    if let Ok(mut renderer) = renderer.try_borrow_mut() {
        renderer.dispose();
    }
}

impl<F: StrategyFactory + 'static> Drop for AdaptiveBackdrop<F> {
    fn drop(&mut self) {
        self.teardown();
    }
}
