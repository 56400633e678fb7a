//! Background renderer: single active strategy plus tier transitions
//!
//! The renderer owns at most one [`RenderStrategy`]. A transition always
//! disposes the old strategy before the factory builds the new one, and a
//! strategy that fails to build is treated as a missing capability: the
//! renderer walks down to the next cheaper tier until something mounts.

use std::cell::RefCell;
use std::rc::Rc;

use super::error::{BackdropError, BackdropResult};
use super::tier::RenderTier;

/// A mounted rendering strategy and the resources it owns
pub trait RenderStrategy {
    fn tier(&self) -> RenderTier;

    /// Release every resource (buffers, contexts, listeners, frame loops).
    /// Must tolerate being called more than once.
    fn dispose(&mut self);
}

/// Builds strategies on demand
pub trait StrategyFactory {
    fn create(&mut self, tier: RenderTier) -> BackdropResult<Box<dyn RenderStrategy>>;
}

/// Result of a [`BackgroundRenderer::set_tier`] call
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// Requested tier was already active; nothing was disposed or built
    Unchanged(RenderTier),
    /// The previous strategy was disposed and a new one mounted
    Switched {
        from: Option<RenderTier>,
        requested: RenderTier,
        active: RenderTier,
        /// Tiers that failed to build on the way down, in order
        failures: Vec<(RenderTier, BackdropError)>,
    },
    /// The shared renderer was mid-transition; the request was dropped
    Busy,
    /// The renderer was already torn down
    Disposed,
}

impl TransitionOutcome {
    /// Tier active after the call, when known
    pub fn active_tier(&self) -> Option<RenderTier> {
        match self {
            TransitionOutcome::Unchanged(tier) => Some(*tier),
            TransitionOutcome::Switched { active, .. } => Some(*active),
            TransitionOutcome::Busy | TransitionOutcome::Disposed => None,
        }
    }

    /// Whether the mounted tier is cheaper than the one asked for
    pub fn degraded(&self) -> bool {
        matches!(self, TransitionOutcome::Switched { requested, active, .. } if active != requested)
    }
}

/// Owner of the single active strategy
pub struct BackgroundRenderer<F> {
    factory: F,
    active: Option<Box<dyn RenderStrategy>>,
    tier: Option<RenderTier>,
    disposed: bool,
}

impl<F: StrategyFactory> BackgroundRenderer<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            active: None,
            tier: None,
            disposed: false,
        }
    }

    /// Active tier, or `None` before the first transition
    pub fn tier(&self) -> Option<RenderTier> {
        self.tier
    }

    pub fn has_strategy(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Move to `requested`, disposing the current strategy first.
    ///
    /// Requesting the active tier is a no-op. Construction failures walk
    /// down through cheaper tiers; if even the static tier fails the
    /// renderer settles on `None` without a strategy.
    pub fn set_tier(&mut self, requested: RenderTier) -> TransitionOutcome {
        if self.disposed {
            return TransitionOutcome::Disposed;
        }
        if self.tier == Some(requested) {
            return TransitionOutcome::Unchanged(requested);
        }

        let from = self.tier;
        self.release_active();

        let mut failures = Vec::new();
        let mut candidate = Some(requested);
        let mut active = RenderTier::None;

        while let Some(tier) = candidate {
            match self.factory.create(tier) {
                Ok(strategy) => {
                    self.active = Some(strategy);
                    active = tier;
                    break;
                }
                Err(err) => {
                    failures.push((tier, err));
                    candidate = tier.cheaper();
                }
            }
        }

        self.tier = Some(active);

        TransitionOutcome::Switched {
            from,
            requested,
            active,
            failures,
        }
    }

    /// Tear down the active strategy; later transitions are refused
    pub fn dispose(&mut self) {
        self.release_active();
        self.disposed = true;
    }
}

impl<F> BackgroundRenderer<F> {
    fn release_active(&mut self) {
        if let Some(mut strategy) = self.active.take() {
            strategy.dispose();
        }
    }
}

impl<F> Drop for BackgroundRenderer<F> {
    fn drop(&mut self) {
        self.release_active();
    }
}

pub type SharedRenderer<F> = Rc<RefCell<BackgroundRenderer<F>>>;

/// Request a transition on a shared renderer.
///
/// `set_tier` holds the mutable borrow for the whole transition, so a
/// request that arrives from inside one (a factory or strategy calling back)
/// is reported as busy instead of panicking.
pub fn request_tier<F: StrategyFactory>(
    renderer: &SharedRenderer<F>,
    tier: RenderTier,
) -> TransitionOutcome {
    match renderer.try_borrow_mut() {
        Ok(mut renderer) => renderer.set_tier(tier),
        Err(_) => TransitionOutcome::Busy,
    }
}

#[cfg(test)]
pub(crate) mod spy {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Event {
        Created(RenderTier),
        Disposed(RenderTier),
    }

    pub type EventLog = Rc<RefCell<Vec<Event>>>;

    pub struct SpyStrategy {
        tier: RenderTier,
        log: EventLog,
        disposed: bool,
    }

    impl RenderStrategy for SpyStrategy {
        fn tier(&self) -> RenderTier {
            self.tier
        }

        fn dispose(&mut self) {
            if self.disposed {
                return;
            }
            self.disposed = true;
            self.log.borrow_mut().push(Event::Disposed(self.tier));
        }
    }

    /// Factory that records every build and can be told to fail some tiers
    #[derive(Default)]
    pub struct SpyFactory {
        pub log: EventLog,
        pub failing: Vec<RenderTier>,
    }

    impl SpyFactory {
        pub fn failing(tiers: &[RenderTier]) -> Self {
            Self {
                log: EventLog::default(),
                failing: tiers.to_vec(),
            }
        }

        pub fn events(&self) -> Vec<Event> {
            self.log.borrow().clone()
        }
    }

    impl StrategyFactory for SpyFactory {
        fn create(&mut self, tier: RenderTier) -> BackdropResult<Box<dyn RenderStrategy>> {
            if self.failing.contains(&tier) {
                return Err(BackdropError::ContextUnavailable);
            }
            self.log.borrow_mut().push(Event::Created(tier));
            Ok(Box::new(SpyStrategy {
                tier,
                log: self.log.clone(),
                disposed: false,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::spy::{Event, SpyFactory};
    use super::*;
    use std::rc::Weak;

    #[test]
    fn test_first_transition_builds_strategy() {
        let mut renderer = BackgroundRenderer::new(SpyFactory::default());
        assert_eq!(renderer.tier(), None);

        let outcome = renderer.set_tier(RenderTier::Optimized);
        assert_eq!(
            outcome,
            TransitionOutcome::Switched {
                from: None,
                requested: RenderTier::Optimized,
                active: RenderTier::Optimized,
                failures: vec![],
            }
        );
        assert_eq!(renderer.tier(), Some(RenderTier::Optimized));
        assert_eq!(renderer.factory().events(), vec![Event::Created(RenderTier::Optimized)]);
    }

    #[test]
    fn test_same_tier_is_noop() {
        let mut renderer = BackgroundRenderer::new(SpyFactory::default());
        renderer.set_tier(RenderTier::Simple);

        let outcome = renderer.set_tier(RenderTier::Simple);
        assert_eq!(outcome, TransitionOutcome::Unchanged(RenderTier::Simple));
        assert_eq!(renderer.factory().events(), vec![Event::Created(RenderTier::Simple)]);
    }

    #[test]
    fn test_switch_disposes_before_building() {
        let mut renderer = BackgroundRenderer::new(SpyFactory::default());
        renderer.set_tier(RenderTier::Optimized);
        renderer.set_tier(RenderTier::Simple);

        assert_eq!(
            renderer.factory().events(),
            vec![
                Event::Created(RenderTier::Optimized),
                Event::Disposed(RenderTier::Optimized),
                Event::Created(RenderTier::Simple),
            ]
        );
    }

    #[test]
    fn test_failed_build_falls_back() {
        let mut renderer =
            BackgroundRenderer::new(SpyFactory::failing(&[RenderTier::Optimized]));
        let outcome = renderer.set_tier(RenderTier::Optimized);

        assert!(outcome.degraded());
        assert_eq!(outcome.active_tier(), Some(RenderTier::Simple));
        assert_eq!(renderer.tier(), Some(RenderTier::Simple));
        match outcome {
            TransitionOutcome::Switched { failures, .. } => {
                assert_eq!(failures, vec![(RenderTier::Optimized, BackdropError::ContextUnavailable)]);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_everything_failing_settles_on_none() {
        let mut renderer = BackgroundRenderer::new(SpyFactory::failing(&[
            RenderTier::Optimized,
            RenderTier::Simple,
            RenderTier::None,
        ]));
        let outcome = renderer.set_tier(RenderTier::Optimized);

        assert_eq!(outcome.active_tier(), Some(RenderTier::None));
        assert!(!renderer.has_strategy());
        assert!(renderer.factory().events().is_empty());
    }

    #[test]
    fn test_dispose_is_final_and_idempotent() {
        let mut renderer = BackgroundRenderer::new(SpyFactory::default());
        renderer.set_tier(RenderTier::Optimized);

        renderer.dispose();
        renderer.dispose();
        assert!(renderer.is_disposed());
        assert_eq!(renderer.set_tier(RenderTier::Simple), TransitionOutcome::Disposed);
        assert_eq!(
            renderer.factory().events(),
            vec![
                Event::Created(RenderTier::Optimized),
                Event::Disposed(RenderTier::Optimized),
            ]
        );
    }

    #[test]
    fn test_drop_disposes_active_strategy() {
        let factory = SpyFactory::default();
        let log = factory.log.clone();
        {
            let mut renderer = BackgroundRenderer::new(factory);
            renderer.set_tier(RenderTier::Simple);
        }
        assert_eq!(
            *log.borrow(),
            vec![Event::Created(RenderTier::Simple), Event::Disposed(RenderTier::Simple)]
        );
    }

    #[test]
    fn test_request_while_borrowed_is_busy() {
        let shared: SharedRenderer<SpyFactory> =
            Rc::new(RefCell::new(BackgroundRenderer::new(SpyFactory::default())));
        assert_eq!(
            request_tier(&shared, RenderTier::Simple).active_tier(),
            Some(RenderTier::Simple)
        );

        let _held = shared.borrow_mut();
        assert_eq!(request_tier(&shared, RenderTier::None), TransitionOutcome::Busy);
    }

    struct Quiet(RenderTier);

    impl RenderStrategy for Quiet {
        fn tier(&self) -> RenderTier {
            self.0
        }

        fn dispose(&mut self) {}
    }

    /// Calls back into its own renderer while building
    struct ReentrantFactory {
        renderer: Weak<RefCell<BackgroundRenderer<ReentrantFactory>>>,
        seen: Rc<RefCell<Vec<TransitionOutcome>>>,
    }

    impl StrategyFactory for ReentrantFactory {
        fn create(&mut self, tier: RenderTier) -> BackdropResult<Box<dyn RenderStrategy>> {
            if let Some(renderer) = self.renderer.upgrade() {
                self.seen
                    .borrow_mut()
                    .push(request_tier(&renderer, RenderTier::None));
            }
            Ok(Box::new(Quiet(tier)))
        }
    }

    #[test]
    fn test_request_during_transition_is_busy() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let shared: SharedRenderer<ReentrantFactory> = Rc::new_cyclic(|weak| {
            RefCell::new(BackgroundRenderer::new(ReentrantFactory {
                renderer: weak.clone(),
                seen: seen.clone(),
            }))
        });

        let outcome = request_tier(&shared, RenderTier::Optimized);

        assert_eq!(outcome.active_tier(), Some(RenderTier::Optimized));
        assert_eq!(*seen.borrow(), vec![TransitionOutcome::Busy]);
        assert_eq!(shared.borrow().tier(), Some(RenderTier::Optimized));
    }
}
