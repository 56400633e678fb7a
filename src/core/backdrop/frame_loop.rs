//! Self-rescheduling frame loop with synchronous cancellation
//!
//! Each tick schedules the next one through a [`FrameScheduler`]. The loop
//! keeps a liveness flag and the handle of the pending callback; cancelling
//! clears the flag and cancels the handle, so a callback that was already
//! queued becomes a no-op instead of touching freed state.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Opaque id of a scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Host frame scheduler (`requestAnimationFrame` in the browser)
pub trait FrameScheduler {
    /// Queue `callback` for the next frame. Returns `None` if the host
    /// refused, which ends the loop.
    fn request_frame(&self, callback: FrameCallback) -> Option<FrameHandle>;

    fn cancel_frame(&self, handle: FrameHandle);
}

struct LoopState {
    alive: Cell<bool>,
    pending: Cell<Option<FrameHandle>>,
    ticks: Cell<u64>,
    tick: RefCell<Box<dyn FnMut(f64)>>,
    scheduler: Rc<dyn FrameScheduler>,
}

/// Owner of a running frame loop; dropping it cancels the loop
pub struct AnimationLoop {
    state: Rc<LoopState>,
}

impl AnimationLoop {
    /// Start calling `tick` once per host frame
    pub fn start(scheduler: Rc<dyn FrameScheduler>, tick: impl FnMut(f64) + 'static) -> Self {
        let state = Rc::new(LoopState {
            alive: Cell::new(true),
            pending: Cell::new(None),
            ticks: Cell::new(0),
            tick: RefCell::new(Box::new(tick)),
            scheduler,
        });
        schedule_next(&state);
        Self { state }
    }

    /// Stop the loop. Idempotent; no tick runs after this returns.
    pub fn cancel(&self) {
        self.state.alive.set(false);
        if let Some(handle) = self.state.pending.take() {
            self.state.scheduler.cancel_frame(handle);
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.alive.get()
    }

    /// Number of ticks executed so far
    pub fn ticks(&self) -> u64 {
        self.state.ticks.get()
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn schedule_next(state: &Rc<LoopState>) {
    let weak: Weak<LoopState> = Rc::downgrade(state);
    let handle = state.scheduler.request_frame(Box::new(move |now| {
        let Some(state) = weak.upgrade() else {
            return;
        };
        if !state.alive.get() {
            return;
        }
        state.pending.set(None);
        state.ticks.set(state.ticks.get() + 1);
        {
            let mut tick = state.tick.borrow_mut();
            (*tick)(now);
        }
        if state.alive.get() {
            schedule_next(&state);
        }
    }));

    match handle {
        Some(handle) => state.pending.set(Some(handle)),
        None => state.alive.set(false),
    }
}

/// Scheduler driven by hand, for tests
#[cfg(test)]
pub(crate) mod manual {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Default)]
    pub struct ManualScheduler {
        next_id: Cell<i32>,
        queue: RefCell<VecDeque<(FrameHandle, FrameCallback)>>,
        cancelled: Cell<u32>,
    }

    impl ManualScheduler {
        pub fn new() -> Rc<Self> {
            Rc::new(Self::default())
        }

        /// Run every callback queued before this call with timestamp `now`
        pub fn fire(&self, now: f64) -> usize {
            let batch: Vec<_> = self.queue.borrow_mut().drain(..).collect();
            let count = batch.len();
            for (_, callback) in batch {
                callback(now);
            }
            count
        }

        /// Fire frames every `step_ms` from after `from` up to `until`
        pub fn run(&self, from: f64, until: f64, step_ms: f64) -> f64 {
            let mut now = from;
            while now + step_ms <= until + 1e-9 {
                now += step_ms;
                self.fire(now);
            }
            now
        }

        pub fn pending(&self) -> usize {
            self.queue.borrow().len()
        }

        pub fn cancelled(&self) -> u32 {
            self.cancelled.get()
        }
    }

    impl FrameScheduler for ManualScheduler {
        fn request_frame(&self, callback: FrameCallback) -> Option<FrameHandle> {
            let handle = FrameHandle(self.next_id.get());
            self.next_id.set(self.next_id.get() + 1);
            self.queue.borrow_mut().push_back((handle, callback));
            Some(handle)
        }

        fn cancel_frame(&self, handle: FrameHandle) {
            let mut queue = self.queue.borrow_mut();
            let before = queue.len();
            queue.retain(|(queued, _)| *queued != handle);
            if queue.len() != before {
                self.cancelled.set(self.cancelled.get() + 1);
            }
        }
    }

    /// Scheduler that always refuses
    pub struct RefusingScheduler;

    impl FrameScheduler for RefusingScheduler {
        fn request_frame(&self, _callback: FrameCallback) -> Option<FrameHandle> {
            None
        }

        fn cancel_frame(&self, _handle: FrameHandle) {}
    }
}
