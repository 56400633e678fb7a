//! `requestAnimationFrame` behind the frame-loop scheduler trait

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use crate::core::backdrop::{FrameCallback, FrameHandle, FrameScheduler};

pub struct RafScheduler;

impl FrameScheduler for RafScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Option<FrameHandle> {
        let window = web_sys::window()?;
        // Freed by wasm-bindgen when the browser invokes it
        let closure = Closure::once_into_js(move |now: f64| callback(now));
        window
            .request_animation_frame(closure.unchecked_ref())
            .ok()
            .map(FrameHandle)
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(handle.0);
        }
    }
}

/// Milliseconds on the same clock `requestAnimationFrame` reports
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or(0.0)
}
