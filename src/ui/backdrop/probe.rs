//! One-shot reads of the browser environment

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlCanvasElement, WebGlRenderingContext, WebglLoseContext, Window};

use crate::core::backdrop::{BackdropOptions, Environment, OPTIONS_ATTRIBUTE};

/// Context names tried in order when probing for accelerated graphics
const CONTEXT_KINDS: [&str; 2] = ["webgl", "experimental-webgl"];

/// Snapshot everything capability detection needs. Any read that fails
/// counts as the capability being absent.
pub fn probe_environment() -> Environment {
    let Some(window) = web_sys::window() else {
        return Environment::default();
    };
    let navigator = window.navigator();

    let hardware_concurrency = Some(navigator.hardware_concurrency())
        .filter(|cores| cores.is_finite() && *cores > 0.0)
        .map(|cores| cores as u32);

    // Not part of the typed bindings and missing outside Chromium
    let device_memory_gb = js_sys::Reflect::get(&navigator, &JsValue::from_str("deviceMemory"))
        .ok()
        .and_then(|value| value.as_f64());

    let prefers_reduced_motion = window
        .match_media("(prefers-reduced-motion: reduce)")
        .ok()
        .flatten()
        .is_some_and(|query| query.matches());

    Environment {
        user_agent: navigator.user_agent().unwrap_or_default(),
        accelerated_graphics: probe_accelerated_graphics(&window),
        hardware_concurrency,
        device_memory_gb,
        prefers_reduced_motion,
    }
}

/// Try to open a drawing context on a throwaway canvas, then release it
fn probe_accelerated_graphics(window: &Window) -> bool {
    let Some(document) = window.document() else {
        return false;
    };
    let Some(canvas) = document
        .create_element("canvas")
        .ok()
        .and_then(|element| element.dyn_into::<HtmlCanvasElement>().ok())
    else {
        return false;
    };

    match open_context(&canvas, None) {
        Some(gl) => {
            lose_context(&gl);
            true
        }
        None => false,
    }
}

/// Open the first available WebGL context on `canvas`
pub(crate) fn open_context(
    canvas: &HtmlCanvasElement,
    attributes: Option<&JsValue>,
) -> Option<WebGlRenderingContext> {
    CONTEXT_KINDS.iter().find_map(|kind| {
        let context = match attributes {
            Some(attributes) => canvas.get_context_with_context_options(kind, attributes),
            None => canvas.get_context(kind),
        };
        context
            .ok()
            .flatten()
            .and_then(|context| context.dyn_into::<WebGlRenderingContext>().ok())
    })
}

/// Ask the browser to drop the context's GPU resources now rather than at GC
pub(crate) fn lose_context(gl: &WebGlRenderingContext) {
    if let Ok(Some(extension)) = gl.get_extension("WEBGL_lose_context") {
        extension.unchecked_into::<WebglLoseContext>().lose_context();
    }
}

/// Options the server embedded into `<html>`, or the defaults
pub fn read_document_options() -> BackdropOptions {
    let raw = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.document_element())
        .and_then(|root| root.get_attribute(OPTIONS_ATTRIBUTE));

    BackdropOptions::from_json_or_default(raw.as_deref())
}
