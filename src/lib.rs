//! Fude Development - marketing site
//!
//! A Leptos application whose pages sit on top of an adaptive, animated
//! particle backdrop that picks its rendering tier from the device and steps
//! down when the frame rate drops.

#![recursion_limit = "4096"]

pub mod app;
pub mod core;
pub mod ui;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::*;
    use leptos::prelude::*;

    console_error_panic_hook::set_once();

    let backdrop = crate::ui::backdrop::read_document_options();
    leptos::mount::hydrate_body(move || {
        provide_context(backdrop);
        view! { <App/> }
    });
}
