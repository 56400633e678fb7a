//! Neural backdrop components
//!
//! Provides:
//! - `BackgroundLayer`: fixed, pointer-transparent layer shared by every page
//! - `NeuralBackground`: gradient plus whichever tier is currently mounted
//! - `SimpleNetwork`: SVG network drawn by the fallback tier
//!
//! Layout and animation classes live in `style/main.css`.
//!
//! The server and the first client render only paint the gradient. After
//! hydration an effect probes the browser and hands the container to a
//! `BackdropRuntime`, which owns the adaptive renderer until cleanup.

use leptos::html;
use leptos::prelude::*;

use crate::core::backdrop::{BackdropOptions, RenderTier, SimpleField};

#[cfg(feature = "hydrate")]
mod probe;
#[cfg(feature = "hydrate")]
mod runtime;
#[cfg(feature = "hydrate")]
mod scheduler;
#[cfg(feature = "hydrate")]
mod strategies;
#[cfg(feature = "hydrate")]
mod webgl;

#[cfg(feature = "hydrate")]
pub use probe::read_document_options;

const LINK_STROKE: &str = "rgba(147, 51, 234, 0.15)";
const NODE_FILL: &str = "rgba(147, 51, 234, 0.6)";

/// Fixed layer behind the page content
#[component]
pub fn BackgroundLayer(options: BackdropOptions) -> impl IntoView {
    view! {
        <div class="backdrop-layer" aria-hidden="true">
            <NeuralBackground options=options />
        </div>
    }
}

/// Adaptive animated background
#[component]
pub fn NeuralBackground(options: BackdropOptions) -> impl IntoView {
    // `None` until the client has mounted a tier
    let tier = RwSignal::new(None::<RenderTier>);
    let simple_field = RwSignal::new(None::<SimpleField>);
    let container = NodeRef::<html::Div>::new();

    #[cfg(feature = "hydrate")]
    {
        use runtime::BackdropRuntime;

        let runtime = StoredValue::new_local(None::<BackdropRuntime>);

        Effect::new(move |_| {
            let Some(element) = container.get() else {
                return;
            };
            if runtime.with_value(Option::is_some) {
                return;
            }
            let mounted = BackdropRuntime::mount(element.into(), options, tier, simple_field);
            runtime.set_value(Some(mounted));
        });

        on_cleanup(move || {
            runtime.try_update_value(|runtime| {
                if let Some(mut runtime) = runtime.take() {
                    runtime.teardown();
                }
            });
        });
    }

    #[cfg(not(feature = "hydrate"))]
    let _ = options;

    view! {
        <div
            class="backdrop"
            data-tier=move || tier.get().map_or("pending", |tier| tier.as_str())
        >
            <div class="backdrop-gradient"></div>
            <div class="backdrop-canvas" node_ref=container></div>
            {move || simple_field.get().map(|field| view! { <SimpleNetwork field=field /> })}
        </div>
    }
}

fn percent(value: f32) -> String {
    format!("{value:.2}%")
}

/// SVG network for the fallback tier. Positions are percentages, so the
/// layout follows the viewport without any resize handling.
#[component]
pub fn SimpleNetwork(field: SimpleField) -> impl IntoView {
    let pulse = if field.animate { "backdrop-pulse" } else { "" };

    let links = field
        .connections
        .into_iter()
        .enumerate()
        .map(|(index, link)| {
            view! {
                <line
                    x1=percent(link.x1)
                    y1=percent(link.y1)
                    x2=percent(link.x2)
                    y2=percent(link.y2)
                    stroke=LINK_STROKE
                    stroke-width="0.5"
                    class=pulse
                    style=format!("animation-delay: {:.1}s; animation-duration: 4s", index as f32 * 0.1)
                />
            }
        })
        .collect_view();

    let nodes = field
        .particles
        .into_iter()
        .map(|node| {
            view! {
                <circle
                    cx=percent(node.x)
                    cy=percent(node.y)
                    r=format!("{:.2}", node.size)
                    fill=NODE_FILL
                    class=pulse
                    style=format!("animation-delay: {:.2}s; animation-duration: 3s", node.delay_s)
                />
            }
        })
        .collect_view();

    view! {
        <svg class="backdrop-network">
            {links}
            {nodes}
        </svg>
        <div class="backdrop-glow"></div>
    }
}
