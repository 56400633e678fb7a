//! Not found page component
//!
//! A 404 error page displayed when a route is not found.

use leptos::prelude::*;
use leptos_router::components::A;

/// Not found (404) page component
#[component]
pub fn NotFoundPage() -> impl IntoView {
    // Tell the server to answer with 404 instead of 200
    #[cfg(feature = "ssr")]
    {
        if let Some(response) = use_context::<leptos_axum::ResponseOptions>() {
            response.set_status(axum::http::StatusCode::NOT_FOUND);
        }
    }

    view! {
        <section class="not-found">
            // Error code
            <h1 class="not-found-code">"404"</h1>

            // Title
            <h2 class="not-found-title">"Page Not Found"</h2>

            // Description
            <p class="not-found-text">
                "The page you're looking for doesn't exist or has been moved."
            </p>

            // Actions
            <A href="/" attr:class="not-found-home">
                "Go Home"
            </A>
        </section>
    }
}
