//! Home page component
//!
//! Hero section shown on top of the animated backdrop.

use leptos::prelude::*;

const TAGLINES: [&str; 3] = [
    "Building the Future with AI",
    "Transforming Ideas into Reality",
    "Your Trusted Development Partner",
];

/// Home page component
#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <section class="hero">
            <span class="hero-badge">"AI-Powered Development"</span>

            <h1 class="hero-title">
                "Welcome to "
                <span class="hero-accent">"Fude"</span>
                <br />
                <span class="hero-accent-alt">"Developments"</span>
            </h1>

            <ul class="hero-taglines">
                {TAGLINES.iter().map(|line| view! { <li>{*line}</li> }).collect_view()}
            </ul>
        </section>
    }
}
