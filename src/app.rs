use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::StaticSegment;
use leptos_router::components::{Route, Router, Routes};

use crate::core::backdrop::BackdropOptions;
use crate::ui::{BackgroundLayer, HomePage, NotFoundPage};

/// Stylesheet cargo-leptos builds from `style/main.css`, named after the
/// bundle's `output-name`
pub const STYLESHEET_HREF: &str = "/pkg/fude-web.css";

/// Document shell. Backdrop options come from context and are embedded into
/// `<html data-backdrop>` for the hydrating client.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    let backdrop = use_context::<BackdropOptions>().unwrap_or_default();

    view! {
        <!DOCTYPE html>
        <html lang="en" data-backdrop=backdrop.to_json()>
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone() />
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    // Provides context that manages stylesheets, titles, meta tags, etc.
    provide_meta_context();

    let backdrop = use_context::<BackdropOptions>().unwrap_or_default();

    view! {
        // injects a stylesheet into the document <head>
        // id=leptos means cargo-leptos will hot-reload this stylesheet
        <Stylesheet id="leptos" href=STYLESHEET_HREF/>

        // sets the document title
        <Title text="Fude Development – AI-Powered Software Solutions"/>

        // shared across all pages, behind the content
        <BackgroundLayer options=backdrop />

        <Router>
            <main class="site-content">
                <Routes fallback=|| view! { <NotFoundPage/> }>
                    <Route path=StaticSegment("") view=HomePage/>
                </Routes>
            </main>
        </Router>
    }
}
