use contracts::system::config::AppConfig;
use leptos::prelude::*;

use crate::layout::global_context::AppGlobalContext;
use crate::routes::routes::AppRoutes;
use crate::system::auth::context::provide_auth;

#[component]
pub fn App(config: AppConfig) -> impl IntoView {
    let identity = provide_auth(&config.identity.api_key);

    // Provide the collaborators and shared page state to the whole app.
    provide_context(AppGlobalContext::new(&config, identity));

    view! {
        <AppRoutes />
    }
}
