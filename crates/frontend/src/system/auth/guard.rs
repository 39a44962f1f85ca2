use leptos::prelude::*;
use leptos_router::components::Redirect;

use super::context::use_auth;

/// Component that requires authentication.
/// Redirects to the sign-in page when nobody is signed in.
#[component]
pub fn RequireAuth(children: ChildrenFn) -> impl IntoView {
    let auth_state = use_auth();

    view! {
        <Show
            when=move || auth_state.with(|s| s.is_signed_in())
            fallback=move || {
                if auth_state.with(|s| s.restoring) {
                    view! { <div class="page-loading">"Loading…"</div> }.into_any()
                } else {
                    view! { <Redirect path="/signin" /> }.into_any()
                }
            }
        >
            {children()}
        </Show>
    }
}
