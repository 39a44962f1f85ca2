use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::Redirect;

use crate::layout::global_context::AppGlobalContext;
use crate::system::auth::context::use_auth;

#[component]
pub fn SignInPage() -> impl IntoView {
    let ctx = use_context::<AppGlobalContext>().expect("AppGlobalContext context not found");
    let auth_state = use_auth();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (create_account, set_create_account) = signal(false);
    let (error_message, set_error_message) = signal(Option::<String>::None);
    let (is_loading, set_is_loading) = signal(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();

        let email_val = email.get();
        let password_val = password.get();
        let create = create_account.get();
        let identity = ctx.identity.clone();

        set_is_loading.set(true);
        set_error_message.set(None);

        spawn_local(async move {
            match identity.sign_in(email_val, password_val, create).await {
                // The redirect below takes over once the session is stored.
                Ok(()) => set_is_loading.set(false),
                Err(e) => {
                    set_error_message.set(Some(e.to_string()));
                    set_is_loading.set(false);
                }
            }
        });
    };

    view! {
        <Show when=move || auth_state.with(|s| s.is_signed_in())>
            <Redirect path="/" />
        </Show>
        <div class="login-container">
            <div class="login-box">
                <h1>"Pineapple"</h1>
                <h2>
                    {move || if create_account.get() { "Create an account" } else { "Sign in" }}
                </h2>

                <Show when=move || error_message.get().is_some()>
                    <div class="error-message">
                        {move || error_message.get().unwrap_or_default()}
                    </div>
                </Show>

                <form on:submit=on_submit>
                    <div class="form-group">
                        <label for="email">"Email"</label>
                        <input
                            type="email"
                            id="email"
                            placeholder="you@example.com"
                            value=move || email.get()
                            on:input=move |ev| set_email.set(event_target_value(&ev))
                            required
                            disabled=move || is_loading.get()
                        />
                    </div>

                    <div class="form-group">
                        <label for="password">"Password"</label>
                        <input
                            type="password"
                            id="password"
                            value=move || password.get()
                            on:input=move |ev| set_password.set(event_target_value(&ev))
                            required
                            disabled=move || is_loading.get()
                        />
                    </div>

                    <button type="submit" class="btn-primary" disabled=move || is_loading.get()>
                        {move || match (is_loading.get(), create_account.get()) {
                            (true, _) => "Please wait…",
                            (false, true) => "Create account",
                            (false, false) => "Sign in",
                        }}
                    </button>
                </form>

                <button
                    type="button"
                    class="btn-link"
                    on:click=move |_| {
                        set_create_account.update(|c| *c = !*c);
                        set_error_message.set(None);
                    }
                >
                    {move || {
                        if create_account.get() {
                            "Already have an account? Sign in"
                        } else {
                            "New here? Create an account"
                        }
                    }}
                </button>
            </div>
        </div>
    }
}
