use leptos::prelude::*;

/// Top bar with the app title on the left and page actions on the right.
#[component]
pub fn Header(children: Children) -> impl IntoView {
    view! {
        <header data-zone="header" class="header">
            <div class="header__content">
                <span class="header__title">"Pineapple"</span>
            </div>
            <div class="header__actions">{children()}</div>
        </header>
    }
}
