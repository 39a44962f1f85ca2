use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

use crate::domain::a001_upload_session::ui::UploadPage;
use crate::domain::a002_chat_thread::ui::ChatPage;
use crate::system::auth::guard::RequireAuth;
use crate::system::pages::signin::SignInPage;

#[component]
pub fn AppRoutes() -> impl IntoView {
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="page-loading">"Page not found."</div> }>
                <Route
                    path=path!("/")
                    view=|| view! { <RequireAuth><UploadPage /></RequireAuth> }
                />
                <Route
                    path=path!("/chat")
                    view=|| view! { <RequireAuth><ChatPage /></RequireAuth> }
                />
                <Route path=path!("/signin") view=SignInPage />
            </Routes>
        </Router>
    }
}
