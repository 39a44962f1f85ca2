use async_trait::async_trait;
use chrono::Utc;
use contracts::shared::api_error::ServiceError;
use contracts::system::auth::{AuthUser, IdentityProvider, StoredSession};
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::{api, storage};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub session: Option<StoredSession>,
    /// A restored session is being refreshed before first use.
    pub restoring: bool,
}

impl AuthState {
    pub fn is_signed_in(&self) -> bool {
        self.session.is_some() && !self.restoring
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Identity provider backed by the identity REST API, with the session kept
/// in a signal and mirrored to localStorage.
#[derive(Clone, Debug)]
pub struct FirebaseIdentity {
    api_key: String,
    state: RwSignal<AuthState>,
}

impl FirebaseIdentity {
    pub fn new(api_key: impl Into<String>, state: RwSignal<AuthState>) -> Self {
        let api_key = api_key.into();
        if api_key.is_empty() {
            log::warn!("identity api_key is empty; sign-in will fail");
        }
        Self { api_key, state }
    }

    /// Sign in (or create the account first) and remember the session.
    pub async fn sign_in(
        &self,
        email: String,
        password: String,
        create_account: bool,
    ) -> Result<(), ServiceError> {
        let response = if create_account {
            api::sign_up(&self.api_key, email, password).await?
        } else {
            api::sign_in(&self.api_key, email, password).await?
        };
        let session = StoredSession::from_sign_in(response, now_ms());
        log::info!("signed in as {}", session.user.uid);
        self.store(Some(session));
        Ok(())
    }

    pub fn sign_out(&self) {
        log::info!("signed out");
        self.store(None);
    }

    fn store(&self, session: Option<StoredSession>) {
        match &session {
            Some(s) => storage::save_session(s),
            None => storage::clear_session(),
        }
        self.state.set(AuthState {
            session,
            restoring: false,
        });
    }
}

#[async_trait(?Send)]
impl IdentityProvider for FirebaseIdentity {
    fn current_user(&self) -> Option<AuthUser> {
        self.state
            .with_untracked(|s| s.session.as_ref().map(|session| session.user.clone()))
    }

    async fn id_token(&self) -> Result<String, ServiceError> {
        let session = self
            .state
            .with_untracked(|s| s.session.clone())
            .ok_or(ServiceError::Unauthenticated)?;
        if !session.is_expired(now_ms()) {
            return Ok(session.id_token);
        }

        log::debug!("credential expired, refreshing");
        match api::refresh_token(&self.api_key, &session.refresh_token).await {
            Ok(response) => {
                let refreshed = session.refreshed(response, now_ms());
                let token = refreshed.id_token.clone();
                self.store(Some(refreshed));
                Ok(token)
            }
            Err(ServiceError::Rejected { message, .. }) => {
                // Refresh token revoked or expired: back to the sign-in page.
                log::warn!("session refresh rejected: {}", message);
                self.store(None);
                Err(ServiceError::Unauthenticated)
            }
            Err(e) => Err(e),
        }
    }
}

/// Restore the saved session and provide the auth state to the tree.
///
/// An expired session is refreshed right away; until that settles the state
/// reports `restoring`.
pub fn provide_auth(api_key: &str) -> FirebaseIdentity {
    let restored = storage::load_session();
    let needs_refresh = restored
        .as_ref()
        .map(|s| s.is_expired(now_ms()))
        .unwrap_or(false);

    let state = RwSignal::new(AuthState {
        session: restored,
        restoring: needs_refresh,
    });
    provide_context(state);

    let identity = FirebaseIdentity::new(api_key, state);
    if needs_refresh {
        let identity = identity.clone();
        spawn_local(async move {
            if let Err(e) = identity.id_token().await {
                log::warn!("could not restore session: {}", e);
            }
            identity.state.update(|s| s.restoring = false);
        });
    }
    identity
}

/// Hook to access auth state
pub fn use_auth() -> RwSignal<AuthState> {
    use_context::<RwSignal<AuthState>>().expect("auth state not provided")
}
