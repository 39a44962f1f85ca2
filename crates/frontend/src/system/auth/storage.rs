use contracts::system::auth::StoredSession;
use web_sys::window;

const SESSION_KEY: &str = "auth_session";

fn get_local_storage() -> Option<web_sys::Storage> {
    window()?.local_storage().ok()?
}

/// Save the signed-in session to localStorage
pub fn save_session(session: &StoredSession) {
    let Ok(json) = serde_json::to_string(session) else {
        return;
    };
    if let Some(storage) = get_local_storage() {
        let _ = storage.set_item(SESSION_KEY, &json);
    }
}

/// Get the saved session, if any and readable
pub fn load_session() -> Option<StoredSession> {
    let json = get_local_storage()?.get_item(SESSION_KEY).ok()??;
    match serde_json::from_str(&json) {
        Ok(session) => Some(session),
        Err(e) => {
            log::warn!("discarding unreadable stored session: {}", e);
            clear_session();
            None
        }
    }
}

/// Forget the saved session
pub fn clear_session() {
    if let Some(storage) = get_local_storage() {
        let _ = storage.remove_item(SESSION_KEY);
    }
}
