use contracts::domain::a001_upload_session::aggregate::UploadSession;
use contracts::domain::a002_chat_thread::aggregate::ChatThread;
use contracts::system::config::AppConfig;
use leptos::prelude::*;

use crate::domain::a001_upload_session::ui::AnalysisApi;
use crate::domain::a002_chat_thread::ui::ChatApi;
use crate::shared::object_storage::FirebaseStorage;
use crate::system::auth::context::FirebaseIdentity;

/// Collaborators and page state shared across routes.
///
/// Built once at start from the configuration; pages take what they need
/// from context instead of reaching for globals.
#[derive(Clone, Debug)]
pub struct AppGlobalContext {
    pub identity: FirebaseIdentity,
    pub storage: FirebaseStorage,
    pub analysis: AnalysisApi,
    pub chat: ChatApi,
    pub session: RwSignal<UploadSession>,
    pub thread: RwSignal<ChatThread>,
}

impl AppGlobalContext {
    pub fn new(config: &AppConfig, identity: FirebaseIdentity) -> Self {
        Self {
            identity,
            storage: FirebaseStorage::new(config.storage.bucket.clone()),
            analysis: AnalysisApi::new(config.service.analyse_url.clone()),
            chat: ChatApi::new(config.service.chat_url.clone()),
            session: RwSignal::new(UploadSession::new()),
            thread: RwSignal::new(ChatThread::new()),
        }
    }

    /// Sign out and drop everything tied to the previous user.
    pub fn sign_out(&self) {
        self.identity.sign_out();
        self.session.update(UploadSession::reset);
        self.thread.set(ChatThread::new());
    }
}
