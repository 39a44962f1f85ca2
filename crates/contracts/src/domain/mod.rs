pub mod a001_upload_session;
pub mod a002_chat_thread;
