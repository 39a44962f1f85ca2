//! Browser client for the object-storage collaborator.
//!
//! Uploads go through `XMLHttpRequest` because `fetch` has no upload
//! progress events.

use async_trait::async_trait;
use contracts::domain::a001_upload_session::service::{ObjectStorage, ProgressFn};
use contracts::shared::api_error::ServiceError;
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{File, ProgressEvent, XmlHttpRequest};

const STORAGE_ENDPOINT: &str = "https://firebasestorage.googleapis.com/v0/b";

#[derive(Clone, Debug)]
pub struct FirebaseStorage {
    bucket: String,
}

/// Object metadata returned after an upload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub name: String,
    pub bucket: String,
    /// Comma-separated list; any token grants read access.
    #[serde(default)]
    pub download_tokens: Option<String>,
}

impl StoredObject {
    pub fn download_url(&self) -> Result<String, ServiceError> {
        let token = self
            .download_tokens
            .as_deref()
            .and_then(|t| t.split(',').next())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::Decode("upload returned no download token".into()))?;
        Ok(format!(
            "{}/{}/o/{}?alt=media&token={}",
            STORAGE_ENDPOINT,
            self.bucket,
            urlencoding::encode(&self.name),
            token
        ))
    }
}

impl FirebaseStorage {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }

    fn upload_url(&self, path: &str) -> String {
        format!(
            "{}/{}/o?uploadType=media&name={}",
            STORAGE_ENDPOINT,
            self.bucket,
            urlencoding::encode(path)
        )
    }
}

/// Message of a thrown `Error`, or the value itself when a string was thrown.
fn js_err(e: JsValue) -> ServiceError {
    let message = e
        .dyn_ref::<js_sys::Error>()
        .map(|err| String::from(err.message()))
        .or_else(|| e.as_string());
    transport_error(message)
}

fn transport_error(message: Option<String>) -> ServiceError {
    match message.filter(|m| !m.trim().is_empty()) {
        Some(message) => ServiceError::Transport(message),
        None => ServiceError::Transport("browser error".to_string()),
    }
}

#[async_trait(?Send)]
impl ObjectStorage for FirebaseStorage {
    type Blob = File;

    async fn put(
        &self,
        path: &str,
        blob: File,
        credential: &str,
        on_progress: ProgressFn,
    ) -> Result<String, ServiceError> {
        let xhr = XmlHttpRequest::new().map_err(js_err)?;
        xhr.open_with_async("POST", &self.upload_url(path), true)
            .map_err(js_err)?;
        xhr.set_request_header("Authorization", &format!("Firebase {}", credential))
            .map_err(js_err)?;
        xhr.set_request_header("Content-Type", &blob.type_())
            .map_err(js_err)?;

        let progress = Closure::<dyn FnMut(ProgressEvent)>::new(move |ev: ProgressEvent| {
            if ev.length_computable() {
                on_progress(ev.loaded() as u64, ev.total() as u64);
            }
        });
        xhr.upload()
            .map_err(js_err)?
            .set_onprogress(Some(progress.as_ref().unchecked_ref()));

        // Settles after load, error and abort alike; the status tells them apart.
        let settled = js_sys::Promise::new(&mut |resolve, _reject| {
            let on_settled = Closure::once_into_js(move || {
                let _ = resolve.call0(&JsValue::NULL);
            });
            xhr.set_onloadend(Some(on_settled.unchecked_ref()));
        });

        xhr.send_with_opt_blob(Some(&blob)).map_err(js_err)?;
        wasm_bindgen_futures::JsFuture::from(settled)
            .await
            .map_err(js_err)?;
        drop(progress);

        let status = xhr.status().map_err(js_err)?;
        let body = xhr.response_text().map_err(js_err)?.unwrap_or_default();

        if status == 0 {
            return Err(ServiceError::Transport("network error".to_string()));
        }
        if !(200..300).contains(&status) {
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(ServiceError::Rejected { status, message });
        }

        let object: StoredObject =
            serde_json::from_str(&body).map_err(|e| ServiceError::Decode(e.to_string()))?;
        object.download_url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_url_encodes_path() {
        let object: StoredObject = serde_json::from_str(
            r#"{"name":"pdfs/u1/17-0_my doc.pdf","bucket":"b.appspot.com","downloadTokens":"tok1,tok2"}"#,
        )
        .unwrap();
        assert_eq!(
            object.download_url().unwrap(),
            "https://firebasestorage.googleapis.com/v0/b/b.appspot.com/o/pdfs%2Fu1%2F17-0_my%20doc.pdf?alt=media&token=tok1"
        );
    }

    #[test]
    fn test_transport_error_is_readable() {
        assert_eq!(
            transport_error(Some("NetworkError: Failed to execute 'send'".into())).to_string(),
            "NetworkError: Failed to execute 'send'"
        );
        assert_eq!(
            transport_error(Some("  ".into())).to_string(),
            "browser error"
        );
        assert_eq!(transport_error(None).to_string(), "browser error");
    }

    #[test]
    fn test_download_url_requires_token() {
        let object: StoredObject =
            serde_json::from_str(r#"{"name":"a.pdf","bucket":"b"}"#).unwrap();
        assert!(object.download_url().is_err());
    }
}
