//! Drives an [`UploadSession`] through the storage and analysis collaborators.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::aggregate::{EntryId, UploadSession};
use crate::shared::api_error::ServiceError;
use crate::shared::state_cell::StateCell;
use crate::system::auth::IdentityProvider;

/// `(transferred, total)` bytes.
pub type ProgressFn = Box<dyn Fn(u64, u64)>;

/// Object storage scoped to the signed-in user.
#[async_trait(?Send)]
pub trait ObjectStorage {
    /// Platform file handle.
    type Blob;

    /// Write `blob` at `path`, reporting progress, and return a stable
    /// download URL.
    async fn put(
        &self,
        path: &str,
        blob: Self::Blob,
        credential: &str,
        on_progress: ProgressFn,
    ) -> Result<String, ServiceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyseRequest {
    pub pdf_urls: Vec<String>,
}

/// Remote service that indexes uploaded PDFs.
#[async_trait(?Send)]
pub trait AnalysisService {
    async fn analyse(&self, request: &AnalyseRequest, credential: &str)
        -> Result<(), ServiceError>;
}

/// Destination of an upload. The timestamp and entry id keep repeated
/// uploads of same-named files apart.
pub fn storage_path(uid: &str, timestamp_ms: i64, id: EntryId, file_name: &str) -> String {
    format!("pdfs/{uid}/{timestamp_ms}-{id}_{file_name}")
}

/// Upload one admitted entry and record the outcome in the session.
///
/// Failure marks only this entry `error`; the caller decides how to alert.
pub async fn upload_entry<C, I, O>(
    cell: C,
    identity: &I,
    storage: &O,
    id: EntryId,
    file_name: &str,
    blob: O::Blob,
) -> Result<String, ServiceError>
where
    C: StateCell<UploadSession> + Clone + 'static,
    I: IdentityProvider + ?Sized,
    O: ObjectStorage + ?Sized,
{
    let progress_cell = cell.clone();
    let on_progress: ProgressFn = Box::new(move |transferred, total| {
        progress_cell.update_with(|s| s.on_progress(id, transferred, total));
    });

    let result = async {
        let user = identity
            .current_user()
            .ok_or(ServiceError::Unauthenticated)?;
        let credential = identity.id_token().await?;
        let path = storage_path(&user.uid, Utc::now().timestamp_millis(), id, file_name);
        log::info!("uploading {file_name} to {path}");
        storage.put(&path, blob, &credential, on_progress).await
    }
    .await;

    match &result {
        Ok(url) => {
            cell.update_with(|s| s.on_uploaded(id, url.clone()));
            log::info!("uploaded {file_name}");
        }
        Err(e) => {
            cell.update_with(|s| s.on_upload_failed(id));
            log::warn!("upload of {file_name} failed: {e}");
        }
    }
    result
}

/// Analyse every uploaded entry with one call.
///
/// Returns `None` without touching the network when the guard fails (an
/// entry is not `done`, or an analysis is already running).
pub async fn analyse<C, I, A>(
    cell: &C,
    identity: &I,
    service: &A,
) -> Option<Result<(), ServiceError>>
where
    C: StateCell<UploadSession>,
    I: IdentityProvider + ?Sized,
    A: AnalysisService + ?Sized,
{
    let ticket = cell.update_with(UploadSession::begin_analyse).flatten()?;
    log::info!("analysing {} document(s)", ticket.pdf_urls.len());

    let result = async {
        let credential = identity.id_token().await?;
        let request = AnalyseRequest {
            pdf_urls: ticket.pdf_urls.clone(),
        };
        service.analyse(&request, &credential).await
    }
    .await;

    if let Err(e) = &result {
        log::warn!("analysis failed: {e}");
    }
    cell.update_with(|s| {
        s.finish_analyse(
            ticket.generation,
            result.as_ref().map(|_| ()).map_err(ToString::to_string),
        )
    });
    Some(result)
}
