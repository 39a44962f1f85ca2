//! HTTP helpers for the analysis and chat services.

use contracts::shared::api_error::{ErrorFields, ServiceError};
use gloo_net::http::Request;
use serde::Serialize;

/// POST a JSON body with a bearer credential and return the raw response text.
///
/// Non-success responses become [`ServiceError::Rejected`] with the message
/// taken from the body fields selected by `fields`, or `fallback`.
///
/// # Example
/// ```rust,ignore
/// let text = post_json_with_auth(&url, &request, &token, ErrorFields::DetailOnly, "Chat request failed").await?;
/// ```
pub async fn post_json_with_auth<B>(
    url: &str,
    body: &B,
    credential: &str,
    fields: ErrorFields,
    fallback: &str,
) -> Result<String, ServiceError>
where
    B: Serialize,
{
    let response = Request::post(url)
        .header("Authorization", &format!("Bearer {}", credential))
        .json(body)
        .map_err(|e| ServiceError::Transport(format!("Failed to serialize request: {}", e)))?
        .send()
        .await
        .map_err(|e| ServiceError::Transport(format!("Failed to send request: {}", e)))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ServiceError::Transport(format!("Failed to read response: {}", e)))?;

    if !response.ok() {
        log::warn!("{} answered {}", url, status);
        return Err(ServiceError::rejected(status, &text, fields, fallback));
    }

    Ok(text)
}
