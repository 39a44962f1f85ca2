//! Upload Session - Model (analysis service client)

use async_trait::async_trait;
use contracts::domain::a001_upload_session::service::{AnalyseRequest, AnalysisService};
use contracts::shared::api_error::{ErrorFields, ServiceError};

use crate::shared::api_utils::post_json_with_auth;

/// HTTP client of the remote analysis endpoint.
#[derive(Clone, Debug)]
pub struct AnalysisApi {
    url: String,
}

impl AnalysisApi {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait(?Send)]
impl AnalysisService for AnalysisApi {
    async fn analyse(
        &self,
        request: &AnalyseRequest,
        credential: &str,
    ) -> Result<(), ServiceError> {
        post_json_with_auth(
            &self.url,
            request,
            credential,
            ErrorFields::DetailOrMessage,
            "Analysis failed",
        )
        .await?;
        Ok(())
    }
}
