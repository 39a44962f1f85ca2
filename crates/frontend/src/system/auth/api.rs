use contracts::shared::api_error::ServiceError;
use contracts::system::auth::{
    IdentityErrorBody, RefreshTokenResponse, SignInRequest, SignInResponse,
};
use gloo_net::http::{Request, Response};

const IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1/accounts";
const TOKEN_ENDPOINT: &str = "https://securetoken.googleapis.com/v1/token";

/// Sign in with email and password
pub async fn sign_in(
    api_key: &str,
    email: String,
    password: String,
) -> Result<SignInResponse, ServiceError> {
    password_request(&format!("{}:signInWithPassword", IDENTITY_ENDPOINT), api_key, email, password)
        .await
}

/// Create an account and sign in
pub async fn sign_up(
    api_key: &str,
    email: String,
    password: String,
) -> Result<SignInResponse, ServiceError> {
    password_request(&format!("{}:signUp", IDENTITY_ENDPOINT), api_key, email, password).await
}

async fn password_request(
    endpoint: &str,
    api_key: &str,
    email: String,
    password: String,
) -> Result<SignInResponse, ServiceError> {
    let request = SignInRequest {
        email,
        password,
        return_secure_token: true,
    };

    let response = Request::post(&format!("{}?key={}", endpoint, api_key))
        .json(&request)
        .map_err(|e| ServiceError::Transport(format!("Failed to serialize request: {}", e)))?
        .send()
        .await
        .map_err(|e| ServiceError::Transport(format!("Failed to send request: {}", e)))?;

    parse(response).await
}

/// Exchange a refresh token for a fresh credential
pub async fn refresh_token(
    api_key: &str,
    refresh_token: &str,
) -> Result<RefreshTokenResponse, ServiceError> {
    let body = format!(
        "grant_type=refresh_token&refresh_token={}",
        urlencoding::encode(refresh_token)
    );

    let response = Request::post(&format!("{}?key={}", TOKEN_ENDPOINT, api_key))
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(body)
        .map_err(|e| ServiceError::Transport(format!("Failed to build request: {}", e)))?
        .send()
        .await
        .map_err(|e| ServiceError::Transport(format!("Failed to send request: {}", e)))?;

    parse(response).await
}

async fn parse<T>(response: Response) -> Result<T, ServiceError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ServiceError::Transport(format!("Failed to read response: {}", e)))?;

    if !response.ok() {
        return Err(ServiceError::Rejected {
            status,
            message: IdentityErrorBody::describe(&text),
        });
    }

    serde_json::from_str(&text).map_err(|e| ServiceError::Decode(e.to_string()))
}
