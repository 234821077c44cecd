//! JSON-over-HTTPS plumbing shared by the provider clients.

use reqwest::RequestBuilder;
use scriptorium_error::{BackendError, BackendErrorKind};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, error};

/// POST `body` and decode the provider's JSON answer.
pub(crate) async fn post_json<B, R>(
    provider: &'static str,
    request: RequestBuilder,
    body: &B,
) -> Result<R, BackendError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = request
        .header("content-type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(|e| {
            error!(provider, error = ?e, "Failed to send request");
            BackendError::new(BackendErrorKind::Http(format!("{}: {}", provider, e)))
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(provider, status = %status, body = %body, "Provider returned error");
        return Err(BackendError::new(BackendErrorKind::Api {
            status: status.as_u16(),
            message: body,
        }));
    }

    let decoded = response.json::<R>().await.map_err(|e| {
        error!(provider, error = ?e, "Failed to parse provider response");
        BackendError::new(BackendErrorKind::Parse(format!("{}: {}", provider, e)))
    })?;
    debug!(provider, "Received provider response");
    Ok(decoded)
}

/// Reject calls without a usable API key before any network traffic.
pub(crate) fn require_api_key(
    backend: &str,
    variable: &str,
    api_key: &str,
) -> Result<(), BackendError> {
    if api_key.trim().is_empty() {
        return Err(BackendError::new(BackendErrorKind::MissingCredentials {
            backend: backend.to_string(),
            variable: variable.to_string(),
        }));
    }
    Ok(())
}
