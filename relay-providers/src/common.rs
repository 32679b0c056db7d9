//! Shared HTTP plumbing used by every adapter.

use once_cell::sync::Lazy;
use std::time::Duration;

use crate::error::{ProviderError, ProviderResult};

/// Hard timeout for a single upstream provider call (§4.2, §5).
pub const PROVIDER_CALL_TIMEOUT_SECS: u64 = 180;

/// A single pooled client shared across adapters and requests, configured
/// with the provider call timeout (§4.2, §5).
pub static SHARED_HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(10)
        .tcp_keepalive(Duration::from_secs(60))
        .timeout(Duration::from_secs(PROVIDER_CALL_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(30))
        .build()
        .expect("failed to build shared HTTP client")
});

/// Downloads a remote image and base64-encodes it for Gemini's
/// `inline_data` parts (§4.2 outbound rule 3, 5). Returns `None` on any
/// fetch failure — the caller skips the image with a warning rather than
/// failing the whole message.
pub async fn fetch_image_as_base64(url: &str) -> Option<(String, String)> {
    let response = match SHARED_HTTP_CLIENT.get(url).send().await {
        Ok(resp) => resp,
        Err(err) => {
            tracing::warn!(url, %err, "failed to download image for inline_data");
            return None;
        }
    };

    let mime_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("image/jpeg")
        .to_string();

    let bytes = match response.bytes().await {
        Ok(b) => b,
        Err(err) => {
            tracing::warn!(url, %err, "failed to read image bytes");
            return None;
        }
    };

    use base64::Engine;
    let data = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Some((mime_type, data))
}

/// Raises `ProviderError::UpstreamStatus` if the response isn't a 2xx.
pub async fn ensure_success(
    provider: &'static str,
    response: reqwest::Response,
) -> ProviderResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::UpstreamStatus { provider, status, body })
}

pub fn http_err(provider: &'static str) -> impl Fn(reqwest::Error) -> ProviderError {
    move |source| ProviderError::Http { provider, source }
}
