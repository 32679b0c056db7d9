use thiserror::Error;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Raised by an adapter on network, auth, format, or content-policy
/// errors (§4.2). Adapters never retry internally — that is the router's
/// job (§4.3).
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("http error calling {provider}: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned {status}: {body}")]
    UpstreamStatus {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("malformed {provider} response: {0}")]
    MalformedResponse(&'static str, String),

    #[error("{provider} is not configured (missing API key)")]
    NotConfigured { provider: &'static str },

    #[error("all configured providers failed")]
    AllProvidersFailed,
}
