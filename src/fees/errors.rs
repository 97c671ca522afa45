use thiserror::Error;

/// Errors raised while resolving a client's fee split
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeeError {
    /// No fee endpoint is configured and the strict policy forbids the fallback split
    #[error("no fee endpoint configured")]
    MissingEndpoint,

    /// The request could not be built or sent, or the connection failed
    #[error("fee request failed: {0}")]
    Http(String),

    /// The endpoint answered with a non-2xx status
    #[error("fee endpoint returned HTTP {0}")]
    Status(u16),

    /// The body is not JSON or lacks a numeric basis-point field
    #[error("malformed fee payload: {0}")]
    MalformedPayload(String),

    /// A caller-supplied fee source failed
    #[error("fee source failed: {0}")]
    Source(String),
}
