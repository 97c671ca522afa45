use alloy_primitives::Address;
use reqwest::header::CONTENT_TYPE;
use std::sync::Arc;
use std::time::Duration;

use super::{FeeConfig, FeeConfigSource, FeeError, FeeFallbackPolicy};
use crate::constants::PLACEHOLDER_FEE_API_URL;

/// Request timeout for the fee endpoint
const FEE_API_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves the fee split for a client.
///
/// An override source wins unconditionally. Otherwise the fee endpoint is queried with
/// `GET <endpoint>?client=<address>`; when that fails the configured
/// [`FeeFallbackPolicy`] decides between the fallback split and an error.
#[derive(Clone)]
pub struct FeePolicyResolver {
    http: reqwest::Client,
    endpoint: Option<String>,
    token: Option<String>,
    policy: FeeFallbackPolicy,
    override_source: Option<Arc<dyn FeeConfigSource>>,
}

impl std::fmt::Debug for FeePolicyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeePolicyResolver")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("policy", &self.policy)
            .field("override_source", &self.override_source.is_some())
            .finish()
    }
}

impl FeePolicyResolver {
    /// `endpoint` may be empty or the `dummy` placeholder, which both mean "no endpoint".
    pub fn new(endpoint: Option<String>, token: Option<String>, policy: FeeFallbackPolicy) -> Result<Self, FeeError> {
        Self::with_timeout(endpoint, token, policy, FEE_API_TIMEOUT)
    }

    /// Like [`FeePolicyResolver::new`] with a custom request timeout.
    pub fn with_timeout(
        endpoint: Option<String>,
        token: Option<String>,
        policy: FeeFallbackPolicy,
        timeout: Duration,
    ) -> Result<Self, FeeError> {
        let endpoint = endpoint
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty() && url != PLACEHOLDER_FEE_API_URL);
        let token = token.filter(|t| !t.is_empty());
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeeError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, endpoint, token, policy, override_source: None })
    }

    /// Use `source` instead of the endpoint for every client.
    pub fn with_override(mut self, source: Arc<dyn FeeConfigSource>) -> Self {
        self.override_source = Some(source);
        self
    }

    pub fn policy(&self) -> FeeFallbackPolicy {
        self.policy
    }

    /// Fee split for `client`.
    ///
    /// Fetched values are returned as-is; range checking happens where the split is
    /// used for the proxy prediction.
    pub async fn resolve(&self, client: Address) -> Result<FeeConfig, FeeError> {
        if let Some(source) = &self.override_source {
            return source.fee_config(client).await;
        }

        let result = match &self.endpoint {
            Some(endpoint) => self.fetch(endpoint, client).await,
            None => Err(FeeError::MissingEndpoint),
        };

        match (result, self.policy) {
            (Ok(fee), _) => Ok(fee),
            (Err(err), FeeFallbackPolicy::Fallback) => {
                let fee = FeeConfig::fallback();
                if err == FeeError::MissingEndpoint {
                    tracing::info!(target: "onboarding::fees", %client, %fee, "no fee endpoint, using fallback split");
                } else {
                    tracing::warn!(target: "onboarding::fees", %client, %fee, error = %err, "fee endpoint unusable, using fallback split");
                }
                Ok(fee)
            }
            (Err(err), FeeFallbackPolicy::Strict) => Err(err),
        }
    }

    async fn fetch(&self, endpoint: &str, client: Address) -> Result<FeeConfig, FeeError> {
        let url = reqwest::Url::parse(endpoint).map_err(|e| FeeError::Http(format!("invalid URL {endpoint}: {e}")))?;

        let mut request = self
            .http
            .get(url)
            .query(&[("client", client.to_string())])
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| FeeError::Http(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeeError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| FeeError::Http(e.to_string()))?;
        let fee: FeeConfig = serde_json::from_str(&body).map_err(|e| FeeError::MalformedPayload(e.to_string()))?;
        tracing::debug!(target: "onboarding::fees", %client, %fee, "fee split fetched");
        Ok(fee)
    }
}
