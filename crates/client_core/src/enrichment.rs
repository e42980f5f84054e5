//! HTTP client for the enrichment endpoint.

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::ApiError,
    protocol::{EnrichRequest, EnrichedResult, ENRICH_ROUTE},
};
use tracing::{info, warn};
use url::Url;

use crate::error::{EnrichError, REJECTED_FALLBACK_MESSAGE};

#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(&self, request: &EnrichRequest) -> Result<EnrichedResult, EnrichError>;
}

pub struct HttpEnrichmentClient {
    http: Client,
    endpoint: Url,
}

impl HttpEnrichmentClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: Client::new(),
            endpoint,
        }
    }

    /// Client for `{base_url}/api/enrich`. A path prefix on `base_url` is kept.
    pub fn from_base_url(base_url: &str) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join(ENRICH_ROUTE.trim_start_matches('/'))?;
        Ok(Self::new(endpoint))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Enricher for HttpEnrichmentClient {
    async fn enrich(&self, request: &EnrichRequest) -> Result<EnrichedResult, EnrichError> {
        info!(
            endpoint = %self.endpoint,
            company_name = %request.company_name,
            website = %request.website,
            "enrich: sending request"
        );
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let message = rejection_message(&body);
            warn!(status = status.as_u16(), %message, "enrich: request rejected");
            return Err(EnrichError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

fn rejection_message(body: &[u8]) -> String {
    serde_json::from_slice::<ApiError>(body)
        .ok()
        .and_then(|error| error.message().map(str::to_owned))
        .unwrap_or_else(|| REJECTED_FALLBACK_MESSAGE.to_string())
}

#[cfg(test)]
#[path = "tests/enrichment_tests.rs"]
mod tests;
