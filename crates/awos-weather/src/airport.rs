//! Client for the airport metadata endpoint.

use std::time::Duration;

use tracing::instrument;

use crate::error::FetchError;
use crate::retry::RetryPolicy;
use crate::types::{AirportRecord, ResponseShape};

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Fetches airport metadata (`GET <base_url>?icao=<ICAO>[&key=<credential>]`).
///
/// The response shape is pinned at construction: some deployments serve a
/// single object, others an array of matches.
#[derive(Debug, Clone)]
pub struct AirportClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    shape: ResponseShape,
    retry: RetryPolicy,
}

impl AirportClient {
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        shape: ResponseShape,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.map(str::to_string),
            shape,
            retry: RetryPolicy::default(),
        })
    }

    /// Fetch the airport record for `icao`.
    ///
    /// Under the array shape an empty result set is `Ok(None)`, not an
    /// error. A body that does not match the pinned shape is a
    /// `Shape` error.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch(&self, icao: &str) -> Result<Option<AirportRecord>, FetchError> {
        let response = self
            .retry
            .run(|| {
                let mut request = self.client.get(&self.base_url).query(&[("icao", icao)]);
                if let Some(key) = &self.api_key {
                    request = request.query(&[("key", key.as_str())]);
                }
                request.send()
            })
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Upstream(format!("status {}", status)));
        }

        let body = response.text().await?;

        match self.shape {
            ResponseShape::Object => {
                let record: AirportRecord = serde_json::from_str(&body)
                    .map_err(|e| FetchError::Shape(format!("expected object: {}", e)))?;
                Ok(Some(record))
            }
            ResponseShape::Array => {
                let records: Vec<AirportRecord> = serde_json::from_str(&body)
                    .map_err(|e| FetchError::Shape(format!("expected array: {}", e)))?;
                Ok(records.into_iter().next())
            }
        }
    }
}
