//! Client for the plain-text METAR endpoint.

use std::time::Duration;

use tracing::instrument;

use crate::error::FetchError;
use crate::retry::RetryPolicy;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Fetches raw METAR text for an airport (`GET <base_url>?id=<ICAO>`).
#[derive(Debug, Clone)]
pub struct MetarClient {
    client: reqwest::Client,
    base_url: String,
    error_marker: Option<String>,
    retry: RetryPolicy,
}

impl MetarClient {
    /// Create a client for the given endpoint. `error_marker` is the
    /// in-band error text some deployments embed in the body; `None`
    /// disables the check.
    pub fn new(base_url: &str, error_marker: Option<&str>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            error_marker: error_marker.map(str::to_string),
            retry: RetryPolicy::default(),
        })
    }

    /// Fetch the raw METAR report for `icao`.
    ///
    /// Returns the trimmed body. A non-success status, an empty body, or
    /// a body containing the configured error marker is an upstream
    /// failure; the caller decides what happens to previously stored
    /// data.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_raw(&self, icao: &str) -> Result<String, FetchError> {
        let response = self
            .retry
            .run(|| self.client.get(&self.base_url).query(&[("id", icao)]).send())
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Upstream(format!("status {}", status)));
        }

        let body = response.text().await?;
        let report = body.trim();

        if report.is_empty() {
            return Err(FetchError::Upstream("empty report body".to_string()));
        }

        if let Some(marker) = &self.error_marker {
            if report.contains(marker.as_str()) {
                return Err(FetchError::Upstream(format!(
                    "error marker in body: {}",
                    report
                )));
            }
        }

        Ok(report.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const METAR_EGHI: &str =
        "EGHI 282120Z 19015KT 140V220 6000 RA SCT006 BKN009 16/14 Q1006";

    fn client_for(server: &MockServer, marker: Option<&str>) -> MetarClient {
        MetarClient::new(&format!("{}/metar.php", server.uri()), marker).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_raw_success_trims_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metar.php"))
            .and(query_param("id", "EGHI"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(format!("{}\n", METAR_EGHI)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Error"));
        let report = client.fetch_raw("EGHI").await.unwrap();
        assert_eq!(report, METAR_EGHI);
    }

    #[tokio::test]
    async fn test_error_marker_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metar.php"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("Error: no METAR for this station"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Error"));
        let result = client.fetch_raw("ZZZZ").await;
        assert!(matches!(result, Err(FetchError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_marker_check_disabled_stores_body_as_is() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metar.php"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("Error: no METAR for this station"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let report = client.fetch_raw("ZZZZ").await.unwrap();
        assert!(report.starts_with("Error"));
    }

    #[tokio::test]
    async fn test_empty_body_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metar.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string("  \n"))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Error"));
        let result = client.fetch_raw("EGHI").await;
        assert!(matches!(result, Err(FetchError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metar.php"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Error"));
        let result = client.fetch_raw("EGHI").await;
        assert!(matches!(result, Err(FetchError::Upstream(_))));
    }
}
