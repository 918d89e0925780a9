//! Elasticsearch search client

use async_trait::async_trait;
use esperf_core::{SearchClient, SearchResponse, VendorError};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::config::ClientConfig;

/// Client for Elasticsearch `_search` endpoints
///
/// One `search` call is exactly one HTTP POST; there are no retries. The
/// underlying connection pool is shared by every worker.
#[derive(Debug, Clone)]
pub struct ElasticsearchClient {
    client: Client,
    config: ClientConfig,
}

impl ElasticsearchClient {
    /// Create a client with the given configuration
    pub fn new(config: ClientConfig) -> Result<Self, VendorError> {
        config
            .validate()
            .map_err(|e| VendorError::InvalidRequest(e.to_string()))?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        tracing::debug!(
            request_timeout_ms = config.request_timeout.as_millis() as u64,
            connect_timeout_ms = config.connect_timeout.as_millis() as u64,
            "Created Elasticsearch client"
        );

        Ok(Self { client, config })
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl SearchClient for ElasticsearchClient {
    fn name(&self) -> &str {
        "elasticsearch"
    }

    async fn search(&self, url: &str, body: Vec<u8>) -> Result<SearchResponse, VendorError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            tracing::trace!(url, status, "Search returned non-200 status");
            return Ok(SearchResponse::new(status, Vec::new()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| VendorError::Body { status, source })?;

        Ok(SearchResponse::new(status, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> ElasticsearchClient {
        ElasticsearchClient::new(
            ClientConfig::default().with_request_timeout(Duration::from_secs(5)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/products/item/_search"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({"query": {"match_all": {}}})))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"hits":{"total":17,"hits":[]}}"#),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/products/item/_search", mock_server.uri());
        let response = client()
            .search(&url, br#"{"query":{"match_all":{}}}"#.to_vec())
            .await
            .unwrap();

        assert!(response.is_ok());
        assert_eq!(response.total_hits().unwrap(), 17);
    }

    #[tokio::test]
    async fn test_search_non_200_skips_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/idx/doc/_search"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let url = format!("{}/idx/doc/_search", mock_server.uri());
        let response = client().search(&url, b"{}".to_vec()).await.unwrap();

        assert_eq!(response.status_code, 500);
        assert!(!response.is_ok());
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_search_unparseable_body_still_returned() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let url = format!("{}/idx/doc/_search", mock_server.uri());
        let response = client().search(&url, b"{}".to_vec()).await.unwrap();

        assert_eq!(response.status_code, 200);
        assert!(response.total_hits().is_err());
    }

    #[tokio::test]
    async fn test_search_unreachable_host() {
        // Nothing listens on port 1
        let result = client()
            .search("http://127.0.0.1:1/idx/doc/_search", b"{}".to_vec())
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, VendorError::Http(_)));
        assert_eq!(err.status_code(), None);
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn test_search_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&mock_server)
            .await;

        let client = ElasticsearchClient::new(
            ClientConfig::default().with_request_timeout(Duration::from_millis(50)),
        )
        .unwrap();
        let url = format!("{}/idx/doc/_search", mock_server.uri());
        let err = client.search(&url, b"{}".to_vec()).await.unwrap_err();

        assert!(matches!(err, VendorError::Http(ref e) if e.is_timeout()));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result =
            ElasticsearchClient::new(ClientConfig::default().with_request_timeout(Duration::ZERO));
        assert!(matches!(result, Err(VendorError::InvalidRequest(_))));
    }

    #[test]
    fn test_client_name() {
        assert_eq!(client().name(), "elasticsearch");
    }
}
