use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::PracticumConfig;
use crate::error::BotError;

/// Source of homework status envelopes
#[async_trait]
pub trait HomeworkSource: Send + Sync {
    /// Fetch every status change since `from_date` (Unix seconds)
    async fn fetch(&self, from_date: i64) -> Result<Value, BotError>;
}

/// Client for the Practicum homework statuses endpoint
pub struct PracticumClient {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    pub fn new(config: &PracticumConfig, token: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            token,
        })
    }

    fn connection_error(&self, source: reqwest::Error, from_date: i64) -> BotError {
        BotError::Connection {
            source,
            url: self.endpoint.clone(),
            from_date,
        }
    }
}

#[async_trait]
impl HomeworkSource for PracticumClient {
    async fn fetch(&self, from_date: i64) -> Result<Value, BotError> {
        debug!(
            "Requesting homework statuses: url={} from_date={}",
            self.endpoint, from_date
        );

        let response = self
            .client
            .get(&self.endpoint)
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| self.connection_error(e, from_date))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(BotError::ApiAccess {
                status: status.as_u16(),
            });
        }
        info!("Practicum API responded with {}", status);

        let body: Value = response
            .json()
            .await
            .map_err(|e| self.connection_error(e, from_date))?;

        debug!("Practicum API data received");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, timeout_secs: u64) -> PracticumClient {
        let config = PracticumConfig {
            endpoint: format!("{}/api/user_api/homework_statuses/", server.uri()),
            request_timeout_secs: timeout_secs,
        };
        PracticumClient::new(&config, "test-token".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sends_token_and_cursor() {
        let server = MockServer::start().await;
        let body = json!({
            "homeworks": [{"homework_name": "hw1", "status": "approved"}],
            "current_date": 1000
        });
        Mock::given(method("GET"))
            .and(path("/api/user_api/homework_statuses/"))
            .and(header("Authorization", "OAuth test-token"))
            .and(query_param("from_date", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server, 5).fetch(0).await.unwrap();
        assert_eq!(response, body);
    }

    #[tokio::test]
    async fn test_fetch_non_ok_status_is_api_access_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        match client_for(&server, 5).fetch(1000).await {
            Err(BotError::ApiAccess { status }) => assert_eq!(status, 503),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_invalid_json_is_connection_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server, 5).fetch(42).await.unwrap_err();
        match &err {
            BotError::Connection { url, from_date, .. } => {
                assert!(url.ends_with("/api/user_api/homework_statuses/"));
                assert_eq!(*from_date, 42);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!err.to_string().contains("test-token"));
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_connection_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"homeworks": [], "current_date": 1}))
                    .set_delay(std::time::Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server, 1).fetch(0).await.unwrap_err();
        assert!(matches!(err, BotError::Connection { .. }));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_connection_error() {
        let config = PracticumConfig {
            endpoint: "http://127.0.0.1:9/".to_string(),
            request_timeout_secs: 2,
        };
        let client = PracticumClient::new(&config, "t".to_string()).unwrap();
        assert!(matches!(
            client.fetch(0).await,
            Err(BotError::Connection { .. })
        ));
    }
}
