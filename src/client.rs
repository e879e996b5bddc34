use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::StatusCode;

use crate::config::AppContext;
use crate::error::ShipError;
use crate::record::LogRecord;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a single delivery attempt. Classification only; the retry
/// decision belongs to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// 2xx response; the collector accepted the record.
    Accepted,
    /// Transient: rate limiting, timeout, or a connection-level failure
    /// (including host resolution). Eligible for backoff retry.
    Retryable(String),
    /// Anything else. The record will be dropped without retry.
    Fatal(String),
}

/// One outbound submission per call, no internal retries.
#[async_trait]
pub trait DeliveryClient: Send + Sync {
    async fn deliver(&self, record: &LogRecord) -> DeliveryOutcome;
}

/// Posts records to `http://{host}:{port}/` with a bounded request timeout.
/// The underlying connection pool is shared across all concurrent attempts.
pub struct HttpDeliveryClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpDeliveryClient {
    pub fn new(context: &AppContext) -> Result<Self, ShipError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint: context.collector_url(),
        })
    }
}

#[async_trait]
impl DeliveryClient for HttpDeliveryClient {
    async fn deliver(&self, record: &LogRecord) -> DeliveryOutcome {
        let response = self
            .client
            .post(&self.endpoint)
            .json(record)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => DeliveryOutcome::Accepted,
            Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                debug!("Collector rate-limited the request");
                DeliveryOutcome::Retryable("collector returned 429".to_string())
            }
            Ok(response) => {
                warn!("Collector rejected record: status {}", response.status());
                DeliveryOutcome::Fatal(format!("unexpected status {}", response.status()))
            }
            Err(e) if e.is_timeout() || e.is_connect() => {
                debug!("Transient delivery failure: {}", e);
                DeliveryOutcome::Retryable(e.to_string())
            }
            Err(e) => {
                warn!("Delivery failed: {}", e);
                DeliveryOutcome::Fatal(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeviceInfo;
    use crate::record::{LogEvent, Priority};
    use chrono::Local;

    fn context_for(host_with_port: &str) -> AppContext {
        let (host, port) = host_with_port.split_once(':').unwrap();
        AppContext {
            app_name: "App".to_string(),
            app_version_name: "0.1".to_string(),
            app_version_code: 1,
            environment: "debug".to_string(),
            collector_host: host.to_string(),
            collector_port: port.parse().unwrap(),
        }
    }

    fn sample_record(context: &AppContext) -> LogRecord {
        let device = DeviceInfo {
            manufacturer: "Acme".to_string(),
            model: "Widget".to_string(),
            os_release: "14".to_string(),
            sdk_level: 34,
        };
        let event = LogEvent::new(Priority::Info, None, "hello".to_string(), None);
        LogRecord::build(&event, context, &device, Local::now())
    }

    async fn outcome_for_status(status: usize) -> DeliveryOutcome {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(status)
            .create_async()
            .await;
        let context = context_for(&server.host_with_port());
        let client = HttpDeliveryClient::new(&context).unwrap();
        let outcome = client.deliver(&sample_record(&context)).await;
        mock.assert_async().await;
        outcome
    }

    #[tokio::test]
    async fn success_status_is_accepted() {
        assert_eq!(outcome_for_status(200).await, DeliveryOutcome::Accepted);
    }

    #[tokio::test]
    async fn rate_limit_is_retryable() {
        assert!(matches!(
            outcome_for_status(429).await,
            DeliveryOutcome::Retryable(_)
        ));
    }

    #[tokio::test]
    async fn server_error_is_fatal() {
        assert!(matches!(
            outcome_for_status(500).await,
            DeliveryOutcome::Fatal(_)
        ));
    }

    #[tokio::test]
    async fn client_error_is_fatal() {
        assert!(matches!(
            outcome_for_status(404).await,
            DeliveryOutcome::Fatal(_)
        ));
    }

    #[tokio::test]
    async fn connection_failure_is_retryable() {
        // Unbound local port: connect fails immediately.
        let context = context_for("127.0.0.1:1");
        let client = HttpDeliveryClient::new(&context).unwrap();
        let outcome = client.deliver(&sample_record(&context)).await;
        assert!(matches!(outcome, DeliveryOutcome::Retryable(_)));
    }

    #[tokio::test]
    async fn body_is_the_serialized_record() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"level": "INFO", "message": "hello"}"#.to_string(),
            ))
            .with_status(200)
            .create_async()
            .await;
        let context = context_for(&server.host_with_port());
        let client = HttpDeliveryClient::new(&context).unwrap();
        let outcome = client.deliver(&sample_record(&context)).await;
        assert_eq!(outcome, DeliveryOutcome::Accepted);
        mock.assert_async().await;
    }
}
