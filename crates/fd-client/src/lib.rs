//! ActivityWatch REST client.
//!
//! Provides the bucket and event endpoints the fake data generator needs:
//! - Listing, creating and force-deleting buckets
//! - Inserting events in batches
//!
//! [`AwClient`] is async. [`BlockingClient`] wraps it with a private runtime
//! and implements the generator's [`fd_core::BucketStore`] and
//! [`fd_core::Submitter`] seams.

mod blocking;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;

use fd_core::Event;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use blocking::BlockingClient;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
/// Server used when running against a testing instance.
pub const TESTING_SERVER_URL: &str = "http://localhost:5666";
/// Server used when running against a production instance.
pub const PRODUCTION_SERVER_URL: &str = "http://localhost:5600";
/// Events per insert request unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server URL could not be used as an API base.
    #[error("invalid server URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// Failed to start the runtime backing the blocking client.
    #[error("failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Server returned an error response.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Returns the default server for testing or production mode.
pub const fn default_server_url(testing: bool) -> &'static str {
    if testing {
        TESTING_SERVER_URL
    } else {
        PRODUCTION_SERVER_URL
    }
}

/// Connection settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    /// Reported as the `client` of created buckets.
    pub client_name: String,
    /// Reported as the `hostname` of created buckets.
    pub hostname: String,
    /// Events per insert request.
    pub batch_size: usize,
}

/// Async ActivityWatch API client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct AwClient {
    http: reqwest::Client,
    base_url: Url,
    client_name: String,
    hostname: String,
    batch_size: usize,
}

impl fmt::Debug for AwClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwClient")
            .field("base_url", &self.base_url.as_str())
            .field("client_name", &self.client_name)
            .field("hostname", &self.hostname)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct CreateBucket<'a> {
    client: &'a str,
    #[serde(rename = "type")]
    event_type: &'a str,
    hostname: &'a str,
}

impl AwClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the server URL cannot carry API paths, or if the
    /// HTTP client fails to build.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.server_url).map_err(|err| ClientError::InvalidUrl {
            url: config.server_url.clone(),
            reason: err.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl {
                url: config.server_url,
                reason: "URL cannot be a base".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(ClientError::ClientBuild)?;

        Ok(Self {
            http,
            base_url,
            client_name: config.client_name,
            hostname: config.hostname,
            batch_size: config.batch_size.max(1),
        })
    }

    /// Lists the ids of every bucket on the server.
    pub async fn bucket_ids(&self) -> Result<HashSet<String>, ClientError> {
        let response = self
            .http
            .get(self.endpoint(&["buckets", ""]))
            .send()
            .await?;
        let body = check_status(response).await?;
        let buckets: HashMap<String, serde_json::Value> =
            serde_json::from_str(&body).map_err(|err| ClientError::Api {
                status: StatusCode::OK.as_u16(),
                message: format!("invalid bucket listing: {err}"),
            })?;
        Ok(buckets.into_keys().collect())
    }

    /// Creates a bucket. An already existing bucket is left as is.
    pub async fn create_bucket(&self, bucket_id: &str, event_type: &str) -> Result<(), ClientError> {
        let body = CreateBucket {
            client: &self.client_name,
            event_type,
            hostname: &self.hostname,
        };
        let response = self
            .http
            .post(self.endpoint(&["buckets", bucket_id]))
            .json(&body)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_MODIFIED {
            tracing::debug!(%bucket_id, "bucket already exists");
            return Ok(());
        }
        check_status(response).await?;
        tracing::debug!(%bucket_id, %event_type, "created bucket");
        Ok(())
    }

    /// Force-deletes a bucket and its events. A missing bucket is not an error.
    pub async fn delete_bucket(&self, bucket_id: &str) -> Result<(), ClientError> {
        let mut url = self.endpoint(&["buckets", bucket_id]);
        url.query_pairs_mut().append_pair("force", "1");
        let response = self.http.delete(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::warn!(%bucket_id, "bucket to delete does not exist");
            return Ok(());
        }
        check_status(response).await?;
        tracing::debug!(%bucket_id, "deleted bucket");
        Ok(())
    }

    /// Inserts events into a bucket, `batch_size` events per request.
    pub async fn insert_events(&self, bucket_id: &str, events: &[Event]) -> Result<(), ClientError> {
        let url = self.endpoint(&["buckets", bucket_id, "events"]);
        for (idx, batch) in events.chunks(self.batch_size).enumerate() {
            let response = self.http.post(url.clone()).json(batch).send().await?;
            check_status(response).await?;
            tracing::debug!(%bucket_id, batch = idx, events = batch.len(), "inserted batch");
        }
        Ok(())
    }

    /// Builds `<base>/api/0/<segments...>`, escaping each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "0"]).extend(segments);
        }
        url
    }
}

async fn check_status(response: reqwest::Response) -> Result<String, ClientError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ClientError::Api {
            status: status.as_u16(),
            message: parse_api_error(&body).unwrap_or(body),
        });
    }
    Ok(body)
}

fn parse_api_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        message: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| payload.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(server_url: &str) -> AwClient {
        AwClient::new(ClientConfig {
            server_url: server_url.to_string(),
            client_name: "aw-fakedata".to_string(),
            hostname: "fakedata".to_string(),
            batch_size: 0,
        })
        .unwrap()
    }

    #[test]
    fn default_server_depends_on_mode() {
        assert_eq!(default_server_url(true), "http://localhost:5666");
        assert_eq!(default_server_url(false), "http://localhost:5600");
    }

    #[test]
    fn endpoint_appends_api_prefix() {
        let client = client("http://localhost:5666");
        assert_eq!(
            client.endpoint(&["buckets", ""]).as_str(),
            "http://localhost:5666/api/0/buckets/"
        );
        assert_eq!(
            client
                .endpoint(&["buckets", "aw-watcher-afk_fakedata", "events"])
                .as_str(),
            "http://localhost:5666/api/0/buckets/aw-watcher-afk_fakedata/events"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_and_escapes_segments() {
        let client = client("http://example.com/aw/");
        assert_eq!(
            client.endpoint(&["buckets", "a b"]).as_str(),
            "http://example.com/aw/api/0/buckets/a%20b"
        );
    }

    #[test]
    fn batch_size_is_at_least_one() {
        assert_eq!(client("http://localhost:5666").batch_size, 1);
    }

    #[test]
    fn invalid_url_is_rejected() {
        let err = AwClient::new(ClientConfig {
            server_url: "not a url".to_string(),
            client_name: "aw-fakedata".to_string(),
            hostname: "fakedata".to_string(),
            batch_size: 10,
        })
        .unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl { .. }));
    }

    #[test]
    fn api_error_message_is_extracted() {
        assert_eq!(
            parse_api_error(r#"{"message": "There's no bucket named x"}"#).as_deref(),
            Some("There's no bucket named x")
        );
        assert_eq!(parse_api_error("<html>"), None);
    }

    #[test]
    fn create_bucket_body_uses_type_key() {
        let body = CreateBucket {
            client: "aw-fakedata",
            event_type: "afkstatus",
            hostname: "fakedata",
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"client":"aw-fakedata","type":"afkstatus","hostname":"fakedata"}"#
        );
    }
}
