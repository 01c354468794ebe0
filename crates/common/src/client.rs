//! HTTP client for the load-test service

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::info;

use crate::config::LoadtestConfig;
use crate::error::{DownloadError, Error, Result};
use crate::types::{CreatedTest, TestId, TestRequest, TestStatus};

pub const API_VERSION_HEADER: &str = "x-neocortix-cloud-api-version";
pub const AUTH_TOKEN_HEADER: &str = "x-neocortix-cloud-api-authtoken";
pub const API_VERSION: &str = "1";

/// Accept header used when fetching result files
pub const ARTIFACT_ACCEPT: &str = "application/json, text/html, image/*";

/// Write buffer size for artifact downloads
const CHUNK_SIZE: usize = 8192;

/// Outcome of one status request
#[derive(Debug)]
pub enum PollResponse {
    /// 200 with a decoded body
    Status(TestStatus),
    /// Any other status code; the body is ignored
    Unavailable(StatusCode),
}

/// Client for the cloud load-test API
pub struct ServiceClient {
    http: reqwest::Client,
    tests_url: String,
    headers: HeaderMap,
}

impl ServiceClient {
    /// Create a client for the tests endpoint and token in `config`
    pub fn new(config: &LoadtestConfig) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        let headers = api_headers(&config.auth_token)?;
        Ok(Self {
            http,
            tests_url: config.tests_url.clone(),
            headers,
        })
    }

    pub fn tests_url(&self) -> &str {
        &self.tests_url
    }

    /// GET `{master_url}/` without credentials
    pub async fn probe(&self, master_url: &str) -> Result<StatusCode> {
        let url = format!("{}/", master_url);
        let response = self.http.get(&url).send().await?;
        Ok(response.status())
    }

    /// Submit a test and return its handle
    pub async fn start_test(&self, request: &TestRequest) -> Result<TestId> {
        let body = serde_json::to_string(request)?;
        let response = self
            .http
            .post(&self.tests_url)
            .headers(self.headers.clone())
            .body(body)
            .send()
            .await?;

        info!("POST status_code {}", response.status().as_u16());
        let text = response.text().await?;
        info!("POST text {}", text);

        let created: CreatedTest = serde_json::from_str(&text)?;
        let id = created.id.ok_or_else(|| Error::MissingField {
            url: self.tests_url.clone(),
            field: "id",
        })?;
        Ok(TestId::new(id))
    }

    /// Fetch the current status of a test
    pub async fn get_status(&self, id: &TestId) -> Result<PollResponse> {
        let url = id.status_url(&self.tests_url);
        let response = self
            .http
            .get(&url)
            .headers(self.headers.clone())
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Ok(PollResponse::Unavailable(response.status()));
        }

        let raw: serde_json::Value = response.json().await?;
        Ok(PollResponse::Status(TestStatus::from_json(raw, &url)?))
    }

    /// Stream `url` into `dir`, named after the last path segment.
    ///
    /// Returns the written file path.
    pub async fn download(&self, url: &str, dir: &Path) -> std::result::Result<PathBuf, DownloadError> {
        let mut headers = self.headers.clone();
        headers.insert(ACCEPT, HeaderValue::from_static(ARTIFACT_ACCEPT));

        let mut response = self.http.get(url).headers(headers).send().await?;
        let status = response.status();
        info!("status_code {} for url {}", status.as_u16(), url);
        if !status.is_success() {
            return Err(DownloadError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let path = dir.join(file_name(url));
        let file = tokio::fs::File::create(&path).await?;
        let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
        while let Some(chunk) = response.chunk().await? {
            if chunk.is_empty() {
                continue;
            }
            writer.write_all(&chunk).await?;
        }
        writer.flush().await?;

        Ok(path)
    }
}

fn api_headers(auth_token: &str) -> Result<HeaderMap> {
    let token = HeaderValue::from_str(auth_token)
        .map_err(|_| Error::InvalidConfig("auth token is not a valid header value".to_string()))?;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static(API_VERSION_HEADER),
        HeaderValue::from_static(API_VERSION),
    );
    headers.insert(HeaderName::from_static(AUTH_TOKEN_HEADER), token);
    Ok(headers)
}

/// Local file name for a download URL
pub fn file_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ServiceClient {
        let config = LoadtestConfig {
            victim_host_url: "http://victim.example".to_string(),
            auth_token: "tok-123".to_string(),
            tests_url: format!("{}/cloud-api/load-test/", server.uri()),
            ..Default::default()
        };
        ServiceClient::new(&config).unwrap()
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("http://h/t/abc/rps.png"), "rps.png");
        assert_eq!(file_name("rps.png"), "rps.png");
    }

    #[test]
    fn test_token_with_newline_is_rejected() {
        let config = LoadtestConfig {
            auth_token: "bad\ntoken".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            ServiceClient::new(&config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_start_test_sends_headers_and_body() {
        let server = MockServer::start().await;
        let request = TestRequest::from_config(&LoadtestConfig {
            victim_host_url: "http://victim.example".to_string(),
            ..Default::default()
        });

        Mock::given(method("POST"))
            .and(path("/cloud-api/load-test/"))
            .and(header("content-type", "application/json"))
            .and(header("accept", "application/json"))
            .and(header(API_VERSION_HEADER, API_VERSION))
            .and(header(AUTH_TOKEN_HEADER, "tok-123"))
            .and(body_json(json!({
                "url": "http://victim.example",
                "num-workers": "1",
                "duration": "10",
                "users-per-worker": "6",
                "reqMsprMean": "1000",
                "ramp-up-rate": "0",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "t-42"})))
            .expect(1)
            .mount(&server)
            .await;

        let id = client_for(&server).start_test(&request).await.unwrap();
        assert_eq!(id.as_str(), "t-42");
    }

    #[tokio::test]
    async fn test_start_test_without_id_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "nope"})))
            .mount(&server)
            .await;

        let request = TestRequest::from_config(&LoadtestConfig::default());
        let err = client_for(&server).start_test(&request).await.unwrap_err();
        assert!(matches!(err, Error::MissingField { field: "id", .. }));
    }

    #[tokio::test]
    async fn test_start_test_non_json_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let request = TestRequest::from_config(&LoadtestConfig::default());
        let err = client_for(&server).start_test(&request).await.unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[tokio::test]
    async fn test_get_status_non_200_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cloud-api/load-test/t-1"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let response = client_for(&server).get_status(&TestId::new("t-1")).await.unwrap();
        match response {
            PollResponse::Unavailable(code) => assert_eq!(code.as_u16(), 503),
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_download_writes_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cloud-api/load-test/t-1/ltStats.html"))
            .and(header(AUTH_TOKEN_HEADER, "tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>stats</html>"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = client_for(&server);
        let url = TestId::new("t-1").artifact_url(client.tests_url(), "ltStats.html");
        let written = client.download(&url, dir.path()).await.unwrap();

        assert_eq!(written, dir.path().join("ltStats.html"));
        assert_eq!(std::fs::read_to_string(written).unwrap(), "<html>stats</html>");

        let requests = server.received_requests().await.unwrap();
        let accept = requests[0].headers.get("accept").unwrap().to_str().unwrap();
        assert_eq!(accept, ARTIFACT_ACCEPT);
    }

    #[tokio::test]
    async fn test_download_404_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = client_for(&server);
        let url = TestId::new("t-1").artifact_url(client.tests_url(), "rps.png");
        let err = client.download(&url, dir.path()).await.unwrap_err();

        assert!(matches!(err, DownloadError::Status { status: 404, .. }));
        assert_eq!(err.kind(), "status");
        assert!(!dir.path().join("rps.png").exists());
    }
}
