//! `reqwest`-backed transport for the Storyblok management API.

use crate::error::TransportError;
use crate::transport::{ApiResponse, Query, Transport};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://mapi.storyblok.com/v1";

const USER_AGENT: &str = concat!("sbmig/", env!("CARGO_PKG_VERSION"));

/// HTTP transport authenticated with a management token.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpTransport {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<ApiResponse, TransportError> {
        let response = builder
            .header(AUTHORIZATION, &self.token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        let total = response
            .headers()
            .get("total")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<usize>().ok());
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let data = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))?
        };
        Ok(ApiResponse { data, total })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, query: &Query) -> Result<ApiResponse, TransportError> {
        tracing::debug!(path, ?query, "GET");
        self.send(self.client.get(self.url(path)).query(query)).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse, TransportError> {
        tracing::debug!(path, "POST");
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<ApiResponse, TransportError> {
        tracing::debug!(path, "PUT");
        self.send(self.client.put(self.url(path)).json(body)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport(server: &MockServer) -> HttpTransport {
        HttpTransport::new(server.uri(), "secret-token", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn get_sends_token_and_query_and_reads_total_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/spaces/1/datasources/"))
            .and(query_param("page", "2"))
            .and(header("authorization", "secret-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("total", "3")
                    .set_body_json(json!({ "datasources": [{ "id": 1, "name": "a" }] })),
            )
            .mount(&server)
            .await;

        let res = transport(&server)
            .get(
                "spaces/1/datasources/",
                &vec![("page".to_string(), "2".to_string())],
            )
            .await
            .unwrap();
        assert_eq!(res.total, Some(3));
        assert_eq!(res.data["datasources"][0]["name"], "a");
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&server)
            .await;

        let err = transport(&server)
            .get("spaces/1/datasources/", &Vec::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            err,
            TransportError::Status {
                status: 404,
                body: "missing".into()
            }
        );
    }

    #[tokio::test]
    async fn put_sends_json_body_and_accepts_empty_response() {
        let server = MockServer::start().await;
        let body = json!({
            "datasource_entry": { "id": 9, "name": "n", "value": "v", "datasource_id": 1 }
        });
        Mock::given(method("PUT"))
            .and(path("/spaces/1/datasource_entries/9"))
            .and(body_json(&body))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let res = transport(&server)
            .put("spaces/1/datasource_entries/9", &body)
            .await
            .unwrap();
        assert_eq!(res.data, Value::Null);
        assert_eq!(res.total, None);
    }

    #[test]
    fn base_url_trailing_slash_is_normalised() {
        let t =
            HttpTransport::new("https://example.test/v1/", "t", Duration::from_secs(1)).unwrap();
        assert_eq!(t.url("/spaces/1/"), "https://example.test/v1/spaces/1/");
    }
}
