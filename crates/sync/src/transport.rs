//! The transport seam between the sync core and the remote space.

use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::Value;

/// Parsed response of a management API call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiResponse {
    /// Decoded JSON body (`Value::Null` for an empty body).
    pub data: Value,
    /// Total item count reported for paged listings.
    pub total: Option<usize>,
}

impl ApiResponse {
    pub fn new(data: Value) -> Self {
        Self { data, total: None }
    }

    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    /// An empty listing page (`total == 0`).
    pub fn empty() -> Self {
        Self {
            data: Value::Null,
            total: Some(0),
        }
    }
}

/// Query parameters for a `GET` call.
pub type Query = Vec<(String, String)>;

#[cfg(test)]
use mockall::automock;

/// Authenticated access to one remote space.
///
/// Paths are relative to the API root, e.g. `spaces/42/datasources/`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, query: &Query) -> Result<ApiResponse, TransportError>;

    async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse, TransportError>;

    async fn put(&self, path: &str, body: &Value) -> Result<ApiResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn get(&self, path: &str, query: &Query) -> Result<ApiResponse, TransportError> {
        (**self).get(path, query).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse, TransportError> {
        (**self).post(path, body).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<ApiResponse, TransportError> {
        (**self).put(path, body).await
    }
}
