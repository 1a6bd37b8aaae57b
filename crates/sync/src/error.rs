//! Error types for the transport seam and the reconciliation core.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a [`Transport`](crate::Transport) implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The server answered with a non-success status code.
    #[error("remote responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The request never produced a response (connect, TLS, timeout, ...).
    #[error("request failed: {0}")]
    Request(String),
    /// The response body could not be decoded as JSON.
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl TransportError {
    /// HTTP status code, when the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Kind of remote object a lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Datasource,
    Component,
    Preset,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Datasource => "datasource",
            Self::Component => "component",
            Self::Preset => "preset",
        })
    }
}

/// Errors produced by the sync core.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A lookup by name (or id) found no remote object.
    #[error("there is no {kind} named '{name}'")]
    NotFound { kind: ResourceKind, name: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// A response did not have the expected shape.
    #[error("unexpected {context} payload: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// A local definition file could not be read or parsed.
    #[error("failed to load {}: {message}", path.display())]
    Load { path: PathBuf, message: String },
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SyncError {
    pub(crate) fn not_found(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn decode(context: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { context, source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias used across the sync core.
pub type SyncResult<T> = std::result::Result<T, SyncError>;
