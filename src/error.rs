//! Typed error taxonomy for the ticket pipeline.
//!
//! Call sites that only need to report a failure use `anyhow`. The types
//! here exist where the dashboard branches on the kind of failure.

use thiserror::Error;

/// Why fetching tickets from the CRM failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request exceeded its time budget.
    #[error("request timed out")]
    Timeout,
    /// Connection refused, DNS failure, TLS failure and the like.
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-2xx status.
    #[error("HTTP error: status {0}")]
    Http(u16),
    /// The body was not JSON, or was JSON but neither an array nor an object.
    #[error("invalid response format: {0}")]
    Format(String),
}

impl FetchError {
    /// Operator-facing message shown in the dashboard error state.
    pub fn user_message(&self) -> String {
        match self {
            Self::Timeout => {
                "Request timed out. Please check your connection and try again.".to_string()
            }
            Self::Network(detail) => format!(
                "Network error: could not reach the ticket API ({detail}). Please check: \
                 1) the CRM server is running, 2) the local proxy is started when running in \
                 development (`resolvx proxy`), 3) the server allows requests from this origin."
            ),
            other => format!("Failed to load dashboard: {other}"),
        }
    }
}

/// Failure while building the dashboard view.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to build chart '{slot}': {reason}")]
    Chart { slot: String, reason: String },
    #[error("failed to serialize view: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Dashboard operations that are deliberately not available.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DashboardError {
    /// Ticket status updates have no backend endpoint yet.
    #[error(
        "Ticket {reference} status would be updated to {status}. Note: This requires a \
         PUT/PATCH endpoint on the CRM API to update ticket status."
    )]
    StatusUpdateUnsupported { reference: String, status: String },
}
