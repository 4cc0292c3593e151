/// CRM ticket API client.
///
/// Fetches the ticket list with the synchronous `ureq` HTTP client:
///
/// - `GET <origin>/api/tickets` with `Accept: application/json`
/// - bounded by a per-call timeout budget
/// - failures classified into [`FetchError`] kinds the dashboard branches on
///
/// The payload may be a JSON array of tickets or a single ticket object,
/// which is treated as a one-element list.
use std::error::Error as StdError;
use std::io;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ResolvxConfig;
use crate::error::FetchError;
use crate::tickets::model::{self, Ticket};

// ---------------------------------------------------------------------------
// Source abstraction
// ---------------------------------------------------------------------------

/// Anything that can produce the current ticket list.
pub trait TicketSource {
    fn fetch_tickets(&self, timeout: Duration) -> Result<Vec<Ticket>, FetchError>;
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous ticket API client.
#[derive(Debug, Clone)]
pub struct TicketClient {
    url: String,
}

impl TicketClient {
    /// Build a client for an explicit endpoint URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Build a client from config, resolving the origin for the host the
    /// dashboard is served from.
    pub fn from_config(config: &ResolvxConfig, dashboard_host: &str) -> Self {
        Self::new(config.api.tickets_url(dashboard_host))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TicketSource for TicketClient {
    fn fetch_tickets(&self, timeout: Duration) -> Result<Vec<Ticket>, FetchError> {
        let started = Instant::now();
        debug!(url = %self.url, timeout_ms = timeout.as_millis() as u64, "fetching tickets");

        let response = ureq::get(&self.url)
            .set("Accept", "application/json")
            .timeout(timeout)
            .call()
            .map_err(classify_error)?;

        let status = response.status();
        if !(200..300).contains(&status) {
            warn!(url = %self.url, status, "ticket API returned non-success status");
            return Err(FetchError::Http(status));
        }

        let body = response.into_string().map_err(|e| classify_io(&e))?;
        let tickets = parse_payload(&body)?;

        info!(
            url = %self.url,
            count = tickets.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "tickets fetched"
        );
        Ok(tickets)
    }
}

// ---------------------------------------------------------------------------
// Payload parsing
// ---------------------------------------------------------------------------

/// Parse a response body into normalized tickets.
///
/// Arrays map element-wise; a single object becomes a one-element list.
/// Anything else (including non-JSON bodies) is a [`FetchError::Format`].
pub fn parse_payload(body: &str) -> Result<Vec<Ticket>, FetchError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::Format(format!("body is not valid JSON ({e})")))?;

    match value {
        Value::Array(items) => Ok(model::normalize_all(&items)),
        Value::Object(_) => Ok(vec![Ticket::from_json(&value)]),
        _ => Err(FetchError::Format(
            "expected array or object".to_string(),
        )),
    }
}

// ---------------------------------------------------------------------------
// Error classification
// ---------------------------------------------------------------------------

fn classify_error(err: ureq::Error) -> FetchError {
    match err {
        ureq::Error::Status(code, _) => FetchError::Http(code),
        ureq::Error::Transport(transport) => {
            if is_timeout(&transport) {
                FetchError::Timeout
            } else {
                FetchError::Network(transport.to_string())
            }
        }
    }
}

fn classify_io(err: &io::Error) -> FetchError {
    if is_timeout(err) {
        FetchError::Timeout
    } else {
        FetchError::Network(err.to_string())
    }
}

/// Walk the error chain looking for an I/O timeout.
fn is_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>()
            && matches!(
                io_err.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            )
        {
            return true;
        }
        current = e.source();
    }
    err.to_string().contains("timed out")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
