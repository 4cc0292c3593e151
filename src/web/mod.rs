//! Embedded web server for resolvx.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - The landing page with the complaint form and metrics bar
//! - The support dashboard page
//! - JSON API endpoints backing both pages
//!
//! Launched via `resolvx web` (default: `http://127.0.0.1:8000`).

mod api;
mod frontend;

use std::io::Cursor;
use std::time::Instant;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};
use tracing::{info, warn};

use crate::api::{TicketClient, TicketSource};
use crate::config::ResolvxConfig;
use crate::dashboard::Dashboard;

pub use api::query_param;

// ---------------------------------------------------------------------------
// Server state
// ---------------------------------------------------------------------------

/// Process-wide state shared by all requests.
pub struct WebState {
    pub config: ResolvxConfig,
    pub dashboard: Dashboard,
    source: Box<dyn TicketSource>,
}

impl WebState {
    pub fn new(config: ResolvxConfig, source: Box<dyn TicketSource>) -> Self {
        Self {
            config,
            dashboard: Dashboard::new(),
            source,
        }
    }

    /// State backed by the real ticket API, resolving the API origin for the
    /// host the server is bound to.
    pub fn from_config(config: ResolvxConfig, addr: &str) -> Self {
        let client = TicketClient::from_config(&config, addr);
        info!(url = client.url(), "ticket API resolved");
        Self::new(config, Box::new(client))
    }

    pub fn source(&self) -> &dyn TicketSource {
        self.source.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the web server on the given address.
///
/// Blocks the current thread. Handles requests sequentially. Errors are
/// reported per request without stopping the server.
pub fn serve(config: ResolvxConfig, addr: &str) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    let open = config.web.open_browser;
    let mut state = WebState::from_config(config, addr);

    println!("resolvx running at http://{addr}");
    println!("  dashboard: http://{addr}/dashboard");
    println!("Press Ctrl+C to stop.\n");

    if open && let Err(e) = open_browser(&format!("http://{addr}")) {
        warn!(error = %e, "could not open browser");
    }

    for mut request in server.incoming_requests() {
        let started = Instant::now();
        let method = request.method().clone();
        let url = request.url().to_string();

        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = String::new();
            if let Err(e) = request.as_reader().read_to_string(&mut buf) {
                warn!(error = %e, "failed to read request body");
            }
            Some(buf)
        } else {
            None
        };

        let reply = dispatch(&mut state, &method, &url, body.as_deref()).unwrap_or_else(|e| {
            warn!(%method, %url, error = %e, "request failed");
            Reply::json_error(500, &e.to_string())
        });
        let status = reply.status;

        if let Err(e) = request.respond(reply.into_response()) {
            warn!(error = %e, "failed to send response");
        }

        info!(
            %method,
            %url,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request"
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
pub fn dispatch(state: &mut WebState, method: &Method, url: &str, body: Option<&str>) -> Result<Reply> {
    let path = url.split('?').next().unwrap_or(url);

    if let Some(rest) = path.strip_prefix("/api/tickets/") {
        return match (method, rest.strip_suffix("/status")) {
            (&Method::Post, Some(reference)) => api::post_ticket_status(state, reference, body.unwrap_or("")),
            (&Method::Get, None) => api::get_ticket(state, rest),
            _ => Ok(not_found()),
        };
    }

    match (method, path) {
        // Pages
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(Reply::html(frontend::LANDING_HTML)),
        (&Method::Get, "/dashboard") => Ok(Reply::html(frontend::DASHBOARD_HTML)),

        // API
        (&Method::Get, "/api/dashboard") => api::get_dashboard(state, url),
        (&Method::Get, "/api/metrics") => api::get_metrics(state),
        (&Method::Post, "/api/complaint") => api::post_complaint(state, body.unwrap_or("")),
        (&Method::Get, "/api/config") => api::get_config(state),

        _ => Ok(not_found()),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Handler output, converted to a `tiny_http` response by the server loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn html(page: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: page.to_string(),
        }
    }

    pub(crate) fn json(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "application/json; charset=utf-8",
            body,
        }
    }

    pub(crate) fn json_error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }).to_string())
    }

    pub fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        Response::from_data(self.body.into_bytes())
            .with_header(content_type(self.content_type))
            .with_status_code(StatusCode(self.status))
    }
}

fn not_found() -> Reply {
    Reply::json_error(404, "not found")
}

fn content_type(value: &str) -> Header {
    Header::from_bytes("Content-Type", value).expect("content type header is valid")
}

/// Attempt to open a URL in the system default browser.
pub(crate) fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
