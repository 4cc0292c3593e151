/// Local CORS proxy for development.
///
/// Browsers refuse cross-origin calls to the CRM API from a locally served
/// dashboard. `resolvx proxy` listens on `localhost:<port>`, forwards
/// `GET /api/tickets*` to the CRM origin and adds permissive CORS headers to
/// every answer.
use std::io::{Cursor, Read};
use std::time::Duration;

use anyhow::Result;
use tiny_http::{Header, Method, Response, Server, StatusCode};
use tracing::{info, warn};

use crate::config::ResolvxConfig;

const FORWARDED_PREFIX: &str = "/api/tickets";

const CORS_HEADERS: &[(&str, &str)] = &[
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type, Accept"),
];

/// Answer produced for one proxied request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyReply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ProxyReply {
    fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let headers = CORS_HEADERS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        let mut response = Response::from_data(self.body).with_status_code(StatusCode(self.status));
        for (name, value) in &self.headers {
            match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                Ok(header) => response.add_header(header),
                Err(()) => warn!(%name, "dropping invalid response header"),
            }
        }
        response
    }
}

#[derive(Debug, Clone)]
pub struct CorsProxy {
    crm_url: String,
    timeout: Duration,
}

impl CorsProxy {
    pub fn new(crm_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            crm_url: crm_url.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ResolvxConfig) -> Self {
        Self::new(
            config.api.crm_url.clone(),
            Duration::from_secs(config.proxy.upstream_timeout_secs),
        )
    }

    /// Route one request. `url` is the request target, query string included.
    pub fn handle(&self, method: &Method, url: &str) -> ProxyReply {
        match method {
            Method::Options => ProxyReply::new(200, Vec::new()).with_header("Access-Control-Max-Age", "3600"),
            Method::Get if url.starts_with(FORWARDED_PREFIX) => self.forward(url),
            _ => ProxyReply::new(404, "Not Found").with_header("Content-Type", "text/plain; charset=utf-8"),
        }
    }

    fn forward(&self, url: &str) -> ProxyReply {
        let target = format!("{}{}", self.crm_url.trim_end_matches('/'), url);

        let result = ureq::get(&target)
            .set("Accept", "application/json")
            .timeout(self.timeout)
            .call();

        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(e)) => {
                warn!(upstream = %target, error = %e, "upstream request failed");
                return ProxyReply::new(502, format!("Bad Gateway: {e}"))
                    .with_header("Content-Type", "text/plain; charset=utf-8");
            }
        };

        let status = response.status();
        let mut body = Vec::new();
        if let Err(e) = response.into_reader().read_to_end(&mut body) {
            warn!(upstream = %target, error = %e, "failed to read upstream body");
            return ProxyReply::new(502, format!("Bad Gateway: {e}"))
                .with_header("Content-Type", "text/plain; charset=utf-8");
        }

        info!(upstream = %target, status, bytes = body.len(), "proxied");
        ProxyReply::new(status, body).with_header("Content-Type", "application/json")
    }

    /// Listen on `127.0.0.1:<port>` and proxy until the process is stopped.
    pub fn serve(&self, port: u16) -> Result<()> {
        let addr = format!("127.0.0.1:{port}");
        let server = Server::http(&addr)
            .map_err(|e| anyhow::anyhow!("failed to start proxy on {addr}: {e}"))?;

        println!("CORS proxy running on http://localhost:{port}");
        println!("Proxying requests to: {}", self.crm_url);
        println!("Press Ctrl+C to stop.\n");

        self.run(&server);
        Ok(())
    }

    /// Serve requests from an already bound server.
    pub fn run(&self, server: &Server) {
        for request in server.incoming_requests() {
            let reply = self.handle(request.method(), request.url());
            if let Err(e) = request.respond(reply.into_response()) {
                warn!(error = %e, "failed to send proxy response");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy() -> CorsProxy {
        // Port 9 (discard) is never served locally.
        CorsProxy::new("http://127.0.0.1:9", Duration::from_millis(500))
    }

    #[test]
    fn preflight_answers_with_cors_headers() {
        let reply = proxy().handle(&Method::Options, "/api/tickets");
        assert_eq!(reply.status, 200);
        assert_eq!(reply.header("access-control-allow-origin"), Some("*"));
        assert_eq!(reply.header("Access-Control-Allow-Methods"), Some("GET, POST, OPTIONS"));
        assert_eq!(reply.header("Access-Control-Allow-Headers"), Some("Content-Type, Accept"));
        assert_eq!(reply.header("Access-Control-Max-Age"), Some("3600"));
        assert!(reply.body.is_empty());
    }

    #[test]
    fn other_paths_are_not_found() {
        let reply = proxy().handle(&Method::Get, "/index.html");
        assert_eq!(reply.status, 404);
        assert_eq!(reply.header("Access-Control-Allow-Origin"), Some("*"));

        let reply = proxy().handle(&Method::Post, "/api/tickets");
        assert_eq!(reply.status, 404);
    }

    #[test]
    fn unreachable_upstream_is_bad_gateway() {
        let reply = proxy().handle(&Method::Get, "/api/tickets");
        assert_eq!(reply.status, 502);
        assert!(String::from_utf8_lossy(&reply.body).starts_with("Bad Gateway: "));
    }
}
