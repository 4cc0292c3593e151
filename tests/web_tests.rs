/// Web server routing and CORS proxy tests.
///
/// Routing tests drive `web::dispatch` directly with a stub ticket source.
/// Proxy tests forward to a local fake CRM bound on an ephemeral port.
use std::cell::Cell;
use std::rc::Rc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use resolvx::api::TicketSource;
use resolvx::config::ResolvxConfig;
use resolvx::error::FetchError;
use resolvx::proxy::CorsProxy;
use resolvx::tickets::Ticket;
use resolvx::web::{self, WebState};
use serde_json::{Value, json};
use tiny_http::{Method, Response, Server, StatusCode};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct StubSource(Result<Vec<Value>, FetchError>);

impl TicketSource for StubSource {
    fn fetch_tickets(&self, _timeout: Duration) -> Result<Vec<Ticket>, FetchError> {
        self.0
            .clone()
            .map(|values| values.iter().map(Ticket::from_json).collect())
    }
}

fn state_with(result: Result<Vec<Value>, FetchError>) -> WebState {
    WebState::new(ResolvxConfig::default(), Box::new(StubSource(result)))
}

fn sample_state() -> WebState {
    state_with(Ok(vec![
        json!({ "ticketReference": "T-1", "companyName": "Acme", "priority": "HIGH", "issueDescription": "payment failed" }),
        json!({ "ticketReference": "T-2", "companyName": "Globex", "priority": "LOW", "status": "CLOSED" }),
        json!({ "ticketReference": "T 3", "companyName": "Acme", "priority": "MEDIUM" }),
    ]))
}

fn call(state: &mut WebState, method: Method, url: &str, body: Option<&str>) -> (u16, Value) {
    let reply = web::dispatch(state, &method, url, body).unwrap();
    let json = serde_json::from_str(&reply.body).unwrap_or(Value::Null);
    (reply.status, json)
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[test]
fn pages_are_served_as_html() {
    let mut state = sample_state();
    for url in ["/", "/dashboard"] {
        let reply = web::dispatch(&mut state, &Method::Get, url, None).unwrap();
        assert_eq!(reply.status, 200);
        assert!(reply.content_type.starts_with("text/html"));
        assert!(reply.body.starts_with("<!DOCTYPE html>"));
    }
}

#[test]
fn unknown_route_is_404() {
    let (status, body) = call(&mut sample_state(), Method::Get, "/nope", None);
    assert_eq!(status, 404);
    assert_eq!(body["error"], "not found");
}

// ---------------------------------------------------------------------------
// Dashboard API
// ---------------------------------------------------------------------------

#[test]
fn dashboard_loads_on_first_call() {
    let mut state = sample_state();
    let (status, body) = call(&mut state, Method::Get, "/api/dashboard", None);

    assert_eq!(status, 200);
    assert_eq!(body["view_state"]["state"], "content");
    assert_eq!(body["view"]["summary"]["total_tickets"], 3);
    assert_eq!(body["view"]["tickets"]["data"][0]["reference"], "T-1");
}

#[test]
fn dashboard_filters_apply_to_ticket_list_only() {
    let mut state = sample_state();
    let (_, body) = call(&mut state, Method::Get, "/api/dashboard?priority=low", None);

    let tickets = body["view"]["tickets"]["data"].as_array().unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0]["reference"], "T-2");
    assert_eq!(body["view"]["summary"]["total_tickets"], 3);

    // company filter keeps the priority selection
    let (_, body) = call(&mut state, Method::Get, "/api/dashboard?company=Acme", None);
    assert_eq!(body["view"]["tickets"]["state"], "empty");
    assert_eq!(body["view"]["tickets"]["data"]["message"], "No tickets found matching the filters.");
}

#[test]
fn invalid_priority_filter_is_bad_request() {
    let (status, body) = call(&mut sample_state(), Method::Get, "/api/dashboard?priority=urgent", None);
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("urgent"));
}

#[test]
fn product_company_selection() {
    let mut state = sample_state();
    let (_, body) = call(&mut state, Method::Get, "/api/dashboard?product_company=Acme", None);

    let products = &body["view"]["products"];
    assert_eq!(products["state"], "ready");
    assert_eq!(products["data"]["analysis"]["ticket_count"], 2);
    assert_eq!(products["data"]["chart"]["config"]["title"], "Product Analysis for Acme");
}

#[test]
fn fetch_failure_reports_error_state() {
    let mut state = state_with(Err(FetchError::Timeout));
    let (status, body) = call(&mut state, Method::Get, "/api/dashboard", None);

    assert_eq!(status, 200);
    assert_eq!(body["view_state"]["state"], "error");
    assert_eq!(
        body["view_state"]["message"],
        "Request timed out. Please check your connection and try again."
    );
    assert!(body["view"].is_null());
}

/// Failing source that counts how often it was asked.
struct CountingSource(Rc<Cell<usize>>);

impl TicketSource for CountingSource {
    fn fetch_tickets(&self, _timeout: Duration) -> Result<Vec<Ticket>, FetchError> {
        self.0.set(self.0.get() + 1);
        Err(FetchError::Http(503))
    }
}

#[test]
fn failed_first_load_is_only_retried_on_refresh() {
    let calls = Rc::new(Cell::new(0));
    let mut state = WebState::new(ResolvxConfig::default(), Box::new(CountingSource(calls.clone())));

    call(&mut state, Method::Get, "/api/dashboard", None);
    call(&mut state, Method::Get, "/api/dashboard?priority=HIGH", None);
    call(&mut state, Method::Get, "/api/dashboard?product_company=Acme", None);
    let (status, _) = call(&mut state, Method::Get, "/api/tickets/T-1", None);
    assert_eq!(status, 404);
    assert_eq!(calls.get(), 1);

    let (_, body) = call(&mut state, Method::Get, "/api/dashboard?refresh", None);
    assert_eq!(calls.get(), 2);
    assert_eq!(body["view_state"]["state"], "error");
}

// ---------------------------------------------------------------------------
// Ticket detail and status
// ---------------------------------------------------------------------------

#[test]
fn ticket_detail_by_encoded_reference() {
    let mut state = sample_state();
    let (status, body) = call(&mut state, Method::Get, "/api/tickets/T%203", None);
    assert_eq!(status, 200);
    assert_eq!(body["reference"], "T 3");
    assert_eq!(body["customer_email"], "N/A");
    assert_eq!(body["status"], "OPEN");
    assert_eq!(body["priority"], "MEDIUM");
    assert_eq!(body["issue_description"], "No description provided");

    let (status, _) = call(&mut state, Method::Get, "/api/tickets/T-99", None);
    assert_eq!(status, 404);
}

#[test]
fn status_update_is_not_implemented() {
    let mut state = sample_state();
    call(&mut state, Method::Get, "/api/dashboard", None);

    let (status, body) = call(
        &mut state,
        Method::Post,
        "/api/tickets/T-1/status",
        Some(r#"{"status":"RESOLVED"}"#),
    );
    assert_eq!(status, 501);
    assert!(body["error"].as_str().unwrap().contains("PUT/PATCH endpoint"));

    let (_, detail) = call(&mut state, Method::Get, "/api/tickets/T-1", None);
    assert_eq!(detail["status"], "OPEN");
}

#[test]
fn status_update_requires_body() {
    let (status, _) = call(&mut sample_state(), Method::Post, "/api/tickets/T-1/status", Some("nope"));
    assert_eq!(status, 400);
}

// ---------------------------------------------------------------------------
// Metrics, complaint, config
// ---------------------------------------------------------------------------

#[test]
fn metrics_counters() {
    let (status, body) = call(&mut sample_state(), Method::Get, "/api/metrics", None);
    assert_eq!(status, 200);
    assert_eq!(body["counters"]["total_tickets"], 3);
    assert_eq!(body["counters"]["high_priority"], 1);
    assert_eq!(body["counters"]["resolved"], 1);
    assert_eq!(body["refresh_interval_secs"], 30);
}

#[test]
fn metrics_failure_yields_placeholders() {
    let mut state = state_with(Err(FetchError::Network("refused".into())));
    let (status, body) = call(&mut state, Method::Get, "/api/metrics", None);
    assert_eq!(status, 200);
    assert!(body["counters"]["total_tickets"].is_null());
}

#[test]
fn complaint_compose_and_validation() {
    let mut state = sample_state();
    let form = r#"{"personalEmail":"ann@acme.io","customerName":"Ann","companyName":"Acme","problemDescription":"Late delivery"}"#;
    let (status, body) = call(&mut state, Method::Post, "/api/complaint", Some(form));
    assert_eq!(status, 200);
    assert_eq!(body["mail"]["subject"], "Complaint: Acme");
    assert!(body["mail"]["gmail_url"].as_str().unwrap().starts_with("https://mail.google.com/mail/?view=cm&fs=1&to="));

    let bad = r#"{"personalEmail":"not-an-email","customerName":"Ann","companyName":"Acme","problemDescription":"x"}"#;
    let (status, body) = call(&mut state, Method::Post, "/api/complaint", Some(bad));
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Please enter a valid email address.");
}

#[test]
fn config_endpoint_returns_effective_config() {
    let (status, body) = call(&mut sample_state(), Method::Get, "/api/config", None);
    assert_eq!(status, 200);
    assert_eq!(body["config"]["api"]["dashboard_timeout_secs"], 30);
    assert!(body["toml_text"].as_str().unwrap().contains("[api]"));
}

// ---------------------------------------------------------------------------
// CORS proxy
// ---------------------------------------------------------------------------

/// Upstream that answers one request and reports the URL it was asked for.
fn fake_upstream(status: u16, body: &'static str) -> (String, mpsc::Receiver<String>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let _ = tx.send(request.url().to_string());
            let _ = request.respond(Response::from_string(body).with_status_code(StatusCode(status)));
        }
    });

    (format!("http://127.0.0.1:{port}/crmserver"), rx)
}

#[test]
fn proxy_forwards_tickets_with_cors_headers() {
    let (upstream, seen) = fake_upstream(200, r#"[{"ticketReference":"T-1"}]"#);
    let proxy = CorsProxy::new(upstream, Duration::from_secs(5));

    let reply = proxy.handle(&Method::Get, "/api/tickets?limit=5");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, br#"[{"ticketReference":"T-1"}]"#.to_vec());
    assert_eq!(reply.header("Access-Control-Allow-Origin"), Some("*"));
    assert_eq!(reply.header("Content-Type"), Some("application/json"));
    assert_eq!(
        seen.recv_timeout(Duration::from_secs(5)).unwrap(),
        "/crmserver/api/tickets?limit=5"
    );
}

#[test]
fn proxy_passes_upstream_error_status_through() {
    let (upstream, _seen) = fake_upstream(404, r#"{"error":"missing"}"#);
    let proxy = CorsProxy::new(upstream, Duration::from_secs(5));

    let reply = proxy.handle(&Method::Get, "/api/tickets/T-404");
    assert_eq!(reply.status, 404);
    assert_eq!(reply.body, br#"{"error":"missing"}"#.to_vec());
    assert_eq!(reply.header("Access-Control-Allow-Origin"), Some("*"));
}
