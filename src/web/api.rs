//! JSON API handlers for the web server.
//!
//! Each handler corresponds to an API endpoint and returns a [`Reply`] with
//! JSON content.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::complaint::{self, ComplaintForm, ComposedMail};
use crate::dashboard::metrics::{self, MetricCounters};
use crate::dashboard::ViewState;
use crate::render::DashboardView;
use crate::tickets::{CompanyFilter, FilterSelection, PriorityFilter};

use super::{Reply, WebState};

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct DashboardResponse<'a> {
    view_state: &'a ViewState,
    view: Option<&'a DashboardView>,
}

#[derive(Serialize)]
struct MetricsResponse {
    counters: MetricCounters,
    refresh_interval_secs: u64,
}

#[derive(Serialize)]
struct ComplaintResponse {
    message: &'static str,
    mail: ComposedMail,
}

#[derive(Deserialize)]
struct StatusUpdateRequest {
    status: String,
}

/// Config API response: the effective config as JSON plus its TOML text.
#[derive(Serialize)]
struct ConfigResponse<'a> {
    config: &'a crate::config::ResolvxConfig,
    toml_text: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn json_response<T: Serialize>(status: u16, data: &T) -> Result<Reply> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Reply::json(status, body))
}

/// Extract and percent-decode a query parameter from a URL.
///
/// A key without `=` yields an empty value; `+` decodes to a space.
pub fn query_param(url: &str, key: &str) -> Option<String> {
    url.split_once('?')?.1.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        if k != key {
            return None;
        }
        let v = v.replace('+', " ");
        Some(match urlencoding::decode(&v) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => v.clone(),
        })
    })
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// Load the dashboard on first use. After a failed load only an explicit
/// `refresh` fetches again.
fn ensure_loaded(state: &mut WebState) {
    if state.dashboard.needs_initial_load() {
        let timeout = state.config.api.dashboard_timeout();
        state.dashboard.load_dashboard(state.source.as_ref(), timeout);
    }
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/dashboard?refresh&priority=..&company=..&product_company=..`
pub fn get_dashboard(state: &mut WebState, url: &str) -> Result<Reply> {
    if query_param(url, "refresh").is_some() {
        let timeout = state.config.api.dashboard_timeout();
        state.dashboard.load_dashboard(state.source.as_ref(), timeout);
    } else {
        ensure_loaded(state);
    }

    let priority = query_param(url, "priority");
    let company = query_param(url, "company");
    if priority.is_some() || company.is_some() {
        let current = state.dashboard.store().filters().clone();
        let priority = match priority {
            Some(p) => match p.parse::<PriorityFilter>() {
                Ok(filter) => filter,
                Err(e) => return Ok(Reply::json_error(400, &e)),
            },
            None => current.priority,
        };
        let company = company.map_or(current.company, |c| CompanyFilter::parse(&c));
        debug!(%priority, %company, "applying filters");
        state.dashboard.apply_filters(FilterSelection { priority, company });
    }

    if let Some(product_company) = query_param(url, "product_company") {
        state.dashboard.select_product_company(Some(product_company));
    }

    json_response(
        200,
        &DashboardResponse {
            view_state: state.dashboard.state(),
            view: state.dashboard.view(),
        },
    )
}

/// `GET /api/tickets/<reference>`
pub fn get_ticket(state: &mut WebState, reference: &str) -> Result<Reply> {
    ensure_loaded(state);
    let reference = decode_segment(reference);
    match state.dashboard.open_ticket(&reference) {
        Some(detail) => json_response(200, &detail),
        None => Ok(Reply::json_error(404, &format!("ticket {reference} not found"))),
    }
}

/// `POST /api/tickets/<reference>/status`
///
/// Always `501 Not Implemented`: the CRM API has no update endpoint.
pub fn post_ticket_status(state: &mut WebState, reference: &str, body: &str) -> Result<Reply> {
    let Ok(request) = serde_json::from_str::<StatusUpdateRequest>(body) else {
        return Ok(Reply::json_error(400, "expected JSON body {\"status\": \"...\"}"));
    };
    let reference = decode_segment(reference);

    match state.dashboard.update_ticket_status(&reference, &request.status) {
        Ok(()) => json_response(200, &serde_json::json!({ "message": "status updated" })),
        Err(e) => Ok(Reply::json_error(501, &e.to_string())),
    }
}

/// `GET /api/metrics`: counters for the landing-page metrics bar.
pub fn get_metrics(state: &mut WebState) -> Result<Reply> {
    let counters = metrics::load_dashboard_metrics(state.source(), state.config.api.metrics_timeout());
    json_response(
        200,
        &MetricsResponse {
            counters,
            refresh_interval_secs: state.config.api.metrics_interval_secs,
        },
    )
}

/// `POST /api/complaint`: validate the form and build compose links.
pub fn post_complaint(state: &mut WebState, body: &str) -> Result<Reply> {
    let form: ComplaintForm = match serde_json::from_str(body) {
        Ok(form) => form,
        Err(_) => return Ok(Reply::json_error(400, "invalid JSON in complaint request")),
    };

    match form.validate() {
        Ok(complaint) => json_response(
            200,
            &ComplaintResponse {
                message: complaint::SUCCESS_MESSAGE,
                mail: complaint.compose(&state.config.complaint),
            },
        ),
        Err(e) => Ok(Reply::json_error(400, &e.to_string())),
    }
}

/// `GET /api/config`: current effective configuration.
pub fn get_config(state: &mut WebState) -> Result<Reply> {
    let toml_text = toml::to_string_pretty(&state.config).context("failed to render config as TOML")?;
    json_response(
        200,
        &ConfigResponse {
            config: &state.config,
            toml_text,
        },
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_param_extracts_value() {
        assert_eq!(query_param("/api/dashboard?priority=HIGH", "priority").as_deref(), Some("HIGH"));
        assert_eq!(
            query_param("/api/dashboard?x=1&company=Acme%20%26%20Co", "company").as_deref(),
            Some("Acme & Co")
        );
        assert_eq!(query_param("/api/dashboard?company=Big+Corp", "company").as_deref(), Some("Big Corp"));
    }

    #[test]
    fn query_param_flag_without_value() {
        assert_eq!(query_param("/api/dashboard?refresh", "refresh").as_deref(), Some(""));
    }

    #[test]
    fn query_param_missing() {
        assert_eq!(query_param("/api/dashboard", "refresh"), None);
        assert_eq!(query_param("/api/dashboard?foo=bar", "refresh"), None);
    }

    #[test]
    fn status_request_deserializes() {
        let req: StatusUpdateRequest = serde_json::from_str(r#"{"status":"RESOLVED"}"#).unwrap();
        assert_eq!(req.status, "RESOLVED");
    }
}
