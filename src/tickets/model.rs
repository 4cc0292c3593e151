/// Canonical ticket record and the normalizer that builds it.
///
/// The CRM API is inconsistent about field naming: the same concept may
/// arrive as `companyName`, `company_name` or `company`, and any field may be
/// missing entirely. Every ticket is normalized exactly once, at ingestion,
/// into a [`Ticket`]. Downstream code never looks at raw JSON keys.
///
/// Absent values stay `None` in the record. The display defaults
/// (`"Unknown"`, `"N/A"`, `"OPEN"`, `"MEDIUM"`, `"No description"`) are
/// applied by the accessor methods so that aggregation can still tell a
/// missing company from a company literally named "Unknown".
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Display defaults
// ---------------------------------------------------------------------------

pub const UNKNOWN: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "N/A";
pub const DEFAULT_STATUS: &str = "OPEN";
pub const DEFAULT_DESCRIPTION: &str = "No description";

// ---------------------------------------------------------------------------
// Source key aliases
// ---------------------------------------------------------------------------

const REFERENCE_KEYS: &[&str] = &["ticketReference", "ticket_reference", "reference", "id"];
const CUSTOMER_NAME_KEYS: &[&str] = &["customerName", "customer_name"];
const CUSTOMER_EMAIL_KEYS: &[&str] = &["customerEmail", "customer_email"];
const CUSTOMER_PHONE_KEYS: &[&str] = &[
    "customerPhoneNumber",
    "customerPhone",
    "customer_phone_number",
    "customer_phone",
];
const COMPANY_KEYS: &[&str] = &["companyName", "company_name", "company"];
const PRIORITY_KEYS: &[&str] = &["priority"];
const STATUS_KEYS: &[&str] = &["status"];
const DESCRIPTION_KEYS: &[&str] = &["issueDescription", "issue_description"];
const CREATED_AT_KEYS: &[&str] = &["createdAt", "created_at"];

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Ticket severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Parse a priority case-insensitively. Returns `None` for anything other
    /// than HIGH, MEDIUM or LOW.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "HIGH" => Some(Self::High),
            "MEDIUM" => Some(Self::Medium),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }

    /// Severity rank used for display ordering.
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Ticket
// ---------------------------------------------------------------------------

/// A single customer support request, normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticket {
    pub reference: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub company: Option<String>,
    /// Recognized priority, `None` when absent or unrecognized.
    pub priority: Option<Priority>,
    /// Upper-cased priority text as received, kept for display of
    /// unrecognized values.
    pub priority_label: Option<String>,
    pub status: Option<String>,
    pub issue_description: Option<String>,
    /// Parsed creation time, `None` when missing or unparseable.
    pub created_at: Option<DateTime<Utc>>,
    /// Creation time text as received.
    pub created_at_raw: Option<String>,
}

impl Ticket {
    /// Normalize one raw JSON value into a ticket.
    ///
    /// Non-object values produce a ticket with every field absent, so the
    /// ticket count of a payload is always preserved.
    pub fn from_json(raw: &Value) -> Self {
        let priority_label = first_text(raw, PRIORITY_KEYS).map(|p| p.to_ascii_uppercase());
        let created_at_raw = first_text(raw, CREATED_AT_KEYS);

        Self {
            reference: first_text(raw, REFERENCE_KEYS),
            customer_name: first_text(raw, CUSTOMER_NAME_KEYS),
            customer_email: first_text(raw, CUSTOMER_EMAIL_KEYS),
            customer_phone: first_text(raw, CUSTOMER_PHONE_KEYS),
            company: first_text(raw, COMPANY_KEYS),
            priority: priority_label.as_deref().and_then(Priority::parse),
            priority_label,
            status: first_text(raw, STATUS_KEYS),
            issue_description: first_text(raw, DESCRIPTION_KEYS),
            created_at: created_at_raw.as_deref().and_then(parse_timestamp),
            created_at_raw,
        }
    }

    pub fn reference(&self) -> &str {
        self.reference.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn customer_name(&self) -> &str {
        self.customer_name.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn customer_email(&self) -> &str {
        self.customer_email.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn customer_phone(&self) -> &str {
        self.customer_phone.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn company(&self) -> &str {
        self.company.as_deref().unwrap_or(UNKNOWN)
    }

    /// Priority as displayed: the upper-cased source value, or `MEDIUM`
    /// when absent.
    pub fn display_priority(&self) -> &str {
        self.priority_label
            .as_deref()
            .unwrap_or(Priority::Medium.as_str())
    }

    /// Sort rank: 3/2/1 for HIGH/MEDIUM/LOW, 0 for absent or unrecognized.
    pub fn priority_rank(&self) -> u8 {
        self.priority.map(Priority::rank).unwrap_or(0)
    }

    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or(DEFAULT_STATUS)
    }

    /// Whether the status is RESOLVED or CLOSED, case-insensitively.
    pub fn is_resolved(&self) -> bool {
        let status = self.status.as_deref().unwrap_or("");
        status.eq_ignore_ascii_case("RESOLVED") || status.eq_ignore_ascii_case("CLOSED")
    }

    pub fn issue_description(&self) -> &str {
        self.issue_description
            .as_deref()
            .unwrap_or(DEFAULT_DESCRIPTION)
    }

    /// Creation time in epoch milliseconds, 0 when unknown.
    pub fn created_at_millis(&self) -> i64 {
        self.created_at.map(|t| t.timestamp_millis()).unwrap_or(0)
    }

    /// Creation time formatted for display.
    ///
    /// Unparseable source text is shown verbatim; missing values show `N/A`.
    pub fn display_created_at(&self) -> String {
        match (&self.created_at, &self.created_at_raw) {
            (Some(ts), _) => ts.format("%Y-%m-%d %H:%M").to_string(),
            (None, Some(raw)) => raw.clone(),
            (None, None) => NOT_AVAILABLE.to_string(),
        }
    }
}

/// Normalize a list of raw values.
pub fn normalize_all(raw: &[Value]) -> Vec<Ticket> {
    raw.iter().map(Ticket::from_json).collect()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Return the first non-empty textual value among `keys`.
///
/// Strings are taken as-is, numbers and booleans are rendered. Empty
/// strings, nulls, arrays and objects count as absent.
fn first_text(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match raw.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Parse the timestamp formats the CRM has been seen to emit.
///
/// Naive values are interpreted as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_use_display_defaults() {
        let ticket = Ticket::from_json(&json!({}));
        assert_eq!(ticket.reference(), "N/A");
        assert_eq!(ticket.customer_name(), "Unknown");
        assert_eq!(ticket.customer_email(), "N/A");
        assert_eq!(ticket.customer_phone(), "N/A");
        assert_eq!(ticket.company(), "Unknown");
        assert_eq!(ticket.display_priority(), "MEDIUM");
        assert_eq!(ticket.status(), "OPEN");
        assert_eq!(ticket.issue_description(), "No description");
        assert_eq!(ticket.display_created_at(), "N/A");
        assert_eq!(ticket.priority_rank(), 0);
    }

    #[test]
    fn camel_and_snake_case_map_to_same_record() {
        let camel = Ticket::from_json(&json!({
            "ticketReference": "T-1",
            "customerName": "Ada",
            "customerEmail": "ada@example.com",
            "customerPhoneNumber": "555",
            "companyName": "Acme",
            "issueDescription": "Broken",
            "createdAt": "2024-05-01T10:00:00Z",
        }));
        let snake = Ticket::from_json(&json!({
            "ticket_reference": "T-1",
            "customer_name": "Ada",
            "customer_email": "ada@example.com",
            "customer_phone": "555",
            "company": "Acme",
            "issue_description": "Broken",
            "created_at": "2024-05-01T10:00:00Z",
        }));
        assert_eq!(camel, snake);
    }

    #[test]
    fn camel_case_wins_over_snake_case() {
        let ticket = Ticket::from_json(&json!({
            "companyName": "Primary",
            "company": "Secondary",
        }));
        assert_eq!(ticket.company(), "Primary");
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let ticket = Ticket::from_json(&json!({ "companyName": "", "company": "Fallback" }));
        assert_eq!(ticket.company(), "Fallback");

        let ticket = Ticket::from_json(&json!({ "status": "" }));
        assert_eq!(ticket.status(), "OPEN");
    }

    #[test]
    fn numeric_id_becomes_reference() {
        let ticket = Ticket::from_json(&json!({ "id": 42 }));
        assert_eq!(ticket.reference(), "42");
    }

    #[test]
    fn priority_is_case_insensitive() {
        let ticket = Ticket::from_json(&json!({ "priority": "high" }));
        assert_eq!(ticket.priority, Some(Priority::High));
        assert_eq!(ticket.display_priority(), "HIGH");
        assert_eq!(ticket.priority_rank(), 3);
    }

    #[test]
    fn unrecognized_priority_has_rank_zero_and_keeps_label() {
        let ticket = Ticket::from_json(&json!({ "priority": "urgent" }));
        assert_eq!(ticket.priority, None);
        assert_eq!(ticket.display_priority(), "URGENT");
        assert_eq!(ticket.priority_rank(), 0);
    }

    #[test]
    fn resolved_matches_resolved_and_closed() {
        for status in ["RESOLVED", "resolved", "Closed"] {
            let ticket = Ticket::from_json(&json!({ "status": status }));
            assert!(ticket.is_resolved(), "{status} should count as resolved");
        }
        let ticket = Ticket::from_json(&json!({ "status": "IN_PROGRESS" }));
        assert!(!ticket.is_resolved());
        assert!(!Ticket::from_json(&json!({})).is_resolved());
    }

    #[test]
    fn non_object_values_normalize_to_defaults() {
        let ticket = Ticket::from_json(&json!("not a ticket"));
        assert_eq!(ticket.company(), "Unknown");
    }

    #[test]
    fn parse_timestamp_accepts_common_formats() {
        assert!(parse_timestamp("2024-05-01T10:00:00Z").is_some());
        assert!(parse_timestamp("2024-05-01T10:00:00+02:00").is_some());
        assert!(parse_timestamp("2024-05-01T10:00:00.123456").is_some());
        assert!(parse_timestamp("2024-05-01 10:00:00").is_some());
        assert!(parse_timestamp("2024-05-01").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn invalid_timestamp_sorts_as_epoch_and_displays_raw() {
        let ticket = Ticket::from_json(&json!({ "createdAt": "not-a-date" }));
        assert_eq!(ticket.created_at_millis(), 0);
        assert_eq!(ticket.display_created_at(), "not-a-date");
    }
}
