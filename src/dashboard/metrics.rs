/// Landing-page metrics bar.
///
/// Three counters refreshed on an interval, independently of the dashboard
/// store. A failed refresh degrades every counter to the `-` placeholder.
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::analytics::reporter;
use crate::api::TicketSource;
use crate::tickets::Ticket;

/// Shown in place of a counter that could not be loaded.
pub const PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricCounters {
    pub total_tickets: Option<usize>,
    pub high_priority: Option<usize>,
    pub resolved: Option<usize>,
}

impl MetricCounters {
    /// All counters unavailable.
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        let summary = reporter::compute_summary(tickets);
        Self {
            total_tickets: Some(summary.total_tickets),
            high_priority: Some(summary.high_priority),
            resolved: Some(summary.resolved),
        }
    }
}

/// Render one counter, `-` when unavailable.
pub fn display(value: Option<usize>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| v.to_string())
}

/// Fetch tickets and compute the counters. Never fails.
pub fn load_dashboard_metrics(source: &dyn TicketSource, timeout: Duration) -> MetricCounters {
    match source.fetch_tickets(timeout) {
        Ok(tickets) => {
            let counters = MetricCounters::from_tickets(&tickets);
            debug!(?counters, "metrics refreshed");
            counters
        }
        Err(e) => {
            warn!(error = %e, "metrics refresh failed");
            MetricCounters::placeholder()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use serde_json::json;

    struct Fixed(Result<Vec<Ticket>, FetchError>);

    impl TicketSource for Fixed {
        fn fetch_tickets(&self, _timeout: Duration) -> Result<Vec<Ticket>, FetchError> {
            self.0.clone()
        }
    }

    #[test]
    fn counters_from_fetched_tickets() {
        let tickets = [
            json!({ "priority": "HIGH", "status": "OPEN" }),
            json!({ "priority": "HIGH", "status": "closed" }),
            json!({ "priority": "LOW" }),
        ]
        .iter()
        .map(Ticket::from_json)
        .collect();

        let counters = load_dashboard_metrics(&Fixed(Ok(tickets)), Duration::from_secs(1));
        assert_eq!(
            counters,
            MetricCounters {
                total_tickets: Some(3),
                high_priority: Some(2),
                resolved: Some(1),
            }
        );
    }

    #[test]
    fn failure_degrades_to_placeholders() {
        let counters = load_dashboard_metrics(&Fixed(Err(FetchError::Timeout)), Duration::from_secs(1));
        assert_eq!(counters, MetricCounters::placeholder());
        assert_eq!(display(counters.total_tickets), "-");
        assert_eq!(display(Some(7)), "7");
    }
}
