//! Analytics reporter: aggregation over the fetched ticket list.
//!
//! Pure functions from a ticket slice to summary structures:
//! - **Summary**: headline counts for the cards and the metrics bar
//! - **Company metrics**: per-company priority breakdown
//! - **Priority distribution**: HIGH / MEDIUM / LOW counts
//! - **Top customers**: customers with the most high-priority tickets

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::tickets::model::{Priority, Ticket, UNKNOWN};

/// Company label used when a ticket names no company.
pub const GENERAL_COMPANY: &str = "General";

/// Grouping key for high-priority tickets without a customer email.
pub const UNKNOWN_EMAIL: &str = "unknown";

/// Maximum entries in the top-customers list.
pub const TOP_CUSTOMERS_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// Summary counts
// ---------------------------------------------------------------------------

/// Headline counts shown on the summary cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_tickets: usize,
    pub high_priority: usize,
    pub resolved: usize,
    pub companies: usize,
}

pub fn compute_summary(tickets: &[Ticket]) -> Summary {
    let companies: BTreeSet<&str> = tickets
        .iter()
        .map(Ticket::company)
        .filter(|c| *c != UNKNOWN)
        .collect();

    Summary {
        total_tickets: tickets.len(),
        high_priority: tickets
            .iter()
            .filter(|t| t.priority == Some(Priority::High))
            .count(),
        resolved: tickets.iter().filter(|t| t.is_resolved()).count(),
        companies: companies.len(),
    }
}

// ---------------------------------------------------------------------------
// Priority buckets
// ---------------------------------------------------------------------------

/// Ticket count with its priority breakdown.
///
/// Only exact HIGH/MEDIUM/LOW priorities land in a bucket, so
/// `high + medium + low` may be less than `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityBreakdown {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl PriorityBreakdown {
    pub fn record(&mut self, ticket: &Ticket) {
        self.total += 1;
        match ticket.priority {
            Some(Priority::High) => self.high += 1,
            Some(Priority::Medium) => self.medium += 1,
            Some(Priority::Low) => self.low += 1,
            None => {}
        }
    }
}

/// Group tickets by `key`, keeping first-seen order of the groups.
pub(crate) fn breakdown_by<'a, F>(
    tickets: impl IntoIterator<Item = &'a Ticket>,
    key: F,
) -> Vec<(String, PriorityBreakdown)>
where
    F: Fn(&Ticket) -> String,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, PriorityBreakdown)> = Vec::new();

    for ticket in tickets {
        let name = key(ticket);
        let slot = *index.entry(name.clone()).or_insert_with(|| {
            groups.push((name, PriorityBreakdown::default()));
            groups.len() - 1
        });
        groups[slot].1.record(ticket);
    }

    groups
}

// ---------------------------------------------------------------------------
// Company metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyMetric {
    pub company: String,
    #[serde(flatten)]
    pub counts: PriorityBreakdown,
}

/// Per-company totals in first-seen order. Tickets without a company are
/// grouped under [`GENERAL_COMPANY`].
pub fn compute_company_metrics(tickets: &[Ticket]) -> Vec<CompanyMetric> {
    breakdown_by(tickets, |t| {
        t.company.clone().unwrap_or_else(|| GENERAL_COMPANY.to_string())
    })
    .into_iter()
    .map(|(company, counts)| CompanyMetric { company, counts })
    .collect()
}

// ---------------------------------------------------------------------------
// Priority distribution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl PriorityDistribution {
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

pub fn compute_priority_distribution(tickets: &[Ticket]) -> PriorityDistribution {
    let mut breakdown = PriorityBreakdown::default();
    for ticket in tickets {
        breakdown.record(ticket);
    }
    PriorityDistribution {
        high: breakdown.high,
        medium: breakdown.medium,
        low: breakdown.low,
    }
}

// ---------------------------------------------------------------------------
// Top high-priority customers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerStat {
    pub name: String,
    pub email: String,
    pub count: usize,
    /// Distinct known companies, in first-seen order.
    pub companies: Vec<String>,
}

/// Customers ranked by number of HIGH tickets, at most
/// [`TOP_CUSTOMERS_LIMIT`] entries.
///
/// Customers are keyed by email. Ties keep first-seen order.
pub fn compute_top_customers(tickets: &[Ticket]) -> Vec<CustomerStat> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut customers: Vec<CustomerStat> = Vec::new();

    for ticket in tickets.iter().filter(|t| t.priority == Some(Priority::High)) {
        let email = ticket
            .customer_email
            .clone()
            .unwrap_or_else(|| UNKNOWN_EMAIL.to_string());

        let slot = *index.entry(email.clone()).or_insert_with(|| {
            customers.push(CustomerStat {
                name: ticket.customer_name().to_string(),
                email,
                count: 0,
                companies: Vec::new(),
            });
            customers.len() - 1
        });

        let customer = &mut customers[slot];
        customer.count += 1;
        let company = ticket.company();
        if company != UNKNOWN && !customer.companies.iter().any(|c| c == company) {
            customer.companies.push(company.to_string());
        }
    }

    customers.sort_by(|a, b| b.count.cmp(&a.count));
    customers.truncate(TOP_CUSTOMERS_LIMIT);
    customers
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ticket(value: serde_json::Value) -> Ticket {
        Ticket::from_json(&value)
    }

    fn sample() -> Vec<Ticket> {
        vec![
            ticket(json!({ "companyName": "Acme", "priority": "HIGH", "status": "open" })),
            ticket(json!({ "companyName": "Acme", "priority": "low", "status": "resolved" })),
            ticket(json!({ "company": "Globex", "priority": "MEDIUM", "status": "CLOSED" })),
            ticket(json!({ "priority": "HIGH" })),
            ticket(json!({ "companyName": "Unknown", "priority": "urgent" })),
        ]
    }

    #[test]
    fn summary_counts() {
        let summary = compute_summary(&sample());
        assert_eq!(
            summary,
            Summary {
                total_tickets: 5,
                high_priority: 2,
                resolved: 2,
                companies: 2,
            }
        );
    }

    #[test]
    fn summary_of_empty_list_is_zero() {
        assert_eq!(compute_summary(&[]), Summary::default());
    }

    #[test]
    fn company_metrics_group_missing_company_under_general() {
        let metrics = compute_company_metrics(&sample());
        let names: Vec<&str> = metrics.iter().map(|m| m.company.as_str()).collect();
        assert_eq!(names, vec!["Acme", "Globex", "General", "Unknown"]);

        let acme = &metrics[0].counts;
        assert_eq!((acme.total, acme.high, acme.medium, acme.low), (2, 1, 0, 1));
    }

    #[test]
    fn company_totals_are_conserved() {
        let tickets = sample();
        let metrics = compute_company_metrics(&tickets);
        let sum: usize = metrics.iter().map(|m| m.counts.total).sum();
        assert_eq!(sum, tickets.len());
    }

    #[test]
    fn unrecognized_priority_counts_in_no_bucket() {
        let metrics = compute_company_metrics(&sample());
        let unknown = metrics.iter().find(|m| m.company == "Unknown").unwrap();
        assert_eq!(unknown.counts.total, 1);
        assert_eq!(unknown.counts.high + unknown.counts.medium + unknown.counts.low, 0);
    }

    #[test]
    fn priority_distribution_excludes_unrecognized_and_absent() {
        let mut tickets = sample();
        tickets.push(ticket(json!({})));
        let dist = compute_priority_distribution(&tickets);
        assert_eq!(dist, PriorityDistribution { high: 2, medium: 1, low: 1 });
        assert_eq!(dist.total(), 4);
    }

    #[test]
    fn top_customers_group_by_email_and_collect_companies() {
        let tickets = vec![
            ticket(json!({ "customerEmail": "a@x.io", "customerName": "Ann", "companyName": "Acme", "priority": "HIGH" })),
            ticket(json!({ "customer_email": "a@x.io", "companyName": "Globex", "priority": "high" })),
            ticket(json!({ "customerEmail": "a@x.io", "companyName": "Acme", "priority": "HIGH" })),
            ticket(json!({ "customerEmail": "b@x.io", "priority": "HIGH" })),
            ticket(json!({ "customerEmail": "c@x.io", "priority": "LOW" })),
        ];
        let top = compute_top_customers(&tickets);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].email, "a@x.io");
        assert_eq!(top[0].name, "Ann");
        assert_eq!(top[0].count, 3);
        assert_eq!(top[0].companies, vec!["Acme", "Globex"]);
        assert_eq!(top[1].email, "b@x.io");
        assert!(top[1].companies.is_empty());
    }

    #[test]
    fn top_customers_missing_email_grouped_as_unknown() {
        let tickets = vec![
            ticket(json!({ "priority": "HIGH" })),
            ticket(json!({ "priority": "HIGH" })),
        ];
        let top = compute_top_customers(&tickets);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].email, "unknown");
        assert_eq!(top[0].name, "Unknown");
        assert_eq!(top[0].count, 2);
    }

    #[test]
    fn top_customers_capped_at_ten() {
        let tickets: Vec<Ticket> = (0..15)
            .map(|i| ticket(json!({ "customerEmail": format!("c{i}@x.io"), "priority": "HIGH" })))
            .collect();
        let top = compute_top_customers(&tickets);
        assert_eq!(top.len(), 10);
        assert!(top.iter().all(|c| c.count == 1));
    }

    #[test]
    fn top_customers_sorted_descending() {
        let mut tickets = vec![ticket(json!({ "customerEmail": "once@x.io", "priority": "HIGH" }))];
        for _ in 0..3 {
            tickets.push(ticket(json!({ "customerEmail": "thrice@x.io", "priority": "HIGH" })));
        }
        let top = compute_top_customers(&tickets);
        assert_eq!(top[0].email, "thrice@x.io");
        assert_eq!(top[1].email, "once@x.io");
    }
}
