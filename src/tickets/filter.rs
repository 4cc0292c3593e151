/// Filter and display-order logic for the ticket list.
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::model::{Priority, Ticket, UNKNOWN};

/// Selector value meaning "no restriction".
pub const ALL: &str = "all";

/// Priority selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

impl FromStr for PriorityFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.eq_ignore_ascii_case(ALL) {
            return Ok(Self::All);
        }
        Priority::parse(s)
            .map(Self::Only)
            .ok_or_else(|| format!("unknown priority filter '{s}' (expected all, HIGH, MEDIUM or LOW)"))
    }
}

impl fmt::Display for PriorityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL),
            Self::Only(p) => write!(f, "{p}"),
        }
    }
}

/// Company selector. Named companies match exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CompanyFilter {
    #[default]
    All,
    Named(String),
}

impl CompanyFilter {
    pub fn parse(s: &str) -> Self {
        if s.is_empty() || s == ALL {
            Self::All
        } else {
            Self::Named(s.to_string())
        }
    }
}

impl fmt::Display for CompanyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Current state of the two list selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub priority: PriorityFilter,
    pub company: CompanyFilter,
}

impl FilterSelection {
    fn matches(&self, ticket: &Ticket) -> bool {
        let priority_match = match self.priority {
            PriorityFilter::All => true,
            PriorityFilter::Only(p) => ticket.priority == Some(p),
        };
        let company_match = match &self.company {
            CompanyFilter::All => true,
            CompanyFilter::Named(name) => ticket.company() == name,
        };
        priority_match && company_match
    }
}

/// Return the subset of `tickets` matching `selection`, in source order.
pub fn apply(tickets: &[Ticket], selection: &FilterSelection) -> Vec<Ticket> {
    tickets
        .iter()
        .filter(|t| selection.matches(t))
        .cloned()
        .collect()
}

/// Display order: priority rank descending, then newest first.
///
/// Tickets without a parseable timestamp sort as the oldest. The sort is
/// stable, so fully tied tickets keep their source order.
pub fn display_order(a: &Ticket, b: &Ticket) -> Ordering {
    b.priority_rank()
        .cmp(&a.priority_rank())
        .then_with(|| b.created_at_millis().cmp(&a.created_at_millis()))
}

/// Sorted copy of `tickets` in display order.
pub fn sorted_for_display(tickets: &[Ticket]) -> Vec<&Ticket> {
    let mut sorted: Vec<&Ticket> = tickets.iter().collect();
    sorted.sort_by(|a, b| display_order(a, b));
    sorted
}

/// Options offered by the company selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub companies: Vec<String>,
}

/// Sorted distinct company names, excluding the `Unknown` placeholder.
pub fn company_options(tickets: &[Ticket]) -> FilterOptions {
    let companies: BTreeSet<&str> = tickets
        .iter()
        .map(Ticket::company)
        .filter(|c| *c != UNKNOWN)
        .collect();
    FilterOptions {
        companies: companies.into_iter().map(str::to_string).collect(),
    }
}
