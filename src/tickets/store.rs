/// In-memory ticket store.
///
/// Holds the full fetched ticket list and the currently filtered subset.
/// The full list is replaced wholesale by each successful fetch and left
/// untouched by failed ones.
///
/// Fetches are tagged with a [`Generation`]. Only the most recently issued
/// generation may write to the store, so a slow fetch that finishes after a
/// newer one was started cannot overwrite fresher data.
use tracing::{debug, warn};

use super::filter::{self, FilterSelection};
use super::model::Ticket;

/// Monotonically increasing fetch identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct TicketStore {
    all_tickets: Vec<Ticket>,
    filtered_tickets: Vec<Ticket>,
    filters: FilterSelection,
    latest_issued: u64,
    loaded: bool,
}

impl TicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a generation for a fetch that is about to start.
    pub fn begin_fetch(&mut self) -> Generation {
        self.latest_issued += 1;
        Generation(self.latest_issued)
    }

    /// Whether `generation` is still the latest one issued.
    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.latest_issued
    }

    /// Replace the full ticket list with the result of a fetch.
    ///
    /// Returns `false` (and leaves the store untouched) when a newer fetch
    /// has been issued since `generation` was reserved.
    pub fn replace(&mut self, generation: Generation, tickets: Vec<Ticket>) -> bool {
        if !self.is_current(generation) {
            warn!(
                generation = generation.0,
                latest = self.latest_issued,
                "discarding superseded ticket fetch"
            );
            return false;
        }

        debug!(generation = generation.0, count = tickets.len(), "ticket store replaced");
        self.all_tickets = tickets;
        self.loaded = true;
        self.refilter();
        true
    }

    /// Change the active filters and recompute the filtered subset.
    pub fn apply_filters(&mut self, selection: FilterSelection) {
        self.filters = selection;
        self.refilter();
    }

    fn refilter(&mut self) {
        self.filtered_tickets = filter::apply(&self.all_tickets, &self.filters);
    }

    pub fn all_tickets(&self) -> &[Ticket] {
        &self.all_tickets
    }

    pub fn filtered_tickets(&self) -> &[Ticket] {
        &self.filtered_tickets
    }

    pub fn filters(&self) -> &FilterSelection {
        &self.filters
    }

    /// Whether any fetch has ever succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Look up a ticket by its display reference.
    pub fn find(&self, reference: &str) -> Option<&Ticket> {
        self.all_tickets.iter().find(|t| t.reference() == reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tickets::filter::{CompanyFilter, PriorityFilter};
    use crate::tickets::model::Priority;
    use serde_json::json;

    fn ticket(company: &str, priority: &str) -> Ticket {
        Ticket::from_json(&json!({ "companyName": company, "priority": priority }))
    }

    #[test]
    fn store_starts_empty() {
        let store = TicketStore::new();
        assert!(store.all_tickets().is_empty());
        assert!(store.filtered_tickets().is_empty());
        assert!(!store.is_loaded());
    }

    #[test]
    fn replace_with_current_generation_applies() {
        let mut store = TicketStore::new();
        let generation = store.begin_fetch();
        assert!(store.replace(generation, vec![ticket("Acme", "HIGH")]));
        assert_eq!(store.all_tickets().len(), 1);
        assert_eq!(store.filtered_tickets().len(), 1);
        assert!(store.is_loaded());
    }

    #[test]
    fn superseded_generation_is_discarded() {
        let mut store = TicketStore::new();
        let first = store.begin_fetch();
        let second = store.begin_fetch();

        assert!(store.replace(second, vec![ticket("Fresh", "LOW")]));
        assert!(!store.replace(first, vec![ticket("Stale", "HIGH"), ticket("Stale", "LOW")]));

        assert_eq!(store.all_tickets().len(), 1);
        assert_eq!(store.all_tickets()[0].company(), "Fresh");
    }

    #[test]
    fn generations_increase() {
        let mut store = TicketStore::new();
        let a = store.begin_fetch();
        let b = store.begin_fetch();
        assert!(b > a);
        assert!(!store.is_current(a));
        assert!(store.is_current(b));
    }

    #[test]
    fn filters_survive_refresh() {
        let mut store = TicketStore::new();
        store.apply_filters(FilterSelection {
            priority: PriorityFilter::Only(Priority::High),
            company: CompanyFilter::All,
        });
        let generation = store.begin_fetch();
        store.replace(generation, vec![ticket("Acme", "HIGH"), ticket("Acme", "LOW")]);
        assert_eq!(store.filtered_tickets().len(), 1);
    }

    #[test]
    fn find_by_reference() {
        let mut store = TicketStore::new();
        let generation = store.begin_fetch();
        store.replace(
            generation,
            vec![Ticket::from_json(&json!({ "ticketReference": "T-9" }))],
        );
        assert!(store.find("T-9").is_some());
        assert!(store.find("T-10").is_none());
    }
}
