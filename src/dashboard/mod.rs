//! Dashboard state container.
//!
//! Owns the ticket store, the product-company selection, the view state and
//! the renderer. Every entry point (web handler or CLI command) drives the
//! dashboard through the operations here:
//!
//! - `load_dashboard` fetches, replaces the store and renders everything
//! - `apply_filters` recomputes the filtered list and re-renders only it
//! - `select_product_company` re-renders only the product panel
//! - `open_ticket` and `update_ticket_status` serve the detail view

pub mod metrics;

use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::api::TicketSource;
use crate::error::{DashboardError, FetchError};
use crate::render::charts::{ChartSurface, ViewSurface};
use crate::render::{self, DashboardView, Renderer};
use crate::tickets::{FilterSelection, Generation, Ticket, TicketStore};

/// Description shown in the detail view when the ticket has none.
pub const NO_DESCRIPTION_PROVIDED: &str = "No description provided";

/// What the dashboard page currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum ViewState {
    Loading,
    Content,
    Error(String),
}

/// Read-only ticket detail for the modal and `resolvx show`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketDetail {
    pub reference: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub company: String,
    pub priority: String,
    pub status: String,
    pub created_at: String,
    pub issue_description: String,
}

impl From<&Ticket> for TicketDetail {
    fn from(ticket: &Ticket) -> Self {
        Self {
            reference: ticket.reference().to_string(),
            customer_name: ticket.customer_name().to_string(),
            customer_email: ticket.customer_email().to_string(),
            customer_phone: ticket.customer_phone().to_string(),
            company: ticket.company().to_string(),
            priority: ticket.display_priority().to_string(),
            status: ticket.status().to_string(),
            created_at: ticket.display_created_at(),
            issue_description: ticket
                .issue_description
                .clone()
                .unwrap_or_else(|| NO_DESCRIPTION_PROVIDED.to_string()),
        }
    }
}

#[derive(Debug)]
pub struct Dashboard<S: ChartSurface = ViewSurface> {
    store: TicketStore,
    product_company: Option<String>,
    state: ViewState,
    renderer: Renderer<S>,
    view: Option<DashboardView>,
}

impl Dashboard<ViewSurface> {
    pub fn new() -> Self {
        Self::with_surface(ViewSurface::new())
    }
}

impl Default for Dashboard<ViewSurface> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ChartSurface> Dashboard<S> {
    pub fn with_surface(surface: S) -> Self {
        Self {
            store: TicketStore::new(),
            product_company: None,
            state: ViewState::Loading,
            renderer: Renderer::new(surface),
            view: None,
        }
    }

    /// Fetch tickets and render the whole dashboard.
    ///
    /// On failure the view switches to the error state. The store and the
    /// last rendered view are left as they were.
    pub fn load_dashboard(&mut self, source: &dyn TicketSource, timeout: Duration) -> &ViewState {
        let generation = self.begin_load();
        let result = source.fetch_tickets(timeout);
        self.finish_load(generation, result);
        &self.state
    }

    /// Enter the loading state and reserve a generation for the fetch.
    pub fn begin_load(&mut self) -> Generation {
        self.state = ViewState::Loading;
        self.store.begin_fetch()
    }

    /// Apply the outcome of a fetch started with [`Self::begin_load`].
    ///
    /// Returns `false` when the result was superseded by a newer fetch and
    /// therefore ignored.
    pub fn finish_load(
        &mut self,
        generation: Generation,
        result: Result<Vec<Ticket>, FetchError>,
    ) -> bool {
        if !self.store.is_current(generation) {
            warn!(generation = generation.value(), "ignoring result of superseded fetch");
            return false;
        }

        match result {
            Ok(tickets) => {
                info!(count = tickets.len(), "dashboard loaded");
                self.store.replace(generation, tickets);
                self.render_all();
            }
            Err(e) => {
                error!(error = %e, "error loading dashboard");
                self.state = ViewState::Error(e.user_message());
            }
        }
        true
    }

    fn render_all(&mut self) {
        match self.renderer.render(&self.store, self.product_company.as_deref()) {
            Ok(view) => {
                self.view = Some(view);
                self.state = ViewState::Content;
            }
            Err(e) => self.render_failed(e),
        }
    }

    fn render_failed(&mut self, e: crate::error::RenderError) {
        error!(error = %e, "error rendering dashboard");
        self.renderer.clear_charts();
        self.view = None;
        self.state = ViewState::Error(format!("Error rendering dashboard: {e}"));
    }

    /// Change the list filters. Only the ticket list is re-rendered.
    pub fn apply_filters(&mut self, selection: FilterSelection) {
        self.store.apply_filters(selection);
        if let Some(view) = self.view.as_mut() {
            view.tickets = render::ticket_list(self.store.filtered_tickets());
            view.filters = render::filter_panel(&self.store, self.product_company.as_deref());
        }
    }

    /// Change the product-analysis company. Only that panel is re-rendered.
    pub fn select_product_company(&mut self, company: Option<String>) {
        self.product_company = company.filter(|c| !c.is_empty());
        if self.view.is_none() {
            return;
        }

        let panel = self
            .renderer
            .render_products(self.store.all_tickets(), self.product_company.as_deref());
        match panel {
            Ok(products) => {
                if let Some(view) = self.view.as_mut() {
                    view.products = products;
                    view.filters.product_company = self.product_company.clone();
                }
            }
            Err(e) => self.render_failed(e),
        }
    }

    /// Detail of the ticket with the given display reference.
    pub fn open_ticket(&self, reference: &str) -> Option<TicketDetail> {
        self.store.find(reference).map(TicketDetail::from)
    }

    /// Ticket status changes have no backend yet. Always returns
    /// [`DashboardError::StatusUpdateUnsupported`] and changes nothing.
    pub fn update_ticket_status(&self, reference: &str, new_status: &str) -> Result<(), DashboardError> {
        info!(reference, new_status, "status update requested");
        Err(DashboardError::StatusUpdateUnsupported {
            reference: reference.to_string(),
            status: new_status.to_string(),
        })
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Whether no load has been attempted yet. A failed load counts as an
    /// attempt; only an explicit refresh fetches again.
    pub fn needs_initial_load(&self) -> bool {
        self.state == ViewState::Loading && !self.store.is_loaded()
    }

    pub fn view(&self) -> Option<&DashboardView> {
        self.view.as_ref()
    }

    pub fn store(&self) -> &TicketStore {
        &self.store
    }
}
