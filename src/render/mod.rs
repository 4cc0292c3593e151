//! View rendering: store and aggregates in, serializable dashboard view out.
//!
//! The same [`DashboardView`] is served as JSON to the browser page and
//! printed by the CLI. Panels that can be empty carry an empty-state message
//! instead of empty data.

pub mod charts;

use serde::Serialize;
use tracing::debug;

use crate::analytics::products::{self, ProductAnalysis};
use crate::analytics::reporter::{self, CustomerStat, Summary};
use crate::error::RenderError;
use crate::tickets::filter::{self, FilterOptions};
use crate::tickets::{Ticket, TicketStore};

use charts::{ChartConfig, ChartHandle, ChartRegistry, ChartSlot, ChartSurface};

pub const NO_MATCHING_TICKETS: &str = "No tickets found matching the filters.";
pub const NO_COMPANY_DATA: &str = "No company data available";
pub const NO_HIGH_PRIORITY_CUSTOMERS: &str = "No high priority customers found.";
pub const SELECT_PRODUCT_COMPANY: &str = "Select a company to view product-wise ticket analysis";
pub const NO_COMPANY_TICKETS: &str = "No tickets found for this company.";

/// A view panel: either data or an empty-state message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum Panel<T> {
    Ready(T),
    Empty { message: String },
}

impl<T> Panel<T> {
    fn empty(message: &str) -> Self {
        Self::Empty {
            message: message.to_string(),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(data) => Some(data),
            Self::Empty { .. } => None,
        }
    }

    pub fn empty_message(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Empty { message } => Some(message),
        }
    }
}

/// A chart as shipped to the drawing side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub handle: ChartHandle,
    pub config: ChartConfig,
}

/// One row of the ticket list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketCard {
    pub reference: String,
    pub customer_name: String,
    pub customer_email: String,
    pub company: String,
    pub priority: String,
    pub status: String,
    pub issue_description: String,
    pub created_at: String,
}

impl From<&Ticket> for TicketCard {
    fn from(ticket: &Ticket) -> Self {
        Self {
            reference: ticket.reference().to_string(),
            customer_name: ticket.customer_name().to_string(),
            customer_email: ticket.customer_email().to_string(),
            company: ticket.company().to_string(),
            priority: ticket.display_priority().to_string(),
            status: ticket.status().to_string(),
            issue_description: ticket.issue_description().to_string(),
            created_at: ticket.display_created_at(),
        }
    }
}

/// Selector options plus the current selections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterPanel {
    #[serde(flatten)]
    pub options: FilterOptions,
    pub priority: String,
    pub company: String,
    pub product_company: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPanel {
    pub analysis: ProductAnalysis,
    pub chart: ChartView,
}

/// Everything the dashboard page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub summary: Summary,
    pub filters: FilterPanel,
    pub tickets: Panel<Vec<TicketCard>>,
    pub company_chart: Panel<ChartView>,
    pub priority_chart: ChartView,
    pub top_customers: Panel<Vec<CustomerStat>>,
    pub products: Panel<ProductPanel>,
}

/// Builds views and owns the chart handles of every slot.
#[derive(Debug)]
pub struct Renderer<S> {
    charts: ChartRegistry<S>,
}

impl<S: ChartSurface> Renderer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            charts: ChartRegistry::new(surface),
        }
    }

    pub fn charts(&self) -> &ChartRegistry<S> {
        &self.charts
    }

    /// Dispose of every chart, e.g. after a failed render pass.
    pub fn clear_charts(&mut self) {
        self.charts.clear_all();
    }

    /// Full render of the dashboard from the store.
    pub fn render(
        &mut self,
        store: &TicketStore,
        product_company: Option<&str>,
    ) -> Result<DashboardView, RenderError> {
        let all = store.all_tickets();

        let metrics = reporter::compute_company_metrics(all);
        let company_chart = if metrics.is_empty() {
            self.charts.clear(ChartSlot::Company);
            Panel::empty(NO_COMPANY_DATA)
        } else {
            Panel::Ready(self.chart(ChartSlot::Company, charts::company_chart(&metrics))?)
        };

        let distribution = reporter::compute_priority_distribution(all);
        let priority_chart = self.chart(ChartSlot::Priority, charts::priority_chart(&distribution))?;

        let customers = reporter::compute_top_customers(all);
        let top_customers = if customers.is_empty() {
            Panel::empty(NO_HIGH_PRIORITY_CUSTOMERS)
        } else {
            Panel::Ready(customers)
        };

        let products = self.render_products(all, product_company)?;

        debug!(
            tickets = all.len(),
            filtered = store.filtered_tickets().len(),
            "dashboard rendered"
        );

        Ok(DashboardView {
            summary: reporter::compute_summary(all),
            filters: filter_panel(store, product_company),
            tickets: ticket_list(store.filtered_tickets()),
            company_chart,
            priority_chart,
            top_customers,
            products,
        })
    }

    /// Product analysis panel for the selected company.
    pub fn render_products(
        &mut self,
        tickets: &[Ticket],
        company: Option<&str>,
    ) -> Result<Panel<ProductPanel>, RenderError> {
        let Some(company) = company.filter(|c| !c.is_empty()) else {
            self.charts.clear(ChartSlot::Product);
            return Ok(Panel::empty(SELECT_PRODUCT_COMPANY));
        };

        let analysis = products::analyze_company(tickets, company);
        if analysis.ticket_count == 0 {
            self.charts.clear(ChartSlot::Product);
            return Ok(Panel::empty(NO_COMPANY_TICKETS));
        }

        let chart = self.chart(ChartSlot::Product, charts::product_chart(&analysis))?;
        Ok(Panel::Ready(ProductPanel { analysis, chart }))
    }

    fn chart(&mut self, slot: ChartSlot, config: ChartConfig) -> Result<ChartView, RenderError> {
        let handle = self.charts.replace(slot, &config)?;
        Ok(ChartView { handle, config })
    }
}

/// Ticket list panel: display-sorted cards, or the empty-state message.
pub fn ticket_list(filtered: &[Ticket]) -> Panel<Vec<TicketCard>> {
    if filtered.is_empty() {
        return Panel::empty(NO_MATCHING_TICKETS);
    }
    Panel::Ready(
        filter::sorted_for_display(filtered)
            .into_iter()
            .map(TicketCard::from)
            .collect(),
    )
}

pub fn filter_panel(store: &TicketStore, product_company: Option<&str>) -> FilterPanel {
    let selection = store.filters();
    FilterPanel {
        options: filter::company_options(store.all_tickets()),
        priority: selection.priority.to_string(),
        company: selection.company.to_string(),
        product_company: product_company.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::charts::ViewSurface;
    use serde_json::json;

    fn store_with(values: Vec<serde_json::Value>) -> TicketStore {
        let mut store = TicketStore::new();
        let generation = store.begin_fetch();
        store.replace(generation, values.iter().map(Ticket::from_json).collect());
        store
    }

    #[test]
    fn empty_store_renders_empty_states() {
        let mut renderer = Renderer::new(ViewSurface::new());
        let view = renderer.render(&TicketStore::new(), None).unwrap();

        assert_eq!(view.tickets.empty_message(), Some(NO_MATCHING_TICKETS));
        assert_eq!(view.company_chart.empty_message(), Some(NO_COMPANY_DATA));
        assert_eq!(view.top_customers.empty_message(), Some(NO_HIGH_PRIORITY_CUSTOMERS));
        assert_eq!(view.products.empty_message(), Some(SELECT_PRODUCT_COMPANY));
        assert_eq!(view.summary, Summary::default());
    }

    #[test]
    fn ticket_cards_are_display_sorted() {
        let store = store_with(vec![
            json!({ "ticketReference": "L", "priority": "LOW" }),
            json!({ "ticketReference": "H", "priority": "HIGH" }),
            json!({ "ticketReference": "M", "priority": "MEDIUM" }),
        ]);
        let mut renderer = Renderer::new(ViewSurface::new());
        let view = renderer.render(&store, None).unwrap();

        let refs: Vec<&str> = view
            .tickets
            .ready()
            .unwrap()
            .iter()
            .map(|c| c.reference.as_str())
            .collect();
        assert_eq!(refs, vec!["H", "M", "L"]);
    }

    #[test]
    fn product_panel_for_unknown_company_is_empty() {
        let store = store_with(vec![json!({ "companyName": "Acme", "issueDescription": "refund" })]);
        let mut renderer = Renderer::new(ViewSurface::new());

        let view = renderer.render(&store, Some("Globex")).unwrap();
        assert_eq!(view.products.empty_message(), Some(NO_COMPANY_TICKETS));

        let view = renderer.render(&store, Some("Acme")).unwrap();
        let panel = view.products.ready().unwrap();
        assert_eq!(panel.chart.config.title.as_deref(), Some("Product Analysis for Acme"));
    }

    #[test]
    fn rerender_disposes_product_chart() {
        let store = store_with(vec![json!({ "companyName": "Acme", "priority": "HIGH" })]);
        let mut renderer = Renderer::new(ViewSurface::new());

        renderer.render(&store, Some("Acme")).unwrap();
        renderer.render(&store, Some("Acme")).unwrap();
        assert_eq!(renderer.charts().surface().live_charts(), 3);

        renderer.render(&store, None).unwrap();
        assert_eq!(renderer.charts().surface().live_charts(), 2);
    }

    #[test]
    fn view_serializes_panels_with_state_tag() {
        let store = store_with(vec![json!({ "companyName": "Acme", "priority": "HIGH" })]);
        let mut renderer = Renderer::new(ViewSurface::new());
        let view = renderer.render(&store, None).unwrap();
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["tickets"]["state"], "ready");
        assert_eq!(json["products"]["state"], "empty");
        assert_eq!(json["products"]["data"]["message"], SELECT_PRODUCT_COMPANY);
        assert_eq!(json["filters"]["companies"], json!(["Acme"]));
        assert_eq!(json["filters"]["priority"], "all");
    }
}
