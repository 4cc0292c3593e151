//! Ticket domain: canonical record, store, and filter/sort engine.

pub mod filter;
pub mod model;
pub mod store;

pub use filter::{CompanyFilter, FilterSelection, PriorityFilter};
pub use model::{Priority, Ticket};
pub use store::{Generation, TicketStore};
