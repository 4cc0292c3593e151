//! resolvx: support-ticket dashboard and complaint intake.
//!
//! Fetches tickets from the CRM API, normalizes them once at ingestion and
//! derives the dashboard views (summary cards, per-company and priority
//! charts, top high-priority customers, product analysis) served by the
//! embedded web server and the CLI.

pub mod analytics;
pub mod api;
pub mod cli;
pub mod complaint;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod proxy;
pub mod render;
pub mod tickets;
pub mod web;
