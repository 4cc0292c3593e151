//! CLI command implementations for resolvx.
//!
//! Provides subcommand handlers for:
//! - `resolvx dashboard`: summary, charts as text bars, top customers
//! - `resolvx tickets`: filtered, display-sorted ticket list
//! - `resolvx show <ref>` / `resolvx status <ref> <status>`: ticket detail
//! - `resolvx metrics [--watch]`: landing-page counters
//! - `resolvx complaint`: compose a complaint email
//! - `resolvx config show|init|set|reset`: configuration management

use std::thread;

use anyhow::{Result, bail};
use colored::Colorize;

use crate::analytics::reporter::{self, CompanyMetric, CustomerStat, PriorityDistribution};
use crate::api::TicketClient;
use crate::complaint::{self, ComplaintForm, ComposedMail};
use crate::config::{self, ResolvxConfig};
use crate::dashboard::metrics::{self, MetricCounters};
use crate::dashboard::{Dashboard, TicketDetail, ViewState};
use crate::render::{DashboardView, Panel, ProductPanel, TicketCard};
use crate::tickets::{CompanyFilter, FilterSelection, PriorityFilter};

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

/// Selections shared by `dashboard` and `tickets`.
#[derive(Debug, Clone, Default)]
pub struct ViewOptions {
    pub priority: Option<String>,
    pub company: Option<String>,
    pub product_company: Option<String>,
}

impl ViewOptions {
    fn selection(&self) -> Result<FilterSelection> {
        let priority = match self.priority.as_deref() {
            Some(p) => p.parse::<PriorityFilter>().map_err(anyhow::Error::msg)?,
            None => PriorityFilter::All,
        };
        let company = self
            .company
            .as_deref()
            .map_or(CompanyFilter::All, CompanyFilter::parse);
        Ok(FilterSelection { priority, company })
    }
}

/// Fetch tickets and build the dashboard, failing with the operator message
/// when the load or render did not succeed.
fn load(config: &ResolvxConfig, options: &ViewOptions) -> Result<Dashboard> {
    let selection = options.selection()?;
    let client = TicketClient::from_config(config, &config.web.addr);

    let mut dashboard = Dashboard::new();
    if let ViewState::Error(message) = dashboard.load_dashboard(&client, config.api.dashboard_timeout()) {
        bail!("{message}");
    }
    dashboard.apply_filters(selection);
    dashboard.select_product_company(options.product_company.clone());

    if let ViewState::Error(message) = dashboard.state() {
        bail!("{message}");
    }
    Ok(dashboard)
}

fn rendered(dashboard: &Dashboard) -> Result<&DashboardView> {
    match dashboard.view() {
        Some(view) => Ok(view),
        None => bail!("dashboard has not been rendered"),
    }
}

// ---------------------------------------------------------------------------
// resolvx dashboard
// ---------------------------------------------------------------------------

pub fn run_dashboard(config: &ResolvxConfig, options: &ViewOptions, format: OutputFormat) -> Result<()> {
    let dashboard = load(config, options)?;
    let view = rendered(&dashboard)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(view)?),
        OutputFormat::Csv => {
            let metrics = reporter::compute_company_metrics(dashboard.store().all_tickets());
            print_company_csv(&metrics);
        }
        OutputFormat::Table => print_dashboard_table(&dashboard, view),
    }
    Ok(())
}

fn print_dashboard_table(dashboard: &Dashboard, view: &DashboardView) {
    let all = dashboard.store().all_tickets();

    println!("{}", "Support Dashboard".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();

    let s = &view.summary;
    println!("  {} {}", "Total tickets: ".bold(), format_number(s.total_tickets));
    println!("  {} {}", "High priority: ".bold(), format_number(s.high_priority).yellow());
    println!("  {} {}", "Resolved:      ".bold(), format_number(s.resolved).green());
    println!("  {} {}", "Companies:     ".bold(), format_number(s.companies));
    println!();

    println!("{}", "Tickets by Company".bold().cyan());
    match view.company_chart {
        Panel::Ready(_) => print_company_table(&reporter::compute_company_metrics(all)),
        Panel::Empty { ref message } => println!("  {}", message.dimmed()),
    }
    println!();

    println!("{}", "Priority Distribution".bold().cyan());
    print_priority_bars(&reporter::compute_priority_distribution(all));
    println!();

    println!("{}", "High Priority Customers".bold().cyan());
    match &view.top_customers {
        Panel::Ready(customers) => print_customers(customers),
        Panel::Empty { message } => println!("  {}", message.dimmed()),
    }
    println!();

    println!("{}", "Product Analysis".bold().cyan());
    match &view.products {
        Panel::Ready(panel) => print_products(panel),
        Panel::Empty { message } => println!("  {}", message.dimmed()),
    }
    println!();

    println!("{}", "Tickets".bold().cyan());
    print_ticket_panel(&view.tickets, 15);
}

fn print_company_table(metrics: &[CompanyMetric]) {
    let max = metrics.iter().map(|m| m.counts.total).max().unwrap_or(0);
    println!(
        "  {:<24} {:>6} {:>6} {:>6} {:>6}",
        "Company", "Total", "High", "Medium", "Low"
    );
    println!("  {}", "-".repeat(58));
    for (i, m) in metrics.iter().enumerate() {
        let line = format!(
            "  {:<24} {:>6} {:>6} {:>6} {:>6}  {}",
            truncate(&m.company, 24),
            m.counts.total,
            m.counts.high,
            m.counts.medium,
            m.counts.low,
            bar(m.counts.total, max, 20),
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_company_csv(metrics: &[CompanyMetric]) {
    println!("company,total,high,medium,low");
    for m in metrics {
        println!(
            "{},{},{},{},{}",
            csv_field(&m.company),
            m.counts.total,
            m.counts.high,
            m.counts.medium,
            m.counts.low
        );
    }
}

fn print_priority_bars(dist: &PriorityDistribution) {
    let max = dist.high.max(dist.medium).max(dist.low);
    println!("  {:<8} {:>6}  {}", "High", dist.high, bar(dist.high, max, 30).yellow());
    println!("  {:<8} {:>6}  {}", "Medium", dist.medium, bar(dist.medium, max, 30).blue());
    println!("  {:<8} {:>6}  {}", "Low", dist.low, bar(dist.low, max, 30).green());
}

fn print_customers(customers: &[CustomerStat]) {
    for c in customers {
        let companies = if c.companies.is_empty() {
            String::new()
        } else {
            format!(" ({})", c.companies.join(", "))
        };
        println!(
            "  {:>3}  {} {}{}",
            c.count.to_string().yellow().bold(),
            truncate(&c.name, 24),
            c.email.dimmed(),
            companies.dimmed()
        );
    }
}

fn print_products(panel: &ProductPanel) {
    let analysis = &panel.analysis;
    println!(
        "  {} ({} tickets)",
        analysis.company.bold(),
        analysis.ticket_count
    );
    let max = analysis.categories.iter().map(|c| c.counts.total).max().unwrap_or(0);
    for c in &analysis.categories {
        println!(
            "  {:<22} {:>5} {:>5} high  {}",
            c.category,
            c.counts.total,
            c.counts.high,
            bar(c.counts.total, max, 20)
        );
    }
}

fn print_ticket_panel(panel: &Panel<Vec<TicketCard>>, limit: usize) {
    let cards = match panel {
        Panel::Ready(cards) => cards,
        Panel::Empty { message } => {
            println!("  {}", message.dimmed());
            return;
        }
    };

    println!(
        "  {:<12} {:<8} {:<12} {:<18} {:<16} Issue",
        "Reference", "Priority", "Status", "Company", "Created"
    );
    println!("  {}", "-".repeat(90));
    for card in cards.iter().take(limit) {
        println!(
            "  {:<12} {} {:<12} {:<18} {:<16} {}",
            truncate(&card.reference, 12),
            colorize_priority(&card.priority),
            truncate(&card.status, 12),
            truncate(&card.company, 18),
            card.created_at,
            truncate(&card.issue_description, 40),
        );
    }
    if cards.len() > limit {
        println!("  {}", format!("... and {} more", cards.len() - limit).dimmed());
    }
}

// ---------------------------------------------------------------------------
// resolvx tickets
// ---------------------------------------------------------------------------

pub fn run_tickets(
    config: &ResolvxConfig,
    options: &ViewOptions,
    format: OutputFormat,
    limit: Option<usize>,
) -> Result<()> {
    let dashboard = load(config, options)?;
    let view = rendered(&dashboard)?;

    let cards: &[TicketCard] = view.tickets.ready().map(Vec::as_slice).unwrap_or(&[]);
    let limit = limit.unwrap_or(usize::MAX);

    match format {
        OutputFormat::Json => {
            let shown: Vec<&TicketCard> = cards.iter().take(limit).collect();
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }
        OutputFormat::Csv => {
            println!("reference,priority,status,company,customer_name,customer_email,created_at,issue_description");
            for c in cards.iter().take(limit) {
                println!(
                    "{},{},{},{},{},{},{},{}",
                    csv_field(&c.reference),
                    csv_field(&c.priority),
                    csv_field(&c.status),
                    csv_field(&c.company),
                    csv_field(&c.customer_name),
                    csv_field(&c.customer_email),
                    csv_field(&c.created_at),
                    csv_field(&c.issue_description),
                );
            }
        }
        OutputFormat::Table => {
            println!(
                "{} {}",
                "Tickets".bold().cyan(),
                format!("(priority: {}, company: {})", view.filters.priority, view.filters.company).dimmed()
            );
            print_ticket_panel(&view.tickets, limit);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// resolvx show / status
// ---------------------------------------------------------------------------

pub fn run_show(config: &ResolvxConfig, reference: &str, format: OutputFormat) -> Result<()> {
    let dashboard = load(config, &ViewOptions::default())?;
    let Some(detail) = dashboard.open_ticket(reference) else {
        bail!("ticket {reference} not found");
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&detail)?),
        _ => print_detail(&detail),
    }
    Ok(())
}

fn print_detail(d: &TicketDetail) {
    println!("{} {}", "Ticket".bold().cyan(), d.reference.bold());
    println!("{}", "=".repeat(50));
    let rows = [
        ("Customer", &d.customer_name),
        ("Email", &d.customer_email),
        ("Phone", &d.customer_phone),
        ("Company", &d.company),
        ("Priority", &d.priority),
        ("Status", &d.status),
        ("Created", &d.created_at),
    ];
    for (label, value) in rows {
        println!("  {:<10} {}", format!("{label}:").bold(), value);
    }
    println!();
    println!("  {}", "Description:".bold());
    for line in d.issue_description.lines() {
        println!("    {line}");
    }
}

/// Request a status change. The CRM API has no update endpoint, so this
/// prints the notice and leaves the ticket untouched.
pub fn run_status(reference: &str, status: &str) -> Result<()> {
    let dashboard = Dashboard::new();
    if let Err(e) = dashboard.update_ticket_status(reference, status) {
        println!("{} {}", "!".yellow().bold(), e.to_string().yellow());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// resolvx metrics
// ---------------------------------------------------------------------------

pub fn run_metrics(config: &ResolvxConfig, watch: bool, format: OutputFormat) -> Result<()> {
    let client = TicketClient::from_config(config, &config.web.addr);
    loop {
        let counters = metrics::load_dashboard_metrics(&client, config.api.metrics_timeout());
        print_metrics(&counters, format)?;
        if !watch {
            return Ok(());
        }
        thread::sleep(config.api.metrics_interval());
    }
}

fn print_metrics(counters: &MetricCounters, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(counters)?),
        OutputFormat::Csv => println!(
            "{},{},{}",
            metrics::display(counters.total_tickets),
            metrics::display(counters.high_priority),
            metrics::display(counters.resolved)
        ),
        OutputFormat::Table => {
            let stamp = chrono::Local::now().format("%H:%M:%S").to_string();
            println!(
                "{}  {} {}   {} {}   {} {}",
                stamp.dimmed(),
                "Total:".bold(),
                metrics::display(counters.total_tickets),
                "High:".bold(),
                metrics::display(counters.high_priority).yellow(),
                "Resolved:".bold(),
                metrics::display(counters.resolved).green(),
            );
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// resolvx complaint
// ---------------------------------------------------------------------------

pub fn run_complaint(config: &ResolvxConfig, form: &ComplaintForm, open: bool, format: OutputFormat) -> Result<()> {
    let complaint = form.validate()?;
    let mail = complaint.compose(&config.complaint);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&mail)?),
        _ => print_mail(&mail),
    }

    if open {
        crate::web::open_browser(&mail.gmail_url)?;
        println!("{} {}", "✓".green().bold(), complaint::SUCCESS_MESSAGE);
    }
    Ok(())
}

fn print_mail(mail: &ComposedMail) {
    println!("  {} {}", "To:".bold(), mail.to);
    println!("  {} {}", "Subject:".bold(), mail.subject);
    println!();
    for line in mail.body.lines() {
        println!("  {line}");
    }
    println!();
    println!("  {} {}", "Gmail:".bold(), mail.gmail_url.dimmed());
    println!("  {} {}", "Mailto:".bold(), mail.mailto_url.dimmed());
}

// ---------------------------------------------------------------------------
// resolvx config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective resolvx Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source(config::global_config_file().is_some_and(|p| p.exists()), "~/.resolvx/config.toml");
    print_source(config::project_config_file().is_some_and(|p| p.exists()), ".resolvx.toml");
    println!("  {} {}", "·".dimmed(), "RESOLVX_* environment variables".dimmed());

    Ok(())
}

fn print_source(exists: bool, name: &str) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.resolvx/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!("{} Config written to {}", "✓".green().bold(), path.display());
    println!("  {}", "Edit the file to point resolvx at your CRM.".dimmed());
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!("{} Config reset to defaults at {}", "✓".green().bold(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format a number with comma separators for readability.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

/// Horizontal bar scaled so that `max` fills `width` cells.
fn bar(value: usize, max: usize, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let cells = (value * width).div_ceil(max);
    "█".repeat(cells)
}

/// Quote a CSV field when it contains a separator, quote or line break.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Colorize a priority label, padded to the column width.
fn colorize_priority(priority: &str) -> colored::ColoredString {
    let padded = format!("{priority:<8}");
    match priority {
        "HIGH" => padded.yellow().bold(),
        "MEDIUM" => padded.blue(),
        "LOW" => padded.green(),
        _ => padded.normal(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("Zürich Ölwerke", 4), "Zür…");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_str_opt(Some("xml")), OutputFormat::Table);
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(0, 0, 10), "");
        assert_eq!(bar(10, 10, 10).chars().count(), 10);
        assert_eq!(bar(1, 10, 10).chars().count(), 1);
        assert_eq!(bar(0, 10, 10), "");
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("Acme"), "Acme");
        assert_eq!(csv_field("Acme, Inc"), "\"Acme, Inc\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_view_options_selection() {
        let options = ViewOptions {
            priority: Some("high".into()),
            company: Some("Acme".into()),
            product_company: None,
        };
        let selection = options.selection().unwrap();
        assert_eq!(selection.priority.to_string(), "HIGH");
        assert_eq!(selection.company, CompanyFilter::Named("Acme".into()));

        let bad = ViewOptions {
            priority: Some("urgent".into()),
            ..Default::default()
        };
        assert!(bad.selection().is_err());
    }
}
