use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use resolvx::cli::{self, OutputFormat, ViewOptions};
use resolvx::complaint::ComplaintForm;
use resolvx::config::{self, ResolvxConfig};
use resolvx::proxy::CorsProxy;
use resolvx::web;

#[derive(Debug, Parser)]
#[command(name = "resolvx")]
#[command(about = "Support ticket dashboard and complaint intake for CarePilot")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch tickets and show the full dashboard
    Dashboard {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Priority filter: all, HIGH, MEDIUM or LOW
        #[arg(long)]
        priority: Option<String>,
        /// Company filter: all or an exact company name
        #[arg(long)]
        company: Option<String>,
        /// Company to break down by product category
        #[arg(long)]
        product_company: Option<String>,
    },
    /// List tickets in display order
    Tickets {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Priority filter: all, HIGH, MEDIUM or LOW
        #[arg(long)]
        priority: Option<String>,
        /// Company filter: all or an exact company name
        #[arg(long)]
        company: Option<String>,
        /// Show at most N tickets
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show the details of one ticket
    Show {
        /// Ticket reference
        reference: String,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Request a ticket status change (not yet supported by the CRM API)
    Status {
        /// Ticket reference
        reference: String,
        /// New status, e.g. IN_PROGRESS or RESOLVED
        status: String,
    },
    /// Show the total / high priority / resolved counters
    Metrics {
        /// Refresh on the configured interval until interrupted
        #[arg(long)]
        watch: bool,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Serve the landing page and dashboard
    Web {
        /// Bind address (default from config: 127.0.0.1:8000)
        #[arg(long)]
        addr: Option<String>,
        /// Do not open a browser window
        #[arg(long)]
        no_open: bool,
    },
    /// Run the local CORS proxy in front of the CRM API
    Proxy {
        /// Port to listen on (default from config: 8001)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Compose a complaint email
    Complaint {
        /// Your email address
        #[arg(long)]
        email: String,
        /// Your name
        #[arg(long)]
        name: String,
        /// Company the complaint is about
        #[arg(long)]
        company: String,
        /// Phone number (optional)
        #[arg(long, default_value = "")]
        phone: String,
        /// What went wrong
        #[arg(long)]
        description: String,
        /// Open the Gmail compose window
        #[arg(long)]
        open: bool,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default config file to ~/.resolvx/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a value, e.g. `resolvx config set api.environment production`
    Set { key: String, value: String },
    /// Reset the global config file to defaults
    Reset,
}

fn init_logging(config: &ResolvxConfig) {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.level.clone());
    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let app = App::parse();
    let config = config::load();
    init_logging(&config);

    match app.command {
        Commands::Dashboard {
            format,
            priority,
            company,
            product_company,
        } => {
            let options = ViewOptions {
                priority,
                company,
                product_company,
            };
            cli::run_dashboard(&config, &options, OutputFormat::from_str_opt(Some(&format)))
        }
        Commands::Tickets {
            format,
            priority,
            company,
            limit,
        } => {
            let options = ViewOptions {
                priority,
                company,
                product_company: None,
            };
            cli::run_tickets(&config, &options, OutputFormat::from_str_opt(Some(&format)), limit)
        }
        Commands::Show { reference, format } => {
            cli::run_show(&config, &reference, OutputFormat::from_str_opt(Some(&format)))
        }
        Commands::Status { reference, status } => cli::run_status(&reference, &status),
        Commands::Metrics { watch, format } => {
            cli::run_metrics(&config, watch, OutputFormat::from_str_opt(Some(&format)))
        }
        Commands::Web { addr, no_open } => {
            let mut config = config;
            if no_open {
                config.web.open_browser = false;
            }
            let addr = addr.unwrap_or_else(|| config.web.addr.clone());
            web::serve(config, &addr)
        }
        Commands::Proxy { port } => {
            let port = port.unwrap_or(config.proxy.port);
            CorsProxy::from_config(&config).serve(port)
        }
        Commands::Complaint {
            email,
            name,
            company,
            phone,
            description,
            open,
            format,
        } => {
            let form = ComplaintForm {
                personal_email: email,
                customer_name: name,
                company_name: company,
                phone_number: phone,
                problem_description: description,
            };
            cli::run_complaint(&config, &form, open, OutputFormat::from_str_opt(Some(&format)))
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
