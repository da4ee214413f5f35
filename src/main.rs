use anyhow::Result;
use clap::{Parser, Subcommand};

use fuelform::{cli, config};

#[derive(Debug, Parser)]
#[command(name = "fuelform")]
#[command(about = "Tolerant input parsing for fuel prediction forms")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse route text (JSON, single-quoted JSON, or `a,b; c,d` rows) into a matrix
    Parse {
        /// Route text; read from stdin when omitted
        text: Option<String>,
        /// Output format: table, json, csv (default from config)
        #[arg(long)]
        format: Option<String>,
    },
    /// Parse one comma-separated feature row, dropping unreadable values
    Row {
        /// Row text; read from stdin when omitted
        text: Option<String>,
        /// Output format: table, json, csv (default from config)
        #[arg(long)]
        format: Option<String>,
    },
    /// Build a prediction request body from form input
    Request {
        #[command(subcommand)]
        action: RequestAction,
    },
    /// Render a prediction response from the backend
    Render {
        #[command(subcommand)]
        action: RenderAction,
    },
    /// Show the panel tabs
    Tabs {
        /// Tab to activate: segment, route, compare
        #[arg(long)]
        select: Option<String>,
    },
    /// Show input parsing statistics
    Stats {
        /// Output format: table, json, csv (default from config)
        #[arg(long)]
        format: Option<String>,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
    },
    /// Manage fuelform configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum RequestAction {
    /// Body for POST /predict_segment
    Segment {
        /// Comma-separated features; read from stdin when omitted
        features: Option<String>,
    },
    /// Body for POST /predict_route, one argument per segment
    Route {
        #[arg(required = true)]
        segments: Vec<String>,
    },
    /// Body for POST /compare_routes
    Compare {
        /// Route A matrix text
        first: String,
        /// Route B matrix text
        second: String,
    },
}

#[derive(Debug, Subcommand)]
enum RenderAction {
    /// Render a /predict_segment response
    Segment {
        /// Response JSON; read from stdin when omitted
        response: Option<String>,
    },
    /// Render a /predict_route response
    Route {
        /// Response JSON; read from stdin when omitted
        response: Option<String>,
    },
    /// Render a /compare_routes response
    Compare {
        /// Response JSON; read from stdin when omitted
        response: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration (merged from all sources)
    Show,
    /// Create a default config file at ~/.fuelform/config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Set a configuration value (e.g., `fuelform config set input.expected_features 9`)
    Set {
        /// Dotted key path (e.g., "display.decimals")
        key: String,
        /// Value to set
        value: String,
    },
    /// Reset configuration to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let cfg = config::load();
    cli::apply_color(&cfg);

    match app.command {
        Commands::Parse { text, format } => {
            let fmt = cli::resolve_format(format.as_deref(), &cfg);
            cli::run_parse(text, fmt, &cfg)
        }
        Commands::Row { text, format } => {
            let fmt = cli::resolve_format(format.as_deref(), &cfg);
            cli::run_row(text, fmt, &cfg)
        }
        Commands::Request { action } => match action {
            RequestAction::Segment { features } => cli::run_request_segment(features, &cfg),
            RequestAction::Route { segments } => cli::run_request_route(segments, &cfg),
            RequestAction::Compare { first, second } => {
                cli::run_request_compare(&first, &second, &cfg)
            }
        },
        Commands::Render { action } => match action {
            RenderAction::Segment { response } => cli::run_render_segment(response, &cfg),
            RenderAction::Route { response } => cli::run_render_route(response, &cfg),
            RenderAction::Compare { response } => cli::run_render_compare(response, &cfg),
        },
        Commands::Tabs { select } => cli::run_tabs(select.as_deref()),
        Commands::Stats { format, days } => {
            let fmt = cli::resolve_format(format.as_deref(), &cfg);
            cli::run_stats(fmt, days, &cfg)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
