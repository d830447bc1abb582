//! Command implementations for the ACR CLI.
//!
//! Provides subcommands for single-day and multi-day cancellation-risk
//! assessment against an airport's historical weather record.

use clap::{Args, Subcommand};
use std::path::PathBuf;

pub mod assess;
pub mod plot;
pub mod render;
pub mod session;

/// Where the configuration, history and forecasts come from.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// JSON configuration file (built-in defaults when omitted)
    #[arg(short = 'c', long)]
    pub config: Option<String>,

    /// Airport ICAO code from the configuration, e.g. RKSI
    #[arg(short = 'a', long)]
    pub airport: Option<String>,

    /// Historical observations CSV (overrides the airport's file)
    #[arg(long)]
    pub history: Option<String>,

    /// CSV of precomputed forecasts; the window-mean baseline is used when omitted
    #[arg(short = 'f', long)]
    pub forecasts: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Assess cancellation risk for a single date
    Day {
        #[command(flatten)]
        source: SourceArgs,

        /// Target date, YYYY-MM-DD or MM-DD (current year)
        #[arg(short = 'd', long)]
        date: String,

        /// Emit JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Assess cancellation risk for consecutive days starting at a date
    Span {
        #[command(flatten)]
        source: SourceArgs,

        /// First date, YYYY-MM-DD or MM-DD (current year)
        #[arg(short = 'd', long)]
        date: String,

        /// Number of days (defaults to the configured span length)
        #[arg(short = 'n', long)]
        days: Option<usize>,

        /// Write the probability line chart to this SVG file
        #[arg(long)]
        chart: Option<PathBuf>,

        /// Emit JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// List the airports in the configuration
    Airports {
        /// JSON configuration file (built-in defaults when omitted)
        #[arg(short = 'c', long)]
        config: Option<String>,
    },

    /// Print the effective configuration as JSON
    Config {
        /// JSON configuration file (built-in defaults when omitted)
        #[arg(short = 'c', long)]
        config: Option<String>,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Day { source, date, json } => assess::run_day(&source, &date, json),
        Command::Span {
            source,
            date,
            days,
            chart,
            json,
        } => assess::run_span(&source, &date, days, chart.as_deref(), json),
        Command::Airports { config } => {
            let config = session::load_config(config.as_deref())?;
            print!("{}", render::airports_table(&config));
            Ok(())
        }
        Command::Config { config } => {
            let config = session::load_config(config.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}
