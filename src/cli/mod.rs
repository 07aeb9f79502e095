pub mod category;
pub mod config;
pub mod history;
pub mod monthly;
pub mod render;
pub mod summary;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::importer::import_file;
use crate::models::TransactionTable;
use crate::settings::{load_settings, Settings};

#[derive(Parser)]
#[command(name = "tally", about = "Summaries and chart data for a personal expense export.")]
pub struct Cli {
    /// Log ingestion details to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,
    /// Print chart payloads as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Overall spending: KPIs, daily totals, cumulative spending, category split.
    Summary {
        /// CSV export with Date, Category, Amount and optional Description columns
        file: PathBuf,
        /// Category chart: pie or treemap
        #[arg(long)]
        chart: Option<String>,
    },
    /// Month-by-month overview and a detailed look at one month.
    Monthly {
        file: PathBuf,
        /// Month to inspect: YYYY-MM (default: earliest month in the file)
        #[arg(long)]
        month: Option<String>,
    },
    /// Category totals and a detailed look at one category.
    Category {
        file: PathBuf,
        /// Category to inspect (default: first category alphabetically)
        #[arg(long)]
        category: Option<String>,
        /// Category chart: bar, pie or treemap (default from settings)
        #[arg(long)]
        chart: Option<String>,
    },
    /// List transactions: largest, smallest, or by category.
    History {
        file: PathBuf,
        /// largest, smallest or category
        #[arg(long, default_value = "largest")]
        mode: String,
        /// Number of transactions for largest/smallest (default from settings)
        #[arg(short = 'n', long = "count")]
        count: Option<usize>,
        /// Category to include in category mode; repeat for several
        #[arg(long)]
        category: Vec<String>,
    },
    /// Show or change settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings.
    Show,
    /// Change one setting: currency_symbol, top_n, histogram_bins, default_chart.
    Set { key: String, value: String },
}

/// Per-invocation state shared by every tab.
pub struct Session {
    pub table: TransactionTable,
    pub settings: Settings,
    pub json: bool,
}

impl Session {
    pub fn open(file: &Path, json: bool) -> Result<Self> {
        let (table, summary) = import_file(file)?;
        if !json {
            let range = match (summary.date_range_start, summary.date_range_end) {
                (Some(start), Some(end)) => format!(", {start} to {end}"),
                _ => String::new(),
            };
            println!(
                "{}",
                format!("Loaded {} transactions from {}{range}", summary.record_count, summary.filename).green()
            );
        }
        let settings = load_settings();
        info!("Using settings: {settings:?}");
        Ok(Self {
            table,
            settings,
            json,
        })
    }

    pub fn money(&self, val: rust_decimal::Decimal) -> String {
        crate::fmt::money(val, &self.settings.currency_symbol)
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn run(cli: Cli) -> Result<()> {
    let json = cli.json;
    match cli.command {
        Commands::Summary { file, chart } => summary::run(&Session::open(&file, json)?, chart.as_deref()),
        Commands::Monthly { file, month } => monthly::run(&Session::open(&file, json)?, month.as_deref()),
        Commands::Category {
            file,
            category,
            chart,
        } => category::run(&Session::open(&file, json)?, category.as_deref(), chart.as_deref()),
        Commands::History {
            file,
            mode,
            count,
            category,
        } => history::run(&Session::open(&file, json)?, &mode, count, &category),
        Commands::Config { command } => match command {
            ConfigCommands::Show => config::show(json),
            ConfigCommands::Set { key, value } => config::set(&key, &value),
        },
    }
}
