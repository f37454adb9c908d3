//! Quarry CLI: query heterogeneous tabular sources and run transform
//! pipelines over CSV files.
//!
//! # Commands
//!
//! - `query`: run a select/where/limit query against a named connector and
//!   print the result as CSV.
//! - `transform`: read a CSV file, apply a transform pipeline, write CSV.

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use owo_colors::OwoColorize;

mod commands;
mod exit_codes;

#[derive(Parser)]
#[command(name = "quarry")]
#[command(about = "Query and transform tabular data sources", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a query against a connector and print CSV to stdout
    Query {
        /// Connector name (e.g., local, postgres, clickhouse, databricks)
        connector: String,

        /// For the local connector, the file path
        #[arg(long)]
        path: Option<String>,

        /// For SQL connectors, the connection URL
        #[arg(long)]
        url: Option<String>,

        /// For SQL and warehouse connectors, the table name
        #[arg(long)]
        table: Option<String>,

        /// For the databricks connector, the workspace hostname
        #[arg(long)]
        server_hostname: Option<String>,

        /// For the databricks connector, the warehouse HTTP path
        #[arg(long)]
        http_path: Option<String>,

        /// For the databricks connector, the access token
        #[arg(long, env = "QUARRY_DATABRICKS_TOKEN")]
        access_token: Option<String>,

        /// Columns to select (repeatable)
        #[arg(long)]
        select: Vec<String>,

        /// Equality filters like key=value (repeatable)
        #[arg(long = "where")]
        filters: Vec<String>,

        /// Row limit
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Apply a transform pipeline to a CSV file
    Transform {
        /// Input CSV file
        #[arg(long = "in")]
        input: String,

        /// Output CSV file (default: stdout)
        #[arg(long)]
        out: Option<String>,

        /// Pipeline steps like `normalize:columns=a|b` or
        /// `moving_average:column=value,window=3` (repeatable, applied in order)
        #[arg(long = "step")]
        steps: Vec<String>,
    },
}

fn main() {
    dotenv().ok();
    quarry_common::telemetry::init_tracing("warn");

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Query {
            connector,
            path,
            url,
            table,
            server_hostname,
            http_path,
            access_token,
            select,
            filters,
            limit,
        } => commands::query::run(commands::query::QueryArgs {
            connector,
            path,
            url,
            table,
            server_hostname,
            http_path,
            access_token,
            select,
            filters,
            limit,
        }),
        Commands::Transform { input, out, steps } => {
            commands::transform::run(&input, out.as_deref(), &steps)
        }
    };

    if let Err(err) = result {
        eprintln!("{} {}", "error:".red().bold(), err);
        std::process::exit(exit_codes::for_error(&err));
    }
}
