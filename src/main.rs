use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use vendor_summary::{
    build_dispatch, ingest_dir, load_summary, open_database, run_job, setup_source_schema,
    AppConfig, JobOptions, WriteMode,
};

#[derive(Parser)]
#[command(name = "vendor-summary", version, about = "Vendor/brand sales summary for the inventory store")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite inventory store (overrides config)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Log file (overrides config)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Log filter directive, e.g. `info` (overrides config)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Mirror log output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load every CSV in the data directory into the store
    Ingest {
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Build, clean and persist the vendor summary
    Run {
        /// Destination table
        #[arg(long)]
        table: Option<String>,
        /// Append instead of replacing the destination table
        #[arg(long)]
        append: bool,
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the top rows of a summary table
    Show {
        #[arg(long)]
        table: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.database = database;
    }
    if let Some(log_file) = cli.log_file {
        config.log.file = Some(log_file);
    }
    if let Some(level) = cli.log_level {
        config.log.level = level;
    }
    if cli.verbose {
        config.log.stderr = true;
    }

    match cli.command {
        Command::Ingest { data_dir } => {
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            run_ingest(&config)
        }
        Command::Run { table, append, json } => {
            if let Some(table) = table {
                config.destination_table = table;
            }
            if append {
                config.write_mode = WriteMode::Append;
            }
            run_summary(&config, json)
        }
        Command::Show { table, limit, json } => {
            let table = table.unwrap_or_else(|| config.destination_table.clone());
            run_show(&config, &table, limit, json)
        }
    }
}

fn run_ingest(config: &AppConfig) -> Result<()> {
    println!("📥 Ingesting CSV extracts from {}", config.data_dir.display());

    let dispatch = build_dispatch(&config.log)?;
    let mut conn = open_database(&config.database)?;

    let tables = tracing::dispatcher::with_default(&dispatch, || ingest_dir(&mut conn, &config.data_dir))?;
    for table in &tables {
        println!("✓ {}: {} rows ({} ms)", table.table, table.rows, table.elapsed_ms);
    }

    // Fills in any source table the extracts did not provide, plus join indexes
    setup_source_schema(&conn)?;
    println!("✓ Source schema ready in {}", config.database.display());

    Ok(())
}

fn run_summary(config: &AppConfig, json: bool) -> Result<()> {
    let dispatch = build_dispatch(&config.log)?;
    let mut conn = open_database(&config.database)?;

    let report = run_job(&mut conn, &JobOptions::from(config), &dispatch)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("✅ {}", report.summary());
    }

    Ok(())
}

fn run_show(config: &AppConfig, table: &str, limit: usize, json: bool) -> Result<()> {
    let conn = open_database(&config.database)?;
    let rows = load_summary(&conn, table, Some(limit))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{:>8}  {:<28} {:>8}  {:>12}  {:>12}  {:>10}  {:>8}",
        "Vendor", "Name", "Brand", "Purchases", "Sales", "Margin %", "Turnover"
    );
    for row in &rows {
        println!(
            "{:>8}  {:<28} {:>8}  {:>12.2}  {:>12.2}  {:>10}  {:>8}",
            row.vendor_number,
            truncate(&row.vendor_name, 28),
            row.brand.to_string(),
            row.total_purchase_dollars,
            row.total_sales_dollars,
            format_ratio(row.profit_margin),
            format_ratio(row.stock_turnover),
        );
    }
    println!("\n{} rows from {}", rows.len(), table);

    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn format_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}
