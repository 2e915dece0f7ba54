mod aggregate;
mod cli;
mod config;
mod export;
mod fetch;
mod graph;
mod output;
mod types;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use cli::{Cli, Command, OutputFormat};
use config::Config;

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_endpoint(cli: &Cli, config: &Config) -> Result<String> {
    if let Some(endpoint) = cli.endpoint.as_ref().or(config.endpoint.as_ref()) {
        return Ok(endpoint.clone());
    }
    let hint = config::config_path()
        .map(|p| format!(" or set `endpoint` in {}", p.display()))
        .unwrap_or_default();
    bail!("No report endpoint configured: pass --endpoint{hint}");
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mode = cli.effective_command();
    let config = config::load_config();
    let endpoint = resolve_endpoint(&cli, &config)?;

    if !cli.quiet {
        eprint!("Fetching usage report...");
        let _ = std::io::stderr().flush();
    }
    let records = fetch::fetch_records(&endpoint);
    if !cli.quiet {
        eprint!("\x1b[2K\r");
        if records.is_empty() {
            eprintln!("No usage records found.");
        } else {
            eprintln!("Found {} usage records.", records.len());
        }
    }

    let selection = cli.selection();
    let view = aggregate::aggregate(&records, &selection);

    match mode {
        Command::Summary => match cli.format {
            OutputFormat::Json => output::print_json(&output::summary_json(&view, &selection)),
            OutputFormat::Table => output::print_summary(&view, &selection),
        },
        Command::Records { limit } => {
            let limit = limit.unwrap_or_else(|| config.record_limit());
            match cli.format {
                OutputFormat::Json => {
                    output::print_json(&view.filtered[..limit.min(view.filtered.len())])
                }
                OutputFormat::Table => output::print_records(&view, limit),
            }
        }
        Command::Regions => match cli.format {
            OutputFormat::Json => output::print_json(&view.region_totals),
            OutputFormat::Table => output::print_regions(&view),
        },
        Command::Daily => match cli.format {
            OutputFormat::Json => output::print_json(&view.date_totals),
            OutputFormat::Table => output::print_daily(&view),
        },
        Command::Plot => graph::render(&view)?,
        Command::Export { dir, prefix } => {
            let dir = dir
                .or_else(|| config.export_dir.clone())
                .unwrap_or_else(|| PathBuf::from("."));
            let prefix = prefix.as_deref().unwrap_or(config.report_prefix());
            let today = chrono::Utc::now().date_naive();

            let path = export::write_report(&dir, prefix, today, &view.filtered)?;
            if !cli.quiet {
                eprintln!("Exported {} line items.", view.filtered.len());
            }
            println!("{}", path.display());
        }
        Command::Options => {
            let options = aggregate::filter_options(&records);
            match cli.format {
                OutputFormat::Json => output::print_json(&options),
                OutputFormat::Table => output::print_options(&options),
            }
        }
    }

    Ok(())
}
