use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::types::{parse_selection, FilterSelection, Selection};

#[derive(Parser, Debug)]
#[command(
    name = "cost-sentinel",
    about = "Cloud cost dashboard: fetch, filter, chart and export usage reports",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Report endpoint URL (overrides the config file)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Only include this service ("all" for every service)
    #[arg(long, global = true, default_value = "all", value_parser = parse_selection)]
    pub service: Selection,

    /// Only include this region ("all" for every region)
    #[arg(long, global = true, default_value = "all", value_parser = parse_selection)]
    pub region: Selection,

    /// Output format: table (default), json
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Suppress progress output (for scripting)
    #[arg(long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Totals, regional distribution and daily trend (default)
    Summary,
    /// Detailed line items
    Records {
        /// Maximum rows to show (default: 20, or `record_limit` from config)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Cost per region
    Regions,
    /// Cost per day
    Daily,
    /// Bar charts of the daily trend and regional distribution
    Plot,
    /// List the services and regions available for filtering
    Options,
    /// Write the filtered line items to a dated CSV file
    Export {
        /// Output directory (default: `export_dir` from config, else current directory)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// File name prefix (default: `report_prefix` from config)
        #[arg(long)]
        prefix: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl Cli {
    pub fn effective_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Summary)
    }

    pub fn selection(&self) -> FilterSelection {
        FilterSelection {
            service: self.service.clone(),
            region: self.region.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["cost-sentinel"]).unwrap();
        assert_eq!(cli.effective_command(), Command::Summary);
        assert_eq!(cli.selection(), FilterSelection::default());
        assert_eq!(cli.format, OutputFormat::Table);
    }

    #[test]
    fn test_filters_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cost-sentinel",
            "export",
            "--dir",
            "out",
            "--region",
            "us-east-1",
            "--service",
            "All",
        ])
        .unwrap();

        assert_eq!(
            cli.selection(),
            FilterSelection {
                service: Selection::AllValues,
                region: Selection::Specific("us-east-1".into()),
            }
        );
        assert_eq!(
            cli.effective_command(),
            Command::Export {
                dir: Some(PathBuf::from("out")),
                prefix: None,
            }
        );
    }

    #[test]
    fn test_uppercase_all_is_a_literal_value() {
        let cli = Cli::try_parse_from(["cost-sentinel", "--region", "ALL"]).unwrap();
        assert_eq!(cli.selection().region, Selection::Specific("ALL".into()));
    }

    #[test]
    fn test_records_limit() {
        let cli = Cli::try_parse_from(["cost-sentinel", "records", "--limit", "5"]).unwrap();
        assert_eq!(cli.effective_command(), Command::Records { limit: Some(5) });
    }
}
