use anyhow::Result;
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::{extract, history};

#[derive(Parser)]
#[command(name = "testlens")]
#[command(author, version, about = "XML Test History Insights Tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output file path (defaults to stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Pretty print JSON output
    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze automated-test history across both artifact families
    Trends {
        /// Base directory holding the summary/ and unittest/ artifact folders
        #[arg(short, long, env = "TESTLENS_BASE_DIR")]
        base_dir: PathBuf,

        /// Number of days to look back
        #[arg(short, long, default_value_t = 7)]
        days: u32,
    },

    /// List the XML artifacts in a directory
    Files {
        /// Directory to scan recursively
        directory: PathBuf,
    },

    /// Extract values matching a selector from every artifact
    Extract {
        /// Selector expression, e.g. "//test-case/@result" or "count(//failure)"
        #[arg(short, long)]
        selector: String,

        /// Directory to scan recursively
        directory: PathBuf,
    },

    /// Collect structural metrics across all artifacts
    Metrics {
        /// Directory to scan recursively
        directory: PathBuf,
    },

    /// Run a set of named selectors over every artifact
    Custom {
        /// Named selector as name=expression (repeatable)
        #[arg(short, long = "selector", value_parser = parse_named_selector, required = true)]
        selectors: Vec<(String, String)>,

        /// Directory to scan recursively
        directory: PathBuf,
    },
}

impl Cli {
    pub fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Trends { base_dir, days } => {
                info!("Collecting testing trends from: {}", base_dir.display());
                let report = history::collect_testing_trends(base_dir, *days);
                self.write_report(&report)
            }
            Commands::Files { directory } => {
                let report = extract::files_summary(directory)?;
                self.write_report(&report)
            }
            Commands::Extract {
                selector,
                directory,
            } => {
                let report = extract::extract_trend_data(directory, selector)?;
                self.write_report(&report)
            }
            Commands::Metrics { directory } => {
                let report = extract::business_metrics(directory)?;
                self.write_report(&report)
            }
            Commands::Custom {
                selectors,
                directory,
            } => {
                let named: IndexMap<String, String> = selectors.iter().cloned().collect();
                let report = extract::custom_elements(directory, &named)?;
                self.write_report(&report)
            }
        }
    }

    fn write_report<T: Serialize>(&self, report: &T) -> Result<()> {
        // Serialize to JSON
        let json_output = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };

        // Write to output
        if let Some(output_path) = &self.output {
            std::fs::write(output_path, json_output)?;
            info!("Report written to: {}", output_path.display());
        } else {
            println!("{json_output}");
        }

        Ok(())
    }
}

fn parse_named_selector(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, expression) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=selector, got '{raw}'"))?;
    let name = name.trim();
    let expression = expression.trim();
    if name.is_empty() {
        return Err(format!("missing selector name in '{raw}'"));
    }
    if expression.is_empty() {
        return Err(format!("missing selector expression in '{raw}'"));
    }
    Ok((name.to_string(), expression.to_string()))
}
