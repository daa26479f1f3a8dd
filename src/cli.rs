use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{keywords::ChartType, render::DEFAULT_PREVIEW_ROWS};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Ask plain-language questions about a CSV file",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Answer one or more questions about a CSV file
    Ask(AskArgs),
    /// Start an interactive session that reads one question per line
    Shell(ShellArgs),
    /// Preview the first rows of a CSV file with inferred column types
    Preview(PreviewArgs),
    /// Print the active chart keyword table
    Keywords(KeywordsArgs),
}

/// Options shared by every command that answers questions.
#[derive(Debug, Clone, Args)]
pub struct SessionArgs {
    /// YAML settings file with `keywords` and `llm` sections
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Skip the interpretation model and resolve from the question alone
    #[arg(long = "no-llm")]
    pub no_llm: bool,
    /// Base URL of the Ollama server
    #[arg(long = "llm-host")]
    pub llm_host: Option<String>,
    /// Model name used for interpretation
    #[arg(long = "llm-model")]
    pub llm_model: Option<String>,
    /// Seconds to wait for the model (0 waits forever)
    #[arg(long = "llm-timeout")]
    pub llm_timeout: Option<u64>,
    /// Seed for the random column fallback
    #[arg(long)]
    pub seed: Option<u64>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Maximum rows shown for tables and chart series
    #[arg(long = "max-rows", default_value_t = DEFAULT_PREVIEW_ROWS)]
    pub max_rows: usize,
}

#[derive(Debug, Args)]
pub struct AskArgs {
    /// Input CSV file to analyze ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Question to answer; repeat to ask several in order
    #[arg(short = 'q', long = "query", required = true, action = clap::ArgAction::Append)]
    pub queries: Vec<String>,
    /// Write chart specifications produced by the questions as JSON
    #[arg(long = "chart-out")]
    pub chart_out: Option<PathBuf>,
    /// Show a dataset preview before answering
    #[arg(long)]
    pub preview: bool,
    /// Emit answers as JSON instead of text
    #[arg(long)]
    pub json: bool,
    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Debug, Args)]
pub struct ShellArgs {
    /// CSV file to load at start-up
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Input CSV file to preview
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// CSV delimiter character
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding for input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct KeywordsArgs {
    /// YAML settings file whose keyword table should be shown
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Print the table as YAML, ready to paste into a settings file
    #[arg(long)]
    pub yaml: bool,
    /// Only list the phrases of one chart type (e.g. `pie`, `scatter-plot`)
    #[arg(long)]
    pub chart: Option<ChartType>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
