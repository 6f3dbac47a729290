use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Reconcile state-level CSV metrics onto GeoJSON boundaries", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report the detected state column and numeric metric candidates of a CSV
    Detect(DetectArgs),
    /// Aggregate a CSV metric per state and merge it onto boundary features
    Reconcile(ReconcileArgs),
    /// Validate an NCRB-shaped CSV and fill in the derived percentage column
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    /// Input CSV file to inspect
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Input CSV file with one row per state/UT
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// GeoJSON boundary file (FeatureCollection)
    #[arg(short = 'b', long = "boundary")]
    pub boundary: PathBuf,
    /// Annotated GeoJSON output (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Column holding state/UT names (detected heuristically if omitted)
    #[arg(long = "state-column")]
    pub state_column: Option<String>,
    /// Numeric metric column to aggregate (first candidate if omitted)
    #[arg(long = "metric-column")]
    pub metric_column: Option<String>,
    /// Print the ranked state/metric table to stdout (requires --output)
    #[arg(long = "table")]
    pub table: bool,
    /// Write the unmatched-name report to this file as JSON
    #[arg(long = "unmatched-out")]
    pub unmatched_out: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Input CSV file in the NCRB shape (Sl. No., State/UT, 2022, percentage)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Write the coerced CSV with the percentage column filled in
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
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
