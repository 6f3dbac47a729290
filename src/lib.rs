pub mod aggregate;
pub mod alias;
pub mod boundary;
pub mod cli;
pub mod detect;
pub mod error;
pub mod io_utils;
pub mod ncrb;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("geo_reconcile", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Detect(args) => handle_detect(&args),
        Commands::Reconcile(args) => pipeline::execute(&args),
        Commands::Validate(args) => ncrb::execute(&args),
    }
}

fn handle_detect(args: &cli::DetectArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let (headers, rows) = io_utils::read_table(&args.input, delimiter, encoding)?;
    info!(
        "Detecting fields in '{}' across {} column(s)",
        args.input.display(),
        headers.len()
    );

    let state_column = detect::detect_state_column(&headers, &rows)
        .with_context(|| format!("Detecting the state column of {:?}", args.input))?;
    let candidates = detect::metric_candidates(&headers, &rows)
        .with_context(|| format!("Detecting metric candidates in {:?}", args.input))?;

    let mut display_rows = vec![vec!["state".to_string(), state_column]];
    for candidate in candidates {
        display_rows.push(vec!["metric candidate".to_string(), candidate]);
    }
    table::print_table(
        &["Role".to_string(), "Column".to_string()],
        &display_rows,
    );
    Ok(())
}
