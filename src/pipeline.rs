//! The full reconcile run: boundary in, annotated GeoJSON out.
//!
//! Each invocation is a single synchronous pass. Fatal conditions (missing
//! name column, no numeric metric, malformed boundary data, unknown
//! explicit column) are raised before aggregation or reconciliation run, so
//! a failed run emits no partial output. Unmatched names never abort; they
//! are logged and optionally written to a report file.

use std::{
    fs::File,
    io::{BufWriter, Write as _},
};

use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    aggregate::aggregate,
    boundary,
    cli::ReconcileArgs,
    detect,
    error::ReconcileError,
    io_utils,
    reconcile::{ranked_table, reconcile},
    table,
};

pub fn execute(args: &ReconcileArgs) -> Result<()> {
    if args.table && args.output.is_none() {
        return Err(anyhow!(
            "--table requires --output; the ranked table and the annotated GeoJSON cannot share stdout"
        ));
    }

    let collection = boundary::load_boundary(&args.boundary)?;
    let name_key = boundary::region_name_key(&collection)?;
    debug!("Boundary region names come from property '{name_key}'");
    let regions = boundary::build_regions(&collection, &name_key);
    info!(
        "Loaded {} boundary feature(s) from {:?}",
        regions.len(),
        args.boundary
    );

    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let (headers, rows) = io_utils::read_table(&args.input, delimiter, encoding)?;

    let state_column = resolve_column(&headers, args.state_column.as_deref(), || {
        detect::detect_state_column(&headers, &rows)
    })?;
    let metric_column = resolve_column(&headers, args.metric_column.as_deref(), || {
        // The caller's selection policy: first candidate in header order.
        detect::metric_candidates(&headers, &rows).map(|mut candidates| candidates.remove(0))
    })?;
    info!("Using state column '{state_column}', metric column '{metric_column}'");

    let state_idx = header_index(&headers, &state_column)?;
    let metric_idx = header_index(&headers, &metric_column)?;

    let totals = aggregate(&rows, state_idx, metric_idx);
    let result = reconcile(&regions, &totals);

    if !result.unmatched.is_empty() {
        warn!(
            "{} uploaded name(s) match no boundary region: {}",
            result.unmatched.len(),
            result.unmatched.join(", ")
        );
    }

    let mut annotated = (*collection).clone();
    boundary::annotate_features(&mut annotated, &result.regions);
    write_geojson(args, &annotated)?;

    // After the GeoJSON emit: a failed run must leave no artifacts at all.
    if let Some(path) = &args.unmatched_out {
        let report = UnmatchedReport {
            unmatched: &result.unmatched,
        };
        let file = File::create(path)
            .with_context(|| format!("Creating unmatched report {path:?}"))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &report)
            .context("Writing unmatched report JSON")?;
        writer.flush()?;
        info!("Wrote unmatched report to {path:?}");
    }

    if args.table {
        let display_rows = ranked_table(&result.regions)
            .into_iter()
            .map(|(name, value)| vec![name, format_metric(value)])
            .collect::<Vec<_>>();
        table::print_table(
            &["State".to_string(), metric_column.clone()],
            &display_rows,
        );
    }
    Ok(())
}

/// Shape of the `--unmatched-out` JSON file: the sorted canonical names
/// uploaded with no matching boundary region.
#[derive(Debug, Serialize)]
struct UnmatchedReport<'a> {
    unmatched: &'a [String],
}

fn resolve_column(
    headers: &[String],
    requested: Option<&str>,
    fallback: impl FnOnce() -> Result<String, ReconcileError>,
) -> Result<String> {
    match requested {
        Some(name) => headers
            .iter()
            .find(|h| h.as_str() == name)
            .cloned()
            .ok_or_else(|| ReconcileError::UnknownColumn(name.to_string()).into()),
        None => Ok(fallback()?),
    }
}

fn header_index(headers: &[String], name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| ReconcileError::UnknownColumn(name.to_string()).into())
}

fn write_geojson(args: &ReconcileArgs, collection: &geojson::FeatureCollection) -> Result<()> {
    match args.output.as_deref().filter(|p| !io_utils::is_dash(p)) {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("Creating output file {path:?}"))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, collection)
                .context("Writing annotated GeoJSON")?;
            writer.flush()?;
            info!("Wrote annotated GeoJSON to {path:?}");
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer(&mut handle, collection)
                .context("Writing annotated GeoJSON to stdout")?;
            handle.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn format_metric(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
