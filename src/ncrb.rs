//! Validation and derived-column completion for the fixed NCRB CSV shape.
//!
//! The expected columns are `Sl. No.` (free-form, may be empty), `State/UT`
//! (non-empty string), `2022` (integer >= 0), and `percentage` (float, may
//! be empty). Validation is lazy: every row is checked and all violations
//! are reported together rather than stopping at the first.

use anyhow::{Result, bail};
use log::info;

use crate::{cli::ValidateArgs, io_utils};

pub const SERIAL_COLUMN: &str = "Sl. No.";
pub const STATE_COLUMN: &str = "State/UT";
pub const YEAR_COLUMN: &str = "2022";
pub const PERCENT_COLUMN: &str = "percentage";

pub fn execute(args: &ValidateArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let (mut headers, mut rows) = io_utils::read_table(&args.input, delimiter, encoding)?;

    let violations = collect_violations(&headers, &rows);
    if !violations.is_empty() {
        for violation in &violations {
            log::error!("{violation}");
        }
        bail!(
            "{:?} failed schema validation with {} violation(s)",
            args.input,
            violations.len()
        );
    }
    info!("✓ {:?} matches the NCRB schema", args.input);

    let recomputed = ensure_percentage_column(&mut headers, &mut rows)?;
    if recomputed {
        info!("Recomputed '{PERCENT_COLUMN}' from '{YEAR_COLUMN}' totals");
    }

    if let Some(output) = &args.output {
        let mut writer = io_utils::open_csv_writer(Some(output.as_path()), delimiter)?;
        writer.write_record(&headers)?;
        for row in &rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        info!("Wrote {} row(s) to {:?}", rows.len(), output);
    }
    Ok(())
}

fn column_index(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

/// Checks every row against the NCRB shape and returns all violations.
/// The serial and percentage columns are nullable; the year count must be
/// a non-negative integer.
pub fn collect_violations(headers: &[String], rows: &[Vec<String>]) -> Vec<String> {
    let mut violations = Vec::new();
    for required in [SERIAL_COLUMN, STATE_COLUMN, YEAR_COLUMN] {
        if column_index(headers, required).is_none() {
            violations.push(format!("missing required column '{required}'"));
        }
    }
    if !violations.is_empty() {
        return violations;
    }
    let state_idx = column_index(headers, STATE_COLUMN).expect("checked above");
    let year_idx = column_index(headers, YEAR_COLUMN).expect("checked above");
    let percent_idx = column_index(headers, PERCENT_COLUMN);

    for (row_idx, row) in rows.iter().enumerate() {
        let line = row_idx + 2;
        let state = row.get(state_idx).map(|s| s.trim()).unwrap_or_default();
        if state.is_empty() {
            violations.push(format!("row {line}: '{STATE_COLUMN}' must not be empty"));
        }
        let year = row.get(year_idx).map(|s| s.trim()).unwrap_or_default();
        match year.parse::<i64>() {
            Ok(count) if count < 0 => {
                violations.push(format!("row {line}: '{YEAR_COLUMN}' must be >= 0, got {count}"));
            }
            Ok(_) => {}
            Err(_) => violations.push(format!(
                "row {line}: '{YEAR_COLUMN}' must be an integer, got '{year}'"
            )),
        }
        if let Some(idx) = percent_idx {
            let percent = row.get(idx).map(|s| s.trim()).unwrap_or_default();
            if !percent.is_empty() && percent.parse::<f64>().is_err() {
                violations.push(format!(
                    "row {line}: '{PERCENT_COLUMN}' must be numeric, got '{percent}'"
                ));
            }
        }
    }
    violations
}

/// Fills in the derived percentage column: when it is absent, or any of its
/// values is missing, the whole column is recomputed as
/// `year / sum(year) * 100`. Returns whether a recomputation happened.
///
/// Call only after [`collect_violations`] has passed; year cells are
/// assumed to parse.
pub fn ensure_percentage_column(headers: &mut Vec<String>, rows: &mut [Vec<String>]) -> Result<bool> {
    let year_idx = match column_index(headers, YEAR_COLUMN) {
        Some(idx) => idx,
        None => bail!("missing required column '{YEAR_COLUMN}'"),
    };
    let percent_idx = match column_index(headers, PERCENT_COLUMN) {
        Some(idx) => idx,
        None => {
            headers.push(PERCENT_COLUMN.to_string());
            for row in rows.iter_mut() {
                row.push(String::new());
            }
            headers.len() - 1
        }
    };

    let needs_fill = rows
        .iter()
        .any(|row| row.get(percent_idx).is_none_or(|cell| cell.trim().is_empty()));
    if !needs_fill {
        return Ok(false);
    }

    let total: f64 = rows
        .iter()
        .filter_map(|row| row.get(year_idx))
        .filter_map(|cell| cell.trim().parse::<f64>().ok())
        .sum();

    for row in rows.iter_mut() {
        let year = row
            .get(year_idx)
            .and_then(|cell| cell.trim().parse::<f64>().ok())
            .unwrap_or(0.0);
        let percent = if total > 0.0 {
            year / total * 100.0
        } else {
            0.0
        };
        if let Some(cell) = row.get_mut(percent_idx) {
            *cell = percent.to_string();
        }
    }
    Ok(true)
}
