use thiserror::Error;

/// Fatal pipeline conditions. Each of these is detected before aggregation
/// and reconciliation run, and short-circuits the pipeline with no partial
/// output. Unmatched names are advisory, not an error, and never appear
/// here.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// No header matched the state/UT heuristics and no textual fallback
    /// column exists. Checked before the metric column.
    #[error("no state/UT column found in the uploaded data")]
    MissingNameColumn,
    /// No column holds values coercible to a numeric metric.
    #[error("no numeric metric column found in the uploaded data")]
    MissingMetricColumn,
    /// Boundary dataset is unusable: empty, or its first feature carries no
    /// properties to detect a name field from.
    #[error("malformed boundary data: {0}")]
    MalformedBoundary(String),
    /// An explicitly requested column is not present in the header row.
    #[error("column '{0}' not found in the uploaded data")]
    UnknownColumn(String),
}
