//! Error types for the vecol observation pipeline.
//!
//! Organized by failure class: argument validation (raised before any
//! random draw), grid lookups outside the field's domain, and the
//! top-level [`ObserveError`] returned by the dispatcher.

use std::error::Error;
use std::fmt;

/// A malformed request, detected before sampling begins.
///
/// No random numbers are consumed and no progress is reported when a
/// call fails with one of these.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationError {
    /// No sampling strategy was selected.
    MissingStrategy,
    /// Strategy name is not one of the four known strategies.
    UnknownStrategy {
        /// The name that was supplied.
        name: String,
    },
    /// Error-model name is not one of the two known models.
    UnknownErrorModel {
        /// The name that was supplied.
        name: String,
    },
    /// The observation-error parameter is not a single finite number, or
    /// is outside the range accepted by the selected model.
    InvalidErrorParam {
        /// Description of the violated constraint.
        reason: String,
    },
    /// Sampling proportion outside `(0, 1]`.
    ProportionOutOfRange {
        /// The rejected value.
        value: f64,
    },
    /// Dwell probability outside `(0, 1]`.
    ProbabilityOutOfRange {
        /// The rejected value.
        value: f64,
    },
    /// A required column is absent from an input table.
    MissingColumn {
        /// Name of the absent column.
        column: String,
    },
    /// A required column holds non-numeric data.
    NonNumericColumn {
        /// Name of the offending column.
        column: String,
    },
    /// A required column holds a missing or non-finite value.
    MissingValue {
        /// Name of the offending column.
        column: String,
        /// Zero-based row of the first missing value.
        row: usize,
    },
    /// Columns of an input table have different lengths.
    ColumnLengthMismatch {
        /// Name of the first column whose length differs.
        column: String,
        /// Length of that column.
        len: usize,
        /// Length of the table's first column.
        expected: usize,
    },
    /// The table has columns beyond the ones the input accepts.
    UnexpectedColumns {
        /// Names of the extra columns.
        columns: Vec<String>,
    },
    /// An input list that must contain at least one row is empty.
    EmptyInput {
        /// Which input was empty.
        what: &'static str,
    },
    /// A `time_step` is not a positive integer.
    InvalidTimeStep {
        /// Zero-based row of the offending value.
        row: usize,
        /// The offending value.
        value: f64,
    },
    /// The simulation metadata does not describe the supplied field.
    GeometryMismatch {
        /// Description of the mismatch.
        reason: String,
    },
    /// Raster geometry is degenerate (zero cells, inverted extent).
    InvalidGeometry {
        /// Description of the issue.
        reason: String,
    },
    /// Explicit worker count of zero.
    InvalidWorkerCount,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingStrategy => write!(f, "a sampling type is required"),
            Self::UnknownStrategy { name } => write!(
                f,
                "unknown sampling type '{name}', expected one of \
                 random_one_layer, random_all_layers, from_data, monitoring_based"
            ),
            Self::UnknownErrorModel { name } => write!(
                f,
                "unknown observation error '{name}', expected lognormal or binomial"
            ),
            Self::InvalidErrorParam { reason } => {
                write!(f, "invalid observation error parameter: {reason}")
            }
            Self::ProportionOutOfRange { value } => {
                write!(f, "prop must be a number in (0, 1], got {value}")
            }
            Self::ProbabilityOutOfRange { value } => {
                write!(f, "prob must be a number in (0, 1], got {value}")
            }
            Self::MissingColumn { column } => write!(f, "missing required column '{column}'"),
            Self::NonNumericColumn { column } => write!(f, "column '{column}' must be numeric"),
            Self::MissingValue { column, row } => {
                write!(f, "column '{column}' has a missing value at row {row}")
            }
            Self::ColumnLengthMismatch {
                column,
                len,
                expected,
            } => write!(
                f,
                "column '{column}' has {len} rows, expected {expected}"
            ),
            Self::UnexpectedColumns { columns } => {
                write!(f, "unexpected columns: {}", columns.join(", "))
            }
            Self::EmptyInput { what } => write!(f, "{what} must contain at least one row"),
            Self::InvalidTimeStep { row, value } => write!(
                f,
                "time_step at row {row} must be a positive integer, got {value}"
            ),
            Self::GeometryMismatch { reason } => write!(f, "geometry mismatch: {reason}"),
            Self::InvalidGeometry { reason } => write!(f, "invalid geometry: {reason}"),
            Self::InvalidWorkerCount => write!(f, "worker count must be at least 1"),
        }
    }
}

impl Error for ValidationError {}

/// A coordinate or layer outside the field's domain.
#[derive(Clone, Debug, PartialEq)]
pub enum LookupError {
    /// The map coordinate lies outside the raster extent.
    OutsideExtent {
        /// Requested x coordinate.
        x: f64,
        /// Requested y coordinate.
        y: f64,
    },
    /// The requested layer (1-based time step) does not exist.
    LayerOutOfRange {
        /// Requested layer.
        layer: u32,
        /// Number of layers in the field.
        layer_count: u32,
    },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutsideExtent { x, y } => {
                write!(f, "coordinate ({x}, {y}) lies outside the field extent")
            }
            Self::LayerOutOfRange { layer, layer_count } => write!(
                f,
                "time step {layer} out of range, field has {layer_count} layers"
            ),
        }
    }
}

impl Error for LookupError {}

/// Errors returned by the observation dispatcher.
#[derive(Clone, Debug, PartialEq)]
pub enum ObserveError {
    /// The request was rejected before sampling.
    Validation(ValidationError),
    /// An extraction fell outside the field under `LookupPolicy::Fail`.
    Lookup(LookupError),
    /// A count cannot be fed to the selected error model.
    InvalidCount {
        /// The offending value.
        value: f64,
        /// Which model rejected it.
        model: &'static str,
    },
    /// The run was cancelled before completion; no rows are returned.
    Cancelled,
    /// A worker thread panicked or disconnected.
    WorkerFailed {
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for ObserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "validation: {e}"),
            Self::Lookup(e) => write!(f, "lookup: {e}"),
            Self::InvalidCount { value, model } => {
                write!(f, "{model} error model cannot use count {value}")
            }
            Self::Cancelled => write!(f, "sampling cancelled"),
            Self::WorkerFailed { reason } => write!(f, "worker failed: {reason}"),
        }
    }
}

impl Error for ObserveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Lookup(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for ObserveError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<LookupError> for ObserveError {
    fn from(e: LookupError) -> Self {
        Self::Lookup(e)
    }
}
