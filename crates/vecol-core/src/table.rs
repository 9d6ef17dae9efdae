//! Loosely typed tabular input.
//!
//! Point lists and site lists often arrive as data frames read from
//! survey files. [`RawTable`] keeps that shape (named columns, possibly
//! textual, possibly with gaps) so that malformed input is rejected with
//! a [`ValidationError`] naming the column, instead of being impossible
//! to express.

use indexmap::IndexMap;

use crate::error::ValidationError;
use crate::record::{SamplePoint, Site};

/// One named column of a [`RawTable`].
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    /// Numbers; `None` marks a missing entry.
    Numeric(Vec<Option<f64>>),
    /// Free text.
    Text(Vec<String>),
}

impl Column {
    /// Number of entries.
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Text(v) => v.len(),
        }
    }

    /// Returns `true` if the column has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<f64>> for Column {
    fn from(v: Vec<f64>) -> Self {
        Self::Numeric(v.into_iter().map(Some).collect())
    }
}

impl From<Vec<Option<f64>>> for Column {
    fn from(v: Vec<Option<f64>>) -> Self {
        Self::Numeric(v)
    }
}

impl From<Vec<String>> for Column {
    fn from(v: Vec<String>) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<&str>> for Column {
    fn from(v: Vec<&str>) -> Self {
        Self::Text(v.into_iter().map(str::to_owned).collect())
    }
}

/// Named columns in insertion order.
///
/// # Examples
///
/// ```
/// use vecol_core::RawTable;
///
/// let table = RawTable::new()
///     .with_column("x", vec![0.5, 1.5])
///     .with_column("y", vec![0.5, 0.5])
///     .with_column("time_step", vec![1.0, 2.0]);
///
/// let points = table.to_points().unwrap();
/// assert_eq!(points.len(), 2);
/// assert_eq!(points[1].time_step, 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawTable {
    columns: IndexMap<String, Column>,
}

impl RawTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a column, builder style.
    pub fn with_column(mut self, name: impl Into<String>, column: impl Into<Column>) -> Self {
        self.insert(name, column);
        self
    }

    /// Add (or replace) a column.
    pub fn insert(&mut self, name: impl Into<String>, column: impl Into<Column>) {
        self.columns.insert(name.into(), column.into());
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.keys().map(String::as_str)
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows, i.e. the length of the first column.
    pub fn nrows(&self) -> usize {
        self.columns.values().next().map_or(0, Column::len)
    }

    /// Check that every column has the same length and return it.
    fn checked_nrows(&self) -> Result<usize, ValidationError> {
        let expected = self.nrows();
        for (name, col) in &self.columns {
            if col.len() != expected {
                return Err(ValidationError::ColumnLengthMismatch {
                    column: name.clone(),
                    len: col.len(),
                    expected,
                });
            }
        }
        Ok(expected)
    }

    /// Extract a required numeric column with no missing or non-finite
    /// entries.
    fn numeric(&self, name: &str) -> Result<Vec<f64>, ValidationError> {
        let col = self
            .columns
            .get(name)
            .ok_or_else(|| ValidationError::MissingColumn {
                column: name.to_owned(),
            })?;
        let Column::Numeric(values) = col else {
            return Err(ValidationError::NonNumericColumn {
                column: name.to_owned(),
            });
        };
        values
            .iter()
            .enumerate()
            .map(|(row, v)| match v {
                Some(v) if v.is_finite() => Ok(*v),
                _ => Err(ValidationError::MissingValue {
                    column: name.to_owned(),
                    row,
                }),
            })
            .collect()
    }

    /// Convert to point requests.
    ///
    /// Requires numeric `x`, `y` and `time_step` columns without missing
    /// values and at least one row; `time_step` must hold positive
    /// integers. Other columns are ignored.
    pub fn to_points(&self) -> Result<Vec<SamplePoint>, ValidationError> {
        let nrows = self.checked_nrows()?;
        let xs = self.numeric("x")?;
        let ys = self.numeric("y")?;
        let ts = self.numeric("time_step")?;
        if nrows == 0 {
            return Err(ValidationError::EmptyInput { what: "points" });
        }

        xs.into_iter()
            .zip(ys)
            .zip(ts)
            .enumerate()
            .map(|(row, ((x, y), t))| {
                let time_step = time_step_from_f64(t)
                    .ok_or(ValidationError::InvalidTimeStep { row, value: t })?;
                Ok(SamplePoint::new(x, y, time_step))
            })
            .collect()
    }

    /// Convert to survey sites.
    ///
    /// Requires exactly two numeric columns, `x` and `y`, without missing
    /// values and at least one row.
    pub fn to_sites(&self) -> Result<Vec<Site>, ValidationError> {
        let extra: Vec<String> = self
            .column_names()
            .filter(|name| *name != "x" && *name != "y")
            .map(str::to_owned)
            .collect();
        if !extra.is_empty() {
            return Err(ValidationError::UnexpectedColumns { columns: extra });
        }
        let nrows = self.checked_nrows()?;
        let xs = self.numeric("x")?;
        let ys = self.numeric("y")?;
        if nrows == 0 {
            return Err(ValidationError::EmptyInput { what: "cells_coords" });
        }
        Ok(xs.into_iter().zip(ys).map(|(x, y)| Site::new(x, y)).collect())
    }
}

/// Interpret a float as a 1-based time step.
pub(crate) fn time_step_from_f64(t: f64) -> Option<u32> {
    if t.is_finite() && t >= 1.0 && t.fract() == 0.0 && t <= f64::from(u32::MAX) {
        Some(t as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points_table() -> RawTable {
        RawTable::new()
            .with_column("x", vec![0.5, 1.5, 2.5])
            .with_column("y", vec![2.5, 1.5, 0.5])
            .with_column("time_step", vec![3.0, 1.0, 2.0])
    }

    // ---------------------------------------------------------------
    // Points
    // ---------------------------------------------------------------

    #[test]
    fn points_keep_row_order() {
        let points = points_table().to_points().unwrap();
        let steps: Vec<u32> = points.iter().map(|p| p.time_step).collect();
        assert_eq!(steps, vec![3, 1, 2]);
        assert_eq!(points[0], SamplePoint::new(0.5, 2.5, 3));
    }

    #[test]
    fn points_ignore_extra_columns() {
        let table = points_table().with_column("note", vec!["a", "b", "c"]);
        assert_eq!(table.to_points().unwrap().len(), 3);
    }

    #[test]
    fn points_reject_missing_column() {
        let table = RawTable::new()
            .with_column("x", vec![0.5])
            .with_column("y", vec![0.5]);
        assert_eq!(
            table.to_points(),
            Err(ValidationError::MissingColumn {
                column: "time_step".into()
            })
        );
    }

    #[test]
    fn points_reject_text_column() {
        let table = points_table().with_column("y", vec!["a", "b", "c"]);
        assert!(matches!(
            table.to_points(),
            Err(ValidationError::NonNumericColumn { column }) if column == "y"
        ));
    }

    #[test]
    fn points_reject_missing_value() {
        let table = points_table().with_column("x", vec![Some(0.5), None, Some(1.0)]);
        assert_eq!(
            table.to_points(),
            Err(ValidationError::MissingValue {
                column: "x".into(),
                row: 1
            })
        );
    }

    #[test]
    fn points_reject_nan_as_missing() {
        let table = points_table().with_column("y", vec![0.5, f64::NAN, 0.5]);
        assert!(matches!(
            table.to_points(),
            Err(ValidationError::MissingValue { row: 1, .. })
        ));
    }

    #[test]
    fn points_reject_empty() {
        let table = RawTable::new()
            .with_column("x", Vec::<f64>::new())
            .with_column("y", Vec::<f64>::new())
            .with_column("time_step", Vec::<f64>::new());
        assert_eq!(
            table.to_points(),
            Err(ValidationError::EmptyInput { what: "points" })
        );
    }

    #[test]
    fn points_reject_fractional_time_step() {
        let table = points_table().with_column("time_step", vec![1.0, 1.5, 2.0]);
        assert!(matches!(
            table.to_points(),
            Err(ValidationError::InvalidTimeStep { row: 1, .. })
        ));
    }

    #[test]
    fn ragged_columns_rejected() {
        let table = points_table().with_column("y", vec![0.5]);
        assert!(matches!(
            table.to_points(),
            Err(ValidationError::ColumnLengthMismatch { .. })
        ));
    }

    // ---------------------------------------------------------------
    // Sites
    // ---------------------------------------------------------------

    #[test]
    fn sites_from_two_columns() {
        let table = RawTable::new()
            .with_column("x", vec![0.5, 1.5])
            .with_column("y", vec![0.5, 2.5]);
        assert_eq!(
            table.to_sites().unwrap(),
            vec![Site::new(0.5, 0.5), Site::new(1.5, 2.5)]
        );
    }

    #[test]
    fn sites_reject_extra_columns() {
        let table = RawTable::new()
            .with_column("x", vec![0.5])
            .with_column("y", vec![0.5])
            .with_column("time_step", vec![1.0]);
        assert!(matches!(
            table.to_sites(),
            Err(ValidationError::UnexpectedColumns { columns }) if columns == vec!["time_step"]
        ));
    }

    #[test]
    fn sites_reject_missing_coordinate() {
        let table = RawTable::new()
            .with_column("x", vec![Some(0.5), None])
            .with_column("y", vec![0.5, 0.5]);
        assert!(matches!(
            table.to_sites(),
            Err(ValidationError::MissingValue { row: 1, .. })
        ));
    }

    #[test]
    fn time_step_conversion() {
        assert_eq!(time_step_from_f64(1.0), Some(1));
        assert_eq!(time_step_from_f64(0.0), None);
        assert_eq!(time_step_from_f64(-2.0), None);
        assert_eq!(time_step_from_f64(2.25), None);
        assert_eq!(time_step_from_f64(f64::INFINITY), None);
    }
}
