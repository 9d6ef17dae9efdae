//! Extraction at a caller-supplied list of `(x, y, time_step)` points.
//!
//! Points are grouped by time step so each layer is resolved once, then
//! written back by their original row index: the output has exactly one
//! row per input point, in input order.

use std::collections::BTreeMap;

use vecol_core::{ObservationRecord, ObservationTable, ObserveError, SamplePoint, ValidationError};
use vecol_grid::GridAccess;

use crate::lookup::LookupPolicy;

/// Check a typed point list: non-empty, finite coordinates, positive
/// time steps.
pub fn validate_points(points: &[SamplePoint]) -> Result<(), ValidationError> {
    if points.is_empty() {
        return Err(ValidationError::EmptyInput { what: "points" });
    }
    for (row, p) in points.iter().enumerate() {
        if !p.x.is_finite() {
            return Err(ValidationError::MissingValue {
                column: "x".into(),
                row,
            });
        }
        if !p.y.is_finite() {
            return Err(ValidationError::MissingValue {
                column: "y".into(),
                row,
            });
        }
        if p.time_step == 0 {
            return Err(ValidationError::InvalidTimeStep { row, value: 0.0 });
        }
    }
    Ok(())
}

/// Read the field at every point, preserving input order.
pub fn sample_points(
    grid: &dyn GridAccess,
    points: &[SamplePoint],
    policy: LookupPolicy,
) -> Result<ObservationTable, ObserveError> {
    validate_points(points)?;

    let mut by_step: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (i, p) in points.iter().enumerate() {
        by_step.entry(p.time_step).or_default().push(i);
    }

    let mut values: Vec<Option<f64>> = vec![None; points.len()];
    let mut misses = 0;
    for (&step, rows) in &by_step {
        let coords: Vec<(f64, f64)> = rows.iter().map(|&i| (points[i].x, points[i].y)).collect();
        for (&i, value) in rows.iter().zip(grid.extract_layer(step, &coords)) {
            values[i] = policy.resolve(value, &mut misses)?;
        }
    }
    if misses > 0 {
        log::warn!("{misses} of {} points fell outside the field and were recorded as missing", points.len());
    }
    log::trace!("extracted {} points over {} time steps", points.len(), by_step.len());

    Ok(points
        .iter()
        .zip(values)
        .map(|(p, n)| ObservationRecord {
            x: p.x,
            y: p.y,
            time_step: p.time_step,
            n,
            observer_id: None,
        })
        .collect::<Vec<_>>()
        .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vecol_core::LookupError;
    use vecol_grid::RasterGrid;
    use vecol_test_utils::ramp_field;

    // ramp_field value = 100 * t + 10 * row + col; unit cells, origin
    // south-west, so cell (col, row) has centre (col + 0.5, nrows - row - 0.5).

    #[test]
    fn two_points_at_distinct_steps() {
        let (field, meta) = ramp_field(4, 4, 3);
        let grid = RasterGrid::bind(&field, &meta).unwrap();
        let points = [SamplePoint::new(2.5, 3.5, 3), SamplePoint::new(0.5, 0.5, 1)];
        let table = sample_points(&grid, &points, LookupPolicy::MissingMarker).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].n, Some(302.0));
        assert_eq!(table.rows()[1].n, Some(130.0));
        assert_eq!(table.rows()[0].time_step, 3);
    }

    #[test]
    fn out_of_domain_becomes_missing_marker() {
        let (field, meta) = ramp_field(3, 3, 2);
        let grid = RasterGrid::bind(&field, &meta).unwrap();
        let points = [
            SamplePoint::new(0.5, 0.5, 1),
            SamplePoint::new(50.0, 0.5, 1),
            SamplePoint::new(0.5, 0.5, 9),
        ];
        let table = sample_points(&grid, &points, LookupPolicy::MissingMarker).unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.rows()[0].n.is_some());
        assert!(table.rows()[1].n.is_none());
        assert!(table.rows()[2].n.is_none());
    }

    #[test]
    fn out_of_domain_fails_under_fail_policy() {
        let (field, meta) = ramp_field(3, 3, 2);
        let grid = RasterGrid::bind(&field, &meta).unwrap();
        let points = [SamplePoint::new(0.5, 0.5, 4)];
        assert_eq!(
            sample_points(&grid, &points, LookupPolicy::Fail),
            Err(ObserveError::Lookup(LookupError::LayerOutOfRange {
                layer: 4,
                layer_count: 2
            }))
        );
    }

    #[test]
    fn rejects_empty_and_non_finite() {
        let (field, meta) = ramp_field(3, 3, 1);
        let grid = RasterGrid::bind(&field, &meta).unwrap();
        assert!(matches!(
            sample_points(&grid, &[], LookupPolicy::MissingMarker),
            Err(ObserveError::Validation(ValidationError::EmptyInput { .. }))
        ));
        let points = [SamplePoint::new(0.5, f64::NAN, 1)];
        assert!(matches!(
            sample_points(&grid, &points, LookupPolicy::MissingMarker),
            Err(ObserveError::Validation(ValidationError::MissingValue { .. }))
        ));
        let points = [SamplePoint::new(0.5, 0.5, 0)];
        assert!(matches!(
            sample_points(&grid, &points, LookupPolicy::MissingMarker),
            Err(ObserveError::Validation(ValidationError::InvalidTimeStep { .. }))
        ));
    }

    proptest! {
        #[test]
        fn order_and_values_preserved(
            raw in prop::collection::vec((0u32..6, 0u32..5, 1u32..4), 1..60),
        ) {
            let (field, meta) = ramp_field(6, 5, 3);
            let grid = RasterGrid::bind(&field, &meta).unwrap();
            let points: Vec<SamplePoint> = raw
                .iter()
                .map(|&(c, r, t)| {
                    let (x, y) = meta.geometry.cell_center(c, r);
                    SamplePoint::new(x, y, t)
                })
                .collect();
            let table = sample_points(&grid, &points, LookupPolicy::MissingMarker).unwrap();
            prop_assert_eq!(table.len(), points.len());
            for ((row, p), &(c, r, t)) in table.iter().zip(&points).zip(&raw) {
                prop_assert_eq!((row.x, row.y, row.time_step), (p.x, p.y, p.time_step));
                prop_assert_eq!(row.n, Some(f64::from(100 * t + 10 * r + c)));
            }
        }
    }
}
