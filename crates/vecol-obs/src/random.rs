//! Random spatial sampling of grid cells.
//!
//! Two variants:
//! - **one layer**: cells are drawn once from layer 1 and the same
//!   coordinates are read at every time step.
//! - **all layers**: every layer draws its own cells, independently.
//!
//! In both, the per-layer sample size is `round(non_missing × prop)` and
//! only non-missing cells are eligible. Rows are time-major.

use rand::RngCore;
use vecol_core::{CancelToken, ObservationRecord, ObservationTable, ObserveError, ValidationError};
use vecol_grid::GridAccess;

use crate::exec::{run_units, unit_rng, Execution};

/// Default sampling proportion.
pub const DEFAULT_PROP: f64 = 0.1;

/// Check that `prop` is a finite number in `(0, 1]`.
pub fn validate_prop(prop: f64) -> Result<(), ValidationError> {
    if prop > 0.0 && prop <= 1.0 {
        Ok(())
    } else {
        Err(ValidationError::ProportionOutOfRange { value: prop })
    }
}

/// Number of cells drawn from a layer with `non_missing` eligible cells.
pub fn target_size(non_missing: usize, prop: f64) -> usize {
    ((non_missing as f64 * prop).round() as usize).min(non_missing)
}

fn layer_rows(
    grid: &dyn GridAccess,
    layer: u32,
    cells: &[(f64, f64)],
) -> Result<Vec<ObservationRecord>, ObserveError> {
    grid.extract_layer(layer, cells)
        .into_iter()
        .zip(cells)
        .map(|(value, &(x, y))| {
            Ok(ObservationRecord {
                x,
                y,
                time_step: layer,
                n: value?,
                observer_id: None,
            })
        })
        .collect()
}

/// Draw one set of cells from layer 1 and read it at every time step.
///
/// Produces `size × layer_count` rows, all time steps sharing the same
/// coordinates in the same order.
pub fn sample_one_layer(
    grid: &dyn GridAccess,
    prop: f64,
    rng: &mut dyn RngCore,
) -> Result<ObservationTable, ObserveError> {
    validate_prop(prop)?;
    let size = target_size(grid.non_missing_count(1)?, prop);
    let cells = grid.sample_cells(1, size, rng)?;
    log::trace!("one-layer sample: {} cells reused across {} layers", cells.len(), grid.layer_count());

    let mut rows = Vec::with_capacity(cells.len() * grid.layer_count() as usize);
    for layer in 1..=grid.layer_count() {
        rows.extend(layer_rows(grid, layer, &cells)?);
    }
    Ok(rows.into())
}

/// Draw an independent set of cells for every layer.
///
/// Layer `t` uses random stream `t - 1` of `master`, so the result is
/// the same under every [`Execution`].
pub fn sample_all_layers(
    grid: &dyn GridAccess,
    prop: f64,
    master: u64,
    execution: Execution,
    cancel: &CancelToken,
) -> Result<ObservationTable, ObserveError> {
    validate_prop(prop)?;
    let layers = grid.layer_count() as usize;
    let per_layer = run_units(execution, layers, cancel, None, |i| {
        let layer = i as u32 + 1;
        let mut rng = unit_rng(master, i);
        let size = target_size(grid.non_missing_count(layer)?, prop);
        let cells = grid.sample_cells(layer, size, &mut rng)?;
        log::trace!("layer {layer}: sampled {} cells", cells.len());
        layer_rows(grid, layer, &cells)
    })?;
    Ok(per_layer.into_iter().flatten().collect::<Vec<_>>().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;
    use vecol_grid::RasterGrid;
    use vecol_test_utils::{corner_missing_3x3, ramp_field, unit_meta};

    fn coord_set(table: &ObservationTable, t: u32) -> HashSet<(u64, u64)> {
        table
            .coords_at(t)
            .into_iter()
            .map(|(x, y)| (x.to_bits(), y.to_bits()))
            .collect()
    }

    #[test]
    fn prop_bounds() {
        assert!(validate_prop(1.0).is_ok());
        assert!(validate_prop(0.0001).is_ok());
        for bad in [0.0, -0.5, 1.5, f64::NAN, f64::INFINITY] {
            assert!(validate_prop(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn target_size_rounds_and_clips() {
        assert_eq!(target_size(8, 1.0), 8);
        assert_eq!(target_size(8, 0.5), 4);
        assert_eq!(target_size(10, 0.25), 3);
        assert_eq!(target_size(0, 0.5), 0);
    }

    #[test]
    fn one_layer_full_sample_of_corner_grid() {
        let (field, meta) = corner_missing_3x3(2);
        let grid = RasterGrid::bind(&field, &meta).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let table = sample_one_layer(&grid, 1.0, &mut rng).unwrap();

        assert_eq!(table.len(), 16);
        assert_eq!(table.rows_at(1).count(), 8);
        assert_eq!(table.rows_at(2).count(), 8);
        assert_eq!(coord_set(&table, 1), coord_set(&table, 2));
        assert!(table.iter().all(|r| r.n.is_some() && r.observer_id.is_none()));
    }

    #[test]
    fn one_layer_rows_are_time_major() {
        let (field, meta) = ramp_field(4, 4, 3);
        let grid = RasterGrid::bind(&field, &meta).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let table = sample_one_layer(&grid, 0.5, &mut rng).unwrap();
        let steps: Vec<u32> = table.iter().map(|r| r.time_step).collect();
        let mut sorted = steps.clone();
        sorted.sort_unstable();
        assert_eq!(steps, sorted);
        assert_eq!(table.coords_at(1), table.coords_at(3));
    }

    #[test]
    fn all_layers_sizes_and_independence() {
        let (field, meta) = ramp_field(10, 10, 4);
        let grid = RasterGrid::bind(&field, &meta).unwrap();
        let cancel = CancelToken::new();
        let table =
            sample_all_layers(&grid, 0.2, 123, Execution::Sequential, &cancel).unwrap();
        for t in 1..=4 {
            assert_eq!(table.rows_at(t).count(), 20);
        }
        let distinct: HashSet<_> = (1..=4).map(|t| {
            let mut v: Vec<_> = coord_set(&table, t).into_iter().collect();
            v.sort_unstable();
            v
        }).collect();
        assert!(distinct.len() > 1, "independent draws should differ across layers");
    }

    #[test]
    fn all_layers_is_executor_independent() {
        let (field, meta) = ramp_field(12, 9, 6);
        let grid = RasterGrid::bind(&field, &meta).unwrap();
        let cancel = CancelToken::new();
        let seq = sample_all_layers(&grid, 0.3, 9, Execution::Sequential, &cancel).unwrap();
        let par = sample_all_layers(
            &grid,
            0.3,
            9,
            Execution::Threaded { workers: Some(3) },
            &cancel,
        )
        .unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn values_match_field() {
        let (field, meta) = ramp_field(5, 5, 2);
        let grid = RasterGrid::bind(&field, &meta).unwrap();
        let cancel = CancelToken::new();
        let table = sample_all_layers(&grid, 1.0, 3, Execution::Sequential, &cancel).unwrap();
        for r in &table {
            assert_eq!(r.n, grid.extract(r.x, r.y, r.time_step).unwrap());
        }
    }

    #[test]
    fn missing_cells_vary_per_layer() {
        // Layer 2 loses its whole first row.
        let field = vecol_grid::AbundanceField::from_fn(3, 3, 2, |_, r, t| {
            if t == 2 && r == 0 { f64::NAN } else { 1.0 }
        })
        .unwrap();
        let meta = unit_meta(3, 3);
        let grid = RasterGrid::bind(&field, &meta).unwrap();
        let cancel = CancelToken::new();
        let table = sample_all_layers(&grid, 1.0, 0, Execution::Sequential, &cancel).unwrap();
        assert_eq!(table.rows_at(1).count(), 9);
        assert_eq!(table.rows_at(2).count(), 6);
        assert!(table.iter().all(|r| r.n.is_some()));
    }

    proptest! {
        #[test]
        fn one_layer_coordinates_identical_across_steps(
            prop in 0.05f64..=1.0,
            layers in 1u32..5,
            seed in any::<u64>(),
        ) {
            let (field, meta) = ramp_field(6, 5, layers);
            let grid = RasterGrid::bind(&field, &meta).unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let table = sample_one_layer(&grid, prop, &mut rng).unwrap();
            let first = table.coords_at(1);
            prop_assert_eq!(first.len(), target_size(30, prop));
            for t in 2..=layers {
                prop_assert_eq!(&table.coords_at(t), &first);
            }
        }
    }
}
