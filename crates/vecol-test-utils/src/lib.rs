//! Test fixtures and recording sinks for vecol development.
//!
//! Provides small abundance fields with known values ([`ramp_field`],
//! [`corner_missing_3x3`]) on unit geometry, and a [`RecordingProgress`]
//! sink that counts what a sampler reported.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use vecol_core::{CancelToken, ProgressSink};
use vecol_grid::{AbundanceField, RasterGeometry, SimMetadata};

/// Metadata for an `ncols × nrows` unit-resolution raster.
///
/// Cell `(col, row)` has centre `(col + 0.5, nrows - row - 0.5)`.
pub fn unit_meta(ncols: u32, nrows: u32) -> SimMetadata {
    let geometry = RasterGeometry::unit(ncols, nrows).expect("non-empty unit raster");
    SimMetadata::new(format!("unit_{ncols}x{nrows}"), geometry)
}

/// A field whose every value encodes its own position:
/// `100 * time_step + 10 * row + col`.
pub fn ramp_field(ncols: u32, nrows: u32, layers: u32) -> (AbundanceField, SimMetadata) {
    let field = AbundanceField::from_fn(ncols, nrows, layers, |c, r, t| {
        f64::from(100 * t + 10 * r + c)
    })
    .expect("valid ramp dimensions");
    (field, unit_meta(ncols, nrows))
}

/// A 3×3 field with the north-west corner missing in every layer and
/// positive counts elsewhere.
pub fn corner_missing_3x3(layers: u32) -> (AbundanceField, SimMetadata) {
    let field = AbundanceField::from_fn(3, 3, layers, |c, r, t| {
        if (c, r) == (0, 0) {
            f64::NAN
        } else {
            f64::from(t + r * 3 + c)
        }
    })
    .expect("valid 3x3 field");
    (field, unit_meta(3, 3))
}

/// Progress sink that records what it was told.
///
/// With [`cancelling_after`](RecordingProgress::cancelling_after) it also
/// triggers a [`CancelToken`] once a given number of ticks arrived.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub total: Option<usize>,
    pub ticks: usize,
    pub finished: bool,
    cancel_at: Option<(usize, CancelToken)>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel `token` when the `ticks`-th tick arrives.
    pub fn cancelling_after(ticks: usize, token: CancelToken) -> Self {
        Self {
            cancel_at: Some((ticks, token)),
            ..Self::default()
        }
    }
}

impl ProgressSink for RecordingProgress {
    fn begin(&mut self, total: usize) {
        self.total = Some(total);
    }

    fn tick(&mut self) {
        self.ticks += 1;
        if let Some((at, token)) = &self.cancel_at {
            if self.ticks == *at {
                token.cancel();
            }
        }
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_values_encode_position() {
        let (field, meta) = ramp_field(4, 3, 2);
        assert_eq!(field.value(3, 2, 2), Some(223.0));
        assert_eq!(meta.geometry.cell_center(0, 0), (0.5, 2.5));
    }

    #[test]
    fn corner_is_missing() {
        let (field, _) = corner_missing_3x3(1);
        assert_eq!(field.value(0, 0, 1), None);
        assert_eq!(field.value(2, 2, 1), Some(9.0));
    }

    #[test]
    fn recording_sink_cancels_on_schedule() {
        let token = CancelToken::new();
        let mut sink = RecordingProgress::cancelling_after(2, token.clone());
        sink.begin(5);
        sink.tick();
        assert!(!token.is_cancelled());
        sink.tick();
        assert!(token.is_cancelled());
        assert_eq!(sink.total, Some(5));
    }
}
