//! Vecol: a virtual ecologist for simulated population abundance.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all vecol sub-crates. For most users, adding `vecol` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use vecol::prelude::*;
//!
//! // A 4×4 field over 3 time steps, 1 map unit per cell.
//! let field = AbundanceField::from_fn(4, 4, 3, |col, row, t| f64::from(col + row + t)).unwrap();
//! let meta = SimMetadata::new("demo", RasterGeometry::unit(4, 4).unwrap());
//!
//! // Two survey sites, binomial detection at 70%.
//! let request = ObservationRequest::builder()
//!     .strategy(SamplingStrategy::monitoring(vec![
//!         Site::new(0.5, 0.5),
//!         Site::new(2.5, 3.5),
//!     ]))
//!     .obs_error(ObsErrorKind::Binomial)
//!     .obs_error_param(Some(0.7))
//!     .build()
//!     .unwrap();
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let table = get_observations(&field, &meta, &request, &mut rng).unwrap();
//! assert!(table.iter().all(|row| row.time_step <= 3 && row.observer_id.is_some()));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `vecol-core` | Records, tables, input tables, errors, progress and cancellation |
//! | [`grid`] | `vecol-grid` | Raster geometry, abundance fields, the `GridAccess` trait |
//! | [`obs`] | `vecol-obs` | Sampling strategies, observer turnover, observation error |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, errors and seams (`vecol-core`).
///
/// Contains [`types::ObservationTable`], the loosely typed
/// [`types::RawTable`] input, and the [`types::ProgressSink`] and
/// [`types::CancelToken`] seams.
pub use vecol_core as types;

/// Raster geometry and field access (`vecol-grid`).
///
/// Implement [`grid::GridAccess`] to sample from a raster source other
/// than the in-memory [`grid::AbundanceField`].
pub use vecol_grid as grid;

/// Sampling strategies and observation error (`vecol-obs`).
///
/// The entry points are [`obs::get_observations`] and
/// [`obs::get_observations_with`].
pub use vecol_obs as obs;

/// Common imports for typical vecol usage.
///
/// ```rust
/// use vecol::prelude::*;
/// ```
pub mod prelude {
    // Records and inputs
    pub use vecol_core::{
        CancelToken, ObservationRecord, ObservationTable, ObserverSession, ProgressSink, RawTable,
        SamplePoint, Site,
    };

    // Errors
    pub use vecol_core::{LookupError, ObserveError, ValidationError};

    // Grid
    pub use vecol_grid::{AbundanceField, Extent, GridAccess, RasterGeometry, SimMetadata};

    // Sampling
    pub use vecol_obs::{
        get_observations, get_observations_with, Execution, LookupPolicy, ObsErrorKind,
        ObservationRequest, RunContext, SamplingStrategy, StrategyKind, StrategyParams,
    };
}
