//! Benchmark profiles for the vecol samplers.
//!
//! - [`reference_profile`]: 100x100 cells over 50 time steps with a
//!   patchy study area (about a fifth of the cells missing).
//! - [`survey_sites`]: deterministic site placement via seed.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use vecol_core::Site;
use vecol_grid::{AbundanceField, Extent, RasterGeometry, SimMetadata};

/// Side length of the reference raster.
pub const SIDE: u32 = 100;

/// Time steps in the reference profile.
pub const LAYERS: u32 = 50;

/// Build the reference field and its metadata: 1 km cells, counts
/// growing over time, roughly 20% of cells outside the study area.
pub fn reference_profile(seed: u64) -> (AbundanceField, SimMetadata) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let outside: Vec<bool> = (0..SIDE * SIDE).map(|_| rng.random_bool(0.2)).collect();
    let field = AbundanceField::from_fn(SIDE, SIDE, LAYERS, |c, r, t| {
        if outside[(r * SIDE + c) as usize] {
            f64::NAN
        } else {
            f64::from((c + r) % 17 + t)
        }
    })
    .expect("reference dimensions are valid");
    let side_m = f64::from(SIDE) * 1000.0;
    let geometry = RasterGeometry::new(
        SIDE,
        SIDE,
        Extent::new(0.0, side_m, 0.0, side_m),
        Some("EPSG:3035".into()),
    )
    .expect("reference extent is valid");
    (field, SimMetadata::new("reference", geometry))
}

/// `count` survey sites at cell centres of the reference raster, chosen
/// uniformly with replacement.
pub fn survey_sites(count: usize, seed: u64) -> Vec<Site> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let col = rng.random_range(0..SIDE);
            let row = rng.random_range(0..SIDE);
            Site::new(
                (f64::from(col) + 0.5) * 1000.0,
                (f64::from(row) + 0.5) * 1000.0,
            )
        })
        .collect()
}
