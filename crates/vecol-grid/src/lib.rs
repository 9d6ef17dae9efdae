//! Raster geometry and abundance-field access for vecol.
//!
//! This crate defines the [`GridAccess`] trait, the read-only view
//! through which every sampler reads the simulated abundance field,
//! together with the in-memory [`AbundanceField`] and the
//! [`RasterGeometry`] that maps map coordinates onto its cells.
//!
//! File formats and reprojection belong to the upstream geospatial
//! provider; this crate only consumes the declared extent and CRS.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod access;
pub mod field;
pub mod geometry;

pub use access::{GridAccess, RasterGrid};
pub use field::{AbundanceField, SimMetadata};
pub use geometry::{Extent, RasterGeometry};
