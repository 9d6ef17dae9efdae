//! The [`GridAccess`] trait and its raster-backed implementation.

use rand::seq::index;
use rand::RngCore;
use vecol_core::{LookupError, ValidationError};

use crate::field::{AbundanceField, SimMetadata};
use crate::geometry::RasterGeometry;

/// Read-only access to an abundance field over space and time.
///
/// Every sampler goes through this trait. Coordinates are map units,
/// layers are 1-based time steps. A lookup has three outcomes: a value,
/// a missing cell (`Ok(None)`), or a request outside the field's domain
/// (`Err`).
///
/// The trait is object safe; the random source is passed as
/// `&mut dyn RngCore`.
pub trait GridAccess: Send + Sync {
    /// Number of time steps.
    fn layer_count(&self) -> u32;

    /// Geometry used to map coordinates to cells.
    fn geometry(&self) -> &RasterGeometry;

    /// Value at `(x, y)` in `layer`.
    fn extract(&self, x: f64, y: f64, layer: u32) -> Result<Option<f64>, LookupError>;

    /// Batch extraction of many coordinates from one layer.
    ///
    /// Default implementation calls [`extract`](Self::extract) per
    /// coordinate. Backends may override to resolve the layer once.
    fn extract_layer(
        &self,
        layer: u32,
        coords: &[(f64, f64)],
    ) -> Vec<Result<Option<f64>, LookupError>> {
        coords
            .iter()
            .map(|&(x, y)| self.extract(x, y, layer))
            .collect()
    }

    /// Number of non-missing cells in `layer`.
    fn non_missing_count(&self, layer: u32) -> Result<usize, LookupError>;

    /// Draw up to `count` distinct non-missing cells of `layer` uniformly
    /// without replacement, returned as cell centres in draw order.
    fn sample_cells(
        &self,
        layer: u32,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<(f64, f64)>, LookupError>;
}

/// An [`AbundanceField`] bound to its declared [`RasterGeometry`].
#[derive(Clone, Copy, Debug)]
pub struct RasterGrid<'a> {
    field: &'a AbundanceField,
    geometry: &'a RasterGeometry,
}

impl<'a> RasterGrid<'a> {
    /// Bind a field using the extent and projection declared in `meta`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::GeometryMismatch`] if the metadata
    /// describes a raster of different dimensions.
    pub fn bind(field: &'a AbundanceField, meta: &'a SimMetadata) -> Result<Self, ValidationError> {
        meta.check_field(field)?;
        Ok(Self {
            field,
            geometry: &meta.geometry,
        })
    }

    /// The underlying field.
    pub fn field(&self) -> &'a AbundanceField {
        self.field
    }

    fn layer_values(&self, layer: u32) -> Result<&'a [f64], LookupError> {
        self.field
            .layer(layer)
            .ok_or(LookupError::LayerOutOfRange {
                layer,
                layer_count: self.field.layer_count(),
            })
    }

    fn read(&self, values: &[f64], x: f64, y: f64) -> Result<Option<f64>, LookupError> {
        let (col, row) = self
            .geometry
            .cell_of(x, y)
            .ok_or(LookupError::OutsideExtent { x, y })?;
        let v = values[self.geometry.cell_index(col, row)];
        Ok((!v.is_nan()).then_some(v))
    }
}

impl GridAccess for RasterGrid<'_> {
    fn layer_count(&self) -> u32 {
        self.field.layer_count()
    }

    fn geometry(&self) -> &RasterGeometry {
        self.geometry
    }

    fn extract(&self, x: f64, y: f64, layer: u32) -> Result<Option<f64>, LookupError> {
        let values = self.layer_values(layer)?;
        self.read(values, x, y)
    }

    fn extract_layer(
        &self,
        layer: u32,
        coords: &[(f64, f64)],
    ) -> Vec<Result<Option<f64>, LookupError>> {
        match self.layer_values(layer) {
            Ok(values) => coords
                .iter()
                .map(|&(x, y)| self.read(values, x, y))
                .collect(),
            Err(e) => vec![Err(e); coords.len()],
        }
    }

    fn non_missing_count(&self, layer: u32) -> Result<usize, LookupError> {
        Ok(self
            .layer_values(layer)?
            .iter()
            .filter(|v| !v.is_nan())
            .count())
    }

    fn sample_cells(
        &self,
        layer: u32,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<(f64, f64)>, LookupError> {
        let pool: Vec<usize> = self
            .layer_values(layer)?
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .map(|(i, _)| i)
            .collect();
        let amount = count.min(pool.len());
        Ok(index::sample(rng, pool.len(), amount)
            .into_iter()
            .map(|k| {
                let (col, row) = self.geometry.cell_at_index(pool[k]);
                self.geometry.cell_center(col, row)
            })
            .collect())
    }
}
