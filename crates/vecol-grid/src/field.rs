//! The simulated abundance field and the metadata that locates it.

use vecol_core::ValidationError;

use crate::geometry::RasterGeometry;

/// A 3-D abundance array `(col, row, layer)` as produced by the
/// population-dynamics engine.
///
/// Storage is layer-major, row-major within a layer. `NaN` marks cells
/// permanently outside the study area; readers see it as `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct AbundanceField {
    ncols: u32,
    nrows: u32,
    nlayers: u32,
    values: Vec<f64>,
}

impl AbundanceField {
    /// Build a field from one row-major vector per layer (time step 1
    /// first).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidGeometry`] if there are no layers,
    /// a dimension is zero, or a layer has the wrong length.
    pub fn from_layers(
        ncols: u32,
        nrows: u32,
        layers: Vec<Vec<f64>>,
    ) -> Result<Self, ValidationError> {
        let cells = ncols as usize * nrows as usize;
        if cells == 0 || layers.is_empty() {
            return Err(ValidationError::InvalidGeometry {
                reason: format!(
                    "field must have at least one cell and one layer, got {ncols}x{nrows}x{}",
                    layers.len()
                ),
            });
        }
        if let Some((i, bad)) = layers.iter().enumerate().find(|(_, l)| l.len() != cells) {
            return Err(ValidationError::InvalidGeometry {
                reason: format!("layer {} has {} cells, expected {cells}", i + 1, bad.len()),
            });
        }
        let nlayers = u32::try_from(layers.len()).map_err(|_| ValidationError::InvalidGeometry {
            reason: "too many layers".into(),
        })?;
        Ok(Self {
            ncols,
            nrows,
            nlayers,
            values: layers.into_iter().flatten().collect(),
        })
    }

    /// Build a field by evaluating `f(col, row, time_step)` for every cell.
    /// `time_step` is 1-based.
    pub fn from_fn(
        ncols: u32,
        nrows: u32,
        nlayers: u32,
        mut f: impl FnMut(u32, u32, u32) -> f64,
    ) -> Result<Self, ValidationError> {
        let layers = (1..=nlayers)
            .map(|t| {
                (0..nrows)
                    .flat_map(|r| (0..ncols).map(move |c| (c, r)))
                    .map(|(c, r)| f(c, r, t))
                    .collect()
            })
            .collect();
        Self::from_layers(ncols, nrows, layers)
    }

    /// `(ncols, nrows)`.
    pub fn dims(&self) -> (u32, u32) {
        (self.ncols, self.nrows)
    }

    /// Number of time steps.
    pub fn layer_count(&self) -> u32 {
        self.nlayers
    }

    /// Raw values of one layer (1-based), `NaN` for missing cells.
    pub fn layer(&self, time_step: u32) -> Option<&[f64]> {
        if time_step == 0 || time_step > self.nlayers {
            return None;
        }
        let cells = self.ncols as usize * self.nrows as usize;
        let start = (time_step as usize - 1) * cells;
        self.values.get(start..start + cells)
    }

    /// Value at `(col, row)` in a layer; `None` if missing or out of range.
    pub fn value(&self, col: u32, row: u32, time_step: u32) -> Option<f64> {
        if col >= self.ncols || row >= self.nrows {
            return None;
        }
        let v = *self
            .layer(time_step)?
            .get(row as usize * self.ncols as usize + col as usize)?;
        (!v.is_nan()).then_some(v)
    }
}

/// Declared identity and geometry of one simulation run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimMetadata {
    /// Simulation identifier.
    pub id: String,
    /// Extent, resolution and projection of the abundance rasters.
    pub geometry: RasterGeometry,
}

impl SimMetadata {
    /// Create metadata.
    pub fn new(id: impl Into<String>, geometry: RasterGeometry) -> Self {
        Self {
            id: id.into(),
            geometry,
        }
    }

    /// Check that this metadata describes `field`.
    pub fn check_field(&self, field: &AbundanceField) -> Result<(), ValidationError> {
        let declared = (self.geometry.ncols(), self.geometry.nrows());
        if declared != field.dims() {
            return Err(ValidationError::GeometryMismatch {
                reason: format!(
                    "simulation '{}' declares {}x{} cells but field is {}x{}",
                    self.id,
                    declared.0,
                    declared.1,
                    field.dims().0,
                    field.dims().1
                ),
            });
        }
        Ok(())
    }
}
