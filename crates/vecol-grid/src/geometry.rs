//! Raster geometry: extent, resolution, and coordinate ↔ cell mapping.

use vecol_core::ValidationError;

/// Axis-aligned bounding box in map units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    /// Western edge.
    pub xmin: f64,
    /// Eastern edge.
    pub xmax: f64,
    /// Southern edge.
    pub ymin: f64,
    /// Northern edge.
    pub ymax: f64,
}

impl Extent {
    /// Create an extent from its four edges.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    /// Whether `(x, y)` lies inside the extent, edges included.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }
}

/// Grid geometry of an abundance raster.
///
/// Columns run west to east, rows run north to south (row 0 touches
/// `ymax`), matching the raster convention of the upstream provider.
/// The projection is carried as an opaque CRS string; reprojection is the
/// provider's business.
///
/// # Examples
///
/// ```
/// use vecol_grid::{Extent, RasterGeometry};
///
/// let geom = RasterGeometry::new(3, 2, Extent::new(0.0, 3.0, 0.0, 2.0), None).unwrap();
/// assert_eq!(geom.cell_of(2.2, 1.9), Some((2, 0)));
/// assert_eq!(geom.cell_center(2, 0), (2.5, 1.5));
/// assert_eq!(geom.cell_of(3.5, 1.0), None);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RasterGeometry {
    ncols: u32,
    nrows: u32,
    extent: Extent,
    crs: Option<String>,
}

impl RasterGeometry {
    /// Create a geometry.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidGeometry`] if either dimension is
    /// zero or the extent is non-finite or has non-positive width/height.
    pub fn new(
        ncols: u32,
        nrows: u32,
        extent: Extent,
        crs: Option<String>,
    ) -> Result<Self, ValidationError> {
        if ncols == 0 || nrows == 0 {
            return Err(ValidationError::InvalidGeometry {
                reason: format!("raster must have at least one cell, got {ncols}x{nrows}"),
            });
        }
        let edges = [extent.xmin, extent.xmax, extent.ymin, extent.ymax];
        if edges.iter().any(|v| !v.is_finite()) {
            return Err(ValidationError::InvalidGeometry {
                reason: "extent edges must be finite".into(),
            });
        }
        if extent.xmax <= extent.xmin || extent.ymax <= extent.ymin {
            return Err(ValidationError::InvalidGeometry {
                reason: format!("extent {extent:?} has non-positive width or height"),
            });
        }
        Ok(Self {
            ncols,
            nrows,
            extent,
            crs,
        })
    }

    /// Unit-resolution geometry with the origin at the south-west corner:
    /// cell `(col, row)` has centre `(col + 0.5, nrows - row - 0.5)`.
    pub fn unit(ncols: u32, nrows: u32) -> Result<Self, ValidationError> {
        Self::new(
            ncols,
            nrows,
            Extent::new(0.0, f64::from(ncols), 0.0, f64::from(nrows)),
            None,
        )
    }

    /// Number of columns.
    pub fn ncols(&self) -> u32 {
        self.ncols
    }

    /// Number of rows.
    pub fn nrows(&self) -> u32 {
        self.nrows
    }

    /// Spatial extent.
    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    /// Projection string, if declared.
    pub fn crs(&self) -> Option<&str> {
        self.crs.as_deref()
    }

    /// Cells per layer.
    pub fn cell_count(&self) -> usize {
        self.ncols as usize * self.nrows as usize
    }

    /// Cell size `(x, y)` in map units.
    pub fn resolution(&self) -> (f64, f64) {
        (
            (self.extent.xmax - self.extent.xmin) / f64::from(self.ncols),
            (self.extent.ymax - self.extent.ymin) / f64::from(self.nrows),
        )
    }

    /// The `(col, row)` cell containing `(x, y)`, or `None` outside the
    /// extent. Points on the eastern or southern edge belong to the last
    /// column or row.
    pub fn cell_of(&self, x: f64, y: f64) -> Option<(u32, u32)> {
        if !self.extent.contains(x, y) {
            return None;
        }
        let (rx, ry) = self.resolution();
        let col = ((x - self.extent.xmin) / rx).floor() as u32;
        let row = ((self.extent.ymax - y) / ry).floor() as u32;
        Some((col.min(self.ncols - 1), row.min(self.nrows - 1)))
    }

    /// Centre of cell `(col, row)` in map units.
    pub fn cell_center(&self, col: u32, row: u32) -> (f64, f64) {
        let (rx, ry) = self.resolution();
        (
            self.extent.xmin + (f64::from(col) + 0.5) * rx,
            self.extent.ymax - (f64::from(row) + 0.5) * ry,
        )
    }

    /// Row-major index of `(col, row)` within one layer.
    pub fn cell_index(&self, col: u32, row: u32) -> usize {
        row as usize * self.ncols as usize + col as usize
    }

    /// Inverse of [`cell_index`](Self::cell_index).
    pub fn cell_at_index(&self, index: usize) -> (u32, u32) {
        let ncols = self.ncols as usize;
        ((index % ncols) as u32, (index / ncols) as u32)
    }
}
