//! Policy for extractions that fall outside the field's domain.

use vecol_core::LookupError;

/// What to do when a point or site lies outside the raster extent, or a
/// time step names a layer that does not exist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LookupPolicy {
    /// Record the missing-value marker for the offending row and keep
    /// going. The default.
    #[default]
    MissingMarker,
    /// Abort the whole call with [`LookupError`].
    Fail,
}

impl LookupPolicy {
    /// Resolve one extraction under this policy.
    ///
    /// `misses` counts rows that were converted to missing markers so the
    /// caller can report them once.
    pub(crate) fn resolve(
        self,
        value: Result<Option<f64>, LookupError>,
        misses: &mut usize,
    ) -> Result<Option<f64>, LookupError> {
        match (value, self) {
            (Ok(v), _) => Ok(v),
            (Err(_), Self::MissingMarker) => {
                *misses += 1;
                Ok(None)
            }
            (Err(e), Self::Fail) => Err(e),
        }
    }
}
