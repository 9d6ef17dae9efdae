//! Observation error applied to extracted counts.
//!
//! Two models:
//! - **Log-normal**: `n' ~ LogNormal(ln n, sd)`, multiplicative noise
//!   whose median is the true count. A true count of zero stays zero.
//! - **Binomial**: `n' ~ Binomial(n, p)`, each individual detected with
//!   probability `p`. Requires whole, non-negative counts.
//!
//! Missing-value markers pass through untouched.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand_distr::{Binomial, Distribution, LogNormal};
use vecol_core::{ObservationTable, ObserveError, ValidationError};

/// Name-level selection of an error model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ObsErrorKind {
    /// Multiplicative log-normal noise. The default.
    #[default]
    LogNormal,
    /// Binomial thinning.
    Binomial,
}

impl ObsErrorKind {
    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LogNormal => "lognormal",
            Self::Binomial => "binomial",
        }
    }
}

impl fmt::Display for ObsErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObsErrorKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lognormal" => Ok(Self::LogNormal),
            "binomial" => Ok(Self::Binomial),
            other => Err(ValidationError::UnknownErrorModel {
                name: other.to_owned(),
            }),
        }
    }
}

/// Interpret a raw parameter vector: empty means "no observation error",
/// a single finite value is the parameter, anything else is rejected.
pub fn error_param_from_values(values: &[f64]) -> Result<Option<f64>, ValidationError> {
    match values {
        [] => Ok(None),
        [v] if v.is_finite() => Ok(Some(*v)),
        [v] => Err(ValidationError::InvalidErrorParam {
            reason: format!("must be finite, got {v}"),
        }),
        many => Err(ValidationError::InvalidErrorParam {
            reason: format!("must be a single number, got {} values", many.len()),
        }),
    }
}

/// A validated observation-error model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ObsErrorModel {
    /// Log-scale standard deviation `sd >= 0`.
    LogNormal {
        /// Standard deviation on the log scale.
        sd: f64,
    },
    /// Detection probability `0 <= p <= 1`.
    Binomial {
        /// Per-individual detection probability.
        p: f64,
    },
}

impl ObsErrorModel {
    /// Build a model from its kind and parameter.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidErrorParam`] if the parameter is not
    /// finite or outside the model's range.
    pub fn new(kind: ObsErrorKind, param: f64) -> Result<Self, ValidationError> {
        if !param.is_finite() {
            return Err(ValidationError::InvalidErrorParam {
                reason: format!("must be finite, got {param}"),
            });
        }
        match kind {
            ObsErrorKind::LogNormal if param < 0.0 => Err(ValidationError::InvalidErrorParam {
                reason: format!("lognormal sd must be >= 0, got {param}"),
            }),
            ObsErrorKind::Binomial if !(0.0..=1.0).contains(&param) => {
                Err(ValidationError::InvalidErrorParam {
                    reason: format!("binomial p must be in [0, 1], got {param}"),
                })
            }
            ObsErrorKind::LogNormal => Ok(Self::LogNormal { sd: param }),
            ObsErrorKind::Binomial => Ok(Self::Binomial { p: param }),
        }
    }

    /// Which model this is.
    pub fn kind(&self) -> ObsErrorKind {
        match self {
            Self::LogNormal { .. } => ObsErrorKind::LogNormal,
            Self::Binomial { .. } => ObsErrorKind::Binomial,
        }
    }

    /// Draw one noisy observation of the true count `n`.
    pub fn perturb<R: Rng + ?Sized>(&self, n: f64, rng: &mut R) -> Result<f64, ObserveError> {
        let invalid = || ObserveError::InvalidCount {
            value: n,
            model: self.kind().as_str(),
        };
        if !n.is_finite() || n < 0.0 {
            return Err(invalid());
        }
        match *self {
            Self::LogNormal { .. } if n == 0.0 => Ok(0.0),
            Self::LogNormal { sd } => {
                let dist = LogNormal::new(n.ln(), sd).map_err(|_| invalid())?;
                Ok(dist.sample(rng))
            }
            Self::Binomial { p } => {
                if n.fract() != 0.0 || n >= u64::MAX as f64 {
                    return Err(invalid());
                }
                let dist = Binomial::new(n as u64, p).map_err(|_| invalid())?;
                Ok(dist.sample(rng) as f64)
            }
        }
    }

    /// Replace every non-missing `n` in `table`, row by row.
    ///
    /// The table is only modified if every row succeeds.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        table: &mut ObservationTable,
        rng: &mut R,
    ) -> Result<(), ObserveError> {
        let noisy = table
            .iter()
            .map(|row| row.n.map(|n| self.perturb(n, rng)).transpose())
            .collect::<Result<Vec<_>, _>>()?;
        for (row, n) in table.rows_mut().iter_mut().zip(noisy) {
            row.n = n;
        }
        Ok(())
    }
}
