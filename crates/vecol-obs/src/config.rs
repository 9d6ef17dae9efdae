//! Request configuration and validation.
//!
//! [`ObservationRequest`] is the validated input to
//! [`get_observations`](crate::get_observations). It is assembled with
//! [`ObservationRequest::builder()`]; [`build()`](ObservationRequestBuilder::build)
//! checks every parameter so that a constructed request can always run.
//!
//! Strategies can also be named by string ([`StrategyKind`]) and filled
//! from loosely typed [`StrategyParams`] the way a scripting front end
//! would pass them.

use std::fmt;
use std::str::FromStr;

use vecol_core::{RawTable, SamplePoint, Site, ValidationError};

use crate::error_model::{ObsErrorKind, ObsErrorModel};
use crate::exec::Execution;
use crate::lookup::LookupPolicy;
use crate::monitoring::{validate_sites, DEFAULT_PROB};
use crate::points::validate_points;
use crate::random::{validate_prop, DEFAULT_PROP};

// ── StrategyKind ──────────────────────────────────────────────────

/// Name-level selection of a sampling strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// `random_one_layer`
    RandomOneLayer,
    /// `random_all_layers`
    RandomAllLayers,
    /// `from_data`
    FromData,
    /// `monitoring_based`
    MonitoringBased,
}

impl StrategyKind {
    /// All strategies, in canonical order.
    pub const ALL: [StrategyKind; 4] = [
        Self::RandomOneLayer,
        Self::RandomAllLayers,
        Self::FromData,
        Self::MonitoringBased,
    ];

    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RandomOneLayer => "random_one_layer",
            Self::RandomAllLayers => "random_all_layers",
            Self::FromData => "from_data",
            Self::MonitoringBased => "monitoring_based",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownStrategy { name: s.to_owned() })
    }
}

// ── SamplingStrategy ──────────────────────────────────────────────

/// A sampling strategy together with its parameters.
#[derive(Clone, Debug, PartialEq)]
pub enum SamplingStrategy {
    /// Draw cells once from layer 1 and read them at every time step.
    RandomOneLayer {
        /// Fraction of non-missing cells to draw, in `(0, 1]`.
        prop: f64,
    },
    /// Draw cells independently at every time step.
    RandomAllLayers {
        /// Fraction of non-missing cells to draw per layer, in `(0, 1]`.
        prop: f64,
    },
    /// Read the field at caller-supplied points.
    FromData {
        /// Points to read, in output order.
        points: Vec<SamplePoint>,
    },
    /// Simulate observer turnover at fixed sites.
    MonitoringBased {
        /// Survey sites.
        sites: Vec<Site>,
        /// Dwell probability, in `(0, 1]`.
        prob: f64,
    },
}

impl SamplingStrategy {
    /// `RandomOneLayer` with the default proportion.
    pub fn random_one_layer() -> Self {
        Self::RandomOneLayer { prop: DEFAULT_PROP }
    }

    /// `RandomAllLayers` with the default proportion.
    pub fn random_all_layers() -> Self {
        Self::RandomAllLayers { prop: DEFAULT_PROP }
    }

    /// `MonitoringBased` at `sites` with the default dwell probability.
    pub fn monitoring(sites: Vec<Site>) -> Self {
        Self::MonitoringBased {
            sites,
            prob: DEFAULT_PROB,
        }
    }

    /// Which strategy this is.
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::RandomOneLayer { .. } => StrategyKind::RandomOneLayer,
            Self::RandomAllLayers { .. } => StrategyKind::RandomAllLayers,
            Self::FromData { .. } => StrategyKind::FromData,
            Self::MonitoringBased { .. } => StrategyKind::MonitoringBased,
        }
    }

    /// Check the strategy's parameters.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::RandomOneLayer { prop } | Self::RandomAllLayers { prop } => validate_prop(*prop),
            Self::FromData { points } => validate_points(points),
            Self::MonitoringBased { sites, prob } => {
                validate_sites(sites)?;
                if *prob > 0.0 && *prob <= 1.0 {
                    Ok(())
                } else {
                    Err(ValidationError::ProbabilityOutOfRange { value: *prob })
                }
            }
        }
    }

    /// Build a strategy of `kind` from loosely typed parameters.
    ///
    /// Parameters that `kind` does not use are ignored. `prop` and `prob`
    /// fall back to their defaults; `points` and `cells_coords` are
    /// required by the strategies that read them.
    pub fn from_params(kind: StrategyKind, params: &StrategyParams) -> Result<Self, ValidationError> {
        let strategy = match kind {
            StrategyKind::RandomOneLayer => Self::RandomOneLayer {
                prop: params.prop.unwrap_or(DEFAULT_PROP),
            },
            StrategyKind::RandomAllLayers => Self::RandomAllLayers {
                prop: params.prop.unwrap_or(DEFAULT_PROP),
            },
            StrategyKind::FromData => Self::FromData {
                points: params
                    .points
                    .as_ref()
                    .ok_or(ValidationError::EmptyInput { what: "points" })?
                    .to_points()?,
            },
            StrategyKind::MonitoringBased => Self::MonitoringBased {
                sites: params
                    .cells_coords
                    .as_ref()
                    .ok_or(ValidationError::EmptyInput {
                        what: "cells_coords",
                    })?
                    .to_sites()?,
                prob: params.prob.unwrap_or(DEFAULT_PROB),
            },
        };
        strategy.validate()?;
        Ok(strategy)
    }
}

/// Loosely typed strategy parameters, as a scripting caller passes them.
#[derive(Clone, Debug, Default)]
pub struct StrategyParams {
    /// Sampling proportion for the random strategies.
    pub prop: Option<f64>,
    /// Table with numeric `x`, `y` and `time_step` columns.
    pub points: Option<RawTable>,
    /// Table with exactly the numeric columns `x` and `y`.
    pub cells_coords: Option<RawTable>,
    /// Dwell probability for monitoring.
    pub prob: Option<f64>,
}

// ── ObservationRequest ────────────────────────────────────────────

/// A validated sampling request.
#[derive(Clone, Debug, PartialEq)]
pub struct ObservationRequest {
    strategy: SamplingStrategy,
    obs_error: Option<ObsErrorModel>,
    lookup_policy: LookupPolicy,
    execution: Execution,
}

impl ObservationRequest {
    /// Start building a request.
    pub fn builder() -> ObservationRequestBuilder {
        ObservationRequestBuilder::default()
    }

    /// The sampling strategy.
    pub fn strategy(&self) -> &SamplingStrategy {
        &self.strategy
    }

    /// The observation error model, if a parameter was supplied.
    pub fn obs_error(&self) -> Option<&ObsErrorModel> {
        self.obs_error.as_ref()
    }

    /// Out-of-domain lookup policy.
    pub fn lookup_policy(&self) -> LookupPolicy {
        self.lookup_policy
    }

    /// How independent units are scheduled.
    pub fn execution(&self) -> Execution {
        self.execution
    }
}

/// Builder for [`ObservationRequest`].
#[derive(Clone, Debug, Default)]
pub struct ObservationRequestBuilder {
    strategy: Option<SamplingStrategy>,
    obs_error: ObsErrorKind,
    obs_error_param: Option<f64>,
    lookup_policy: LookupPolicy,
    execution: Execution,
}

impl ObservationRequestBuilder {
    /// Set the sampling strategy. Required.
    pub fn strategy(mut self, strategy: SamplingStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Select the observation error model. Default: log-normal.
    pub fn obs_error(mut self, kind: ObsErrorKind) -> Self {
        self.obs_error = kind;
        self
    }

    /// Set the error model's parameter. `None` (the default) disables
    /// observation error entirely.
    pub fn obs_error_param(mut self, param: Option<f64>) -> Self {
        self.obs_error_param = param;
        self
    }

    /// Set the out-of-domain lookup policy.
    pub fn lookup_policy(mut self, policy: LookupPolicy) -> Self {
        self.lookup_policy = policy;
        self
    }

    /// Set the execution mode.
    pub fn execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<ObservationRequest, ValidationError> {
        let strategy = self.strategy.ok_or(ValidationError::MissingStrategy)?;
        strategy.validate()?;
        self.execution.validate()?;
        let obs_error = self
            .obs_error_param
            .map(|param| ObsErrorModel::new(self.obs_error, param))
            .transpose()?;
        Ok(ObservationRequest {
            strategy,
            obs_error,
            lookup_policy: self.lookup_policy,
            execution: self.execution,
        })
    }
}
