//! Sampling strategies and observation error for vecol.
//!
//! Turns a simulated abundance field into the kind of table a field survey
//! would produce. Four strategies are available through
//! [`SamplingStrategy`]:
//!
//! - [`RandomOneLayer`](SamplingStrategy::RandomOneLayer): one random set
//!   of cells, revisited at every time step.
//! - [`RandomAllLayers`](SamplingStrategy::RandomAllLayers): a fresh random
//!   set of cells at every time step.
//! - [`FromData`](SamplingStrategy::FromData): caller-supplied points.
//! - [`MonitoringBased`](SamplingStrategy::MonitoringBased): fixed sites
//!   watched by a turnover of synthetic observers.
//!
//! Extracted counts can then be perturbed by an [`ObsErrorModel`].
//! [`get_observations`] ties the pieces together.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod dispatch;
pub mod error_model;
pub mod exec;
pub mod lookup;
pub mod monitoring;
pub mod points;
pub mod random;
pub mod turnover;

pub use config::{
    ObservationRequest, ObservationRequestBuilder, SamplingStrategy, StrategyKind, StrategyParams,
};
pub use dispatch::{get_observations, get_observations_with, RunContext};
pub use error_model::{error_param_from_values, ObsErrorKind, ObsErrorModel};
pub use exec::Execution;
pub use lookup::LookupPolicy;
pub use monitoring::{sample_monitoring, simulate_sessions, MonitoringRun, DEFAULT_PROB};
pub use points::sample_points;
pub use random::{sample_all_layers, sample_one_layer, DEFAULT_PROP};
pub use turnover::{ObserverTurnover, Sessions};
