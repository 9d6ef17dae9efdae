//! Sampling entry point.
//!
//! [`get_observations`] binds the caller's field to its metadata, routes
//! to exactly one sampler and optionally perturbs the extracted counts
//! with observation error. Every check runs before the first random draw.
//!
//! Randomness is drawn from the caller's source as one `u64` master seed
//! per phase (sampling, then observation error). Each phase expands its
//! master into independent ChaCha8 streams, which keeps the output
//! identical across [`Execution`](crate::Execution) modes.

use rand::Rng;
use vecol_core::{CancelToken, ObservationTable, ObserveError, ProgressSink};
use vecol_grid::{AbundanceField, GridAccess, RasterGrid, SimMetadata};

use crate::config::{ObservationRequest, SamplingStrategy};
use crate::exec::unit_rng;
use crate::monitoring::{sample_monitoring, MonitoringRun};
use crate::points::sample_points;
use crate::random::{sample_all_layers, sample_one_layer};

/// Caller-injected progress reporting and cancellation for one call.
#[derive(Default)]
pub struct RunContext<'a> {
    progress: Option<&'a mut dyn ProgressSink>,
    cancel: CancelToken,
}

impl<'a> RunContext<'a> {
    /// No progress reporting, never cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report per-site progress to `sink`.
    pub fn with_progress(mut self, sink: &'a mut dyn ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Stop at the next unit boundary once `cancel` is triggered.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The cancellation token polled by this call.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }
}

/// Generate a synthetic observation table from a simulated abundance
/// field.
///
/// Shorthand for [`get_observations_with`] without progress reporting or
/// cancellation.
pub fn get_observations<R: Rng + ?Sized>(
    field: &AbundanceField,
    meta: &SimMetadata,
    request: &ObservationRequest,
    rng: &mut R,
) -> Result<ObservationTable, ObserveError> {
    get_observations_with(field, meta, request, rng, RunContext::new())
}

/// Generate a synthetic observation table, reporting progress to and
/// polling cancellation from `ctx`.
///
/// # Errors
///
/// - [`ObserveError::Validation`] if `meta` does not describe `field`.
/// - [`ObserveError::Lookup`] for out-of-domain requests under
///   [`LookupPolicy::Fail`](crate::LookupPolicy::Fail).
/// - [`ObserveError::InvalidCount`] if the error model cannot be applied
///   to an extracted count.
/// - [`ObserveError::Cancelled`] if `ctx`'s token was triggered.
///
/// On any error no rows are returned.
pub fn get_observations_with<R: Rng + ?Sized>(
    field: &AbundanceField,
    meta: &SimMetadata,
    request: &ObservationRequest,
    rng: &mut R,
    ctx: RunContext<'_>,
) -> Result<ObservationTable, ObserveError> {
    let grid = RasterGrid::bind(field, meta)?;
    let RunContext { progress, cancel } = ctx;
    if cancel.is_cancelled() {
        return Err(ObserveError::Cancelled);
    }

    let master: u64 = rng.random();
    let policy = request.lookup_policy();
    let mut table = match request.strategy() {
        SamplingStrategy::RandomOneLayer { prop } => {
            sample_one_layer(&grid, *prop, &mut unit_rng(master, 0))?
        }
        SamplingStrategy::RandomAllLayers { prop } => {
            sample_all_layers(&grid, *prop, master, request.execution(), &cancel)?
        }
        SamplingStrategy::FromData { points } => sample_points(&grid, points, policy)?,
        SamplingStrategy::MonitoringBased { sites, prob } => sample_monitoring(
            &grid,
            sites,
            *prob,
            master,
            policy,
            MonitoringRun {
                execution: request.execution(),
                cancel: cancel.clone(),
                progress,
            },
        )?,
    };

    if let Some(model) = request.obs_error() {
        if cancel.is_cancelled() {
            return Err(ObserveError::Cancelled);
        }
        let noise_master: u64 = rng.random();
        model.apply(&mut table, &mut unit_rng(noise_master, 0))?;
    }

    log::debug!(
        "{} on '{}': {} rows over {} layers, observation error {}",
        request.strategy().kind(),
        meta.id,
        table.len(),
        grid.layer_count(),
        request
            .obs_error()
            .map_or("off", |m| m.kind().as_str()),
    );
    Ok(table)
}
