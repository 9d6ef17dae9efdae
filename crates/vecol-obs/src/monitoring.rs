//! Monitoring network simulation at fixed survey sites.
//!
//! Every site runs its own [`ObserverTurnover`] process over the field's
//! time steps on an independent random stream. Once all sites are
//! simulated, each session is expanded into one row per observed time
//! step, site-major and time-major within a site, and the field is read
//! at each `(site, time_step)`.

use vecol_core::{
    CancelToken, ObservationRecord, ObservationTable, ObserveError, ObserverSession,
    ProgressSink, Site, ValidationError,
};
use vecol_grid::GridAccess;

use crate::exec::{run_units, unit_rng, Execution};
use crate::lookup::LookupPolicy;
use crate::turnover::ObserverTurnover;

/// Default dwell probability.
pub const DEFAULT_PROB: f64 = 0.3;

/// Check a typed site list: non-empty, finite coordinates.
pub fn validate_sites(sites: &[Site]) -> Result<(), ValidationError> {
    if sites.is_empty() {
        return Err(ValidationError::EmptyInput {
            what: "cells_coords",
        });
    }
    for (row, s) in sites.iter().enumerate() {
        for (column, v) in [("x", s.x), ("y", s.y)] {
            if !v.is_finite() {
                return Err(ValidationError::MissingValue {
                    column: column.into(),
                    row,
                });
            }
        }
    }
    Ok(())
}

/// Scheduling and reporting knobs for a monitoring run.
pub struct MonitoringRun<'a> {
    /// How sites are scheduled.
    pub execution: Execution,
    /// Polled before each site.
    pub cancel: CancelToken,
    /// Receives one tick per completed site.
    pub progress: Option<&'a mut dyn ProgressSink>,
}

/// Simulate the observer sessions of every site.
///
/// Site `i` uses random stream `i` of `master`. The outer vector is in
/// site order, each inner vector in time order.
pub fn simulate_sessions(
    turnover: &ObserverTurnover,
    sites: &[Site],
    master: u64,
    run: MonitoringRun<'_>,
) -> Result<Vec<Vec<ObserverSession>>, ObserveError> {
    validate_sites(sites)?;
    run_units(run.execution, sites.len(), &run.cancel, run.progress, |i| {
        let sessions: Vec<ObserverSession> =
            turnover.sessions(sites[i], unit_rng(master, i)).collect();
        log::trace!("site {i}: {} observer sessions", sessions.len());
        Ok(sessions)
    })
}

/// Simulate turnover at every site and read the field for each realized
/// observation.
pub fn sample_monitoring(
    grid: &dyn GridAccess,
    sites: &[Site],
    prob: f64,
    master: u64,
    policy: LookupPolicy,
    run: MonitoringRun<'_>,
) -> Result<ObservationTable, ObserveError> {
    let turnover = ObserverTurnover::new(prob, grid.layer_count())?;
    let per_site = simulate_sessions(&turnover, sites, master, run)?;

    let mut rows = Vec::with_capacity(per_site.iter().flatten().map(|s| s.length as usize).sum());
    let mut misses = 0;
    for session in per_site.iter().flatten() {
        let Site { x, y } = session.site;
        for t in session.time_steps() {
            rows.push(ObservationRecord {
                x,
                y,
                time_step: t,
                n: policy.resolve(grid.extract(x, y, t), &mut misses)?,
                observer_id: Some(session.observer_id),
            });
        }
    }
    if misses > 0 {
        log::warn!("{misses} monitoring observations fell outside the field and were recorded as missing");
    }
    Ok(rows.into())
}
