//! Execution of independent sampling units.
//!
//! A *unit* is one layer of the all-layers sampler or one site of the
//! monitoring simulator. Units share nothing mutable: each gets its own
//! ChaCha8 stream derived from a per-phase master seed and the unit
//! index, so results do not depend on which thread ran which unit.
//!
//! [`Execution::Threaded`] spawns scoped workers that pull unit indices
//! from an atomic counter and return results over a crossbeam channel.
//! The collecting thread stores them by index, ticks progress in unit
//! order, and stops early on failure or cancellation.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use vecol_core::{CancelToken, ObserveError, ProgressSink, ValidationError};

/// How independent units are scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Execution {
    /// Run units one after another on the calling thread. The default.
    #[default]
    Sequential,
    /// Run units on a pool of scoped worker threads.
    Threaded {
        /// Number of workers. `None` = auto-detect from
        /// `available_parallelism`.
        workers: Option<usize>,
    },
}

impl Execution {
    /// Reject an explicit worker count of zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Threaded { workers: Some(0) } => Err(ValidationError::InvalidWorkerCount),
            _ => Ok(()),
        }
    }

    /// Resolve the number of threads to use, clamped to `[1, 64]`.
    pub fn resolved_workers(&self) -> usize {
        match self {
            Self::Sequential => 1,
            Self::Threaded { workers: Some(n) } => (*n).clamp(1, 64),
            Self::Threaded { workers: None } => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
                .clamp(1, 64),
        }
    }
}

/// Random stream for one unit.
pub(crate) fn unit_rng(master: u64, unit: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(master);
    rng.set_stream(unit as u64);
    rng
}

/// Run `count` units and return their results in unit order.
///
/// `progress`, if given, receives `begin(count)`, one `tick` per unit in
/// unit order, and `finish` on success. On error or cancellation no
/// results are returned.
pub(crate) fn run_units<T, F>(
    execution: Execution,
    count: usize,
    cancel: &CancelToken,
    mut progress: Option<&mut (dyn ProgressSink + '_)>,
    unit: F,
) -> Result<Vec<T>, ObserveError>
where
    T: Send,
    F: Fn(usize) -> Result<T, ObserveError> + Sync,
{
    if let Some(p) = progress.as_deref_mut() {
        p.begin(count);
    }
    let workers = execution.resolved_workers().min(count);
    let out = if workers <= 1 {
        run_sequential(count, cancel, progress.as_deref_mut(), &unit)?
    } else {
        run_threaded(workers, count, cancel, progress.as_deref_mut(), &unit)?
    };
    if let Some(p) = progress {
        p.finish();
    }
    Ok(out)
}

fn run_sequential<T, F>(
    count: usize,
    cancel: &CancelToken,
    mut progress: Option<&mut (dyn ProgressSink + '_)>,
    unit: &F,
) -> Result<Vec<T>, ObserveError>
where
    F: Fn(usize) -> Result<T, ObserveError>,
{
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        if cancel.is_cancelled() {
            return Err(ObserveError::Cancelled);
        }
        out.push(unit(i)?);
        if let Some(p) = progress.as_deref_mut() {
            p.tick();
        }
    }
    Ok(out)
}

fn run_threaded<T, F>(
    workers: usize,
    count: usize,
    cancel: &CancelToken,
    mut progress: Option<&mut (dyn ProgressSink + '_)>,
    unit: &F,
) -> Result<Vec<T>, ObserveError>
where
    T: Send,
    F: Fn(usize) -> Result<T, ObserveError> + Sync,
{
    let next = AtomicUsize::new(0);
    let stop = AtomicBool::new(false);
    let (tx, rx) = crossbeam_channel::unbounded::<(usize, Result<T, ObserveError>)>();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let tx = tx.clone();
                let (next, stop) = (&next, &stop);
                s.spawn(move || loop {
                    if stop.load(Ordering::Acquire) || cancel.is_cancelled() {
                        break;
                    }
                    let i = next.fetch_add(1, Ordering::Relaxed);
                    if i >= count {
                        break;
                    }
                    let result = unit(i);
                    let failed = result.is_err();
                    if tx.send((i, result)).is_err() || failed {
                        break;
                    }
                })
            })
            .collect();
        // Workers hold the only senders now; the channel closes when the
        // last one exits.
        drop(tx);

        let mut slots: Vec<Option<T>> = (0..count).map(|_| None).collect();
        let mut ticked = 0;
        let mut first_err = None;
        for (i, result) in rx.iter() {
            match result {
                Ok(v) => slots[i] = Some(v),
                Err(e) => {
                    first_err = Some(e);
                    stop.store(true, Ordering::Release);
                    break;
                }
            }
            // Unit `ticked` only counts if the run was live before it, as
            // in the sequential path.
            while ticked < count && slots[ticked].is_some() && !cancel.is_cancelled() {
                if let Some(p) = progress.as_deref_mut() {
                    p.tick();
                }
                ticked += 1;
            }
            if ticked < count && cancel.is_cancelled() {
                stop.store(true, Ordering::Release);
                break;
            }
        }

        let panicked = handles
            .into_iter()
            .map(|h| h.join())
            .filter(Result::is_err)
            .count();

        if let Some(e) = first_err {
            return Err(e);
        }
        if panicked > 0 {
            return Err(ObserveError::WorkerFailed {
                reason: format!("{panicked} worker thread(s) panicked"),
            });
        }
        if ticked < count && cancel.is_cancelled() {
            return Err(ObserveError::Cancelled);
        }
        slots
            .into_iter()
            .collect::<Option<Vec<T>>>()
            .ok_or_else(|| ObserveError::WorkerFailed {
                reason: "worker exited before completing its units".into(),
            })
    })
}
