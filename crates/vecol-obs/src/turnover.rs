//! Observer turnover at a fixed survey site.
//!
//! Starting at time step 1, a dwell length `L ~ Geometric(prob)` is drawn
//! (failures before the first success, so `L = 0` is possible):
//!
//! - `L = 0`: nobody watches the site at the current step; move on by one.
//! - `L > 0`: a new observer watches for `min(L, T - t + 1)` steps, then
//!   the clock jumps past the session and the next observer id is used.
//!
//! The process is exposed as an iterator of [`ObserverSession`]s. It owns
//! its random source, so cloning the source before calling
//! [`ObserverTurnover::sessions`] replays the identical sequence.

use std::iter::FusedIterator;

use rand::Rng;
use rand_distr::{Distribution, Geometric};
use vecol_core::{ObserverSession, Site, ValidationError};

/// Dwell process parameters for one monitoring run.
#[derive(Clone, Copy, Debug)]
pub struct ObserverTurnover {
    dwell: Geometric,
    horizon: u32,
}

impl ObserverTurnover {
    /// Create the process for dwell probability `prob` over time steps
    /// `1..=horizon`.
    ///
    /// # Errors
    ///
    /// [`ValidationError::ProbabilityOutOfRange`] unless `0 < prob <= 1`.
    pub fn new(prob: f64, horizon: u32) -> Result<Self, ValidationError> {
        if !(prob > 0.0 && prob <= 1.0) {
            return Err(ValidationError::ProbabilityOutOfRange { value: prob });
        }
        let dwell =
            Geometric::new(prob).map_err(|_| ValidationError::ProbabilityOutOfRange { value: prob })?;
        Ok(Self { dwell, horizon })
    }

    /// Last time step.
    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    /// Lazily simulate the sessions at `site`, driven by `rng`.
    pub fn sessions<R: Rng>(&self, site: Site, rng: R) -> Sessions<R> {
        Sessions {
            dwell: self.dwell,
            horizon: u64::from(self.horizon),
            site,
            t: 1,
            next_id: 1,
            rng,
        }
    }
}

/// Iterator over the sessions of one site, in time order.
#[derive(Clone, Debug)]
pub struct Sessions<R> {
    dwell: Geometric,
    horizon: u64,
    site: Site,
    t: u64,
    next_id: u32,
    rng: R,
}

impl<R: Rng> Iterator for Sessions<R> {
    type Item = ObserverSession;

    fn next(&mut self) -> Option<ObserverSession> {
        while self.t <= self.horizon {
            let draw = self.dwell.sample(&mut self.rng);
            if draw == 0 {
                self.t += 1;
                continue;
            }
            let length = draw.min(self.horizon - self.t + 1);
            let session = ObserverSession {
                site: self.site,
                // Both fit in u32: t <= horizon <= u32::MAX here.
                start: self.t as u32,
                length: length as u32,
                observer_id: self.next_id,
            };
            self.t += length;
            self.next_id += 1;
            return Some(session);
        }
        None
    }
}

impl<R: Rng> FusedIterator for Sessions<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const SITE: Site = Site { x: 0.5, y: 0.5 };

    #[test]
    fn rejects_bad_prob() {
        for p in [0.0, -0.2, 1.01, f64::NAN] {
            assert!(
                ObserverTurnover::new(p, 10).is_err(),
                "prob {p} should be rejected"
            );
        }
        assert!(ObserverTurnover::new(1.0, 10).is_ok());
    }

    #[test]
    fn prob_one_never_observes() {
        let turnover = ObserverTurnover::new(1.0, 50).unwrap();
        let rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(turnover.sessions(SITE, rng).count(), 0);
    }

    #[test]
    fn tiny_prob_covers_horizon_once() {
        let turnover = ObserverTurnover::new(1e-9, 25).unwrap();
        let sessions: Vec<_> = turnover
            .sessions(SITE, ChaCha8Rng::seed_from_u64(4))
            .collect();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].start, 1);
        assert_eq!(sessions[0].length, 25);
        assert_eq!(sessions[0].observer_id, 1);
    }

    #[test]
    fn zero_horizon_is_empty() {
        let turnover = ObserverTurnover::new(0.3, 0).unwrap();
        assert!(turnover
            .sessions(SITE, ChaCha8Rng::seed_from_u64(1))
            .next()
            .is_none());
    }

    #[test]
    fn cloned_rng_restarts_sequence() {
        let turnover = ObserverTurnover::new(0.3, 40).unwrap();
        let rng = ChaCha8Rng::seed_from_u64(77);
        let a: Vec<_> = turnover.sessions(SITE, rng.clone()).collect();
        let b: Vec<_> = turnover.sessions(SITE, rng).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn iterator_is_fused() {
        let turnover = ObserverTurnover::new(0.5, 5).unwrap();
        let mut it = turnover.sessions(SITE, ChaCha8Rng::seed_from_u64(2));
        while it.next().is_some() {}
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }

    proptest! {
        #[test]
        fn sessions_partition_a_subset_of_horizon(
            prob in 0.01f64..1.0,
            horizon in 0u32..120,
            seed in any::<u64>(),
        ) {
            let turnover = ObserverTurnover::new(prob, horizon).unwrap();
            let sessions: Vec<_> = turnover
                .sessions(SITE, ChaCha8Rng::seed_from_u64(seed))
                .collect();

            let mut prev_end = 0u32;
            for (i, s) in sessions.iter().enumerate() {
                prop_assert!(s.length >= 1);
                prop_assert!(s.start > prev_end, "sessions overlap or go backwards");
                prop_assert!(s.end() <= horizon, "session runs past the horizon");
                prop_assert_eq!(s.observer_id as usize, i + 1);
                prop_assert_eq!(s.site, SITE);
                prev_end = s.end();
            }
            let covered: u32 = sessions.iter().map(|s| s.length).sum();
            prop_assert!(covered <= horizon);
        }
    }
}
