//! Observation rows, survey sites, and the [`ObservationTable`] result.

use std::ops::RangeInclusive;

/// A fixed survey location in map coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Site {
    /// Map x coordinate.
    pub x: f64,
    /// Map y coordinate.
    pub y: f64,
}

impl Site {
    /// Create a site at `(x, y)`.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A caller-supplied `(x, y, time_step)` extraction request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplePoint {
    /// Map x coordinate.
    pub x: f64,
    /// Map y coordinate.
    pub y: f64,
    /// 1-based time step (layer) to read.
    pub time_step: u32,
}

impl SamplePoint {
    /// Create a point request.
    pub fn new(x: f64, y: f64, time_step: u32) -> Self {
        Self { x, y, time_step }
    }
}

/// One realized observation.
///
/// `n` is `None` when the cell is missing (outside the modelled area) or,
/// under the default lookup policy, when the request fell outside the
/// field. `observer_id` is only set by the monitoring strategy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObservationRecord {
    /// Map x coordinate (cell centre for grid-drawn samples).
    pub x: f64,
    /// Map y coordinate (cell centre for grid-drawn samples).
    pub y: f64,
    /// 1-based time step.
    pub time_step: u32,
    /// Observed abundance, or the missing-value marker.
    pub n: Option<f64>,
    /// Synthetic observer, numbered from 1 within each site.
    pub observer_id: Option<u32>,
}

/// A maximal run of consecutive time steps during which one synthetic
/// observer watches one site.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserverSession {
    /// Watched site.
    pub site: Site,
    /// First observed time step (1-based).
    pub start: u32,
    /// Number of observed time steps, always at least 1.
    pub length: u32,
    /// Observer number within the site.
    pub observer_id: u32,
}

impl ObserverSession {
    /// Last observed time step (inclusive).
    pub fn end(&self) -> u32 {
        self.start + self.length - 1
    }

    /// All time steps covered by the session.
    pub fn time_steps(&self) -> RangeInclusive<u32> {
        self.start..=self.end()
    }

    /// Whether `time_step` falls inside the session.
    pub fn contains(&self, time_step: u32) -> bool {
        self.time_steps().contains(&time_step)
    }
}

/// In-memory result of one sampling call, rows in generation order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObservationTable {
    rows: Vec<ObservationRecord>,
}

impl ObservationTable {
    /// Wrap a list of rows.
    pub fn new(rows: Vec<ObservationRecord>) -> Self {
        Self { rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in generation order.
    pub fn rows(&self) -> &[ObservationRecord] {
        &self.rows
    }

    /// Mutable access for post-processing such as observation error.
    pub fn rows_mut(&mut self) -> &mut [ObservationRecord] {
        &mut self.rows
    }

    /// Iterate over rows in generation order.
    pub fn iter(&self) -> std::slice::Iter<'_, ObservationRecord> {
        self.rows.iter()
    }

    /// Consume the table, returning its rows.
    pub fn into_rows(self) -> Vec<ObservationRecord> {
        self.rows
    }

    /// Distinct time steps present, ascending.
    pub fn time_steps(&self) -> Vec<u32> {
        let mut steps: Vec<u32> = self.rows.iter().map(|r| r.time_step).collect();
        steps.sort_unstable();
        steps.dedup();
        steps
    }

    /// Rows belonging to one time step, in table order.
    pub fn rows_at(&self, time_step: u32) -> impl Iterator<Item = &ObservationRecord> + '_ {
        self.rows.iter().filter(move |r| r.time_step == time_step)
    }

    /// Coordinates sampled at one time step, in table order.
    pub fn coords_at(&self, time_step: u32) -> Vec<(f64, f64)> {
        self.rows_at(time_step).map(|r| (r.x, r.y)).collect()
    }

    /// Distinct coordinates in order of first appearance.
    pub fn sites(&self) -> Vec<Site> {
        let mut out: Vec<Site> = Vec::new();
        for row in &self.rows {
            let site = Site::new(row.x, row.y);
            if !out.contains(&site) {
                out.push(site);
            }
        }
        out
    }

    /// Reconstruct observer sessions from monitoring rows.
    ///
    /// Consecutive rows with the same coordinates, the same observer and
    /// adjacent time steps fold into one session. Rows without an
    /// observer are skipped.
    ///
    /// Rows carry coordinates, not a site index. If the same coordinates
    /// were listed as two sites, and the first site's last session and the
    /// second site's first session are both observer 1 and touch in time,
    /// they come back as a single session. Pass distinct sites when the
    /// sessions need to be recovered exactly.
    pub fn sessions(&self) -> Vec<ObserverSession> {
        let mut out: Vec<ObserverSession> = Vec::new();
        for row in &self.rows {
            let Some(observer_id) = row.observer_id else {
                continue;
            };
            if let Some(last) = out.last_mut() {
                if last.observer_id == observer_id
                    && last.site == Site::new(row.x, row.y)
                    && last.end() + 1 == row.time_step
                {
                    last.length += 1;
                    continue;
                }
            }
            out.push(ObserverSession {
                site: Site::new(row.x, row.y),
                start: row.time_step,
                length: 1,
                observer_id,
            });
        }
        out
    }
}

impl<'a> IntoIterator for &'a ObservationTable {
    type Item = &'a ObservationRecord;
    type IntoIter = std::slice::Iter<'a, ObservationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl From<Vec<ObservationRecord>> for ObservationTable {
    fn from(rows: Vec<ObservationRecord>) -> Self {
        Self::new(rows)
    }
}
