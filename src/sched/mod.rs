/*
    Erebus, eclipse operations scheduling for LEO instrument payloads
    Copyright (C) 2023 Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use crate::cosmic::area::Shape;
use crate::cosmic::{Period, PeriodKind};
use crate::errors::ErebusError;
use crate::io::config::Delta;
use crate::io::trajectory::{Sample, SampleReader};
use crate::time::{Epoch, Unit};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Provides the ACS planner, which couples aurora observations to ROC.
pub mod acs;
/// Provides the CER planner in its outside and inside modes.
pub mod cer;
/// Provides the ROC planner and its AZM avoidance rules.
pub mod roc;

/// The six commands a schedule is made of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Label {
    RocOn,
    RocOff,
    CerOn,
    CerOff,
    AcsOn,
    AcsOff,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::RocOn => write!(f, "ROCON"),
            Self::RocOff => write!(f, "ROCOFF"),
            Self::CerOn => write!(f, "CERON"),
            Self::CerOff => write!(f, "CEROFF"),
            Self::AcsOn => write!(f, "ACSON"),
            Self::AcsOff => write!(f, "ACSOFF"),
        }
    }
}

impl Label {
    pub fn is_roc(self) -> bool {
        matches!(self, Self::RocOn | Self::RocOff)
    }
}

/// A scheduled command invocation. The originating period is carried by value
/// for traceability; nothing points back from the period to the entry.
#[derive(Clone, Debug)]
pub struct Entry {
    pub label: Label,
    pub when: Epoch,
    pub warning: bool,
    pub period: Period,
}

impl Entry {
    fn new(label: Label, when: Epoch, period: Period) -> Self {
        Self {
            label,
            when,
            warning: false,
            period,
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} @ {}", self.label, self.when)
    }
}

/// `between(a, b, x)`: whether `x` falls in `[a, b]`, bounds included, with a
/// degenerate `a >= b` range matching nothing.
pub(crate) fn is_between(from: Epoch, to: Epoch, x: Epoch) -> bool {
    from < to && (from == x || to == x || (from < x && to > x))
}

/// All SAA periods overlapping `e`, in order. The scan stops at the first SAA
/// starting after the eclipse ends, since both lists are sorted.
pub(crate) fn crossing_list<'a>(e: &Period, saas: &'a [Period]) -> Vec<&'a Period> {
    let mut crossings = Vec::new();
    for a in saas {
        if e.overlaps(a) {
            crossings.push(a);
        }
        if a.starts > e.ends {
            break;
        }
    }
    crossings
}

/// The three interval families extracted from one trajectory, plus the
/// permissive flag turning soft constraint violations into warnings.
#[derive(Clone, Debug, Default)]
pub struct Schedule {
    pub ignore: bool,
    pub eclipses: Vec<Period>,
    pub saas: Vec<Period>,
    pub auroras: Vec<Period>,
}

impl Schedule {
    /// Reads the predicted trajectory at `path` and folds it into a schedule.
    pub fn open<P: AsRef<Path>>(path: P, area: &Shape) -> Result<Self, ErebusError> {
        let file = File::open(path)?;
        Self::from_reader(file, area)
    }

    /// Folds a CSV sample stream into a schedule.
    pub fn from_reader<R: Read>(rdr: R, area: &Shape) -> Result<Self, ErebusError> {
        Self::from_samples(SampleReader::new(rdr), area)
    }

    /// Folds an already materialised sample stream into a schedule. Each of
    /// the three families keeps at most one tentative open period; a period
    /// closes with the timestamp of the sample *preceding* the one that broke
    /// its condition, so an interval spans exactly its interior samples.
    pub fn from_samples<I>(samples: I, area: &Shape) -> Result<Self, ErebusError>
    where
        I: IntoIterator<Item = Result<Sample, ErebusError>>,
    {
        let mut sched = Self::default();
        let mut open_eclipse: Option<Epoch> = None;
        let mut open_saa: Option<Epoch> = None;
        let mut open_aurora: Option<Epoch> = None;
        let mut last: Option<Epoch> = None;

        for sample in samples {
            let s = sample?;
            let in_area = area.contains(s.lat, s.lng);

            if in_area && s.eclipse.enters() && open_aurora.is_none() {
                open_aurora = Some(s.when);
            }
            if (!in_area || s.eclipse.leaves()) && open_aurora.is_some() {
                if let (Some(starts), Some(ends)) = (open_aurora.take(), last) {
                    sched
                        .auroras
                        .push(Period::new(PeriodKind::Aurora, starts, ends));
                }
            }

            if s.eclipse.enters() && open_eclipse.is_none() {
                open_eclipse = Some(s.when);
            }
            if s.eclipse.leaves() && open_eclipse.is_some() {
                if let (Some(starts), Some(ends)) = (open_eclipse.take(), last) {
                    sched
                        .eclipses
                        .push(Period::new(PeriodKind::Eclipse, starts, ends));
                }
            }

            if s.saa.enters() && open_saa.is_none() {
                open_saa = Some(s.when);
            }
            if s.saa.leaves() && open_saa.is_some() {
                if let (Some(starts), Some(ends)) = (open_saa.take(), last) {
                    sched.saas.push(Period::new(PeriodKind::Saa, starts, ends));
                }
            }

            last = Some(s.when);
        }

        if sched.eclipses.is_empty() && sched.saas.is_empty() {
            return Err(ErebusError::NoPeriods);
        }
        sched.eclipses.sort_by(|a, b| a.starts.cmp(&b.starts));
        sched.saas.sort_by(|a, b| a.starts.cmp(&b.starts));
        sched.auroras.sort_by(|a, b| a.starts.cmp(&b.starts));
        Ok(sched)
    }

    /// Drops every period starting at or before `base`. An aurora also goes
    /// away when its surrounding eclipse was dropped, even if the aurora
    /// itself starts late enough. `None` leaves the schedule untouched.
    pub fn filter(&self, base: Option<Epoch>) -> Self {
        let t = match base {
            Some(t) => t,
            None => return self.clone(),
        };
        let mut dropped = Vec::new();
        let mut eclipses = Vec::with_capacity(self.eclipses.len());
        for e in &self.eclipses {
            if e.starts > t {
                eclipses.push(*e);
            } else {
                dropped.push(*e);
            }
        }
        let saas: Vec<Period> = self.saas.iter().filter(|a| a.starts > t).copied().collect();
        let auroras: Vec<Period> = self
            .auroras
            .iter()
            .filter(|x| {
                if x.starts <= t {
                    return false;
                }
                // The dropped list is sorted: only the last eclipse starting
                // at or before the aurora can contain it.
                let idx = dropped.partition_point(|e| e.starts <= x.starts);
                idx == 0 || !dropped[idx - 1].contains(x)
            })
            .copied()
            .collect();
        Self {
            ignore: self.ignore,
            eclipses,
            saas,
            auroras,
        }
    }

    /// Every period of the schedule, merged and sorted by start time.
    pub fn periods(&self) -> Vec<Period> {
        let mut all =
            Vec::with_capacity(self.eclipses.len() + self.saas.len() + self.auroras.len());
        all.extend_from_slice(&self.eclipses);
        all.extend_from_slice(&self.saas);
        all.extend_from_slice(&self.auroras);
        all.sort_by(|a, b| a.starts.cmp(&b.starts));
        all
    }

    /// Plans the requested instruments and merges their command entries into
    /// a single list, sorted by time. The sort is stable and the planners run
    /// in a fixed order (ROC, CER, ACS), so equal timestamps keep a
    /// deterministic order and the output is reproducible byte for byte.
    pub fn entries(
        &self,
        delta: &Delta,
        roc: bool,
        cer: bool,
        acs: bool,
    ) -> Result<Vec<Entry>, ErebusError> {
        if !roc && !cer && !acs {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        if roc {
            entries.extend(roc::plan(self, &delta.roc())?);
        }
        if cer {
            let opts = delta.cer();
            let planned = if opts.switch_time > 0 * Unit::Second {
                cer::plan_outside(self, &opts)?
            } else {
                cer::plan_inside(self, &opts, &delta.roc(), &entries)?
            };
            entries.extend(planned);
        }
        if acs {
            let planned = acs::plan(self, &delta.acs(), &delta.roc(), &entries)?;
            entries.extend(planned);
        }
        entries.sort_by(|a, b| a.when.cmp(&b.when));
        Ok(entries)
    }
}
