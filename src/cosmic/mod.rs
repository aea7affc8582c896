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

use crate::time::{Duration, Epoch, Unit};
use std::fmt;

/// Provides the geographic shapes used for the aurora membership test.
pub mod area;

/// The family a period belongs to. Families never mix: the extractor closes a
/// period of one kind before opening the next of the same kind, but periods of
/// different kinds overlap freely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PeriodKind {
    Eclipse,
    Saa,
    Aurora,
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Eclipse => write!(f, "eclipse"),
            Self::Saa => write!(f, "saa"),
            Self::Aurora => write!(f, "aurora"),
        }
    }
}

/// A closed time interval extracted from the predicted trajectory.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Period {
    pub kind: PeriodKind,
    pub starts: Epoch,
    pub ends: Epoch,
}

impl Period {
    pub fn new(kind: PeriodKind, starts: Epoch, ends: Epoch) -> Self {
        Self { kind, starts, ends }
    }

    pub fn duration(&self) -> Duration {
        self.ends - self.starts
    }

    /// Whether `other` lies entirely within this period. The right bound is
    /// strict: a period ending exactly at `self.ends` is not contained.
    pub fn contains(&self, other: &Self) -> bool {
        if other.starts < self.starts {
            return false;
        }
        other.starts + other.duration() < self.ends
    }

    /// Whether the two periods share at least one instant. Touching bounds
    /// count as an overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        !(other.starts > self.ends || other.ends < self.starts)
    }

    /// The length of time shared with `other`: zero when disjoint, the full
    /// duration of `other` when contained, otherwise the single-sided overlap
    /// from the later start to the earlier end.
    pub fn intersect(&self, other: &Self) -> Duration {
        if !self.overlaps(other) {
            return 0 * Unit::Second;
        }
        if self.contains(other) {
            return other.duration();
        }
        if self.starts > other.starts {
            other.ends - self.starts
        } else {
            self.ends - other.starts
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} [{} - {}] ({})",
            self.kind,
            self.starts,
            self.ends,
            self.duration()
        )
    }
}
