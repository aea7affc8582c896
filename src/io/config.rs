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

extern crate toml;

use crate::cosmic::area::{Rect, Shape};
use crate::errors::ErebusError;
use crate::time::{Duration, Unit};
use serde::de::{self, Deserializer};
use serde_derive::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Decodes a duration spelled as a string, e.g. `"50 s"` or `"300 s"`.
fn duration_from_str<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = de::Deserialize::deserialize(deserializer)?;
    Duration::from_str(&s).map_err(de::Error::custom)
}

/// The timing knobs of the three planners, i.e. the `[delta]` table of the
/// settings file. Every field is a duration; missing keys keep their default.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Delta {
    /// ROCON execution time.
    #[serde(deserialize_with = "duration_from_str")]
    pub rocon: Duration,
    /// ROCOFF execution time.
    #[serde(deserialize_with = "duration_from_str")]
    pub rocoff: Duration,
    /// CERON execution time.
    #[serde(deserialize_with = "duration_from_str")]
    pub ceron: Duration,
    /// CEROFF execution time.
    #[serde(deserialize_with = "duration_from_str")]
    pub ceroff: Duration,
    /// Minimum interval between the end of a ROCON and the start of its ROCOFF.
    #[serde(deserialize_with = "duration_from_str")]
    pub margin: Duration,
    /// Time before eclipse entry at which CER(ON|OFF) switches. Zero selects
    /// the SAA driven (inside) CER mode.
    #[serde(deserialize_with = "duration_from_str")]
    pub cer: Duration,
    /// Wait after eclipse entry before ROCON.
    #[serde(deserialize_with = "duration_from_str")]
    pub wait: Duration,
    /// Minimum SAA/eclipse intersection for a crossing to matter to CER.
    #[serde(deserialize_with = "duration_from_str")]
    pub crossing: Duration,
    /// Duration of the AZM block executed at every SAA boundary.
    #[serde(deserialize_with = "duration_from_str")]
    pub azm: Duration,
    /// SAA crossings at most this long are treated as a single protected
    /// footprint instead of two AZM windows.
    #[serde(deserialize_with = "duration_from_str")]
    pub saa: Duration,
    /// CERON leads the SAA envelope by this much (inside mode).
    #[serde(rename = "cer-before", deserialize_with = "duration_from_str")]
    pub cer_before: Duration,
    /// CEROFF trails the SAA envelope by this much (inside mode).
    #[serde(rename = "cer-after", deserialize_with = "duration_from_str")]
    pub cer_after: Duration,
    /// Rewritten CERON leads a conflicting ROC command by this much.
    #[serde(rename = "cer-before-roc", deserialize_with = "duration_from_str")]
    pub cer_before_roc: Duration,
    /// Rewritten CEROFF trails a conflicting ROC command by this much.
    #[serde(rename = "cer-after-roc", deserialize_with = "duration_from_str")]
    pub cer_after_roc: Duration,
    /// Minimum eclipse time an aurora needs before ACS is worth scheduling.
    #[serde(rename = "acs-night", deserialize_with = "duration_from_str")]
    pub acs_night: Duration,
    /// ACS(ON|OFF) execution time.
    #[serde(rename = "acs-duration", deserialize_with = "duration_from_str")]
    pub acs_time: Duration,
}

impl Default for Delta {
    fn default() -> Self {
        Self {
            rocon: 50 * Unit::Second,
            rocoff: 80 * Unit::Second,
            ceron: 50 * Unit::Second,
            ceroff: 80 * Unit::Second,
            margin: 120 * Unit::Second,
            cer: 0 * Unit::Second,
            wait: 100 * Unit::Second,
            crossing: 120 * Unit::Second,
            azm: 40 * Unit::Second,
            saa: 10 * Unit::Second,
            cer_before: 50 * Unit::Second,
            cer_after: 15 * Unit::Second,
            cer_before_roc: 45 * Unit::Second,
            cer_after_roc: 10 * Unit::Second,
            acs_night: 180 * Unit::Second,
            acs_time: 5 * Unit::Second,
        }
    }
}

/// The subset of the delta consumed by the ROC planner.
#[derive(Clone, Copy, Debug)]
pub struct RocOption {
    pub time_on: Duration,
    pub time_off: Duration,
    pub time_azm: Duration,
    pub time_saa: Duration,
    pub time_between: Duration,
    pub wait_before_on: Duration,
}

/// The subset of the delta consumed by the CER planner.
#[derive(Clone, Copy, Debug)]
pub struct CerOption {
    pub switch_time: Duration,
    pub time_on: Duration,
    pub time_off: Duration,
    pub saa_crossing_time: Duration,
    pub before_saa: Duration,
    pub after_saa: Duration,
    pub before_roc: Duration,
    pub after_roc: Duration,
}

/// The subset of the delta consumed by the ACS planner.
#[derive(Clone, Copy, Debug)]
pub struct AuroraOption {
    pub night: Duration,
    pub time: Duration,
}

impl Delta {
    pub fn roc(&self) -> RocOption {
        RocOption {
            time_on: self.rocon,
            time_off: self.rocoff,
            time_azm: self.azm,
            time_saa: self.saa,
            time_between: self.margin,
            wait_before_on: self.wait,
        }
    }

    pub fn cer(&self) -> CerOption {
        CerOption {
            switch_time: self.cer,
            time_on: self.ceron,
            time_off: self.ceroff,
            saa_crossing_time: self.crossing,
            before_saa: self.cer_before,
            after_saa: self.cer_after,
            before_roc: self.cer_before_roc,
            after_roc: self.cer_after_roc,
        }
    }

    pub fn acs(&self) -> AuroraOption {
        AuroraOption {
            night: self.acs_night,
            time: self.acs_time,
        }
    }
}

/// The `[commands]` table: one text template per command. A schedule may be
/// created for a subset of the instruments, but templates come by on/off pair.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Fileset {
    #[serde(default)]
    pub rocon: String,
    #[serde(default)]
    pub rocoff: String,
    #[serde(default)]
    pub ceron: String,
    #[serde(default)]
    pub ceroff: String,
    #[serde(default)]
    pub acson: String,
    #[serde(default)]
    pub acsoff: String,
}

impl Fileset {
    pub fn can_roc(&self) -> bool {
        !self.rocon.is_empty() && !self.rocoff.is_empty()
    }

    pub fn can_cer(&self) -> bool {
        !self.ceron.is_empty() && !self.ceroff.is_empty()
    }

    pub fn can_acs(&self) -> bool {
        !self.acson.is_empty() && !self.acsoff.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.rocon.is_empty()
            && self.rocoff.is_empty()
            && self.ceron.is_empty()
            && self.ceroff.is_empty()
            && self.acson.is_empty()
            && self.acsoff.is_empty()
    }

    /// Checks that every configured template has its pair and that no pair
    /// shares a file.
    pub fn validate(&self) -> Result<(), ErebusError> {
        let pairs = [
            ("ROC", &self.rocon, &self.rocoff),
            ("CER", &self.ceron, &self.ceroff),
            ("ACS", &self.acson, &self.acsoff),
        ];
        for &(instr, on, off) in &pairs {
            if on.is_empty() != off.is_empty() {
                return Err(ErebusError::MissingFile(instr));
            }
            if !on.is_empty() && on == off {
                return Err(ErebusError::SameFile(instr));
            }
        }
        if self.is_empty() {
            return Err(ErebusError::NoCommands);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AreaSection {
    #[serde(default)]
    pub boxes: Vec<Rect>,
}

fn default_resolution() -> Duration {
    10 * Unit::Second
}

/// The settings file driving a whole run.
#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    /// The predicted trajectory; empty reads from stdin.
    #[serde(default)]
    pub path: String,
    /// Spacing between two trajectory rows. Informational only: the extractor
    /// self calibrates on the sample timestamps.
    #[serde(
        default = "default_resolution",
        deserialize_with = "duration_from_str"
    )]
    pub resolution: Duration,
    /// Where the schedule file is written; empty writes to stdout.
    #[serde(default)]
    pub alliop: String,
    /// Where the instrument list file is written; empty skips it.
    #[serde(default)]
    pub instrlist: String,
    /// Whether comments of the command templates are copied through.
    #[serde(rename = "keep-comment", default)]
    pub keep_comment: bool,
    #[serde(default)]
    pub area: AreaSection,
    #[serde(default)]
    pub delta: Delta,
    #[serde(default)]
    pub commands: Fileset,
}

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ErebusError> {
        let raw = fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| ErebusError::ConfigError(e.to_string()))
    }

    /// The aurora observation area configured in `[area]`.
    pub fn area(&self) -> Shape {
        Shape::from_boxes(self.area.boxes.iter().copied())
    }
}
