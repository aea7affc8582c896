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

use std::io;
use thiserror::Error;

/// Exit code for malformed input data or configuration.
pub const EINVAL: i32 = 22;
/// Exit code for I/O failures on the trajectory or command files.
pub const EIO: i32 = 5;
/// Exit code for errors without a dedicated code.
pub const EGENERIC: i32 = 5000;
/// Exit code when an on/off command file is given without its pair.
pub const EMISSING_FILE: i32 = 5001;
/// Exit code when an on/off pair points to the same command file.
pub const ESAME_FILE: i32 = 5002;

/// Represents all possible errors that can occur when building a schedule.
#[derive(Error, Debug)]
pub enum ErebusError {
    /// Occurs when a trajectory timestamp cannot be parsed.
    #[error("time badly formatted at row {row} ({value})")]
    TimeBadSyntax { row: usize, value: String },

    /// Occurs when a latitude or longitude cannot be parsed.
    #[error("number badly formatted at row {row} ({value})")]
    NumberBadSyntax { row: usize, value: String },

    /// Occurs when a trajectory row does not carry the mandatory columns.
    #[error("trajectory badly shaped at row {row}: expected {expected} columns, found {found}")]
    ShapeBadSyntax {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Occurs when the underlying CSV stream is malformed.
    #[error("{0}")]
    BadUsage(String),

    /// Occurs when the trajectory yields neither eclipses nor SAA crossings.
    #[error("no eclipses/saas found")]
    NoPeriods,

    /// Occurs when a planner requires the output of another planner.
    #[error("{needs} cannot be scheduled without {missing} entries")]
    MissingInstrument {
        needs: &'static str,
        missing: &'static str,
    },

    /// Occurs when a command file is provided without its on/off pair.
    #[error("{0}: files should be provided by pair (on/off)")]
    MissingFile(&'static str),

    /// Occurs when the on and off commands point to the same file.
    #[error("{0}: same file for on/off")]
    SameFile(&'static str),

    /// Occurs when no command file at all is configured.
    #[error("no command files given")]
    NoCommands,

    /// Occurs when the configuration file cannot be decoded.
    #[error("invalid configuration file: {0}")]
    ConfigError(String),

    /// Occurs on any I/O failure on the trajectory, command or output files.
    #[error("{0}")]
    Io(#[from] io::Error),
}

impl ErebusError {
    /// The process exit code this error maps to.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::TimeBadSyntax { .. }
            | Self::NumberBadSyntax { .. }
            | Self::ShapeBadSyntax { .. }
            | Self::BadUsage(_)
            | Self::ConfigError(_) => EINVAL,
            Self::Io(_) => EIO,
            Self::MissingFile(_) => EMISSING_FILE,
            Self::SameFile(_) => ESAME_FILE,
            Self::NoPeriods | Self::MissingInstrument { .. } | Self::NoCommands => EGENERIC,
        }
    }
}
