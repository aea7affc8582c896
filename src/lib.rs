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

/*! # erebus

[Erebus](https://en.wikipedia.org/wiki/Erebus): offline command-schedule generation for the
instruments of a low Earth orbit platform. From a predicted trajectory tagged with eclipse and
South Atlantic Anomaly crossings, erebus derives the eclipse, SAA and aurora periods of every
upcoming orbit and turns them into a deterministic, time-stamped command schedule for the ROC
and CER instruments, with optional ACS aurora observations.

The planner is a pure function of the trajectory, the timing options and the base instant: no
telemetry, no optimisation, no surprises. Feed it the same inputs and it will produce the same
schedule, byte for byte.
*/

/// Provides the period algebra and the geographic shapes the planners reason about.
pub mod cosmic;

/// Provides the emitter bridge: alliop and instrlist writers, command template expansion, and
/// the seconds-of-year conversion of the on-board time reference.
pub mod emit;

mod errors;
/// Erebus will (almost) never panic and functions which may fail will return an error.
pub use self::errors::ErebusError;
pub use self::errors::{EGENERIC, EINVAL, EIO, EMISSING_FILE, ESAME_FILE};

/// All the input needs of the planner: settings file and trajectory stream.
pub mod io;

/// The temporal planner itself: timeline extraction, filtering, the three instrument planners
/// and the merged entry list.
pub mod sched;

#[macro_use]
extern crate log;
extern crate hifitime;

/// Re-export of hifitime
pub mod time {
    pub use hifitime::*;
}

/// Program name used in banners and log prefixes.
pub const PROGRAM: &str = "erebus";

/// Crate version, stamped into every schedule preamble.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
