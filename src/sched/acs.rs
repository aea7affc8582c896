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

use super::{Entry, Label, Schedule};
use crate::cosmic::Period;
use crate::errors::ErebusError;
use crate::io::config::{AuroraOption, RocOption};
use crate::time::Epoch;

/// Plans an ACSON/ACSOFF pair per aurora observation. ACSON yields to a
/// nearby ROCON (the camera powers up first), ACSOFF rides the surrounding
/// eclipse to its end when the night outlasts the aurora. A pair is all or
/// nothing: auroras whose window cannot fit both commands are skipped. The
/// ROC entries are required input.
pub fn plan(
    sched: &Schedule,
    opts: &AuroraOption,
    roc: &RocOption,
    entries: &[Entry],
) -> Result<Vec<Entry>, ErebusError> {
    let rocs: Vec<&Entry> = entries.iter().filter(|e| e.label.is_roc()).collect();
    if rocs.is_empty() {
        return Err(ErebusError::MissingInstrument {
            needs: "ACS",
            missing: "ROC",
        });
    }
    let min = opts.night + opts.time + opts.time;
    let mut planned = Vec::new();
    for a in &sched.auroras {
        if a.duration() < min {
            continue;
        }
        let acson = match schedule_on(a, &rocs, opts, roc) {
            Some(when) => when,
            None => continue,
        };
        let acsoff = match schedule_off(a, sched, opts, roc) {
            Some(when) => when,
            None => continue,
        };
        if acsoff > acson + opts.time {
            planned.push(Entry::new(Label::AcsOn, acson, *a));
            planned.push(Entry::new(Label::AcsOff, acsoff, *a));
        }
    }
    Ok(planned)
}

fn schedule_on(
    a: &Period,
    rocs: &[&Entry],
    opts: &AuroraOption,
    roc: &RocOption,
) -> Option<Epoch> {
    // The nearest ROCON whose execution could brush the aurora start.
    let lower = a.starts - roc.time_on;
    let upper = a.starts + roc.wait_before_on + roc.time_on;
    let rocon = rocs
        .iter()
        .find(|r| r.label == Label::RocOn && r.when > lower && r.when < upper);

    let when = match rocon {
        None => a.starts,
        Some(r) if a.starts > r.when + roc.time_on => a.starts,
        Some(r) => {
            let after_rocon = r.when + roc.time_on;
            if after_rocon > a.ends {
                return None;
            }
            after_rocon
        }
    };
    // A ROCOFF running over the ACSON execution window kills the observation.
    let exec_end = when + opts.time;
    for r in rocs {
        if r.label == Label::RocOff && !(r.when > exec_end || r.when + roc.time_off < when) {
            return None;
        }
    }
    Some(when)
}

fn schedule_off(
    a: &Period,
    sched: &Schedule,
    opts: &AuroraOption,
    roc: &RocOption,
) -> Option<Epoch> {
    let candidate = a.ends - opts.time;
    let mut night = None;
    for e in &sched.eclipses {
        if e.ends >= candidate {
            night = Some(e);
            break;
        }
        if e.starts > a.ends {
            break;
        }
    }
    let e = match night {
        None => return Some(candidate),
        Some(e) => e,
    };
    let rocoff = e.ends - roc.time_off;
    if candidate < rocoff {
        // The night outlasts the aurora: keep observing until just before
        // the eclipse ends.
        Some(e.ends - opts.time)
    } else if candidate == rocoff {
        Some(rocoff - opts.time)
    } else {
        None
    }
}
