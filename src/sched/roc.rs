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

use super::{crossing_list, is_between, Entry, Label, Schedule};
use crate::cosmic::Period;
use crate::errors::ErebusError;
use crate::io::config::RocOption;
use crate::time::Unit;

/// Plans one ROCON/ROCOFF pair per eclipse. ROCON avoids the AZM windows of
/// the first SAA overlapping the eclipse, ROCOFF those of the last one; any
/// SAA in between is deliberately left to the pair already scheduled. A pair
/// whose gap violates the margin is dropped, or emitted with warnings when the
/// schedule is permissive.
pub fn plan(sched: &Schedule, opts: &RocOption) -> Result<Vec<Entry>, ErebusError> {
    let mut entries = Vec::new();
    for e in &sched.eclipses {
        let crossings = crossing_list(e, &sched.saas);
        let (first, last) = match crossings.len() {
            0 => (None, None),
            n => (Some(crossings[0]), Some(crossings[n - 1])),
        };
        let mut rocon = schedule_on(e, first, opts);
        let mut rocoff = schedule_off(e, last, opts);

        let gap = rocoff.when - (rocon.when + opts.time_on);
        let too_tight = opts.time_between > 0 * Unit::Second && gap <= opts.time_between;
        let inverted = rocoff.when <= rocon.when + opts.time_on;
        if too_tight || inverted {
            if !sched.ignore {
                debug!("dropping ROC pair for {}: constraints not met", e);
                continue;
            }
            warn!("keeping hazardous ROC pair for {}", e);
            rocon.warning = true;
            rocoff.warning = true;
        }
        entries.push(rocon);
        entries.push(rocoff);
    }
    Ok(entries)
}

fn schedule_on(e: &Period, saa: Option<&Period>, o: &RocOption) -> Entry {
    let mut when = e.starts + o.wait_before_on;
    if let Some(s) = saa {
        if o.time_saa > 0 * Unit::Second && s.duration() <= o.time_saa {
            // A short crossing and its trailing AZM form one protected
            // footprint; push the command past it.
            let enter = s.starts;
            let exit = s.starts + o.time_azm + o.time_azm;
            if is_between(enter, exit, when) || is_between(enter, exit, when + o.time_on) {
                when = exit;
            }
            return Entry::new(Label::RocOn, when, *e);
        }
        // The ROCON window must neither swallow the AZM of the SAA entry nor
        // start within it.
        if (when < s.starts && when + o.time_on > s.starts + o.time_azm)
            || is_between(s.starts, s.starts + o.time_azm, when)
        {
            when = s.starts + o.time_azm;
        }
        // Same rules against the AZM of the SAA exit, re-reading the
        // candidate rewritten above.
        if (when < s.ends && when + o.time_on > s.ends + o.time_azm)
            || is_between(s.ends, s.ends + o.time_azm, when)
        {
            when = s.ends + o.time_azm;
        }
    }
    Entry::new(Label::RocOn, when, *e)
}

fn schedule_off(e: &Period, saa: Option<&Period>, o: &RocOption) -> Entry {
    let mut when = e.ends - o.time_off;
    if let Some(s) = saa {
        if o.time_saa > 0 * Unit::Second && s.duration() <= o.time_saa {
            let enter = s.starts;
            let exit = s.starts + o.time_azm + o.time_azm;
            if is_between(enter, exit, when) || is_between(enter, exit, when + o.time_off) {
                when = enter - o.time_off;
            }
        } else {
            // Exit AZM first, then entry AZM: a hit backs the command off to
            // end right where the protected window begins.
            if (when < s.ends && when + o.time_off > s.ends + o.time_azm)
                || is_between(s.ends, s.ends + o.time_azm, when)
            {
                when = s.ends - o.time_off;
            }
            if (when < s.starts && when + o.time_off > s.starts + o.time_azm)
                || is_between(s.starts, s.starts + o.time_azm, when)
            {
                when = s.starts - o.time_off;
            }
        }
        // A rewrite against an SAA mostly outside the eclipse may have pushed
        // the command out of its night; keep it within the eclipse.
        if when < e.starts {
            when = e.starts;
        }
        if when > e.ends {
            when = e.ends;
        }
    }
    Entry::new(Label::RocOff, when, *e)
}
