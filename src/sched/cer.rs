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
use crate::cosmic::{Period, PeriodKind};
use crate::errors::ErebusError;
use crate::io::config::{CerOption, RocOption};
use crate::time::{Duration, Unit};

/// Plans CER in its classic mode: the instrument switches `switch_time`
/// before eclipse entry, on when the eclipse crosses the SAA for long enough,
/// off otherwise. Runs of eclipses with the same polarity collapse into one
/// event: only a polarity flip produces the next command.
pub fn plan_outside(sched: &Schedule, opts: &CerOption) -> Result<Vec<Entry>, ErebusError> {
    let mut entries = Vec::new();
    let mut rest: &[Period] = &sched.eclipses;
    while let Some(e) = rest.first() {
        let crossing = crosses(e, &sched.saas, opts.saa_crossing_time);
        let label = if crossing { Label::CerOn } else { Label::CerOff };
        entries.push(Entry::new(label, e.starts - opts.switch_time, *e));
        rest = skip_eclipses(&rest[1..], &sched.saas, crossing, opts.saa_crossing_time);
    }
    Ok(entries)
}

/// Whether any SAA intersects `e` for more than `threshold`. A zero threshold
/// makes every eclipse a crossing as soon as one SAA exists.
fn crosses(e: &Period, saas: &[Period], threshold: Duration) -> bool {
    for a in saas {
        if threshold == 0 * Unit::Second || e.intersect(a) > threshold {
            return true;
        }
        if a.starts > e.ends {
            break;
        }
    }
    false
}

/// Skips the eclipses whose crossing polarity matches the last emitted one
/// and returns the tail starting at the first flip.
fn skip_eclipses<'a>(
    eclipses: &'a [Period],
    saas: &[Period],
    crossing: bool,
    threshold: Duration,
) -> &'a [Period] {
    for (i, e) in eclipses.iter().enumerate() {
        if crosses(e, saas, threshold) != crossing {
            return &eclipses[i..];
        }
    }
    &[]
}

/// Plans CER in its SAA driven mode: for each eclipse, all overlapping SAAs
/// collapse into one envelope, CERON leads it and CEROFF trails it, and both
/// candidates are rewritten until they clear every ROC execution window. The
/// ROC entries are required input.
pub fn plan_inside(
    sched: &Schedule,
    opts: &CerOption,
    roc: &RocOption,
    entries: &[Entry],
) -> Result<Vec<Entry>, ErebusError> {
    let rocs: Vec<&Entry> = entries.iter().filter(|e| e.label.is_roc()).collect();
    if rocs.is_empty() {
        return Err(ErebusError::MissingInstrument {
            needs: "CER",
            missing: "ROC",
        });
    }
    let mut planned = Vec::new();
    for e in &sched.eclipses {
        let crossings = crossing_list(e, &sched.saas);
        let envelope = match crossings.len() {
            0 => continue,
            1 => *crossings[0],
            n => Period::new(
                PeriodKind::Saa,
                crossings[0].starts,
                crossings[n - 1].ends,
            ),
        };
        if envelope.duration() < opts.saa_crossing_time
            || e.intersect(&envelope) < opts.saa_crossing_time
        {
            continue;
        }

        // Walking the ROC list backwards resolves every CERON conflict in one
        // pass: a rewrite moves the candidate before the conflicting command,
        // and only earlier commands remain to be checked.
        let mut ceron = envelope.starts - opts.before_saa;
        for r in rocs.iter().rev() {
            let dr = roc_duration(r, roc);
            if is_between(r.when, r.when + dr, ceron)
                || is_between(r.when, r.when + dr, ceron + opts.time_on)
            {
                ceron = r.when - opts.before_roc;
            }
        }
        // Symmetrically, CEROFF walks forward and rewrites push it later.
        let mut ceroff = envelope.ends + opts.after_saa;
        for r in &rocs {
            let dr = roc_duration(r, roc);
            if is_between(r.when, r.when + dr, ceroff)
                || is_between(r.when, r.when + dr, ceroff + opts.time_off)
            {
                ceroff = r.when + dr + opts.after_roc;
            }
        }
        planned.push(Entry::new(Label::CerOn, ceron, envelope));
        planned.push(Entry::new(Label::CerOff, ceroff, envelope));
    }
    Ok(planned)
}

fn roc_duration(r: &Entry, roc: &RocOption) -> Duration {
    match r.label {
        Label::RocOn => roc.time_on,
        _ => roc.time_off,
    }
}
