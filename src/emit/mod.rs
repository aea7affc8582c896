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

extern crate md5;

use crate::errors::ErebusError;
use crate::io::config::{Delta, Settings};
use crate::sched::{Entry, Label, Schedule};
use crate::time::{Duration, Epoch, Unit};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::time::UNIX_EPOCH;

/// Line written to the instrument list when ROC or ACS time is scheduled.
pub const INSTR_MXGS: &str = "MXGS 128";
/// Line written to the instrument list when CER time is scheduled.
pub const INSTR_MMIA: &str = "MMIA 129";

/// Offset between UTC and the platform's on-board GPS-like scale.
pub const LEAP_SECONDS: i64 = 18;

/// Every non-comment line of a command template consumes this much schedule
/// time, and the first command starts this long after the base instant.
pub const STEP_SECONDS: i64 = 5;

pub fn step() -> Duration {
    STEP_SECONDS * Unit::Second
}

/// Converts a UTC instant to seconds-of-year: elapsed seconds since 00:00 UTC
/// on 1 January of the instant's own year, plus the leap offset.
pub fn soy(e: Epoch) -> i64 {
    let (year, _, _, _, _, _, _) = e.to_gregorian_utc();
    let year_start = Epoch::from_gregorian_utc_at_midnight(year, 1, 1);
    (e - year_start).in_seconds().floor() as i64 + LEAP_SECONDS
}

/// `YYYY-mm-ddTHH:MM:SS`, the stamp used in tables and annotations.
pub fn format_epoch(e: Epoch) -> String {
    let (y, m, d, hh, mm, ss, _) = e.to_gregorian_utc();
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        y, m, d, hh, mm, ss
    )
}

/// Same, with microseconds, for log lines.
pub fn format_epoch_precise(e: Epoch) -> String {
    let (y, m, d, hh, mm, ss, nanos) = e.to_gregorian_utc();
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:06}",
        y,
        m,
        d,
        hh,
        mm,
        ss,
        nanos / 1_000
    )
}

fn format_hms(e: Epoch) -> String {
    let (_, _, _, hh, mm, ss, _) = e.to_gregorian_utc();
    format!("{:02}:{:02}:{:02}", hh, mm, ss)
}

fn day_of_year(e: Epoch) -> i64 {
    let (year, _, _, _, _, _, _) = e.to_gregorian_utc();
    let year_start = Epoch::from_gregorian_utc_at_midnight(year, 1, 1);
    ((e - year_start).in_seconds() / 86_400.0).floor() as i64 + 1
}

/// Cumulative powered time of ROC: for each adjacent ROCON/ROCOFF pair, the
/// span between the end of the ROCON execution and the ROCOFF instant.
pub fn time_roc(entries: &[Entry], delta: &Delta) -> (usize, Duration) {
    paired_time(entries, Label::RocOn, Label::RocOff, delta.rocon)
}

/// Cumulative off time of CER: for each adjacent CEROFF/CERON pair, the span
/// between the end of the CEROFF execution and the CERON instant.
pub fn time_cer(entries: &[Entry], delta: &Delta) -> (usize, Duration) {
    paired_time(entries, Label::CerOff, Label::CerOn, delta.ceroff)
}

/// Cumulative ACS commanding time: every ACS event runs for the configured
/// duration.
pub fn time_acs(entries: &[Entry], delta: &Delta) -> (usize, Duration) {
    let mut count = 0;
    let mut total = 0 * Unit::Second;
    for e in entries {
        if e.label == Label::AcsOn || e.label == Label::AcsOff {
            count += 1;
            total += delta.acs_time;
        }
    }
    (count, total)
}

fn paired_time(
    entries: &[Entry],
    opening: Label,
    closing: Label,
    exec: Duration,
) -> (usize, Duration) {
    let mut pairs = 0;
    let mut total = 0 * Unit::Second;
    let mut i = 0;
    while i < entries.len() {
        if entries[i].label != opening {
            i += 1;
            continue;
        }
        let mut j = i + 1;
        while j < entries.len() && entries[j].label != closing {
            j += 1;
        }
        if j >= entries.len() {
            break;
        }
        total += entries[j].when - (entries[i].when + exec);
        pairs += 1;
        i = j + 1;
    }
    (pairs, total)
}

/// Builds the schedule for every instrument with a configured command pair
/// and writes the alliop and instrlist files. The base instant is pinned five
/// seconds before the first command.
pub fn create(
    settings: &Settings,
    sched: &Schedule,
    cmdline: &str,
    execution: Epoch,
) -> Result<(), ErebusError> {
    settings.commands.validate()?;
    let fileset = &settings.commands;
    let entries = sched.entries(
        &settings.delta,
        fileset.can_roc(),
        fileset.can_cer(),
        fileset.can_acs(),
    )?;
    if entries.is_empty() {
        return Ok(());
    }
    let first = &entries[0];
    let last = &entries[entries.len() - 1];
    info!(
        "first command ({}) at {} ({})",
        first.label,
        format_epoch_precise(first.when),
        soy(first.when)
    );
    info!(
        "last command ({}) at {} ({})",
        last.label,
        format_epoch_precise(last.when),
        soy(last.when)
    );

    let base = first.when - step();
    let mut buf = Vec::new();
    write_preamble(&mut buf, base, cmdline, execution)?;
    write_metadata(&mut buf, settings)?;
    let counts = write_schedule(&mut buf, &entries, base, settings)?;
    for (label, count) in &counts {
        info!("{} scheduled: {}", label, count);
    }

    let (_, roc_time) = time_roc(&entries, &settings.delta);
    let (_, cer_time) = time_cer(&entries, &settings.delta);
    let (_, acs_time) = time_acs(&entries, &settings.delta);
    info!("MXGS-ROC total time: {}", roc_time);
    info!("MMIA-CER total time: {}", cer_time);
    info!("MXGS-ACS total time: {}", acs_time);

    let alliop = if settings.alliop.is_empty() {
        io::stdout().write_all(&buf)?;
        "alliop"
    } else {
        fs::write(&settings.alliop, &buf)?;
        settings.alliop.as_str()
    };
    info!("md5 {}: {:x}", alliop, md5::compute(&buf));

    let zero = 0 * Unit::Second;
    let mxgs = (fileset.can_roc() && roc_time > zero) || (fileset.can_acs() && acs_time > zero);
    let mmia = fileset.can_cer() && cer_time > zero;
    write_instrlist(&settings.instrlist, mxgs, mmia)
}

/// Writes the banner comment block heading every alliop file.
pub fn write_preamble<W: Write>(
    w: &mut W,
    base: Epoch,
    cmdline: &str,
    execution: Epoch,
) -> io::Result<()> {
    writeln!(w, "# {}-{}", crate::PROGRAM, crate::VERSION)?;
    writeln!(w, "# {}", cmdline)?;
    writeln!(w, "# execution time: {}", execution)?;
    writeln!(
        w,
        "# schedule start time: {} (SOY: {})",
        format_epoch(base),
        soy(base)
    )?;
    writeln!(w)
}

/// Writes one fingerprint line (md5, mtime, size) per input file, so a
/// schedule records exactly what it was built from.
pub fn write_metadata<W: Write>(w: &mut W, settings: &Settings) -> Result<(), ErebusError> {
    let fileset = &settings.commands;
    let files = [
        &settings.path,
        &fileset.rocon,
        &fileset.rocoff,
        &fileset.ceron,
        &fileset.ceroff,
        &fileset.acson,
        &fileset.acsoff,
    ];
    for file in &files {
        if file.is_empty() {
            continue;
        }
        let bytes = fs::read(file)?;
        let digest = md5::compute(&bytes);
        let meta = fs::metadata(file)?;
        let modified = meta
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map(|d| Epoch::from_unix_seconds(d.as_secs() as f64))
            .map(format_epoch)
            .unwrap_or_else(|_| "unknown".to_owned());
        info!(
            "{}: md5 = {:x}, lastmod: {}, size: {} bytes",
            file,
            digest,
            modified,
            bytes.len()
        );
        writeln!(
            w,
            "# {}: md5 = {:x}, lastmod: {}, size : {} bytes",
            file,
            digest,
            modified,
            bytes.len()
        )?;
    }
    writeln!(w)?;
    Ok(())
}

/// Expands each entry's command template into the schedule, skipping entries
/// before the base instant, and returns how many commands of each label were
/// written.
pub fn write_schedule<W: Write>(
    w: &mut W,
    entries: &[Entry],
    base: Epoch,
    settings: &Settings,
) -> Result<HashMap<Label, usize>, ErebusError> {
    let fileset = &settings.commands;
    let keep = settings.keep_comment;
    let mut cid = 1;
    let mut counts = HashMap::new();
    for e in entries {
        if e.when < base {
            continue;
        }
        let offset = e.when - base;
        let file = match e.label {
            Label::RocOn | Label::RocOff => {
                if !fileset.can_roc() {
                    return Err(ErebusError::MissingFile("ROC"));
                }
                if e.label == Label::RocOn {
                    &fileset.rocon
                } else {
                    &fileset.rocoff
                }
            }
            Label::CerOn | Label::CerOff => {
                if !fileset.can_cer() {
                    return Err(ErebusError::MissingFile("CER"));
                }
                if e.label == Label::CerOn {
                    &fileset.ceron
                } else {
                    &fileset.ceroff
                }
            }
            Label::AcsOn | Label::AcsOff => {
                if !fileset.can_acs() {
                    return Err(ErebusError::MissingFile("ACS"));
                }
                if e.label == Label::AcsOn {
                    &fileset.acson
                } else {
                    &fileset.acsoff
                }
            }
        };
        cid = write_commands(w, file, cid, e.when, offset, keep)?;
        *counts.entry(e.label).or_insert(0) += 1;
    }
    Ok(counts)
}

/// How much schedule time the template at hand consumes: five seconds per
/// command line.
fn template_duration(content: &str) -> Duration {
    let commands = content
        .lines()
        .filter(|line| !line.starts_with('#'))
        .count() as i64;
    commands * STEP_SECONDS * Unit::Second
}

/// Expands one command template. Command lines get the running offset from
/// the base instant prefixed and advance the clock by five seconds each;
/// comment lines are annotated with their SOY/GMT stamp and copied through
/// only in keep-comment mode.
fn write_commands<W: Write>(
    w: &mut W,
    file: &str,
    mut cid: i32,
    when: Epoch,
    offset: Duration,
    keep: bool,
) -> Result<i32, ErebusError> {
    if file.is_empty() {
        return Ok(cid);
    }
    let content = fs::read_to_string(file)?;
    if template_duration(&content) <= 0 * Unit::Second {
        return Ok(cid);
    }
    let mut when = when;
    let mut offset = offset;
    if keep {
        writeln!(
            w,
            "# {}: {} (execution time: {})",
            file,
            format_epoch_precise(when),
            template_duration(&content)
        )?;
    }
    for line in content.lines() {
        let comment = line.starts_with('#');
        if !comment {
            writeln!(w, "{} {}", offset.in_seconds().floor() as i64, line)?;
            offset += step();
            when += step();
        } else {
            writeln!(
                w,
                "# SOY (GPS): {}/ GMT {:03}/{}",
                soy(when),
                day_of_year(when),
                format_hms(when)
            )?;
            if keep {
                let body = line.strip_prefix('#').unwrap_or(line);
                writeln!(w, "# CMD {}:{}", cid, body)?;
                cid += 1;
            }
        }
    }
    writeln!(w)?;
    Ok(cid)
}

/// Writes the instrument list companion file and logs its fingerprint. An
/// empty path skips the file.
pub fn write_instrlist(path: &str, mxgs: bool, mmia: bool) -> Result<(), ErebusError> {
    if path.is_empty() {
        return Ok(());
    }
    let mut buf = Vec::new();
    if mxgs {
        writeln!(buf, "{}", INSTR_MXGS)?;
    }
    if mmia {
        writeln!(buf, "{}", INSTR_MMIA)?;
    }
    fs::write(path, &buf)?;
    info!("md5 {}: {:x}", path, md5::compute(&buf));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cosmic::{Period, PeriodKind};

    fn entry(label: Label, h: u8, m: u8, s: u8) -> Entry {
        let when = Epoch::from_gregorian_utc(2019, 1, 1, h, m, s, 0);
        Entry {
            label,
            when,
            warning: false,
            period: Period::new(PeriodKind::Eclipse, when, when + 1 * Unit::Hour),
        }
    }

    #[test]
    fn soy_includes_the_leap_offset() {
        let e = Epoch::from_gregorian_utc_at_midnight(2019, 1, 1);
        assert_eq!(soy(e), LEAP_SECONDS);
        assert_eq!(soy(e + 1 * Unit::Day), 86_400 + LEAP_SECONDS);
        // The year basis renews on 1 January of the instant's own year.
        let next_year = Epoch::from_gregorian_utc(2020, 1, 1, 0, 0, 30, 0);
        assert_eq!(soy(next_year), 30 + LEAP_SECONDS);
    }

    #[test]
    fn roc_total_spans_on_to_off() {
        let delta = Delta::default();
        let entries = vec![
            entry(Label::RocOn, 1, 1, 40),
            entry(Label::RocOff, 1, 28, 40),
            entry(Label::RocOn, 2, 1, 40),
            entry(Label::RocOff, 2, 28, 40),
        ];
        let (pairs, total) = time_roc(&entries, &delta);
        assert_eq!(pairs, 2);
        // Each pair spans 27 min minus the 50 s ROCON execution.
        let span = 27 * Unit::Minute - 50 * Unit::Second;
        assert_eq!(total, span + span);
    }

    #[test]
    fn cer_total_spans_off_to_on() {
        let delta = Delta::default();
        let entries = vec![
            entry(Label::CerOff, 0, 55, 0),
            entry(Label::CerOn, 3, 0, 0),
        ];
        let (pairs, total) = time_cer(&entries, &delta);
        assert_eq!(pairs, 1);
        assert_eq!(
            total,
            2 * Unit::Hour + 5 * Unit::Minute - 80 * Unit::Second
        );
    }

    #[test]
    fn acs_total_counts_every_event() {
        let delta = Delta::default();
        let entries = vec![
            entry(Label::AcsOn, 5, 10, 0),
            entry(Label::AcsOff, 5, 29, 55),
        ];
        let (count, total) = time_acs(&entries, &delta);
        assert_eq!(count, 2);
        assert_eq!(total, 10 * Unit::Second);
    }

    #[test]
    fn unpaired_events_contribute_nothing() {
        let delta = Delta::default();
        let entries = vec![entry(Label::RocOn, 1, 1, 40)];
        let (pairs, total) = time_roc(&entries, &delta);
        assert_eq!(pairs, 0);
        assert_eq!(total, 0 * Unit::Second);
    }

    #[test]
    fn template_duration_ignores_comments() {
        let content = "# power on sequence\nCMD A\nCMD B\n# done\nCMD C\n";
        assert_eq!(template_duration(content), 15 * Unit::Second);
        assert_eq!(template_duration("# only comments\n"), 0 * Unit::Second);
    }

    #[test]
    fn preamble_carries_base_and_soy() {
        let base = Epoch::from_gregorian_utc(2019, 1, 1, 1, 1, 35, 0);
        let mut buf = Vec::new();
        write_preamble(&mut buf, base, "erebus ops.toml", base).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("# erebus ops.toml"));
        assert!(text.contains("2019-01-01T01:01:35"));
        assert!(text.contains(&format!("SOY: {}", 3_695 + LEAP_SECONDS)));
    }
}
