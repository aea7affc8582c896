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

extern crate clap;
extern crate erebus;
extern crate lazy_static;
extern crate log;
extern crate pretty_env_logger;

use clap::{App, Arg};
use erebus::emit;
use erebus::io::config::{Delta, Settings};
use erebus::sched::{Entry, Label, Schedule};
use erebus::time::{Epoch, Unit};
use erebus::{ErebusError, PROGRAM, VERSION};
use lazy_static::lazy_static;
use log::info;
use std::env::{set_var, var};
use std::io;
use std::process;

const LOG_VAR: &str = "EREBUS_LOG";

lazy_static! {
    /// Wall clock instant the process started at, truncated to the second.
    static ref EXECUTION_TIME: Epoch = {
        let now = Epoch::now().expect("could not read the system clock");
        let (y, m, d, hh, mm, ss, _) = now.to_gregorian_utc();
        Epoch::from_gregorian_utc(y, m, d, hh, mm, ss, 0)
    };
    /// Tomorrow at 10:00 UTC: the operational default for the base instant.
    static ref DEFAULT_BASE_TIME: Epoch = {
        let (y, m, d, _, _, _, _) = EXECUTION_TIME.to_gregorian_utc();
        Epoch::from_gregorian_utc_at_midnight(y, m, d) + 1 * Unit::Day + 10 * Unit::Hour
    };
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        process::exit(e.exit_code());
    }
}

fn run() -> Result<(), ErebusError> {
    let default_base = emit::format_epoch(*DEFAULT_BASE_TIME);
    let app = App::new(PROGRAM)
        .version(VERSION)
        .author("Chris Rabotin <chris.rabotin@pm.me>")
        .about("Eclipse and SAA driven command schedule generation for LEO instrument payloads.")
        .arg(
            Arg::with_name("CONFIG")
                .help("Sets the settings file to use")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("base-time")
                .short("b")
                .long("base-time")
                .takes_value(true)
                .value_name("datetime")
                .default_value(&default_base)
                .help("Ignore every period starting at or before this UTC instant"),
        )
        .arg(
            Arg::with_name("list-entries")
                .long("list-entries")
                .takes_value(false)
                .help("Print the command entries instead of creating a schedule"),
        )
        .arg(
            Arg::with_name("list-periods")
                .long("list-periods")
                .takes_value(false)
                .help("Print the eclipse, SAA and aurora periods and exit"),
        )
        .arg(
            Arg::with_name("ignore")
                .long("ignore")
                .takes_value(false)
                .help("Keep schedule entries from blocks that do not meet the constraints"),
        );
    let matches = app.get_matches();

    if var(LOG_VAR).is_err() {
        set_var(LOG_VAR, "INFO");
    }
    if pretty_env_logger::try_init_custom_env(LOG_VAR).is_err() {
        println!("could not init logger");
    }

    let base_str = matches.value_of("base-time").unwrap();
    let base = Epoch::from_gregorian_str(base_str)
        .map_err(|_| ErebusError::BadUsage("base-time format invalid".to_owned()))?;

    let settings = Settings::load(matches.value_of("CONFIG").unwrap())?;
    let area = settings.area();
    let mut schedule = if settings.path.is_empty() {
        Schedule::from_reader(io::stdin(), &area)?
    } else {
        Schedule::open(&settings.path, &area)?
    };
    schedule.ignore = matches.is_present("ignore");
    let schedule = schedule.filter(Some(base));

    if matches.is_present("list-periods") {
        list_periods(&schedule);
        return Ok(());
    }
    if matches.is_present("list-entries") {
        return list_entries(&schedule, &settings);
    }

    dump_settings(&settings);
    let cmdline = std::env::args().collect::<Vec<_>>().join(" ");
    emit::create(&settings, &schedule, &cmdline, *EXECUTION_TIME)
}

fn dump_settings(settings: &Settings) {
    let delta = &settings.delta;
    info!("{}-{}", PROGRAM, VERSION);
    info!("settings: trajectory resolution: {}", settings.resolution);
    info!("settings: AZM duration: {}", delta.azm);
    info!("settings: ROCON time: {}", delta.rocon);
    info!("settings: ROCOFF time: {}", delta.rocoff);
    info!("settings: CER time: {}", delta.cer);
    info!("settings: CERON time: {}", delta.ceron);
    info!("settings: CEROFF time: {}", delta.ceroff);
    info!("settings: CER crossing duration: {}", delta.crossing);
    info!("settings: ACS min night duration: {}", delta.acs_night);
    info!("settings: ACS duration: {}", delta.acs_time);
}

fn list_periods(schedule: &Schedule) {
    use erebus::cosmic::PeriodKind;
    use erebus::time::Duration;

    let mut durations: Vec<(PeriodKind, Duration, usize)> = vec![
        (PeriodKind::Eclipse, 0 * Unit::Second, 0),
        (PeriodKind::Saa, 0 * Unit::Second, 0),
        (PeriodKind::Aurora, 0 * Unit::Second, 0),
    ];
    for (i, p) in schedule.periods().iter().enumerate() {
        println!(
            "{:>3} | {:<8} | {} | {} | {}",
            i,
            p.kind.to_string(),
            emit::format_epoch(p.starts),
            emit::format_epoch(p.ends),
            p.duration()
        );
        for entry in durations.iter_mut() {
            if entry.0 == p.kind {
                entry.1 += p.duration();
                entry.2 += 1;
            }
        }
    }
    println!();
    for (kind, total, count) in &durations {
        println!("{} total time: {} ({})", kind, total, count);
    }
}

fn list_entries(schedule: &Schedule, settings: &Settings) -> Result<(), ErebusError> {
    let mut schedule = schedule.clone();
    schedule.ignore = false;
    let fileset = &settings.commands;
    let (mut roc, mut cer, mut acs) = (fileset.can_roc(), fileset.can_cer(), fileset.can_acs());
    if !roc && !cer && !acs {
        roc = true;
        cer = true;
        acs = true;
    }
    let entries = schedule.entries(&settings.delta, roc, cer, acs)?;
    if entries.is_empty() {
        return Ok(());
    }
    let first = &entries[0];
    let last = &entries[entries.len() - 1];
    let base = first.when - emit::step();
    println!(
        "{:>3} | {} | {:<9} | {:<9} | {:<20} | {:<20}",
        "#", "?", "TYPE", "SOY (GPS)", "START (GMT)", "END (GMT)"
    );
    println!(
        "{:>3} | {} | {:<9} | {:<9} | {:<20} | {:<20}",
        0,
        " ",
        "SCHEDULE",
        emit::soy(base),
        emit::format_epoch(base),
        emit::format_epoch(last.when)
    );
    for (i, e) in entries.iter().enumerate() {
        println!(
            "{:>3} | {} | {:<9} | {:<9} | {:<20} | {:<20}",
            i + 1,
            if e.warning { "!" } else { "-" },
            e.label.to_string(),
            emit::soy(e.when),
            emit::format_epoch(e.when),
            emit::format_epoch(ends_at(e, &settings.delta))
        );
    }
    println!();
    let (count, total) = emit::time_roc(&entries, &settings.delta);
    println!("MXGS-ROC total time: {} ({})", total, count);
    let (count, total) = emit::time_acs(&entries, &settings.delta);
    println!("MXGS-ACS total time: {} ({})", total, count);
    let (count, total) = emit::time_cer(&entries, &settings.delta);
    println!("MMIA-CER total time: {} ({})", total, count);
    Ok(())
}

fn ends_at(e: &Entry, delta: &Delta) -> Epoch {
    match e.label {
        Label::RocOn => e.when + delta.rocon,
        Label::RocOff => e.when + delta.rocoff,
        Label::CerOn => e.when + delta.ceron,
        Label::CerOff => e.when + delta.ceroff,
        Label::AcsOn | Label::AcsOff => e.when + delta.acs_time,
    }
}
