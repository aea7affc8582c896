extern crate erebus;

use erebus::cosmic::area::{Rect, Shape};
use erebus::cosmic::PeriodKind;
use erebus::io::config::Delta;
use erebus::sched::{Entry, Label, Schedule};
use erebus::time::{Epoch, Unit};

/// Two 90 minute orbits sampled every 10 s: a 35 minute night per orbit, a
/// 10 minute SAA crossing inside each night, and a pass over the aurora box
/// between 5 and 15 minutes into each night.
fn synthetic_trajectory() -> String {
    let mut out = String::from("datetime,mjd,altitude,latitude,longitude,eclipse,crossing,tle\n");
    for t in (0..=10_800).step_by(10) {
        let phase = t % 5_400;
        let eclipse = if phase < 2_100 { "1" } else { "0" };
        let saa = if (600..1_200).contains(&phase) { "1" } else { "0" };
        let lat = if (300..900).contains(&phase) { 70.0 } else { 0.0 };
        out.push_str(&format!(
            "2019-03-01T{:02}:{:02}:{:02}.000000,58543.0,410.0,{:.1},20.0,{},{},2019-060\n",
            t / 3_600,
            (t % 3_600) / 60,
            t % 60,
            lat,
            eclipse,
            saa
        ));
    }
    out
}

fn aurora_box() -> Shape {
    Shape::from_boxes(vec![Rect {
        north: 75.0,
        south: 60.0,
        west: 5.0,
        east: 40.0,
    }])
}

fn at(t: i64) -> Epoch {
    Epoch::from_gregorian_utc_at_midnight(2019, 3, 1) + t * Unit::Second
}

fn load() -> Schedule {
    Schedule::from_reader(synthetic_trajectory().as_bytes(), &aurora_box()).expect("extracts")
}

fn assert_monotonic(entries: &[Entry]) {
    for w in entries.windows(2) {
        assert!(
            w[0].when <= w[1].when,
            "{} scheduled after {}",
            w[0],
            w[1]
        );
    }
}

/// Every instrument subsequence must alternate on/off, opening with an on
/// command (CER opens with either polarity).
fn assert_paired(entries: &[Entry]) {
    let rocs: Vec<Label> = entries.iter().map(|e| e.label).filter(|l| l.is_roc()).collect();
    assert_eq!(rocs.len() % 2, 0);
    assert!(rocs
        .chunks(2)
        .all(|c| c == &[Label::RocOn, Label::RocOff][..]));

    let acss: Vec<Label> = entries
        .iter()
        .map(|e| e.label)
        .filter(|l| matches!(l, Label::AcsOn | Label::AcsOff))
        .collect();
    assert_eq!(acss.len() % 2, 0);
    assert!(acss
        .chunks(2)
        .all(|c| c == &[Label::AcsOn, Label::AcsOff][..]));

    let cers: Vec<Label> = entries
        .iter()
        .map(|e| e.label)
        .filter(|l| matches!(l, Label::CerOn | Label::CerOff))
        .collect();
    for w in cers.windows(2) {
        assert_ne!(w[0], w[1], "CER commands must alternate");
    }
}

#[test]
fn extracts_the_three_families() {
    let sched = load();
    assert_eq!(sched.eclipses.len(), 2);
    assert_eq!(sched.saas.len(), 2);
    assert_eq!(sched.auroras.len(), 2);

    assert_eq!(sched.eclipses[0].starts, at(0));
    assert_eq!(sched.eclipses[0].ends, at(2_090));
    assert_eq!(sched.eclipses[1].starts, at(5_400));
    assert_eq!(sched.eclipses[1].ends, at(7_490));
    assert_eq!(sched.saas[0].starts, at(600));
    assert_eq!(sched.saas[0].ends, at(1_190));
    assert_eq!(sched.auroras[0].starts, at(300));
    assert_eq!(sched.auroras[0].ends, at(890));
    assert_eq!(sched.auroras[1].starts, at(5_700));
    assert_eq!(sched.auroras[1].ends, at(6_290));
}

#[test]
fn families_are_disjoint_within_themselves() {
    let sched = load();
    for family in &[&sched.eclipses, &sched.saas, &sched.auroras] {
        for w in family.windows(2) {
            assert!(w[0].ends <= w[1].starts, "{} overlaps {}", w[0], w[1]);
        }
    }
    for p in sched.periods() {
        assert!(p.starts < p.ends);
    }
    for x in &sched.auroras {
        assert_eq!(x.kind, PeriodKind::Aurora);
    }
}

#[test]
fn plans_the_full_mission_timeline() {
    let sched = load();
    let entries = sched
        .entries(&Delta::default(), true, true, true)
        .expect("plans");
    assert_monotonic(&entries);
    assert_paired(&entries);

    let expected = vec![
        (Label::RocOn, 100),
        (Label::AcsOn, 300),
        (Label::CerOn, 550),
        (Label::CerOff, 1_205),
        (Label::RocOff, 2_010),
        (Label::AcsOff, 2_085),
        (Label::RocOn, 5_500),
        (Label::AcsOn, 5_700),
        (Label::CerOn, 5_950),
        (Label::CerOff, 6_605),
        (Label::RocOff, 7_410),
        (Label::AcsOff, 7_485),
    ];
    assert_eq!(entries.len(), expected.len());
    for (e, (label, t)) in entries.iter().zip(expected.iter()) {
        assert_eq!(e.label, *label);
        assert_eq!(e.when, at(*t), "wrong instant for {}", e.label);
        assert!(!e.warning);
    }
}

#[test]
fn base_time_cuts_the_first_orbit() {
    let sched = load();
    let base = at(3_000);
    let filtered = sched.filter(Some(base));
    for p in filtered.periods() {
        assert!(p.starts > base);
    }
    let entries = filtered
        .entries(&Delta::default(), true, true, true)
        .expect("plans");
    assert_eq!(entries.len(), 6);
    assert_eq!(entries[0].label, Label::RocOn);
    assert_eq!(entries[0].when, at(5_500));
    assert_monotonic(&entries);
    assert_paired(&entries);
}

#[test]
fn filtering_twice_changes_nothing() {
    let sched = load();
    let base = Some(at(3_000));
    let once = sched.filter(base);
    let twice = once.filter(base);
    assert_eq!(once.eclipses, twice.eclipses);
    assert_eq!(once.saas, twice.saas);
    assert_eq!(once.auroras, twice.auroras);
}

#[test]
fn entries_carry_their_originating_period() {
    let sched = load();
    let entries = sched
        .entries(&Delta::default(), true, false, false)
        .expect("plans");
    for e in &entries {
        assert_eq!(e.period.kind, PeriodKind::Eclipse);
        // The command belongs to the night it was planned for.
        assert!(e.period.starts == at(0) || e.period.starts == at(5_400));
    }
}
