extern crate erebus;

use erebus::cosmic::{Period, PeriodKind};
use erebus::io::config::Delta;
use erebus::sched::{Label, Schedule};
use erebus::time::{Epoch, Unit};
use erebus::ErebusError;

fn at(h: u8, m: u8, s: u8) -> Epoch {
    Epoch::from_gregorian_utc(2019, 1, 1, h, m, s, 0)
}

fn eclipse(starts: Epoch, ends: Epoch) -> Period {
    Period::new(PeriodKind::Eclipse, starts, ends)
}

fn saa(starts: Epoch, ends: Epoch) -> Period {
    Period::new(PeriodKind::Saa, starts, ends)
}

fn schedule(eclipses: Vec<Period>, saas: Vec<Period>) -> Schedule {
    Schedule {
        ignore: false,
        eclipses,
        saas,
        auroras: Vec::new(),
    }
}

fn outside_delta() -> Delta {
    let mut delta = Delta::default();
    delta.cer = 300 * Unit::Second;
    delta
}

#[test]
fn clear_eclipse_switches_cer_off_before_entry() {
    let sched = schedule(vec![eclipse(at(1, 0, 0), at(1, 30, 0))], Vec::new());
    let entries = sched
        .entries(&outside_delta(), true, true, false)
        .expect("plans");
    // The ROC pair plus one CEROFF, which leads the eclipse by the switch
    // time and therefore comes first.
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].label, Label::CerOff);
    assert_eq!(entries[0].when, at(0, 55, 0));
    assert_eq!(entries[1].when, at(1, 1, 40));
    assert_eq!(entries[2].when, at(1, 28, 40));
}

#[test]
fn outside_mode_emits_one_event_per_polarity_flip() {
    // Crossing, crossing, clear, crossing: the second eclipse repeats the
    // polarity and is skipped.
    let sched = schedule(
        vec![
            eclipse(at(1, 0, 0), at(1, 30, 0)),
            eclipse(at(2, 0, 0), at(2, 30, 0)),
            eclipse(at(3, 0, 0), at(3, 30, 0)),
            eclipse(at(4, 0, 0), at(4, 30, 0)),
        ],
        vec![
            saa(at(1, 5, 0), at(1, 10, 0)),
            saa(at(2, 0, 0), at(2, 10, 0)),
            saa(at(4, 0, 0), at(4, 5, 0)),
        ],
    );
    let entries = sched
        .entries(&outside_delta(), false, true, false)
        .expect("plans");
    let labels: Vec<Label> = entries.iter().map(|e| e.label).collect();
    assert_eq!(labels, vec![Label::CerOn, Label::CerOff, Label::CerOn]);
    assert_eq!(entries[0].when, at(0, 55, 0));
    assert_eq!(entries[1].when, at(2, 55, 0));
    assert_eq!(entries[2].when, at(3, 55, 0));
}

#[test]
fn outside_mode_with_zero_threshold_treats_any_saa_as_crossing() {
    let mut delta = outside_delta();
    delta.crossing = 0 * Unit::Second;
    // The SAA does not even touch the eclipse, but a zero threshold makes
    // every night a crossing as long as one SAA exists.
    let sched = schedule(
        vec![eclipse(at(1, 0, 0), at(1, 30, 0))],
        vec![saa(at(5, 0, 0), at(5, 10, 0))],
    );
    let entries = sched.entries(&delta, false, true, false).expect("plans");
    assert_eq!(entries[0].label, Label::CerOn);
}

#[test]
fn inside_mode_without_roc_conflict() {
    let sched = schedule(
        vec![eclipse(at(3, 0, 0), at(3, 40, 0))],
        vec![saa(at(3, 10, 0), at(3, 35, 0))],
    );
    let entries = sched
        .entries(&Delta::default(), true, true, false)
        .expect("plans");
    // ROCON, CERON, CEROFF, ROCOFF once merged.
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].label, Label::RocOn);
    assert_eq!(entries[0].when, at(3, 1, 40));
    assert_eq!(entries[1].label, Label::CerOn);
    assert_eq!(entries[1].when, at(3, 9, 10));
    assert_eq!(entries[2].label, Label::CerOff);
    assert_eq!(entries[2].when, at(3, 35, 15));
    assert_eq!(entries[3].label, Label::RocOff);
    assert_eq!(entries[3].when, at(3, 38, 40));
}

#[test]
fn inside_mode_ceron_yields_to_rocon() {
    // The SAA envelope starts so early that the CERON candidate execution
    // would run into the ROCON window; it is rewritten to lead the ROCON.
    let sched = schedule(
        vec![eclipse(at(3, 0, 0), at(3, 40, 0))],
        vec![saa(at(3, 2, 10), at(3, 35, 0))],
    );
    let entries = sched
        .entries(&Delta::default(), true, true, false)
        .expect("plans");
    let ceron = entries
        .iter()
        .find(|e| e.label == Label::CerOn)
        .expect("ceron");
    assert_eq!(ceron.when, at(3, 0, 55));
    let ceroff = entries
        .iter()
        .find(|e| e.label == Label::CerOff)
        .expect("ceroff");
    assert_eq!(ceroff.when, at(3, 35, 15));
}

#[test]
fn inside_mode_ceroff_trails_a_conflicting_rocoff() {
    // ROCOFF runs [03:38:40, 03:40:00]. The CEROFF candidate 03:37:45 would
    // still be executing at 03:39:05, inside that window, so it is pushed
    // past the ROCOFF plus the after-roc margin.
    let sched = schedule(
        vec![eclipse(at(3, 0, 0), at(3, 40, 0))],
        vec![saa(at(3, 10, 0), at(3, 37, 30))],
    );
    let entries = sched
        .entries(&Delta::default(), true, true, false)
        .expect("plans");
    let rocoff = entries
        .iter()
        .find(|e| e.label == Label::RocOff)
        .expect("rocoff");
    assert_eq!(rocoff.when, at(3, 38, 40));
    let ceroff = entries
        .iter()
        .find(|e| e.label == Label::CerOff)
        .expect("ceroff");
    assert_eq!(ceroff.when, at(3, 40, 10));
}

#[test]
fn inside_mode_collapses_multiple_saas_into_one_envelope() {
    let sched = schedule(
        vec![eclipse(at(3, 0, 0), at(3, 40, 0))],
        vec![
            saa(at(3, 10, 0), at(3, 15, 0)),
            saa(at(3, 20, 0), at(3, 25, 0)),
            saa(at(3, 30, 0), at(3, 35, 0)),
        ],
    );
    let entries = sched
        .entries(&Delta::default(), true, true, false)
        .expect("plans");
    let ceron = entries
        .iter()
        .find(|e| e.label == Label::CerOn)
        .expect("ceron");
    let ceroff = entries
        .iter()
        .find(|e| e.label == Label::CerOff)
        .expect("ceroff");
    // One pair for the whole envelope [03:10, 03:35], not one per SAA.
    assert_eq!(entries.len(), 4);
    assert_eq!(ceron.when, at(3, 9, 10));
    assert_eq!(ceroff.when, at(3, 35, 15));
}

#[test]
fn inside_mode_skips_thin_crossings() {
    // A 100 s envelope is below the 120 s crossing threshold.
    let sched = schedule(
        vec![eclipse(at(3, 0, 0), at(3, 40, 0))],
        vec![saa(at(3, 10, 0), at(3, 11, 40))],
    );
    let entries = sched
        .entries(&Delta::default(), true, true, false)
        .expect("plans");
    assert!(entries.iter().all(|e| e.label.is_roc()));
}

#[test]
fn inside_mode_requires_roc_entries() {
    let sched = schedule(
        vec![eclipse(at(3, 0, 0), at(3, 40, 0))],
        vec![saa(at(3, 10, 0), at(3, 35, 0))],
    );
    match sched.entries(&Delta::default(), false, true, false) {
        Err(ErebusError::MissingInstrument { needs, missing }) => {
            assert_eq!(needs, "CER");
            assert_eq!(missing, "ROC");
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn cer_pairing_alternates_off_and_on() {
    let sched = schedule(
        vec![
            eclipse(at(1, 0, 0), at(1, 30, 0)),
            eclipse(at(2, 0, 0), at(2, 30, 0)),
            eclipse(at(3, 0, 0), at(3, 30, 0)),
        ],
        vec![saa(at(2, 5, 0), at(2, 15, 0))],
    );
    let entries = sched
        .entries(&outside_delta(), false, true, false)
        .expect("plans");
    // Clear, crossing, clear: every event flips the polarity of the last.
    let labels: Vec<Label> = entries.iter().map(|e| e.label).collect();
    assert_eq!(labels, vec![Label::CerOff, Label::CerOn, Label::CerOff]);
    for w in entries.windows(2) {
        assert!(w[0].when <= w[1].when);
        assert_ne!(w[0].label, w[1].label);
    }
}
