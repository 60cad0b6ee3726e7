use chrono::{NaiveDate, NaiveDateTime};

use artemis_types::PipelineTuning;

use crate::events::model::Location;
use crate::identify::Confidence;
use crate::reference::{InMemoryReference, MobProfile, SpawnRegion, SpawnZone};

use super::SessionTracker;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn reference() -> InMemoryReference {
    let foul = MobProfile {
        name: "Foul".into(),
        maturity: Some("Young".into()),
        min_health: 90.0,
        avg_health: 100.0,
        max_health: 110.0,
        spawn_zones: vec![SpawnZone {
            center: Location::new(1000.0, 1000.0),
            radius: 500.0,
        }],
        common_loot: vec!["Animal Hide".into()],
        unique_loot: vec![],
    };
    let region = SpawnRegion {
        name: "Foul (Calypso) - Young".into(),
        planet: "Calypso".into(),
        center: Location::new(1000.0, 1000.0),
        polygon: None,
        density: None,
    };
    InMemoryReference::new(vec![foul], vec![region])
}

const HUNT_LINES: &[&str] = &[
    "2024-01-15 12:00:00 [System] [] You inflicted 30.0 points of damage.",
    "2024-01-15 12:00:01 [System] [] You inflicted 30.0 points of damage.",
    "2024-01-15 12:00:02 [System] [] You inflicted 40.0 points of damage.",
    "2024-01-15 12:00:03 [System] [] You have gained 0.5 experience in your Rifle skill",
    "2024-01-15 12:00:05 [System] [] You received Animal Hide x (3) Value: 1.20 PED",
    "2024-01-15 12:00:06 [Local] [Jane Doe] [Calypso, 1000, 1000, 120, waypoint]",
    "2024-01-15 12:00:10 [System] [] You inflicted 50.0 points of damage.",
    "2024-01-15 12:00:12 [System] [] You inflicted 50.0 points of damage.",
    "2024-01-15 12:00:15 [System] [] You received Shrapnel x (100) Value: 0.10 PED",
];

#[test]
fn reports_only_closed_kills_until_finish() {
    let store = reference();
    let mut tracker = SessionTracker::new("s1", "u1", &store, PipelineTuning::default());

    let outcome = tracker.ingest_batch(HUNT_LINES, now()).unwrap();
    // The second loot batch is still open, so only one kill exists and
    // it stays unreported until something closes it.
    assert!(outcome.reports.is_empty());

    let end = tracker.finish().unwrap();
    assert_eq!(end.reports.len(), 2);
}

#[test]
fn first_kill_gets_location_loot_and_identity() {
    let store = reference();
    let mut tracker = SessionTracker::new("s1", "u1", &store, PipelineTuning::default());
    tracker.ingest_batch(HUNT_LINES, now()).unwrap();
    let reports = tracker.finish().unwrap().reports;

    let first = &reports[0];
    assert_eq!(first.analysis.hits, 3);
    assert_eq!(first.analysis.total_damage, 100.0);
    assert_eq!(first.analysis.estimated_health, 100.0);
    // The waypoint 1.1s after the synthesized kill retro-tagged it.
    assert_eq!(first.analysis.location, Some(Location::new(1000.0, 1000.0)));
    assert_eq!(first.loot.len(), 1);
    assert_eq!(first.loot[0].name, "Animal Hide");

    assert_eq!(first.identification.mob_name, "Foul Young");
    assert_eq!(first.identification.species.as_deref(), Some("Foul"));
    assert_eq!(first.identification.maturity.as_deref(), Some("Young"));
    assert_eq!(first.identification.band, Confidence::High);
    assert!(first.identification.confidence >= 0.9);
}

#[test]
fn second_kill_without_location_degrades_to_scorer_evidence() {
    let store = reference();
    let mut tracker = SessionTracker::new("s1", "u1", &store, PipelineTuning::default());
    tracker.ingest_batch(HUNT_LINES, now()).unwrap();
    let reports = tracker.finish().unwrap().reports;

    let second = &reports[1];
    assert_eq!(second.analysis.hits, 2);
    assert_eq!(second.analysis.estimated_health, 100.0);
    assert_eq!(second.analysis.location, None);
    // Health is the only matching signal: 40 of 100 points.
    assert_eq!(second.identification.mob_name, "Foul Young");
    assert_eq!(second.identification.band, Confidence::Medium);
    assert!((second.identification.confidence - 0.4).abs() < 1e-9);
}

#[test]
fn incremental_delivery_never_repeats_events() {
    let store = reference();
    let mut tracker = SessionTracker::new("s1", "u1", &store, PipelineTuning::default());

    let mut seen = 0;
    for line in HUNT_LINES {
        seen += tracker.ingest_batch([*line], now()).unwrap().events.len();
    }
    seen += tracker.finish().unwrap().events.len();

    assert_eq!(seen, tracker.events().len());
}

#[test]
fn cross_batch_loot_flush_stays_behind_delivered_events() {
    let store = reference();
    let mut tracker = SessionTracker::new("s1", "u1", &store, PipelineTuning::default());

    // The hit shares the loot's second, so the synthesized kill (100ms
    // before the loot) would sort ahead of it. Once the hit is already
    // delivered the kill must land after it instead.
    let batch1 = ["2024-01-15 12:00:05 [System] [] You inflicted 30.0 points of damage."];
    let batch2 = ["2024-01-15 12:00:05 [System] [] You received Animal Hide x (3) Value: 1.20 PED"];

    let first = tracker.ingest_batch(batch1, now()).unwrap();
    assert_eq!(first.events.len(), 1);

    tracker.ingest_batch(batch2, now()).unwrap();
    let end = tracker.finish().unwrap();

    let kinds: Vec<&'static str> = end.events.iter().map(|e| e.kind_name()).collect();
    assert_eq!(kinds, vec!["MOB_KILLED", "LOOT_RECEIVED"]);
    assert_eq!(tracker.events().len(), 3);
}

#[test]
fn loot_survives_a_hit_landing_inside_the_kill_offset() {
    let store = reference();
    let mut tracker = SessionTracker::new("s1", "u1", &store, PipelineTuning::default());

    // The killing blow shares the loot's second, so the synthesized kill
    // (100ms earlier) sorts ahead of that hit and the hit ends up between
    // the kill and its loot batch. The loot still belongs to the kill.
    let lines = [
        "2024-01-15 12:00:00 [System] [] You inflicted 30.0 points of damage.",
        "2024-01-15 12:00:05 [System] [] You inflicted 70.0 points of damage.",
        "2024-01-15 12:00:05 [System] [] You received Animal Hide x (2) Value: 0.80 PED",
        "2024-01-15 12:00:09 [System] [] You inflicted 40.0 points of damage.",
    ];
    tracker.ingest_batch(lines, now()).unwrap();
    let reports = tracker.finish().unwrap().reports;

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].loot.len(), 1);
    assert_eq!(reports[0].loot[0].name, "Animal Hide");
}

#[test]
fn stats_accumulate_over_the_whole_session() {
    let store = reference();
    let mut tracker = SessionTracker::new("s1", "u1", &store, PipelineTuning::default());
    tracker.ingest_batch(HUNT_LINES, now()).unwrap();
    tracker.finish().unwrap();

    let stats = tracker.stats();
    assert_eq!(stats.kills, 2);
    assert_eq!(stats.shots, 5);
    assert_eq!(stats.total_damage, 200.0);
    assert!((stats.loot_tt - 1.30).abs() < 1e-9);
    assert!((stats.skill_gain - 0.5).abs() < 1e-9);
}

#[test]
fn chat_noise_produces_empty_outcomes() {
    let store = reference();
    let mut tracker = SessionTracker::new("s1", "u1", &store, PipelineTuning::default());

    let outcome = tracker
        .ingest_batch(
            [
                "2024-01-15 12:00:00 [Local] [Jane Doe] anyone hunting fouls?",
                "garbage without any channel marker",
            ],
            now(),
        )
        .unwrap();
    assert!(outcome.events.is_empty());
    assert!(outcome.reports.is_empty());
    assert!(tracker.finish().unwrap().reports.is_empty());
}

#[test]
fn finish_is_terminal_and_idempotent() {
    let store = reference();
    let mut tracker = SessionTracker::new("s1", "u1", &store, PipelineTuning::default());
    tracker.ingest_batch(HUNT_LINES, now()).unwrap();

    let first = tracker.finish().unwrap();
    assert_eq!(first.reports.len(), 2);
    let second = tracker.finish().unwrap();
    assert!(second.events.is_empty());
    assert!(second.reports.is_empty());
}
