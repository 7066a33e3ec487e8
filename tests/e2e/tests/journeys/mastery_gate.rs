//! Mastery time-gate journey: the progress score resists rapid-fire
//! inflation, failures always bite, and health rewards practice either
//! way.

use chrono::Duration;

use repaso_core::{Grade, ItemKind, MasteryParameters, decayed_health};
use repaso_e2e_tests::fixtures::{TestHarness, session_start};

#[test]
fn rapid_rereview_gains_nothing_until_the_gate_opens() {
    let harness = TestHarness::new();
    let service = &harness.service;
    let t0 = session_start();

    // First easy recall: band 0 has no gate.
    let first = service
        .record_review_at("ana", "lemma:decir", ItemKind::Lemma, Grade::Easy, t0)
        .unwrap();
    assert_eq!(first.mastery.new_mastery, 15);
    assert!(first.mastery.gate.can_gain_mastery);

    // Five minutes later: band 1 requires two hours. No mastery, but the
    // health boost still lands - practicing is rewarded.
    let rapid = service
        .record_review_at(
            "ana",
            "lemma:decir",
            ItemKind::Lemma,
            Grade::Easy,
            t0 + Duration::minutes(5),
        )
        .unwrap();
    assert_eq!(rapid.mastery.mastery_change, 0);
    assert!(!rapid.mastery.gate.can_gain_mastery);
    assert_eq!(rapid.record.mastery.mastery, 15);
    assert!(rapid.record.mastery.health > first.record.mastery.health);

    // Three hours after the credited success the gate is open; the same
    // grade now applies its full delta.
    let patient = service
        .record_review_at(
            "ana",
            "lemma:decir",
            ItemKind::Lemma,
            Grade::Easy,
            t0 + Duration::hours(3),
        )
        .unwrap();
    assert!(patient.mastery.gate.can_gain_mastery);
    assert_eq!(patient.mastery.mastery_change, 15);
    assert_eq!(patient.record.mastery.mastery, 30);
}

#[test]
fn dont_know_is_unconditional() {
    let harness = TestHarness::new();
    let service = &harness.service;
    let t0 = session_start();

    service
        .record_review_at("ana", "lemma:poder", ItemKind::Lemma, Grade::Easy, t0)
        .unwrap();

    // The legacy client sent "dont-know" on the mastery path; it is the
    // same action as "again".
    let grade = Grade::from_name("dont-know").unwrap();
    assert_eq!(grade, Grade::Again);

    // Seconds after a success - any gain would be gated, but the penalty
    // applies immediately and never consults the gate.
    let failed = service
        .record_review_at(
            "ana",
            "lemma:poder",
            ItemKind::Lemma,
            grade,
            t0 + Duration::seconds(30),
        )
        .unwrap();
    assert_eq!(failed.mastery.mastery_change, -15);
    assert_eq!(failed.record.mastery.mastery, 0);
    // Engagement still counts toward health.
    assert!(failed.mastery.health_boost > 0);
}

#[test]
fn gates_lengthen_as_mastery_climbs() {
    let harness = TestHarness::new();
    let service = &harness.service;
    let params = MasteryParameters::default();
    let mut clock = session_start();

    // Climb to band 4 with well-spaced easy reviews.
    for _ in 0..3 {
        let outcome = service
            .record_review_at("ana", "lemma:hacer", ItemKind::Lemma, Grade::Easy, clock)
            .unwrap();
        assert!(outcome.mastery.gate.can_gain_mastery);
        clock += Duration::days(2);
    }
    let record = service.store().get("ana", "lemma:hacer").unwrap().unwrap();
    assert_eq!(record.mastery.mastery, 45);
    assert_eq!(record.mastery.band(), 4);

    // Band 4 wants a full day; twelve hours is not enough.
    let last_credit = clock - Duration::days(2);
    let gated = service
        .record_review_at(
            "ana",
            "lemma:hacer",
            ItemKind::Lemma,
            Grade::Easy,
            last_credit + Duration::hours(12),
        )
        .unwrap();
    assert!(!gated.mastery.gate.can_gain_mastery);
    assert_eq!(gated.mastery.gate.required_wait_hours, params.gate_hours_by_band[4]);

    // Twenty-five hours clears it.
    let open = service
        .record_review_at(
            "ana",
            "lemma:hacer",
            ItemKind::Lemma,
            Grade::Easy,
            last_credit + Duration::hours(25),
        )
        .unwrap();
    assert!(open.mastery.gate.can_gain_mastery);
    assert_eq!(open.record.mastery.mastery, 60);
}

#[test]
fn health_fades_on_display_but_not_in_storage() {
    let harness = TestHarness::new();
    let service = &harness.service;
    let params = MasteryParameters::default();
    let t0 = session_start();

    let outcome = service
        .record_review_at("ana", "lemma:tener", ItemKind::Lemma, Grade::Medium, t0)
        .unwrap();
    let stored_health = outcome.record.mastery.health;
    assert_eq!(stored_health, 15);

    // Five days later the display value has faded; the stored value is
    // untouched until the next review writes it.
    let shown = decayed_health(
        stored_health,
        outcome.record.fsrs.last_review_at,
        t0 + Duration::days(5),
        &params,
    );
    assert_eq!(shown, 5);
    let record = service.store().get("ana", "lemma:tener").unwrap().unwrap();
    assert_eq!(record.mastery.health, 15);
}
