//! Review journey: a card's full life from first exposure through
//! graduation, a lapse, and relearning - driven through the service and
//! the real store, with an explicit clock.

use chrono::Duration;

use repaso_core::{FsrsState, Grade, ItemKind};
use repaso_e2e_tests::fixtures::{TestHarness, days_later, session_start};

#[test]
fn card_lifecycle_new_to_review_to_lapse_and_back() {
    let harness = TestHarness::new();
    let service = &harness.service;
    let t0 = session_start();

    // First exposure, ordinary recall: the card enters the learning steps.
    let first = service
        .record_review_at("ana", "lemma:hablar", ItemKind::Lemma, Grade::Medium, t0)
        .unwrap();
    assert_eq!(first.record.fsrs.state, FsrsState::Learning);
    assert_eq!(first.record.fsrs.reps, 1);
    let first_due = first.record.fsrs.due_at.unwrap();
    assert!(first_due > t0 && first_due <= t0 + Duration::hours(2));

    // Second success at the due time graduates to Review.
    let graduated = service
        .record_review_at("ana", "lemma:hablar", ItemKind::Lemma, Grade::Medium, first_due)
        .unwrap();
    assert_eq!(graduated.record.fsrs.state, FsrsState::Review);
    assert_eq!(graduated.record.fsrs.reps, 2);
    let graduated_due = graduated.record.fsrs.due_at.unwrap();
    assert!(graduated_due >= first_due + Duration::days(1));

    // An easy recall days later grows stability and pushes the card
    // further out than the elapsed interval.
    let later = days_later(first_due, 3);
    let boosted = service
        .record_review_at("ana", "lemma:hablar", ItemKind::Lemma, Grade::Easy, later)
        .unwrap();
    assert!(boosted.record.fsrs.stability > graduated.record.fsrs.stability);
    assert!(boosted.record.fsrs.due_at.unwrap() > later + Duration::days(3));
    assert_eq!(boosted.record.fsrs.lapses, 0);

    // A failure lapses the card into Relearning within minutes.
    let failed_at = days_later(later, 5);
    let lapsed = service
        .record_review_at("ana", "lemma:hablar", ItemKind::Lemma, Grade::Again, failed_at)
        .unwrap();
    assert_eq!(lapsed.record.fsrs.state, FsrsState::Relearning);
    assert_eq!(lapsed.record.fsrs.lapses, 1);
    assert!(lapsed.record.fsrs.stability < boosted.record.fsrs.stability);
    assert!(lapsed.record.fsrs.due_at.unwrap() <= failed_at + Duration::minutes(10));

    // Two successes walk the relearning steps and re-graduate.
    let step1 = service
        .record_review_at(
            "ana",
            "lemma:hablar",
            ItemKind::Lemma,
            Grade::Medium,
            lapsed.record.fsrs.due_at.unwrap(),
        )
        .unwrap();
    assert_eq!(step1.record.fsrs.state, FsrsState::Relearning);

    let regraduated = service
        .record_review_at(
            "ana",
            "lemma:hablar",
            ItemKind::Lemma,
            Grade::Medium,
            step1.record.fsrs.due_at.unwrap(),
        )
        .unwrap();
    assert_eq!(regraduated.record.fsrs.state, FsrsState::Review);
    assert_eq!(regraduated.record.fsrs.reps, 6);
    assert_eq!(regraduated.record.fsrs.lapses, 1);
}

#[test]
fn progress_survives_restart() {
    let harness = TestHarness::new();
    let t0 = session_start();

    harness
        .service
        .record_review_at("ana", "lemma:comer", ItemKind::Lemma, Grade::Easy, t0)
        .unwrap();

    // Same database, fresh connections - the app came back up.
    let reopened = harness.reopen();
    let record = reopened
        .store()
        .get("ana", "lemma:comer")
        .unwrap()
        .expect("record persisted across restart");
    assert_eq!(record.fsrs.reps, 1);
    assert_eq!(record.fsrs.state, FsrsState::Review);

    // And scheduling continues from the persisted state.
    let due = record.fsrs.due_at.unwrap();
    let second = reopened
        .record_review_at("ana", "lemma:comer", ItemKind::Lemma, Grade::Easy, due)
        .unwrap();
    assert_eq!(second.record.fsrs.reps, 2);
    assert!(second.record.fsrs.stability > record.fsrs.stability);
}

#[test]
fn due_queue_feeds_the_session_most_overdue_first() {
    let harness = TestHarness::new();
    let service = &harness.service;
    let t0 = session_start();

    // Three cards reviewed on different days all come due.
    for (item, reviewed_at) in [
        ("lemma:vivir", t0),
        ("lemma:tener", days_later(t0, 1)),
        ("lemma:andar", days_later(t0, 2)),
    ] {
        service
            .record_review_at("ana", item, ItemKind::Lemma, Grade::Easy, reviewed_at)
            .unwrap();
    }

    let everything_due = days_later(t0, 40);
    let queue = service.due_queue("ana", everything_due, 50).unwrap();
    let ids: Vec<&str> = queue.iter().map(|r| r.item_id.as_str()).collect();
    assert_eq!(ids, ["lemma:vivir", "lemma:tener", "lemma:andar"]);
}
