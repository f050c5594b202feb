//! Callback request flow

use helpline::engine::{
    ChatState, PreferredTime, Submission, SubmissionKind, SubmitOutcome, TimeSlot, Update,
};
use helpline::validation::Field;
use std::time::Duration;

mod common;
use common::seeded_helpline;

/// A specific time needs a slot; with one the request is submitted
#[test]
fn test_specific_time_requires_slot_then_succeeds() {
    let mut helpline = seeded_helpline(1);
    assert!(helpline.set_phone("12345678"));
    helpline.set_preferred_time(Some(PreferredTime::Specific));

    match helpline.submit_callback() {
        SubmitOutcome::Rejected(errors) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(
                errors.get(Field::PreferredTime),
                Some("Vælg venligst et specifikt tidspunkt")
            );
        }
        other => panic!("expected rejection, got {:?}", other),
    }
    assert_eq!(helpline.submission(), Submission::Editing);

    helpline.set_specific_time(Some(TimeSlot::parse_str("9-12").unwrap()));
    assert_eq!(helpline.submit_callback(), SubmitOutcome::Accepted);
    assert_eq!(
        helpline.submission(),
        Submission::Submitting(SubmissionKind::Callback)
    );

    helpline.advance_by(Duration::from_secs(1));
    assert_eq!(
        helpline.submission(),
        Submission::Submitted(SubmissionKind::Callback)
    );
    assert_eq!(
        helpline.form().callback_confirmation(),
        vec!["Vi ringer dig op 9-12".to_string()]
    );
}

/// A callback request starts no queue and no chat
#[test]
fn test_callback_has_no_further_automation() {
    let mut helpline = seeded_helpline(2);
    helpline.set_phone("87 65 43 21");
    helpline.set_preferred_time(Some(PreferredTime::Tomorrow));
    helpline.submit_callback();

    let fired = helpline.run_until_idle();
    assert_eq!(fired, 1);
    assert_eq!(helpline.chat_state(), ChatState::Initial);
    assert!(helpline.queue_status().is_none());

    let updates = helpline.take_updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(
        updates[0].update,
        Update::Submitted {
            kind: SubmissionKind::Callback
        }
    );
}

/// Cancelling resets phone and time but keeps name and mood
#[test]
fn test_cancel_then_request_again() {
    let mut helpline = seeded_helpline(3);
    helpline.set_name("Noah");
    helpline.select_mood("Nervøs");
    helpline.set_phone("11223344");
    helpline.set_preferred_time(Some(PreferredTime::Asap));
    helpline.submit_callback();
    helpline.run_until_idle();

    assert_eq!(helpline.submit_callback(), SubmitOutcome::Busy);
    assert!(helpline.cancel_callback());
    assert_eq!(helpline.form().name, "Noah");
    assert_eq!(helpline.mood().unwrap().label, "Nervøs");
    assert_eq!(helpline.form().phone, "");
    assert_eq!(helpline.form().preferred_time, None);
    assert_eq!(helpline.form().specific_time, None);

    match helpline.submit_callback() {
        SubmitOutcome::Rejected(errors) => {
            assert!(errors.get(Field::Phone).is_some());
            assert!(errors.get(Field::PreferredTime).is_some());
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

/// Phone input is formatted as it is typed
#[test]
fn test_phone_typing() {
    let mut helpline = seeded_helpline(4);
    for (input, shown) in [
        ("1", "1"),
        ("12", "12"),
        ("123", "12 3"),
        ("12 34 5", "12 34 5"),
        ("12 34 56 789", "12 34 56 78"),
    ] {
        assert!(helpline.set_phone(input));
        assert_eq!(helpline.form().phone, shown);
    }
    assert!(!helpline.set_phone("+45 12 34 56 78"));
    assert_eq!(helpline.form().phone, "12 34 56 78");
    assert_eq!(helpline.errors().get(Field::Phone), None);
}
