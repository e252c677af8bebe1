use serde_json::json;

use super::common::*;
use crate::survey::domain::{DemographicAnswer, DeviceType};
use crate::survey::intake::{IntakeGuard, IntakeViolation, SubmissionPayload};

#[test]
fn rejects_missing_answers() {
    let guard = IntakeGuard::default();
    let err = guard
        .submission_from_payload(SubmissionPayload::default(), &context())
        .expect_err("answers required");
    assert_eq!(err, IntakeViolation::MissingAnswers);
    assert_eq!(err.to_string(), "missing or invalid answers");
}

#[test]
fn rejects_ninety_nine_answers_with_descriptive_error() {
    let mut payload = payload(0);
    payload.answers = Some(json!(vec![false; 99]));

    let err = IntakeGuard::default()
        .submission_from_payload(payload, &context())
        .expect_err("short answers");
    assert_eq!(err, IntakeViolation::WrongAnswerCount { found: 99 });
    assert!(err.to_string().contains("exactly 100"));
    assert!(err.to_string().contains("found 99"));
}

#[test]
fn rejects_non_boolean_elements() {
    let mut answers = vec![json!(false); 100];
    answers[42] = json!("yes");
    let mut payload = payload(0);
    payload.answers = Some(json!(answers));

    let err = IntakeGuard::default()
        .submission_from_payload(payload, &context())
        .expect_err("string answer");
    assert_eq!(err, IntakeViolation::NonBooleanAnswer { index: 42 });
}

#[test]
fn rejects_unknown_device_type() {
    let mut payload = payload(0);
    payload.device_type = Some("smartwatch".to_string());

    let err = IntakeGuard::default()
        .submission_from_payload(payload, &context())
        .expect_err("closed enum");
    assert_eq!(err, IntakeViolation::UnknownDeviceType("smartwatch".to_string()));
}

#[test]
fn derives_device_type_from_user_agent() {
    let mut ctx = context();
    ctx.user_agent = Some("Mozilla/5.0 (Linux; Android 14; Pixel 8)".to_string());

    let submission = IntakeGuard::default()
        .submission_from_payload(payload(10), &ctx)
        .expect("valid payload");
    assert_eq!(submission.device_type, DeviceType::Mobile);
    assert_eq!(submission.score, 90);
}

#[test]
fn normalizes_demographics_and_marks_skips() {
    let mut payload = payload(25);
    payload.gender = Some("Woman".to_string());
    payload.school = Some("".to_string());
    payload.year = Some("not_provided".to_string());
    payload.race = Some("Martian".to_string());

    let submission = IntakeGuard::default()
        .submission_from_payload(payload, &context())
        .expect("valid payload");

    assert_eq!(submission.demographics.gender, DemographicAnswer::provided("female"));
    assert!(submission.demographics.school.is_declined());
    assert!(submission.demographics.year.is_declined());
    assert!(
        submission.demographics.living.is_declined(),
        "new submissions never produce legacy values"
    );
    assert_eq!(submission.demographics.race, DemographicAnswer::provided("Martian"));
}

#[test]
fn header_referrer_wins_over_payload() {
    let mut ctx = context();
    ctx.referer = Some("https://news.example.org/story".to_string());
    let mut payload = payload(0);
    payload.referrer = Some("https://ignored.example".to_string());
    payload.share_source = Some("x".repeat(150));

    let submission = IntakeGuard::default()
        .submission_from_payload(payload, &ctx)
        .expect("valid payload");
    assert_eq!(submission.referrer, "https://news.example.org/story");
    assert_eq!(submission.share_source.map(|source| source.len()), Some(100));
}

#[test]
fn accepts_camel_case_payload_keys() {
    let payload: SubmissionPayload = serde_json::from_value(json!({
        "answers": answers_json(0),
        "deviceType": "tablet",
        "shareSource": "instagram",
    }))
    .expect("payload parses");

    let submission = IntakeGuard::default()
        .submission_from_payload(payload, &context())
        .expect("valid payload");
    assert_eq!(submission.device_type, DeviceType::Tablet);
    assert_eq!(submission.share_source.as_deref(), Some("instagram"));
}
