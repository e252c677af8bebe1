use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{
    Answers, DemographicField, Demographics, DeviceType, Submission, SubmissionId,
    QUESTION_COUNT,
};
use super::normalizer::normalize_demographic;
use super::scoring::score;

const DEFAULT_SHARE_SOURCE_LIMIT: usize = 100;
const DIRECT_REFERRER: &str = "direct";

/// Validation errors raised at the ingestion boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("missing or invalid answers")]
    MissingAnswers,
    #[error("answers must be exactly {QUESTION_COUNT} boolean values, found {found}", QUESTION_COUNT = QUESTION_COUNT)]
    WrongAnswerCount { found: usize },
    #[error("answers must be exactly {QUESTION_COUNT} boolean values, answer {index} is not a boolean", QUESTION_COUNT = QUESTION_COUNT)]
    NonBooleanAnswer { index: usize },
    #[error("unknown device type '{0}' (expected mobile, tablet, or desktop)")]
    UnknownDeviceType(String),
    #[error("feedback is required")]
    MissingFeedback,
    #[error("submission id is required")]
    MissingSubmissionId,
}

/// Raw client payload. Everything is optional so the guard can report precise errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    #[serde(default)]
    pub answers: Option<Value>,
    #[serde(default, alias = "deviceType")]
    pub device_type: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default, alias = "shareSource")]
    pub share_source: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub living: Option<String>,
    #[serde(default)]
    pub race: Option<String>,
    #[serde(default)]
    pub relationship: Option<String>,
}

impl SubmissionPayload {
    fn demographic(&self, field: DemographicField) -> Option<&str> {
        let value = match field {
            DemographicField::Gender => &self.gender,
            DemographicField::School => &self.school,
            DemographicField::Year => &self.year,
            DemographicField::Living => &self.living,
            DemographicField::Race => &self.race,
            DemographicField::Relationship => &self.relationship,
        };
        value.as_deref()
    }
}

/// Raw feedback payload from a results page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackPayload {
    #[serde(default, alias = "resultId")]
    pub submission_id: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Feedback that passed validation but is not yet linked to a stored submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackDraft {
    pub submission_id: SubmissionId,
    pub text: String,
    pub email: Option<String>,
}

/// Request metadata captured by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl RequestContext {
    pub fn now() -> Self {
        Self {
            user_agent: None,
            referer: None,
            received_at: Utc::now(),
        }
    }
}

/// Guard responsible for turning raw payloads into scored [`Submission`]s.
#[derive(Debug, Clone)]
pub struct IntakeGuard {
    share_source_limit: usize,
}

impl Default for IntakeGuard {
    fn default() -> Self {
        Self::with_share_source_limit(DEFAULT_SHARE_SOURCE_LIMIT)
    }
}

impl IntakeGuard {
    pub fn with_share_source_limit(share_source_limit: usize) -> Self {
        Self { share_source_limit }
    }

    /// Validate, score, and normalize a payload. Nothing is scored unless every check passes.
    pub fn submission_from_payload(
        &self,
        payload: SubmissionPayload,
        context: &RequestContext,
    ) -> Result<Submission, IntakeViolation> {
        let answers = parse_answers(payload.answers.as_ref())?;

        let device_type = match payload.device_type.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => DeviceType::parse(raw)
                .ok_or_else(|| IntakeViolation::UnknownDeviceType(raw.to_string()))?,
            _ => DeviceType::from_user_agent(context.user_agent.as_deref().unwrap_or_default()),
        };

        let referrer = sanitize_referrer(context.referer.as_deref().or(payload.referrer.as_deref()));
        let share_source = self.share_source(payload.share_source.as_deref());

        let mut demographics = Demographics::default();
        for field in DemographicField::ordered() {
            demographics.set(field, normalize_demographic(field, payload.demographic(field)));
        }

        Ok(Submission {
            score: score(&answers),
            answers,
            timestamp: context.received_at,
            device_type,
            referrer,
            share_source,
            demographics,
        })
    }

    /// Check the feedback text first, then the submission reference. Blank email is dropped.
    pub fn feedback_from_payload(
        &self,
        payload: FeedbackPayload,
    ) -> Result<FeedbackDraft, IntakeViolation> {
        let text =
            non_blank(payload.feedback.as_deref()).ok_or(IntakeViolation::MissingFeedback)?;
        let submission_id = non_blank(payload.submission_id.as_deref())
            .ok_or(IntakeViolation::MissingSubmissionId)?;

        Ok(FeedbackDraft {
            submission_id: SubmissionId(submission_id),
            text,
            email: non_blank(payload.email.as_deref()),
        })
    }

    fn share_source(&self, raw: Option<&str>) -> Option<String> {
        let trimmed = raw?.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(trimmed.chars().take(self.share_source_limit).collect())
    }
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Check that `value` is an array of exactly [`QUESTION_COUNT`] JSON booleans.
pub fn parse_answers(value: Option<&Value>) -> Result<Answers, IntakeViolation> {
    let items = value
        .and_then(Value::as_array)
        .ok_or(IntakeViolation::MissingAnswers)?;

    if items.len() != QUESTION_COUNT {
        return Err(IntakeViolation::WrongAnswerCount { found: items.len() });
    }

    let answers = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_bool()
                .ok_or(IntakeViolation::NonBooleanAnswer { index })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Answers::try_from(answers).map_err(|err| IntakeViolation::WrongAnswerCount { found: err.found })
}

/// Keep absolute http(s) referrers with markup characters removed; everything else is direct traffic.
pub fn sanitize_referrer(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim) else {
        return DIRECT_REFERRER.to_string();
    };

    let lowered = raw.to_ascii_lowercase();
    let has_host = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .is_some_and(|rest| !rest.is_empty() && !rest.starts_with('/'));

    if has_host {
        raw.replace(['<', '>'], "")
    } else {
        DIRECT_REFERRER.to_string()
    }
}
