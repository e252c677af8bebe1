use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of questions on the test; every stored submission carries exactly this many answers.
pub const QUESTION_COUNT: usize = 100;

/// Stored sentinel for a field the respondent saw and skipped.
pub const NOT_PROVIDED_SENTINEL: &str = "not_provided";

/// Grouping label for records created before a field existed.
pub const LEGACY_LABEL: &str = "Not Provided";

/// Identifier wrapper for stored submissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Device class recorded for each submission. Closed set; unknown input is rejected at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
}

impl DeviceType {
    pub const fn ordered() -> [DeviceType; 3] {
        [Self::Mobile, Self::Tablet, Self::Desktop]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Desktop => "desktop",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mobile" => Some(Self::Mobile),
            "tablet" => Some(Self::Tablet),
            "desktop" => Some(Self::Desktop),
            _ => None,
        }
    }

    /// Classify a User-Agent header. Phones win over tablets; anything else is a desktop.
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        if ua.contains("mobile") || ua.contains("android") || ua.contains("iphone") {
            Self::Mobile
        } else if ua.contains("ipad") || ua.contains("tablet") {
            Self::Tablet
        } else {
            Self::Desktop
        }
    }
}

/// The six optional demographic questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemographicField {
    Gender,
    School,
    Year,
    Living,
    Race,
    Relationship,
}

impl DemographicField {
    pub const fn ordered() -> [DemographicField; 6] {
        [
            Self::Gender,
            Self::School,
            Self::Year,
            Self::Living,
            Self::Race,
            Self::Relationship,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::School => "school",
            Self::Year => "year",
            Self::Living => "living",
            Self::Race => "race",
            Self::Relationship => "relationship",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Gender => "Gender",
            Self::School => "School",
            Self::Year => "Year",
            Self::Living => "Living Situation",
            Self::Race => "Race/Ethnicity",
            Self::Relationship => "Relationship Status",
        }
    }
}

/// Stored value of one demographic field.
///
/// Documents keep the historical shape: a string, the `"not_provided"` sentinel, or
/// `null`/missing. Empty strings written by early clients read back as legacy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum DemographicAnswer {
    Provided(String),
    DeclinedToAnswer,
    #[default]
    LegacyUnknown,
}

impl DemographicAnswer {
    pub fn provided(value: impl Into<String>) -> Self {
        Self::Provided(value.into())
    }

    pub fn as_provided(&self) -> Option<&str> {
        match self {
            Self::Provided(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::LegacyUnknown)
    }

    pub fn is_declined(&self) -> bool {
        matches!(self, Self::DeclinedToAnswer)
    }

    /// Category key used by raw distribution rows.
    pub fn category_key(&self) -> &str {
        match self {
            Self::Provided(value) => value,
            Self::DeclinedToAnswer => NOT_PROVIDED_SENTINEL,
            Self::LegacyUnknown => LEGACY_LABEL,
        }
    }
}

impl From<Option<String>> for DemographicAnswer {
    fn from(value: Option<String>) -> Self {
        match value {
            None => Self::LegacyUnknown,
            Some(value) if value.is_empty() => Self::LegacyUnknown,
            Some(value) if value == NOT_PROVIDED_SENTINEL => Self::DeclinedToAnswer,
            Some(value) => Self::Provided(value),
        }
    }
}

impl From<DemographicAnswer> for Option<String> {
    fn from(value: DemographicAnswer) -> Self {
        match value {
            DemographicAnswer::Provided(value) => Some(value),
            DemographicAnswer::DeclinedToAnswer => Some(NOT_PROVIDED_SENTINEL.to_string()),
            DemographicAnswer::LegacyUnknown => None,
        }
    }
}

/// Demographic answers attached to a submission. Missing keys deserialize as legacy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Demographics {
    #[serde(default)]
    pub gender: DemographicAnswer,
    #[serde(default)]
    pub school: DemographicAnswer,
    #[serde(default)]
    pub year: DemographicAnswer,
    #[serde(default)]
    pub living: DemographicAnswer,
    #[serde(default)]
    pub race: DemographicAnswer,
    #[serde(default)]
    pub relationship: DemographicAnswer,
}

impl Demographics {
    pub fn get(&self, field: DemographicField) -> &DemographicAnswer {
        match field {
            DemographicField::Gender => &self.gender,
            DemographicField::School => &self.school,
            DemographicField::Year => &self.year,
            DemographicField::Living => &self.living,
            DemographicField::Race => &self.race,
            DemographicField::Relationship => &self.relationship,
        }
    }

    pub fn set(&mut self, field: DemographicField, value: DemographicAnswer) {
        let slot = match field {
            DemographicField::Gender => &mut self.gender,
            DemographicField::School => &mut self.school,
            DemographicField::Year => &mut self.year,
            DemographicField::Living => &mut self.living,
            DemographicField::Race => &mut self.race,
            DemographicField::Relationship => &mut self.relationship,
        };
        *slot = value;
    }
}

/// Exactly [`QUESTION_COUNT`] yes/no answers, in question order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<bool>", into = "Vec<bool>")]
pub struct Answers(Vec<bool>);

impl Answers {
    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    pub fn is_yes(&self, question: usize) -> bool {
        self.0.get(question).copied().unwrap_or(false)
    }

    pub fn yes_count(&self) -> usize {
        self.0.iter().filter(|answer| **answer).count()
    }
}

/// Raised when a boolean sequence has the wrong length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("answers must be exactly 100 boolean values, found {found}")]
pub struct AnswerCountError {
    pub found: usize,
}

impl TryFrom<Vec<bool>> for Answers {
    type Error = AnswerCountError;

    fn try_from(value: Vec<bool>) -> Result<Self, Self::Error> {
        if value.len() == QUESTION_COUNT {
            Ok(Self(value))
        } else {
            Err(AnswerCountError { found: value.len() })
        }
    }
}

impl From<Answers> for Vec<bool> {
    fn from(value: Answers) -> Self {
        value.0
    }
}

/// A scored submission ready to be stored. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub score: u8,
    pub answers: Answers,
    pub timestamp: DateTime<Utc>,
    pub device_type: DeviceType,
    pub referrer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_source: Option<String>,
    #[serde(default)]
    pub demographics: Demographics,
}

impl Submission {
    pub fn demographic(&self, field: DemographicField) -> &DemographicAnswer {
        self.demographics.get(field)
    }

    /// Hour bucket used by the submissions-over-time report.
    pub fn submitted_hour(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H").to_string()
    }
}

/// Submission as returned by the store, with its assigned identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    pub submission: Submission,
}

/// Identifier wrapper for stored feedback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedbackId(pub String);

impl std::fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-text comment left from a results page, tied to the submission it describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub submission_id: SubmissionId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Score of the linked submission at the time the feedback was left.
    pub score: u8,
    pub device_type: DeviceType,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_shapes_collapse_on_read() {
        let parsed: Demographics = serde_json::from_value(json!({
            "gender": null,
            "school": "",
            "year": "not_provided",
            "race": "Middle Eastern"
        }))
        .expect("demographics parse");

        assert!(parsed.gender.is_legacy());
        assert!(parsed.school.is_legacy());
        assert!(parsed.year.is_declined());
        assert!(parsed.living.is_legacy(), "absent key reads as legacy");
        assert_eq!(parsed.race.as_provided(), Some("Middle Eastern"));
        assert!(parsed.relationship.is_legacy());
    }

    #[test]
    fn declined_serializes_as_sentinel() {
        let value = serde_json::to_value(DemographicAnswer::DeclinedToAnswer).expect("serializes");
        assert_eq!(value, json!("not_provided"));
        let legacy = serde_json::to_value(DemographicAnswer::LegacyUnknown).expect("serializes");
        assert_eq!(legacy, serde_json::Value::Null);
    }

    #[test]
    fn answers_reject_wrong_length() {
        let err = Answers::try_from(vec![true; 99]).expect_err("too short");
        assert_eq!(err.found, 99);
        assert!(serde_json::from_value::<Answers>(json!([true, false])).is_err());
    }

    #[test]
    fn user_agent_classification() {
        assert_eq!(
            DeviceType::from_user_agent("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0)"),
            DeviceType::Mobile
        );
        assert_eq!(
            DeviceType::from_user_agent("Mozilla/5.0 (iPad; CPU OS 17_0)"),
            DeviceType::Tablet
        );
        assert_eq!(
            DeviceType::from_user_agent("Mozilla/5.0 (X11; Linux x86_64)"),
            DeviceType::Desktop
        );
    }
}
