use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use super::domain::{
    Answers, DemographicAnswer, DemographicField, Demographics, DeviceType, Submission,
    NOT_PROVIDED_SENTINEL, QUESTION_COUNT,
};
use super::intake::sanitize_referrer;
use super::normalizer::normalize_demographic;
use super::scoring::score;

const SHARE_SOURCE_LIMIT: usize = 100;

/// Errors raised while reading a submissions export.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read submissions export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid submissions CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid submission on line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
}

/// Loads scored submissions from a CSV export.
///
/// Empty demographic cells are records that predate the question and import as legacy.
pub struct SubmissionImporter;

impl SubmissionImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Submission>, ImportError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening submissions export");
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Submission>, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();

        let mut submissions = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let line = record.position().map_or(0, |position| position.line());
            let row: ImportRow = record.deserialize(Some(&headers))?;
            let submission =
                row.into_submission()
                    .map_err(|reason| ImportError::InvalidRow { line, reason })?;
            submissions.push(submission);
        }

        info!(count = submissions.len(), "imported submissions export");
        Ok(submissions)
    }
}

#[derive(Debug, Deserialize)]
struct ImportRow {
    timestamp: String,
    #[serde(default)]
    device_type: String,
    #[serde(default)]
    referrer: String,
    #[serde(default)]
    share_source: String,
    #[serde(default)]
    gender: String,
    #[serde(default)]
    school: String,
    #[serde(default)]
    year: String,
    #[serde(default)]
    living: String,
    #[serde(default)]
    race: String,
    #[serde(default)]
    relationship: String,
    answers: String,
}

impl ImportRow {
    fn cell(&self, field: DemographicField) -> &str {
        match field {
            DemographicField::Gender => &self.gender,
            DemographicField::School => &self.school,
            DemographicField::Year => &self.year,
            DemographicField::Living => &self.living,
            DemographicField::Race => &self.race,
            DemographicField::Relationship => &self.relationship,
        }
    }

    fn into_submission(self) -> Result<Submission, String> {
        let timestamp = parse_timestamp(&self.timestamp)
            .ok_or_else(|| format!("unrecognized timestamp '{}'", self.timestamp))?;
        let answers = parse_answer_string(&self.answers)?;

        let device_type = if self.device_type.is_empty() {
            DeviceType::Desktop
        } else {
            DeviceType::parse(&self.device_type)
                .ok_or_else(|| format!("unknown device type '{}'", self.device_type))?
        };

        let mut demographics = Demographics::default();
        for field in DemographicField::ordered() {
            demographics.set(field, import_demographic(field, self.cell(field)));
        }

        let share_source = (!self.share_source.is_empty())
            .then(|| self.share_source.chars().take(SHARE_SOURCE_LIMIT).collect());

        Ok(Submission {
            score: score(&answers),
            answers,
            timestamp,
            device_type,
            referrer: sanitize_referrer(Some(&self.referrer)),
            share_source,
            demographics,
        })
    }
}

fn import_demographic(field: DemographicField, cell: &str) -> DemographicAnswer {
    match cell {
        "" => DemographicAnswer::LegacyUnknown,
        NOT_PROVIDED_SENTINEL => DemographicAnswer::DeclinedToAnswer,
        value => normalize_demographic(field, Some(value)),
    }
}

fn parse_answer_string(raw: &str) -> Result<Answers, String> {
    let answers = raw
        .chars()
        .enumerate()
        .map(|(index, answer)| match answer.to_ascii_lowercase() {
            '1' | 'y' => Ok(true),
            '0' | 'n' => Ok(false),
            other => Err(format!("answer {index} is '{other}', expected 1/0 or y/n")),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Answers::try_from(answers).map_err(|err| {
        format!(
            "answers must have {QUESTION_COUNT} entries, found {}",
            err.found
        )
    })
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
