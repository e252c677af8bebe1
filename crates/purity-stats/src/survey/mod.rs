//! Submission intake, scoring, and storage contracts for the purity survey.

pub mod domain;
pub mod importer;
pub(crate) mod intake;
pub mod normalizer;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
pub(crate) mod tests;

pub use domain::{
    Answers, DemographicAnswer, DemographicField, Demographics, DeviceType, Feedback, FeedbackId,
    Submission, SubmissionId, SubmissionRecord, LEGACY_LABEL, NOT_PROVIDED_SENTINEL,
    QUESTION_COUNT,
};
pub use importer::{ImportError, SubmissionImporter};
pub use intake::{
    parse_answers, sanitize_referrer, FeedbackDraft, FeedbackPayload, IntakeGuard,
    IntakeViolation, RequestContext, SubmissionPayload,
};
pub use normalizer::normalize_demographic;
pub use repository::{CountDimension, ScoreGroup, StoreError, SubmissionFilter, SubmissionStore};
pub use router::survey_router;
pub use scoring::score;
pub use service::{FeedbackReceipt, SubmissionReceipt, SurveyService, SurveyServiceError};
