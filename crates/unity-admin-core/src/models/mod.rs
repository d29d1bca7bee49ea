//! Data models for the assessment platform API.
//!
//! This module contains the request and response types of the remote API:
//!
//! - `Platform`, `QuestionBank`, `Procedure`: the content hierarchy
//! - `Question`, `QuestionOption`, `ImageUpload`: question authoring
//! - `Assessment`, `AssessmentResult`: published assessments and their results
//! - `User`: console accounts
//!
//! Timestamps are kept as the strings the API sends; `parse_timestamp`
//! turns them into `chrono` values for display and sorting.

pub mod assessment;
pub mod platform;
pub mod question;
pub mod user;

use chrono::{DateTime, NaiveDateTime, Utc};

pub use assessment::{AnswerLogDetail, Assessment, AssessmentCreate, AssessmentResult, AssessmentUpdate};
pub use platform::{
    Platform, PlatformCreate, PlatformUpdate, Procedure, ProcedureCreate, ProcedureUpdate,
    QuestionBank, QuestionBankCreate,
};
pub use question::{
    ImageType, ImageUpload, OptionCreate, Question, QuestionCreate, QuestionOption, QuestionType,
};
pub use user::{User, UserCreate, UserUpdate};

/// Parse an API timestamp. The server emits both offset-qualified RFC 3339
/// values and naive ISO 8601 values; naive values are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
