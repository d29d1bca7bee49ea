use serde::{Deserialize, Serialize};

use super::parse_timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: i64,
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub question_bank_id: i64,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Assessment {
    /// Whether `now` falls inside the assessment window.
    pub fn is_open_at(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        match (parse_timestamp(&self.start_time), parse_timestamp(&self.end_time)) {
            (Some(start), Some(end)) => start <= now && now <= end,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentCreate {
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub question_bank_id: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AssessmentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_bank_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerLogDetail {
    pub question_id: i64,
    pub score_awarded: i64,
    pub answered_at: String,
}

/// One examinee's session in an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub id: i64,
    pub total_score: i64,
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    pub examinee_identifier: String,
    #[serde(default)]
    pub answer_logs: Vec<AnswerLogDetail>,
}

impl AssessmentResult {
    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }

    /// Session length in whole minutes, when finished.
    pub fn duration_minutes(&self) -> Option<i64> {
        let start = parse_timestamp(&self.start_time)?;
        let end = parse_timestamp(self.end_time.as_deref()?)?;
        Some((end - start).num_minutes())
    }
}
