use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::Question;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProblemSummary {
    pub id: String,
    pub label: String,
}

impl ProblemSummary {
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        let label = id.replace('-', " ");
        Self { id, label }
    }
}

/// A generated stage question set as persisted by the question archive.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedQuestionSet {
    pub id: String,
    pub problem_id: String,
    pub stage: String,
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
}

impl ArchivedQuestionSet {
    pub fn new(problem_id: &str, stage: &str, questions: Vec<Question>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            problem_id: problem_id.to_string(),
            stage: stage.to_string(),
            questions,
            created_at: Utc::now(),
        }
    }
}
