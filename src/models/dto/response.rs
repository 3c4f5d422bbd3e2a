use serde::Serialize;
use uuid::Uuid;

use crate::{
    models::domain::{Question, QuizSummary},
    services::quiz_session::{CurrentQuestion, QuizSession, SessionStatus},
};

/// Question as shown before it is answered: option labels only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDto {
    pub question: String,
    pub options: Vec<String>,
    pub multi_select: bool,
}

impl From<&Question> for QuestionDto {
    fn from(question: &Question) -> Self {
        QuestionDto {
            question: question.prompt.clone(),
            options: question.option_labels(),
            multi_select: question.multi_select,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageProgressDto {
    pub index: usize,
    pub name: String,
    pub question_number: usize,
    pub question_count: usize,
    pub total_stages: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub problem_id: String,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<StageProgressDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionDto>,
    pub pending_answer: Option<bool>,
    pub correct_count: usize,
    pub incorrect_count: usize,
    pub total_questions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<QuizSummary>,
}

impl SessionSnapshot {
    pub fn from_session(session_id: Uuid, session: &QuizSession) -> Self {
        let sequencer = session.sequencer();
        let (stage_index, question_index) = session.position();

        let stage = (!session.is_completed()).then(|| {
            let stage = sequencer.stage_at(stage_index);
            StageProgressDto {
                index: stage_index,
                name: stage.name.clone(),
                question_number: question_index + 1,
                question_count: stage.required_count,
                total_stages: sequencer.total_stages(),
            }
        });

        let question = match session.current_question() {
            CurrentQuestion::Ready(question) => Some(QuestionDto::from(question)),
            _ => None,
        };

        SessionSnapshot {
            session_id,
            problem_id: session.problem_id().to_string(),
            status: session.status(),
            failure_reason: session.failure_reason().map(str::to_string),
            stage,
            question,
            pending_answer: session.pending_answer(),
            correct_count: session.correct_count(),
            incorrect_count: session.incorrect_count(),
            total_questions: sequencer.total_questions(),
            summary: session.summary(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub session: SessionSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProblemContentResponse {
    pub id: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        services::stage_sequencer::StageSequencer,
        test_utils::fixtures::{questions_for, sample_question},
    };

    #[test]
    fn question_dto_hides_correctness() {
        let dto = QuestionDto::from(&sample_question(1));
        let json = serde_json::to_value(&dto).unwrap();

        assert_eq!(json["options"][0], "O(n)");
        assert!(!json.to_string().contains("isCorrect"));
        assert_eq!(json["multiSelect"], false);
    }

    #[test]
    fn loading_snapshot_has_stage_but_no_question() {
        let session = QuizSession::new(Arc::new(StageSequencer::default()), "two-sum");
        let snapshot = SessionSnapshot::from_session(Uuid::new_v4(), &session);

        assert_eq!(snapshot.status, SessionStatus::Loading);
        assert!(snapshot.question.is_none());
        assert_eq!(snapshot.stage.as_ref().unwrap().name, "Understand");
        assert_eq!(snapshot.total_questions, 9);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["status"], "loading");
        assert_eq!(json["problemId"], "two-sum");
    }

    #[test]
    fn ready_snapshot_reports_question_number() {
        let mut session = QuizSession::new(Arc::new(StageSequencer::default()), "two-sum");
        let ticket = session.ensure_current_stage_loaded().unwrap();
        session.complete_fetch(ticket, Ok(questions_for(2, 0)));
        session.advance();

        let snapshot = SessionSnapshot::from_session(Uuid::new_v4(), &session);
        let stage = snapshot.stage.unwrap();

        assert_eq!(snapshot.status, SessionStatus::Ready);
        assert_eq!(stage.question_number, 2);
        assert_eq!(stage.question_count, 2);
        assert_eq!(snapshot.question.unwrap(), QuestionDto::from(&sample_question(1)));
    }
}
