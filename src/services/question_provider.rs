use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::{
    constants::prompts::{render_question_prompt, PromptContext, QUESTION_GENERATOR_SYSTEM_PROMPT},
    errors::{AppError, AppResult},
    models::domain::{ArchivedQuestionSet, Question},
    repositories::{ProblemRepository, QuestionArchive},
    services::model_service::LanguageModel,
};

static CODE_FENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*\s*(.*?)\s*```\s*$")
        .expect("CODE_FENCE_REGEX is a valid regex pattern")
});

/// Produces the questions for one stage of one problem.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    async fn generate_questions(
        &self,
        problem_id: &str,
        stage: &str,
        count: usize,
    ) -> AppResult<Vec<Question>>;
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GeneratedQuestions {
    questions: Vec<Question>,
}

/// Extracts the question list from a model reply. Accepts `{"questions": [...]}`
/// or a bare array, optionally wrapped in a Markdown code fence.
pub fn parse_generated_questions(raw: &str) -> AppResult<Vec<Question>> {
    let body = CODE_FENCE_REGEX
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw)
        .trim();

    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        AppError::UpstreamError(format!("Language model returned invalid JSON: {}", e))
    })?;

    let questions = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut map) => map.remove("questions").ok_or_else(|| {
            AppError::UpstreamError("Language model reply has no 'questions' field".to_string())
        })?,
        _ => {
            return Err(AppError::UpstreamError(
                "Language model reply is neither an object nor an array".to_string(),
            ))
        }
    };

    serde_json::from_value(questions).map_err(|e| {
        AppError::UpstreamError(format!("Language model questions are malformed: {}", e))
    })
}

/// Generates questions by prompting a language model with the problem
/// statement and reference solution, then archives what it accepted.
pub struct LlmQuestionProvider {
    model: Arc<dyn LanguageModel>,
    problems: Arc<dyn ProblemRepository>,
    archive: Option<Arc<dyn QuestionArchive>>,
    solution_language: String,
}

impl LlmQuestionProvider {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        problems: Arc<dyn ProblemRepository>,
        archive: Option<Arc<dyn QuestionArchive>>,
        solution_language: impl Into<String>,
    ) -> Self {
        Self {
            model,
            problems,
            archive,
            solution_language: solution_language.into(),
        }
    }

    async fn archive_questions(&self, problem_id: &str, stage: &str, questions: &[Question]) {
        let Some(archive) = &self.archive else {
            return;
        };

        let set = ArchivedQuestionSet::new(problem_id, stage, questions.to_vec());
        if let Err(e) = archive.save(set).await {
            log::warn!(
                "Failed to archive {} questions for problem '{}': {}",
                stage,
                problem_id,
                e
            );
        }
    }
}

#[async_trait]
impl QuestionProvider for LlmQuestionProvider {
    async fn generate_questions(
        &self,
        problem_id: &str,
        stage: &str,
        count: usize,
    ) -> AppResult<Vec<Question>> {
        log::info!(
            "Generating {} questions for stage '{}' of problem '{}'",
            count,
            stage,
            problem_id
        );

        let problem_statement = self.problems.problem_statement(problem_id).await?;
        let solution_content = self.problems.reference_solution(problem_id).await?;

        let prompt = render_question_prompt(&PromptContext {
            stage,
            count,
            language: &self.solution_language,
            problem_statement: &problem_statement,
            solution_content: &solution_content,
        });

        let schema = serde_json::to_value(schemars::schema_for!(GeneratedQuestions))
            .map_err(|e| AppError::InternalError(format!("Failed to build question schema: {}", e)))?;

        let reply = self
            .model
            .complete_json(QUESTION_GENERATOR_SYSTEM_PROMPT, &prompt, "stage_questions", schema)
            .await?;

        let questions = parse_generated_questions(&reply)?;
        if questions.len() != count {
            log::warn!(
                "Model returned {} questions for stage '{}' of '{}', expected {}",
                questions.len(),
                stage,
                problem_id,
                count
            );
            return Err(AppError::UpstreamError(format!(
                "Expected {} questions, received {}",
                count,
                questions.len()
            )));
        }

        self.archive_questions(problem_id, stage, &questions).await;

        Ok(questions)
    }
}
