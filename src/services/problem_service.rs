use std::sync::Arc;

use crate::{
    errors::AppResult,
    models::{
        domain::{ArchivedQuestionSet, ProblemSummary},
        dto::response::ProblemContentResponse,
    },
    repositories::{validate_problem_id, ProblemRepository, QuestionArchive},
};

pub struct ProblemService {
    repository: Arc<dyn ProblemRepository>,
    archive: Option<Arc<dyn QuestionArchive>>,
}

impl ProblemService {
    pub fn new(
        repository: Arc<dyn ProblemRepository>,
        archive: Option<Arc<dyn QuestionArchive>>,
    ) -> Self {
        Self {
            repository,
            archive,
        }
    }

    pub async fn list_problems(&self) -> AppResult<Vec<ProblemSummary>> {
        let ids = self.repository.list_problem_ids().await?;
        Ok(ids.into_iter().map(ProblemSummary::from_id).collect())
    }

    pub async fn get_problem_statement(&self, problem_id: &str) -> AppResult<ProblemContentResponse> {
        validate_problem_id(problem_id)?;
        let content = self.repository.problem_statement(problem_id).await?;

        Ok(ProblemContentResponse {
            id: problem_id.to_string(),
            content,
        })
    }

    /// Previously generated question sets, newest first. Empty when no archive is configured.
    pub async fn archived_questions(&self, problem_id: &str) -> AppResult<Vec<ArchivedQuestionSet>> {
        validate_problem_id(problem_id)?;
        match &self.archive {
            Some(archive) => archive.find_by_problem(problem_id).await,
            None => Ok(vec![]),
        }
    }
}
