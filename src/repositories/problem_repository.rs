use std::path::PathBuf;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{AppError, AppResult};

static PROBLEM_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("PROBLEM_ID_REGEX is a valid regex pattern")
});

const STATEMENT_FILE: &str = "README.md";

/// Source of problem statements and reference solutions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProblemRepository: Send + Sync {
    async fn list_problem_ids(&self) -> AppResult<Vec<String>>;
    async fn problem_statement(&self, problem_id: &str) -> AppResult<String>;
    async fn reference_solution(&self, problem_id: &str) -> AppResult<String>;
    async fn exists(&self, problem_id: &str) -> AppResult<bool>;
}

pub fn validate_problem_id(problem_id: &str) -> AppResult<()> {
    if PROBLEM_ID_REGEX.is_match(problem_id) {
        Ok(())
    } else {
        Err(AppError::ValidationError(format!(
            "Invalid problem id '{}'",
            problem_id
        )))
    }
}

/// Reads problems from a directory tree laid out as
/// `<root>/<id>/README.md` and `<root>/<id>/<id>.<extension>`.
pub struct FilesystemProblemRepository {
    root: PathBuf,
    solution_extension: String,
}

impl FilesystemProblemRepository {
    pub fn new(root: impl Into<PathBuf>, solution_extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            solution_extension: solution_extension.into(),
        }
    }

    fn problem_dir(&self, problem_id: &str) -> AppResult<PathBuf> {
        validate_problem_id(problem_id)?;
        Ok(self.root.join(problem_id))
    }

    async fn read_problem_file(&self, problem_id: &str, file_name: &str) -> AppResult<String> {
        let path = self.problem_dir(problem_id)?.join(file_name);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound(
                format!("Problem '{}' has no {}", problem_id, file_name),
            )),
            Err(err) => {
                log::error!("Failed to read {}: {}", path.display(), err);
                Err(err.into())
            }
        }
    }
}

#[async_trait]
impl ProblemRepository for FilesystemProblemRepository {
    async fn list_problem_ids(&self) -> AppResult<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(|err| {
            AppError::InternalError(format!(
                "Failed to read problems directory {}: {}",
                self.root.display(),
                err
            ))
        })?;

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if PROBLEM_ID_REGEX.is_match(name) {
                    ids.push(name.to_string());
                }
            }
        }
        ids.sort();

        Ok(ids)
    }

    async fn problem_statement(&self, problem_id: &str) -> AppResult<String> {
        self.read_problem_file(problem_id, STATEMENT_FILE).await
    }

    async fn reference_solution(&self, problem_id: &str) -> AppResult<String> {
        let file_name = format!("{}.{}", problem_id, self.solution_extension);
        self.read_problem_file(problem_id, &file_name).await
    }

    async fn exists(&self, problem_id: &str) -> AppResult<bool> {
        let path = self.problem_dir(problem_id)?.join(STATEMENT_FILE);
        Ok(tokio::fs::try_exists(path).await?)
    }
}
