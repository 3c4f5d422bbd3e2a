pub mod problem_repository;
pub mod question_archive_repository;

pub use problem_repository::{validate_problem_id, FilesystemProblemRepository, ProblemRepository};
pub use question_archive_repository::{MongoQuestionArchive, QuestionArchive};
