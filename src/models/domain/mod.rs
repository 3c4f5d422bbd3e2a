pub mod problem;
pub mod question;
pub mod stage;
pub mod summary;
pub use problem::{ArchivedQuestionSet, ProblemSummary};
pub use question::{Question, QuestionOption, Selection};
pub use stage::Stage;
pub use summary::{PerformanceBand, QuizSummary};
