pub mod model_service;
pub mod problem_service;
pub mod question_provider;
pub mod quiz_session;
pub mod quiz_session_service;
pub mod stage_sequencer;

pub use model_service::{LanguageModel, OpenAiModelService};
pub use problem_service::ProblemService;
pub use question_provider::{LlmQuestionProvider, QuestionProvider};
pub use quiz_session::QuizSession;
pub use quiz_session_service::QuizSessionService;
pub use stage_sequencer::StageSequencer;
