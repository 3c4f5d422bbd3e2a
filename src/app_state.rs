use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{FilesystemProblemRepository, MongoQuestionArchive, ProblemRepository, QuestionArchive},
    services::{
        LlmQuestionProvider, OpenAiModelService, ProblemService, QuestionProvider,
        QuizSessionService, StageSequencer,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub problem_service: Arc<ProblemService>,
    pub session_service: Arc<QuizSessionService>,
    pub question_provider: Arc<dyn QuestionProvider>,
    pub archive: Option<Arc<dyn QuestionArchive>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let sequencer = config.stage_sequencer()?;

        let problems: Arc<dyn ProblemRepository> = Arc::new(FilesystemProblemRepository::new(
            &config.problems_dir,
            &config.solution_extension,
        ));

        let archive: Option<Arc<dyn QuestionArchive>> = match config.archive_conn_string() {
            Some(conn_string) => {
                let db = Database::connect(conn_string, &config.mongo_db_name).await?;
                let archive = MongoQuestionArchive::new(&db, &config.questions_collection);
                archive.ensure_indexes().await?;
                Some(Arc::new(archive))
            }
            None => {
                log::warn!("MONGO_CONN_STRING is not set; generated questions will not be archived");
                None
            }
        };

        let model = Arc::new(OpenAiModelService::new(&config));
        let provider: Arc<dyn QuestionProvider> = Arc::new(LlmQuestionProvider::new(
            model,
            Arc::clone(&problems),
            archive.clone(),
            config.solution_language.clone(),
        ));

        Ok(Self::from_parts(config, problems, provider, archive, sequencer))
    }

    /// Wires the services around already-built collaborators.
    pub fn from_parts(
        config: Config,
        problems: Arc<dyn ProblemRepository>,
        provider: Arc<dyn QuestionProvider>,
        archive: Option<Arc<dyn QuestionArchive>>,
        sequencer: StageSequencer,
    ) -> Self {
        let problem_service = Arc::new(ProblemService::new(Arc::clone(&problems), archive.clone()));
        let session_service = Arc::new(
            QuizSessionService::new(Arc::clone(&provider), problems, sequencer)
                .with_idle_ttl(config.session_idle_ttl()),
        );

        Self {
            problem_service,
            session_service,
            question_provider: provider,
            archive,
            config: Arc::new(config),
        }
    }
}
