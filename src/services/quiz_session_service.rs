use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{
    sync::{Mutex, RwLock},
    time::Instant,
};
use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{QuizSummary, Selection},
        dto::response::{AnswerResponse, SessionSnapshot},
    },
    repositories::{validate_problem_id, ProblemRepository},
    services::{
        question_provider::QuestionProvider,
        quiz_session::{AdvanceOutcome, CurrentQuestion, FetchOutcome, FetchTicket, QuizSession},
        stage_sequencer::StageSequencer,
    },
};

type SharedSession = Arc<Mutex<QuizSession>>;

pub const DEFAULT_SESSION_IDLE_TTL: Duration = Duration::from_secs(60 * 60);

struct SessionEntry {
    session: SharedSession,
    last_touched: Instant,
}

/// Owns the live quiz sessions and runs their question fetches on the runtime.
///
/// A session lock is never held across a provider call: the fetch task only
/// takes it to hand the finished result to [`QuizSession::complete_fetch`].
/// Sessions untouched for longer than the idle TTL are evicted whenever a new
/// one is created.
pub struct QuizSessionService {
    provider: Arc<dyn QuestionProvider>,
    problems: Arc<dyn ProblemRepository>,
    sequencer: Arc<StageSequencer>,
    idle_ttl: Duration,
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl QuizSessionService {
    pub fn new(
        provider: Arc<dyn QuestionProvider>,
        problems: Arc<dyn ProblemRepository>,
        sequencer: StageSequencer,
    ) -> Self {
        Self {
            provider,
            problems,
            sequencer: Arc::new(sequencer),
            idle_ttl: DEFAULT_SESSION_IDLE_TTL,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    pub async fn create_session(&self, problem_id: &str) -> AppResult<SessionSnapshot> {
        self.ensure_problem_exists(problem_id).await?;

        let session_id = Uuid::new_v4();
        let mut session = QuizSession::new(Arc::clone(&self.sequencer), problem_id);
        let ticket = session.ensure_current_stage_loaded();
        let snapshot = SessionSnapshot::from_session(session_id, &session);

        let shared = Arc::new(Mutex::new(session));
        {
            let mut sessions = self.sessions.write().await;
            evict_idle(&mut sessions, self.idle_ttl);
            sessions.insert(
                session_id,
                SessionEntry {
                    session: Arc::clone(&shared),
                    last_touched: Instant::now(),
                },
            );
        }
        log::info!("Created quiz session {} for problem '{}'", session_id, problem_id);

        if let Some(ticket) = ticket {
            self.dispatch(session_id, shared, ticket);
        }
        Ok(snapshot)
    }

    pub async fn get_session(&self, session_id: &Uuid) -> AppResult<SessionSnapshot> {
        let shared = self.find(session_id).await?;
        let session = shared.lock().await;
        Ok(SessionSnapshot::from_session(*session_id, &session))
    }

    /// Switches the session to another problem, dropping all progress.
    /// Selecting the problem the session already runs changes nothing.
    pub async fn reset_session(
        &self,
        session_id: &Uuid,
        problem_id: &str,
    ) -> AppResult<SessionSnapshot> {
        self.ensure_problem_exists(problem_id).await?;
        let shared = self.find(session_id).await?;

        let mut session = shared.lock().await;
        if session.problem_id() == problem_id {
            log::debug!("Session {} already runs problem '{}'", session_id, problem_id);
            return Ok(SessionSnapshot::from_session(*session_id, &session));
        }
        session.reset(problem_id);
        log::info!("Reset quiz session {} to problem '{}'", session_id, problem_id);

        if let Some(ticket) = session.ensure_current_stage_loaded() {
            self.dispatch(*session_id, Arc::clone(&shared), ticket);
        }
        Ok(SessionSnapshot::from_session(*session_id, &session))
    }

    pub async fn submit_answer(
        &self,
        session_id: &Uuid,
        selected: &[usize],
    ) -> AppResult<AnswerResponse> {
        let shared = self.find(session_id).await?;
        let mut session = shared.lock().await;

        let selection = Selection::from_indices(selected).ok_or_else(|| {
            AppError::ValidationError("Select at least one option".to_string())
        })?;

        let explanation = match session.current_question() {
            CurrentQuestion::Ready(question) => {
                if let Some(index) = question.out_of_range_index(&selection) {
                    return Err(AppError::ValidationError(format!(
                        "Option {} does not exist; the question has {} options",
                        index,
                        question.options.len()
                    )));
                }
                question.explanation.clone()
            }
            CurrentQuestion::Loading => {
                return Err(AppError::Conflict(
                    "Questions for the current stage are still loading".to_string(),
                ))
            }
            CurrentQuestion::Failed(_) => {
                return Err(AppError::Conflict(
                    "Questions for the current stage failed to load".to_string(),
                ))
            }
            CurrentQuestion::Completed => {
                return Err(AppError::Conflict("The quiz is already completed".to_string()))
            }
        };

        let correct = session.submit_answer(&selection).ok_or_else(|| {
            AppError::Conflict("No question is ready to answer".to_string())
        })?;

        Ok(AnswerResponse {
            correct,
            explanation,
            session: SessionSnapshot::from_session(*session_id, &session),
        })
    }

    /// Moves to the next question. While the active stage is loading or has
    /// failed this leaves the session untouched.
    pub async fn advance(&self, session_id: &Uuid) -> AppResult<SessionSnapshot> {
        let shared = self.find(session_id).await?;
        let mut session = shared.lock().await;

        match session.advance() {
            AdvanceOutcome::NextStage(Some(ticket)) => {
                self.dispatch(*session_id, Arc::clone(&shared), ticket);
            }
            AdvanceOutcome::NotReady => {
                log::debug!("Session {} cannot advance while its stage is not loaded", session_id);
            }
            AdvanceOutcome::Completed => {
                log::info!("Quiz session {} completed", session_id);
            }
            AdvanceOutcome::NextQuestion
            | AdvanceOutcome::NextStage(None)
            | AdvanceOutcome::AlreadyCompleted => {}
        }

        Ok(SessionSnapshot::from_session(*session_id, &session))
    }

    /// Re-requests the current stage after a failed fetch.
    pub async fn retry(&self, session_id: &Uuid) -> AppResult<SessionSnapshot> {
        let shared = self.find(session_id).await?;
        let mut session = shared.lock().await;

        if session.has_failed() {
            if let Some(ticket) = session.ensure_current_stage_loaded() {
                log::info!(
                    "Retrying stage '{}' for session {}",
                    ticket.stage_name,
                    session_id
                );
                self.dispatch(*session_id, Arc::clone(&shared), ticket);
            }
        }

        Ok(SessionSnapshot::from_session(*session_id, &session))
    }

    pub async fn summary(&self, session_id: &Uuid) -> AppResult<QuizSummary> {
        let shared = self.find(session_id).await?;
        let session = shared.lock().await;

        session
            .summary()
            .ok_or_else(|| AppError::Conflict("The quiz is not completed yet".to_string()))
    }

    pub async fn delete_session(&self, session_id: &Uuid) -> AppResult<()> {
        self.sessions
            .write()
            .await
            .remove(session_id)
            .map(|_| log::info!("Discarded quiz session {}", session_id))
            .ok_or_else(|| session_not_found(session_id))
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub fn sequencer(&self) -> &StageSequencer {
        &self.sequencer
    }

    /// Looks a session up and marks it as recently used.
    async fn find(&self, session_id: &Uuid) -> AppResult<SharedSession> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(session_id)
            .ok_or_else(|| session_not_found(session_id))?;
        entry.last_touched = Instant::now();
        Ok(Arc::clone(&entry.session))
    }

    async fn ensure_problem_exists(&self, problem_id: &str) -> AppResult<()> {
        validate_problem_id(problem_id)?;
        if self.problems.exists(problem_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "Problem '{}' not found",
                problem_id
            )))
        }
    }

    fn dispatch(&self, session_id: Uuid, session: SharedSession, ticket: FetchTicket) {
        let provider = Arc::clone(&self.provider);

        log::info!(
            "Fetching {} questions for stage '{}' of '{}' (session {})",
            ticket.required_count,
            ticket.stage_name,
            ticket.problem_id,
            session_id
        );

        tokio::spawn(async move {
            let result = provider
                .generate_questions(&ticket.problem_id, &ticket.stage_name, ticket.required_count)
                .await;

            let stage_name = ticket.stage_name.clone();
            let outcome = session.lock().await.complete_fetch(ticket, result);

            match outcome {
                FetchOutcome::Stored => {
                    log::info!("Stored stage '{}' questions for session {}", stage_name, session_id)
                }
                FetchOutcome::Rejected(reason) => log::warn!(
                    "Stage '{}' failed to load for session {}: {}",
                    stage_name,
                    session_id,
                    reason
                ),
                FetchOutcome::Stale => log::info!(
                    "Discarded stale stage '{}' result for session {}",
                    stage_name,
                    session_id
                ),
            }
        });
    }
}

fn evict_idle(sessions: &mut HashMap<Uuid, SessionEntry>, idle_ttl: Duration) {
    let before = sessions.len();
    sessions.retain(|_, entry| entry.last_touched.elapsed() < idle_ttl);

    let evicted = before - sessions.len();
    if evicted > 0 {
        log::info!("Evicted {} quiz sessions idle for over {:?}", evicted, idle_ttl);
    }
}

fn session_not_found(session_id: &Uuid) -> AppError {
    AppError::NotFound(format!("Quiz session '{}' not found", session_id))
}
