//! Staged quiz progression.
//!
//! `QuizSession` performs no I/O. Whenever a stage's questions are needed it
//! hands back a [`FetchTicket`]; the owner runs the provider call and feeds the
//! result into [`QuizSession::complete_fetch`], which drops results that belong
//! to an earlier problem.

use std::sync::Arc;

use serde::Serialize;

use crate::{
    errors::AppResult,
    models::domain::{Question, QuizSummary, Selection},
    services::stage_sequencer::StageSequencer,
};

/// Per-stage cache entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageLoad {
    Unfetched,
    InFlight,
    Loaded(Vec<Question>),
    Failed(String),
}

/// Everything needed to fetch one stage's questions, stamped with the
/// session generation it was issued for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    pub problem_id: String,
    pub stage_index: usize,
    pub stage_name: String,
    pub required_count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Stored,
    Rejected(String),
    Stale,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Loading,
    Failed,
    Ready,
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurrentQuestion<'a> {
    Loading,
    Failed(&'a str),
    Ready(&'a Question),
    Completed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The active stage has no questions yet; nothing moved.
    NotReady,
    NextQuestion,
    /// Moved to the first question of the next stage, with a fetch to run if
    /// that stage was not cached.
    NextStage(Option<FetchTicket>),
    Completed,
    AlreadyCompleted,
}

#[derive(Clone, Debug)]
pub struct QuizSession {
    sequencer: Arc<StageSequencer>,
    problem_id: String,
    generation: u64,
    stage_loads: Vec<StageLoad>,
    current_stage_index: usize,
    current_question_index: usize,
    correct_count: usize,
    incorrect_count: usize,
    completed: bool,
    pending_answer: Option<bool>,
}

impl QuizSession {
    pub fn new(sequencer: Arc<StageSequencer>, problem_id: impl Into<String>) -> Self {
        let stage_loads = vec![StageLoad::Unfetched; sequencer.total_stages()];
        Self {
            sequencer,
            problem_id: problem_id.into(),
            generation: 0,
            stage_loads,
            current_stage_index: 0,
            current_question_index: 0,
            correct_count: 0,
            incorrect_count: 0,
            completed: false,
            pending_answer: None,
        }
    }

    /// Starts over for `problem_id`. Fetches issued before the reset are
    /// discarded when they complete.
    pub fn reset(&mut self, problem_id: impl Into<String>) {
        self.problem_id = problem_id.into();
        self.generation += 1;
        self.stage_loads = vec![StageLoad::Unfetched; self.sequencer.total_stages()];
        self.current_stage_index = 0;
        self.current_question_index = 0;
        self.correct_count = 0;
        self.incorrect_count = 0;
        self.completed = false;
        self.pending_answer = None;
    }

    /// Marks the stage in flight and returns a ticket when it is unfetched or
    /// failed. Loaded and in-flight stages yield `None`.
    pub fn ensure_questions_loaded(&mut self, stage_index: usize) -> Option<FetchTicket> {
        let load = self.stage_loads.get_mut(stage_index)?;
        match load {
            StageLoad::Unfetched | StageLoad::Failed(_) => {
                *load = StageLoad::InFlight;
                let stage = self.sequencer.stage_at(stage_index);
                Some(FetchTicket {
                    generation: self.generation,
                    problem_id: self.problem_id.clone(),
                    stage_index,
                    stage_name: stage.name.clone(),
                    required_count: stage.required_count,
                })
            }
            StageLoad::InFlight | StageLoad::Loaded(_) => None,
        }
    }

    pub fn ensure_current_stage_loaded(&mut self) -> Option<FetchTicket> {
        if self.completed {
            return None;
        }
        self.ensure_questions_loaded(self.current_stage_index)
    }

    /// Applies a finished fetch. Results for another problem or an earlier
    /// generation are ignored; a count mismatch fails the whole stage.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: AppResult<Vec<Question>>,
    ) -> FetchOutcome {
        if ticket.generation != self.generation || ticket.problem_id != self.problem_id {
            return FetchOutcome::Stale;
        }
        let Some(load) = self.stage_loads.get_mut(ticket.stage_index) else {
            return FetchOutcome::Stale;
        };
        if *load != StageLoad::InFlight {
            return FetchOutcome::Stale;
        }

        match result {
            Ok(questions) if questions.len() == ticket.required_count => {
                *load = StageLoad::Loaded(questions);
                FetchOutcome::Stored
            }
            Ok(questions) => {
                let reason = format!(
                    "Expected {} questions for stage '{}', received {}",
                    ticket.required_count,
                    ticket.stage_name,
                    questions.len()
                );
                *load = StageLoad::Failed(reason.clone());
                FetchOutcome::Rejected(reason)
            }
            Err(err) => {
                let reason = err.to_string();
                *load = StageLoad::Failed(reason.clone());
                FetchOutcome::Rejected(reason)
            }
        }
    }

    pub fn current_question(&self) -> CurrentQuestion<'_> {
        if self.completed {
            return CurrentQuestion::Completed;
        }
        match &self.stage_loads[self.current_stage_index] {
            StageLoad::Unfetched | StageLoad::InFlight => CurrentQuestion::Loading,
            StageLoad::Failed(reason) => CurrentQuestion::Failed(reason),
            StageLoad::Loaded(questions) => questions
                .get(self.current_question_index)
                .map(CurrentQuestion::Ready)
                .unwrap_or(CurrentQuestion::Loading),
        }
    }

    /// Grades `selection` against the current question and holds the result
    /// until the next `advance`. A later call overwrites the earlier one.
    /// Returns `None` when no question is on screen.
    pub fn submit_answer(&mut self, selection: &Selection) -> Option<bool> {
        let CurrentQuestion::Ready(question) = self.current_question() else {
            return None;
        };
        let correct = question.is_correct_selection(selection);
        self.pending_answer = Some(correct);
        Some(correct)
    }

    pub fn advance(&mut self) -> AdvanceOutcome {
        if self.completed {
            return AdvanceOutcome::AlreadyCompleted;
        }
        if !matches!(self.current_question(), CurrentQuestion::Ready(_)) {
            return AdvanceOutcome::NotReady;
        }

        match self.pending_answer.take() {
            Some(true) => self.correct_count += 1,
            Some(false) => self.incorrect_count += 1,
            None => {}
        }

        let required_count = self.sequencer.stage_at(self.current_stage_index).required_count;
        if self.current_question_index + 1 < required_count {
            self.current_question_index += 1;
            AdvanceOutcome::NextQuestion
        } else if self.current_stage_index + 1 < self.sequencer.total_stages() {
            self.current_stage_index += 1;
            self.current_question_index = 0;
            AdvanceOutcome::NextStage(self.ensure_questions_loaded(self.current_stage_index))
        } else {
            self.completed = true;
            AdvanceOutcome::Completed
        }
    }

    /// Only available once the last question of the last stage was passed.
    pub fn summary(&self) -> Option<QuizSummary> {
        self.completed
            .then(|| QuizSummary::from_counts(self.correct_count, self.incorrect_count))
    }

    pub fn status(&self) -> SessionStatus {
        match self.current_question() {
            CurrentQuestion::Loading => SessionStatus::Loading,
            CurrentQuestion::Failed(_) => SessionStatus::Failed,
            CurrentQuestion::Ready(_) => SessionStatus::Ready,
            CurrentQuestion::Completed => SessionStatus::Completed,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status() == SessionStatus::Loading
    }

    pub fn has_failed(&self) -> bool {
        self.status() == SessionStatus::Failed
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self.current_question() {
            CurrentQuestion::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn problem_id(&self) -> &str {
        &self.problem_id
    }

    /// `(stage index, question index)` of the cursor.
    pub fn position(&self) -> (usize, usize) {
        (self.current_stage_index, self.current_question_index)
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn incorrect_count(&self) -> usize {
        self.incorrect_count
    }

    pub fn pending_answer(&self) -> Option<bool> {
        self.pending_answer
    }

    pub fn stage_load(&self, stage_index: usize) -> Option<&StageLoad> {
        self.stage_loads.get(stage_index)
    }

    pub fn sequencer(&self) -> &StageSequencer {
        &self.sequencer
    }
}
