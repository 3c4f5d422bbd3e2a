use std::collections::HashSet;

use crate::{
    errors::{AppError, AppResult},
    models::domain::Stage,
};

/// Fixed, ordered stage table shared by every session.
///
/// Lookups index directly into the table: asking for a stage past
/// `total_stages() - 1` is a caller bug and panics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageSequencer {
    stages: Vec<Stage>,
}

impl StageSequencer {
    pub fn new(stages: Vec<Stage>) -> AppResult<Self> {
        if stages.is_empty() {
            return Err(AppError::ValidationError(
                "At least one quiz stage is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for stage in &stages {
            if stage.name.trim().is_empty() {
                return Err(AppError::ValidationError(
                    "Stage names cannot be empty".to_string(),
                ));
            }
            if stage.required_count == 0 {
                return Err(AppError::ValidationError(format!(
                    "Stage '{}' must require at least one question",
                    stage.name
                )));
            }
            if !seen.insert(stage.name.as_str()) {
                return Err(AppError::ValidationError(format!(
                    "Stage '{}' is listed more than once",
                    stage.name
                )));
            }
        }

        Ok(Self { stages })
    }

    pub fn stage_at(&self, index: usize) -> &Stage {
        &self.stages[index]
    }

    pub fn total_stages(&self) -> usize {
        self.stages.len()
    }

    pub fn is_last_stage(&self, index: usize) -> bool {
        index + 1 == self.stages.len()
    }

    pub fn is_last_question_in_stage(&self, index: usize, question_index: usize) -> bool {
        question_index + 1 == self.stage_at(index).required_count
    }

    pub fn total_questions(&self) -> usize {
        self.stages.iter().map(|s| s.required_count).sum()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }
}

impl Default for StageSequencer {
    fn default() -> Self {
        Self {
            stages: Stage::default_table(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sequencer_exposes_umpire_stages() {
        let sequencer = StageSequencer::default();

        assert_eq!(sequencer.total_stages(), 4);
        assert_eq!(sequencer.stage_at(1).name, "Implement");
        assert_eq!(sequencer.stage_at(1).required_count, 4);
        assert_eq!(sequencer.total_questions(), 9);
    }

    #[test]
    fn last_stage_and_question_lookups() {
        let sequencer = StageSequencer::default();

        assert!(!sequencer.is_last_stage(0));
        assert!(sequencer.is_last_stage(3));
        assert!(!sequencer.is_last_question_in_stage(1, 2));
        assert!(sequencer.is_last_question_in_stage(1, 3));
        assert!(sequencer.is_last_question_in_stage(3, 0));
    }

    #[test]
    fn rejects_invalid_tables() {
        assert!(StageSequencer::new(vec![]).is_err());
        assert!(StageSequencer::new(vec![Stage::new("Review", 0)]).is_err());
        assert!(StageSequencer::new(vec![Stage::new(" ", 1)]).is_err());
        assert!(
            StageSequencer::new(vec![Stage::new("Review", 1), Stage::new("Review", 2)]).is_err()
        );
    }

    #[test]
    #[should_panic]
    fn stage_past_the_end_panics() {
        let sequencer = StageSequencer::default();
        let _ = sequencer.stage_at(4);
    }
}
