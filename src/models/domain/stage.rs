use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

pub const IMPLEMENT_STAGE: &str = "Implement";

/// A named quiz phase with a fixed number of questions.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub name: String,
    pub required_count: usize,
}

impl Stage {
    pub fn new(name: impl Into<String>, required_count: usize) -> Self {
        Self {
            name: name.into(),
            required_count,
        }
    }

    /// The UMPIRE-derived stage table used when nothing is configured.
    pub fn default_table() -> Vec<Stage> {
        vec![
            Stage::new("Understand", 2),
            Stage::new(IMPLEMENT_STAGE, 4),
            Stage::new("Review", 2),
            Stage::new("Evaluate", 1),
        ]
    }

    /// Parses a `name:count` list separated by commas, e.g. `Understand:2,Implement:4`.
    pub fn parse_table(raw: &str) -> AppResult<Vec<Stage>> {
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (name, count) = entry.split_once(':').ok_or_else(|| {
                    AppError::ValidationError(format!(
                        "Stage entry '{}' must look like name:count",
                        entry
                    ))
                })?;
                let count = count.trim().parse::<usize>().map_err(|_| {
                    AppError::ValidationError(format!(
                        "Stage entry '{}' has a non-numeric count",
                        entry
                    ))
                })?;
                Ok(Stage::new(name.trim(), count))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_totals_nine_questions() {
        let stages = Stage::default_table();
        let names: Vec<&str> = stages.iter().map(|s| s.name.as_str()).collect();

        assert_eq!(names, vec!["Understand", "Implement", "Review", "Evaluate"]);
        assert_eq!(stages.iter().map(|s| s.required_count).sum::<usize>(), 9);
    }

    #[test]
    fn parse_table_reads_names_and_counts() {
        let stages = Stage::parse_table(" Understand:1 , Implement:3,").unwrap();

        assert_eq!(
            stages,
            vec![Stage::new("Understand", 1), Stage::new("Implement", 3)]
        );
    }

    #[test]
    fn parse_table_rejects_malformed_entries() {
        assert!(Stage::parse_table("Understand").is_err());
        assert!(Stage::parse_table("Understand:two").is_err());
    }
}
