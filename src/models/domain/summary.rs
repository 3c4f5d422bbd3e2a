use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum PerformanceBand {
    Excellent,
    Good,
    Fair,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl PerformanceBand {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 90.0 {
            PerformanceBand::Excellent
        } else if percentage >= 70.0 {
            PerformanceBand::Good
        } else if percentage >= 50.0 {
            PerformanceBand::Fair
        } else {
            PerformanceBand::NeedsImprovement
        }
    }
}

impl std::fmt::Display for PerformanceBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PerformanceBand::Excellent => write!(f, "Excellent"),
            PerformanceBand::Good => write!(f, "Good"),
            PerformanceBand::Fair => write!(f, "Fair"),
            PerformanceBand::NeedsImprovement => write!(f, "Needs Improvement"),
        }
    }
}

/// Final tally of a completed quiz session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub correct_count: usize,
    pub incorrect_count: usize,
    pub total_answered: usize,
    pub percentage: f64,
    pub performance_band: PerformanceBand,
}

impl QuizSummary {
    pub fn from_counts(correct_count: usize, incorrect_count: usize) -> Self {
        let total_answered = correct_count + incorrect_count;
        // Skipped questions are not counted, so nothing answered is a valid outcome.
        let percentage = if total_answered == 0 {
            0.0
        } else {
            correct_count as f64 / total_answered as f64 * 100.0
        };

        Self {
            correct_count,
            incorrect_count,
            total_answered,
            percentage,
            performance_band: PerformanceBand::from_percentage(percentage),
        }
    }
}
