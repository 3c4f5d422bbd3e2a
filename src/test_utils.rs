use crate::models::domain::{Question, QuestionOption};

#[cfg(test)]
pub mod fixtures {
    use super::*;

    /// Four-option single-select question whose first option is correct.
    pub fn sample_question(seed: usize) -> Question {
        Question {
            prompt: format!("Question {}: what is the time complexity?", seed),
            options: vec![
                QuestionOption {
                    label: "O(n)".to_string(),
                    is_correct: true,
                },
                QuestionOption {
                    label: "O(n log n)".to_string(),
                    is_correct: false,
                },
                QuestionOption {
                    label: "O(n^2)".to_string(),
                    is_correct: false,
                },
                QuestionOption {
                    label: "O(1)".to_string(),
                    is_correct: false,
                },
            ],
            multi_select: false,
            explanation: Some("A single pass over the input".to_string()),
        }
    }

    /// `count` questions numbered from `first_seed`.
    pub fn questions_for(count: usize, first_seed: usize) -> Vec<Question> {
        (first_seed..first_seed + count).map(sample_question).collect()
    }

    pub fn problem_statement(problem_id: &str) -> String {
        format!("# {}\n\nGiven an array of integers, return indices of two numbers that add up to a target.", problem_id)
    }

    pub fn reference_solution() -> String {
        "vector<int> twoSum(vector<int>& nums, int target) { return {}; }".to_string()
    }
}

#[cfg(test)]
pub mod test_helpers {
    use std::{future::Future, time::Duration};

    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }

    /// Polls `check` until it returns true, giving spawned fetch tasks time to finish.
    pub async fn wait_until<F, Fut>(mut check: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        for _ in 0..200 {
            if check().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition was not met in time");
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_fixtures_sample_question() {
        let question = sample_question(3);
        assert!(question.prompt.starts_with("Question 3"));
        assert_eq!(question.correct_indices().into_iter().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_fixtures_questions_for() {
        let questions = questions_for(4, 10);
        assert_eq!(questions.len(), 4);
        assert_eq!(questions[0], sample_question(10));
        assert_eq!(questions[3], sample_question(13));
    }
}
