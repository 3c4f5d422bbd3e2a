use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SelectProblemRequest {
    #[validate(length(min = 1, max = 128))]
    pub problem_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1, max = 16, message = "Select at least one option"))]
    pub selected: Vec<usize>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionRequest {
    #[validate(length(min = 1, max = 128))]
    pub problem_file: String,

    #[validate(length(min = 1, max = 64))]
    pub stage: String,

    #[validate(range(min = 1, max = 10))]
    pub count: usize,
}
