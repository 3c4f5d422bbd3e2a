use actix_web::{post, web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState, errors::AppError, middleware::get_request_id,
    models::dto::request::GenerateQuestionRequest, repositories::validate_problem_id,
};

/// One-off generation outside any session. Returns the questions with their
/// answer keys.
#[post("/api/generate-question")]
pub async fn generate_question(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<GenerateQuestionRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;
    validate_problem_id(&request.problem_file)?;

    log::info!(
        "[{}] One-off generation of {} '{}' questions for '{}'",
        get_request_id(&req).unwrap_or_default(),
        request.count,
        request.stage,
        request.problem_file
    );

    let questions = state
        .question_provider
        .generate_questions(&request.problem_file, &request.stage, request.count)
        .await?;
    Ok(HttpResponse::Ok().json(questions))
}
