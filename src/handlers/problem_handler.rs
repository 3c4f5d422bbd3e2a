use actix_web::{get, web, HttpResponse};

use crate::{app_state::AppState, errors::AppError};

#[get("/api/problems")]
pub async fn list_problems(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let problems = state.problem_service.list_problems().await?;
    Ok(HttpResponse::Ok().json(problems))
}

#[get("/api/problems/{id}")]
pub async fn get_problem(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let problem = state.problem_service.get_problem_statement(&id).await?;
    Ok(HttpResponse::Ok().json(problem))
}

#[get("/api/problems/{id}/questions")]
pub async fn get_archived_questions(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let sets = state.problem_service.archived_questions(&id).await?;
    Ok(HttpResponse::Ok().json(sets))
}
