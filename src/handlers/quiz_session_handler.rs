use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    middleware::get_request_id,
    models::dto::request::{SelectProblemRequest, SubmitAnswerRequest},
};

#[post("/api/sessions")]
pub async fn create_session(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<SelectProblemRequest>,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let snapshot = state.session_service.create_session(&request.problem_id).await?;
    log::info!(
        "[{}] Session {} started on '{}'",
        get_request_id(&req).unwrap_or_default(),
        snapshot.session_id,
        snapshot.problem_id
    );
    Ok(HttpResponse::Created().json(snapshot))
}

#[get("/api/sessions/{id}")]
pub async fn get_session(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let snapshot = state.session_service.get_session(&id).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[put("/api/sessions/{id}/problem")]
pub async fn select_problem(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    request: web::Json<SelectProblemRequest>,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let snapshot = state
        .session_service
        .reset_session(&id, &request.problem_id)
        .await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[post("/api/sessions/{id}/answer")]
pub async fn submit_answer(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    request: web::Json<SubmitAnswerRequest>,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let response = state
        .session_service
        .submit_answer(&id, &request.selected)
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/sessions/{id}/advance")]
pub async fn advance(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let snapshot = state.session_service.advance(&id).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[post("/api/sessions/{id}/retry")]
pub async fn retry(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let snapshot = state.session_service.retry(&id).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[get("/api/sessions/{id}/summary")]
pub async fn get_summary(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let summary = state.session_service.summary(&id).await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[delete("/api/sessions/{id}")]
pub async fn delete_session(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state.session_service.delete_session(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::{http::StatusCode, test, App};

    use crate::{
        config::Config,
        handlers::configure,
        middleware::{RequestIdMiddleware, REQUEST_ID_HEADER},
        repositories::problem_repository::MockProblemRepository,
        services::{question_provider::MockQuestionProvider, StageSequencer},
        test_utils::{fixtures::questions_for, test_helpers::wait_until},
    };

    fn state() -> web::Data<AppState> {
        let mut problems = MockProblemRepository::new();
        problems.expect_exists().returning(|id| Ok(id == "two-sum"));

        let mut provider = MockQuestionProvider::new();
        provider
            .expect_generate_questions()
            .returning(|_, _, count| Ok(questions_for(count, 0)));

        web::Data::new(AppState::from_parts(
            Config::test_config(),
            Arc::new(problems),
            Arc::new(provider),
            None,
            StageSequencer::default(),
        ))
    }

    #[actix_web::test]
    async fn test_create_session_returns_created() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/sessions")
            .set_json(serde_json::json!({ "problemId": "two-sum" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["problemId"], "two-sum");
        assert_eq!(body["stage"]["name"], "Understand");
        assert_eq!(body["totalQuestions"], 9);
    }

    #[actix_web::test]
    async fn test_create_session_keeps_caller_request_id() {
        let app = test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .app_data(state())
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/sessions")
            .insert_header((REQUEST_ID_HEADER, "quiz-7"))
            .set_json(serde_json::json!({ "problemId": "two-sum" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers().get(REQUEST_ID_HEADER).unwrap(), "quiz-7");
    }

    #[actix_web::test]
    async fn test_unknown_problem_and_session() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/sessions")
            .set_json(serde_json::json!({ "problemId": "three-sum" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{}", Uuid::new_v4()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_answer_hides_key_until_submitted() {
        let data = state();
        let app = test::init_service(App::new().app_data(data.clone()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/sessions")
            .set_json(serde_json::json!({ "problemId": "two-sum" }))
            .to_request();
        let created: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let id: Uuid = serde_json::from_value(created["sessionId"].clone()).unwrap();

        let service = Arc::clone(&data.session_service);
        wait_until(move || {
            let service = Arc::clone(&service);
            async move { service.get_session(&id).await.unwrap().question.is_some() }
        })
        .await;

        let req = test::TestRequest::get().uri(&format!("/api/sessions/{}", id)).to_request();
        let snapshot: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(snapshot["status"], "ready");
        assert_eq!(snapshot["question"]["options"][0], "O(n)");
        assert!(snapshot["question"]["options"][0].get("isCorrect").is_none());

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/answer", id))
            .set_json(serde_json::json!({ "selected": [1] }))
            .to_request();
        let answer: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(answer["correct"], false);
        assert_eq!(answer["session"]["pendingAnswer"], false);

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/advance", id))
            .to_request();
        let advanced: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(advanced["incorrectCount"], 1);
        assert_eq!(advanced["stage"]["questionNumber"], 2);
    }

    #[actix_web::test]
    async fn test_summary_conflicts_until_completed() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/sessions")
            .set_json(serde_json::json!({ "problemId": "two-sum" }))
            .to_request();
        let created: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let id = created["sessionId"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{}/summary", id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/sessions/{}", id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn test_empty_selection_is_rejected() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/answer", Uuid::new_v4()))
            .set_json(serde_json::json!({ "selected": [] }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
