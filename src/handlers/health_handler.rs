use actix_web::{get, web, HttpResponse};

use crate::app_state::AppState;

#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[get("/health/ready")]
pub async fn health_check_ready(state: web::Data<AppState>) -> HttpResponse {
    let archive_status = match &state.archive {
        Some(archive) => match archive.health_check().await {
            Ok(()) => "ok",
            Err(e) => {
                log::warn!("Question archive health check failed: {}", e);
                "error"
            }
        },
        None => "disabled",
    };
    let ready = archive_status != "error";

    let response = serde_json::json!({
        "status": if ready { "ready" } else { "not_ready" },
        "version": env!("CARGO_PKG_VERSION"),
        "dependencies": {
            "mongodb": archive_status
        },
        "activeSessions": state.session_service.session_count().await
    });

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

#[get("/health/live")]
pub async fn health_check_live() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::{http::StatusCode, test, App};

    use crate::{
        config::Config,
        errors::AppError,
        repositories::{
            problem_repository::MockProblemRepository,
            question_archive_repository::MockQuestionArchive, QuestionArchive,
        },
        services::{question_provider::MockQuestionProvider, StageSequencer},
    };

    fn state_with(archive: Option<Arc<dyn QuestionArchive>>) -> AppState {
        AppState::from_parts(
            Config::test_config(),
            Arc::new(MockProblemRepository::new()),
            Arc::new(MockQuestionProvider::new()),
            archive,
            StageSequencer::default(),
        )
    }

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(App::new().service(health_check)).await;

        let req = test::TestRequest::get().uri("/health").to_request();

        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_live() {
        let app = test::init_service(App::new().service(health_check_live)).await;

        let req = test::TestRequest::get().uri("/health/live").to_request();

        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_ready_without_archive() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state_with(None)))
                .service(health_check_ready),
        )
        .await;

        let req = test::TestRequest::get().uri("/health/ready").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ready");
        assert_eq!(body["dependencies"]["mongodb"], "disabled");
    }

    #[actix_web::test]
    async fn test_ready_reports_archive_outage() {
        let mut archive = MockQuestionArchive::new();
        archive
            .expect_health_check()
            .returning(|| Err(AppError::DatabaseError("no primary".to_string())));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state_with(Some(Arc::new(archive)))))
                .service(health_check_ready),
        )
        .await;

        let req = test::TestRequest::get().uri("/health/ready").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
