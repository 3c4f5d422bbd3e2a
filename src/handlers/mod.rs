pub mod health_handler;
pub mod problem_handler;
pub mod question_handler;
pub mod quiz_session_handler;

use actix_web::web;

pub use health_handler::{health_check, health_check_live, health_check_ready};
pub use problem_handler::{get_archived_questions, get_problem, list_problems};
pub use question_handler::generate_question;
pub use quiz_session_handler::{
    advance, create_session, delete_session, get_session, get_summary, retry, select_problem,
    submit_answer,
};

/// Registers every route on the application.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(health_check_live)
        .service(health_check_ready)
        .service(list_problems)
        .service(get_archived_questions)
        .service(get_problem)
        .service(generate_question)
        .service(create_session)
        .service(get_summary)
        .service(select_problem)
        .service(submit_answer)
        .service(advance)
        .service(retry)
        .service(get_session)
        .service(delete_session);
}
