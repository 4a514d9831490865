pub mod auth_handler;
pub mod health;
pub mod quiz_handler;
pub mod session_handler;
pub mod subject_handler;

use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

use crate::auth::validate_bearer;

/// Health probes at the root, everything else under `/api`. Only the
/// signup, login and password-reset routes are reachable without a token.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health_check)
        .service(health::health_check_live)
        .service(health::health_check_ready)
        .service(
            web::scope("/api")
                .service(auth_handler::signup)
                .service(auth_handler::login)
                .service(auth_handler::forgot_password)
                .service(auth_handler::reset_password)
                .service(
                    web::scope("")
                        .wrap(HttpAuthentication::bearer(validate_bearer))
                        .service(auth_handler::current_user)
                        .service(subject_handler::list_subjects)
                        .service(subject_handler::create_subject)
                        .service(subject_handler::get_subject)
                        .service(subject_handler::add_subtopic)
                        .service(subject_handler::generate_content)
                        .service(quiz_handler::get_quiz)
                        .service(quiz_handler::submit_quiz_results)
                        .service(quiz_handler::quiz_history)
                        .service(quiz_handler::personalized_content)
                        .service(session_handler::start_session)
                        .service(session_handler::get_session)
                        .service(session_handler::select_answer)
                        .service(session_handler::navigate)
                        .service(session_handler::submit_session)
                        .service(session_handler::next_quiz)
                        .service(session_handler::exit_session),
                ),
        );
}
