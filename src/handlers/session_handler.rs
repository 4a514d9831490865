use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::{
        domain::QuizSession,
        dto::{
            request::{NavigateRequest, SelectAnswerRequest, SubmitSessionRequest},
            response::{MessageResponse, SessionView, SubmitSessionResponse},
        },
    },
};

fn session_view(state: &AppState, session: &QuizSession) -> SessionView {
    SessionView::new(session, Utc::now(), state.quiz_engine.policy())
}

/// Resolves the path to a subtopic id, rejecting a subtopic that is not
/// part of the subject in the URL.
async fn subtopic_in_subject(
    state: &AppState,
    path: web::Path<(String, String)>,
) -> Result<String, AppError> {
    let (subject_id, subtopic_id) = path.into_inner();
    state
        .quiz_engine
        .ensure_subtopic(&subject_id, &subtopic_id)
        .await?;
    Ok(subtopic_id)
}

#[post("/subjects/{subject_id}/subtopics/{subtopic_id}/session")]
pub async fn start_session(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (subject_id, subtopic_id) = path.into_inner();
    let session = state
        .quiz_engine
        .start_session(auth.user_id(), &subject_id, &subtopic_id)
        .await?;
    Ok(HttpResponse::Ok().json(session_view(&state, &session)))
}

#[get("/subjects/{subject_id}/subtopics/{subtopic_id}/session")]
pub async fn get_session(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let subtopic_id = subtopic_in_subject(&state, path).await?;
    let session = state
        .quiz_engine
        .get_session(auth.user_id(), &subtopic_id)
        .await?;
    Ok(HttpResponse::Ok().json(session_view(&state, &session)))
}

#[put("/subjects/{subject_id}/subtopics/{subtopic_id}/session/answers")]
pub async fn select_answer(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    request: web::Json<SelectAnswerRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let subtopic_id = subtopic_in_subject(&state, path).await?;
    let session = state
        .quiz_engine
        .select_answer(auth.user_id(), &subtopic_id, request.index, &request.option)
        .await?;
    Ok(HttpResponse::Ok().json(session_view(&state, &session)))
}

#[post("/subjects/{subject_id}/subtopics/{subtopic_id}/session/navigate")]
pub async fn navigate(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    request: web::Json<NavigateRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let subtopic_id = subtopic_in_subject(&state, path).await?;
    let session = state
        .quiz_engine
        .navigate(auth.user_id(), &subtopic_id, request.delta)
        .await?;
    Ok(HttpResponse::Ok().json(session_view(&state, &session)))
}

#[post("/subjects/{subject_id}/subtopics/{subtopic_id}/session/submit")]
pub async fn submit_session(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    request: Option<web::Json<SubmitSessionRequest>>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let subtopic_id = subtopic_in_subject(&state, path).await?;
    let emotion = request.and_then(|r| r.into_inner().emotion);

    let outcome = state
        .quiz_engine
        .submit(auth.user_id(), &subtopic_id, emotion)
        .await?;
    Ok(HttpResponse::Ok().json(SubmitSessionResponse {
        session: session_view(&state, &outcome.session),
        next_action: outcome.next_action,
        warning: outcome.warning,
    }))
}

#[post("/subjects/{subject_id}/subtopics/{subtopic_id}/session/next")]
pub async fn next_quiz(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let subtopic_id = subtopic_in_subject(&state, path).await?;
    let session = state
        .quiz_engine
        .next_quiz(auth.user_id(), &subtopic_id)
        .await?;
    Ok(HttpResponse::Ok().json(session_view(&state, &session)))
}

#[delete("/subjects/{subject_id}/subtopics/{subtopic_id}/session")]
pub async fn exit_session(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let subtopic_id = subtopic_in_subject(&state, path).await?;
    state.quiz_engine.exit(auth.user_id(), &subtopic_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Quiz session closed")))
}
