use actix_web::{get, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{
        request::{PersonalizedContentRequest, QuizHintsQuery, QuizResultRequest},
        response::{
            AttemptResponse, ContentResponse, QuizHistoryResponse, QuizResponse, QuizResultResponse,
        },
    },
};

/// Stateless quiz: the client keeps progress and sends back the hints.
#[get("/subjects/{subject_id}/subtopics/{subtopic_id}/quiz")]
pub async fn get_quiz(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    query: web::Query<QuizHintsQuery>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (subject_id, subtopic_id) = path.into_inner();
    let hints = query.into_inner().into_hints();

    let quiz = state
        .quiz_engine
        .generate_quiz(&subject_id, &subtopic_id, &hints)
        .await?;
    Ok(HttpResponse::Ok().json(QuizResponse {
        difficulty: quiz.difficulty,
        questions: quiz.questions,
    }))
}

#[post("/subjects/{subject_id}/subtopics/{subtopic_id}/quiz-results")]
pub async fn submit_quiz_results(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    request: web::Json<QuizResultRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (subject_id, subtopic_id) = path.into_inner();
    let request = request.into_inner();
    request.validate()?;

    let result = state
        .quiz_engine
        .record_result(auth.user_id(), &subject_id, &subtopic_id, request)
        .await?;
    Ok(HttpResponse::Created().json(QuizResultResponse {
        attempt: AttemptResponse::from(result.attempt),
        next_action: result.next_action,
        recent_success_rate: result.recent_success_rate,
        warning: result.warning,
    }))
}

#[get("/subjects/{subject_id}/subtopics/{subtopic_id}/quiz-history")]
pub async fn quiz_history(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (subject_id, subtopic_id) = path.into_inner();
    let attempts = state
        .quiz_engine
        .quiz_history(auth.user_id(), &subject_id, &subtopic_id)
        .await?;

    Ok(HttpResponse::Ok().json(QuizHistoryResponse {
        attempts: attempts.into_iter().map(AttemptResponse::from).collect(),
    }))
}

#[post("/subjects/{subject_id}/subtopics/{subtopic_id}/personalized-content")]
pub async fn personalized_content(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    request: Option<web::Json<PersonalizedContentRequest>>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (subject_id, subtopic_id) = path.into_inner();
    let request = request.map(|r| r.into_inner()).unwrap_or_default();

    let content = state
        .content_service
        .personalized_content(auth.user_id(), &subject_id, &subtopic_id, request)
        .await?;
    Ok(HttpResponse::Ok().json(ContentResponse { content }))
}
