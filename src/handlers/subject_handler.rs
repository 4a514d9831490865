use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{
        request::{CreateSubjectRequest, CreateSubtopicRequest},
        response::{ContentResponse, SubjectResponse, SubtopicResponse},
    },
};

#[get("/subjects")]
pub async fn list_subjects(
    state: web::Data<AppState>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let subjects: Vec<SubjectResponse> = state
        .subject_service
        .list_subjects()
        .await?
        .into_iter()
        .map(SubjectResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(subjects))
}

#[post("/subjects")]
pub async fn create_subject(
    state: web::Data<AppState>,
    request: web::Json<CreateSubjectRequest>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let subject = state.subject_service.create_subject(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(SubjectResponse::from(subject)))
}

#[get("/subjects/{subject_id}")]
pub async fn get_subject(
    state: web::Data<AppState>,
    subject_id: web::Path<String>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let subject = state.subject_service.get_subject(&subject_id).await?;
    Ok(HttpResponse::Ok().json(SubjectResponse::from(subject)))
}

#[post("/subjects/{subject_id}/subtopics")]
pub async fn add_subtopic(
    state: web::Data<AppState>,
    subject_id: web::Path<String>,
    request: web::Json<CreateSubtopicRequest>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let subtopic = state
        .subject_service
        .add_subtopic(&subject_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(SubtopicResponse::from(subtopic)))
}

#[post("/subjects/{subject_id}/subtopics/{subtopic_id}/generate")]
pub async fn generate_content(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (subject_id, subtopic_id) = path.into_inner();
    let content = state
        .content_service
        .generate_subtopic_content(&subject_id, &subtopic_id)
        .await?;
    Ok(HttpResponse::Ok().json(ContentResponse { content }))
}
