use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use actix_web::{http::StatusCode, test, web, App};
use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::{json, Value};

use learnloop_server::{
    app_state::{AppState, Repositories},
    config::{Config, StorageBackend},
    errors::QuizError,
    handlers::configure_routes,
    middleware::{RequestIdMiddleware, REQUEST_ID_HEADER},
    services::generator::TextGenerator,
};

const CORRECT_ANSWERS: [&str; 5] = ["GET", "404", "Authorization", "443", "201"];

fn question_batch_json() -> String {
    json!([
        { "question": "Which HTTP method fetches a resource?", "options": ["GET", "POST", "PATCH", "CONNECT"], "correctAnswer": "GET" },
        { "question": "Which status code means not found?", "options": ["200", "301", "404", "500"], "correctAnswer": "404" },
        { "question": "Which header carries a bearer token?", "options": ["Accept", "Authorization", "Content-Type", "Host"], "correctAnswer": "Authorization" },
        { "question": "Which port does HTTPS use by default?", "options": ["21", "25", "80", "443"], "correctAnswer": "443" },
        { "question": "Which status code signals creation?", "options": ["201", "204", "302", "400"], "correctAnswer": "201" }
    ])
    .to_string()
}

#[derive(Default)]
struct ScriptedGenerator {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn push_reply(&self, reply: &str) {
        self.replies.lock().unwrap().push_back(reply.to_string());
    }

    fn script_quiz(&self, difficulty: &str) {
        self.push_reply(difficulty);
        self.push_reply(&question_batch_json());
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate_text(&self, prompt: &str) -> Result<String, QuizError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| QuizError::GenerationUnavailable("script exhausted".to_string()))
    }
}

fn test_state(generator: Arc<ScriptedGenerator>) -> AppState {
    let mut config = Config::from_env();
    config.storage_backend = StorageBackend::Memory;
    config.jwt_secret = SecretString::from("integration_test_secret_key_0123456789".to_string());

    AppState::from_repositories(config, Repositories::in_memory(), generator)
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .wrap(RequestIdMiddleware)
                .configure(configure_routes),
        )
        .await
    };
}

/// Sends a request and returns the status with the JSON body (or `Null`).
/// Middleware rejections surface as service errors, so those are rendered too.
macro_rules! send {
    ($app:expr, $req:expr) => {{
        match test::try_call_service(&$app, $req.to_request()).await {
            Ok(resp) => {
                let status = resp.status();
                let body = test::read_body(resp).await;
                (status, serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null))
            }
            Err(err) => {
                let resp = err.error_response();
                let status = resp.status();
                let body = actix_web::body::to_bytes(resp.into_body())
                    .await
                    .unwrap_or_default();
                (status, serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null))
            }
        }
    }};
}

macro_rules! signup_and_login {
    ($app:expr, $username:expr) => {{
        let (status, _) = send!(
            $app,
            test::TestRequest::post()
                .uri("/api/auth/signup")
                .set_json(json!({
                    "username": $username,
                    "email": format!("{}@example.com", $username),
                    "password": "secret123"
                }))
        );
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send!(
            $app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(json!({
                    "email": format!("{}@example.com", $username),
                    "password": "secret123"
                }))
        );
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }};
}

macro_rules! create_subtopic {
    ($app:expr, $token:expr) => {{
        let (status, subject) = send!(
            $app,
            test::TestRequest::post()
                .uri("/api/subjects")
                .insert_header(("Authorization", format!("Bearer {}", $token)))
                .set_json(json!({ "name": "Networking", "description": "Protocols" }))
        );
        assert_eq!(status, StatusCode::CREATED);
        let subject_id = subject["id"].as_str().unwrap().to_string();

        let (status, subtopic) = send!(
            $app,
            test::TestRequest::post()
                .uri(&format!("/api/subjects/{}/subtopics", subject_id))
                .insert_header(("Authorization", format!("Bearer {}", $token)))
                .set_json(json!({ "name": "HTTP", "level": "beginner" }))
        );
        assert_eq!(status, StatusCode::CREATED);
        (subject_id, subtopic["id"].as_str().unwrap().to_string())
    }};
}

#[actix_web::test]
async fn health_endpoints_respond_with_request_id() {
    let app = init_app!(test_state(Arc::new(ScriptedGenerator::default())));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert!(resp.status().is_success());
    assert!(resp.headers().contains_key(REQUEST_ID_HEADER));

    let (status, body) = send!(app, test::TestRequest::get().uri("/health/ready"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");

    let (status, body) = send!(app, test::TestRequest::get().uri("/health/live"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");
}

#[actix_web::test]
async fn signup_login_and_current_user() {
    let app = init_app!(test_state(Arc::new(ScriptedGenerator::default())));
    let token = signup_and_login!(app, "alice");

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/auth/user")
            .insert_header(("Authorization", format!("Bearer {}", token)))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
    assert!(body["lastLogin"].is_string());
    assert!(body.get("passwordHash").is_none());

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(json!({ "username": "alice", "email": "alice@example.com", "password": "secret123" }))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "ALREADY_EXISTS");

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(json!({ "username": "bob", "email": "not-an-email", "password": "secret123" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "alice@example.com", "password": "wrong-password" }))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "UNAUTHORIZED");
}

#[actix_web::test]
async fn protected_routes_reject_missing_or_bad_tokens() {
    let app = init_app!(test_state(Arc::new(ScriptedGenerator::default())));

    let (status, _) = send!(app, test::TestRequest::get().uri("/api/subjects"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/auth/user")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn password_reset_link_is_single_use() {
    let state = test_state(Arc::new(ScriptedGenerator::default()));
    let users = state.user_service.clone();
    let app = init_app!(state);
    signup_and_login!(app, "carol");

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/forgot-password")
            .set_json(json!({ "email": "nobody@example.com" }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The HTTP response never carries the token; issue one directly.
    let reset_token = users.forgot_password("carol@example.com").await.unwrap();

    let reset = || {
        test::TestRequest::post()
            .uri(&format!("/api/auth/reset-password/{}", reset_token))
            .set_json(json!({ "password": "new-secret" }))
    };
    let (status, _) = send!(app, reset());
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send!(app, reset());
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "carol@example.com", "password": "new-secret" }))
    );
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn checkpointed_session_flow() {
    let generator = Arc::new(ScriptedGenerator::default());
    let app = init_app!(test_state(generator.clone()));
    let token = signup_and_login!(app, "dave");
    let (subject_id, subtopic_id) = create_subtopic!(app, token);
    let session_uri = format!("/api/subjects/{}/subtopics/{}/session", subject_id, subtopic_id);
    let auth = ("Authorization", format!("Bearer {}", token));

    generator.script_quiz("Medium");
    let (status, session) = send!(
        app,
        test::TestRequest::post()
            .uri(&session_uri)
            .insert_header(auth.clone())
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["state"], "in_progress");
    assert_eq!(session["difficulty"], "medium");
    assert_eq!(session["questions"].as_array().unwrap().len(), 5);
    assert!(session["questions"][0].get("correctAnswer").is_none());

    let (status, other) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/subjects")
            .insert_header(auth.clone())
            .set_json(json!({ "name": "Algebra" }))
    );
    assert_eq!(status, StatusCode::CREATED);
    let foreign_uri = format!(
        "/api/subjects/{}/subtopics/{}/session",
        other["id"].as_str().unwrap(),
        subtopic_id
    );
    let (status, _) = send!(
        app,
        test::TestRequest::get()
            .uri(&foreign_uri)
            .insert_header(auth.clone())
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send!(
        app,
        test::TestRequest::delete()
            .uri(&foreign_uri)
            .insert_header(auth.clone())
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri(&format!("{}/submit", session_uri))
            .insert_header(auth.clone())
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "INCOMPLETE_SUBMISSION");

    for (index, answer) in CORRECT_ANSWERS.iter().enumerate() {
        let (status, _) = send!(
            app,
            test::TestRequest::put()
                .uri(&format!("{}/answers", session_uri))
                .insert_header(auth.clone())
                .set_json(json!({ "index": index, "option": answer }))
        );
        assert_eq!(status, StatusCode::OK);
    }

    let (status, view) = send!(
        app,
        test::TestRequest::post()
            .uri(&format!("{}/navigate", session_uri))
            .insert_header(auth.clone())
            .set_json(json!({ "delta": i64::MAX }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["currentIndex"], 4);
    assert_eq!(view["submittable"], true);

    let (status, outcome) = send!(
        app,
        test::TestRequest::post()
            .uri(&format!("{}/submit", session_uri))
            .insert_header(auth.clone())
            .set_json(json!({ "emotion": "happy" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["nextAction"], "nextQuiz");
    assert_eq!(outcome["session"]["state"], "submitted");
    assert_eq!(outcome["session"]["lastAttempt"]["score"], 100);
    assert_eq!(outcome["session"]["questions"][1]["correctAnswer"], "404");

    let (status, history) = send!(
        app,
        test::TestRequest::get()
            .uri(&format!(
                "/api/subjects/{}/subtopics/{}/quiz-history",
                subject_id, subtopic_id
            ))
            .insert_header(auth.clone())
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["attempts"].as_array().unwrap().len(), 1);

    // Nothing scripted: generation fails and the checkpoint stays submitted.
    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri(&format!("{}/next", session_uri))
            .insert_header(auth.clone())
    );
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let (_, view) = send!(
        app,
        test::TestRequest::get()
            .uri(&session_uri)
            .insert_header(auth.clone())
    );
    assert_eq!(view["state"], "submitted");

    generator.script_quiz("Hard");
    let (status, view) = send!(
        app,
        test::TestRequest::post()
            .uri(&format!("{}/next", session_uri))
            .insert_header(auth.clone())
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["state"], "in_progress");
    assert_eq!(view["consecutiveSessions"], 2);
    let prompts = generator.prompts();
    assert!(prompts[prompts.len() - 2].contains("100%"));

    let (status, _) = send!(
        app,
        test::TestRequest::delete()
            .uri(&session_uri)
            .insert_header(auth.clone())
    );
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri(&session_uri)
            .insert_header(auth.clone())
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "NOT_FOUND");
}

#[actix_web::test]
async fn stateless_quiz_and_remedial_results() {
    let generator = Arc::new(ScriptedGenerator::default());
    let app = init_app!(test_state(generator.clone()));
    let token = signup_and_login!(app, "erin");
    let (subject_id, subtopic_id) = create_subtopic!(app, token);
    let base = format!("/api/subjects/{}/subtopics/{}", subject_id, subtopic_id);
    let auth = ("Authorization", format!("Bearer {}", token));

    generator.script_quiz("Hard");
    let (status, quiz) = send!(
        app,
        test::TestRequest::get()
            .uri(&format!(
                "{}/quiz?previousScore=80&previousEmotion=happy&previousDifficulty=undefined",
                base
            ))
            .insert_header(auth.clone())
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quiz["difficulty"], "hard");
    assert_eq!(quiz["questions"].as_array().unwrap().len(), 5);
    assert!(generator.prompts()[0].contains("80%"));

    generator.push_reply("Easy");
    generator.push_reply("Sorry, I can only answer in prose.");
    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri(&format!("{}/quiz", base))
            .insert_header(auth.clone())
    );
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["kind"], "MALFORMED_GENERATION");

    let mut last = Value::Null;
    for (attempt, score) in [20u8, 40, 20].iter().enumerate() {
        let (status, body) = send!(
            app,
            test::TestRequest::post()
                .uri(&format!("{}/quiz-results", base))
                .insert_header(auth.clone())
                .set_json(json!({
                    "score": score,
                    "emotion": "sad",
                    "difficulty": "easy",
                    "timeSpent": 120,
                    "consecutiveSessions": attempt + 1
                }))
        );
        assert_eq!(status, StatusCode::CREATED);
        if attempt < 2 {
            assert_eq!(body["nextAction"], "nextQuiz");
        }
        last = body;
    }
    assert_eq!(last["nextAction"], "remedial");
    assert_eq!(last["recentSuccessRate"], 0.0);

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri(&format!("{}/quiz-results", base))
            .insert_header(auth.clone())
            .set_json(json!({ "score": 101, "difficulty": "easy", "timeSpent": 10 }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
