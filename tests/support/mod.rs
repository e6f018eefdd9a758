//! In-process fixture server for integration tests
//!
//! A minimal quiz application with the HTML surface the harness drives:
//! login/registration with a session cookie, topic and question CRUD via
//! post/redirect/get forms, and the quiz pages. State lives in memory;
//! every test spawns its own seeded instance on an ephemeral port.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Form, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;

pub const SEED_EMAIL: &str = "muskan.dangol@edu.omnia.fi";
pub const SEED_PASSWORD: &str = "muskan";

#[derive(Debug)]
struct Opt {
    id: u64,
    text: String,
    correct: bool,
}

#[derive(Debug)]
struct Question {
    id: u64,
    text: String,
    options: Vec<Opt>,
}

#[derive(Debug)]
struct Topic {
    id: u64,
    name: String,
    questions: Vec<Question>,
}

#[derive(Debug)]
struct Quiz {
    users: HashMap<String, String>,
    sessions: Vec<String>,
    topics: Vec<Topic>,
    next_id: u64,
    slow_hits: u64,
}

impl Quiz {
    fn seeded() -> Self {
        let mut users = HashMap::new();
        users.insert(SEED_EMAIL.to_string(), SEED_PASSWORD.to_string());
        Self {
            users,
            sessions: Vec::new(),
            topics: vec![
                Topic {
                    id: 1,
                    name: "AI".to_string(),
                    questions: vec![Question {
                        id: 1,
                        text: "What does AI stand for?".to_string(),
                        options: vec![
                            Opt {
                                id: 1,
                                text: "Artificial Intelligence".to_string(),
                                correct: true,
                            },
                            Opt {
                                id: 2,
                                text: "Automated Inference".to_string(),
                                correct: false,
                            },
                        ],
                    }],
                },
                Topic {
                    id: 2,
                    name: "Databases".to_string(),
                    questions: Vec::new(),
                },
            ],
            next_id: 100,
            slow_hits: 0,
        }
    }

    fn fresh_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn topic(&self, id: u64) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == id)
    }

    fn topic_mut(&mut self, id: u64) -> Option<&mut Topic> {
        self.topics.iter_mut().find(|t| t.id == id)
    }
}

#[derive(Clone)]
struct AppState(Arc<Mutex<Quiz>>);

pub struct TestServer {
    pub base_url: String,
}

/// Spawn a seeded fixture server on an ephemeral port
pub async fn spawn() -> TestServer {
    let state = AppState(Arc::new(Mutex::new(Quiz::seeded())));
    let app = router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url: format!("http://{addr}"),
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/auth/login", get(login_page).post(login_post))
        .route("/auth/register", get(register_page).post(register_post))
        .route("/topics", get(topics_page).post(topics_add))
        .route("/topics/:tid/delete", post(topics_delete))
        .route("/topics/:tid", get(topic_page))
        .route("/topics/:tid/questions", post(question_add))
        .route("/topics/:tid/questions/:qid", get(question_page))
        .route("/topics/:tid/questions/:qid/delete", post(question_delete))
        .route("/topics/:tid/questions/:qid/options", post(option_add))
        .route(
            "/topics/:tid/questions/:qid/options/:oid/delete",
            post(option_delete),
        )
        .route("/quiz", get(quiz_topics))
        .route("/quiz/:tid/questions/:qid", get(quiz_question))
        .route("/quiz/:tid/questions/:qid/correct", get(quiz_correct))
        .route("/quiz/:tid/questions/:qid/incorrect", get(quiz_incorrect))
        .route("/slow", get(slow_page))
        .with_state(state)
}

fn layout(title: &str, body: &str) -> String {
    format!("<html><head><title>{title}</title></head><body>{body}</body></html>")
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookie = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie
        .split(';')
        .map(str::trim)
        .find_map(|kv| kv.strip_prefix("session=").map(str::to_string))
}

fn authed(quiz: &Quiz, headers: &HeaderMap) -> bool {
    session_token(headers)
        .map(|token| quiz.sessions.contains(&token))
        .unwrap_or(false)
}

async fn home() -> Html<String> {
    Html(layout(
        "Topics!",
        r#"<h3>Multi-choice question application</h3>
           <p>Start by <a href="/auth/register">registering</a> or <a href="/auth/login">log in</a>.</p>
           <p>Built for the <a href="https://fitech.io/">Web Software Development Course</a>
              at <a href="https://www.aalto.fi/">Aalto University</a>.</p>"#,
    ))
}

async fn login_page() -> Html<String> {
    Html(layout(
        "Login",
        r#"<h3>Login form</h3>
           <form method="POST" action="/auth/login">
             <input type="email" name="email">
             <input type="password" name="password">
             <input type="submit" value="Login">
           </form>
           <a href="/auth/register">Not yet registered? Register here.</a>"#,
    ))
}

async fn register_page() -> Html<String> {
    Html(layout(
        "Register",
        r#"<h3>Registration form</h3>
           <form method="POST" action="/auth/register">
             <input type="email" name="email">
             <input type="password" name="password">
             <input type="submit" value="Register">
           </form>
           <a href="/auth/login">Already registered? Login here.</a>"#,
    ))
}

#[derive(Deserialize)]
struct AuthForm {
    email: String,
    password: String,
}

async fn login_post(State(state): State<AppState>, Form(form): Form<AuthForm>) -> Response {
    let mut quiz = state.0.lock().unwrap();
    if quiz.users.get(&form.email) == Some(&form.password) {
        let token = format!("tok-{}", quiz.fresh_id());
        quiz.sessions.push(token.clone());
        (
            StatusCode::OK,
            [(header::SET_COOKIE, format!("session={token}; Path=/"))],
            Html(layout("Topics!", "<h3>Logged in</h3>")),
        )
            .into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Html(layout("Topics!", "<h3>Login failed</h3>")))
            .into_response()
    }
}

async fn register_post(State(state): State<AppState>, Form(form): Form<AuthForm>) -> Response {
    let mut quiz = state.0.lock().unwrap();
    if quiz.users.contains_key(&form.email) {
        return (
            StatusCode::BAD_REQUEST,
            Html(layout("Topics!", "<h3>Already registered</h3>")),
        )
            .into_response();
    }
    quiz.users.insert(form.email, form.password);
    Html(layout("Topics!", "<h3>Registered</h3>")).into_response()
}

async fn topics_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let quiz = state.0.lock().unwrap();
    if !authed(&quiz, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let items: String = quiz
        .topics
        .iter()
        .map(|t| {
            format!(
                r#"<li><a href="/topics/{id}">{name}</a>
                   <form method="POST" action="/topics/{id}/delete">
                     <input type="submit" value="Delete">
                   </form></li>"#,
                id = t.id,
                name = t.name
            )
        })
        .collect();
    let body = format!(
        r#"<h4>Add topics</h4>
           <form method="POST" action="/topics">
             <input type="text" name="name">
             <input type="submit" value="Add">
           </form>
           <ul>{items}</ul>"#
    );
    Html(layout("Topics!", &body)).into_response()
}

#[derive(Deserialize)]
struct TopicForm {
    name: String,
}

async fn topics_add(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<TopicForm>,
) -> Response {
    let mut quiz = state.0.lock().unwrap();
    if !authed(&quiz, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let id = quiz.fresh_id();
    quiz.topics.push(Topic {
        id,
        name: form.name,
        questions: Vec::new(),
    });
    Redirect::to("/topics").into_response()
}

async fn topics_delete(State(state): State<AppState>, Path(tid): Path<u64>) -> Response {
    let mut quiz = state.0.lock().unwrap();
    quiz.topics.retain(|t| t.id != tid);
    Redirect::to("/topics").into_response()
}

async fn topic_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tid): Path<u64>,
) -> Response {
    let quiz = state.0.lock().unwrap();
    if !authed(&quiz, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let Some(topic) = quiz.topic(tid) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let items: String = topic
        .questions
        .iter()
        .map(|q| {
            format!(
                r#"<li><a href="/topics/{tid}/questions/{qid}">{text}</a></li>"#,
                qid = q.id,
                text = q.text
            )
        })
        .collect();
    let body = format!(
        r#"<a href="/topics"><h5>Back</h5></a>
           <h4>{name}</h4>
           <form method="POST" action="/topics/{tid}/questions">
             <textarea name="question_text"></textarea>
             <input type="submit" value="Add Question">
           </form>
           <ul>{items}</ul>"#,
        name = topic.name
    );
    Html(layout("Topics!", &body)).into_response()
}

#[derive(Deserialize)]
struct QuestionForm {
    question_text: String,
}

async fn question_add(
    State(state): State<AppState>,
    Path(tid): Path<u64>,
    Form(form): Form<QuestionForm>,
) -> Response {
    let mut quiz = state.0.lock().unwrap();
    let id = quiz.fresh_id();
    let Some(topic) = quiz.topic_mut(tid) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    topic.questions.push(Question {
        id,
        text: form.question_text,
        options: Vec::new(),
    });
    Redirect::to(&format!("/topics/{tid}")).into_response()
}

async fn question_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((tid, qid)): Path<(u64, u64)>,
) -> Response {
    let quiz = state.0.lock().unwrap();
    if !authed(&quiz, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let Some(question) = quiz.topic(tid).and_then(|t| t.questions.iter().find(|q| q.id == qid))
    else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let items: String = question
        .options
        .iter()
        .map(|o| {
            format!(
                r#"<li>{text}
                   <form method="POST" action="/topics/{tid}/questions/{qid}/options/{oid}/delete">
                     <input type="submit" value="Delete">
                   </form></li>"#,
                oid = o.id,
                text = o.text
            )
        })
        .collect();
    let body = format!(
        r#"<a href="/topics/{tid}"><h5>Back</h5></a>
           <h4>{text}</h4>
           <form method="POST" action="/topics/{tid}/questions/{qid}/delete">
             <input type="submit" value="Delete">
           </form>
           <h3>Answer Options</h3>
           <ul>{items}</ul>
           <form method="POST" action="/topics/{tid}/questions/{qid}/options">
             <textarea name="option_text"></textarea>
             <input type="submit" value="Add Option">
           </form>"#,
        text = question.text
    );
    Html(layout("Topics!", &body)).into_response()
}

async fn question_delete(
    State(state): State<AppState>,
    Path((tid, qid)): Path<(u64, u64)>,
) -> Response {
    let mut quiz = state.0.lock().unwrap();
    if let Some(topic) = quiz.topic_mut(tid) {
        topic.questions.retain(|q| q.id != qid);
    }
    Redirect::to(&format!("/topics/{tid}")).into_response()
}

#[derive(Deserialize)]
struct OptionForm {
    option_text: String,
}

async fn option_add(
    State(state): State<AppState>,
    Path((tid, qid)): Path<(u64, u64)>,
    Form(form): Form<OptionForm>,
) -> Response {
    let mut quiz = state.0.lock().unwrap();
    let id = quiz.fresh_id();
    let Some(question) = quiz
        .topic_mut(tid)
        .and_then(|t| t.questions.iter_mut().find(|q| q.id == qid))
    else {
        return StatusCode::NOT_FOUND.into_response();
    };
    question.options.push(Opt {
        id,
        text: form.option_text,
        correct: false,
    });
    Redirect::to(&format!("/topics/{tid}/questions/{qid}")).into_response()
}

async fn option_delete(
    State(state): State<AppState>,
    Path((tid, qid, oid)): Path<(u64, u64, u64)>,
) -> Response {
    let mut quiz = state.0.lock().unwrap();
    if let Some(question) = quiz
        .topic_mut(tid)
        .and_then(|t| t.questions.iter_mut().find(|q| q.id == qid))
    {
        question.options.retain(|o| o.id != oid);
    }
    Redirect::to(&format!("/topics/{tid}/questions/{qid}")).into_response()
}

async fn quiz_topics(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let quiz = state.0.lock().unwrap();
    if !authed(&quiz, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let items: String = quiz
        .topics
        .iter()
        .map(|t| format!(r#"<li><a href="/quiz/{id}">{name}</a></li>"#, id = t.id, name = t.name))
        .collect();
    Html(layout(
        "Topics!",
        &format!("<h3>Available topics</h3><ul>{items}</ul>"),
    ))
    .into_response()
}

async fn quiz_question(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((tid, qid)): Path<(u64, u64)>,
) -> Response {
    let quiz = state.0.lock().unwrap();
    if !authed(&quiz, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let Some(topic) = quiz.topic(tid) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Some(question) = topic.questions.iter().find(|q| q.id == qid) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let options: String = question
        .options
        .iter()
        .map(|o| {
            let verdict = if o.correct { "correct" } else { "incorrect" };
            format!(
                r#"<label><form method="GET" action="/quiz/{tid}/questions/{qid}/{verdict}">
                     <input type="submit" value="{text}">
                   </form></label>"#,
                text = o.text
            )
        })
        .collect();
    let body = format!(
        r#"<h3>Quiz: {name}</h3>
           <h4>Question:</h4>
           <p>{text}</p>
           {options}"#,
        name = topic.name,
        text = question.text
    );
    Html(layout("Topics!", &body)).into_response()
}

async fn quiz_correct(Path((tid, qid)): Path<(u64, u64)>) -> Html<String> {
    Html(layout(
        "Topics!",
        &format!(
            r#"<h3>Correct!</h3>
               <a href="/quiz/{tid}/questions/{next}">Next question</a>"#,
            next = qid + 1
        ),
    ))
}

async fn quiz_incorrect(
    State(state): State<AppState>,
    Path((tid, qid)): Path<(u64, u64)>,
) -> Response {
    let quiz = state.0.lock().unwrap();
    let correct = quiz
        .topic(tid)
        .and_then(|t| t.questions.iter().find(|q| q.id == qid))
        .and_then(|q| q.options.iter().find(|o| o.correct))
        .map(|o| o.text.clone())
        .unwrap_or_default();
    Html(layout(
        "Topics!",
        &format!(
            r#"<h3>Incorrect!</h3>
               <p>The correct option was: {correct}</p>
               <a href="/quiz/{tid}/questions/{next}">Next question</a>"#,
            next = qid + 1
        ),
    ))
    .into_response()
}

/// Serves "pending" on the first hit and "ready" afterwards, so tests can
/// exercise assertion polling deterministically.
async fn slow_page(State(state): State<AppState>) -> Html<String> {
    let mut quiz = state.0.lock().unwrap();
    quiz.slow_hits += 1;
    let body = if quiz.slow_hits > 1 {
        "<p>ready</p>"
    } else {
        "<p>pending</p>"
    };
    Html(layout("Topics!", body))
}
