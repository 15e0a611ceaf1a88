use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

use taskdesk::config::{ApiConfig, AppConfig, Environment, ViewConfig};
use taskdesk::session::{MemoryStorage, SessionStorage};
use taskdesk::App;

pub const PASSWORD: &str = "secret";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const USER_EMAIL: &str = "ada@example.com";

/// What the stub backend saw, plus its in-memory data
#[derive(Default)]
pub struct StubState {
    pub users: Vec<Value>,
    pub tasks: Vec<Value>,
    /// token -> user id
    pub tokens: HashMap<String, String>,
    /// `Authorization` header of every request, in order
    pub authorization: Vec<Option<String>>,
    /// Text fields and uploaded file names of each multipart create
    pub uploads: Vec<(HashMap<String, String>, Vec<String>)>,
    pub last_query: HashMap<String, String>,
    next_id: usize,
}

impl StubState {
    fn seeded() -> Self {
        let mut state = Self::default();
        state.users = vec![
            json!({ "_id": "u1", "name": "Root", "email": ADMIN_EMAIL, "role": "admin" }),
            json!({ "_id": "u2", "name": "Ada", "email": USER_EMAIL, "role": "user" }),
            json!({ "_id": "u3", "name": "Grace", "email": "grace@example.com", "role": "user" }),
        ];
        state.tasks = vec![
            json!({
                "_id": "t1", "title": "Write report", "description": "Q3 numbers",
                "status": "pending", "priority": "high", "dueDate": "2024-07-01T00:00:00.000Z",
                "assignedTo": { "_id": "u2", "name": "Ada", "email": USER_EMAIL },
                "documents": ["uploads/report.pdf"]
            }),
            json!({
                "_id": "t2", "title": "Plan offsite", "status": "completed",
                "priority": "low", "dueDate": "2024-06-15", "documents": []
            }),
        ];
        state.next_id = 100;
        state
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }
}

type Shared = Arc<Mutex<StubState>>;

pub struct StubBackend {
    pub base_url: String,
    pub state: Shared,
}

impl StubBackend {
    /// Serve the stub on an unused port inside the current test runtime
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind stub backend")?;

        let state: Shared = Arc::new(Mutex::new(StubState::seeded()));
        let app = routes(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}/api", port),
            state,
        })
    }

    pub fn config(&self) -> AppConfig {
        AppConfig {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: self.base_url.clone(),
                request_timeout_secs: 5,
            },
            views: ViewConfig { task_page_size: 5 },
        }
    }

    pub fn app(&self) -> Result<App> {
        self.app_with_storage(Arc::new(MemoryStorage::new()))
    }

    pub fn app_with_storage(&self, storage: Arc<dyn SessionStorage>) -> Result<App> {
        Ok(App::from_config(&self.config(), storage)?)
    }

    /// Simulate every credential expiring server-side
    pub fn revoke_tokens(&self) {
        self.state.lock().tokens.clear();
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.state.lock().authorization.last().cloned().flatten()
    }
}

pub async fn login(app: &App, email: &str) -> Result<()> {
    tokio::time::timeout(Duration::from_secs(5), app.auth.login(email, PASSWORD)).await??;
    Ok(())
}

fn routes(state: Shared) -> Router {
    let api = Router::new()
        .route("/auth/login", post(auth_login))
        .route("/auth/register", post(auth_register))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/:id", get(get_task).put(update_task).delete(delete_task))
        .route("/tasks/:id/assign", put(assign_task))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", get(get_user).put(update_user).delete(delete_user));

    Router::new().nest("/api", api).with_state(state)
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn msg(status: StatusCode, message: &str) -> Response {
    reply(status, json!({ "msg": message }))
}

/// Bearer check shared by every protected route; returns the caller
fn authorize(state: &mut StubState, headers: &HeaderMap) -> Result<Value, Response> {
    let header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.authorization.push(header.clone());

    let token = header
        .as_deref()
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| msg(StatusCode::UNAUTHORIZED, "No token, authorization denied"))?;

    let user_id = state
        .tokens
        .get(token)
        .cloned()
        .ok_or_else(|| msg(StatusCode::UNAUTHORIZED, "Token is not valid"))?;

    state
        .users
        .iter()
        .find(|u| u["_id"] == user_id.as_str())
        .cloned()
        .ok_or_else(|| msg(StatusCode::UNAUTHORIZED, "Token is not valid"))
}

fn authorize_admin(state: &mut StubState, headers: &HeaderMap) -> Result<Value, Response> {
    let user = authorize(state, headers)?;
    if user["role"] != "admin" {
        return Err(msg(StatusCode::FORBIDDEN, "Access denied"));
    }
    Ok(user)
}

async fn auth_login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock();
    let email = body["email"].as_str().unwrap_or_default();
    let user = state.users.iter().find(|u| u["email"] == email).cloned();

    match user {
        Some(user) if body["password"] == PASSWORD => {
            let token = state.next_id("tok-");
            let id = user["_id"].as_str().unwrap_or_default().to_string();
            state.tokens.insert(token.clone(), id);
            reply(StatusCode::OK, json!({ "token": token, "user": user }))
        }
        _ => msg(StatusCode::BAD_REQUEST, "Invalid credentials"),
    }
}

async fn auth_register(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock();
    if state.users.iter().any(|u| u["email"] == body["email"]) {
        return msg(StatusCode::BAD_REQUEST, "User already exists");
    }
    let id = state.next_id("u");
    state.users.push(json!({
        "_id": id, "name": "", "email": body["email"], "role": body["role"]
    }));
    msg(StatusCode::CREATED, "User registered successfully")
}

async fn list_tasks(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut state = state.lock();
    if let Err(denied) = authorize(&mut state, &headers) {
        return denied;
    }

    let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1).max(1);
    let limit: usize = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(5).max(1);
    state.last_query = query;

    let total_pages = state.tasks.len().div_ceil(limit).max(1);
    let tasks: Vec<Value> = state.tasks.iter().skip((page - 1) * limit).take(limit).cloned().collect();
    reply(StatusCode::OK, json!({ "tasks": tasks, "totalPages": total_pages }))
}

async fn create_task(State(state): State<Shared>, headers: HeaderMap, mut multipart: Multipart) -> Response {
    let authorized = authorize(&mut state.lock(), &headers);
    if let Err(denied) = authorized {
        return denied;
    }

    let mut fields = HashMap::new();
    let mut files = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let _ = field.bytes().await;
                files.push(file_name);
            }
            None => {
                let value = field.text().await.unwrap_or_default();
                fields.insert(name, value);
            }
        }
    }

    let mut state = state.lock();
    let id = state.next_id("t");
    let documents: Vec<String> = files.iter().map(|f| format!("uploads/{}", f)).collect();
    state.tasks.push(json!({
        "_id": id,
        "title": fields.get("title"),
        "description": fields.get("description"),
        "status": fields.get("status"),
        "priority": fields.get("priority"),
        "dueDate": fields.get("dueDate"),
        "documents": documents,
    }));
    state.uploads.push((fields, files));
    reply(StatusCode::CREATED, json!({ "_id": id }))
}

async fn get_task(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let mut state = state.lock();
    if let Err(denied) = authorize(&mut state, &headers) {
        return denied;
    }
    match state.tasks.iter().find(|t| t["_id"] == id.as_str()) {
        Some(task) => reply(StatusCode::OK, task.clone()),
        None => msg(StatusCode::NOT_FOUND, "Task not found"),
    }
}

async fn update_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock();
    if let Err(denied) = authorize(&mut state, &headers) {
        return denied;
    }
    let Some(task) = state.tasks.iter_mut().find(|t| t["_id"] == id.as_str()) else {
        return msg(StatusCode::NOT_FOUND, "Task not found");
    };
    if let (Some(task), Some(update)) = (task.as_object_mut(), body.as_object()) {
        for (key, value) in update {
            task.insert(key.clone(), value.clone());
        }
    }
    reply(StatusCode::OK, task.clone())
}

async fn delete_task(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let mut state = state.lock();
    if let Err(denied) = authorize_admin(&mut state, &headers) {
        return denied;
    }
    state.tasks.retain(|t| t["_id"] != id.as_str());
    msg(StatusCode::OK, "Task removed")
}

async fn assign_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock();
    if let Err(denied) = authorize_admin(&mut state, &headers) {
        return denied;
    }
    let Some(task) = state.tasks.iter_mut().find(|t| t["_id"] == id.as_str()) else {
        return msg(StatusCode::NOT_FOUND, "Task not found");
    };
    task["assignedTo"] = body["userId"].clone();
    reply(StatusCode::OK, task.clone())
}

async fn list_users(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock();
    if let Err(denied) = authorize_admin(&mut state, &headers) {
        return denied;
    }
    reply(StatusCode::OK, Value::Array(state.users.clone()))
}

async fn create_user(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut state = state.lock();
    if let Err(denied) = authorize_admin(&mut state, &headers) {
        return denied;
    }
    let id = state.next_id("u");
    state.users.push(json!({
        "_id": id, "name": body["name"], "email": body["email"], "role": body["role"]
    }));
    reply(StatusCode::CREATED, json!({ "_id": id }))
}

async fn get_user(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let mut state = state.lock();
    if let Err(denied) = authorize_admin(&mut state, &headers) {
        return denied;
    }
    match state.users.iter().find(|u| u["_id"] == id.as_str()) {
        Some(user) => reply(StatusCode::OK, user.clone()),
        None => msg(StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn update_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock();
    if let Err(denied) = authorize_admin(&mut state, &headers) {
        return denied;
    }
    let Some(user) = state.users.iter_mut().find(|u| u["_id"] == id.as_str()) else {
        return msg(StatusCode::NOT_FOUND, "User not found");
    };
    for key in ["name", "email", "role"] {
        if !body[key].is_null() {
            user[key] = body[key].clone();
        }
    }
    reply(StatusCode::OK, user.clone())
}

async fn delete_user(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let mut state = state.lock();
    if let Err(denied) = authorize_admin(&mut state, &headers) {
        return denied;
    }
    state.users.retain(|u| u["_id"] != id.as_str());
    msg(StatusCode::OK, "User removed")
}
