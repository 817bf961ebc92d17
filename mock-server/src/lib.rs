use std::{collections::HashMap, sync::Arc};

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const TODO: &str = "application/vnd.todo+json; charset=utf-8";
pub const TODO_LIST: &str = "application/vnd.todo-list+json";
pub const CREATE_TODO: &str = "application/vnd.todo.create+json";
pub const UPDATE_TODO: &str = "application/vnd.todo.update+json";
pub const PROBLEM: &str = "application/problem+json";
pub const ECHO: &str = "application/vnd.echo+json";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

/// RFC 7807 style error body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Problem {
    pub title: String,
    pub status: u16,
}

/// Request as seen by the server, returned by `/echo`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Todo>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .route("/echo/{*rest}", get(echo))
        .route("/export", get(export))
        .route("/broken", get(broken))
        .route("/invalid", get(invalid))
        .route("/untyped", get(untyped))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock server listening");
    }
    axum::serve(listener, app()).await
}

fn document<T: Serialize>(status: StatusCode, content_type: &'static str, value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => (status, [(header::CONTENT_TYPE, content_type)], body).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

fn problem(status: StatusCode, title: &str) -> Response {
    document(
        status,
        PROBLEM,
        &Problem {
            title: title.to_string(),
            status: status.as_u16(),
        },
    )
}

/// Decode a request body, insisting on the given media type.
fn read_body<T: serde::de::DeserializeOwned>(
    headers: &HeaderMap,
    expected: &str,
    body: &Bytes,
) -> Result<T, Response> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    if !essence.eq_ignore_ascii_case(expected) {
        debug!(content_type, expected, "rejecting request body");
        return Err(problem(StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported media type"));
    }
    serde_json::from_slice(body).map_err(|_| problem(StatusCode::UNPROCESSABLE_ENTITY, "malformed body"))
}

async fn list_todos(State(db): State<Db>) -> Response {
    let todos = db.read().await;
    let mut items: Vec<Todo> = todos.values().cloned().collect();
    items.sort_by(|a, b| a.title.cmp(&b.title));
    document(StatusCode::OK, TODO_LIST, &items)
}

async fn create_todo(State(db): State<Db>, headers: HeaderMap, body: Bytes) -> Response {
    let input: CreateTodo = match read_body(&headers, CREATE_TODO, &body) {
        Ok(input) => input,
        Err(response) => return response,
    };
    let todo = Todo {
        id: Uuid::new_v4(),
        title: input.title,
        completed: input.completed,
    };
    db.write().await.insert(todo.id, todo.clone());
    document(StatusCode::CREATED, TODO, &todo)
}

async fn get_todo(State(db): State<Db>, Path(id): Path<Uuid>) -> Response {
    let todos = db.read().await;
    match todos.get(&id) {
        Some(todo) => document(StatusCode::OK, TODO, todo),
        None => problem(StatusCode::NOT_FOUND, "todo not found"),
    }
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let input: UpdateTodo = match read_body(&headers, UPDATE_TODO, &body) {
        Ok(input) => input,
        Err(response) => return response,
    };
    let mut todos = db.write().await;
    let Some(todo) = todos.get_mut(&id) else {
        return problem(StatusCode::NOT_FOUND, "todo not found");
    };
    if let Some(title) = input.title {
        todo.title = title;
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    document(StatusCode::OK, TODO, &*todo)
}

async fn delete_todo(State(db): State<Db>, Path(id): Path<Uuid>) -> Response {
    let mut todos = db.write().await;
    match todos.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => problem(StatusCode::NOT_FOUND, "todo not found"),
    }
}

async fn echo(Path(rest): Path<String>, headers: HeaderMap) -> Response {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let echo = Echo {
        method: "GET".to_string(),
        path: format!("/echo/{rest}"),
        headers,
    };
    document(StatusCode::OK, ECHO, &echo)
}

async fn export() -> Response {
    (
        [(header::CONTENT_TYPE, "text/csv; header=present")],
        "id,title\n",
    )
        .into_response()
}

async fn broken() -> Response {
    ([(header::CONTENT_TYPE, TODO)], "{\"id\": ").into_response()
}

async fn invalid() -> Response {
    ([(header::CONTENT_TYPE, TODO)], r#"{"completed": true}"#).into_response()
}

/// A body with no `Content-Type` at all.
async fn untyped() -> Response {
    let mut response = Response::new(Body::from("plain bytes"));
    response.headers_mut().remove(header::CONTENT_TYPE);
    response
}
