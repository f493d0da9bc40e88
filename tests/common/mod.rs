//! In-process fake of the board REST API for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};

pub const TOKEN: &str = "test-token";

#[derive(Debug, Clone)]
pub struct FakeColumn {
    pub id: String,
    pub title: String,
    pub position: i32,
    pub tasks: Vec<Value>,
}

#[derive(Debug, Default)]
pub struct FakeBoard {
    pub columns: Vec<FakeColumn>,
    pub comments: Vec<(String, Value)>,
    pub members: Vec<Value>,
    pub requests: Vec<String>,
    pub reject_moves: bool,
    pub require_token: bool,
    next_id: u32,
}

impl FakeBoard {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }

    fn find_task(&mut self, task_id: &str) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(c, col)| {
            col.tasks
                .iter()
                .position(|t| t["id"].as_str() == Some(task_id))
                .map(|i| (c, i))
        })
    }

    pub fn task_ids(&self, column_id: &str) -> Vec<String> {
        self.columns
            .iter()
            .find(|c| c.id == column_id)
            .map(|c| {
                c.tasks
                    .iter()
                    .filter_map(|t| t["id"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn request_count(&self, request: &str) -> usize {
        self.requests.iter().filter(|r| r.as_str() == request).count()
    }
}

pub type Shared = Arc<Mutex<FakeBoard>>;

/// Board with columns todo/inprogress/done; T1, T2 in todo and T3 in done.
/// T2 uses the older wire shapes: numeric-free string id, lowercase
/// priority, and assignee objects.
pub fn sample_board() -> FakeBoard {
    let column = |id: &str, title: &str, position: i32, tasks: Vec<Value>| FakeColumn {
        id: id.to_string(),
        title: title.to_string(),
        position,
        tasks,
    };
    FakeBoard {
        columns: vec![
            column(
                "todo",
                "To Do",
                0,
                vec![
                    json!({"id": "T1", "title": "Write report", "priority": "High", "tags": ["docs"]}),
                    json!({
                        "id": "T2",
                        "title": "Fix login",
                        "description": "session expires",
                        "priority": "low",
                        "assignees": [{"userId": "u1"}, {"userId": "u2"}],
                        "comments": null
                    }),
                ],
            ),
            column("inprogress", "In Progress", 1, vec![]),
            column(
                "done",
                "Done",
                2,
                vec![json!({"id": "T3", "title": "Ship release", "status": "Done"})],
            ),
        ],
        members: vec![
            json!({"userId": "u1", "name": "Ann", "email": "ann@example.com"}),
            json!({"id": "u2", "name": "Bo"}),
        ],
        ..FakeBoard::default()
    }
}

pub struct FakeServer {
    pub addr: SocketAddr,
    pub state: Shared,
}

impl FakeServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn board(&self) -> std::sync::MutexGuard<'_, FakeBoard> {
        self.state.lock().unwrap()
    }
}

/// Bind on an ephemeral port and serve `board` until the runtime shuts down.
pub async fn spawn(board: FakeBoard) -> FakeServer {
    let state: Shared = Arc::new(Mutex::new(board));
    let app = router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    FakeServer { addr, state }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/groups/{group}/board", get(get_board))
        .route("/api/groups/{group}/board/columns", post(create_column))
        .route("/api/groups/{group}/members", get(list_members))
        .route(
            "/api/columns/{column}",
            patch(update_column).delete(delete_column),
        )
        .route("/api/columns/{column}/tasks", post(create_task))
        .route("/api/tasks/{task}", patch(update_task).delete(delete_task))
        .route("/api/tasks/{task}/move", patch(move_task))
        .route("/api/tasks/{task}/assignees", put(replace_assignees))
        .route(
            "/api/tasks/{task}/comments",
            get(list_comments).post(create_comment),
        )
        .route(
            "/api/tasks/{task}/comments/{comment}",
            patch(update_comment).delete(delete_comment),
        )
        .with_state(state)
}

fn authorize(board: &FakeBoard, headers: &HeaderMap) -> Result<(), Response> {
    if !board.require_token {
        return Ok(());
    }
    let expected = format!("Bearer {}", TOKEN);
    match headers.get(header::AUTHORIZATION) {
        Some(value) if value.as_bytes() == expected.as_bytes() => Ok(()),
        _ => Err((StatusCode::UNAUTHORIZED, "missing token").into_response()),
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "not found").into_response()
}

async fn get_board(
    State(state): State<Shared>,
    Path(group): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut board = state.lock().unwrap();
    board.requests.push("GET board".into());
    if let Err(resp) = authorize(&board, &headers) {
        return resp;
    }
    if group != "g1" {
        return not_found();
    }
    let columns: Vec<Value> = board
        .columns
        .iter()
        .map(|c| json!({"id": c.id, "name": c.title, "position": c.position, "tasks": c.tasks}))
        .collect();
    Json(json!({ "columns": columns })).into_response()
}

async fn create_column(
    State(state): State<Shared>,
    Path(_group): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut board = state.lock().unwrap();
    board.requests.push("POST column".into());
    let id = board.next_id("col-");
    let position = board.columns.len() as i32;
    let title = body["title"].as_str().unwrap_or_default().to_string();
    board.columns.push(FakeColumn {
        id: id.clone(),
        title: title.clone(),
        position,
        tasks: Vec::new(),
    });
    (
        StatusCode::CREATED,
        Json(json!({"id": id, "title": title, "position": position})),
    )
        .into_response()
}

async fn update_column(
    State(state): State<Shared>,
    Path(column): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut board = state.lock().unwrap();
    board.requests.push("PATCH column".into());
    let Some(col) = board.columns.iter_mut().find(|c| c.id == column) else {
        return not_found();
    };
    if let Some(title) = body["title"].as_str() {
        col.title = title.to_string();
    }
    Json(json!({"id": col.id, "title": col.title, "position": col.position})).into_response()
}

async fn delete_column(State(state): State<Shared>, Path(column): Path<String>) -> Response {
    let mut board = state.lock().unwrap();
    board.requests.push("DELETE column".into());
    let before = board.columns.len();
    board.columns.retain(|c| c.id != column);
    if board.columns.len() == before {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn create_task(
    State(state): State<Shared>,
    Path(column): Path<String>,
    Json(mut body): Json<Value>,
) -> Response {
    let mut board = state.lock().unwrap();
    board.requests.push("POST task".into());
    let id = board.next_id("srv-");
    let Some(col) = board.columns.iter_mut().find(|c| c.id == column) else {
        return not_found();
    };
    body["id"] = json!(id);
    col.tasks.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_task(
    State(state): State<Shared>,
    Path(task): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut board = state.lock().unwrap();
    board.requests.push("PATCH task".into());
    let Some((c, i)) = board.find_task(&task) else {
        return not_found();
    };
    let stored = &mut board.columns[c].tasks[i];
    if let (Some(stored), Some(changes)) = (stored.as_object_mut(), body.as_object()) {
        for (key, value) in changes {
            stored.insert(key.clone(), value.clone());
        }
    }
    Json(stored.clone()).into_response()
}

async fn delete_task(State(state): State<Shared>, Path(task): Path<String>) -> Response {
    let mut board = state.lock().unwrap();
    board.requests.push("DELETE task".into());
    let Some((c, i)) = board.find_task(&task) else {
        return not_found();
    };
    board.columns[c].tasks.remove(i);
    StatusCode::NO_CONTENT.into_response()
}

async fn move_task(
    State(state): State<Shared>,
    Path(task): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut board = state.lock().unwrap();
    board.requests.push("PATCH move".into());
    if board.reject_moves {
        return (StatusCode::CONFLICT, "column locked").into_response();
    }
    let Some((c, i)) = board.find_task(&task) else {
        return not_found();
    };
    let target = body["columnId"].as_str().unwrap_or_default().to_string();
    let Some(to) = board.columns.iter().position(|col| col.id == target) else {
        return not_found();
    };
    let moved = board.columns[c].tasks.remove(i);
    let tasks = &mut board.columns[to].tasks;
    let position = (body["position"].as_u64().unwrap_or(0) as usize).min(tasks.len());
    tasks.insert(position, moved);
    StatusCode::NO_CONTENT.into_response()
}

async fn replace_assignees(
    State(state): State<Shared>,
    Path(task): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut board = state.lock().unwrap();
    board.requests.push("PUT assignees".into());
    let Some((c, i)) = board.find_task(&task) else {
        return not_found();
    };
    let objects: Vec<Value> = body["assignees"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|id| json!({ "userId": id }))
        .collect();
    let stored = &mut board.columns[c].tasks[i];
    stored["assignees"] = Value::Array(objects);
    Json(stored.clone()).into_response()
}

async fn list_comments(State(state): State<Shared>, Path(task): Path<String>) -> Response {
    let mut board = state.lock().unwrap();
    board.requests.push("GET comments".into());
    if board.find_task(&task).is_none() {
        return not_found();
    }
    let comments: Vec<Value> = board
        .comments
        .iter()
        .filter(|(t, _)| *t == task)
        .map(|(_, c)| c.clone())
        .collect();
    Json(comments).into_response()
}

async fn create_comment(
    State(state): State<Shared>,
    Path(task): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut board = state.lock().unwrap();
    board.requests.push("POST comment".into());
    if board.find_task(&task).is_none() {
        return not_found();
    }
    let id = board.next_id("c-");
    let comment = json!({
        "id": id,
        "text": body["text"],
        "author": "Ann",
        "createdAt": "2024-05-01T10:00:00Z"
    });
    board.comments.push((task, comment.clone()));
    (StatusCode::CREATED, Json(comment)).into_response()
}

async fn update_comment(
    State(state): State<Shared>,
    Path((task, comment)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let mut board = state.lock().unwrap();
    board.requests.push("PATCH comment".into());
    let Some((_, stored)) = board
        .comments
        .iter_mut()
        .find(|(t, c)| *t == task && c["id"].as_str() == Some(comment.as_str()))
    else {
        return not_found();
    };
    stored["text"] = body["text"].clone();
    Json(stored.clone()).into_response()
}

async fn delete_comment(
    State(state): State<Shared>,
    Path((task, comment)): Path<(String, String)>,
) -> Response {
    let mut board = state.lock().unwrap();
    board.requests.push("DELETE comment".into());
    let before = board.comments.len();
    board
        .comments
        .retain(|(t, c)| !(*t == task && c["id"].as_str() == Some(comment.as_str())));
    if board.comments.len() == before {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_members(State(state): State<Shared>, Path(_group): Path<String>) -> Response {
    let mut board = state.lock().unwrap();
    board.requests.push("GET members".into());
    Json(board.members.clone()).into_response()
}
