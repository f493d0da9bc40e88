//! Remote collaborators of the board controller.
//!
//! The controller only ever sees these traits; `HttpBoardService` is the
//! production implementation and tests substitute an in-memory double.

pub mod http;
#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::board::models::{ColumnMap, ColumnMeta, Comment, Member, Priority, Task, de};
use crate::errors::ServiceError;

pub use http::HttpBoardService;

/// Board persistence: columns, tasks, assignees and comments.
#[async_trait]
pub trait BoardService: Send + Sync {
    async fn get_board(&self, group_id: &str) -> Result<BoardSnapshot, ServiceError>;

    async fn create_column(
        &self,
        group_id: &str,
        column: &NewColumn,
    ) -> Result<ColumnMeta, ServiceError>;

    async fn update_column(
        &self,
        column_id: &str,
        update: &ColumnUpdate,
    ) -> Result<ColumnMeta, ServiceError>;

    async fn delete_column(&self, column_id: &str) -> Result<(), ServiceError>;

    async fn create_task(&self, column_id: &str, task: &NewTask) -> Result<Task, ServiceError>;

    async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> Result<Task, ServiceError>;

    async fn delete_task(&self, task_id: &str) -> Result<(), ServiceError>;

    async fn move_task(&self, task_id: &str, target: &MoveTask) -> Result<(), ServiceError>;

    async fn replace_assignees(
        &self,
        task_id: &str,
        assignees: &[String],
    ) -> Result<Task, ServiceError>;

    async fn list_comments(&self, task_id: &str) -> Result<Vec<Comment>, ServiceError>;

    async fn create_comment(&self, task_id: &str, text: &str) -> Result<Comment, ServiceError>;

    async fn update_comment(
        &self,
        task_id: &str,
        comment_id: &str,
        text: &str,
    ) -> Result<Comment, ServiceError>;

    async fn delete_comment(&self, task_id: &str, comment_id: &str) -> Result<(), ServiceError>;
}

/// Group membership, used to offer assignees.
#[async_trait]
pub trait GroupService: Send + Sync {
    async fn list_members(&self, group_id: &str) -> Result<Vec<Member>, ServiceError>;
}

// ── Wire types ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    #[serde(default)]
    pub columns: Vec<ColumnSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSnapshot {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default, deserialize_with = "de::vec_or_null")]
    pub tasks: Vec<Task>,
}

impl BoardSnapshot {
    /// Split into column metadata (ordered by position) and the task map.
    pub fn into_parts(self) -> (Vec<ColumnMeta>, ColumnMap) {
        let mut columns = self.columns;
        columns.sort_by_key(|c| c.position);
        let mut meta = Vec::with_capacity(columns.len());
        let mut map = ColumnMap::new();
        for col in columns {
            meta.push(ColumnMeta {
                id: col.id.clone(),
                title: col.title,
                position: col.position,
            });
            map.insert(col.id, col.tasks);
        }
        (meta, map)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewColumn {
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_points: Option<u32>,
    pub assignees: Vec<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Local placeholder shown until the server assigns a real id.
    pub(crate) fn to_local_task(&self, id: String) -> Task {
        Task {
            id,
            title: self.title.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
            priority: self.priority,
            status: self.status.clone(),
            due_date: self.due_date.clone(),
            story_points: self.story_points,
            assignees: self.assignees.clone(),
            comments: Vec::new(),
        }
    }
}

/// Partial task update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_points: Option<u32>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the update to a local copy of the task.
    pub fn apply_to(&self, task: &Task) -> Task {
        let mut next = task.clone();
        if let Some(title) = &self.title {
            next.title = title.clone();
        }
        if let Some(description) = &self.description {
            next.description = description.clone();
        }
        if let Some(tags) = &self.tags {
            next.tags = tags.clone();
        }
        if let Some(priority) = self.priority {
            next.priority = Some(priority);
        }
        if let Some(status) = &self.status {
            next.status = Some(status.clone());
        }
        if let Some(due_date) = &self.due_date {
            next.due_date = Some(due_date.clone());
        }
        if let Some(points) = self.story_points {
            next.story_points = Some(points);
        }
        next
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTask {
    pub column_id: String,
    pub position: usize,
}
