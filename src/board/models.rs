use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};

pub type TaskId = String;
pub type ColumnId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

/// A comment attached to exactly one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default, deserialize_with = "de::optional_id")]
    pub id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub author: String,
    /// Display label as sent by the server ("2h ago", "2026-03-01 10:12").
    #[serde(default, alias = "createdAt")]
    pub timestamp: String,
}

/// The unit of work tracked on the board.
///
/// A task belongs to exactly one column; membership is expressed by the
/// [`ColumnMap`] that holds it, never by a field on the task itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(deserialize_with = "de::id")]
    pub id: TaskId,
    pub title: String,
    #[serde(default, deserialize_with = "de::string_or_null")]
    pub description: String,
    #[serde(default, deserialize_with = "de::vec_or_null")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "de::priority")]
    pub priority: Option<Priority>,
    /// Raw status string; formats vary between API versions ("To Do", "to_do", "todo").
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub story_points: Option<u32>,
    /// Assignee identifiers, normalised from either plain strings or `{ "userId": .. }` objects.
    #[serde(default, deserialize_with = "de::assignees")]
    pub assignees: Vec<String>,
    #[serde(default, deserialize_with = "de::vec_or_null")]
    pub comments: Vec<Comment>,
}

impl Task {
    /// Minimal task with only an id and a title.
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            priority: None,
            status: None,
            due_date: None,
            story_points: None,
            assignees: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Column metadata for boards whose columns are created dynamically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    #[serde(deserialize_with = "de::id")]
    pub id: ColumnId,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub position: i32,
}

/// A member of the group owning the board, offered for assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(alias = "id", alias = "user_id", deserialize_with = "de::id")]
    pub user_id: String,
    #[serde(default, alias = "fullName")]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Column identifier → ordered task list.
///
/// Lists are shared behind `Arc` so that a projection which only touches two
/// columns leaves every other entry pointer-equal to its input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMap {
    columns: HashMap<ColumnId, Arc<Vec<Task>>>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_columns<I, K>(columns: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<Task>)>,
        K: Into<ColumnId>,
    {
        Self {
            columns: columns
                .into_iter()
                .map(|(id, tasks)| (id.into(), Arc::new(tasks)))
                .collect(),
        }
    }

    pub fn get(&self, column_id: &str) -> Option<&Arc<Vec<Task>>> {
        self.columns.get(column_id)
    }

    /// Tasks of a column in display order; a missing column reads as empty.
    pub fn tasks(&self, column_id: &str) -> &[Task] {
        self.columns
            .get(column_id)
            .map(|tasks| tasks.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains_column(&self, column_id: &str) -> bool {
        self.columns.contains_key(column_id)
    }

    pub fn insert(&mut self, column_id: impl Into<ColumnId>, tasks: Vec<Task>) {
        self.columns.insert(column_id.into(), Arc::new(tasks));
    }

    pub fn insert_shared(&mut self, column_id: impl Into<ColumnId>, tasks: Arc<Vec<Task>>) {
        self.columns.insert(column_id.into(), tasks);
    }

    pub fn remove(&mut self, column_id: &str) -> Option<Arc<Vec<Task>>> {
        self.columns.remove(column_id)
    }

    pub fn column_ids(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Task])> {
        self.columns
            .iter()
            .map(|(id, tasks)| (id.as_str(), tasks.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn task_count(&self) -> usize {
        self.columns.values().map(|tasks| tasks.len()).sum()
    }

    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.columns
            .values()
            .flat_map(|tasks| tasks.iter())
            .find(|t| t.id == task_id)
    }

    /// Replace the task `task_id` in place, wherever it lives. The
    /// replacement may carry a different id. Returns false if absent.
    pub fn replace_task(&mut self, task_id: &str, task: Task) -> bool {
        for tasks in self.columns.values_mut() {
            if let Some(pos) = tasks.iter().position(|t| t.id == task_id) {
                Arc::make_mut(tasks)[pos] = task;
                return true;
            }
        }
        false
    }

    /// Remove a task wherever it lives and return it.
    pub fn remove_task(&mut self, task_id: &str) -> Option<Task> {
        for tasks in self.columns.values_mut() {
            if let Some(pos) = tasks.iter().position(|t| t.id == task_id) {
                return Some(Arc::make_mut(tasks).remove(pos));
            }
        }
        None
    }

    /// Append a task to the end of a column, creating the column if needed.
    pub fn push_task(&mut self, column_id: &str, task: Task) {
        let tasks = self
            .columns
            .entry(column_id.to_string())
            .or_insert_with(|| Arc::new(Vec::new()));
        Arc::make_mut(tasks).push(task);
    }
}

/// Deserialisation helpers that normalise loosely-typed API payloads once,
/// at the boundary.
pub(crate) mod de {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Str(String),
        Num(i64),
    }

    impl From<IdRepr> for String {
        fn from(repr: IdRepr) -> Self {
            match repr {
                IdRepr::Str(s) => s,
                IdRepr::Num(n) => n.to_string(),
            }
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AssigneeRepr {
        Plain(IdRepr),
        User {
            #[serde(rename = "userId", alias = "user_id", alias = "id")]
            user_id: IdRepr,
        },
    }

    pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        IdRepr::deserialize(deserializer).map(String::from)
    }

    pub fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<IdRepr>::deserialize(deserializer)?.map(String::from))
    }

    pub fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
    }

    pub fn vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// Unknown priority strings read as "no priority" instead of rejecting the board.
    pub fn priority<'de, D>(deserializer: D) -> Result<Option<Priority>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.and_then(|s| s.parse().ok()))
    }

    pub fn assignees<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Vec<AssigneeRepr>>::deserialize(deserializer)?.unwrap_or_default();
        Ok(raw
            .into_iter()
            .map(|a| match a {
                AssigneeRepr::Plain(id) => id.into(),
                AssigneeRepr::User { user_id } => user_id.into(),
            })
            .collect())
    }
}
