use serde::Serialize;
use tokio::sync::broadcast;

use super::models::{ColumnMeta, Task};

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyLevel {
    Success,
    Error,
}

/// Events emitted by the board controller for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum BoardEvent {
    BoardLoaded {
        columns: usize,
        tasks: usize,
    },
    TaskCreated {
        column_id: String,
        task: Task,
    },
    TaskUpdated {
        task: Task,
    },
    TaskDeleted {
        task_id: String,
    },
    TaskMoved {
        task_id: String,
        from_column: String,
        to_column: String,
        position: usize,
    },
    ColumnCreated {
        column: ColumnMeta,
    },
    ColumnUpdated {
        column: ColumnMeta,
    },
    ColumnDeleted {
        column_id: String,
    },
    CommentsChanged {
        task_id: String,
        count: usize,
    },
    Notify {
        level: NotifyLevel,
        message: String,
    },
}

impl BoardEvent {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Notify {
            level: NotifyLevel::Error,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::Notify {
            level: NotifyLevel::Success,
            message: message.into(),
        }
    }
}

pub fn emit(tx: &broadcast::Sender<BoardEvent>, event: BoardEvent) {
    let _ = tx.send(event); // no subscribers is fine
}
