//! In-memory test double for [`BoardService`] / [`GroupService`].

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{
    BoardService, BoardSnapshot, ColumnSnapshot, ColumnUpdate, GroupService, MoveTask, NewColumn,
    NewTask, TaskUpdate,
};
use crate::board::models::{ColumnMeta, Comment, Member, Task};
use crate::errors::ServiceError;

#[derive(Default)]
struct Inner {
    board: BoardSnapshot,
    members: Vec<Member>,
    calls: Vec<String>,
    failing: HashSet<&'static str>,
    next_id: u32,
    board_gate: Option<Arc<Notify>>,
    omit_column_positions: bool,
}

/// Records every call by name; any call name added via `fail_on` returns a
/// 500 instead of touching the in-memory board.
#[derive(Default)]
pub struct MockBoardService {
    inner: Mutex<Inner>,
}

impl MockBoardService {
    pub fn with_board(columns: Vec<(&str, Vec<Task>)>) -> Self {
        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(i, (id, tasks))| ColumnSnapshot {
                id: id.to_string(),
                title: id.to_string(),
                position: i as i32,
                tasks,
            })
            .collect();
        let mock = Self::default();
        mock.lock().board = BoardSnapshot { columns };
        mock
    }

    pub fn with_members(self, members: Vec<Member>) -> Self {
        self.lock().members = members;
        self
    }

    /// Answer `create_column` without a position, as older servers do.
    pub fn without_column_positions(self) -> Self {
        self.lock().omit_column_positions = true;
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Make the next `get_board` capture its response, then wait until the
    /// returned handle is notified before answering.
    pub fn hold_next_board(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.lock().board_gate = Some(gate.clone());
        gate
    }

    pub fn fail_on(&self, call: &'static str) {
        self.lock().failing.insert(call);
    }

    pub fn recover(&self, call: &'static str) {
        self.lock().failing.remove(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, call: &str) -> usize {
        self.lock().calls.iter().filter(|c| *c == call).count()
    }

    /// Server-side task list of a column.
    pub fn server_tasks(&self, column_id: &str) -> Vec<Task> {
        self.lock()
            .board
            .columns
            .iter()
            .find(|c| c.id == column_id)
            .map(|c| c.tasks.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: &'static str) -> Result<std::sync::MutexGuard<'_, Inner>, ServiceError> {
        let mut inner = self.lock();
        inner.calls.push(call.to_string());
        if inner.failing.contains(call) {
            return Err(ServiceError::Status {
                method: "MOCK".to_string(),
                url: call.to_string(),
                status: 500,
                body: "injected failure".to_string(),
            });
        }
        Ok(inner)
    }
}

impl Inner {
    fn task_mut(&mut self, task_id: &str) -> Result<&mut Task, ServiceError> {
        self.board
            .columns
            .iter_mut()
            .flat_map(|c| c.tasks.iter_mut())
            .find(|t| t.id == task_id)
            .ok_or_else(|| ServiceError::NotFound(format!("task {}", task_id)))
    }

    fn take_task(&mut self, task_id: &str) -> Result<Task, ServiceError> {
        for col in &mut self.board.columns {
            if let Some(pos) = col.tasks.iter().position(|t| t.id == task_id) {
                return Ok(col.tasks.remove(pos));
            }
        }
        Err(ServiceError::NotFound(format!("task {}", task_id)))
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }
}

#[async_trait]
impl BoardService for MockBoardService {
    async fn get_board(&self, _group_id: &str) -> Result<BoardSnapshot, ServiceError> {
        let (board, gate) = {
            let mut inner = self.record("get_board")?;
            let gate = inner.board_gate.take();
            (inner.board.clone(), gate)
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(board)
    }

    async fn create_column(
        &self,
        _group_id: &str,
        column: &NewColumn,
    ) -> Result<ColumnMeta, ServiceError> {
        let mut inner = self.record("create_column")?;
        let id = inner.fresh_id("col-");
        let position = inner.board.columns.len() as i32;
        inner.board.columns.push(ColumnSnapshot {
            id: id.clone(),
            title: column.title.clone(),
            position,
            tasks: Vec::new(),
        });
        Ok(ColumnMeta {
            id,
            title: column.title.clone(),
            position: if inner.omit_column_positions { 0 } else { position },
        })
    }

    async fn update_column(
        &self,
        column_id: &str,
        update: &ColumnUpdate,
    ) -> Result<ColumnMeta, ServiceError> {
        let mut inner = self.record("update_column")?;
        let col = inner
            .board
            .columns
            .iter_mut()
            .find(|c| c.id == column_id)
            .ok_or_else(|| ServiceError::NotFound(format!("column {}", column_id)))?;
        if let Some(title) = &update.title {
            col.title = title.clone();
        }
        if let Some(position) = update.position {
            col.position = position;
        }
        Ok(ColumnMeta {
            id: col.id.clone(),
            title: col.title.clone(),
            position: col.position,
        })
    }

    async fn delete_column(&self, column_id: &str) -> Result<(), ServiceError> {
        let mut inner = self.record("delete_column")?;
        inner.board.columns.retain(|c| c.id != column_id);
        Ok(())
    }

    async fn create_task(&self, column_id: &str, task: &NewTask) -> Result<Task, ServiceError> {
        let mut inner = self.record("create_task")?;
        let id = inner.fresh_id("task-");
        let created = task.to_local_task(id);
        let col = inner
            .board
            .columns
            .iter_mut()
            .find(|c| c.id == column_id)
            .ok_or_else(|| ServiceError::NotFound(format!("column {}", column_id)))?;
        col.tasks.push(created.clone());
        Ok(created)
    }

    async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> Result<Task, ServiceError> {
        let mut inner = self.record("update_task")?;
        let task = inner.task_mut(task_id)?;
        *task = update.apply_to(task);
        Ok(task.clone())
    }

    async fn delete_task(&self, task_id: &str) -> Result<(), ServiceError> {
        let mut inner = self.record("delete_task")?;
        inner.take_task(task_id).map(|_| ())
    }

    async fn move_task(&self, task_id: &str, target: &MoveTask) -> Result<(), ServiceError> {
        let mut inner = self.record("move_task")?;
        let task = inner.take_task(task_id)?;
        let col = inner
            .board
            .columns
            .iter_mut()
            .find(|c| c.id == target.column_id)
            .ok_or_else(|| ServiceError::NotFound(format!("column {}", target.column_id)))?;
        let position = target.position.min(col.tasks.len());
        col.tasks.insert(position, task);
        Ok(())
    }

    async fn replace_assignees(
        &self,
        task_id: &str,
        assignees: &[String],
    ) -> Result<Task, ServiceError> {
        let mut inner = self.record("replace_assignees")?;
        let task = inner.task_mut(task_id)?;
        task.assignees = assignees.to_vec();
        Ok(task.clone())
    }

    async fn list_comments(&self, task_id: &str) -> Result<Vec<Comment>, ServiceError> {
        let mut inner = self.record("list_comments")?;
        Ok(inner.task_mut(task_id)?.comments.clone())
    }

    async fn create_comment(&self, task_id: &str, text: &str) -> Result<Comment, ServiceError> {
        let mut inner = self.record("create_comment")?;
        let id = inner.fresh_id("c-");
        let comment = Comment {
            id: Some(id),
            text: text.to_string(),
            author: "mock".to_string(),
            timestamp: "just now".to_string(),
        };
        inner.task_mut(task_id)?.comments.push(comment.clone());
        Ok(comment)
    }

    async fn update_comment(
        &self,
        task_id: &str,
        comment_id: &str,
        text: &str,
    ) -> Result<Comment, ServiceError> {
        let mut inner = self.record("update_comment")?;
        let comment = inner
            .task_mut(task_id)?
            .comments
            .iter_mut()
            .find(|c| c.id.as_deref() == Some(comment_id))
            .ok_or_else(|| ServiceError::NotFound(format!("comment {}", comment_id)))?;
        comment.text = text.to_string();
        Ok(comment.clone())
    }

    async fn delete_comment(&self, task_id: &str, comment_id: &str) -> Result<(), ServiceError> {
        let mut inner = self.record("delete_comment")?;
        inner
            .task_mut(task_id)?
            .comments
            .retain(|c| c.id.as_deref() != Some(comment_id));
        Ok(())
    }
}

#[async_trait]
impl GroupService for MockBoardService {
    async fn list_members(&self, _group_id: &str) -> Result<Vec<Member>, ServiceError> {
        Ok(self.record("list_members")?.members.clone())
    }
}
