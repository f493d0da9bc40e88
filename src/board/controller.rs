//! Board state controller.
//!
//! Owns the authoritative in-memory column map for one mounted board,
//! applies optimistic local changes, persists them through a
//! [`BoardService`], and resynchronises with a full refetch whenever a
//! remote call fails.
//!
//! ## Task lifecycle
//!
//! ```text
//!  create_task ──> local-<uuid> ──ok──> persisted ──update──> persisted
//!                       │                   │
//!                       └──err──> refetch   └──delete──> removed
//! ```
//!
//! ## Locking
//!
//! State sits behind a `std::sync::Mutex` that is only ever held for
//! synchronous work; every `.await` happens with the lock released.
//!
//! ## Stale responses
//!
//! Each [`BoardController::fetch_board`] takes a generation number. A
//! response is applied only if no newer fetch has started since.

use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::events::{BoardEvent, emit};
use super::filter::{FilterCriteria, filter_with};
use super::lookup::{DEFAULT_COLUMNS, locate_task};
use super::models::{ColumnMap, ColumnMeta, Comment, Member, Task};
use super::moves::{move_task_across_columns, reorder_within_column};
use crate::errors::ServiceError;
use crate::service::{BoardService, ColumnUpdate, GroupService, MoveTask, NewColumn, NewTask, TaskUpdate};

/// Id prefix for tasks that exist only locally, awaiting the server's id.
pub const LOCAL_ID_PREFIX: &str = "local-";

pub fn is_local_id(task_id: &str) -> bool {
    task_id.starts_with(LOCAL_ID_PREFIX)
}

/// Capacity of the event broadcast channel.
const EVENT_CAPACITY: usize = 256;

/// Board state at a point in time.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    pub columns: ColumnMap,
    pub meta: Vec<ColumnMeta>,
    pub filter: FilterCriteria,
    pub members: Vec<Member>,
    pub loading: bool,
    drag: Option<DragSession>,
}

/// Bookkeeping for one drag gesture.
#[derive(Debug, Clone)]
struct DragSession {
    task_id: String,
    origin: Option<(String, usize)>,
    before: ColumnMap,
}

impl BoardState {
    /// Column ids in display order; the fixed four-column set when the
    /// board carries no metadata.
    pub fn column_ids(&self) -> Vec<String> {
        if self.meta.is_empty() {
            DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect()
        } else {
            self.meta.iter().map(|m| m.id.clone()).collect()
        }
    }
}

fn into_owned<T: Clone>(cow: Cow<'_, T>) -> Option<T> {
    match cow {
        Cow::Owned(value) => Some(value),
        Cow::Borrowed(_) => None,
    }
}

pub struct BoardController {
    service: Arc<dyn BoardService>,
    groups: Option<Arc<dyn GroupService>>,
    group_id: Option<String>,
    state: Mutex<BoardState>,
    generation: AtomicU64,
    events: broadcast::Sender<BoardEvent>,
}

impl BoardController {
    pub fn new(service: Arc<dyn BoardService>, group_id: Option<String>) -> Self {
        let (events, _rx) = broadcast::channel(EVENT_CAPACITY);
        Self {
            service,
            groups: None,
            group_id: group_id.filter(|g| !g.is_empty()),
            state: Mutex::new(BoardState::default()),
            generation: AtomicU64::new(0),
            events,
        }
    }

    pub fn with_group_service(mut self, groups: Arc<dyn GroupService>) -> Self {
        self.groups = Some(groups);
        self
    }

    /// Seed local state without a fetch, e.g. for the fixed-column board.
    pub fn with_columns(self, columns: ColumnMap, meta: Vec<ColumnMeta>) -> Self {
        {
            let mut state = self.lock();
            state.columns = columns;
            state.meta = meta;
        }
        self
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.events.subscribe()
    }

    pub fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    // ── Read side ─────────────────────────────────────────────────────

    pub fn snapshot(&self) -> BoardState {
        self.lock().clone()
    }

    pub fn columns(&self) -> ColumnMap {
        self.lock().columns.clone()
    }

    pub fn column_meta(&self) -> Vec<ColumnMeta> {
        self.lock().meta.clone()
    }

    pub fn column_ids(&self) -> Vec<String> {
        self.lock().column_ids()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn members(&self) -> Vec<Member> {
        self.lock().members.clone()
    }

    pub fn task(&self, task_id: &str) -> Option<Task> {
        self.lock().columns.find_task(task_id).cloned()
    }

    pub fn column_of(&self, task_id: &str) -> Option<String> {
        let state = self.lock();
        let ids = state.column_ids();
        locate_task(&state.columns, task_id, &ids).map(|(col, _)| col.to_string())
    }

    pub fn task_count(&self) -> usize {
        self.lock().columns.task_count()
    }

    // ── Filters ───────────────────────────────────────────────────────

    pub fn filter(&self) -> FilterCriteria {
        self.lock().filter.clone()
    }

    pub fn set_filter(&self, filter: FilterCriteria) {
        self.lock().filter = filter;
    }

    pub fn set_search(&self, search: impl Into<String>) {
        self.lock().filter.search = search.into();
    }

    pub fn set_status_filter(&self, status: impl Into<String>) {
        self.lock().filter.status = status.into();
    }

    pub fn set_priority_filter(&self, priority: impl Into<String>) {
        self.lock().filter.priority = priority.into();
    }

    pub fn clear_filters(&self) {
        self.lock().filter = FilterCriteria::default();
    }

    /// Columns narrowed by the current filter state.
    pub fn filtered_columns(&self) -> ColumnMap {
        let state = self.lock();
        filter_with(&state.columns, &state.filter, &state.column_ids())
    }

    // ── Fetch / reconcile ─────────────────────────────────────────────

    /// Load the board from the server. Returns true if the response was applied.
    pub async fn fetch_board(&self) -> bool {
        let Some(group_id) = self.group_id.as_deref() else {
            debug!("no group selected; skipping board fetch");
            return false;
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock().loading = true;

        let result = self.service.get_board(group_id).await;
        let is_latest = || self.generation.load(Ordering::SeqCst) == generation;

        match result {
            Ok(snapshot) => {
                let (meta, columns) = snapshot.into_parts();
                let loaded = BoardEvent::BoardLoaded {
                    columns: meta.len(),
                    tasks: columns.task_count(),
                };
                {
                    let mut state = self.lock();
                    if !is_latest() {
                        debug!(generation, "discarding stale board response");
                        return false;
                    }
                    state.meta = meta;
                    state.columns = columns;
                    state.loading = false;
                    state.drag = None;
                }
                info!(group_id, generation, "board loaded");
                emit(&self.events, loaded);
                true
            }
            Err(e) => {
                warn!(group_id, error = %e, "failed to fetch board");
                {
                    let mut state = self.lock();
                    if is_latest() {
                        state.loading = false;
                    }
                }
                emit(&self.events, BoardEvent::error("Could not load the board"));
                false
            }
        }
    }

    /// Log a failed mutation, notify, and resynchronise with the server.
    async fn resync_after(&self, action: &str, err: ServiceError) {
        warn!(action, error = %err, "board mutation failed; refetching");
        emit(&self.events, BoardEvent::error(format!("Failed to {}", action)));
        self.fetch_board().await;
    }

    // ── Columns ───────────────────────────────────────────────────────

    pub async fn create_column(&self, title: &str) -> Option<ColumnMeta> {
        let title = title.trim();
        let Some(group_id) = self.group_id.as_deref() else {
            return None;
        };
        if title.is_empty() {
            return None;
        }

        let request = NewColumn {
            title: title.to_string(),
        };
        match self.service.create_column(group_id, &request).await {
            Ok(mut column) => {
                {
                    let mut state = self.lock();
                    // New columns go last; a missing position decodes as 0.
                    if let Some(last) = state.meta.iter().map(|m| m.position).max() {
                        if column.position <= last {
                            column.position = last + 1;
                        }
                    }
                    state.columns.insert(column.id.clone(), Vec::new());
                    state.meta.push(column.clone());
                }
                emit(
                    &self.events,
                    BoardEvent::ColumnCreated {
                        column: column.clone(),
                    },
                );
                emit(&self.events, BoardEvent::success("Column created"));
                Some(column)
            }
            Err(e) => {
                self.resync_after("create column", e).await;
                None
            }
        }
    }

    pub async fn update_column(&self, column_id: &str, title: &str) -> Option<ColumnMeta> {
        let title = title.trim();
        if column_id.is_empty() || title.is_empty() {
            return None;
        }

        {
            let mut state = self.lock();
            if let Some(meta) = state.meta.iter_mut().find(|m| m.id == column_id) {
                meta.title = title.to_string();
            }
        }

        let update = ColumnUpdate {
            title: Some(title.to_string()),
            position: None,
        };
        match self.service.update_column(column_id, &update).await {
            Ok(column) => {
                {
                    let mut state = self.lock();
                    if let Some(meta) = state.meta.iter_mut().find(|m| m.id == column.id) {
                        *meta = column.clone();
                    }
                }
                emit(
                    &self.events,
                    BoardEvent::ColumnUpdated {
                        column: column.clone(),
                    },
                );
                emit(&self.events, BoardEvent::success("Column renamed"));
                Some(column)
            }
            Err(e) => {
                self.resync_after("update column", e).await;
                None
            }
        }
    }

    pub async fn delete_column(&self, column_id: &str) -> bool {
        if column_id.is_empty() {
            return false;
        }

        {
            let mut state = self.lock();
            state.meta.retain(|m| m.id != column_id);
            state.columns.remove(column_id);
        }

        match self.service.delete_column(column_id).await {
            Ok(()) => {
                emit(
                    &self.events,
                    BoardEvent::ColumnDeleted {
                        column_id: column_id.to_string(),
                    },
                );
                emit(&self.events, BoardEvent::success("Column deleted"));
                true
            }
            Err(e) => {
                self.resync_after("delete column", e).await;
                false
            }
        }
    }

    // ── Tasks ─────────────────────────────────────────────────────────

    /// Create a task at the end of `column_id`. A local placeholder shows
    /// immediately and is swapped for the server's copy on success.
    pub async fn create_task(&self, column_id: &str, new_task: NewTask) -> Option<Task> {
        if column_id.is_empty() || new_task.title.trim().is_empty() {
            return None;
        }

        let local_id = format!("{}{}", LOCAL_ID_PREFIX, uuid::Uuid::new_v4());
        self.lock()
            .columns
            .push_task(column_id, new_task.to_local_task(local_id.clone()));

        match self.service.create_task(column_id, &new_task).await {
            Ok(task) => {
                {
                    let mut state = self.lock();
                    if !state.columns.replace_task(&local_id, task.clone()) {
                        state.columns.push_task(column_id, task.clone());
                    }
                }
                debug!(task_id = %task.id, column_id, "task created");
                emit(
                    &self.events,
                    BoardEvent::TaskCreated {
                        column_id: column_id.to_string(),
                        task: task.clone(),
                    },
                );
                emit(&self.events, BoardEvent::success("Task created"));
                Some(task)
            }
            Err(e) => {
                self.lock().columns.remove_task(&local_id);
                self.resync_after("create task", e).await;
                None
            }
        }
    }

    pub async fn update_task(&self, task_id: &str, update: TaskUpdate) -> Option<Task> {
        if task_id.is_empty() || update.is_empty() {
            return None;
        }

        {
            let mut state = self.lock();
            if let Some(next) = state.columns.find_task(task_id).map(|t| update.apply_to(t)) {
                state.columns.replace_task(task_id, next);
            }
        }

        match self.service.update_task(task_id, &update).await {
            Ok(task) => {
                let updated = self.apply_server_task(task_id, task);
                emit(&self.events, BoardEvent::success("Task updated"));
                updated
            }
            Err(e) => {
                self.resync_after("update task", e).await;
                None
            }
        }
    }

    pub async fn delete_task(&self, task_id: &str) -> bool {
        if task_id.is_empty() {
            return false;
        }

        self.lock().columns.remove_task(task_id);

        match self.service.delete_task(task_id).await {
            Ok(()) => {
                emit(
                    &self.events,
                    BoardEvent::TaskDeleted {
                        task_id: task_id.to_string(),
                    },
                );
                emit(&self.events, BoardEvent::success("Task deleted"));
                true
            }
            Err(e) => {
                self.resync_after("delete task", e).await;
                false
            }
        }
    }

    /// Replace the task's assignee list. Duplicates are dropped, first
    /// occurrence wins.
    pub async fn update_assignees(&self, task_id: &str, assignees: Vec<String>) -> Option<Task> {
        if task_id.is_empty() {
            return None;
        }

        let mut unique: Vec<String> = Vec::with_capacity(assignees.len());
        for a in assignees {
            let a = a.trim().to_string();
            if !a.is_empty() && !unique.contains(&a) {
                unique.push(a);
            }
        }

        {
            let mut state = self.lock();
            if let Some(mut next) = state.columns.find_task(task_id).cloned() {
                next.assignees = unique.clone();
                state.columns.replace_task(task_id, next);
            }
        }

        match self.service.replace_assignees(task_id, &unique).await {
            Ok(task) => self.apply_server_task(task_id, task),
            Err(e) => {
                self.resync_after("update assignees", e).await;
                None
            }
        }
    }

    fn apply_server_task(&self, task_id: &str, task: Task) -> Option<Task> {
        self.lock().columns.replace_task(task_id, task.clone());
        emit(&self.events, BoardEvent::TaskUpdated { task: task.clone() });
        Some(task)
    }

    // ── Comments ──────────────────────────────────────────────────────

    /// Load a task's comments and store them on the local task.
    pub async fn fetch_comments(&self, task_id: &str) -> Option<Vec<Comment>> {
        if task_id.is_empty() {
            return None;
        }
        match self.service.list_comments(task_id).await {
            Ok(comments) => {
                self.set_comments(task_id, comments.clone());
                Some(comments)
            }
            Err(e) => {
                warn!(task_id, error = %e, "failed to fetch comments");
                emit(&self.events, BoardEvent::error("Could not load comments"));
                None
            }
        }
    }

    pub async fn add_comment(&self, task_id: &str, text: &str) -> Option<Comment> {
        let text = text.trim();
        if task_id.is_empty() || text.is_empty() {
            return None;
        }
        match self.service.create_comment(task_id, text).await {
            Ok(comment) => {
                self.edit_comments(task_id, |comments| comments.push(comment.clone()));
                emit(&self.events, BoardEvent::success("Comment added"));
                Some(comment)
            }
            Err(e) => {
                self.resync_after("add comment", e).await;
                None
            }
        }
    }

    pub async fn update_comment(&self, task_id: &str, comment_id: &str, text: &str) -> Option<Comment> {
        let text = text.trim();
        if task_id.is_empty() || comment_id.is_empty() || text.is_empty() {
            return None;
        }
        match self.service.update_comment(task_id, comment_id, text).await {
            Ok(comment) => {
                self.edit_comments(task_id, |comments| {
                    if let Some(c) = comments
                        .iter_mut()
                        .find(|c| c.id.as_deref() == Some(comment_id))
                    {
                        *c = comment.clone();
                    }
                });
                Some(comment)
            }
            Err(e) => {
                self.resync_after("update comment", e).await;
                None
            }
        }
    }

    pub async fn delete_comment(&self, task_id: &str, comment_id: &str) -> bool {
        if task_id.is_empty() || comment_id.is_empty() {
            return false;
        }
        match self.service.delete_comment(task_id, comment_id).await {
            Ok(()) => {
                self.edit_comments(task_id, |comments| {
                    comments.retain(|c| c.id.as_deref() != Some(comment_id))
                });
                true
            }
            Err(e) => {
                self.resync_after("delete comment", e).await;
                false
            }
        }
    }

    fn set_comments(&self, task_id: &str, comments: Vec<Comment>) {
        self.edit_comments(task_id, move |existing| *existing = comments);
    }

    fn edit_comments(&self, task_id: &str, edit: impl FnOnce(&mut Vec<Comment>)) {
        let count = {
            let mut state = self.lock();
            let Some(mut task) = state.columns.find_task(task_id).cloned() else {
                return;
            };
            edit(&mut task.comments);
            let count = task.comments.len();
            state.columns.replace_task(task_id, task);
            count
        };
        emit(
            &self.events,
            BoardEvent::CommentsChanged {
                task_id: task_id.to_string(),
                count,
            },
        );
    }

    // ── Members ───────────────────────────────────────────────────────

    pub async fn fetch_members(&self) -> Vec<Member> {
        let (Some(groups), Some(group_id)) = (self.groups.as_ref(), self.group_id.as_deref()) else {
            return Vec::new();
        };
        match groups.list_members(group_id).await {
            Ok(members) => {
                self.lock().members = members.clone();
                members
            }
            Err(e) => {
                warn!(group_id, error = %e, "failed to fetch group members");
                Vec::new()
            }
        }
    }

    // ── Drag and drop ─────────────────────────────────────────────────

    /// Remember where the dragged task started so a cancelled gesture can
    /// be undone and the drop can report its origin.
    pub fn drag_start(&self, active_id: &str) {
        let mut state = self.lock();
        let ids = state.column_ids();
        let origin = locate_task(&state.columns, active_id, &ids)
            .map(|(col, idx)| (col.to_string(), idx));
        let before = state.columns.clone();
        state.drag = Some(DragSession {
            task_id: active_id.to_string(),
            origin,
            before,
        });
    }

    /// Project a hover over another column. Purely local; returns true if
    /// the board changed.
    pub fn drag_over(&self, active_id: &str, over_id: Option<&str>) -> bool {
        let Some(over_id) = over_id else {
            return false;
        };
        let mut state = self.lock();
        let ids = state.column_ids();
        match into_owned(move_task_across_columns(&state.columns, active_id, over_id, &ids)) {
            Some(next) => {
                state.columns = next;
                true
            }
            None => false,
        }
    }

    /// Abandon the current gesture and restore the pre-drag board.
    pub fn drag_cancel(&self) {
        let mut state = self.lock();
        if let Some(session) = state.drag.take() {
            state.columns = session.before;
        }
    }

    /// Finish a drag: apply the final projection, then persist the task's
    /// new column and position. Returns true if a move was persisted.
    pub async fn drag_end(&self, active_id: &str, over_id: Option<&str>) -> bool {
        let Some(over_id) = over_id else {
            self.drag_cancel();
            return false;
        };

        let (from_column, to_column, position) = {
            let mut state = self.lock();
            let ids = state.column_ids();
            // Without a live session the board as it stands is the origin.
            let origin = match state.drag.take().filter(|s| s.task_id == active_id) {
                Some(session) => session.origin,
                None => locate_task(&state.columns, active_id, &ids)
                    .map(|(col, idx)| (col.to_string(), idx)),
            };

            if let Some(next) =
                into_owned(move_task_across_columns(&state.columns, active_id, over_id, &ids))
            {
                state.columns = next;
            }
            if let Some(next) =
                into_owned(reorder_within_column(&state.columns, active_id, over_id, &ids))
            {
                state.columns = next;
            }

            let Some((column, position)) = locate_task(&state.columns, active_id, &ids)
                .map(|(col, idx)| (col.to_string(), idx))
            else {
                return false;
            };
            if origin.as_ref() == Some(&(column.clone(), position)) {
                return false;
            }
            let from_column = origin.map(|(col, _)| col).unwrap_or_else(|| column.clone());
            (from_column, column, position)
        };

        if is_local_id(active_id) {
            debug!(task_id = active_id, "task not yet persisted; move kept local");
            return false;
        }

        emit(
            &self.events,
            BoardEvent::TaskMoved {
                task_id: active_id.to_string(),
                from_column: from_column.clone(),
                to_column: to_column.clone(),
                position,
            },
        );

        let target = MoveTask {
            column_id: to_column.clone(),
            position,
        };
        match self.service.move_task(active_id, &target).await {
            Ok(()) => {
                debug!(task_id = active_id, %from_column, %to_column, position, "task move persisted");
                true
            }
            Err(e) => {
                self.resync_after("move task", e).await;
                false
            }
        }
    }
}
