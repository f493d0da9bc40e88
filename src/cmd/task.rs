//! Task-level commands — `taskboard add-task | edit-task | delete-task |
//! comment | comments | assign`.

use anyhow::{Result, bail};
use console::style;

use taskboard::board::{BoardController, Priority};
use taskboard::errors::BoardError;
use taskboard::service::{NewTask, TaskUpdate};

use super::board::format_task_line;
use super::drain_notifications;

/// Task fields as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct TaskFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub due: Option<String>,
    pub points: Option<u32>,
    pub tags: Vec<String>,
}

impl TaskFields {
    fn priority(&self) -> Result<Option<Priority>> {
        self.priority
            .as_deref()
            .map(str::parse::<Priority>)
            .transpose()
            .map_err(anyhow::Error::msg)
    }

    pub fn into_new_task(self) -> Result<NewTask> {
        let priority = self.priority()?;
        Ok(NewTask {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            tags: self.tags,
            priority,
            status: self.status,
            due_date: self.due,
            story_points: self.points,
            assignees: Vec::new(),
        })
    }

    pub fn into_update(self) -> Result<TaskUpdate> {
        let priority = self.priority()?;
        Ok(TaskUpdate {
            title: self.title,
            description: self.description,
            tags: (!self.tags.is_empty()).then_some(self.tags),
            priority,
            status: self.status,
            due_date: self.due,
            story_points: self.points,
        })
    }
}

fn require_task(board: &BoardController, task: &str) -> Result<()> {
    if board.task(task).is_none() {
        return Err(BoardError::TaskNotFound {
            id: task.to_string(),
        }
        .into());
    }
    Ok(())
}

pub async fn cmd_add_task(board: &BoardController, column: &str, fields: TaskFields) -> Result<()> {
    if !board.column_ids().iter().any(|c| c == column) {
        return Err(BoardError::ColumnNotFound {
            id: column.to_string(),
        }
        .into());
    }
    let new_task = fields.into_new_task()?;
    if new_task.title.trim().is_empty() {
        bail!("Task title must not be empty");
    }

    let mut rx = board.subscribe();
    match board.create_task(column, new_task).await {
        Some(task) => {
            println!("Created {}", format_task_line(&task));
            Ok(())
        }
        None => {
            drain_notifications(&mut rx);
            bail!("Task was not created");
        }
    }
}

pub async fn cmd_edit_task(board: &BoardController, task: &str, fields: TaskFields) -> Result<()> {
    require_task(board, task)?;
    let update = fields.into_update()?;
    if update.is_empty() {
        println!("Nothing to change.");
        return Ok(());
    }

    let mut rx = board.subscribe();
    match board.update_task(task, update).await {
        Some(updated) => {
            println!("Updated {}", format_task_line(&updated));
            Ok(())
        }
        None => {
            drain_notifications(&mut rx);
            bail!("Task {} was not updated", task);
        }
    }
}

pub async fn cmd_delete_task(board: &BoardController, task: &str) -> Result<()> {
    require_task(board, task)?;
    let mut rx = board.subscribe();
    if board.delete_task(task).await {
        println!("Deleted task {}", task);
        Ok(())
    } else {
        drain_notifications(&mut rx);
        bail!("Task {} was not deleted", task);
    }
}

pub async fn cmd_comment(board: &BoardController, task: &str, text: &str) -> Result<()> {
    require_task(board, task)?;
    if text.trim().is_empty() {
        bail!("Comment text must not be empty");
    }
    let mut rx = board.subscribe();
    match board.add_comment(task, text).await {
        Some(_) => {
            println!("Comment added to {}", task);
            Ok(())
        }
        None => {
            drain_notifications(&mut rx);
            bail!("Comment was not added");
        }
    }
}

pub async fn cmd_comments(board: &BoardController, task: &str) -> Result<()> {
    require_task(board, task)?;
    let mut rx = board.subscribe();
    let Some(comments) = board.fetch_comments(task).await else {
        drain_notifications(&mut rx);
        bail!("Could not load comments for {}", task);
    };
    if comments.is_empty() {
        println!("No comments on {}.", task);
        return Ok(());
    }
    for comment in comments {
        println!(
            "{} {} {}",
            style(&comment.author).bold(),
            style(&comment.timestamp).dim(),
            comment.text
        );
    }
    Ok(())
}

pub async fn cmd_assign(board: &BoardController, task: &str, users: &[String]) -> Result<()> {
    require_task(board, task)?;
    let mut rx = board.subscribe();
    match board.update_assignees(task, users.to_vec()).await {
        Some(updated) => {
            if updated.assignees.is_empty() {
                println!("Cleared assignees of {}", task);
            } else {
                println!("Assigned {} to {}", updated.assignees.join(", "), task);
            }
            Ok(())
        }
        None => {
            drain_notifications(&mut rx);
            bail!("Assignees of {} were not updated", task);
        }
    }
}
