//! Board-level commands — `taskboard show | move | *-column | members`.

use anyhow::{Result, bail};
use console::style;

use taskboard::board::{BoardController, FilterCriteria, Task};
use taskboard::config::TaskboardConfig;
use taskboard::errors::BoardError;

use super::drain_notifications;

/// One-line plain rendering of a task.
pub fn format_task_line(task: &Task) -> String {
    let mut line = format!("[{}] {}", task.id, task.title);
    if let Some(priority) = task.priority {
        line.push_str(&format!(" ({})", priority));
    }
    if let Some(status) = &task.status {
        line.push_str(&format!(" <{}>", status));
    }
    if !task.assignees.is_empty() {
        let who: Vec<String> = task.assignees.iter().map(|a| format!("@{}", a)).collect();
        line.push_str(&format!(" {}", who.join(" ")));
    }
    if !task.tags.is_empty() {
        let tags: Vec<String> = task.tags.iter().map(|t| format!("#{}", t)).collect();
        line.push_str(&format!(" {}", tags.join(" ")));
    }
    if let Some(due) = &task.due_date {
        line.push_str(&format!(" due {}", due));
    }
    if let Some(points) = task.story_points {
        line.push_str(&format!(" [{}pt]", points));
    }
    if !task.comments.is_empty() {
        line.push_str(&format!(" ({} comments)", task.comments.len()));
    }
    line
}

pub fn cmd_show(
    board: &BoardController,
    config: &TaskboardConfig,
    search: &str,
    status: &str,
    priority: &str,
) -> Result<()> {
    let filter = FilterCriteria::new(search, status, priority);
    let active = filter.is_active();
    board.set_filter(filter);

    let view = board.filtered_columns();
    let wanted = &config.board.columns;
    let mut shown = 0;

    for column in board
        .column_meta()
        .iter()
        .filter(|m| wanted.is_empty() || wanted.contains(&m.id))
    {
        let tasks = view.tasks(&column.id);
        shown += tasks.len();
        println!(
            "{} {} {}",
            style(&column.title).cyan().bold(),
            style(format!("[{}]", column.id)).dim(),
            style(format!("({})", tasks.len())).dim()
        );
        if tasks.is_empty() {
            println!("  {}", style("(empty)").dim());
        }
        for task in tasks {
            println!("  {}", format_task_line(task));
        }
        println!();
    }

    if active {
        println!("Showing {} of {} tasks", shown, board.task_count());
    }
    Ok(())
}

pub async fn cmd_move(board: &BoardController, task: &str, over: &str) -> Result<()> {
    let from = board
        .column_of(task)
        .ok_or_else(|| BoardError::TaskNotFound {
            id: task.to_string(),
        })?;

    let mut rx = board.subscribe();
    board.drag_start(task);
    // Once the hover has carried the task into the target column the
    // pointer rests on the task itself.
    let crossed = board.drag_over(task, Some(over));
    let drop_on = if crossed { task } else { over };
    let persisted = board.drag_end(task, Some(drop_on)).await;
    if drain_notifications(&mut rx) > 0 {
        bail!("Move of task {} was rejected; board reloaded", task);
    }

    if persisted {
        let to = board.column_of(task).unwrap_or_default();
        println!("Moved {} from {} to {}", task, from, to);
    } else {
        println!("Nothing to move: {} is already there", task);
    }
    Ok(())
}

pub async fn cmd_add_column(board: &BoardController, title: &str) -> Result<()> {
    let mut rx = board.subscribe();
    match board.create_column(title).await {
        Some(column) => {
            println!("Created column {} [{}]", column.title, column.id);
            Ok(())
        }
        None => {
            drain_notifications(&mut rx);
            bail!("Column was not created");
        }
    }
}

pub async fn cmd_rename_column(board: &BoardController, column: &str, title: &str) -> Result<()> {
    if !board.column_ids().iter().any(|c| c == column) {
        return Err(BoardError::ColumnNotFound {
            id: column.to_string(),
        }
        .into());
    }
    let mut rx = board.subscribe();
    match board.update_column(column, title).await {
        Some(updated) => {
            println!("Renamed column {} to {}", updated.id, updated.title);
            Ok(())
        }
        None => {
            drain_notifications(&mut rx);
            bail!("Column {} was not renamed", column);
        }
    }
}

pub async fn cmd_delete_column(board: &BoardController, column: &str) -> Result<()> {
    let mut rx = board.subscribe();
    if board.delete_column(column).await {
        println!("Deleted column {}", column);
        Ok(())
    } else {
        drain_notifications(&mut rx);
        bail!("Column {} was not deleted", column);
    }
}

pub async fn cmd_members(board: &BoardController) -> Result<()> {
    let members = board.fetch_members().await;
    if members.is_empty() {
        println!("No members found.");
        return Ok(());
    }
    for member in members {
        match &member.email {
            Some(email) => println!("{}  {} <{}>", member.user_id, member.name, email),
            None => println!("{}  {}", member.user_id, member.name),
        }
    }
    Ok(())
}
