//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module   | Commands handled                                              |
//! |----------|---------------------------------------------------------------|
//! | `board`  | `Show`, `Move`, `AddColumn`, `RenameColumn`, `DeleteColumn`, `Members` |
//! | `task`   | `AddTask`, `EditTask`, `DeleteTask`, `Comment`, `Comments`, `Assign` |
//! | `config` | `Config`                                                      |

pub mod board;
pub mod config;
pub mod task;

use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;
use tokio::sync::broadcast;

use taskboard::board::{BoardController, BoardEvent, NotifyLevel};
use taskboard::config::TaskboardConfig;
use taskboard::errors::BoardError;
use taskboard::service::HttpBoardService;

pub use board::{
    cmd_add_column, cmd_delete_column, cmd_members, cmd_move, cmd_rename_column, cmd_show,
};
pub use config::cmd_config;
pub use task::{
    TaskFields, cmd_add_task, cmd_assign, cmd_comment, cmd_comments, cmd_delete_task,
    cmd_edit_task,
};

/// Build a controller for the configured group and load its board.
pub async fn connect(config: &TaskboardConfig) -> Result<BoardController> {
    config.check()?;
    let group_id = config
        .board
        .group_id
        .clone()
        .ok_or(BoardError::MissingGroup)?;
    let service = Arc::new(
        HttpBoardService::from_config(&config.api).context("Failed to build HTTP client")?,
    );
    let board =
        BoardController::new(service.clone(), Some(group_id)).with_group_service(service);

    let mut rx = board.subscribe();
    if !board.fetch_board().await {
        drain_notifications(&mut rx);
        anyhow::bail!("Could not load the board from {}", config.api.base_url);
    }
    Ok(board)
}

/// Print pending notifications to stderr; returns how many were errors.
pub fn drain_notifications(rx: &mut broadcast::Receiver<BoardEvent>) -> usize {
    let mut errors = 0;
    while let Ok(event) = rx.try_recv() {
        if let BoardEvent::Notify { level, message } = event {
            match level {
                NotifyLevel::Error => {
                    errors += 1;
                    eprintln!("{} {}", style("error:").red().bold(), message);
                }
                NotifyLevel::Success => {
                    eprintln!("{}", style(message).dim());
                }
            }
        }
    }
    errors
}
