use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use taskboard::config::TaskboardConfig;

mod cmd;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(version, about = "Kanban board client: view, filter and rearrange a group's board")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Group whose board to open. Overrides board.group_id and TASKBOARD_GROUP.
    #[arg(short, long, global = true)]
    pub group: Option<String>,

    /// Board API base URL. Overrides api.base_url and TASKBOARD_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the board, optionally filtered
    Show {
        /// Case-insensitive text matched against title and description
        #[arg(short, long, default_value = "")]
        search: String,
        /// Status filter ("To Do", "in_progress", ... or "All")
        #[arg(long, default_value = "All")]
        status: String,
        /// Priority filter (High, Medium, Low or "All")
        #[arg(long, default_value = "All")]
        priority: String,
    },
    /// Move a task onto another task or column
    Move {
        task: String,
        /// Task id to drop before, or a column id to append to
        over: String,
    },
    /// Create a task at the end of a column
    AddTask {
        column: String,
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        points: Option<u32>,
        /// Repeatable
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
    /// Change fields of an existing task
    EditTask {
        task: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        points: Option<u32>,
        /// Replaces all tags. Repeatable
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
    DeleteTask {
        task: String,
    },
    AddColumn {
        title: String,
    },
    RenameColumn {
        column: String,
        title: String,
    },
    DeleteColumn {
        column: String,
    },
    /// Add a comment to a task
    Comment {
        task: String,
        text: String,
    },
    /// List a task's comments
    Comments {
        task: String,
    },
    /// Replace a task's assignees
    Assign {
        task: String,
        users: Vec<String>,
    },
    /// List members of the group
    Members,
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Write a default taskboard.toml
    Init,
}

/// Config file, then environment, then flags.
fn resolve_config(cli: &Cli, project_dir: &std::path::Path) -> Result<TaskboardConfig> {
    let mut config = TaskboardConfig::load_or_default(project_dir)
        .context("Failed to load taskboard.toml")?;
    config.apply_env();
    if let Some(group) = &cli.group {
        config.board.group_id = Some(group.clone());
    }
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let config = resolve_config(&cli, &project_dir)?;
    taskboard::logging::init(&config.logging, cli.verbose, cli.log_json);

    match &cli.command {
        Commands::Config { command } => {
            cmd::cmd_config(&project_dir, &config, command.clone())?;
        }
        Commands::Show {
            search,
            status,
            priority,
        } => {
            let board = cmd::connect(&config).await?;
            cmd::cmd_show(&board, &config, search, status, priority)?;
        }
        Commands::Move { task, over } => {
            let board = cmd::connect(&config).await?;
            cmd::cmd_move(&board, task, over).await?;
        }
        Commands::AddTask {
            column,
            title,
            description,
            priority,
            status,
            due,
            points,
            tags,
        } => {
            let board = cmd::connect(&config).await?;
            let fields = cmd::TaskFields {
                title: Some(title.clone()),
                description: description.clone(),
                priority: priority.clone(),
                status: status.clone(),
                due: due.clone(),
                points: *points,
                tags: tags.clone(),
            };
            cmd::cmd_add_task(&board, column, fields).await?;
        }
        Commands::EditTask {
            task,
            title,
            description,
            priority,
            status,
            due,
            points,
            tags,
        } => {
            let board = cmd::connect(&config).await?;
            let fields = cmd::TaskFields {
                title: title.clone(),
                description: description.clone(),
                priority: priority.clone(),
                status: status.clone(),
                due: due.clone(),
                points: *points,
                tags: tags.clone(),
            };
            cmd::cmd_edit_task(&board, task, fields).await?;
        }
        Commands::DeleteTask { task } => {
            let board = cmd::connect(&config).await?;
            cmd::cmd_delete_task(&board, task).await?;
        }
        Commands::AddColumn { title } => {
            let board = cmd::connect(&config).await?;
            cmd::cmd_add_column(&board, title).await?;
        }
        Commands::RenameColumn { column, title } => {
            let board = cmd::connect(&config).await?;
            cmd::cmd_rename_column(&board, column, title).await?;
        }
        Commands::DeleteColumn { column } => {
            let board = cmd::connect(&config).await?;
            cmd::cmd_delete_column(&board, column).await?;
        }
        Commands::Comment { task, text } => {
            let board = cmd::connect(&config).await?;
            cmd::cmd_comment(&board, task, text).await?;
        }
        Commands::Comments { task } => {
            let board = cmd::connect(&config).await?;
            cmd::cmd_comments(&board, task).await?;
        }
        Commands::Assign { task, users } => {
            let board = cmd::connect(&config).await?;
            cmd::cmd_assign(&board, task, users).await?;
        }
        Commands::Members => {
            let board = cmd::connect(&config).await?;
            cmd::cmd_members(&board).await?;
        }
    }

    Ok(())
}
