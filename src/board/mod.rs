//! Kanban board state and drag-and-drop reconciliation.
//!
//! ## Overview
//!
//! The board is a map of column id → ordered task list. Three pure
//! functions compute views and projections of that map; the controller owns
//! the live copy and talks to the remote service.
//!
//! ```text
//!  drag gesture ──> BoardController::drag_over ──> moves::move_task_across_columns
//!                         │                              (local projection only)
//!                         v
//!                  BoardController::drag_end ──> BoardService::move_task
//!                         │                              (one call per drop)
//!                         └── failure ──> fetch_board (full resync)
//! ```
//!
//! ## Module Map
//!
//! | Module       | Responsibility                                          |
//! |--------------|---------------------------------------------------------|
//! | `models`     | `Task`, `Comment`, `Priority`, `ColumnMeta`, `ColumnMap`|
//! | `lookup`     | `find_column_of_task`, `DEFAULT_COLUMNS`                |
//! | `filter`     | `filter_columns`, `FilterCriteria`, status normalising  |
//! | `moves`      | `move_task_across_columns`, `reorder_within_column`     |
//! | `events`     | `BoardEvent` broadcast to the presentation layer        |
//! | `controller` | `BoardController`: optimistic updates + refetch-on-error|

pub mod controller;
pub mod events;
pub mod filter;
pub mod lookup;
pub mod models;
pub mod moves;

pub use controller::{BoardController, BoardState};
pub use events::{BoardEvent, NotifyLevel};
pub use filter::{ALL, FilterCriteria, filter_columns, normalize_status};
pub use lookup::{DEFAULT_COLUMNS, find_column_of_task};
pub use models::{ColumnMap, ColumnMeta, Comment, Member, Priority, Task};
pub use moves::{move_task_across_columns, reorder_within_column};
