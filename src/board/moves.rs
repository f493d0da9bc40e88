//! Drag-and-drop projections over a [`ColumnMap`].
//!
//! Both functions are pure: they compute the next in-memory board and never
//! talk to the remote service. A no-op returns `Cow::Borrowed(input)` so the
//! caller can detect "nothing changed" with a pointer comparison, and a real
//! move rebuilds only the touched columns; every other list stays
//! `Arc::ptr_eq` with its input.

use std::borrow::Cow;

use super::lookup::{find_column_of_task, locate_task};
use super::models::{ColumnMap, Task};

/// Resolve the column a drop target refers to: the column holding the task
/// `over_id`, or `over_id` itself when it names one of `column_ids`.
pub fn resolve_drop_column<'a, S: AsRef<str>>(
    columns: &ColumnMap,
    over_id: &str,
    column_ids: &'a [S],
) -> Option<&'a str> {
    find_column_of_task(columns, over_id, column_ids).or_else(|| {
        column_ids
            .iter()
            .map(AsRef::as_ref)
            .find(|col| *col == over_id)
    })
}

/// Move `active_id` into the column of `over_id`.
///
/// Dropping on a task inserts before it; dropping on a column (or on a task
/// that does not resolve into the target) appends. Same-column drops and
/// unresolvable ids are no-ops.
pub fn move_task_across_columns<'a, S: AsRef<str>>(
    columns: &'a ColumnMap,
    active_id: &str,
    over_id: &str,
    column_ids: &[S],
) -> Cow<'a, ColumnMap> {
    let Some(from_col) = find_column_of_task(columns, active_id, column_ids) else {
        return Cow::Borrowed(columns);
    };
    let Some(to_col) = resolve_drop_column(columns, over_id, column_ids) else {
        return Cow::Borrowed(columns);
    };
    if from_col == to_col {
        return Cow::Borrowed(columns);
    }

    let mut source: Vec<Task> = columns.tasks(from_col).to_vec();
    let Some(pos) = source.iter().position(|t| t.id == active_id) else {
        return Cow::Borrowed(columns);
    };
    let moved = source.remove(pos);

    let mut target: Vec<Task> = columns.tasks(to_col).to_vec();
    let index = target
        .iter()
        .position(|t| t.id == over_id)
        .unwrap_or(target.len());
    target.insert(index, moved);

    let mut next = columns.clone();
    next.insert(from_col, source);
    next.insert(to_col, target);
    Cow::Owned(next)
}

/// Reorder `active_id` to the index of `over_id` when both sit in the same
/// column. Anything else is a no-op.
pub fn reorder_within_column<'a, S: AsRef<str>>(
    columns: &'a ColumnMap,
    active_id: &str,
    over_id: &str,
    column_ids: &[S],
) -> Cow<'a, ColumnMap> {
    let Some((col, from)) = locate_task(columns, active_id, column_ids) else {
        return Cow::Borrowed(columns);
    };
    let Some(to) = columns.tasks(col).iter().position(|t| t.id == over_id) else {
        return Cow::Borrowed(columns);
    };
    if from == to {
        return Cow::Borrowed(columns);
    }

    let mut tasks = columns.tasks(col).to_vec();
    array_move(&mut tasks, from, to);
    let mut next = columns.clone();
    next.insert(col, tasks);
    Cow::Owned(next)
}

/// Remove the element at `from` and reinsert it at `to`.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from >= items.len() || from == to {
        return;
    }
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
}
