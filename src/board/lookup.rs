use super::models::ColumnMap;

/// Column set of the simple four-column board.
pub const DEFAULT_COLUMNS: [&str; 4] = ["todo", "inprogress", "review", "done"];

/// Resolve which of `column_ids` currently holds the task `task_id`.
///
/// Columns absent from the map are skipped. Because columns partition the
/// tasks, at most one column can match.
pub fn find_column_of_task<'a, S: AsRef<str>>(
    columns: &ColumnMap,
    task_id: &str,
    column_ids: &'a [S],
) -> Option<&'a str> {
    column_ids
        .iter()
        .map(AsRef::as_ref)
        .find(|col| columns.tasks(col).iter().any(|t| t.id == task_id))
}

/// Column and index of a task within the given columns.
pub fn locate_task<'a, S: AsRef<str>>(
    columns: &ColumnMap,
    task_id: &str,
    column_ids: &'a [S],
) -> Option<(&'a str, usize)> {
    column_ids.iter().map(AsRef::as_ref).find_map(|col| {
        columns
            .tasks(col)
            .iter()
            .position(|t| t.id == task_id)
            .map(|idx| (col, idx))
    })
}
