//! Read-only filtered projection of a [`ColumnMap`].
//!
//! Three predicates, all of which must pass:
//!
//! | Predicate | Inactive when            | Match rule                                        |
//! |-----------|--------------------------|---------------------------------------------------|
//! | text      | search is empty          | title or description contains it, ignoring case   |
//! | status    | filter is empty or `All` | equal after [`normalize_status`]                  |
//! | priority  | filter is empty or `All` | equal ignoring case                               |
//!
//! Filtering never reorders tasks and never mutates its input.

use super::models::{ColumnMap, Task};

/// Sentinel selector value meaning "no filter".
pub const ALL: &str = "All";

/// Lower-case and strip whitespace and underscores, so `"To Do"`, `"to_do"`
/// and `"todo"` compare equal.
pub fn normalize_status(status: &str) -> String {
    status
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_unset(selector: &str) -> bool {
    selector.is_empty() || selector == ALL
}

/// Transient, UI-local filter state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search: String,
    pub status: String,
    pub priority: String,
}

impl FilterCriteria {
    pub fn new(
        search: impl Into<String>,
        status: impl Into<String>,
        priority: impl Into<String>,
    ) -> Self {
        Self {
            search: search.into(),
            status: status.into(),
            priority: priority.into(),
        }
    }

    /// True if at least one predicate would exclude something.
    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || !is_unset(&self.status) || !is_unset(&self.priority)
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.matches_text(task) && self.matches_status(task) && self.matches_priority(task)
    }

    fn matches_text(&self, task: &Task) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        task.title.to_lowercase().contains(&needle)
            || task.description.to_lowercase().contains(&needle)
    }

    fn matches_status(&self, task: &Task) -> bool {
        if is_unset(&self.status) {
            return true;
        }
        task.status
            .as_deref()
            .is_some_and(|s| normalize_status(s) == normalize_status(&self.status))
    }

    fn matches_priority(&self, task: &Task) -> bool {
        if is_unset(&self.priority) {
            return true;
        }
        task.priority
            .is_some_and(|p| p.as_str().eq_ignore_ascii_case(self.priority.trim()))
    }
}

/// Filter `columns` down to the tasks matching every active predicate.
///
/// The result holds exactly the listed `column_ids`; a listed column missing
/// from the input comes back as an empty list.
pub fn filter_columns<S: AsRef<str>>(
    columns: &ColumnMap,
    search: &str,
    status: &str,
    priority: &str,
    column_ids: &[S],
) -> ColumnMap {
    filter_with(
        columns,
        &FilterCriteria::new(search, status, priority),
        column_ids,
    )
}

pub fn filter_with<S: AsRef<str>>(
    columns: &ColumnMap,
    criteria: &FilterCriteria,
    column_ids: &[S],
) -> ColumnMap {
    ColumnMap::from_columns(column_ids.iter().map(|col| {
        let col = col.as_ref();
        let kept: Vec<Task> = columns
            .tasks(col)
            .iter()
            .filter(|t| criteria.matches(t))
            .cloned()
            .collect();
        (col.to_string(), kept)
    }))
}
