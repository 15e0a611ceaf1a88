use std::cmp::Ordering;

use crate::models::Task;
use crate::types::{Priority, TaskStatus};

/// Dashboard filters applied to the page of tasks already fetched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    /// Ascending by due date; otherwise server order is kept
    pub sort_by_due: bool,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |s| task.status == s) && self.priority.map_or(true, |p| task.priority == p)
    }

    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        let mut out: Vec<&Task> = tasks.iter().filter(|t| self.matches(t)).collect();

        if self.sort_by_due {
            // Stable; tasks without a due date go last
            out.sort_by(|a, b| match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }
        out
    }
}
