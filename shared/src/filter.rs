use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Task;

/// Sidebar selection used to narrow the task list.
///
/// `Today` and `Upcoming` only cover open tasks; `Upcoming` starts the
/// day after `today`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    All,
    Today,
    Upcoming,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct ParseCategoryError(pub String);

impl Category {
    pub const ALL: [Category; 4] = [
        Category::All,
        Category::Today,
        Category::Upcoming,
        Category::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Today => "today",
            Category::Upcoming => "upcoming",
            Category::Completed => "completed",
        }
    }

    /// Value for the `category` query parameter. `All` sends nothing.
    pub fn query_value(self) -> Option<&'static str> {
        match self {
            Category::All => None,
            other => Some(other.as_str()),
        }
    }

    pub fn includes(self, task: &Task, today: NaiveDate) -> bool {
        match self {
            Category::All => true,
            Category::Today => !task.completed && task.date == today,
            Category::Upcoming => !task.completed && task.date > today,
            Category::Completed => task.completed,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// The filter key: which subset of tasks is being looked at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TaskFilter {
    pub category: Category,
    pub search: String,
}

impl TaskFilter {
    pub fn new(category: Category, search: impl Into<String>) -> Self {
        Self {
            category,
            search: search.into(),
        }
    }

    /// The trimmed search text, or `None` when there is nothing to match.
    pub fn search_term(&self) -> Option<&str> {
        let term = self.search.trim();
        (!term.is_empty()).then_some(term)
    }

    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        self.category.includes(task, today)
            && self.search_term().map_or(true, |term| task.matches_search(term))
    }

    /// Filters and orders `tasks` the way list responses are returned.
    pub fn apply(&self, tasks: impl IntoIterator<Item = Task>, today: NaiveDate) -> Vec<Task> {
        let mut matching: Vec<Task> = tasks
            .into_iter()
            .filter(|t| self.matches(t, today))
            .collect();
        sort_tasks(&mut matching);
        matching
    }
}

// date, time, then title; id keeps the order total
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.time.cmp(&b.time))
            .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
            .then_with(|| a.id.cmp(&b.id))
    });
}
