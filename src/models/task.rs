use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Pending,
    #[serde(rename = "In-Progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    // Workflow order; also the order used by the status distribution.
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In-Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str() == s)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub priority: Priority,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub status: TaskStatus,
}

impl Task {
    /// New tasks always start out pending.
    pub fn new(title: String, priority: Priority, entry_date: NaiveDate, exit_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            priority,
            entry_date,
            exit_date,
            status: TaskStatus::Pending,
        }
    }

    /// Replaces every user-editable field; the id is kept.
    pub fn apply(&mut self, fields: TaskFields) {
        self.title = fields.title;
        self.priority = fields.priority;
        self.entry_date = fields.entry_date;
        self.exit_date = fields.exit_date;
        self.status = fields.status;
    }

    pub fn fields(&self) -> TaskFields {
        TaskFields {
            title: self.title.clone(),
            priority: self.priority,
            entry_date: self.entry_date,
            exit_date: self.exit_date,
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskFields {
    pub title: String,
    pub priority: Priority,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub status: TaskStatus,
}

/// Identifies the row targeted by an update or delete.
///
/// `Title` matches the first task with that exact title, so it is ambiguous
/// once titles repeat. The web handlers always select by `Id`.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskSelector {
    Id(Uuid),
    Title(String),
}

impl TaskSelector {
    pub fn position(&self, tasks: &[Task]) -> Option<usize> {
        match self {
            TaskSelector::Id(id) => tasks.iter().position(|t| &t.id == id),
            TaskSelector::Title(title) => tasks.iter().position(|t| &t.title == title),
        }
    }
}

impl fmt::Display for TaskSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskSelector::Id(id) => write!(f, "id {}", id),
            TaskSelector::Title(title) => write!(f, "title '{}'", title),
        }
    }
}
