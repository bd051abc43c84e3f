use chrono::NaiveDate;
use serde::Deserialize;
use super::task::{Priority, TaskFields, TaskStatus};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct TaskForm {
    pub title: String,
    pub priority: Priority,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct TaskUpdateForm {
    pub title: String,
    pub priority: Priority,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub status: TaskStatus,
}

impl From<TaskUpdateForm> for TaskFields {
    fn from(form: TaskUpdateForm) -> Self {
        TaskFields {
            title: form.title,
            priority: form.priority,
            entry_date: form.entry_date,
            exit_date: form.exit_date,
            status: form.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AskForm {
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct ThemeForm {
    pub theme: String,
}

// Flash messages travel in the query string after a redirect.
#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    pub error: Option<String>,
    pub notice: Option<String>,
}
