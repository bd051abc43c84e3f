use axum::{
    extract::{rejection::FormRejection, Form, Path, Query, State},
    http::header,
    response::{IntoResponse, Json, Redirect, Response},
};
use chrono::Local;
use serde_json::json;
use tower_sessions::Session;
use uuid::Uuid;
use crate::errors::{AppError, AppResult};
use crate::models::{AskForm, PageQuery, Priority, SessionState, Task, TaskForm, TaskSelector, TaskStatus, TaskUpdateForm};
use crate::services::presentation::{
    render_status_chart, row_background, star_label, status_distribution, status_text_color,
};
use crate::state::AppState;
use super::render::{escape_html, messages, redirect_with, render_template, theme_picker, theme_style};

pub async fn serve_main_app(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let session_state = SessionState::load(&session).await?;
    let username = session_state
        .username
        .clone()
        .ok_or_else(|| AppError::Auth("Not authenticated".into()))?;

    let tasks = state.tasks.load_tasks()?;
    tracing::debug!("Rendering main app for {} with {} tasks", username, tasks.len());

    let (task_table, edit_forms, chart, assistant) = if tasks.is_empty() {
        (
            r#"<div class="alert info">No tasks added yet.</div>"#.to_string(),
            String::new(),
            String::new(),
            String::new(),
        )
    } else {
        (
            task_table_html(&tasks)?,
            edit_forms_html(&tasks),
            r#"<img src="/tasks/chart.svg" alt="Task Status Distribution">"#.to_string(),
            assistant_html(&session_state),
        )
    };

    let page = render_template(&state.config, "main.html", &[
        ("theme_style", theme_style(&session_state)),
        ("theme_picker", theme_picker(&session_state)),
        ("username", escape_html(&username)),
        ("messages", messages(&query)),
        ("priority_options", priority_options(Priority::High)),
        ("today", Local::now().date_naive().format("%Y-%m-%d").to_string()),
        ("task_table", task_table),
        ("edit_forms", edit_forms),
        ("chart", chart),
        ("assistant", assistant),
    ])?;
    Ok(page.into_response())
}

pub async fn add_task(
    State(state): State<AppState>,
    form: Result<Form<TaskForm>, FormRejection>,
) -> AppResult<Response> {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => return Ok(invalid_task_form(rejection)),
    };
    if form.title.trim().is_empty() {
        return Ok(redirect_with("/tasks", "error", "Task title required."));
    }

    state
        .tasks
        .add_task(form.title, form.priority, form.entry_date, form.exit_date)?;
    Ok(redirect_with("/tasks", "notice", "Task added!"))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
    form: Result<Form<TaskUpdateForm>, FormRejection>,
) -> AppResult<Response> {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => return Ok(invalid_task_form(rejection)),
    };
    if form.title.trim().is_empty() {
        return Ok(redirect_with("/tasks", "error", "Task title required."));
    }

    state
        .tasks
        .update_task(&TaskSelector::Id(task_id), form.into())?
        .ok_or_else(|| AppError::NotFound(format!("Task {}", task_id)))?;
    Ok(redirect_with("/tasks", "notice", "Updated!"))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> AppResult<Response> {
    state
        .tasks
        .delete_task(&TaskSelector::Id(task_id))?
        .ok_or_else(|| AppError::NotFound(format!("Task {}", task_id)))?;
    Ok(redirect_with("/tasks", "notice", "Deleted!"))
}

pub async fn status_chart(State(state): State<AppState>) -> AppResult<Response> {
    let tasks = state.tasks.load_tasks()?;
    let svg = render_status_chart(&status_distribution(&tasks))?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

pub async fn status_stats(State(state): State<AppState>) -> AppResult<Response> {
    let tasks = state.tasks.load_tasks()?;
    let stats: Vec<_> = status_distribution(&tasks)
        .into_iter()
        .map(|(status, count)| json!({ "status": status, "count": count }))
        .collect();
    Ok(Json(stats).into_response())
}

pub async fn ask_assistant(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AskForm>,
) -> AppResult<Response> {
    let tasks = state.tasks.load_tasks()?;
    let reply = state.assistant.ask(&form.question, &tasks).await;

    SessionState::load(&session).await?.with_answer(reply).save(&session).await?;
    Ok(Redirect::to("/tasks").into_response())
}

// Unknown priority or status values and malformed dates end up here.
fn invalid_task_form(rejection: FormRejection) -> Response {
    tracing::warn!("Rejected task form: {}", rejection.body_text());
    redirect_with("/tasks", "error", "Invalid task details.")
}

fn task_table_html(tasks: &[Task]) -> AppResult<String> {
    let mut rows = Vec::with_capacity(tasks.len());
    for task in tasks {
        let background = row_background(task.priority.as_str())
            .map(|c| format!(r#" style="background-color: {};""#, c.css()))
            .unwrap_or_default();
        let status_color = status_text_color(task.status.as_str())
            .map(|c| format!(r#" style="color: {};""#, c.css()))
            .unwrap_or_default();

        rows.push(format!(
            r#"<tr{}>
                <td>{}</td>
                <td>{}</td>
                <td>{}</td>
                <td>{}</td>
                <td{}>{}</td>
                <td>{}</td>
            </tr>"#,
            background,
            escape_html(&task.title),
            task.priority,
            task.entry_date.format("%Y-%m-%d"),
            task.exit_date.format("%Y-%m-%d"),
            status_color,
            task.status,
            star_label(task.priority.as_str())?,
        ));
    }

    Ok(format!(
        r#"<table class="tasks">
            <thead><tr><th>Title</th><th>Priority</th><th>Entry Date</th><th>Exit Date</th><th>Status</th><th>Stars</th></tr></thead>
            <tbody>{}</tbody>
        </table>"#,
        rows.join("\n")
    ))
}

fn edit_forms_html(tasks: &[Task]) -> String {
    tasks
        .iter()
        .map(|task| {
            format!(
                r#"<details class="edit-task">
                <summary>{title}</summary>
                <form method="post" action="/tasks/{id}">
                    <label>Title <input type="text" name="title" value="{title}" required></label>
                    <label>Priority <select name="priority">{priorities}</select></label>
                    <label>Entry <input type="date" name="entry_date" value="{entry}"></label>
                    <label>Exit <input type="date" name="exit_date" value="{exit}"></label>
                    <label>Status <select name="status">{statuses}</select></label>
                    <button type="submit">Update Task</button>
                </form>
                <form method="post" action="/tasks/{id}/delete">
                    <button type="submit" class="delete-btn">Delete Task</button>
                </form>
            </details>"#,
                title = escape_html(&task.title),
                id = task.id,
                priorities = priority_options(task.priority),
                entry = task.entry_date.format("%Y-%m-%d"),
                exit = task.exit_date.format("%Y-%m-%d"),
                statuses = status_options(task.status),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn assistant_html(session_state: &SessionState) -> String {
    let answer = session_state
        .last_answer
        .as_ref()
        .map(|reply| {
            let class = if reply.is_error() { "answer error" } else { "answer" };
            format!(
                r#"<div class="{}"><strong>AI Says:</strong> {}</div>"#,
                class,
                escape_html(&reply.display_text())
            )
        })
        .unwrap_or_default();

    format!(
        r#"<form method="post" action="/ask">
            <label for="question">Ask the AI about your tasks:</label>
            <textarea id="question" name="question" rows="3"></textarea>
            <button type="submit">Ask</button>
        </form>
        {}"#,
        answer
    )
}

fn priority_options(selected: Priority) -> String {
    Priority::ALL
        .iter()
        .map(|p| option_html(p.as_str(), *p == selected))
        .collect()
}

fn status_options(selected: TaskStatus) -> String {
    TaskStatus::ALL
        .iter()
        .map(|s| option_html(s.as_str(), *s == selected))
        .collect()
}

fn option_html(value: &str, selected: bool) -> String {
    let selected = if selected { " selected" } else { "" };
    format!(r#"<option value="{0}"{1}>{0}</option>"#, value, selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> Task {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Task::new("<Launch>".into(), Priority::High, day, day)
    }

    #[test]
    fn table_rows_carry_colors_and_stars() {
        let html = task_table_html(&[sample()]).unwrap();
        assert!(html.contains("background-color: #FFCCCC;"));
        assert!(html.contains("color: red;"));
        assert!(html.contains("⭐⭐⭐"));
        assert!(html.contains("&lt;Launch&gt;"));
        assert!(!html.contains("<Launch>"));
    }

    #[test]
    fn edit_form_preselects_current_values() {
        let task = sample();
        let html = edit_forms_html(&[task.clone()]);
        assert!(html.contains(&format!(r#"action="/tasks/{}""#, task.id)));
        assert!(html.contains(r#"<option value="High" selected>"#));
        assert!(html.contains(r#"<option value="Pending" selected>"#));
        assert!(html.contains(r#"value="2024-01-01""#));
    }

    #[test]
    fn error_answer_is_prefixed() {
        let state = SessionState::default()
            .log_in("a".into())
            .with_answer(crate::models::AssistantReply::Error("offline".into()));
        assert!(assistant_html(&state).contains("Error: offline"));
    }
}
