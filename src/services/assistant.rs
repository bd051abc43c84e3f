//! Chat assistant over the task list.
//!
//! The whole table goes into a single user message together with the
//! question. Every failure is folded into [`AssistantReply::Error`] so a
//! broken or slow completion service never takes the page down with it.

use std::time::Duration;
use thiserror::Error;
use crate::config::AssistantConfig;
use crate::models::{AssistantReply, Task};
use super::completion_types::{ChatMessage, ChatRequest, ChatResponse};

const COLUMNS: [&str; 5] = ["Title", "Priority", "Entry Date", "Exit Date", "Status"];

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("{0} environment variable not set")]
    MissingApiKey(String),

    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("completion service returned no answer")]
    EmptyResponse,
}

#[derive(Clone)]
pub struct AssistantService {
    config: AssistantConfig,
    client: reqwest::Client,
    api_key: Option<String>,
}

impl AssistantService {
    /// Reads the API key from the environment variable named in the config.
    /// A missing key is reported on each question rather than at startup.
    pub fn from_config(config: AssistantConfig) -> Result<Self, AssistantError> {
        let api_key = std::env::var(&config.api_key_env).ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            tracing::warn!("{} is not set, the assistant will be unavailable", config.api_key_env);
        }
        Self::build(config, api_key)
    }

    pub fn with_api_key(config: AssistantConfig, api_key: impl Into<String>) -> Result<Self, AssistantError> {
        Self::build(config, Some(api_key.into()))
    }

    fn build(config: AssistantConfig, api_key: Option<String>) -> Result<Self, AssistantError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client, api_key })
    }

    pub fn build_prompt(&self, question: &str, tasks: &[Task]) -> String {
        build_prompt(question, tasks, self.config.max_prompt_rows)
    }

    pub async fn ask(&self, question: &str, tasks: &[Task]) -> AssistantReply {
        let prompt = self.build_prompt(question, tasks);
        tracing::info!("Asking assistant ({} tasks, {} prompt bytes)", tasks.len(), prompt.len());

        match self.complete(prompt).await {
            Ok(answer) => AssistantReply::Answer(answer),
            Err(e) => {
                tracing::warn!("Assistant request failed: {}", e);
                AssistantReply::Error(e.to_string())
            }
        }
    }

    async fn complete(&self, prompt: String) -> Result<String, AssistantError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AssistantError::MissingApiKey(self.config.api_key_env.clone()))?;

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
        };

        let url = format!("{}/v1/chat/completions", self.config.api_base_url.trim_end_matches('/'));
        tracing::debug!("Sending completion request to {}", url);

        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Api { status, body });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| self.classify(e))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(AssistantError::EmptyResponse)
    }

    fn classify(&self, err: reqwest::Error) -> AssistantError {
        if err.is_timeout() {
            AssistantError::Timeout(self.config.timeout_secs)
        } else {
            AssistantError::Http(err)
        }
    }
}

/// Builds the single prompt sent to the completion service. `max_rows == 0`
/// includes every task.
pub fn build_prompt(question: &str, tasks: &[Task], max_rows: usize) -> String {
    let table = render_task_table(tasks, max_rows);
    format!(
        "You are a task assistant. Here's the user's task list:\n{}\n\nUser asked: {}\n\nRespond in a helpful way.",
        table, question
    )
}

/// Plain-text, column-aligned table of tasks.
pub fn render_task_table(tasks: &[Task], max_rows: usize) -> String {
    let shown = if max_rows == 0 { tasks.len() } else { tasks.len().min(max_rows) };

    let rows: Vec<[String; 5]> = tasks[..shown]
        .iter()
        .map(|t| {
            [
                t.title.clone(),
                t.priority.to_string(),
                t.entry_date.format("%Y-%m-%d").to_string(),
                t.exit_date.format("%Y-%m-%d").to_string(),
                t.status.to_string(),
            ]
        })
        .collect();

    let mut widths = COLUMNS.map(|c| c.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |cells: &[&str]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_line(&COLUMNS)];
    if rows.is_empty() {
        lines.push("(no tasks)".to_string());
    }
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        lines.push(format_line(&cells));
    }
    if shown < tasks.len() {
        lines.push(format!("... {} more tasks not shown", tasks.len() - shown));
    }
    lines.join("\n")
}
