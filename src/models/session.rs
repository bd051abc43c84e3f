use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use crate::errors::AppResult;
use super::assistant::AssistantReply;

const STATE_KEY: &str = "session_state";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    Register,
    #[default]
    Login,
    MainApp,
}

/// Per-browser UI state. Handlers load it, apply one transition and store
/// the returned value before redirecting.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    pub view: View,
    pub username: Option<String>,
    pub theme: Option<String>,
    pub last_answer: Option<AssistantReply>,
}

impl SessionState {
    pub async fn load(session: &Session) -> AppResult<Self> {
        Ok(session.get::<SessionState>(STATE_KEY).await?.unwrap_or_default())
    }

    pub async fn save(&self, session: &Session) -> AppResult<()> {
        session.insert(STATE_KEY, self.clone()).await?;
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.view == View::MainApp && self.username.is_some()
    }

    pub fn show_register(self) -> Self {
        if self.is_authenticated() {
            return self;
        }
        Self { view: View::Register, ..self }
    }

    pub fn show_login(self) -> Self {
        if self.is_authenticated() {
            return self;
        }
        Self { view: View::Login, ..self }
    }

    pub fn log_in(self, username: String) -> Self {
        Self {
            view: View::MainApp,
            username: Some(username),
            last_answer: None,
            ..self
        }
    }

    /// Theme survives logout; everything tied to the user does not.
    pub fn log_out(self) -> Self {
        Self {
            view: View::Login,
            username: None,
            last_answer: None,
            theme: self.theme,
        }
    }

    pub fn with_theme(self, theme: String) -> Self {
        Self { theme: Some(theme), ..self }
    }

    pub fn with_answer(self, reply: AssistantReply) -> Self {
        Self { last_answer: Some(reply), ..self }
    }
}
