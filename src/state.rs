use crate::config::Config;
use crate::services::{AssistantService, CredentialStore, TaskStore};
use crate::services::assistant::AssistantError;

// Application state shared between handlers
#[derive(Clone)]
pub struct AppState {
    pub credentials: CredentialStore,
    pub tasks: TaskStore,
    pub assistant: AssistantService,
    pub config: Config,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self, AssistantError> {
        let credentials = CredentialStore::new(&config.storage.user_file, config.storage.bcrypt_cost);
        let tasks = TaskStore::new(&config.storage.task_file);
        let assistant = AssistantService::from_config(config.assistant.clone())?;

        Ok(Self {
            credentials,
            tasks,
            assistant,
            config,
        })
    }
}
