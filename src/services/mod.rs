mod flat_file;
mod completion_types;
pub mod credential_store;
pub mod task_store;
pub mod presentation;
pub mod assistant;

pub use credential_store::CredentialStore;
pub use task_store::TaskStore;
pub use assistant::AssistantService;
