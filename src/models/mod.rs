mod user;
mod forms;
mod task;
mod session;
mod assistant;

pub use user::{User, AuthOutcome};
pub use forms::{LoginForm, RegisterForm, TaskForm, TaskUpdateForm, AskForm, ThemeForm, PageQuery};
pub use task::{Task, TaskFields, TaskSelector, Priority, TaskStatus};
pub use session::{SessionState, View};
pub use assistant::AssistantReply;
