mod auth;
mod tasks;
mod render;

pub use auth::{serve_index, show_register, show_login, handle_register, handle_login, handle_logout, set_theme};
pub use tasks::{serve_main_app, add_task, update_task, delete_task, status_chart, status_stats, ask_assistant};
