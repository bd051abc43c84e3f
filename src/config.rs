use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub assistant: AssistantConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub templates_dir: String,
    pub static_dir: String,
    pub max_body_size: usize,  // in bytes
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub task_file: String,
    pub user_file: String,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssistantConfig {
    pub api_base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub max_prompt_rows: usize,  // 0 = no cap
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub secure: bool,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config/default")
    }

    // Environment overrides use nested keys, e.g. APP__SERVER__PORT=9000
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses() {
        let config = Config::load_from("config/default").unwrap();
        assert_eq!(config.assistant.model, "gpt-3.5-turbo");
        assert_eq!(config.assistant.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.storage.task_file, "data/tasks.csv");
        assert_eq!(config.session.cookie_name, "session");
        assert!(config.assistant.timeout_secs > 0);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Config::load_from("config/does_not_exist").is_err());
    }
}
