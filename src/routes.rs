use axum::{
    routing::{get, post},
    Router,
    middleware::from_fn,
};
use tower_http::{
    services::ServeDir,
    limit::RequestBodyLimitLayer,
};
use tower_sessions::{MemoryStore, SessionManagerLayer};
use tower_sessions::cookie::SameSite;
use crate::{handlers, middleware, state::AppState};

pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    // Session store setup
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(config.session.secure)
        .with_same_site(SameSite::Lax)
        .with_name(config.session.cookie_name.clone());

    Router::new()
        // Login / registration views
        .route("/", get(handlers::serve_index))
        .route("/register", get(handlers::show_register).post(handlers::handle_register))
        .route("/login", get(handlers::show_login).post(handlers::handle_login))
        .route("/logout", get(handlers::handle_logout))
        .route("/theme", post(handlers::set_theme))

        // Main app
        .route("/tasks", get(handlers::serve_main_app).post(handlers::add_task))
        .route("/tasks/chart.svg", get(handlers::status_chart))
        .route("/tasks/stats", get(handlers::status_stats))
        .route("/tasks/:task_id", post(handlers::update_task))
        .route("/tasks/:task_id/delete", post(handlers::delete_task))
        .route("/ask", post(handlers::ask_assistant))

        // Static files
        .nest_service("/static", ServeDir::new(&config.server.static_dir))

        .layer(from_fn(middleware::require_auth))
        .layer(session_layer)
        .layer(RequestBodyLimitLayer::new(config.server.max_body_size))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use crate::config::{AssistantConfig, Config, ServerConfig, SessionConfig, StorageConfig};
    use crate::models::TaskStatus;
    use crate::services::AssistantService;

    fn test_config(dir: &Path, api_base_url: &str) -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
                templates_dir: "templates".into(),
                static_dir: "static".into(),
                max_body_size: 64 * 1024,
            },
            storage: StorageConfig {
                task_file: dir.join("tasks.csv").to_string_lossy().into_owned(),
                user_file: dir.join("users.csv").to_string_lossy().into_owned(),
                bcrypt_cost: 4,
            },
            assistant: AssistantConfig {
                api_base_url: api_base_url.into(),
                model: "gpt-3.5-turbo".into(),
                api_key_env: "OPENAI_API_KEY".into(),
                timeout_secs: 2,
                max_prompt_rows: 50,
            },
            session: SessionConfig {
                cookie_name: "session".into(),
                secure: false,
            },
        }
    }

    fn test_state(dir: &TempDir, api_base_url: &str) -> AppState {
        let mut state = AppState::from_config(test_config(dir.path(), api_base_url)).unwrap();
        state.assistant =
            AssistantService::with_api_key(state.config.assistant.clone(), "test-key").unwrap();
        state
    }

    /// Drives the router like a browser, carrying the session cookie along.
    struct Client {
        app: Router,
        cookie: Option<String>,
    }

    impl Client {
        fn new(state: AppState) -> Self {
            Self { app: build_router(state), cookie: None }
        }

        async fn send(&mut self, mut request: Request<Body>) -> Response {
            if let Some(cookie) = &self.cookie {
                request
                    .headers_mut()
                    .insert(header::COOKIE, cookie.parse().unwrap());
            }
            let response = self.app.clone().oneshot(request).await.unwrap();
            if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
                let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
                self.cookie = Some(pair.to_string());
            }
            response
        }

        async fn get(&mut self, uri: &str) -> Response {
            self.send(Request::builder().uri(uri).body(Body::empty()).unwrap()).await
        }

        async fn post(&mut self, uri: &str, form: &str) -> Response {
            let request = Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap();
            self.send(request).await
        }
    }

    fn location(response: &Response) -> String {
        response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string())
            .unwrap_or_default()
    }

    fn flash(path: &str, key: &str, message: &str) -> String {
        format!("{}?{}={}", path, key, urlencoding::encode(message))
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn logged_in_client(state: AppState) -> Client {
        let mut client = Client::new(state);
        client
            .post("/register", "username=alice&password=pw&confirm_password=pw")
            .await;
        let response = client.post("/login", "username=alice&password=pw").await;
        assert_eq!(location(&response), "/tasks");
        client
    }

    #[tokio::test]
    async fn protected_pages_redirect_to_login() {
        let dir = tempdir().unwrap();
        let mut client = Client::new(test_state(&dir, "http://127.0.0.1:9"));

        for uri in ["/tasks", "/tasks/stats", "/tasks/chart.svg"] {
            let response = client.get(uri).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(location(&response), "/");
        }

        let response = client.get("/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Login"));
    }

    #[tokio::test]
    async fn register_and_login_flow() {
        let dir = tempdir().unwrap();
        let state = test_state(&dir, "http://127.0.0.1:9");
        let credentials = state.credentials.clone();
        let mut client = Client::new(state);

        client.get("/register").await;
        let page = body_text(client.get("/").await).await;
        assert!(page.contains("Confirm Password"));

        let response = client
            .post("/register", "username=alice&password=pw&confirm_password=other")
            .await;
        assert_eq!(location(&response), flash("/", "error", "Passwords do not match."));

        let response = client
            .post("/register", "username=alice&password=pw&confirm_password=pw")
            .await;
        assert_eq!(location(&response), flash("/", "notice", "Registered! Please log in."));

        let response = client
            .post("/register", "username=alice&password=pw&confirm_password=pw")
            .await;
        assert_eq!(location(&response), flash("/", "error", "Username exists."));
        assert_eq!(credentials.load_users().unwrap().len(), 1);

        let response = client.post("/login", "username=alice&password=nope").await;
        assert_eq!(location(&response), flash("/", "error", "Wrong password."));

        let response = client.post("/login", "username=bob&password=pw").await;
        assert_eq!(location(&response), flash("/", "error", "User not found."));

        let response = client.post("/login", "username=alice&password=pw").await;
        assert_eq!(location(&response), "/tasks");

        let page = body_text(client.get("/tasks").await).await;
        assert!(page.contains("Logged in as: alice"));
        assert!(page.contains("No tasks added yet."));

        client.get("/logout").await;
        let response = client.get("/tasks").await;
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn task_crud_through_forms() {
        let dir = tempdir().unwrap();
        let state = test_state(&dir, "http://127.0.0.1:9");
        let store = state.tasks.clone();
        let mut client = logged_in_client(state).await;

        let response = client
            .post("/tasks", "title=&priority=High&entry_date=2024-01-01&exit_date=2024-01-05")
            .await;
        assert_eq!(location(&response), flash("/tasks", "error", "Task title required."));

        let response = client
            .post("/tasks", "title=T1&priority=High&entry_date=2024-01-01&exit_date=2024-01-05")
            .await;
        assert_eq!(location(&response), flash("/tasks", "notice", "Task added!"));

        let tasks = store.load_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].status, TaskStatus::Pending);
        let id = tasks[0].id;

        let page = body_text(client.get("/tasks").await).await;
        assert!(page.contains("⭐⭐⭐"));
        assert!(page.contains("/tasks/chart.svg"));

        let response = client
            .post(
                &format!("/tasks/{}", id),
                "title=T1&priority=High&entry_date=2024-01-01&exit_date=2024-01-05&status=Completed",
            )
            .await;
        assert_eq!(location(&response), flash("/tasks", "notice", "Updated!"));
        let updated = store.load_tasks().unwrap();
        assert_eq!(updated[0].status, TaskStatus::Completed);
        assert_eq!(updated[0].title, "T1");

        let response = client.get("/tasks/stats").await;
        let stats: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(stats, json!([{"status": "Completed", "count": 1}]));

        let response = client.get("/tasks/chart.svg").await;
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
        assert!(body_text(response).await.contains("Completed 1"));

        let response = client.post(&format!("/tasks/{}/delete", id), "").await;
        assert_eq!(location(&response), flash("/tasks", "notice", "Deleted!"));
        assert!(store.load_tasks().unwrap().is_empty());

        let response = client.post(&format!("/tasks/{}/delete", id), "").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn placeholder_like_title_is_shown_literally() {
        let dir = tempdir().unwrap();
        let mut client = logged_in_client(test_state(&dir, "http://127.0.0.1:9")).await;
        client
            .post(
                "/tasks",
                "title=%7B%7Bchart%7D%7D&priority=Low&entry_date=2024-01-01&exit_date=2024-01-05",
            )
            .await;

        let page = body_text(client.get("/tasks").await).await;
        // Table cell, edit summary and the edit form's value attribute.
        assert_eq!(page.matches("{{chart}}").count(), 3);
        assert!(page.contains(r#"value="{{chart}}""#));
        assert_eq!(page.matches("/tasks/chart.svg").count(), 1);
    }

    #[tokio::test]
    async fn unknown_priority_or_status_is_flashed() {
        let dir = tempdir().unwrap();
        let state = test_state(&dir, "http://127.0.0.1:9");
        let store = state.tasks.clone();
        let mut client = logged_in_client(state).await;

        let response = client
            .post("/tasks", "title=T1&priority=Urgent&entry_date=2024-01-01&exit_date=2024-01-05")
            .await;
        assert_eq!(location(&response), flash("/tasks", "error", "Invalid task details."));
        assert!(store.load_tasks().unwrap().is_empty());

        client
            .post("/tasks", "title=T1&priority=Low&entry_date=2024-01-01&exit_date=2024-01-05")
            .await;
        let id = store.load_tasks().unwrap()[0].id;

        let response = client
            .post(
                &format!("/tasks/{}", id),
                "title=T1&priority=Low&entry_date=2024-01-01&exit_date=2024-01-05&status=Done",
            )
            .await;
        assert_eq!(location(&response), flash("/tasks", "error", "Invalid task details."));
        assert_eq!(store.load_tasks().unwrap()[0].status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn assistant_answer_is_shown_on_main_page() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Start with T1."}}]
            })))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let mut client = logged_in_client(test_state(&dir, &server.uri())).await;
        client
            .post("/tasks", "title=T1&priority=Low&entry_date=2024-01-01&exit_date=2024-01-05")
            .await;

        let response = client.post("/ask", "question=What+first%3F").await;
        assert_eq!(location(&response), "/tasks");

        let page = body_text(client.get("/tasks").await).await;
        assert!(page.contains("AI Says:"));
        assert!(page.contains("Start with T1."));
    }

    #[tokio::test]
    async fn assistant_failure_does_not_break_the_session() {
        let dir = tempdir().unwrap();
        let mut client = logged_in_client(test_state(&dir, "http://127.0.0.1:9")).await;
        client
            .post("/tasks", "title=T1&priority=Low&entry_date=2024-01-01&exit_date=2024-01-05")
            .await;

        let response = client.post("/ask", "question=hello").await;
        assert_eq!(location(&response), "/tasks");

        let response = client.get("/tasks").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Error: "));
    }

    #[tokio::test]
    async fn theme_selection() {
        let dir = tempdir().unwrap();
        let mut client = Client::new(test_state(&dir, "http://127.0.0.1:9"));

        let response = client.post("/theme", "theme=Sky").await;
        assert_eq!(location(&response), "/");
        let page = body_text(client.get("/").await).await;
        assert!(page.contains(r#"<option value="Sky" selected>"#));

        let response = client.post("/theme", "theme=Neon").await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
