use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use escola_api::config::AppConfig;
use escola_api::database::MemoryStore;
use escola_api::AppState;

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Starts the router on an unused port, backed by a fresh in-memory store.
    /// The server lives as long as the test's runtime.
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.api.port = port;
        config.api.enable_request_logging = false;

        let state = AppState::new(Arc::new(MemoryStore::new()), config.filter.clone());
        let app = escola_api::app(state, &config.api);
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self { port, base_url, client: reqwest::Client::new() };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline { break; }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn create_class(&self, name: &str, capacity: i64) -> Result<i64> {
        let res = self
            .client
            .post(self.url("/turmas"))
            .json(&json!({ "name": name, "capacity": capacity }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create class failed: {}", res.status());
        let body = res.json::<Value>().await?;
        body["id"].as_i64().context("class id missing")
    }

    pub async fn create_student(&self, name: &str, email: Option<&str>, status: &str) -> Result<i64> {
        let res = self
            .client
            .post(self.url("/alunos"))
            .json(&json!({
                "name": name,
                "birth_date": "2010-03-15",
                "email": email,
                "status": status,
            }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create student failed: {}", res.status());
        let body = res.json::<Value>().await?;
        body["id"].as_i64().context("student id missing")
    }

    pub async fn enroll(&self, student_id: i64, class_id: i64) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/matriculas"))
            .json(&json!({ "student_id": student_id, "class_id": class_id }))
            .send()
            .await?)
    }
}
