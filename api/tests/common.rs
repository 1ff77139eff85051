use std::sync::Arc;

use anyhow::Result;
use futures::Future;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

pub use crate::client::*;

use pr_reviewers_api::Server;
use pr_reviewers_db::MemoryStore;

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    /// A client set to the base url of the server.
    pub client: TestClient,
}

async fn start_app() -> Result<TestApp> {
    let config = pr_reviewers_api::config::Config {
        database_url: String::new(),
        database_pool_size: 1,
        port: 0, // Bind to random port
        host: "127.0.0.1".to_string(),
        honeycomb_team: None,
        honeycomb_dataset: String::new(),
        env: "test".to_string(),
    };
    Lazy::force(&pr_reviewers_test::TRACING);

    let store = Arc::new(MemoryStore::new());
    let Server { server, host, port } = pr_reviewers_api::build_server(config, store.clone())?;
    tokio::task::spawn(server);

    let base_url = format!("http://{}:{}", host, port);
    let client = TestClient {
        base: base_url,
        client: reqwest::ClientBuilder::new()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Building client"),
    };

    Ok(TestApp { store, client })
}

pub async fn run_app_test<F, R>(f: F)
where
    F: FnOnce(TestApp) -> R,
    R: Future<Output = Result<(), anyhow::Error>>,
{
    let app = start_app().await.expect("Starting app");
    f(app).await.unwrap();
}

impl TestApp {
    /// Create a team where every listed member is active.
    pub async fn add_team(&self, name: &str, members: &[&str]) -> Result<()> {
        let members = members
            .iter()
            .map(|id| json!({ "user_id": id, "username": format!("User {id}"), "is_active": true }))
            .collect::<Vec<_>>();

        let response = self
            .client
            .post("team/add")
            .json(&json!({ "team_name": name, "members": members }))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 201, "creating team {name}");
        Ok(())
    }

    /// Create a pull request and return its sorted reviewer ids.
    pub async fn create_pr(&self, id: &str, author: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .post("pullRequests/create")
            .json(&json!({
                "pull_request_id": id,
                "pull_request_name": format!("Change {id}"),
                "author_id": author,
            }))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 201, "creating pull request {id}");

        let body: Value = response.json().await?;
        Ok(reviewer_ids(&body["pr"]))
    }
}

/// The sorted `assigned_reviewers` of a serialized pull request.
pub fn reviewer_ids(pr: &Value) -> Vec<String> {
    let mut ids = pr["assigned_reviewers"]
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    ids.sort();
    ids
}

/// The `error.code` of an error response.
pub async fn error_code(response: reqwest::Response) -> Result<String> {
    let body: Value = response.json().await?;
    Ok(body["error"]["code"].as_str().unwrap_or_default().to_string())
}
