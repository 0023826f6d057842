//! Server startup integration tests.
//!
//! Spawns the compiled binary against a temp config and exercises the
//! HTTP surface: health, sanitized config, and the job record endpoints.

use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use reqwest::Client;
use tempfile::TempDir;
use tokio::time::sleep;

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Write a minimal valid config into the temp dir
fn write_config(dir: &TempDir, port: u16) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(
        file,
        r#"
[editor]
base_url = "http://127.0.0.1:1"
api_key = "test-key-secret"
raw_profile_id = "p-raw"
jpg_profile_id = "p-jpg"

[server]
host = "127.0.0.1"
port = {}

[database]
path = "{}"

[storage]
root = "{}"

[pipeline]
poll_interval_secs = 3600
"#,
        port,
        dir.path().join("darkroom.db").display(),
        dir.path().join("storage").display(),
    )
    .unwrap();
    path
}

/// Spawn the server and return a handle
fn spawn_server(config_path: &std::path::Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_darkroom"))
        .env("DARKROOM_CONFIG", config_path)
        .env("RUST_LOG", "error") // Quiet logs during tests
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

/// Wait for server to be ready
async fn wait_for_server(client: &Client, port: u16, max_attempts: u32) -> bool {
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/api/v1/health", port))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
        {
            return true;
        }
        sleep(Duration::from_millis(100)).await;
    }
    false
}

#[tokio::test]
async fn test_server_starts_and_serves_health() {
    let dir = TempDir::new().unwrap();
    let port = get_available_port();
    let config_path = write_config(&dir, port);
    let _server = spawn_server(&config_path);

    let client = Client::new();
    assert!(
        wait_for_server(&client, port, 50).await,
        "server did not become ready"
    );
}

#[tokio::test]
async fn test_config_endpoint_redacts_api_key() {
    let dir = TempDir::new().unwrap();
    let port = get_available_port();
    let config_path = write_config(&dir, port);
    let _server = spawn_server(&config_path);

    let client = Client::new();
    assert!(wait_for_server(&client, port, 50).await);

    let body = client
        .get(format!("http://127.0.0.1:{}/api/v1/config", port))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(!body.contains("test-key-secret"));
    assert!(body.contains("api_key_configured"));
}

#[tokio::test]
async fn test_job_record_lifecycle_over_http() {
    let dir = TempDir::new().unwrap();
    let port = get_available_port();
    let config_path = write_config(&dir, port);
    let _server = spawn_server(&config_path);

    let client = Client::new();
    assert!(wait_for_server(&client, port, 50).await);
    let base = format!("http://127.0.0.1:{}/api/v1", port);

    // Create a job record
    let created: serde_json::Value = client
        .post(format!("{}/jobs", base))
        .json(&serde_json::json!({
            "gallery_id": "g-1",
            "raw_keys": ["staging/IMG_0001.CR2", "staging/IMG_0002.CR2"]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let job_id = created["job_id"].as_str().expect("job_id assigned");
    assert_eq!(created["status"], "queued");

    // Read it back
    let fetched: serde_json::Value = client
        .get(format!("{}/jobs/{}", base, job_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["job_id"], job_id);
    assert_eq!(fetched["gallery_id"], "g-1");

    // Listing by status finds it
    let listed: serde_json::Value = client
        .get(format!("{}/jobs?status=queued", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.as_array().unwrap().iter().any(|j| j["job_id"] == job_id));

    // Unknown job is a 404
    let missing = client
        .get(format!("{}/jobs/does-not-exist", base))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);

    // Empty batch is rejected
    let bad = client
        .post(format!("{}/jobs", base))
        .json(&serde_json::json!({ "raw_keys": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), 400);
}

#[tokio::test]
async fn test_poll_endpoint_reports_empty_scan() {
    let dir = TempDir::new().unwrap();
    let port = get_available_port();
    let config_path = write_config(&dir, port);
    let _server = spawn_server(&config_path);

    let client = Client::new();
    assert!(wait_for_server(&client, port, 50).await);

    let report: serde_json::Value = client
        .post(format!("http://127.0.0.1:{}/api/v1/poll", port))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(report["scanned"], 0);
    assert_eq!(report["failed"], 0);
}
