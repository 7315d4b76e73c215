//! Common test utilities for end-to-end HTTP tests
//!
//! Each test runs a real daemon on an ephemeral localhost port and talks to
//! it with reqwest.

use std::time::Duration;

use hashvault::{Daemon, DaemonError, RuntimeConfig, config::Config};
use tokio::{net::TcpListener, task::JoinHandle};

/// Upper bound for anything that should finish promptly
#[allow(dead_code)]
pub const STUCK: Duration = Duration::from_secs(5);

/// A daemon serving on an ephemeral port
pub struct TestDaemon {
  pub base_url: String,
  pub client: reqwest::Client,
  pub task: JoinHandle<Result<(), DaemonError>>,
}

#[allow(dead_code)]
impl TestDaemon {
  pub async fn start(hash_delay: Duration) -> Self {
    let mut config = Config::default();
    config.server.hash_delay_ms = hash_delay.as_millis() as u64;

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");

    let daemon = Daemon::new(RuntimeConfig { config });
    let task = tokio::spawn(daemon.serve(listener));

    Self {
      base_url: format!("http://{}", addr),
      client: reqwest::Client::new(),
      task,
    }
  }

  pub fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  /// POST /hash with a url-encoded password
  pub async fn post_hash(&self, password: &str) -> reqwest::Response {
    let body = serde_urlencoded::to_string([("password", password)]).expect("Failed to encode form");

    self
      .client
      .post(self.url("/hash"))
      .header("content-type", "application/x-www-form-urlencoded")
      .body(body)
      .send()
      .await
      .expect("POST /hash failed")
  }

  pub async fn get(&self, path: &str) -> reqwest::Response {
    self.client.get(self.url(path)).send().await.expect("GET failed")
  }

  pub async fn shutdown(&self) -> reqwest::Response {
    self
      .client
      .post(self.url("/shutdown"))
      .send()
      .await
      .expect("POST /shutdown failed")
  }

  /// Wait for `serve` to return
  pub async fn join(self) -> Result<(), DaemonError> {
    tokio::time::timeout(STUCK, self.task)
      .await
      .expect("daemon did not stop")
      .expect("daemon task panicked")
  }
}
