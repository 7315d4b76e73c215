//! Client commands that talk to a running server (hash, get, stats, shutdown)

use anyhow::{Context, Result, bail};
use hashvault::StatsReport;
use reqwest::{StatusCode, header};

/// Thin HTTP client for a hashvault server
pub struct Client {
  base_url: String,
  http: reqwest::Client,
}

impl Client {
  /// Accepts `host:port` or a full `http://` URL
  pub fn new(addr: &str) -> Self {
    let addr = addr.trim_end_matches('/');
    let base_url = if addr.starts_with("http://") || addr.starts_with("https://") {
      addr.to_string()
    } else {
      format!("http://{}", addr)
    };
    Self {
      base_url,
      http: reqwest::Client::new(),
    }
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  /// Reserve an id for `password`
  pub async fn hash(&self, password: &str) -> Result<u64> {
    let body = serde_urlencoded::to_string([("password", password)])?;
    let response = self
      .http
      .post(self.url("/hash"))
      .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
      .body(body)
      .send()
      .await
      .with_context(|| format!("Failed to reach server at {}", self.base_url))?;

    let status = response.status();
    let text = response.text().await?;
    if status != StatusCode::CREATED {
      bail!("Server returned {}: {}", status, text.trim());
    }
    text
      .trim()
      .parse()
      .with_context(|| format!("Unexpected id in response: {:?}", text))
  }

  /// Fetch a digest; `None` while unknown or still pending
  pub async fn get(&self, id: u64) -> Result<Option<String>> {
    let response = self
      .http
      .get(self.url(&format!("/hash/{}", id)))
      .send()
      .await
      .with_context(|| format!("Failed to reach server at {}", self.base_url))?;

    match response.status() {
      StatusCode::OK => Ok(Some(response.text().await?)),
      StatusCode::NOT_FOUND => Ok(None),
      status => bail!("Server returned {}: {}", status, response.text().await?.trim()),
    }
  }

  pub async fn stats(&self) -> Result<StatsReport> {
    let response = self
      .http
      .get(self.url("/stats"))
      .send()
      .await
      .with_context(|| format!("Failed to reach server at {}", self.base_url))?;

    if !response.status().is_success() {
      bail!("Server returned {}", response.status());
    }
    response.json().await.context("Malformed stats response")
  }

  /// Ask the server to drain and exit
  pub async fn shutdown(&self) -> Result<()> {
    let response = self
      .http
      .post(self.url("/shutdown"))
      .send()
      .await
      .with_context(|| format!("Failed to reach server at {}", self.base_url))?;

    if !response.status().is_success() {
      bail!("Server returned {}", response.status());
    }
    Ok(())
  }
}

pub async fn cmd_hash(addr: &str, password: &str) -> Result<()> {
  let id = Client::new(addr).hash(password).await?;
  println!("{}", id);
  Ok(())
}

pub async fn cmd_get(addr: &str, id: u64) -> Result<()> {
  match Client::new(addr).get(id).await? {
    Some(digest) => {
      println!("{}", digest);
      Ok(())
    }
    None => bail!("Hash {} not found (unknown id, or its digest is still pending)", id),
  }
}

pub async fn cmd_stats(addr: &str, json: bool) -> Result<()> {
  let report = Client::new(addr).stats().await?;

  if json {
    println!("{}", serde_json::to_string_pretty(&report)?);
    return Ok(());
  }

  println!("hashvault Statistics");
  println!("====================\n");
  println!("Requests:       {}", report.total);
  println!("Avg latency:    {} µs", report.average);
  Ok(())
}

pub async fn cmd_shutdown(addr: &str) -> Result<()> {
  Client::new(addr).shutdown().await?;
  println!("Shutdown requested; the server exits once pending digests are stored");
  Ok(())
}
