//! Loading the results payload, over HTTP or from a saved response.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use sha2::{Digest, Sha256};
use url::Url;

use crate::config::Config;
use crate::logging::{log_fetch, log_fetch_failed};
use crate::record::{BenchmarkRecord, ResultsResponse};

#[async_trait]
pub trait ResultSource {
    /// Where the payload comes from, for logs.
    fn describe(&self) -> String;

    /// Raw response body.
    async fn fetch_body(&self) -> Result<Vec<u8>>;
}

pub struct HttpSource {
    client: Client,
    url: Url,
}

impl HttpSource {
    /// `timeout: None` waits for the backend indefinitely.
    pub fn new(url: Url, timeout: Option<Duration>) -> Self {
        let builder = match timeout {
            Some(t) => Client::builder().timeout(t),
            None => Client::builder(),
        };
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            url,
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self::new(cfg.results_url()?, cfg.request_timeout()))
    }
}

#[async_trait]
impl ResultSource for HttpSource {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    async fn fetch_body(&self) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .with_context(|| format!("GET {}", self.url))?;
        let status = resp.status();
        // the results endpoint answers 201 on success
        if !status.is_success() {
            return Err(anyhow!("GET {} returned {}", self.url, status));
        }
        let body = resp.bytes().await.context("reading response body")?;
        Ok(body.to_vec())
    }
}

/// A response body saved to disk.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ResultSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch_body(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))
    }
}

pub fn payload_digest(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

pub fn parse_response(body: &[u8]) -> Result<ResultsResponse> {
    serde_json::from_slice(body).context("response body is not a results payload")
}

/// Fetch and decode the payload. Failures are logged before being returned.
pub async fn load_records(source: &(dyn ResultSource + Send + Sync)) -> Result<Vec<BenchmarkRecord>> {
    let started = Instant::now();
    let origin = source.describe();
    let outcome = async {
        let body = source.fetch_body().await?;
        let response = parse_response(&body)?;
        Ok::<_, anyhow::Error>((payload_digest(&body), response))
    }
    .await;

    match outcome {
        Ok((digest, response)) => {
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            log_fetch(&origin, response.payload.len(), &digest, elapsed_ms);
            Ok(response.payload)
        }
        Err(e) => {
            log_fetch_failed(&origin, &format!("{:#}", e));
            Err(e)
        }
    }
}
