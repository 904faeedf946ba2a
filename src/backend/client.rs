use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::wire::{GraphStats, RawGraph};

/// Blocking HTTP client for the graph backend. Every call is made from a worker thread.
#[derive(Clone, Debug)]
pub struct BackendClient {
    base_url: String,
    push_path: String,
    http: Client,
}

impl BackendClient {
    pub fn new(base_url: &str, push_path: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            push_path: push_path.to_owned(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn fetch_graph(&self, collection_id: Option<&str>) -> Result<RawGraph> {
        let path = match collection_id {
            Some(id) => format!("/graph/notebook/{id}"),
            None => "/graph/all".to_owned(),
        };
        self.get_json(&path, &[])
            .with_context(|| format!("failed to load graph snapshot from {path}"))
    }

    pub fn fetch_stats(&self, collection_id: Option<&str>) -> Result<GraphStats> {
        let query = collection_id
            .map(|id| vec![("notebook_id", id)])
            .unwrap_or_default();
        self.get_json("/graph/stats", &query)
            .context("failed to load graph stats")
    }

    pub fn source_count(&self, collection_id: &str) -> Result<usize> {
        let path = format!("/sources/{collection_id}");
        let sources: Value = self
            .get_json(&path, &[])
            .with_context(|| format!("failed to list sources for {collection_id}"))?;
        sources
            .as_array()
            .map(Vec::len)
            .ok_or_else(|| anyhow!("source listing for {collection_id} is not an array"))
    }

    pub fn build_graph(&self, collection_id: &str) -> Result<()> {
        let url = self.url(&format!("/graph/build/{collection_id}"));
        let response = self
            .http
            .post(&url)
            .send()
            .with_context(|| format!("failed to request build for {collection_id}"))?;
        Self::check(response, &url)
    }

    pub fn cluster_graph(&self) -> Result<()> {
        let url = self.url("/graph/cluster");
        let response = self
            .http
            .post(&url)
            .send()
            .context("failed to request clustering")?;
        Self::check(response, &url)
    }

    pub fn reset_graph(&self, collection_id: &str) -> Result<()> {
        let url = self.url(&format!("/graph/reset/{collection_id}"));
        let response = self
            .http
            .delete(&url)
            .send()
            .with_context(|| format!("failed to reset graph for {collection_id}"))?;
        Self::check(response, &url)
    }

    /// WebSocket URL of the push channel derived from the HTTP base URL.
    pub fn push_url(&self) -> String {
        push_url_for(&self.base_url, &self.push_path)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.url(path);
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .with_context(|| format!("GET {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("GET {url} returned HTTP {status}"));
        }

        response
            .json::<T>()
            .with_context(|| format!("GET {url} returned an unexpected body"))
    }

    fn check(response: Response, url: &str) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(anyhow!("{url} returned HTTP {status}"))
        }
    }
}

fn push_url_for(base_url: &str, push_path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let socket_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_owned()
    };
    format!("{socket_base}{push_path}")
}
