//! Best-server lookup against the speedtest.net server directory
//!
//! The directory returns servers ordered by distance from the client. The
//! closest few are probed for latency via the `latency.txt` file every
//! speedtest server publishes next to its upload endpoint, and the one with
//! the lowest mean latency wins.

use super::{BestServer, BestServerLookup, ServerRecord};
use crate::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use url::Url;

/// Probes per candidate server
const PROBES_PER_SERVER: u32 = 3;

/// Latency charged for a failed probe
const FAILED_PROBE_PENALTY: Duration = Duration::from_secs(3600);

/// Expected body prefix of `latency.txt`
const LATENCY_BODY: &str = "test=test";

/// speedtest.net directory client
pub struct SpeedtestNetLookup {
    client: Client,
    servers_url: String,
    candidate_limit: usize,
    verbose: bool,
}

impl SpeedtestNetLookup {
    /// Create a lookup with explicit settings
    pub fn with_config(
        servers_url: impl Into<String>,
        candidate_limit: usize,
        timeout: Duration,
        verbose: bool,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", crate::PKG_NAME, crate::VERSION))
            .build()
            .map_err(|e| AppError::server_selection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            servers_url: servers_url.into(),
            candidate_limit: candidate_limit.max(1),
            verbose,
        })
    }

    /// Fetch the server directory, closest first
    pub async fn fetch_servers(&self) -> Result<Vec<ServerRecord>> {
        if self.verbose {
            eprintln!("[SERVER] Fetching server list from: {}", self.servers_url);
        }

        let response = self.client.get(&self.servers_url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::server_selection(format!(
                "Server list request returned HTTP {}",
                response.status()
            )));
        }

        let servers: Vec<ServerRecord> = response
            .json()
            .await
            .map_err(|e| AppError::server_selection(format!("Failed to parse server list: {}", e)))?;

        if self.verbose {
            eprintln!("[SERVER] Server list contains {} entries", servers.len());
        }

        Ok(servers)
    }

    /// URL of the latency probe published next to `upload_url`
    pub fn latency_url(upload_url: &str) -> Result<Url> {
        let base = Url::parse(upload_url)
            .map_err(|e| AppError::server_selection(format!("Invalid server URL '{}': {}", upload_url, e)))?;
        base.join("latency.txt")
            .map_err(|e| AppError::server_selection(format!("Cannot derive latency URL from '{}': {}", upload_url, e)))
    }

    /// Mean latency over `PROBES_PER_SERVER` probes, failed probes penalised
    pub async fn measure_latency(&self, server: &ServerRecord) -> Result<Duration> {
        let mut probe_url = Self::latency_url(&server.url)?;
        let mut total = Duration::ZERO;

        for _ in 0..PROBES_PER_SERVER {
            let stamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis();
            probe_url.set_query(Some(&format!("x={}", stamp)));

            total += match self.probe_once(&probe_url).await {
                Some(elapsed) => elapsed,
                None => FAILED_PROBE_PENALTY,
            };
        }

        Ok(total / PROBES_PER_SERVER)
    }

    async fn probe_once(&self, url: &Url) -> Option<Duration> {
        let start = Instant::now();
        let response = self.client.get(url.clone()).send().await.ok()?;
        if response.status() != StatusCode::OK {
            return None;
        }
        let body = response.text().await.ok()?;
        let elapsed = start.elapsed();
        body.trim_start().starts_with(LATENCY_BODY).then_some(elapsed)
    }
}

#[async_trait]
impl BestServerLookup for SpeedtestNetLookup {
    async fn best_server(&self) -> Result<BestServer> {
        let servers = self.fetch_servers().await?;
        if servers.is_empty() {
            return Err(AppError::server_selection("Server list is empty"));
        }

        let mut best: Option<BestServer> = None;
        for server in servers.into_iter().take(self.candidate_limit) {
            let latency = match self.measure_latency(&server).await {
                Ok(latency) => latency,
                Err(e) => {
                    if self.verbose {
                        eprintln!("[SERVER] Skipping {}: {}", server.id, e);
                    }
                    continue;
                }
            };

            // Every probe failed
            if latency >= FAILED_PROBE_PENALTY {
                if self.verbose {
                    eprintln!("[SERVER] {} did not answer its latency probe", server);
                }
                continue;
            }

            let latency_ms = latency.as_secs_f64() * 1000.0;
            if self.verbose {
                eprintln!("[SERVER] {} latency {:.2} ms", server, latency_ms);
            }

            let is_better = best.as_ref().map_or(true, |b| latency_ms < b.latency_ms);
            if is_better {
                best = Some(BestServer { record: server, latency_ms });
            }
        }

        best.ok_or_else(|| AppError::server_selection("No candidate server answered its latency probe"))
    }
}
