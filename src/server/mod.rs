//! Selection of the speedtest server every run is measured against

pub mod speedtest_net;

pub use speedtest_net::SpeedtestNetLookup;

use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A server as listed by the speedtest.net server directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Upload endpoint; the latency probe lives next to it
    pub url: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub sponsor: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub distance: Option<f64>,
}

impl fmt::Display for ServerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {}) [id {}]", self.sponsor, self.name, self.country, self.id)
    }
}

/// The directory serves ids as strings, older mirrors as numbers
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

/// Result of a best-server lookup
#[derive(Debug, Clone, PartialEq)]
pub struct BestServer {
    pub record: ServerRecord,
    /// Mean latency of the probes, in milliseconds
    pub latency_ms: f64,
}

/// Something that can pick the best server automatically
#[async_trait]
pub trait BestServerLookup: Send + Sync {
    async fn best_server(&self) -> Result<BestServer>;
}

/// How the server id was obtained
#[derive(Debug, Clone, PartialEq)]
pub enum ServerSource {
    /// Supplied by the caller
    Explicit,
    /// Chosen by latency probing
    BestServer(BestServer),
}

/// Server id handed to the external tool
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedServer {
    pub id: String,
    pub source: ServerSource,
}

impl SelectedServer {
    /// Short human-readable description
    pub fn describe(&self) -> String {
        match &self.source {
            ServerSource::Explicit => format!("server {} (explicit)", self.id),
            ServerSource::BestServer(best) => {
                format!("{} at {:.2} ms", best.record, best.latency_ms)
            }
        }
    }
}

/// Picks the server: explicit id if given, otherwise the lookup's answer
pub struct ServerSelector<'a> {
    lookup: &'a dyn BestServerLookup,
}

impl<'a> ServerSelector<'a> {
    pub fn new(lookup: &'a dyn BestServerLookup) -> Self {
        Self { lookup }
    }

    /// Determine the server id, failing with `ServerSelection` when none can be found
    pub async fn select(&self, explicit: Option<&str>) -> Result<SelectedServer> {
        if let Some(id) = explicit {
            let id = id.trim();
            if id.is_empty() {
                return Err(AppError::config("Server identifier cannot be empty"));
            }
            return Ok(SelectedServer {
                id: id.to_string(),
                source: ServerSource::Explicit,
            });
        }

        let best = self.lookup.best_server().await.map_err(|e| match e {
            AppError::ServerSelection(_) => e,
            other => AppError::server_selection(other.to_string()),
        })?;

        if best.record.id.trim().is_empty() {
            return Err(AppError::server_selection("Best server has no id"));
        }

        Ok(SelectedServer {
            id: best.record.id.clone(),
            source: ServerSource::BestServer(best),
        })
    }
}
