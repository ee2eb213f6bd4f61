//! REST client for the keyed leaderboard store.
//!
//! The store holds one document per user at `leaderboard/{user_id}.json`;
//! writes replace the whole document (last write wins).

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use super::{rank_entries, rank_of, LeaderboardEntry, LeaderboardSink};
use crate::error::LeaderboardError;

const COLLECTION: &str = "leaderboard";

#[derive(Debug, Clone)]
pub struct LeaderboardClient {
    http: Client,
    base: Url,
}

impl LeaderboardClient {
    /// # Errors
    /// Returns an error if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, LeaderboardError> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }
        Ok(Self {
            http: Client::new(),
            base,
        })
    }

    fn url_for(&self, segments: &[&str]) -> Result<Url, LeaderboardError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Write (replace) this user's entry.
    pub async fn put_entry(&self, entry: &LeaderboardEntry) -> Result<(), LeaderboardError> {
        let doc = format!("{}.json", entry.user_id);
        let url = self.url_for(&[COLLECTION, &doc])?;
        self.http
            .put(url)
            .json(entry)
            .send()
            .await?
            .error_for_status()?;
        debug!(user_id = %entry.user_id, "leaderboard entry written");
        Ok(())
    }

    /// Every entry, unsorted. Malformed documents are skipped.
    pub async fn fetch_all(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let url = self.url_for(&[&format!("{COLLECTION}.json")])?;
        let docs: Option<HashMap<String, serde_json::Value>> = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(docs
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, value)| match serde_json::from_value(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!(key = %key, error = %e, "skipping malformed leaderboard entry");
                    None
                }
            })
            .collect())
    }

    /// Highest-ranked `count` entries.
    pub async fn top(&self, count: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let mut ranked = rank_entries(self.fetch_all().await?);
        ranked.truncate(count);
        Ok(ranked)
    }

    /// 1-based rank of `user_id`, `None` if the user has no entry.
    pub async fn rank(&self, user_id: &str) -> Result<Option<usize>, LeaderboardError> {
        let ranked = rank_entries(self.fetch_all().await?);
        Ok(rank_of(&ranked, user_id))
    }
}

/// Publishes on a tokio runtime without waiting for the result.
/// Failures are logged and dropped; nothing is retried.
#[derive(Debug, Clone)]
pub struct TokioLeaderboardSink {
    client: Arc<LeaderboardClient>,
    handle: tokio::runtime::Handle,
}

impl TokioLeaderboardSink {
    pub fn new(client: LeaderboardClient, handle: tokio::runtime::Handle) -> Self {
        Self {
            client: Arc::new(client),
            handle,
        }
    }
}

impl LeaderboardSink for TokioLeaderboardSink {
    fn publish(&self, entry: LeaderboardEntry) {
        let client = Arc::clone(&self.client);
        self.handle.spawn(async move {
            if let Err(e) = client.put_entry(&entry).await {
                warn!(error = ?e, "failed to update leaderboard");
            }
        });
    }
}
