//! Leaderboard entry model and admin write requests.

use serde::{Deserialize, Serialize};

/// A ranked participant as stored in the `leaderboard` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: String,
    pub name: String,
    pub department: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,
    pub score: i64,
    pub updated_at: String,
    /// Internal version for optimistic concurrency control
    #[serde(default)]
    pub version: i64,
}

/// Request body for creating a leaderboard entry.
///
/// `points` is accepted as an alias of `score`. When neither is given the
/// score is derived from name and batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    pub name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub batch: Option<String>,
    #[serde(default, alias = "points")]
    pub score: Option<i64>,
}

/// Request body for updating an existing leaderboard entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub batch: Option<String>,
    #[serde(default, alias = "points")]
    pub score: Option<i64>,
    /// Expected version for optimistic concurrency control
    #[serde(default)]
    pub expected_version: Option<i64>,
}
