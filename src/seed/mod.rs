//! Offline admin tooling: admin accounts and leaderboard seeding.
//!
//! This is the only place that derives scores in bulk. Derived values are
//! persisted, so the read path never needs to compute them.

use std::path::Path;

use serde::Deserialize;

use crate::auth::hash_password;
use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{CreateEntryRequest, UpdateEntryRequest};
use crate::scoring::resolve_score;

const UNKNOWN: &str = "Unknown";

/// Cohort label; team data files carry either a year number or free text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Batch {
    Year(i64),
    Label(String),
}

impl Batch {
    fn label(&self) -> String {
        match self {
            Batch::Year(year) => year.to_string(),
            Batch::Label(label) => label.clone(),
        }
    }
}

/// One team member from a seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedMember {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub batch: Option<Batch>,
    #[serde(default)]
    pub points: Option<i64>,
    #[serde(default)]
    pub score: Option<i64>,
}

impl SeedMember {
    fn resolved_name(&self) -> String {
        non_blank(self.name.as_deref()).unwrap_or(UNKNOWN).to_string()
    }

    fn resolved_department(&self) -> String {
        non_blank(self.department.as_deref()).unwrap_or(UNKNOWN).to_string()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Read a JSON array of team members.
pub async fn load_members(path: &Path) -> Result<Vec<SeedMember>, AppError> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::BadRequest(format!("Failed to read {}: {}", path.display(), e))
    })?;
    Ok(serde_json::from_str(&raw)?)
}

/// Insert a leaderboard entry per member, keyed by (name, department).
///
/// Explicit `points` win over `score`; members with neither get a derived
/// score. Existing entries are skipped unless `force` is set, in which case
/// their score is overwritten.
pub async fn seed_leaderboard(
    repo: &Repository,
    members: &[SeedMember],
    force: bool,
) -> Result<SeedSummary, AppError> {
    let mut summary = SeedSummary::default();

    for member in members {
        let name = member.resolved_name();
        let department = member.resolved_department();
        let batch = member.batch.as_ref().map(Batch::label);
        let score = resolve_score(member.points.or(member.score), &name, batch.as_deref());

        match repo.find_entry_by_name_department(&name, &department).await? {
            Some(existing) if force => {
                let update = UpdateEntryRequest {
                    name: None,
                    department: None,
                    batch: None,
                    score: Some(score),
                    expected_version: Some(existing.version),
                };
                repo.update_entry(&existing.id, &update).await?;
                summary.updated += 1;
                tracing::info!("Updated leaderboard entry for {} ({})", name, department);
            }
            Some(_) => {
                summary.skipped += 1;
                tracing::info!("Skipping existing leaderboard entry for {} ({})", name, department);
            }
            None => {
                let request = CreateEntryRequest {
                    name: name.clone(),
                    department: department.clone(),
                    batch,
                    score: Some(score),
                };
                repo.create_entry(&request).await?;
                summary.inserted += 1;
                tracing::info!("Inserted leaderboard entry for {} ({})", name, department);
            }
        }
    }

    tracing::info!(
        "Leaderboard seeding completed. Inserted: {}, Updated: {}, Skipped: {}",
        summary.inserted,
        summary.updated,
        summary.skipped
    );
    Ok(summary)
}

/// Create an admin account. Returns `false` when the username is already taken.
pub async fn create_admin(
    repo: &Repository,
    username: &str,
    password: &str,
) -> Result<bool, AppError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    let password_hash = hash_password(password)?;
    match repo.create_user(username, &password_hash).await {
        Ok(user) => {
            tracing::info!("Admin user '{}' created", user.username);
            Ok(true)
        }
        Err(AppError::Duplicate(_)) => {
            tracing::warn!("Admin user '{}' already exists", username);
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::db::init_database;
    use crate::models::LeaderboardQuery;
    use tempfile::TempDir;

    async fn repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("seed.sqlite"))
            .await
            .expect("Failed to init DB");
        (Repository::new(pool), temp_dir)
    }

    fn members() -> Vec<SeedMember> {
        serde_json::from_value(serde_json::json!([
            { "name": "Maya Singh", "department": "Development", "batch": 2024 },
            { "name": "Priya Verma", "department": "Design", "batch": "2025", "points": 40 },
            { "name": "Liu Wei", "department": "AIML", "score": 700 },
            { "department": "Design" }
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn test_seed_inserts_then_skips() {
        let (repo, _dir) = repo().await;

        let first = seed_leaderboard(&repo, &members(), false).await.unwrap();
        assert_eq!(first.inserted, 4);

        let second = seed_leaderboard(&repo, &members(), false).await.unwrap();
        assert_eq!(
            second,
            SeedSummary {
                inserted: 0,
                updated: 0,
                skipped: 4
            }
        );
        assert_eq!(repo.list_entries().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_seed_scores() {
        let (repo, _dir) = repo().await;
        seed_leaderboard(&repo, &members(), false).await.unwrap();

        fn score_of(entries: &[crate::models::LeaderboardEntry], name: &str) -> i64 {
            entries.iter().find(|e| e.name == name).unwrap().score
        }
        let entries = repo.list_entries().await.unwrap();
        assert_eq!(score_of(&entries, "Maya Singh"), 724);
        assert_eq!(score_of(&entries, "Priya Verma"), 40);
        assert_eq!(score_of(&entries, "Liu Wei"), 700);
        // nameless member falls back to "Unknown" with a derived score
        assert_eq!(score_of(&entries, "Unknown"), crate::scoring::derive_score("Unknown-"));
    }

    #[tokio::test]
    async fn test_seed_force_overwrites() {
        let (repo, _dir) = repo().await;
        seed_leaderboard(&repo, &members(), false).await.unwrap();

        let changed: Vec<SeedMember> = serde_json::from_value(serde_json::json!([
            { "name": "Liu Wei", "department": "AIML", "points": 5 }
        ]))
        .unwrap();
        let summary = seed_leaderboard(&repo, &changed, true).await.unwrap();
        assert_eq!(summary.updated, 1);

        let entry = repo
            .find_entry_by_name_department("Liu Wei", "AIML")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.score, 5);
        assert_eq!(entry.version, 2);
    }

    #[tokio::test]
    async fn test_backfill_fills_only_missing_scores() {
        let (repo, dir) = repo().await;
        seed_leaderboard(&repo, &members(), false).await.unwrap();

        // simulate an imported row without a score
        let pool = init_database(&dir.path().join("seed.sqlite")).await.unwrap();
        sqlx::query("INSERT INTO leaderboard (id, name, department, batch, score, updated_at) VALUES ('raw', 'admin1', 'Web', '2024', NULL, '2025-01-01')")
            .execute(&pool)
            .await
            .unwrap();

        let before = repo.leaderboard(&LeaderboardQuery::default()).await.unwrap();
        let raw = before.data.iter().find(|r| r.id == "raw").unwrap();
        // unscored rows read as 0 until backfilled
        assert_eq!(raw.score, 0);

        assert_eq!(repo.backfill_scores().await.unwrap(), 1);
        assert_eq!(repo.backfill_scores().await.unwrap(), 0);

        let entry = repo.get_entry("raw").await.unwrap().unwrap();
        assert_eq!(entry.score, 135);
    }

    #[tokio::test]
    async fn test_create_admin() {
        let (repo, _dir) = repo().await;

        assert!(create_admin(&repo, "admin", "admin123").await.unwrap());
        assert!(!create_admin(&repo, "admin", "other").await.unwrap());

        let user = repo.find_user_by_username("admin").await.unwrap().unwrap();
        assert!(verify_password(&user.password_hash, "admin123"));
        assert!(create_admin(&repo, " ", "x").await.is_err());
    }

    #[tokio::test]
    async fn test_load_members_missing_file() {
        let err = load_members(Path::new("/nonexistent/members.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_load_members_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("members.json");
        tokio::fs::write(
            &path,
            r#"[{ "name": "Maya Singh", "department": "Development", "batch": 2024 }]"#,
        )
        .await
        .unwrap();

        let members = load_members(&path).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].resolved_name(), "Maya Singh");
    }
}
