//! Database repository for leaderboard entries and admin accounts.
//!
//! Uses prepared statements and transactions for data integrity.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    CreateEntryRequest, LeaderboardEntry, LeaderboardPage, LeaderboardQuery, RevisionInfo,
    UpdateEntryRequest, User,
};
use crate::ranking;
use crate::scoring::{derive_score, resolve_score, score_key};

const ENTRY_COLUMNS: &str = "id, name, department, batch, score, updated_at, version";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pub(super) pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    /// Increment the revision ID and return the new value.
    pub async fn increment_revision(&self) -> Result<i64, AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(&now)
            .execute(&self.pool)
            .await?;
        self.get_revision_id().await
    }

    // ==================== LEADERBOARD ====================

    /// Answer a leaderboard query.
    ///
    /// One snapshot of the whole population is read and ranked in memory, so
    /// every row's rank comes from the same committed state.
    pub async fn leaderboard(&self, query: &LeaderboardQuery) -> Result<LeaderboardPage, AppError> {
        let entries = self.list_entries().await?;
        let page = ranking::rank(&entries, query);
        tracing::debug!(
            population = entries.len(),
            total = page.total,
            page = page.page,
            limit = page.limit,
            "Ranked leaderboard"
        );
        Ok(page)
    }

    /// Fill in derived scores for entries stored without one.
    ///
    /// Only rows whose score is still NULL are touched, so running it twice is
    /// harmless. Returns the number of entries updated.
    pub async fn backfill_scores(&self) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query("SELECT id, name, batch FROM leaderboard WHERE score IS NULL")
            .fetch_all(&mut *tx)
            .await?;

        let now = Utc::now().to_rfc3339();
        let mut updated = 0;
        for row in &rows {
            let id: String = row.get("id");
            let name: String = row.get("name");
            let batch: Option<String> = row.get("batch");
            let score = derive_score(&score_key(&name, batch.as_deref()));

            let result = sqlx::query(
                "UPDATE leaderboard SET score = ?, updated_at = ?, version = version + 1 WHERE id = ? AND score IS NULL",
            )
            .bind(score)
            .bind(&now)
            .bind(&id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() > 0 {
                tracing::info!("Set score={} for {}", score, name);
                updated += result.rows_affected();
            }
        }

        if updated > 0 {
            sqlx::query(
                "UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1",
            )
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(updated)
    }

    // ==================== ENTRY OPERATIONS ====================

    /// List all entries.
    pub async fn list_entries(&self) -> Result<Vec<LeaderboardEntry>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM leaderboard ORDER BY name",
            ENTRY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(entry_from_row).collect())
    }

    /// Get an entry by ID.
    pub async fn get_entry(&self, id: &str) -> Result<Option<LeaderboardEntry>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM leaderboard WHERE id = ?",
            ENTRY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(entry_from_row))
    }

    /// Find the entry for a member of a department, used to keep seeding idempotent.
    pub async fn find_entry_by_name_department(
        &self,
        name: &str,
        department: &str,
    ) -> Result<Option<LeaderboardEntry>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM leaderboard WHERE name = ? AND department = ? LIMIT 1",
            ENTRY_COLUMNS
        ))
        .bind(name)
        .bind(department)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(entry_from_row))
    }

    /// Create a new entry. A missing score is derived from name and batch.
    ///
    /// Name and department are stored trimmed, the same way the department
    /// filter reads them.
    pub async fn create_entry(
        &self,
        request: &CreateEntryRequest,
    ) -> Result<LeaderboardEntry, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let name = request.name.trim().to_string();
        let department = request.department.trim().to_string();
        let score = resolve_score(request.score, &name, request.batch.as_deref());

        sqlx::query(
            "INSERT INTO leaderboard (id, name, department, batch, score, updated_at, version) VALUES (?, ?, ?, ?, ?, ?, 1)",
        )
        .bind(&id)
        .bind(&name)
        .bind(&department)
        .bind(&request.batch)
        .bind(score)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;

        Ok(LeaderboardEntry {
            id,
            name,
            department,
            batch: request.batch.clone(),
            score,
            updated_at: now,
            version: 1,
        })
    }

    /// Update an entry with optimistic concurrency control.
    pub async fn update_entry(
        &self,
        id: &str,
        request: &UpdateEntryRequest,
    ) -> Result<LeaderboardEntry, AppError> {
        let existing = self
            .get_entry(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Entry {} not found", id)))?;

        if let Some(expected) = request.expected_version {
            if existing.version != expected {
                return Err(AppError::Conflict {
                    message: format!(
                        "Version mismatch: expected {}, current {}",
                        expected, existing.version
                    ),
                    current_version: existing.version,
                });
            }
        }

        let now = Utc::now().to_rfc3339();
        let new_version = existing.version + 1;

        let name = trimmed(request.name.as_deref()).unwrap_or(existing.name);
        let department = trimmed(request.department.as_deref()).unwrap_or(existing.department);
        let batch = request.batch.clone().or(existing.batch);
        let score = request.score.unwrap_or(existing.score);

        // Conditional UPDATE with version check to prevent lost updates
        let result = sqlx::query(
            "UPDATE leaderboard SET name = ?, department = ?, batch = ?, score = ?, updated_at = ?, version = ? WHERE id = ? AND version = ?",
        )
        .bind(&name)
        .bind(&department)
        .bind(&batch)
        .bind(score)
        .bind(&now)
        .bind(new_version)
        .bind(id)
        .bind(existing.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current = self.get_entry(id).await?;
            return Err(AppError::Conflict {
                message: "Concurrent modification detected".to_string(),
                current_version: current.map(|e| e.version).unwrap_or(0),
            });
        }

        self.increment_revision().await?;

        Ok(LeaderboardEntry {
            id: id.to_string(),
            name,
            department,
            batch,
            score,
            updated_at: now,
            version: new_version,
        })
    }

    /// Delete an entry.
    pub async fn delete_entry(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM leaderboard WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Entry {} not found", id)));
        }

        self.increment_revision().await?;
        Ok(())
    }

    // ==================== USER OPERATIONS ====================

    /// Look up an admin account by username.
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Create an admin account from an already hashed password.
    pub async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        if self.find_user_by_username(username).await?.is_some() {
            return Err(AppError::Duplicate(format!(
                "User '{}' already exists",
                username
            )));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query("INSERT INTO users (id, username, password_hash, created_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(username)
            .bind(password_hash)
            .bind(&now)
            .execute(&self.pool)
            .await?;

        Ok(User {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
        })
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

// Helper functions for row conversion

fn entry_from_row(row: &sqlx::sqlite::SqliteRow) -> LeaderboardEntry {
    let score: Option<i64> = row.get("score");
    LeaderboardEntry {
        id: row.get("id"),
        name: row.get("name"),
        department: row.get("department"),
        batch: row.get("batch"),
        score: score.unwrap_or(0),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    }
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }
}
