//! Site content: events, gallery items and blog posts.
//!
//! Every write bumps the shared revision counter, like leaderboard writes.

use chrono::Utc;
use sqlx::Row;

use super::Repository;
use crate::errors::AppError;
use crate::models::{
    BlogPost, CreateBlogPostRequest, CreateEventRequest, CreateGalleryItemRequest, Event,
    GalleryItem, UpdateBlogPostRequest, UpdateEventRequest, UpdateGalleryItemRequest,
};

const EVENT_COLUMNS: &str = "id, title, description, date, time, location, capacity, registered, type, image, tags, featured, updated_at, version";
const GALLERY_COLUMNS: &str = "id, title, description, image, date, category, tags, updated_at, version";
const BLOG_COLUMNS: &str = "id, title, author, body, tags, date, image, updated_at, version";

impl Repository {
    // ==================== EVENT OPERATIONS ====================

    /// List all events, soonest first.
    pub async fn list_events(&self) -> Result<Vec<Event>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM events ORDER BY date, time, title",
            EVENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(event_from_row).collect())
    }

    /// Get an event by ID.
    pub async fn get_event(&self, id: &str) -> Result<Option<Event>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(event_from_row))
    }

    /// Create a new event.
    pub async fn create_event(&self, request: &CreateEventRequest) -> Result<Event, AppError> {
        let event = Event {
            id: uuid::Uuid::new_v4().to_string(),
            title: request.title.trim().to_string(),
            description: request.description.clone(),
            date: request.date.clone(),
            time: request.time.clone(),
            location: request.location.clone(),
            capacity: request.capacity,
            registered: request.registered.unwrap_or(0),
            event_type: request.event_type.clone(),
            image: request.image.clone(),
            tags: request.tags.clone(),
            featured: request.featured,
            updated_at: Utc::now().to_rfc3339(),
            version: 1,
        };

        sqlx::query(
            "INSERT INTO events (id, title, description, date, time, location, capacity, registered, type, image, tags, featured, updated_at, version) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1)",
        )
        .bind(&event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.date)
        .bind(&event.time)
        .bind(&event.location)
        .bind(event.capacity)
        .bind(event.registered)
        .bind(&event.event_type)
        .bind(&event.image)
        .bind(&event.tags)
        .bind(event.featured as i32)
        .bind(&event.updated_at)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;
        Ok(event)
    }

    /// Update an event with optimistic concurrency control.
    pub async fn update_event(
        &self,
        id: &str,
        request: &UpdateEventRequest,
    ) -> Result<Event, AppError> {
        let existing = self
            .get_event(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))?;
        check_version(request.expected_version, existing.version)?;

        let event = Event {
            id: existing.id,
            title: request
                .title
                .as_deref()
                .map(|t| t.trim().to_string())
                .unwrap_or(existing.title),
            description: request.description.clone().or(existing.description),
            date: request.date.clone().or(existing.date),
            time: request.time.clone().or(existing.time),
            location: request.location.clone().or(existing.location),
            capacity: request.capacity.or(existing.capacity),
            registered: request.registered.unwrap_or(existing.registered),
            event_type: request.event_type.clone().or(existing.event_type),
            image: request.image.clone().or(existing.image),
            tags: request.tags.clone().or(existing.tags),
            featured: request.featured.unwrap_or(existing.featured),
            updated_at: Utc::now().to_rfc3339(),
            version: existing.version + 1,
        };

        let result = sqlx::query(
            "UPDATE events SET title = ?, description = ?, date = ?, time = ?, location = ?, capacity = ?, registered = ?, type = ?, image = ?, tags = ?, featured = ?, updated_at = ?, version = ? WHERE id = ? AND version = ?",
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.date)
        .bind(&event.time)
        .bind(&event.location)
        .bind(event.capacity)
        .bind(event.registered)
        .bind(&event.event_type)
        .bind(&event.image)
        .bind(&event.tags)
        .bind(event.featured as i32)
        .bind(&event.updated_at)
        .bind(event.version)
        .bind(id)
        .bind(existing.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current = self.get_event(id).await?.map(|e| e.version);
            return Err(concurrent_modification(current));
        }

        self.increment_revision().await?;
        Ok(event)
    }

    /// Delete an event.
    pub async fn delete_event(&self, id: &str) -> Result<(), AppError> {
        self.delete_row("events", "Event", id).await
    }

    // ==================== GALLERY OPERATIONS ====================

    /// List gallery items, newest first.
    pub async fn list_gallery(&self) -> Result<Vec<GalleryItem>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM gallery ORDER BY date DESC, title",
            GALLERY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(gallery_from_row).collect())
    }

    pub async fn get_gallery_item(&self, id: &str) -> Result<Option<GalleryItem>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM gallery WHERE id = ?", GALLERY_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(gallery_from_row))
    }

    pub async fn create_gallery_item(
        &self,
        request: &CreateGalleryItemRequest,
    ) -> Result<GalleryItem, AppError> {
        let item = GalleryItem {
            id: uuid::Uuid::new_v4().to_string(),
            title: request.title.trim().to_string(),
            description: request.description.clone(),
            image: request.image.clone(),
            date: request.date.clone(),
            category: request.category.clone(),
            tags: request.tags.clone(),
            updated_at: Utc::now().to_rfc3339(),
            version: 1,
        };

        sqlx::query(
            "INSERT INTO gallery (id, title, description, image, date, category, tags, updated_at, version) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1)",
        )
        .bind(&item.id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.image)
        .bind(&item.date)
        .bind(&item.category)
        .bind(&item.tags)
        .bind(&item.updated_at)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;
        Ok(item)
    }

    pub async fn update_gallery_item(
        &self,
        id: &str,
        request: &UpdateGalleryItemRequest,
    ) -> Result<GalleryItem, AppError> {
        let existing = self
            .get_gallery_item(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Gallery item {} not found", id)))?;
        check_version(request.expected_version, existing.version)?;

        let item = GalleryItem {
            id: existing.id,
            title: request
                .title
                .as_deref()
                .map(|t| t.trim().to_string())
                .unwrap_or(existing.title),
            description: request.description.clone().or(existing.description),
            image: request.image.clone().or(existing.image),
            date: request.date.clone().or(existing.date),
            category: request.category.clone().or(existing.category),
            tags: request.tags.clone().or(existing.tags),
            updated_at: Utc::now().to_rfc3339(),
            version: existing.version + 1,
        };

        let result = sqlx::query(
            "UPDATE gallery SET title = ?, description = ?, image = ?, date = ?, category = ?, tags = ?, updated_at = ?, version = ? WHERE id = ? AND version = ?",
        )
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.image)
        .bind(&item.date)
        .bind(&item.category)
        .bind(&item.tags)
        .bind(&item.updated_at)
        .bind(item.version)
        .bind(id)
        .bind(existing.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current = self.get_gallery_item(id).await?.map(|i| i.version);
            return Err(concurrent_modification(current));
        }

        self.increment_revision().await?;
        Ok(item)
    }

    pub async fn delete_gallery_item(&self, id: &str) -> Result<(), AppError> {
        self.delete_row("gallery", "Gallery item", id).await
    }

    // ==================== BLOG OPERATIONS ====================

    /// List blog posts, newest first.
    pub async fn list_blog_posts(&self) -> Result<Vec<BlogPost>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM blog_posts ORDER BY date DESC, title",
            BLOG_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(blog_from_row).collect())
    }

    pub async fn get_blog_post(&self, id: &str) -> Result<Option<BlogPost>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM blog_posts WHERE id = ?", BLOG_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(blog_from_row))
    }

    pub async fn create_blog_post(
        &self,
        request: &CreateBlogPostRequest,
    ) -> Result<BlogPost, AppError> {
        let post = BlogPost {
            id: uuid::Uuid::new_v4().to_string(),
            title: request.title.trim().to_string(),
            author: request.author.clone(),
            body: request.body.clone(),
            tags: request.tags.clone(),
            date: request.date.clone(),
            image: request.image.clone(),
            updated_at: Utc::now().to_rfc3339(),
            version: 1,
        };

        sqlx::query(
            "INSERT INTO blog_posts (id, title, author, body, tags, date, image, updated_at, version) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1)",
        )
        .bind(&post.id)
        .bind(&post.title)
        .bind(&post.author)
        .bind(&post.body)
        .bind(&post.tags)
        .bind(&post.date)
        .bind(&post.image)
        .bind(&post.updated_at)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;
        Ok(post)
    }

    /// Update a blog post with optimistic concurrency control.
    pub async fn update_blog_post(
        &self,
        id: &str,
        request: &UpdateBlogPostRequest,
    ) -> Result<BlogPost, AppError> {
        let existing = self
            .get_blog_post(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Blog post {} not found", id)))?;
        check_version(request.expected_version, existing.version)?;

        let post = BlogPost {
            id: existing.id,
            title: request
                .title
                .as_deref()
                .map(|t| t.trim().to_string())
                .unwrap_or(existing.title),
            author: request.author.clone().or(existing.author),
            body: request.body.clone().or(existing.body),
            tags: request.tags.clone().or(existing.tags),
            date: request.date.clone().or(existing.date),
            image: request.image.clone().or(existing.image),
            updated_at: Utc::now().to_rfc3339(),
            version: existing.version + 1,
        };

        let result = sqlx::query(
            "UPDATE blog_posts SET title = ?, author = ?, body = ?, tags = ?, date = ?, image = ?, updated_at = ?, version = ? WHERE id = ? AND version = ?",
        )
        .bind(&post.title)
        .bind(&post.author)
        .bind(&post.body)
        .bind(&post.tags)
        .bind(&post.date)
        .bind(&post.image)
        .bind(&post.updated_at)
        .bind(post.version)
        .bind(id)
        .bind(existing.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current = self.get_blog_post(id).await?.map(|p| p.version);
            return Err(concurrent_modification(current));
        }

        self.increment_revision().await?;
        Ok(post)
    }

    pub async fn delete_blog_post(&self, id: &str) -> Result<(), AppError> {
        self.delete_row("blog_posts", "Blog post", id).await
    }

    /// Hard delete by id from one of the content tables.
    async fn delete_row(&self, table: &str, label: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", table))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{} {} not found", label, id)));
        }

        self.increment_revision().await?;
        Ok(())
    }
}

fn check_version(expected: Option<i64>, current: i64) -> Result<(), AppError> {
    match expected {
        Some(expected) if expected != current => Err(AppError::Conflict {
            message: format!(
                "Version mismatch: expected {}, current {}",
                expected, current
            ),
            current_version: current,
        }),
        _ => Ok(()),
    }
}

fn concurrent_modification(current_version: Option<i64>) -> AppError {
    AppError::Conflict {
        message: "Concurrent modification detected".to_string(),
        current_version: current_version.unwrap_or(0),
    }
}

// Helper functions for row conversion

fn event_from_row(row: &sqlx::sqlite::SqliteRow) -> Event {
    let featured: i32 = row.get("featured");
    Event {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        date: row.get("date"),
        time: row.get("time"),
        location: row.get("location"),
        capacity: row.get("capacity"),
        registered: row.get("registered"),
        event_type: row.get("type"),
        image: row.get("image"),
        tags: row.get("tags"),
        featured: featured != 0,
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    }
}

fn gallery_from_row(row: &sqlx::sqlite::SqliteRow) -> GalleryItem {
    GalleryItem {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        image: row.get("image"),
        date: row.get("date"),
        category: row.get("category"),
        tags: row.get("tags"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    }
}

fn blog_from_row(row: &sqlx::sqlite::SqliteRow) -> BlogPost {
    BlogPost {
        id: row.get("id"),
        title: row.get("title"),
        author: row.get("author"),
        body: row.get("body"),
        tags: row.get("tags"),
        date: row.get("date"),
        image: row.get("image"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    async fn repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("content.sqlite"))
            .await
            .expect("Failed to init DB");
        (Repository::new(pool), temp_dir)
    }

    fn post(title: &str) -> CreateBlogPostRequest {
        CreateBlogPostRequest {
            title: title.to_string(),
            author: Some("Maya".to_string()),
            body: None,
            tags: None,
            date: Some("2025-02-01".to_string()),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_stale_version_is_rejected() {
        let (repo, _dir) = repo().await;
        let created = repo.create_blog_post(&post("Intro to Rust")).await.unwrap();

        let update = UpdateBlogPostRequest {
            title: None,
            author: None,
            body: Some("Ownership first.".to_string()),
            tags: None,
            date: None,
            image: None,
            expected_version: Some(created.version),
        };
        let updated = repo.update_blog_post(&created.id, &update).await.unwrap();
        assert_eq!(updated.version, 2);
        assert_eq!(updated.author.as_deref(), Some("Maya"));

        // same expected version again is now stale
        match repo.update_blog_post(&created.id, &update).await {
            Err(AppError::Conflict {
                current_version, ..
            }) => assert_eq!(current_version, 2),
            other => panic!("expected conflict, got {:?}", other.map(|p| p.version)),
        }
    }

    #[tokio::test]
    async fn test_content_writes_bump_revision() {
        let (repo, _dir) = repo().await;
        let start = repo.get_revision_id().await.unwrap();

        let event = repo
            .create_event(&CreateEventRequest {
                title: " Hack Night ".to_string(),
                description: None,
                date: Some("2025-03-14".to_string()),
                time: None,
                location: None,
                capacity: Some(40),
                registered: None,
                event_type: Some("Workshop".to_string()),
                image: None,
                tags: None,
                featured: true,
            })
            .await
            .unwrap();
        assert_eq!(event.title, "Hack Night");
        assert_eq!(event.registered, 0);

        repo.delete_event(&event.id).await.unwrap();
        assert_eq!(repo.get_revision_id().await.unwrap(), start + 2);
        assert!(matches!(
            repo.delete_event(&event.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_gallery_newest_first() {
        let (repo, _dir) = repo().await;
        for (title, date) in [("Orientation", "2024-08-01"), ("Hackathon", "2025-01-20")] {
            repo.create_gallery_item(&CreateGalleryItemRequest {
                title: title.to_string(),
                description: None,
                image: None,
                date: Some(date.to_string()),
                category: None,
                tags: None,
            })
            .await
            .unwrap();
        }

        let titles: Vec<String> = repo
            .list_gallery()
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.title)
            .collect();
        assert_eq!(titles, vec!["Hackathon", "Orientation"]);
    }
}
