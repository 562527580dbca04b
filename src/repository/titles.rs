//! Titles repository for database operations

use sqlx::{Pool, Postgres, Row};
use std::collections::HashMap;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::Author,
        title::{CreateTitle, Title, TitleDetails, UpdateTitle, DEFAULT_SUBJECT},
    },
};

/// True if the error is a Postgres unique-constraint violation (23505)
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[derive(Clone)]
pub struct TitlesRepository {
    pool: Pool<Postgres>,
}

impl TitlesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get title by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Title> {
        sqlx::query_as::<_, Title>("SELECT * FROM titles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Title with id {} not found", id)))
    }

    /// Get title with its authors
    pub async fn get_details(&self, id: i32) -> AppResult<TitleDetails> {
        let title = self.get_by_id(id).await?;
        let mut details = self.attach_authors(vec![title]).await?;
        Ok(details.remove(0))
    }

    /// List all titles with their authors
    pub async fn list(&self) -> AppResult<Vec<TitleDetails>> {
        let titles = sqlx::query_as::<_, Title>("SELECT * FROM titles ORDER BY title")
            .fetch_all(&self.pool)
            .await?;
        self.attach_authors(titles).await
    }

    /// List titles by author through the many-to-many relation
    pub async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<TitleDetails>> {
        let titles = sqlx::query_as::<_, Title>(
            r#"
            SELECT t.*
            FROM titles t
            JOIN title_authors ta ON ta.title_id = t.id
            WHERE ta.author_id = $1
            ORDER BY t.title
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        self.attach_authors(titles).await
    }

    /// List titles actively reserved by a user (returned_at unset)
    pub async fn list_reserved_by(&self, user_id: i32) -> AppResult<Vec<TitleDetails>> {
        let titles = sqlx::query_as::<_, Title>(
            r#"
            SELECT t.*
            FROM titles t
            JOIN reservations r ON r.title_id = t.id
            WHERE r.user_id = $1 AND r.returned_at IS NULL
            ORDER BY t.title
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        self.attach_authors(titles).await
    }

    /// Create a new title and attach its authors
    pub async fn create(&self, title: &CreateTitle) -> AppResult<TitleDetails> {
        let mut tx = self.pool.begin().await?;

        let subject = title
            .subject
            .clone()
            .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());

        let created = sqlx::query_as::<_, Title>(
            r#"
            INSERT INTO titles
                (isbn, title, year_published, publisher_id, description, notes, subject, comments)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&title.isbn)
        .bind(&title.title)
        .bind(title.year_published)
        .bind(title.publisher_id)
        .bind(&title.description)
        .bind(title.notes.as_deref())
        .bind(&subject)
        .bind(title.comments.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("A title with ISBN {} already exists", title.isbn))
            } else {
                e.into()
            }
        })?;

        for author_id in &title.author_ids {
            sqlx::query("INSERT INTO title_authors (title_id, author_id) VALUES ($1, $2)")
                .bind(created.id)
                .bind(author_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get_details(created.id).await
    }

    /// Update an existing title; replaces the author set when provided
    pub async fn update(&self, id: i32, title: &UpdateTitle) -> AppResult<TitleDetails> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Title>(
            r#"
            UPDATE titles
            SET isbn = COALESCE($1, isbn),
                title = COALESCE($2, title),
                year_published = COALESCE($3, year_published),
                publisher_id = COALESCE($4, publisher_id),
                description = COALESCE($5, description),
                notes = COALESCE($6, notes),
                subject = COALESCE($7, subject),
                comments = COALESCE($8, comments)
            WHERE id = $9
            RETURNING *
            "#,
        )
        .bind(title.isbn.as_deref())
        .bind(title.title.as_deref())
        .bind(title.year_published)
        .bind(title.publisher_id)
        .bind(title.description.as_deref())
        .bind(title.notes.as_deref())
        .bind(title.subject.as_deref())
        .bind(title.comments.as_deref())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("A title with this ISBN already exists".to_string())
            } else {
                AppError::from(e)
            }
        })?
        .ok_or_else(|| AppError::NotFound(format!("Title with id {} not found", id)))?;

        if let Some(ref author_ids) = title.author_ids {
            sqlx::query("DELETE FROM title_authors WHERE title_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for author_id in author_ids {
                sqlx::query("INSERT INTO title_authors (title_id, author_id) VALUES ($1, $2)")
                    .bind(id)
                    .bind(author_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        self.get_details(updated.id).await
    }

    /// Record the stored cover image path for a title
    pub async fn set_cover(&self, id: i32, path: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE titles SET cover_image = $1 WHERE id = $2")
            .bind(path)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Title with id {} not found", id)));
        }
        Ok(())
    }

    /// Delete a title
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Title with id {} not found", id)));
        }
        Ok(())
    }

    /// Resolve the authors of each title in one query
    async fn attach_authors(&self, titles: Vec<Title>) -> AppResult<Vec<TitleDetails>> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = titles.iter().map(|t| t.id).collect();
        let rows = sqlx::query(
            r#"
            SELECT ta.title_id, a.id, a.name, a.year_born
            FROM title_authors ta
            JOIN authors a ON a.id = ta.author_id
            WHERE ta.title_id = ANY($1)
            ORDER BY a.name
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_title: HashMap<i32, Vec<Author>> = HashMap::new();
        for row in rows {
            let title_id: i32 = row.get("title_id");
            by_title.entry(title_id).or_default().push(Author {
                id: row.get("id"),
                name: row.get("name"),
                year_born: row.get("year_born"),
            });
        }

        Ok(titles
            .into_iter()
            .map(|title| {
                let authors = by_title.remove(&title.id).unwrap_or_default();
                TitleDetails { title, authors }
            })
            .collect())
    }
}
