//! Publishers repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::publisher::{CreatePublisher, Publisher, UpdatePublisher},
};

#[derive(Clone)]
pub struct PublishersRepository {
    pool: Pool<Postgres>,
}

impl PublishersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get publisher by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Publisher> {
        sqlx::query_as::<_, Publisher>("SELECT * FROM publishers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Publisher with id {} not found", id)))
    }

    /// List all publishers
    pub async fn list(&self) -> AppResult<Vec<Publisher>> {
        let publishers = sqlx::query_as::<_, Publisher>("SELECT * FROM publishers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(publishers)
    }

    /// Create a new publisher
    pub async fn create(&self, publisher: &CreatePublisher) -> AppResult<Publisher> {
        let created = sqlx::query_as::<_, Publisher>(
            r#"
            INSERT INTO publishers
                (name, company_name, address, city, state, zip, telephone, fax, comments)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&publisher.name)
        .bind(&publisher.company_name)
        .bind(&publisher.address)
        .bind(&publisher.city)
        .bind(&publisher.state)
        .bind(&publisher.zip)
        .bind(&publisher.telephone)
        .bind(&publisher.fax)
        .bind(&publisher.comments)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Update an existing publisher
    pub async fn update(&self, id: i32, publisher: &UpdatePublisher) -> AppResult<Publisher> {
        let updated = sqlx::query_as::<_, Publisher>(
            r#"
            UPDATE publishers
            SET name = COALESCE($1, name),
                company_name = COALESCE($2, company_name),
                address = COALESCE($3, address),
                city = COALESCE($4, city),
                state = COALESCE($5, state),
                zip = COALESCE($6, zip),
                telephone = COALESCE($7, telephone),
                fax = COALESCE($8, fax),
                comments = COALESCE($9, comments)
            WHERE id = $10
            RETURNING *
            "#,
        )
        .bind(publisher.name.as_deref())
        .bind(publisher.company_name.as_deref())
        .bind(publisher.address.as_deref())
        .bind(publisher.city.as_deref())
        .bind(publisher.state.as_deref())
        .bind(publisher.zip.as_deref())
        .bind(publisher.telephone.as_deref())
        .bind(publisher.fax.as_deref())
        .bind(publisher.comments.as_deref())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Publisher with id {} not found", id)))?;
        Ok(updated)
    }

    /// Delete a publisher
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM publishers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Publisher with id {} not found",
                id
            )));
        }
        Ok(())
    }
}
