use crate::domain::group::CreateGroupRequest;
use crate::domain::{DomainError, Group};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn create(&self, req: CreateGroupRequest) -> Result<Group, DomainError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Group, DomainError>;
    /// All groups ordered by title.
    async fn list(&self) -> Result<Vec<Group>, DomainError>;
}

pub struct PostgresGroupRepository {
    pool: PgPool,
}

impl PostgresGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn group_from_row(row: &PgRow) -> Result<Group, DomainError> {
    Ok(Group {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
    })
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn create(&self, req: CreateGroupRequest) -> Result<Group, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO post_groups (title, slug, description)
            VALUES ($1, $2, $3)
            RETURNING id, title, slug, description
            "#,
        )
        .bind(&req.title)
        .bind(&req.slug)
        .bind(&req.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create group: {}", e);
            match e.as_database_error() {
                Some(db) if db.is_unique_violation() => DomainError::GroupAlreadyExists,
                _ => DomainError::DatabaseError(e.to_string()),
            }
        })?;

        group_from_row(&row)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Group, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, slug, description
            FROM post_groups
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => group_from_row(&row),
            None => Err(DomainError::GroupNotFound),
        }
    }

    async fn list(&self) -> Result<Vec<Group>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, slug, description
            FROM post_groups
            ORDER BY title, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        rows.iter().map(group_from_row).collect()
    }
}
