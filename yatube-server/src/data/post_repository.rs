use crate::domain::{Author, DomainError, GroupRef, NewPost, Post, PostFilter};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, author_id: i64, post: NewPost) -> Result<Post, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Post, DomainError>;
    async fn update(&self, id: i64, post: NewPost) -> Result<Post, DomainError>;
    async fn count(&self, filter: PostFilter) -> Result<i64, DomainError>;
    /// Newest first, ties broken by descending id.
    async fn list(
        &self,
        filter: PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, DomainError>;
}

pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_POSTS: &str = r#"
    SELECT p.id, p.text, p.created_at, p.image,
           p.author_id, u.username AS author_username,
           g.id AS group_id, g.title AS group_title, g.slug AS group_slug
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN post_groups g ON g.id = p.group_id
"#;

fn post_from_row(row: &PgRow) -> Result<Post, DomainError> {
    let group_id: Option<i64> = row.try_get("group_id")?;
    let group = match group_id {
        Some(id) => Some(GroupRef {
            id,
            title: row.try_get("group_title")?,
            slug: row.try_get("group_slug")?,
        }),
        None => None,
    };

    Ok(Post {
        id: row.try_get("id")?,
        text: row.try_get("text")?,
        created_at: row.try_get("created_at")?,
        author: Author {
            id: row.try_get("author_id")?,
            username: row.try_get("author_username")?,
        },
        group,
        image: row.try_get("image")?,
    })
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, author_id: i64, post: NewPost) -> Result<Post, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO posts (text, author_id, group_id, image, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id
            "#,
        )
        .bind(&post.text)
        .bind(author_id)
        .bind(post.group_id)
        .bind(&post.image)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create post: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        let id: i64 = row.try_get("id")?;
        self.find_by_id(id).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Post, DomainError> {
        let row = sqlx::query(&format!("{SELECT_POSTS} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => post_from_row(&row),
            None => Err(DomainError::PostNotFound),
        }
    }

    async fn update(&self, id: i64, post: NewPost) -> Result<Post, DomainError> {
        let row = sqlx::query(
            r#"
            UPDATE posts
            SET
                text = $1,
                group_id = $2,
                image = COALESCE($3, image)
            WHERE id = $4
            RETURNING id
            "#,
        )
        .bind(&post.text)
        .bind(post.group_id)
        .bind(&post.image)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(_) => self.find_by_id(id).await,
            None => Err(DomainError::PostNotFound),
        }
    }

    async fn count(&self, filter: PostFilter) -> Result<i64, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count
            FROM posts
            WHERE ($1::BIGINT IS NULL OR group_id = $1)
              AND ($2::BIGINT IS NULL OR author_id = $2)
            "#,
        )
        .bind(filter.group_id)
        .bind(filter.author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        Ok(row.try_get("count")?)
    }

    async fn list(
        &self,
        filter: PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"{SELECT_POSTS}
            WHERE ($1::BIGINT IS NULL OR p.group_id = $1)
              AND ($2::BIGINT IS NULL OR p.author_id = $2)
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(filter.group_id)
        .bind(filter.author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        rows.iter().map(post_from_row).collect()
    }
}
