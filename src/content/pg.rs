use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Arc;

use super::{parse_document, render_document, ContentError, ContentStore, PageKey};

/// Postgres backend: one row per page in `page_content`.
///
/// The body is kept as the rendered text rather than JSONB so the stored
/// formatting and key order are exactly what was written. A row upsert is
/// atomic, so readers never see a partial document.
#[derive(Debug, Clone)]
pub struct PgContentStore {
    pool: Arc<PgPool>,
}

impl PgContentStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn read(&self, page: PageKey) -> Result<Value, ContentError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT body FROM page_content WHERE page = $1")
            .bind(page.as_str())
            .fetch_optional(self.pool.as_ref())
            .await?;

        match row {
            Some((body,)) => parse_document(page, body.as_bytes()),
            None => Err(ContentError::NotFound(page)),
        }
    }

    async fn write(&self, page: PageKey, value: &Value) -> Result<(), ContentError> {
        let rendered = render_document(value)?;

        sqlx::query(
            r#"
            INSERT INTO page_content (page, body, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (page) DO UPDATE SET
                body = EXCLUDED.body,
                updated_at = now()
            "#,
        )
        .bind(page.as_str())
        .bind(&rendered)
        .execute(self.pool.as_ref())
        .await?;

        tracing::debug!(page = %page, bytes = rendered.len(), "upserted page content");
        Ok(())
    }

    async fn exists(&self, page: PageKey) -> Result<bool, ContentError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM page_content WHERE page = $1)")
                .bind(page.as_str())
                .fetch_one(self.pool.as_ref())
                .await?;
        Ok(exists)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
