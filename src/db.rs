use crate::error::StoreError;
use crate::model::{NewTranslation, Translation};
use crate::store::TranslationStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

/// PostgreSQL-backed translation store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to the database and create tables
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        let store = Self::from_pool(pool);
        store.init_schema().await?;

        info!("✓ Database ready");
        Ok(store)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS translations (
                id SERIAL PRIMARY KEY,
                original_text TEXT NOT NULL,
                translated_text TEXT NOT NULL,
                source_lang TEXT NOT NULL,
                target_lang TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create translations table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_translations_target_lang
             ON translations (target_lang)",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create target_lang index")?;

        Ok(())
    }
}

#[async_trait]
impl TranslationStore for PgStore {
    async fn save(&self, translation: NewTranslation) -> Result<Translation, StoreError> {
        let saved = sqlx::query_as::<_, Translation>(
            "INSERT INTO translations (original_text, translated_text, source_lang, target_lang)
             VALUES ($1, $2, $3, $4)
             RETURNING id, original_text, translated_text, source_lang, target_lang",
        )
        .bind(&translation.original_text)
        .bind(&translation.translated_text)
        .bind(&translation.source_lang)
        .bind(&translation.target_lang)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }

    async fn find_all(&self) -> Result<Vec<Translation>, StoreError> {
        let rows = sqlx::query_as::<_, Translation>(
            "SELECT id, original_text, translated_text, source_lang, target_lang
             FROM translations
             ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Translation>, StoreError> {
        let row = sqlx::query_as::<_, Translation>(
            "SELECT id, original_text, translated_text, source_lang, target_lang
             FROM translations
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_target_lang(
        &self,
        target_lang: &str,
    ) -> Result<Vec<Translation>, StoreError> {
        let rows = sqlx::query_as::<_, Translation>(
            "SELECT id, original_text, translated_text, source_lang, target_lang
             FROM translations
             WHERE target_lang = $1
             ORDER BY id",
        )
        .bind(target_lang)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn delete_by_id(&self, id: i32) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM translations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }
}
