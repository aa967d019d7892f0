//! PostgreSQL record store implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Postgres, Row, Transaction};

use crate::domain::cache_entry::{CacheEntry, CacheEntryId, CacheScope, NewCacheEntry};
use crate::domain::record_store::{RecordStore, RecordTransaction};
use crate::domain::user::UserId;
use crate::domain::DomainError;

const ENTRY_COLUMNS: &str = "id, scope, user_id, prompt_language, embedding, content, \
                             usage_count, created_at, updated_at";

/// PostgreSQL implementation of RecordStore over the `cache_entries` table
#[derive(Debug, Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    /// Create a new store with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn begin(&self) -> Result<Box<dyn RecordTransaction>, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        Ok(Box::new(PostgresRecordTransaction { tx }))
    }

    async fn list_all(&self) -> Result<Vec<CacheEntry>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM cache_entries ORDER BY id",
            ENTRY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list cache entries: {}", e)))?;

        rows.iter().map(row_to_entry).collect()
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cache_entries")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count cache entries: {}", e)))?;

        Ok(count as usize)
    }
}

/// Transaction over `cache_entries`; dropping it without commit rolls back
struct PostgresRecordTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl RecordTransaction for PostgresRecordTransaction {
    async fn insert(&mut self, entry: NewCacheEntry) -> Result<CacheEntry, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO cache_entries (scope, user_id, prompt_language, embedding, content,
                                       usage_count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, 0, $6, $6)
            RETURNING id
            "#,
        )
        .bind(entry.scope().as_str())
        .bind(entry.user_id().map(|u| u.value()))
        .bind(entry.language())
        .bind(entry.embedding_bytes())
        .bind(entry.content())
        .bind(entry.created_at())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to insert cache entry: {}", e)))?;

        Ok(entry.with_id(CacheEntryId::new(id)))
    }

    async fn get(&mut self, id: CacheEntryId) -> Result<Option<CacheEntry>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM cache_entries WHERE id = $1",
            ENTRY_COLUMNS
        ))
        .bind(id.value())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get cache entry: {}", e)))?;

        row.as_ref().map(row_to_entry).transpose()
    }

    async fn record_hit(&mut self, id: CacheEntryId, at: DateTime<Utc>) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE cache_entries SET usage_count = usage_count + 1, updated_at = $2 WHERE id = $1",
        )
        .bind(id.value())
        .bind(at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to record cache hit: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Cache entry '{}' not found",
                id
            )));
        }

        Ok(())
    }

    async fn find_stale_before(
        &mut self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<CacheEntryId>, DomainError> {
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM cache_entries WHERE updated_at < $1 ORDER BY id")
                .bind(cutoff)
                .fetch_all(&mut *self.tx)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to find stale cache entries: {}", e))
                })?;

        Ok(ids.into_iter().map(CacheEntryId::new).collect())
    }

    async fn find_lowest_usage(&mut self, limit: usize) -> Result<Vec<CacheEntryId>, DomainError> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT id FROM cache_entries ORDER BY usage_count ASC, id ASC LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| {
            DomainError::storage(format!("Failed to find least used cache entries: {}", e))
        })?;

        Ok(ids.into_iter().map(CacheEntryId::new).collect())
    }

    async fn delete(&mut self, ids: &[CacheEntryId]) -> Result<usize, DomainError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let ids: Vec<i64> = ids.iter().map(|id| id.value()).collect();
        let result = sqlx::query("DELETE FROM cache_entries WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete cache entries: {}", e)))?;

        Ok(result.rows_affected() as usize)
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.tx
            .commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit transaction: {}", e)))
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to roll back transaction: {}", e)))
    }
}

fn row_to_entry(row: &PgRow) -> Result<CacheEntry, DomainError> {
    let column_error =
        |e: sqlx::Error| DomainError::storage(format!("Invalid cache entry row: {}", e));

    let id: i64 = row.try_get("id").map_err(column_error)?;
    let scope: String = row.try_get("scope").map_err(column_error)?;
    let user_id: Option<i64> = row.try_get("user_id").map_err(column_error)?;
    let language: String = row.try_get("prompt_language").map_err(column_error)?;
    let embedding: Vec<u8> = row.try_get("embedding").map_err(column_error)?;
    let content: String = row.try_get("content").map_err(column_error)?;
    let usage_count: i64 = row.try_get("usage_count").map_err(column_error)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(column_error)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(column_error)?;

    let scope = str_to_scope(&scope)?;

    CacheEntry::restore(
        CacheEntryId::new(id),
        scope,
        user_id.map(UserId::new),
        language,
        embedding,
        content,
        usage_count,
        created_at,
        updated_at,
    )
}

fn str_to_scope(s: &str) -> Result<CacheScope, DomainError> {
    s.parse()
        .map_err(|_| DomainError::storage(format!("Unknown scope '{}' in database", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_conversion() {
        assert_eq!(str_to_scope("global").unwrap(), CacheScope::Global);
        assert_eq!(str_to_scope("user").unwrap(), CacheScope::User);

        let err = str_to_scope("team").unwrap_err();
        assert!(matches!(err, DomainError::Storage { .. }));
    }

    #[test]
    fn test_entry_columns_cover_row_mapping() {
        for column in [
            "id",
            "scope",
            "user_id",
            "prompt_language",
            "embedding",
            "content",
            "usage_count",
            "created_at",
            "updated_at",
        ] {
            assert!(ENTRY_COLUMNS.contains(column), "missing column {}", column);
        }
    }
}
