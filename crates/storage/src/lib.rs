use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Mutex,
};

/// Durable string key/value storage, the client's equivalent of browser local storage.
///
/// Multi-key writes are applied atomically: either every key lands or none does.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>>;
    async fn set_items(&self, items: &[(&str, &str)]) -> Result<()>;
    async fn remove_items(&self, keys: &[&str]) -> Result<()>;

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.set_items(&[(key, value)]).await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.remove_items(&[key]).await
    }
}

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredItem {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid database url '{database_url}'"))?
            .create_if_missing(true);
        // Every in-memory connection is its own database, so keep a single one.
        let max_connections = if is_memory_url(database_url) { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open local storage at '{database_url}'"))?;

        let storage = Self { pool };
        storage.ensure_schema().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS local_storage (
                item_key   TEXT PRIMARY KEY NOT NULL,
                item_value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure local_storage table exists")?;
        Ok(())
    }

    pub async fn list_items(&self) -> Result<Vec<StoredItem>> {
        let rows = sqlx::query(
            "SELECT item_key, item_value, updated_at FROM local_storage ORDER BY item_key",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list local storage items")?;

        rows.into_iter()
            .map(|row| -> Result<StoredItem> {
                let updated_at: String = row.try_get("updated_at")?;
                Ok(StoredItem {
                    key: row.try_get("item_key")?,
                    value: row.try_get("item_value")?,
                    updated_at: DateTime::parse_from_rfc3339(&updated_at)
                        .with_context(|| format!("corrupt timestamp '{updated_at}'"))?
                        .with_timezone(&Utc),
                })
            })
            .collect()
    }
}

#[async_trait]
impl KeyValueStore for Storage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT item_value FROM local_storage WHERE item_key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("failed to read local storage key '{key}'"))?;
        Ok(value)
    }

    async fn set_items(&self, items: &[(&str, &str)]) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;
        for (key, value) in items {
            sqlx::query(
                r#"
                INSERT INTO local_storage (item_key, item_value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(item_key) DO UPDATE SET
                    item_value = excluded.item_value,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(*key)
            .bind(*value)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to write local storage key '{key}'"))?;
        }
        tx.commit().await.context("failed to commit local storage write")?;
        tracing::debug!(keys = items.len(), "local storage write committed");
        Ok(())
    }

    async fn remove_items(&self, keys: &[&str]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for key in keys {
            sqlx::query("DELETE FROM local_storage WHERE item_key = ?")
                .bind(*key)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("failed to remove local storage key '{key}'"))?;
        }
        tx.commit()
            .await
            .context("failed to commit local storage removal")?;
        Ok(())
    }
}

/// In-memory store for tests; nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self
            .items
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        Ok(items.get(key).cloned())
    }

    async fn set_items(&self, new_items: &[(&str, &str)]) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        for (key, value) in new_items {
            items.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    async fn remove_items(&self, keys: &[&str]) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        for key in keys {
            items.remove(*key);
        }
        Ok(())
    }
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_memory_url(database_url) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
