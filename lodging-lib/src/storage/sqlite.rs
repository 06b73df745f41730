//! SQLite-backed credential store.

use std::path::Path;

use async_sqlite::rusqlite;
use async_sqlite::Client;
use async_sqlite::ClientBuilder;
use async_sqlite::JournalMode;
use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use super::CredentialStore;
use super::StoredCredentials;
use crate::error::StorageError;

const ACCESS_TOKEN_KEY: &str = "accessToken";
const REFRESH_TOKEN_KEY: &str = "refreshToken";
const ACCESS_EXPIRY_KEY: &str = "token_expiry_date_time";
const REFRESH_EXPIRY_KEY: &str = "refresh_token_expiry_date_time";

/// A credential store persisted in a SQLite file.
///
/// Credentials survive process restarts, so a relaunched application picks
/// up the session where it left off. Expiry timestamps are stored as RFC 3339
/// strings.
///
/// # Example
///
/// ```ignore
/// use lodging_lib::storage::SqliteCredentialStore;
///
/// let store = SqliteCredentialStore::open("credentials.db").await?;
/// ```
pub struct SqliteCredentialStore {
    client: Client,
}

impl SqliteCredentialStore {
    /// Opens (or creates) a store at the specified path.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let client = ClientBuilder::new()
            .path(path)
            .journal_mode(JournalMode::Wal)
            .open()
            .await?;

        Self::init_schema(&client).await?;

        Ok(Self { client })
    }

    /// Opens an in-memory store.
    ///
    /// Useful for testing. Data is lost when the store is dropped.
    pub async fn open_in_memory() -> Result<Self, StorageError> {
        let client = ClientBuilder::new().path(":memory:").open().await?;

        Self::init_schema(&client).await?;

        Ok(Self { client })
    }

    async fn init_schema(client: &Client) -> Result<(), StorageError> {
        client
            .conn(|conn| {
                conn.execute(
                    "CREATE TABLE IF NOT EXISTS credentials (
                        key TEXT PRIMARY KEY,
                        value TEXT NOT NULL
                    )",
                    [],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn load(&self) -> Result<StoredCredentials, StorageError> {
        let rows: Vec<(String, String)> = self
            .client
            .conn(|conn| {
                let mut stmt = conn.prepare("SELECT key, value FROM credentials")?;
                let rows = stmt
                    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<Result<Vec<(String, String)>, rusqlite::Error>>()?;
                Ok(rows)
            })
            .await?;

        let mut credentials = StoredCredentials::default();
        for (key, value) in rows {
            match key.as_str() {
                ACCESS_TOKEN_KEY => credentials.access_token = Some(value),
                REFRESH_TOKEN_KEY => credentials.refresh_token = Some(value),
                ACCESS_EXPIRY_KEY => {
                    credentials.access_expires_at = Some(parse_timestamp(ACCESS_EXPIRY_KEY, &value)?)
                }
                REFRESH_EXPIRY_KEY => {
                    credentials.refresh_expires_at =
                        Some(parse_timestamp(REFRESH_EXPIRY_KEY, &value)?)
                }
                other => log::debug!("ignoring unknown credential key {}", other),
            }
        }

        Ok(credentials)
    }

    async fn save(&self, credentials: &StoredCredentials) -> Result<(), StorageError> {
        let entries: Vec<(&'static str, String)> = [
            (ACCESS_TOKEN_KEY, credentials.access_token.clone()),
            (REFRESH_TOKEN_KEY, credentials.refresh_token.clone()),
            (
                ACCESS_EXPIRY_KEY,
                credentials.access_expires_at.map(|t| t.to_rfc3339()),
            ),
            (
                REFRESH_EXPIRY_KEY,
                credentials.refresh_expires_at.map(|t| t.to_rfc3339()),
            ),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect();

        self.client
            .conn_mut(move |conn| {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM credentials", [])?;
                for (key, value) in &entries {
                    tx.execute(
                        "INSERT INTO credentials (key, value) VALUES (?, ?)",
                        rusqlite::params![key, value],
                    )?;
                }
                tx.commit()
            })
            .await?;

        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.client
            .conn(|conn| {
                conn.execute("DELETE FROM credentials", [])?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}

fn parse_timestamp(key: &'static str, value: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StorageError::Corrupt {
            key,
            message: e.to_string(),
        })
}
