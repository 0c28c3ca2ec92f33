//! Monthly character usage tracking

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::core::errors::Result;
use crate::core::models::{EngineUsage, UsagePeriod};

/// Persistence for engine usage records
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Load the record for `engine`, if one has been saved
    async fn load(&self, engine: &str) -> Result<Option<EngineUsage>>;

    /// Insert or replace the record keyed by `usage.name`
    async fn save(&self, usage: &EngineUsage) -> Result<()>;

    /// All stored records, ordered by name
    async fn list(&self) -> Result<Vec<EngineUsage>>;
}

/// Usage tracker for one or more engines
#[derive(Clone)]
pub struct UsageTracker {
    store: Arc<dyn UsageStore>,
}

impl UsageTracker {
    /// Create a tracker over the given store
    pub fn new(store: Arc<dyn UsageStore>) -> Self {
        Self { store }
    }

    /// Record `chars` against `engine` for the current UTC month
    pub async fn record(&self, engine: &str, chars: u64) -> Result<u64> {
        self.record_at(engine, chars, Utc::now()).await
    }

    /// Record `chars` against `engine` as if the time were `now`.
    ///
    /// This is a plain load, update, save. Two requests interleaving here can
    /// lose one of the increments; the app expects a single user.
    pub async fn record_at(&self, engine: &str, chars: u64, now: DateTime<Utc>) -> Result<u64> {
        let period = UsagePeriod::of(now);
        let mut usage = match self.store.load(engine).await? {
            Some(usage) => usage,
            None => {
                info!("No usage record for {}, starting a new one", engine);
                EngineUsage::new(engine, period)
            }
        };

        if usage.last_reset != period {
            info!(
                "Resetting {} usage for {}/{} (was {} chars in {}/{})",
                engine,
                period.month,
                period.year,
                usage.current_usage,
                usage.last_reset.month,
                usage.last_reset.year
            );
        }

        let total = usage.apply(chars, period);
        self.store.save(&usage).await?;

        debug!("Recorded {} chars for {}, month total {}", chars, engine, total);
        Ok(total)
    }

    /// Usage for the current UTC month without recording anything
    pub async fn current(&self, engine: &str) -> Result<u64> {
        self.current_at(engine, Utc::now()).await
    }

    /// Usage for the month containing `now`; a stale record counts as zero
    pub async fn current_at(&self, engine: &str, now: DateTime<Utc>) -> Result<u64> {
        let period = UsagePeriod::of(now);
        Ok(self
            .store
            .load(engine)
            .await?
            .filter(|usage| usage.last_reset == period)
            .map(|usage| usage.current_usage)
            .unwrap_or(0))
    }

    /// Get current usage statistics
    pub async fn get_stats(&self) -> Result<Vec<EngineUsage>> {
        self.store.list().await
    }
}

/// In-process store, lost on restart
#[derive(Debug, Clone, Default)]
pub struct MemoryUsageStore {
    records: Arc<RwLock<HashMap<String, EngineUsage>>>,
}

impl MemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given records already saved
    pub fn with_records(records: impl IntoIterator<Item = EngineUsage>) -> Self {
        let records = records
            .into_iter()
            .map(|usage| (usage.name.clone(), usage))
            .collect();
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }
}

#[async_trait]
impl UsageStore for MemoryUsageStore {
    async fn load(&self, engine: &str) -> Result<Option<EngineUsage>> {
        Ok(self.records.read().await.get(engine).cloned())
    }

    async fn save(&self, usage: &EngineUsage) -> Result<()> {
        self.records
            .write()
            .await
            .insert(usage.name.clone(), usage.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<EngineUsage>> {
        let mut records: Vec<EngineUsage> = self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }
}

/// SQLite-backed store holding one `engine` row per provider
#[derive(Debug, Clone)]
pub struct SqliteUsageStore {
    path: PathBuf,
}

impl SqliteUsageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the schema if it doesn't exist yet
    pub async fn init(&self) -> Result<()> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = open_connection(&path)?;
            init_schema(&conn)?;
            Ok(())
        })
        .await?
    }
}

#[async_trait]
impl UsageStore for SqliteUsageStore {
    async fn load(&self, engine: &str) -> Result<Option<EngineUsage>> {
        use rusqlite::OptionalExtension;

        let path = self.path.clone();
        let engine = engine.to_string();
        tokio::task::spawn_blocking(move || -> Result<Option<EngineUsage>> {
            let conn = open_connection(&path)?;
            init_schema(&conn)?;
            let usage = conn
                .query_row(
                    "SELECT name, current_usage, month_usage_last_reset, year_usage_last_reset
                     FROM engine WHERE name = ?1",
                    rusqlite::params![engine],
                    row_to_usage,
                )
                .optional()?;
            Ok(usage)
        })
        .await?
    }

    async fn save(&self, usage: &EngineUsage) -> Result<()> {
        let path = self.path.clone();
        let usage = usage.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = open_connection(&path)?;
            init_schema(&conn)?;
            conn.execute(
                "INSERT INTO engine (name, current_usage, month_usage_last_reset, year_usage_last_reset)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(name) DO UPDATE SET
                     current_usage = excluded.current_usage,
                     month_usage_last_reset = excluded.month_usage_last_reset,
                     year_usage_last_reset = excluded.year_usage_last_reset",
                rusqlite::params![
                    usage.name,
                    u64_to_i64(usage.current_usage),
                    usage.last_reset.month,
                    usage.last_reset.year
                ],
            )?;
            Ok(())
        })
        .await?
    }

    async fn list(&self) -> Result<Vec<EngineUsage>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<EngineUsage>> {
            let conn = open_connection(&path)?;
            init_schema(&conn)?;
            let mut stmt = conn.prepare(
                "SELECT name, current_usage, month_usage_last_reset, year_usage_last_reset
                 FROM engine ORDER BY name",
            )?;
            let rows = stmt.query_map([], row_to_usage)?;

            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await?
    }
}

fn open_connection(path: &Path) -> rusqlite::Result<rusqlite::Connection> {
    let conn = rusqlite::Connection::open(path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    Ok(conn)
}

fn init_schema(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS engine (
             name TEXT PRIMARY KEY,
             current_usage INTEGER NOT NULL DEFAULT 0 CHECK (current_usage >= 0),
             month_usage_last_reset INTEGER NOT NULL,
             year_usage_last_reset INTEGER NOT NULL
         );",
    )
}

fn row_to_usage(row: &rusqlite::Row<'_>) -> rusqlite::Result<EngineUsage> {
    let current_usage: i64 = row.get(1)?;
    let current_usage = u64::try_from(current_usage)
        .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(1, current_usage))?;
    Ok(EngineUsage {
        name: row.get(0)?,
        current_usage,
        last_reset: UsagePeriod::new(row.get(2)?, row.get(3)?),
    })
}

fn u64_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
