use crate::domain::model::{PersistedRow, ReconciledRecord};
use crate::domain::ports::CountryStore;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS countries (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    name              TEXT NOT NULL UNIQUE COLLATE NOCASE,
    capital           TEXT,
    region            TEXT,
    population        INTEGER NOT NULL,
    currency_code     TEXT,
    exchange_rate     TEXT,
    estimated_gdp     TEXT,
    flag_url          TEXT,
    last_refreshed_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_countries_region ON countries(region);
CREATE INDEX IF NOT EXISTS idx_countries_currency ON countries(currency_code);
";

const SELECT_COLUMNS: &str = "id, name, capital, region, population, currency_code, \
     exchange_rate, estimated_gdp, flag_url, last_refreshed_at";

/// 匯率固定 6 位小數
pub fn format_rate(rate: f64) -> String {
    format!("{:.6}", rate)
}

/// 估算值固定 2 位小數
pub fn format_gdp(gdp: f64) -> String {
    format!("{:.2}", gdp)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_decimal(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<f64>> {
    raw.map(|s| {
        s.parse::<f64>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<PersistedRow> {
    let population: i64 = row.get(4)?;
    let refreshed: String = row.get(9)?;

    Ok(PersistedRow {
        id: row.get(0)?,
        name: row.get(1)?,
        capital: row.get(2)?,
        region: row.get(3)?,
        population: u64::try_from(population).unwrap_or(0),
        currency_code: row.get(5)?,
        exchange_rate: parse_decimal(6, row.get(6)?)?,
        estimated_gdp: parse_decimal(7, row.get(7)?)?,
        flag_url: row.get(8)?,
        last_refreshed_at: parse_timestamp(9, &refreshed)?,
    })
}

fn write_record(
    conn: &Connection,
    record: &ReconciledRecord,
    refreshed_at: DateTime<Utc>,
) -> Result<()> {
    let population = i64::try_from(record.population).map_err(|_| SyncError::StoreUnavailable {
        message: format!("population {} out of range", record.population),
    })?;

    conn.execute(
        "INSERT INTO countries (name, capital, region, population, currency_code,
                                exchange_rate, estimated_gdp, flag_url, last_refreshed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(name) DO UPDATE SET
             capital = excluded.capital,
             region = excluded.region,
             population = excluded.population,
             currency_code = excluded.currency_code,
             exchange_rate = excluded.exchange_rate,
             estimated_gdp = excluded.estimated_gdp,
             flag_url = excluded.flag_url,
             last_refreshed_at = excluded.last_refreshed_at",
        params![
            record.name,
            non_empty(record.capital.as_deref()),
            non_empty(record.region.as_deref()),
            population,
            record.currency_code,
            record.exchange_rate.map(format_rate),
            record.estimated_gdp.map(format_gdp),
            non_empty(Some(record.flag_url.as_str())),
            format_timestamp(refreshed_at),
        ],
    )?;
    Ok(())
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|_| SyncError::StoreUnavailable {
        message: "connection mutex poisoned".to_string(),
    })
}

/// SQLite 實作；單一連線以 mutex 保護，查詢在 blocking 執行緒上跑
pub struct SqliteCountryStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCountryStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        tracing::debug!("Running database migrations");
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = lock(&conn)?;
            op(&guard)
        })
        .await
        .map_err(|e| SyncError::StoreUnavailable {
            message: format!("database task failed: {}", e),
        })?
    }

    /// Writes a record with an explicit refresh timestamp.
    pub fn upsert_at(&self, record: &ReconciledRecord, refreshed_at: DateTime<Utc>) -> Result<()> {
        write_record(&*lock(&self.conn)?, record, refreshed_at)
    }
}

#[async_trait]
impl CountryStore for SqliteCountryStore {
    async fn upsert(&self, record: &ReconciledRecord) -> Result<()> {
        let record = record.clone();
        let refreshed_at = Utc::now();
        self.blocking(move |conn| write_record(conn, &record, refreshed_at))
            .await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<PersistedRow>> {
        let name = name.to_string();
        self.blocking(move |conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {} FROM countries WHERE name = ?1", SELECT_COLUMNS),
                    params![name],
                    map_row,
                )
                .optional()?;
            Ok(row)
        })
        .await
    }

    async fn delete_by_name(&self, name: &str) -> Result<()> {
        let name = name.to_string();
        self.blocking(move |conn| {
            let deleted = conn.execute("DELETE FROM countries WHERE name = ?1", params![name])?;
            if deleted == 0 {
                return Err(SyncError::not_found(name));
            }
            tracing::info!("Deleted country {}", name);
            Ok(())
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<PersistedRow>> {
        self.blocking(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM countries ORDER BY id",
                SELECT_COLUMNS
            ))?;
            let rows = stmt
                .query_map([], map_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
    }

    async fn count(&self) -> Result<u64> {
        self.blocking(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM countries", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }

    async fn last_refreshed_at(&self) -> Result<Option<DateTime<Utc>>> {
        self.blocking(|conn| {
            let latest: Option<String> = conn.query_row(
                "SELECT MAX(last_refreshed_at) FROM countries",
                [],
                |row| row.get(0),
            )?;
            latest
                .map(|raw| parse_timestamp(0, &raw).map_err(SyncError::from))
                .transpose()
        })
        .await
    }
}
