//! HistoryStore — durable, append-only vitals record per patient.
//!
//! Readings are ordered by a store-assigned identifier; time-range queries
//! return most-recent-first, capped at a caller-supplied limit.

mod schema;

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, ToSql};

use cardio_core::constants::DEFAULT_HISTORY_LIMIT;
use cardio_core::errors::{to_storage_err, CardioResult};
use cardio_core::models::{StoredVitalReading, VitalReading};

/// SQLite-backed append-only history. Single writer behind a mutex; write
/// rates are low (one append per accepted reading), so a connection pool
/// would be overkill here.
pub struct HistoryStore {
    conn: Mutex<Connection>,
}

impl HistoryStore {
    /// Open a store backed by a file on disk.
    pub fn open(path: &Path) -> CardioResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        Self::initialize(conn)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> CardioResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> CardioResult<Self> {
        schema::apply_pragmas(&conn)?;
        schema::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Append one reading; returns the store-assigned identifier.
    pub fn append(&self, reading: &VitalReading) -> CardioResult<i64> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.execute(
            "INSERT INTO vitals (patient, ts, hr, spo2, sbp, dbp, rr, mode, source)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                reading.patient,
                format_ts(reading.ts),
                reading.hr,
                reading.spo2,
                reading.sbp,
                reading.dbp,
                reading.rr,
                reading.mode,
                reading.source,
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
        Ok(conn.last_insert_rowid())
    }

    /// Readings for one patient, filtered by an inclusive time range when
    /// bounds are given, most-recent-first, capped at `limit`.
    pub fn query(
        &self,
        patient: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> CardioResult<Vec<StoredVitalReading>> {
        let mut sql = String::from(
            "SELECT id, patient, ts, hr, spo2, sbp, dbp, rr, mode, source
             FROM vitals WHERE patient = ?",
        );
        let mut args: Vec<Box<dyn ToSql>> = vec![Box::new(patient.to_string())];
        if let Some(start) = start {
            sql.push_str(" AND ts >= ?");
            args.push(Box::new(format_ts(start)));
        }
        if let Some(end) = end {
            sql.push_str(" AND ts <= ?");
            args.push(Box::new(format_ts(end)));
        }
        sql.push_str(" ORDER BY ts DESC, id DESC LIMIT ?");
        args.push(Box::new(limit.unwrap_or(DEFAULT_HISTORY_LIMIT) as i64));

        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| to_storage_err(e.to_string()))?;
        let refs: Vec<&dyn ToSql> = args.iter().map(|a| a.as_ref()).collect();
        let rows = stmt
            .query_map(refs.as_slice(), row_to_stored)
            .map_err(|e| to_storage_err(e.to_string()))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(|e| to_storage_err(e.to_string()))?);
        }
        Ok(out)
    }

    /// Total number of stored readings (diagnostics).
    pub fn count(&self) -> CardioResult<usize> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.query_row("SELECT COUNT(*) FROM vitals", [], |row| row.get::<_, i64>(0))
            .map(|n| n as usize)
            .map_err(|e| to_storage_err(e.to_string()))
    }
}

/// Fixed-width millisecond RFC 3339 so lexicographic and chronological
/// order agree in SQL comparisons.
fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn row_to_stored(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredVitalReading> {
    let ts: String = row.get(2)?;
    let ts = DateTime::parse_from_rfc3339(&ts)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?
        .with_timezone(&Utc);
    Ok(StoredVitalReading {
        id: row.get(0)?,
        reading: VitalReading {
            patient: row.get(1)?,
            ts,
            hr: row.get(3)?,
            spo2: row.get(4)?,
            sbp: row.get(5)?,
            dbp: row.get(6)?,
            rr: row.get(7)?,
            mode: row.get(8)?,
            source: row.get(9)?,
        },
    })
}
