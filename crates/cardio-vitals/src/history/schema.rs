//! PRAGMA configuration and schema migration for the vitals database.

use rusqlite::Connection;

use cardio_core::errors::{to_storage_err, CardioResult};

/// Apply performance and safety pragmas to a connection.
pub fn apply_pragmas(conn: &Connection) -> CardioResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        PRAGMA foreign_keys = ON;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Idempotent schema setup. The store-assigned rowid is the append order.
pub fn migrate(conn: &Connection) -> CardioResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS vitals (
            id      INTEGER PRIMARY KEY AUTOINCREMENT,
            patient TEXT NOT NULL,
            ts      TEXT NOT NULL,
            hr      INTEGER,
            spo2    INTEGER,
            sbp     INTEGER,
            dbp     INTEGER,
            rr      INTEGER,
            mode    TEXT,
            source  TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_vitals_patient_ts ON vitals(patient, ts);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
