//! SQLite-backed storage for user-submitted reports.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;

/// One persisted report row. `reasons` round-trips through a JSON-encoded
/// array in the `reasons` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReport {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    pub reasons: Vec<String>,
    pub score: u32,
    pub created_at: String,
}

pub struct ReportStore {
    conn: Mutex<Connection>,
}

impl ReportStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create report directory: {}", parent.display())
                })?;
            }
        }
        let conn = Connection::open(db_path)
            .with_context(|| format!("failed to open report database: {}", db_path.display()))?;
        Self::init_schema(&conn)?;
        log::info!("report store ready at {}", db_path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS reports (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT,
                value TEXT,
                reasons TEXT,
                score INTEGER,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;
        Ok(())
    }

    pub fn insert(&self, kind: &str, value: &str, reasons: &[String], score: u32) -> Result<i64> {
        let encoded = serde_json::to_string(reasons)?;
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("report store lock poisoned"))?;
        conn.execute(
            "INSERT INTO reports (kind, value, reasons, score) VALUES (?1, ?2, ?3, ?4)",
            params![kind, value, encoded, score],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Latest reports, newest first. Rows whose `reasons` column fails to
    /// decode degrade to an empty list rather than failing the query.
    pub fn recent(&self, limit: u32) -> Result<Vec<StoredReport>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("report store lock poisoned"))?;
        let mut stmt = conn.prepare(
            "SELECT id, kind, value, reasons, score, created_at FROM reports
             ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            let encoded: String = row.get(3)?;
            Ok(StoredReport {
                id: row.get(0)?,
                kind: row.get(1)?,
                value: row.get(2)?,
                reasons: serde_json::from_str(&encoded).unwrap_or_default(),
                score: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;

        let mut reports = Vec::new();
        for row in rows {
            reports.push(row?);
        }
        Ok(reports)
    }
}
