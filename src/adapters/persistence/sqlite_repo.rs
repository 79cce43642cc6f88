//! SQLite-backed store via libsql. Implements MessageStorePort and AnalysisLogPort.
//!
//! `messages` carries a uniqueness constraint on (channel, author, content, instant);
//! inserts use ON CONFLICT DO NOTHING so re-imports are idempotent.
//! `analysis_results` holds one row per record with the payload as JSON text.
//! Everything lives in one database file: data/insights.db

use crate::domain::{AnalysisData, AnalysisKind, AnalysisRecord, DomainError, Message};
use crate::ports::{AnalysisLogPort, MessageStorePort};
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use libsql::{Database, params};
use std::path::{Path, PathBuf};
use tracing::info;

const MESSAGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    channel TEXT NOT NULL,
    author TEXT NOT NULL,
    content TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    ts_utc_ms INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    CONSTRAINT uq_message_identity UNIQUE (channel, author, content, ts_utc_ms)
)"#;
const MESSAGES_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_messages_ts ON messages (ts_utc_ms)";

const ANALYSIS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS analysis_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    analysis_type TEXT NOT NULL,
    result_data TEXT NOT NULL,
    created_at TEXT NOT NULL
)"#;

fn repo_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::Repo(e.to_string())
}

/// Fixed-width UTC form so that text ordering matches time ordering.
fn utc_text(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// SQLite store. One database file (insights.db) in the given base directory.
pub struct SqliteRepo {
    db: Database,
    db_path: PathBuf,
}

impl SqliteRepo {
    /// Connect to (or create) the SQLite database and ensure the schema exists.
    /// Call this once at startup; the returned repo is safe to share via Arc.
    ///
    /// Sets WAL mode and synchronous=NORMAL.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(repo_err)?;
        let db_path = base.join("insights.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(repo_err)?;
        let conn = db.connect().map_err(repo_err)?;

        // PRAGMA returns a row (new value); use query and consume rows (execute fails when rows are returned).
        for pragma in ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL"] {
            let mut rows = conn
                .query(pragma, ())
                .await
                .map_err(|e| DomainError::Repo(format!("{} failed: {}", pragma, e)))?;
            while rows.next().await.map_err(repo_err)?.is_some() {}
        }

        for ddl in [MESSAGES_TABLE, MESSAGES_INDEX, ANALYSIS_TABLE] {
            conn.execute(ddl, ()).await.map_err(repo_err)?;
        }

        info!(path = %db_path.display(), "SQLite connected with WAL mode");

        Ok(Self { db, db_path })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

#[async_trait::async_trait]
impl MessageStorePort for SqliteRepo {
    async fn save_messages(&self, messages: &[Message]) -> Result<usize, DomainError> {
        if messages.is_empty() {
            return Ok(0);
        }
        let conn = self.db.connect().map_err(repo_err)?;
        let tx = conn.transaction().await.map_err(repo_err)?;
        let now = utc_text(&Utc::now());
        let mut inserted = 0usize;
        for m in messages {
            let changed = tx
                .execute(
                    r#"
                    INSERT INTO messages (channel, author, content, timestamp, ts_utc_ms, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    ON CONFLICT DO NOTHING
                    "#,
                    params![
                        m.channel.as_str(),
                        m.author.as_str(),
                        m.content.as_str(),
                        m.timestamp.to_rfc3339(),
                        m.timestamp.timestamp_millis(),
                        now.as_str()
                    ],
                )
                .await
                .map_err(repo_err)?;
            inserted += changed as usize;
        }
        tx.commit().await.map_err(repo_err)?;

        info!(
            path = %self.db_path.display(),
            received = messages.len(),
            inserted,
            "saved messages"
        );
        Ok(inserted)
    }

    async fn list_messages(&self) -> Result<Vec<Message>, DomainError> {
        let conn = self.db.connect().map_err(repo_err)?;
        let mut rows = conn
            .query(
                r#"
                SELECT channel, author, content, timestamp
                FROM messages
                ORDER BY ts_utc_ms ASC, id ASC
                "#,
                (),
            )
            .await
            .map_err(repo_err)?;
        let mut messages = Vec::new();
        while let Some(row) = rows.next().await.map_err(repo_err)? {
            let channel: String = row.get(0).map_err(repo_err)?;
            let author: String = row.get(1).map_err(repo_err)?;
            let content: String = row.get(2).map_err(repo_err)?;
            let ts: String = row.get(3).map_err(repo_err)?;
            let timestamp = DateTime::<FixedOffset>::parse_from_rfc3339(&ts)
                .map_err(|e| DomainError::Repo(format!("bad stored timestamp {:?}: {}", ts, e)))?;
            messages.push(Message {
                channel,
                author,
                content,
                timestamp,
            });
        }
        Ok(messages)
    }
}

#[async_trait::async_trait]
impl AnalysisLogPort for SqliteRepo {
    async fn save_records(
        &self,
        records: Vec<AnalysisRecord>,
    ) -> Result<Vec<AnalysisRecord>, DomainError> {
        let conn = self.db.connect().map_err(repo_err)?;
        let tx = conn.transaction().await.map_err(repo_err)?;
        let mut saved = Vec::with_capacity(records.len());
        for mut record in records {
            let payload = serde_json::to_string(&record.result_data).map_err(repo_err)?;
            let mut rows = tx
                .query(
                    r#"
                    INSERT INTO analysis_results (analysis_type, result_data, created_at)
                    VALUES (?1, ?2, ?3)
                    RETURNING id
                    "#,
                    params![
                        record.analysis_type.as_str(),
                        payload,
                        utc_text(&record.created_at)
                    ],
                )
                .await
                .map_err(repo_err)?;
            let row = rows
                .next()
                .await
                .map_err(repo_err)?
                .ok_or_else(|| DomainError::Repo("insert returned no id".to_string()))?;
            record.id = Some(row.get::<i64>(0).map_err(repo_err)?);
            saved.push(record);
        }
        // Dropping `tx` without commit rolls everything back.
        tx.commit().await.map_err(repo_err)?;
        info!(records = saved.len(), "saved analysis records");
        Ok(saved)
    }

    async fn list_records(&self) -> Result<Vec<AnalysisRecord>, DomainError> {
        let conn = self.db.connect().map_err(repo_err)?;
        let mut rows = conn
            .query(
                r#"
                SELECT id, analysis_type, result_data, created_at
                FROM analysis_results
                ORDER BY created_at DESC, id DESC
                "#,
                (),
            )
            .await
            .map_err(repo_err)?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await.map_err(repo_err)? {
            let id: i64 = row.get(0).map_err(repo_err)?;
            let kind_str: String = row.get(1).map_err(repo_err)?;
            let data: String = row.get(2).map_err(repo_err)?;
            let created: String = row.get(3).map_err(repo_err)?;

            let kind = AnalysisKind::parse(&kind_str)
                .ok_or_else(|| DomainError::Repo(format!("unknown analysis_type {:?}", kind_str)))?;
            let value: serde_json::Value = serde_json::from_str(&data).map_err(repo_err)?;
            let result_data = AnalysisData::from_json(kind, value).map_err(repo_err)?;
            let created_at = DateTime::parse_from_rfc3339(&created)
                .map_err(repo_err)?
                .with_timezone(&Utc);

            records.push(AnalysisRecord {
                id: Some(id),
                analysis_type: kind,
                result_data,
                created_at,
            });
        }
        Ok(records)
    }
}
