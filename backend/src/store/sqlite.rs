//! SQLite implementation of the link and submission stores.
//!
//! A single connection is opened at startup and shared behind a mutex. Every
//! call runs on Tokio's blocking pool so rusqlite never stalls the async
//! runtime serving other requests.

use super::{LinkStore, StoreError, SubmissionStore};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use common::model::link::FeedbackLink;
use common::model::submission::{Answers, FeedbackSubmission, SubmissionMetadata};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Params};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS feedback_links (
    id            TEXT PRIMARY KEY,
    customer_name TEXT NOT NULL,
    created_at    TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS feedback_submissions (
    id               TEXT PRIMARY KEY,
    feedback_link_id TEXT NOT NULL,
    data             TEXT NOT NULL,
    submitted_at     TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_feedback_submissions_link
    ON feedback_submissions (feedback_link_id);
CREATE INDEX IF NOT EXISTS idx_feedback_submissions_submitted_at
    ON feedback_submissions (submitted_at);
";

const SELECT_SUBMISSION: &str = "SELECT id, feedback_link_id, data FROM feedback_submissions";

/// JSON payload kept in the `data` column.
#[derive(Serialize, Deserialize)]
struct SubmissionDocument {
    customer_name: String,
    answers: Answers,
    image_url: Option<String>,
    ip_address: String,
    user_agent: String,
    submitted_at: DateTime<Utc>,
}

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) the database file and makes sure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        info!("Opened feedback database at {}", path.display());
        Self::with_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn run<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Worker("connection mutex poisoned".to_string()))?;
            op(&guard)
        })
        .await
        .map_err(|e| StoreError::Worker(e.to_string()))?
    }
}

/// Fixed-width UTC timestamps so that text ordering matches time ordering.
fn timestamp_key(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn query_submissions(
    conn: &Connection,
    sql: &str,
    params: impl Params,
) -> Result<Vec<FeedbackSubmission>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut submissions = Vec::new();
    for row in rows {
        let (id, link_id, data) = row?;
        submissions.push(submission_from_row(id, link_id, &data)?);
    }
    Ok(submissions)
}

fn submission_from_row(
    id: String,
    link_id: String,
    data: &str,
) -> Result<FeedbackSubmission, StoreError> {
    let doc: SubmissionDocument = serde_json::from_str(data)?;
    Ok(FeedbackSubmission {
        id,
        link_id,
        customer_name: doc.customer_name,
        answers: doc.answers,
        image_url: doc.image_url,
        metadata: SubmissionMetadata {
            ip_address: doc.ip_address,
            user_agent: doc.user_agent,
            submitted_at: doc.submitted_at,
        },
    })
}

#[async_trait]
impl LinkStore for SqliteStore {
    async fn find_link(&self, link_id: &str) -> Result<Option<FeedbackLink>, StoreError> {
        let link_id = link_id.to_string();
        self.run(move |conn| {
            let link = conn
                .query_row(
                    "SELECT id, customer_name FROM feedback_links WHERE id = ?1",
                    params![link_id],
                    |row| {
                        Ok(FeedbackLink {
                            id: row.get(0)?,
                            customer_name: row.get(1)?,
                        })
                    },
                )
                .optional()?;
            Ok(link)
        })
        .await
    }

    async fn insert_link(&self, link: &FeedbackLink) -> Result<(), StoreError> {
        let link = link.clone();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO feedback_links (id, customer_name, created_at) VALUES (?1, ?2, ?3)",
                params![link.id, link.customer_name, timestamp_key(&Utc::now())],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete_link(&self, link_id: &str) -> Result<bool, StoreError> {
        let link_id = link_id.to_string();
        self.run(move |conn| {
            let deleted = conn.execute("DELETE FROM feedback_links WHERE id = ?1", params![link_id])?;
            Ok(deleted > 0)
        })
        .await
    }
}

#[async_trait]
impl SubmissionStore for SqliteStore {
    async fn insert_submission(&self, submission: &FeedbackSubmission) -> Result<(), StoreError> {
        let doc = SubmissionDocument {
            customer_name: submission.customer_name.clone(),
            answers: submission.answers.clone(),
            image_url: submission.image_url.clone(),
            ip_address: submission.metadata.ip_address.clone(),
            user_agent: submission.metadata.user_agent.clone(),
            submitted_at: submission.metadata.submitted_at,
        };
        let data = serde_json::to_string(&doc)?;
        let id = submission.id.clone();
        let link_id = submission.link_id.clone();
        let submitted_at = timestamp_key(&submission.metadata.submitted_at);

        self.run(move |conn| {
            conn.execute(
                "INSERT INTO feedback_submissions (id, feedback_link_id, data, submitted_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, link_id, data, submitted_at],
            )?;
            Ok(())
        })
        .await
    }

    async fn submission_by_id(
        &self,
        submission_id: &str,
    ) -> Result<Option<FeedbackSubmission>, StoreError> {
        let submission_id = submission_id.to_string();
        self.run(move |conn| {
            let sql = format!("{SELECT_SUBMISSION} WHERE id = ?1");
            Ok(query_submissions(conn, &sql, params![submission_id])?
                .into_iter()
                .next())
        })
        .await
    }

    async fn submissions_for_link(
        &self,
        link_id: &str,
    ) -> Result<Vec<FeedbackSubmission>, StoreError> {
        let link_id = link_id.to_string();
        self.run(move |conn| {
            let sql = format!(
                "{SELECT_SUBMISSION} WHERE feedback_link_id = ?1 ORDER BY submitted_at DESC, rowid DESC"
            );
            query_submissions(conn, &sql, params![link_id])
        })
        .await
    }

    async fn submissions_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<FeedbackSubmission>, StoreError> {
        let (from, to) = (timestamp_key(&from), timestamp_key(&to));
        self.run(move |conn| {
            let sql = format!(
                "{SELECT_SUBMISSION} WHERE submitted_at >= ?1 AND submitted_at <= ?2
                 ORDER BY submitted_at DESC, rowid DESC"
            );
            query_submissions(conn, &sql, params![from, to])
        })
        .await
    }
}
