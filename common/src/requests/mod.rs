use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
/// Query string for listing submissions inside an inclusive time window.
/// Both bounds are RFC 3339 timestamps.
pub struct SubmissionRangeQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}
