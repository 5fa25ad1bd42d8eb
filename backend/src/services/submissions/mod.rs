//! Read-only retrieval of recorded submissions as JSON.
//!
//! Mounted only when `FEEDBACK_REPORTING_API=true`. There is no update or
//! delete route: submissions are immutable once written.
//!
//! The provided routes are:
//! - `GET /api/submissions?from=&to=`: inclusive RFC 3339 time window.
//! - `GET /api/submissions/link/{link_id}`: all submissions for one link.
//! - `GET /api/submissions/{submission_id}`: a single submission.

use actix_web::web::{get, scope};
use actix_web::Scope;

mod get;
mod list;

const API_PATH: &str = "/api/submissions";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::by_range))
        .route("/link/{link_id}", get().to(list::by_link))
        .route("/{submission_id}", get().to(get::process))
}
