use crate::error::{log_failure, FeedbackError};
use crate::link_lifecycle::FeedbackState;
use actix_web::{web, HttpResponse};
use common::requests::SubmissionRangeQuery;

/// `GET /api/submissions/link/{link_id}`: every submission made through a link,
/// newest first. Works after the link itself has been retired.
pub(crate) async fn by_link(
    link_id: web::Path<String>,
    state: web::Data<FeedbackState>,
) -> Result<HttpResponse, FeedbackError> {
    let submissions = state
        .bounded(state.submissions.submissions_for_link(&link_id))
        .await
        .map_err(FeedbackError::from)
        .inspect_err(|e| log_failure("listing submissions by link", e))?;

    Ok(HttpResponse::Ok().json(submissions))
}

/// `GET /api/submissions?from=...&to=...`: submissions whose timestamp lies in
/// the inclusive window, newest first.
pub(crate) async fn by_range(
    query: web::Query<SubmissionRangeQuery>,
    state: web::Data<FeedbackState>,
) -> Result<HttpResponse, FeedbackError> {
    let SubmissionRangeQuery { from, to } = query.into_inner();
    if from > to {
        return Err(FeedbackError::invalid("'from' must not be later than 'to'"));
    }

    let submissions = state
        .bounded(state.submissions.submissions_between(from, to))
        .await
        .map_err(FeedbackError::from)
        .inspect_err(|e| log_failure("listing submissions by date range", e))?;

    Ok(HttpResponse::Ok().json(submissions))
}
