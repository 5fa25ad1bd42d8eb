use crate::error::{log_failure, FeedbackError};
use crate::link_lifecycle::FeedbackState;
use actix_web::{web, HttpResponse};

/// `GET /api/submissions/{submission_id}`
///
/// Returns the submission as JSON, or `404` when no submission has that id.
pub(crate) async fn process(
    submission_id: web::Path<String>,
    state: web::Data<FeedbackState>,
) -> Result<HttpResponse, FeedbackError> {
    let submission_id = submission_id.into_inner();
    let submission = state
        .bounded(state.submissions.submission_by_id(&submission_id))
        .await
        .map_err(FeedbackError::from)
        .inspect_err(|e| log_failure("fetching submission", e))?;

    match submission {
        Some(submission) => Ok(HttpResponse::Ok().json(submission)),
        None => Err(FeedbackError::SubmissionNotFound(submission_id)),
    }
}
