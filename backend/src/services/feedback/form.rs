use crate::error::{log_failure, FeedbackError};
use crate::link_lifecycle::validator::validate_link;
use crate::link_lifecycle::FeedbackState;
use crate::services::views;
use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};

/// `GET /feedback/{link_id}`: renders the form for a live link.
///
/// - `200 OK` with the form, greeting the link's customer by name.
/// - `400 Bad Request` for a blank id, `404 Not Found` for unknown or used links.
pub(crate) async fn process(
    link_id: web::Path<String>,
    state: web::Data<FeedbackState>,
) -> Result<HttpResponse, FeedbackError> {
    let link = validate_link(&state, &link_id)
        .await
        .inspect_err(|e| log_failure("rendering feedback form", e))?;

    let html = views::render_form(&link)?;
    Ok(HttpResponse::Ok().content_type(ContentType::html()).body(html))
}

/// `/feedback` without an id, whatever the method.
pub(crate) async fn missing_link() -> Result<HttpResponse, FeedbackError> {
    Err(FeedbackError::invalid("Invalid feedback link"))
}
