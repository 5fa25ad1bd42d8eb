//! # Feedback Submission Endpoint
//!
//! `POST /feedback/{link_id}` with a `multipart/form-data` body.
//!
//! Every named text part becomes an answer (`name → value`); repeated names,
//! as sent by checkbox groups, are joined with `", "`. The part named `image`
//! is the optional attachment: it must declare an `image/*` content type, its
//! bytes must look like a real image, and it may not exceed the configured
//! size. An empty `image` part is what browsers send when nothing was picked
//! and is ignored. At most `MAX_ANSWER_FIELDS` text parts of up to
//! `MAX_ANSWER_BYTES` each are accepted.
//!
//! The link is validated before the body is read, so requests for dead links
//! never buffer an upload. Recording itself is delegated to
//! `link_lifecycle::recorder`.

use crate::assets::ImageUpload;
use crate::error::{log_failure, FeedbackError};
use crate::link_lifecycle::recorder::{record_submission, ClientInfo, SubmissionDraft};
use crate::link_lifecycle::validator::validate_link;
use crate::link_lifecycle::FeedbackState;
use crate::services::views;
use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::http::header::{ContentType, USER_AGENT};
use actix_web::{web, HttpRequest, HttpResponse};
use common::model::submission::Answers;
use futures_util::StreamExt;

const IMAGE_FIELD: &str = "image";
const MAX_ANSWER_BYTES: usize = 64 * 1024;
const MAX_ANSWER_FIELDS: usize = 100;

pub(crate) async fn process(
    req: HttpRequest,
    link_id: web::Path<String>,
    payload: Multipart,
    state: web::Data<FeedbackState>,
) -> Result<HttpResponse, FeedbackError> {
    let link_id = link_id.into_inner();
    submit(&req, &link_id, payload, &state)
        .await
        .inspect_err(|e| log_failure(&format!("submitting feedback for link '{link_id}'"), e))
}

async fn submit(
    req: &HttpRequest,
    link_id: &str,
    payload: Multipart,
    state: &FeedbackState,
) -> Result<HttpResponse, FeedbackError> {
    validate_link(state, link_id).await?;

    let form = read_submission_form(payload, state.settings.max_image_bytes).await?;
    let draft = SubmissionDraft {
        link_id: link_id.to_string(),
        answers: form.answers,
        image: form.image,
        client: client_info(req),
    };

    let record = record_submission(state, draft).await?;
    let html = views::render_success(&record)?;
    Ok(HttpResponse::Ok().content_type(ContentType::html()).body(html))
}

/// Socket address first, then whatever proxy headers claim.
fn client_info(req: &HttpRequest) -> ClientInfo {
    let ip_address = req
        .peer_addr()
        .map(|addr| addr.ip().to_string())
        .or_else(|| {
            req.connection_info()
                .realip_remote_addr()
                .map(|addr| addr.to_string())
        });
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    ClientInfo {
        ip_address,
        user_agent,
    }
}

struct SubmissionForm {
    answers: Answers,
    image: Option<ImageUpload>,
}

async fn read_submission_form(
    mut payload: Multipart,
    max_image_bytes: usize,
) -> Result<SubmissionForm, FeedbackError> {
    let mut answers = Answers::new();
    let mut image: Option<ImageUpload> = None;
    let mut text_fields = 0usize;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(malformed)?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()))
            .unwrap_or_default();

        if name == IMAGE_FIELD {
            let filename = field
                .content_disposition()
                .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                .filter(|f| !f.is_empty());
            let content_type = field.content_type().map(|m| m.essence_str().to_string());
            let bytes = read_field(&mut field, max_image_bytes, "Image exceeds the size limit").await?;

            if bytes.is_empty() {
                continue;
            }
            if image.is_some() {
                return Err(FeedbackError::invalid("Only one image may be attached"));
            }
            image = Some(check_image(bytes, filename, content_type)?);
        } else {
            text_fields += 1;
            if text_fields > MAX_ANSWER_FIELDS {
                return Err(FeedbackError::invalid("Too many form fields"));
            }
            let bytes = read_field(&mut field, MAX_ANSWER_BYTES, "Answer is too long").await?;
            if name.is_empty() {
                continue;
            }
            let value = String::from_utf8(bytes)
                .map_err(|_| FeedbackError::invalid(format!("Answer '{name}' is not valid text")))?;
            match answers.get_mut(&name) {
                Some(existing) => {
                    existing.push_str(", ");
                    existing.push_str(&value);
                }
                None => {
                    answers.insert(name, value);
                }
            }
        }
    }

    Ok(SubmissionForm { answers, image })
}

async fn read_field(
    field: &mut Field,
    limit: usize,
    too_large: &str,
) -> Result<Vec<u8>, FeedbackError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(malformed)?;
        if bytes.len() + chunk.len() > limit {
            return Err(FeedbackError::invalid(too_large));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

fn check_image(
    bytes: Vec<u8>,
    filename: Option<String>,
    content_type: Option<String>,
) -> Result<ImageUpload, FeedbackError> {
    let content_type = content_type
        .filter(|ct| ct.starts_with("image/"))
        .ok_or_else(|| FeedbackError::invalid("Only image files are allowed"))?;
    image::guess_format(&bytes).map_err(|_| FeedbackError::invalid("Only image files are allowed"))?;

    Ok(ImageUpload {
        bytes,
        filename,
        content_type,
    })
}

fn malformed(err: MultipartError) -> FeedbackError {
    FeedbackError::invalid(format!("Malformed form submission: {err}"))
}
