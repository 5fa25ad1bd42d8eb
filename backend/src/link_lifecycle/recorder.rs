//! # Submission Recording
//!
//! Turns a submitted form into a durable `FeedbackSubmission` and retires the
//! link it came through.
//!
//! ## Workflow
//!
//! 1.  **Re-validation**: the link is looked up again, even if the caller just
//!     validated it, so a link retired by a concurrent request is caught here.
//! 2.  **Upload**: an attached image goes to the asset store first. A failed
//!     upload ends the request; nothing has been written yet.
//! 3.  **Insert**: the submission (answers, image URL, customer name snapshot,
//!     request metadata, fresh UUID) is written in one statement.
//! 4.  **Retire**: only after the insert is acknowledged is the link deleted.
//!     A crash between 3 and 4 leaves a recorded submission and a live link,
//!     never the reverse.
//!
//! Two requests racing on the same link can both pass step 1. The delete in
//! step 4 removes the row at most once; the loser is logged and its submission
//! kept.

use super::validator::validate_link;
use super::FeedbackState;
use crate::assets::ImageUpload;
use crate::error::FeedbackError;
use chrono::Utc;
use common::model::submission::{Answers, FeedbackSubmission, SubmissionMetadata, SubmissionRecord};
use log::{error, info, warn};
use uuid::Uuid;

const UNKNOWN: &str = "unknown";

/// Who sent the request, as far as the HTTP layer can tell.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Everything the submit route collected from one request.
#[derive(Debug, Clone)]
pub struct SubmissionDraft {
    pub link_id: String,
    pub answers: Answers,
    pub image: Option<ImageUpload>,
    pub client: ClientInfo,
}

pub async fn record_submission(
    state: &FeedbackState,
    draft: SubmissionDraft,
) -> Result<SubmissionRecord, FeedbackError> {
    let link = validate_link(state, &draft.link_id).await?;

    let image_url = match &draft.image {
        Some(image) => {
            let asset = state
                .bounded(state.assets.upload_image(&state.settings.upload_folder, image))
                .await?;
            info!("Uploaded feedback image for link {} as {}", link.id, asset.public_id);
            Some(asset.secure_url)
        }
        None => None,
    };

    let submission = FeedbackSubmission {
        id: Uuid::new_v4().to_string(),
        link_id: link.id,
        customer_name: link.customer_name,
        answers: draft.answers,
        image_url,
        metadata: SubmissionMetadata {
            ip_address: draft.client.ip_address.unwrap_or_else(|| UNKNOWN.to_string()),
            user_agent: draft.client.user_agent.unwrap_or_else(|| UNKNOWN.to_string()),
            submitted_at: Utc::now(),
        },
    };

    state
        .bounded(state.submissions.insert_submission(&submission))
        .await?;
    info!(
        "Recorded submission {} for feedback link {}",
        submission.id, submission.link_id
    );

    retire_link(state, &submission.link_id).await?;

    Ok(SubmissionRecord::from(&submission))
}

async fn retire_link(state: &FeedbackState, link_id: &str) -> Result<(), FeedbackError> {
    if state.settings.retain_links {
        warn!("FEEDBACK_RETAIN_LINKS is set; feedback link {link_id} stays usable");
        return Ok(());
    }

    match state.bounded(state.links.delete_link(link_id)).await {
        Ok(true) => info!("Retired feedback link {link_id}"),
        Ok(false) => warn!("Feedback link {link_id} was already retired by a concurrent submission"),
        Err(e) => {
            error!("Submission for link {link_id} is stored but the link could not be retired: {e}");
            return Err(e.into());
        }
    }
    Ok(())
}
