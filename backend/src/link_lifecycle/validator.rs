use super::FeedbackState;
use crate::error::FeedbackError;
use common::model::link::LinkInfo;

/// Checks that `link_id` names a live, unused feedback link.
///
/// Blank ids are rejected before any I/O. Unknown and already retired ids are
/// indistinguishable to the caller. The link record is never modified here, so
/// this can be called any number of times.
pub async fn validate_link(state: &FeedbackState, link_id: &str) -> Result<LinkInfo, FeedbackError> {
    if link_id.trim().is_empty() {
        return Err(FeedbackError::invalid("Invalid feedback link"));
    }

    let link = state.bounded(state.links.find_link(link_id)).await?;
    link.map(LinkInfo::from).ok_or(FeedbackError::LinkNotFound)
}
