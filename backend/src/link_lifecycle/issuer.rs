use super::FeedbackState;
use crate::error::FeedbackError;
use common::model::link::{FeedbackLink, LinkInfo};
use log::info;

/// Provisions a new single-use link for `customer_name`.
///
/// The id becomes a path segment of `/feedback/{id}`, so it may not be blank
/// or contain `/`. Issuing an id that is still live is rejected; an id that
/// was already used and retired can be issued again.
pub async fn issue_link(
    state: &FeedbackState,
    link_id: &str,
    customer_name: &str,
) -> Result<LinkInfo, FeedbackError> {
    let link_id = link_id.trim();
    let customer_name = customer_name.trim();
    if link_id.is_empty() || link_id.contains('/') {
        return Err(FeedbackError::invalid("Invalid feedback link"));
    }
    if customer_name.is_empty() {
        return Err(FeedbackError::invalid("Customer name must not be blank"));
    }

    if state.bounded(state.links.find_link(link_id)).await?.is_some() {
        return Err(FeedbackError::invalid(format!("Feedback link {link_id} already exists")));
    }

    let link = FeedbackLink::new(link_id, customer_name);
    state.bounded(state.links.insert_link(&link)).await?;
    info!("Issued feedback link {} for {}", link.id, link.customer_name);

    Ok(LinkInfo::from(link))
}
