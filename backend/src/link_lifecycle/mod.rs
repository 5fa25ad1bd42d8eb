//! The feedback-link lifecycle: validate a single-use link, record one
//! submission against it, then retire it.
//!
//! - `validator`: read-only link checks used by both the form and the submit route.
//! - `recorder`: the write path (upload, insert, retire), strictly in that order.
//! - `issuer`: provisions new links; reached from the `--create-link` startup mode.
//!
//! `FeedbackState` is built once in `main.rs` and injected into the Actix
//! application as `web::Data`. It holds the only handles to persistence and to
//! the asset store; nothing in this module keeps process-wide globals.

pub mod issuer;
pub mod recorder;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;

use crate::assets::AssetStore;
use crate::config::Config;
use crate::store::{LinkStore, SubmissionStore};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct LifecycleSettings {
    pub operation_timeout: Duration,
    pub upload_folder: String,
    pub max_image_bytes: usize,
    /// Debug only, see `FEEDBACK_RETAIN_LINKS`.
    pub retain_links: bool,
}

impl From<&Config> for LifecycleSettings {
    fn from(config: &Config) -> Self {
        Self {
            operation_timeout: config.operation_timeout,
            upload_folder: config.upload_folder.clone(),
            max_image_bytes: config.max_image_bytes,
            retain_links: config.retain_links,
        }
    }
}

#[derive(Clone)]
pub struct FeedbackState {
    pub links: Arc<dyn LinkStore>,
    pub submissions: Arc<dyn SubmissionStore>,
    pub assets: Arc<dyn AssetStore>,
    pub settings: LifecycleSettings,
}

impl FeedbackState {
    pub fn new(
        links: Arc<dyn LinkStore>,
        submissions: Arc<dyn SubmissionStore>,
        assets: Arc<dyn AssetStore>,
        settings: LifecycleSettings,
    ) -> Self {
        Self {
            links,
            submissions,
            assets,
            settings,
        }
    }

    /// Runs one external call under the configured operation timeout.
    pub(crate) async fn bounded<T, E, F>(&self, call: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<tokio::time::error::Elapsed>,
    {
        tokio::time::timeout(self.settings.operation_timeout, call).await?
    }
}
