//! In-process fakes for exercising the lifecycle without a network.

use super::{FeedbackState, LifecycleSettings};
use crate::assets::{AssetError, AssetStore, ImageUpload, UploadedAsset};
use crate::store::sqlite::SqliteStore;
use crate::store::{LinkStore, StoreError, SubmissionStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::model::link::FeedbackLink;
use common::model::submission::FeedbackSubmission;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

/// Ordered record of the side-effecting calls made during a test.
#[derive(Clone, Default)]
pub(crate) struct Journal(Arc<Mutex<Vec<&'static str>>>);

impl Journal {
    fn push(&self, entry: &'static str) {
        self.0.lock().unwrap().push(entry);
    }

    pub(crate) fn entries(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

/// SQLite store that journals lookups and writes, and can simulate a failing
/// delete or a submission insert that never returns.
pub(crate) struct JournaledStore {
    inner: SqliteStore,
    journal: Journal,
    fail_deletes: AtomicBool,
    hang_inserts: AtomicBool,
}

impl JournaledStore {
    pub(crate) fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub(crate) fn hang_inserts(&self) {
        self.hang_inserts.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl LinkStore for JournaledStore {
    async fn find_link(&self, link_id: &str) -> Result<Option<FeedbackLink>, StoreError> {
        self.journal.push("find");
        self.inner.find_link(link_id).await
    }

    async fn insert_link(&self, link: &FeedbackLink) -> Result<(), StoreError> {
        self.inner.insert_link(link).await
    }

    async fn delete_link(&self, link_id: &str) -> Result<bool, StoreError> {
        self.journal.push("delete");
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Worker("simulated outage".to_string()));
        }
        self.inner.delete_link(link_id).await
    }
}

#[async_trait]
impl SubmissionStore for JournaledStore {
    async fn insert_submission(&self, submission: &FeedbackSubmission) -> Result<(), StoreError> {
        self.journal.push("insert");
        if self.hang_inserts.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        self.inner.insert_submission(submission).await
    }

    async fn submission_by_id(
        &self,
        submission_id: &str,
    ) -> Result<Option<FeedbackSubmission>, StoreError> {
        self.inner.submission_by_id(submission_id).await
    }

    async fn submissions_for_link(
        &self,
        link_id: &str,
    ) -> Result<Vec<FeedbackSubmission>, StoreError> {
        self.inner.submissions_for_link(link_id).await
    }

    async fn submissions_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<FeedbackSubmission>, StoreError> {
        self.inner.submissions_between(from, to).await
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum UploadMode {
    Succeed,
    Reject,
    Hang,
}

pub(crate) struct FakeAssetStore {
    journal: Journal,
    mode: Mutex<UploadMode>,
    uploads: AtomicUsize,
    folders: Mutex<Vec<String>>,
}

impl FakeAssetStore {
    pub(crate) fn set_mode(&self, mode: UploadMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub(crate) fn folders(&self) -> Vec<String> {
        self.folders.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetStore for FakeAssetStore {
    async fn upload_image(
        &self,
        folder: &str,
        _image: &ImageUpload,
    ) -> Result<UploadedAsset, AssetError> {
        self.journal.push("upload");
        self.folders.lock().unwrap().push(folder.to_string());
        let mode = *self.mode.lock().unwrap();
        match mode {
            UploadMode::Succeed => {
                let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(UploadedAsset {
                    secure_url: format!("https://assets.test/{folder}/{n}.png"),
                    public_id: format!("{folder}/{n}"),
                })
            }
            UploadMode::Reject => Err(AssetError::Rejected {
                status: 400,
                message: "Invalid image file".to_string(),
            }),
            UploadMode::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(AssetError::TimedOut)
            }
        }
    }
}

pub(crate) struct Harness {
    pub state: FeedbackState,
    pub store: Arc<JournaledStore>,
    pub assets: Arc<FakeAssetStore>,
    pub journal: Journal,
}

impl Harness {
    pub(crate) fn new() -> Self {
        let journal = Journal::default();
        let store = Arc::new(JournaledStore {
            inner: SqliteStore::open_in_memory().unwrap(),
            journal: journal.clone(),
            fail_deletes: AtomicBool::new(false),
            hang_inserts: AtomicBool::new(false),
        });
        let assets = Arc::new(FakeAssetStore {
            journal: journal.clone(),
            mode: Mutex::new(UploadMode::Succeed),
            uploads: AtomicUsize::new(0),
            folders: Mutex::new(Vec::new()),
        });
        let settings = LifecycleSettings {
            operation_timeout: Duration::from_secs(5),
            upload_folder: "feedback-images".to_string(),
            max_image_bytes: 1024,
            retain_links: false,
        };
        let state = FeedbackState::new(store.clone(), store.clone(), assets.clone(), settings);

        Self {
            state,
            store,
            assets,
            journal,
        }
    }

    pub(crate) async fn with_link(id: &str, customer_name: &str) -> Self {
        let harness = Self::new();
        harness
            .store
            .insert_link(&FeedbackLink::new(id, customer_name))
            .await
            .unwrap();
        harness
    }
}

pub(crate) fn png_upload() -> ImageUpload {
    ImageUpload {
        bytes: PNG_MAGIC.to_vec(),
        filename: Some("photo.png".to_string()),
        content_type: "image/png".to_string(),
    }
}

/// Builds the full Actix app around a state, the same way `main.rs` does.
macro_rules! test_app {
    ($state:expr, $reporting_api:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .configure(|cfg| crate::services::configure(cfg, $reporting_api)),
        )
        .await
    };
}
pub(crate) use test_app;

pub(crate) const BOUNDARY: &str = "feedback-test-boundary";

pub(crate) fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

/// Encodes text fields plus an optional `image` part as `(filename, content type, bytes)`.
pub(crate) fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, content_type, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
