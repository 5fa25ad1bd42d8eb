//! # Feedback Routes
//!
//! The customer-facing half of the server. A customer opens the unique link
//! they received, sees a form addressed to them, and posts it back once.
//!
//! ## Sub-modules:
//! - `form`: validates the link and renders the form.
//! - `submit`: parses the multipart body and hands it to the recorder.

mod form;
mod submit;

use actix_web::web::{get, post, route, scope};
use actix_web::Scope;

/// The base path for all customer-facing feedback pages.
const API_PATH: &str = "/feedback";

/// Configures and returns the Actix `Scope` for the feedback routes.
///
/// # Registered Routes:
///
/// *   **`GET /{link_id}`**: form for a live link, 404 page otherwise.
/// *   **`POST /{link_id}`**: records the submission and retires the link.
/// *   **`/` and the bare scope path**: 400, a link id is required.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/{link_id}", get().to(form::process))
        .route("/{link_id}", post().to(submit::process))
        .route("", route().to(form::missing_link))
        .route("/", route().to(form::missing_link))
}

#[cfg(test)]
mod tests {
    use crate::link_lifecycle::testing::{
        multipart_body, multipart_content_type, test_app, Harness, UploadMode, PNG_MAGIC,
    };
    use crate::store::{LinkStore, SubmissionStore};
    use actix_web::http::header::{CONTENT_TYPE, USER_AGENT};
    use actix_web::http::StatusCode;
    use actix_web::test;

    fn post_form(uri: &str, body: Vec<u8>) -> test::TestRequest {
        test::TestRequest::post()
            .uri(uri)
            .insert_header((CONTENT_TYPE, multipart_content_type()))
            .insert_header((USER_AGENT, "test-browser/1.0"))
            .peer_addr("198.51.100.4:51000".parse().unwrap())
            .set_payload(body)
    }

    fn body_text(bytes: actix_web::web::Bytes) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[actix_web::test]
    async fn link_lifecycle_end_to_end() {
        let harness = Harness::with_link("abc123", "Jane").await;
        let app = test_app!(harness.state.clone(), false);

        let form = test::call_service(&app, test::TestRequest::get().uri("/feedback/abc123").to_request()).await;
        assert_eq!(form.status(), StatusCode::OK);
        assert!(body_text(test::read_body(form).await).contains("Jane"));

        let body = multipart_body(&[("satisfaction", "5"), ("liked_most", "service")], None);
        let submitted = test::call_service(&app, post_form("/feedback/abc123", body).to_request()).await;
        assert_eq!(submitted.status(), StatusCode::OK);
        let page = body_text(test::read_body(submitted).await);
        assert!(page.contains("Thank you, Jane!"));

        let again = test::call_service(&app, test::TestRequest::get().uri("/feedback/abc123").to_request()).await;
        assert_eq!(again.status(), StatusCode::NOT_FOUND);

        let stored = harness.store.submissions_for_link("abc123").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].answers.len(), 2);
        assert_eq!(stored[0].answers["satisfaction"], "5");
        assert_eq!(stored[0].answers["liked_most"], "service");
        assert_eq!(stored[0].image_url, None);
        assert_eq!(stored[0].metadata.ip_address, "198.51.100.4");
        assert_eq!(stored[0].metadata.user_agent, "test-browser/1.0");
    }

    #[actix_web::test]
    async fn second_post_on_used_link_is_not_found() {
        let harness = Harness::with_link("abc123", "Jane").await;
        let app = test_app!(harness.state.clone(), false);

        let first = multipart_body(&[("feedback_text", "first")], None);
        let resp = test::call_service(&app, post_form("/feedback/abc123", first).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let second = multipart_body(&[("feedback_text", "second")], None);
        let resp = test::call_service(&app, post_form("/feedback/abc123", second).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(body_text(test::read_body(resp).await).contains("Feedback link not found or expired"));

        assert_eq!(harness.store.submissions_for_link("abc123").await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn unknown_link_is_not_found_for_both_methods() {
        let harness = Harness::new();
        let app = test_app!(harness.state.clone(), false);

        let get = test::call_service(&app, test::TestRequest::get().uri("/feedback/ghost").to_request()).await;
        assert_eq!(get.status(), StatusCode::NOT_FOUND);

        let body = multipart_body(&[("feedback_text", "hello")], None);
        let post = test::call_service(&app, post_form("/feedback/ghost", body).to_request()).await;
        assert_eq!(post.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn blank_or_missing_id_is_bad_request() {
        let harness = Harness::new();
        let app = test_app!(harness.state.clone(), false);

        for uri in ["/feedback/%20", "/feedback/", "/feedback"] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "GET {uri}");
        }
        let resp = test::call_service(&app, post_form("/feedback/", multipart_body(&[], None)).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn image_submission_stores_hosted_url() {
        let harness = Harness::with_link("pic1", "Omar").await;
        let app = test_app!(harness.state.clone(), false);

        let body = multipart_body(
            &[("feedback_text", "see photo")],
            Some(("photo.png", "image/png", PNG_MAGIC)),
        );
        let resp = test::call_service(&app, post_form("/feedback/pic1", body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let stored = harness.store.submissions_for_link("pic1").await.unwrap();
        assert_eq!(
            stored[0].image_url.as_deref(),
            Some("https://assets.test/feedback-images/1.png")
        );
        assert_eq!(harness.journal.entries(), vec!["find", "find", "upload", "insert", "delete"]);
    }

    #[actix_web::test]
    async fn empty_file_part_means_no_image() {
        let harness = Harness::with_link("abc123", "Jane").await;
        let app = test_app!(harness.state.clone(), false);

        let body = multipart_body(
            &[("feedback_text", "no photo")],
            Some(("", "application/octet-stream", &b""[..])),
        );
        let resp = test::call_service(&app, post_form("/feedback/abc123", body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(!harness.journal.entries().contains(&"upload"));
    }

    #[actix_web::test]
    async fn non_image_attachment_is_rejected_and_link_survives() {
        let harness = Harness::with_link("abc123", "Jane").await;
        let app = test_app!(harness.state.clone(), false);

        let body = multipart_body(&[], Some(("notes.txt", "text/plain", &b"hello there"[..])));
        let resp = test::call_service(&app, post_form("/feedback/abc123", body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(test::read_body(resp).await).contains("Only image files are allowed"));

        let disguised = multipart_body(&[], Some(("fake.png", "image/png", &b"not really a png"[..])));
        let resp = test::call_service(&app, post_form("/feedback/abc123", disguised).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        assert!(harness.store.find_link("abc123").await.unwrap().is_some());
        assert!(harness.store.submissions_for_link("abc123").await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn oversized_image_is_rejected() {
        let harness = Harness::with_link("abc123", "Jane").await;
        let app = test_app!(harness.state.clone(), false);

        let mut big = PNG_MAGIC.to_vec();
        big.resize(harness.state.settings.max_image_bytes + 1, 0);
        let body = multipart_body(&[], Some(("big.png", "image/png", big.as_slice())));
        let resp = test::call_service(&app, post_form("/feedback/abc123", body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(harness.store.submissions_for_link("abc123").await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn rejected_upload_is_server_error_without_submission() {
        let harness = Harness::with_link("abc123", "Jane").await;
        harness.assets.set_mode(UploadMode::Reject);
        let app = test_app!(harness.state.clone(), false);

        let body = multipart_body(&[], Some(("photo.png", "image/png", PNG_MAGIC)));
        let resp = test::call_service(&app, post_form("/feedback/abc123", body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(test::read_body(resp).await).contains("Image upload failed"));

        assert!(harness.store.submissions_for_link("abc123").await.unwrap().is_empty());
        assert!(harness.store.find_link("abc123").await.unwrap().is_some());
    }

    #[actix_web::test]
    async fn repeated_answer_fields_are_joined() {
        let harness = Harness::with_link("abc123", "Jane").await;
        let app = test_app!(harness.state.clone(), false);

        let body = multipart_body(&[("topics", "delivery"), ("topics", "packaging")], None);
        let resp = test::call_service(&app, post_form("/feedback/abc123", body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let stored = harness.store.submissions_for_link("abc123").await.unwrap();
        assert_eq!(stored[0].answers["topics"], "delivery, packaging");
    }

    #[actix_web::test]
    async fn too_many_fields_are_rejected_and_link_survives() {
        let harness = Harness::with_link("abc123", "Jane").await;
        let app = test_app!(harness.state.clone(), false);

        let names: Vec<String> = (0..=100).map(|i| format!("q{i}")).collect();
        let fields: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), "x")).collect();
        let resp = test::call_service(&app, post_form("/feedback/abc123", multipart_body(&fields, None)).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(test::read_body(resp).await).contains("Too many form fields"));
        assert!(harness.store.find_link("abc123").await.unwrap().is_some());

        let fields = &fields[..100];
        let resp = test::call_service(&app, post_form("/feedback/abc123", multipart_body(fields, None)).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let stored = harness.store.submissions_for_link("abc123").await.unwrap();
        assert_eq!(stored[0].answers.len(), 100);
    }

    #[actix_web::test]
    async fn customer_name_is_escaped_in_pages() {
        let harness = Harness::with_link("xss", "<b>Eve</b>").await;
        let app = test_app!(harness.state.clone(), false);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/feedback/xss").to_request()).await;
        let page = body_text(test::read_body(resp).await);
        assert!(page.contains("&lt;b&gt;Eve&lt;/b&gt;"));
        assert!(!page.contains("<b>Eve</b>"));
    }
}
