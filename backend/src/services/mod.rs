//! HTTP surface of the feedback server.
//!
//! - `feedback`: the customer-facing form and submission routes.
//! - `submissions`: read-only JSON retrieval, mounted only when enabled.
//! - `public`: embedded static assets.
//! - `views`: HTML rendering shared by the routes and the error responses.

pub mod feedback;
pub mod public;
pub mod submissions;
pub mod views;

use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};

const BANNER: &str = "Feedback System API - Use /feedback/:id to access feedback forms";

/// Registers every route. Shared by `main.rs` and the route tests.
pub fn configure(cfg: &mut web::ServiceConfig, reporting_api: bool) {
    cfg.route("/", web::get().to(index))
        .service(feedback::configure_routes())
        .service(public::configure_routes());

    if reporting_api {
        cfg.service(submissions::configure_routes());
    }

    cfg.default_service(web::route().to(not_found));
}

async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(BANNER)
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type(ContentType::plaintext())
        .body("Page not found")
}
