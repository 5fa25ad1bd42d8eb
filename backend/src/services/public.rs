use actix_web::web::{get, scope, Path};
use actix_web::{HttpResponse, Scope};
use include_dir::{include_dir, Dir};
use mime_guess::from_path;

static PUBLIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/public");

const API_PATH: &str = "/public";

/// Serves the stylesheet and other static files embedded from `backend/public`.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/{path:.*}", get().to(serve_embedded))
}

async fn serve_embedded(path: Path<String>) -> HttpResponse {
    let file_path = path.trim_start_matches('/');

    match PUBLIC_DIR.get_file(file_path) {
        Some(file) => {
            let mime = from_path(file_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(file.contents().to_vec())
        }
        None => HttpResponse::NotFound().body("Not Found"),
    }
}
