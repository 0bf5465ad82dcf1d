use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

/// Front-end assets compiled into the binary, so the server ships as a
/// single executable.
#[derive(RustEmbed)]
#[folder = "static/"]
struct StaticAssets;

pub async fn static_handler(Path(path): Path<String>) -> Response {
    let path = path.trim_start_matches('/');

    match StaticAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref())],
                content.data.to_vec(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "File not found").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_embedded_assets_with_mime_type() {
        let response = static_handler(Path("app.js".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let mime = response.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(mime.to_str().unwrap().contains("javascript"));
    }

    #[tokio::test]
    async fn unknown_asset_is_404() {
        let response = static_handler(Path("nope.bin".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
