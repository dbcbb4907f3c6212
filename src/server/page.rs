use axum::response::Html;

/// The single-page frontend. Static: nothing in it depends on the request.
pub const INDEX_HTML: &str = include_str!("../../assets/index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
