use axum::response::Html;

/// Browser page driving the two JSON endpoints.
pub async fn race_test_page() -> Html<&'static str> {
    Html(include_str!("race_test.html"))
}
