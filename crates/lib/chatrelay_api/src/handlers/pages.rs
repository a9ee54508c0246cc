//! Static pages and their scripts, embedded at compile time.

use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse};

const INDEX_HTML: &str = include_str!("../../assets/index.html");
const LOGIN_HTML: &str = include_str!("../../assets/login.html");
const REGISTER_HTML: &str = include_str!("../../assets/register.html");
const CHAT_JS: &str = include_str!("../../assets/js/script.js");
const AUTH_JS: &str = include_str!("../../assets/js/auth.js");

const JAVASCRIPT: &str = "text/javascript; charset=utf-8";

/// `GET /`: chat page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `GET /login-page`
pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_HTML)
}

/// `GET /register-page`
pub async fn register_page() -> Html<&'static str> {
    Html(REGISTER_HTML)
}

/// `GET /static/js/script.js`
pub async fn chat_script() -> impl IntoResponse {
    ([(CONTENT_TYPE, JAVASCRIPT)], CHAT_JS)
}

/// `GET /static/js/auth.js`
pub async fn auth_script() -> impl IntoResponse {
    ([(CONTENT_TYPE, JAVASCRIPT)], AUTH_JS)
}
