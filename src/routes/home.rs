use askama::Template;
use axum::{
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use crate::error::AppError;
use crate::AppState;

#[derive(Template)]
#[template(path = "welcome.html")]
struct WelcomeTemplate {}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(welcome))
}

async fn welcome() -> Result<impl IntoResponse, AppError> {
    let template = WelcomeTemplate {};
    Ok(Html(template.render()?))
}
