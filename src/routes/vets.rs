use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::error::AppError;
use crate::models::Vet;
use crate::AppState;

#[derive(Template)]
#[template(path = "vets/list.html")]
struct VetListTemplate {
    vets: Vec<Vet>,
}

/// JSON rendering of the full veterinarian list.
#[derive(Serialize)]
struct VetListJson {
    vet_list: Vec<Vet>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vets", get(list_vets))
        .route("/vets.json", get(list_vets_json))
}

async fn list_vets(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let vets: Vec<Vet> = sqlx::query_as("SELECT * FROM vets")
        .fetch_all(&state.db)
        .await?;

    let template = VetListTemplate { vets };
    Ok(Html(template.render()?))
}

async fn list_vets_json(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let vet_list: Vec<Vet> = sqlx::query_as("SELECT * FROM vets")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(VetListJson { vet_list }))
}
