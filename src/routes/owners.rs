use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use sqlx::FromRow;

use crate::error::AppError;
use crate::models::{Owner, Pet};
use crate::AppState;

#[derive(Template)]
#[template(path = "owners/list.html")]
struct OwnerListTemplate {
    owners: Vec<Owner>,
}

#[derive(Template)]
#[template(path = "owners/show.html")]
struct OwnerShowTemplate {
    owner: Owner,
    pets: Vec<PetView>,
}

struct PetView {
    pet: Pet,
    visits: Vec<VisitRow>,
}

/// Visit joined with its vet's name for the owner detail page.
#[derive(FromRow)]
struct VisitRow {
    id: i64,
    visit_date: String,
    description: String,
    actual: i64,
    vet_name: Option<String>,
}

impl VisitRow {
    fn is_active(&self) -> bool {
        self.actual == 1
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/owners", get(list_owners))
        .route("/owners/{id}", get(show_owner))
}

async fn list_owners(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let owners: Vec<Owner> = sqlx::query_as("SELECT * FROM owners ORDER BY last_name, first_name")
        .fetch_all(&state.db)
        .await?;

    let template = OwnerListTemplate { owners };
    Ok(Html(template.render()?))
}

async fn show_owner(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let owner: Option<Owner> = sqlx::query_as("SELECT * FROM owners WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.db)
        .await?;

    let Some(owner) = owner else {
        return Err(AppError::NotFound);
    };

    let owned: Vec<Pet> = sqlx::query_as("SELECT * FROM pets WHERE owner_id = ? ORDER BY name")
        .bind(owner.id)
        .fetch_all(&state.db)
        .await?;

    let mut pets = Vec::with_capacity(owned.len());
    for pet in owned {
        let visits: Vec<VisitRow> = sqlx::query_as(
            r#"
            SELECT v.id, v.visit_date, v.description, v.actual,
                   vt.first_name || ' ' || vt.last_name AS vet_name
            FROM visits v
            LEFT JOIN vets vt ON vt.id = v.vet_id
            WHERE v.pet_id = ?
            ORDER BY v.visit_date DESC, v.id DESC
            "#,
        )
        .bind(pet.id)
        .fetch_all(&state.db)
        .await?;

        pets.push(PetView { pet, visits });
    }

    let template = OwnerShowTemplate { owner, pets };
    Ok(Html(template.render()?))
}
