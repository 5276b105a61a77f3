use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect},
    routing::get,
    Form, Router,
};
use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::collections::HashMap;

use crate::error::AppError;
use crate::models::{Owner, Pet, Vet, Visit};
use crate::AppState;

#[derive(Template)]
#[template(path = "visits/new.html")]
struct NewVisitTemplate {
    owner_id: i64,
    pet: Pet,
    visit: Visit,
    vets: Vec<Vet>,
    errors: HashMap<String, String>,
}

#[derive(Template)]
#[template(path = "visits/edit.html")]
struct EditVisitTemplate {
    owner_id: i64,
    pet_id: i64,
    visit: Visit,
    pets: Vec<Pet>,
    vets: Vec<Vet>,
    errors: HashMap<String, String>,
}

/// Form fields accepted by both visit forms. Anything else submitted by the
/// client -- in particular a forged `id` -- is stripped by `bind_visit_form`
/// before the values can reach a query.
const ALLOWED_FIELDS: &[&str] = &["date", "description", "vet_id"];

#[derive(Debug, PartialEq)]
pub struct VisitForm {
    date: Option<String>,
    description: String,
    vet_id: Option<String>,
}

impl VisitForm {
    /// The selected vet's id. Only meaningful once validation has passed; an
    /// unparseable submission is rejected there.
    fn vet_ref(&self) -> Option<i64> {
        self.vet_id.as_deref().and_then(|v| v.parse().ok())
    }
}

fn bind_visit_form(raw: HashMap<String, String>) -> VisitForm {
    let mut fields: HashMap<String, String> = raw
        .into_iter()
        .filter(|(name, _)| ALLOWED_FIELDS.contains(&name.as_str()))
        .collect();

    let take = |fields: &mut HashMap<String, String>, name: &str| {
        fields
            .remove(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    VisitForm {
        date: take(&mut fields, "date"),
        description: take(&mut fields, "description").unwrap_or_default(),
        vet_id: take(&mut fields, "vet_id"),
    }
}

fn validate_visit_form(form: &VisitForm) -> HashMap<String, String> {
    let mut errors = HashMap::new();

    if form.description.trim().is_empty() {
        errors.insert(
            "description".to_string(),
            "Description is required".to_string(),
        );
    }

    if form.description.len() > 255 {
        errors.insert(
            "description".to_string(),
            "Description must be under 255 characters".to_string(),
        );
    }

    if let Some(date) = &form.date {
        if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            errors.insert(
                "date".to_string(),
                "Date must be in YYYY-MM-DD format".to_string(),
            );
        }
    }

    if let Some(vet_id) = &form.vet_id {
        if vet_id.parse::<i64>().is_err() {
            errors.insert(
                "vet_id".to_string(),
                "Veterinarian selection is invalid".to_string(),
            );
        }
    }

    errors
}

/// Context loaded at the top of every visit handler: always fresh, never
/// cached across requests. Fetches the pet (404 if absent), the full
/// unfiltered vet list, and attaches a transient visit to the pet so form
/// rendering can reference pet-level state.
struct VisitContext {
    pet: Pet,
    vets: Vec<Vet>,
    visit: Visit,
}

async fn load_pet_context(db: &SqlitePool, pet_id: i64) -> Result<VisitContext, AppError> {
    let pet: Option<Pet> = sqlx::query_as("SELECT * FROM pets WHERE id = ?")
        .bind(pet_id)
        .fetch_optional(db)
        .await?;

    let Some(mut pet) = pet else {
        return Err(AppError::NotFound);
    };

    let vets: Vec<Vet> = sqlx::query_as("SELECT * FROM vets")
        .fetch_all(db)
        .await?;

    let visit = Visit::new(pet_id);
    pet.add_visit(visit.clone());

    Ok(VisitContext { pet, vets, visit })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/owners/{owner_id}/pets/{pet_id}/visits/new",
            get(new_visit_form).post(create_visit),
        )
        .route(
            "/owners/{owner_id}/pets/{pet_id}/visits/edit/{id}",
            get(edit_visit_form).post(update_visit),
        )
        // Historical path name; this toggles the cancellation flag, it does
        // not delete the row.
        .route(
            "/owners/{owner_id}/pets/{pet_id}/visits/delete/{id}",
            get(cancel_visit),
        )
}

async fn new_visit_form(
    State(state): State<AppState>,
    Path((owner_id, pet_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = load_pet_context(&state.db, pet_id).await?;

    let template = NewVisitTemplate {
        owner_id,
        pet: ctx.pet,
        visit: ctx.visit,
        vets: ctx.vets,
        errors: HashMap::new(),
    };
    Ok(Html(template.render()?))
}

async fn create_visit(
    State(state): State<AppState>,
    Path((owner_id, pet_id)): Path<(i64, i64)>,
    Form(raw): Form<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = load_pet_context(&state.db, pet_id).await?;
    let form = bind_visit_form(raw);

    let errors = validate_visit_form(&form);
    if !errors.is_empty() {
        // Re-render with the submitted values; nothing is persisted.
        let mut visit = ctx.visit;
        if let Some(date) = &form.date {
            visit.visit_date = date.clone();
        }
        visit.vet_id = form.vet_ref();
        visit.description = form.description;

        let template = NewVisitTemplate {
            owner_id,
            pet: ctx.pet,
            visit,
            vets: ctx.vets,
            errors,
        };
        return Ok(Html(template.render()?).into_response());
    }

    // New visits are always active; the date falls back to the transient
    // context visit's default (today) when omitted.
    let vet_id = form.vet_ref();
    let date = form.date.unwrap_or(ctx.visit.visit_date);
    sqlx::query(
        "INSERT INTO visits (visit_date, description, pet_id, vet_id, actual) VALUES (?, ?, ?, ?, 1)",
    )
    .bind(&date)
    .bind(&form.description)
    .bind(pet_id)
    .bind(vet_id)
    .execute(&state.db)
    .await?;

    Ok(Redirect::to(&format!("/owners/{owner_id}")).into_response())
}

async fn edit_visit_form(
    State(state): State<AppState>,
    Path((owner_id, pet_id, id)): Path<(i64, i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = load_pet_context(&state.db, pet_id).await?;

    // Missing visit or owner ids are not handled here; RowNotFound surfaces
    // as a generic server error.
    let visit: Visit = sqlx::query_as("SELECT * FROM visits WHERE id = ?")
        .bind(id)
        .fetch_one(&state.db)
        .await?;

    let owner: Owner = sqlx::query_as("SELECT * FROM owners WHERE id = ?")
        .bind(owner_id)
        .fetch_one(&state.db)
        .await?;

    let pets: Vec<Pet> = sqlx::query_as("SELECT * FROM pets WHERE owner_id = ?")
        .bind(owner.id)
        .fetch_all(&state.db)
        .await?;

    let template = EditVisitTemplate {
        owner_id,
        pet_id,
        visit,
        pets,
        vets: ctx.vets,
        errors: HashMap::new(),
    };
    Ok(Html(template.render()?))
}

async fn update_visit(
    State(state): State<AppState>,
    Path((owner_id, pet_id, id)): Path<(i64, i64, i64)>,
    Form(raw): Form<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = load_pet_context(&state.db, pet_id).await?;
    let form = bind_visit_form(raw);

    let errors = validate_visit_form(&form);
    if !errors.is_empty() {
        // The stored visit is reloaded and shown; the candidate's edited
        // values are discarded on this path. Kept as-is from the original
        // behavior, even though the user's corrections vanish.
        let visit: Visit = sqlx::query_as("SELECT * FROM visits WHERE id = ?")
            .bind(id)
            .fetch_one(&state.db)
            .await?;

        let pets: Vec<Pet> = sqlx::query_as("SELECT * FROM pets WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_all(&state.db)
            .await?;

        let template = EditVisitTemplate {
            owner_id,
            pet_id,
            visit,
            pets,
            vets: ctx.vets,
            errors,
        };
        return Ok(Html(template.render()?).into_response());
    }

    // The actual flag is never editable through this form; recover it from
    // the prior row so the update cannot change it.
    let prior: Visit = sqlx::query_as("SELECT * FROM visits WHERE id = ?")
        .bind(id)
        .fetch_one(&state.db)
        .await?;

    sqlx::query("UPDATE visits SET visit_date = ?, description = ?, vet_id = ?, actual = ? WHERE id = ?")
        .bind(form.date.as_deref().unwrap_or(&prior.visit_date))
        .bind(&form.description)
        .bind(form.vet_ref())
        .bind(prior.actual)
        .bind(id)
        .execute(&state.db)
        .await?;

    Ok(Redirect::to(&format!("/owners/{owner_id}")).into_response())
}

async fn cancel_visit(
    State(state): State<AppState>,
    Path((owner_id, pet_id, id)): Path<(i64, i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    load_pet_context(&state.db, pet_id).await?;

    let mut visit: Visit = sqlx::query_as("SELECT * FROM visits WHERE id = ?")
        .bind(id)
        .fetch_one(&state.db)
        .await?;

    visit.toggle_actual();
    tracing::info!("visit cancellation toggled: {visit}");

    sqlx::query("UPDATE visits SET actual = ? WHERE id = ?")
        .bind(visit.actual)
        .bind(id)
        .execute(&state.db)
        .await?;

    Ok(Redirect::to(&format!("/owners/{owner_id}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn bind_strips_disallowed_id_field() {
        let form = bind_visit_form(raw(&[
            ("id", "999"),
            ("date", "2024-01-01"),
            ("description", "checkup"),
            ("vet_id", "2"),
        ]));
        assert_eq!(
            form,
            VisitForm {
                date: Some("2024-01-01".to_string()),
                description: "checkup".to_string(),
                vet_id: Some("2".to_string()),
            }
        );
        assert_eq!(form.vet_ref(), Some(2));
    }

    #[test]
    fn bind_treats_blank_fields_as_absent() {
        let form = bind_visit_form(raw(&[("date", ""), ("description", "  "), ("vet_id", "")]));
        assert_eq!(form.date, None);
        assert_eq!(form.description, "");
        assert_eq!(form.vet_id, None);
        assert_eq!(form.vet_ref(), None);
    }

    #[test]
    fn validate_rejects_unparseable_vet_id() {
        let form = bind_visit_form(raw(&[("description", "x"), ("vet_id", "carter")]));
        let errors = validate_visit_form(&form);
        assert_eq!(errors.get("vet_id").unwrap(), "Veterinarian selection is invalid");
    }

    #[test]
    fn validate_rejects_overlong_description() {
        let form = bind_visit_form(raw(&[("description", "x".repeat(256).as_str())]));
        let errors = validate_visit_form(&form);
        assert_eq!(
            errors.get("description").unwrap(),
            "Description must be under 255 characters"
        );
    }

    #[test]
    fn validate_requires_description() {
        let form = bind_visit_form(raw(&[("date", "2024-01-01")]));
        let errors = validate_visit_form(&form);
        assert_eq!(errors.get("description").unwrap(), "Description is required");
    }

    #[test]
    fn validate_rejects_malformed_date() {
        let form = bind_visit_form(raw(&[("date", "01/02/2024"), ("description", "checkup")]));
        let errors = validate_visit_form(&form);
        assert!(errors.contains_key("date"));
    }

    #[test]
    fn validate_accepts_complete_form() {
        let form = bind_visit_form(raw(&[("date", "2024-01-01"), ("description", "checkup")]));
        assert!(validate_visit_form(&form).is_empty());
    }
}
