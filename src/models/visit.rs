use chrono::Local;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A clinic visit for a pet. `id` is assigned by SQLite on first insert and is
/// never bound from client input. `actual` is an integer flag restricted to
/// {0, 1}: 1 = active, 0 = cancelled. Visits are soft-cancelled by toggling
/// the flag, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Visit {
    pub id: Option<i64>,
    pub visit_date: String,
    pub description: String,
    pub pet_id: i64,
    pub vet_id: Option<i64>,
    pub actual: i64,
}

impl Visit {
    /// A transient visit for the given pet, dated today and active.
    pub fn new(pet_id: i64) -> Self {
        Self {
            id: None,
            visit_date: Local::now().format("%Y-%m-%d").to_string(),
            description: String::new(),
            pet_id,
            vet_id: None,
            actual: 1,
        }
    }

    pub fn is_active(&self) -> bool {
        self.actual == 1
    }

    /// Flips active <-> cancelled. Applying it twice restores the original
    /// state.
    pub fn toggle_actual(&mut self) {
        self.actual = if self.actual == 1 { 0 } else { 1 };
    }

    pub fn has_vet(&self, vet_id: i64) -> bool {
        self.vet_id == Some(vet_id)
    }
}

impl std::fmt::Display for Visit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Visit{{id={:?}, date={}, description='{}', pet_id={}, vet_id={:?}}}",
            self.id, self.visit_date, self.description, self.pet_id, self.vet_id
        )
    }
}
