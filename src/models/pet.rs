use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::Visit;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub birth_date: Option<String>,
    pub owner_id: i64,
    /// In-memory only; holds the transient visit attached while rendering the
    /// visit forms. Not a column.
    #[sqlx(skip)]
    #[serde(skip)]
    pub visits: Vec<Visit>,
}

impl Pet {
    pub fn add_visit(&mut self, visit: Visit) {
        self.visits.push(visit);
    }
}
