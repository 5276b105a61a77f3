use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("Failed to create in-memory SQLite pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let router = petclinic::build_app(pool.clone());

        Self { router, db: pool }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.request(req).await
    }

    pub async fn post_form(&self, uri: &str, body: &str) -> Response {
        let req = Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(req).await
    }

    /// Insert an owner row and return its id.
    pub async fn create_owner(&self, first_name: &str, last_name: &str) -> i64 {
        sqlx::query(
            "INSERT INTO owners (first_name, last_name, address, city, telephone) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(first_name)
        .bind(last_name)
        .bind("110 W. Liberty St.")
        .bind("Madison")
        .bind("6085551023")
        .execute(&self.db)
        .await
        .expect("Failed to create test owner")
        .last_insert_rowid()
    }

    pub async fn create_pet(&self, owner_id: i64, name: &str) -> i64 {
        sqlx::query("INSERT INTO pets (name, birth_date, owner_id) VALUES (?, ?, ?)")
            .bind(name)
            .bind("2021-04-17")
            .bind(owner_id)
            .execute(&self.db)
            .await
            .expect("Failed to create test pet")
            .last_insert_rowid()
    }

    pub async fn create_vet(&self, first_name: &str, last_name: &str) -> i64 {
        sqlx::query("INSERT INTO vets (first_name, last_name) VALUES (?, ?)")
            .bind(first_name)
            .bind(last_name)
            .execute(&self.db)
            .await
            .expect("Failed to create test vet")
            .last_insert_rowid()
    }

    pub async fn create_visit(&self, pet_id: i64, description: &str, actual: i64) -> i64 {
        sqlx::query(
            "INSERT INTO visits (visit_date, description, pet_id, vet_id, actual) VALUES (?, ?, ?, NULL, ?)",
        )
        .bind("2024-01-01")
        .bind(description)
        .bind(pet_id)
        .bind(actual)
        .execute(&self.db)
        .await
        .expect("Failed to create test visit")
        .last_insert_rowid()
    }

    /// Fetch (visit_date, description, vet_id, actual) for a visit row.
    pub async fn visit_row(&self, id: i64) -> (String, String, Option<i64>, i64) {
        sqlx::query_as("SELECT visit_date, description, vet_id, actual FROM visits WHERE id = ?")
            .bind(id)
            .fetch_one(&self.db)
            .await
            .expect("Visit row should exist")
    }

    pub async fn visit_count(&self) -> i64 {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM visits")
            .fetch_one(&self.db)
            .await
            .unwrap();
        count.0
    }
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Assert that a response is a redirect to the given location.
pub fn assert_redirect(resp: &Response, expected_location: &str) {
    assert!(
        resp.status().is_redirection(),
        "Expected redirect, got {}",
        resp.status()
    );
    let location = resp
        .headers()
        .get("location")
        .expect("Redirect should have location header")
        .to_str()
        .unwrap();
    assert_eq!(location, expected_location);
}
