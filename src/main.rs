use std::net::SocketAddr;
use tokio::net::TcpListener;

use petclinic::{build_app, db, seed};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:data/petclinic.db".to_string());

    let pool = db::init_pool(&database_url).await;

    // `petclinic seed` loads the demo owners/pets/vets and exits.
    if std::env::args().nth(1).as_deref() == Some("seed") {
        if let Err(e) = seed::seed_demo_data(&pool).await {
            eprintln!("Seeding failed: {e}");
            std::process::exit(1);
        }
        return;
    }

    let app = build_app(pool);

    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    let listener = TcpListener::bind(addr).await.unwrap();

    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await.unwrap();
}
