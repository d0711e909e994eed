use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paddock::event::EventBus;
use paddock::shared::AppState;
use paddock::store::InMemoryStore;
// use paddock::store::PostgresStore; // For production

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paddock=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting league results server");

    // Create shared application state with dependency injection
    // One store instance backs all three repositories so the
    // cross-aggregate writes stay transactional.
    let store = Arc::new(InMemoryStore::new());

    // For production with PostgreSQL:
    // let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    // let pool = sqlx::PgPool::connect(&database_url).await.expect("Failed to connect to database");
    // let store = Arc::new(PostgresStore::new(pool));

    let app_state = AppState::new(
        store.clone(),
        store.clone(),
        store,
        EventBus::new(1000),
    );

    let app = Router::new()
        .route("/", get(|| async { "League results server" }))
        .route(
            "/races/:race_id/results",
            post(paddock::results::handlers::replace_race_results)
                .get(paddock::results::handlers::get_race_results),
        )
        .route("/races/:race_id", delete(paddock::results::handlers::delete_race))
        .route(
            "/penalties",
            post(paddock::penalties::handlers::apply_penalty)
                .get(paddock::penalties::handlers::list_penalties),
        )
        .route(
            "/penalties/:penalty_id",
            delete(paddock::penalties::handlers::remove_penalty),
        )
        .route(
            "/seasons/:season_id/standings",
            get(paddock::standings::handlers::get_standings),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // run our app with hyper, listening globally on port 3000
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("Server running on http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}
