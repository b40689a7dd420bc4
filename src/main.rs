use axum::{
    routing::get,
    Router,
};
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod db;
mod handlers;
mod models;
mod services;
mod validation;

// Application State
pub struct AppState {
    pub db: sqlx::MySqlPool,
    pub config: config::Config,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::connection_log::list_connection_logs,
        handlers::connection_log::get_connection_log_by_id,
        handlers::connection_log::get_connection_logs_by_server_id,
        handlers::connection_log::create_connection_log,
        handlers::connection_log::delete_connection_log,
    ),
    components(schemas(
        models::connection_log::ConnectionLog,
        models::connection_log::CreatedConnectionLog,
        models::connection_log::ConnectionLogPage,
        models::connection_log::CreateConnectionLogRequest,
        validation::FieldError,
    ))
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let app_config = config::Config::from_env();

    let pool = db::establish_connection()
        .await
        .expect("Failed to connect to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let addr = format!("{}:{}", app_config.host, app_config.port)
        .parse::<SocketAddr>()
        .expect("Invalid address");

    let state = Arc::new(AppState {
        db: pool,
        config: app_config,
    });

    let app = Router::new()
        .route("/", get(root))
        .route(
            "/api/connection-logs",
            get(handlers::connection_log::list_connection_logs)
                .post(handlers::connection_log::create_connection_log),
        )
        .route(
            "/api/connection-logs/:id",
            get(handlers::connection_log::get_connection_log_by_id)
                .delete(handlers::connection_log::delete_connection_log),
        )
        .route(
            "/api/connection-logs/server/:server_id",
            get(handlers::connection_log::get_connection_logs_by_server_id),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server exited");
}

async fn root() -> &'static str {
    "MC Connection Log Backend API"
}
