//! Bionary Club Backend
//!
//! REST backend for the club website with SQLite persistence and a
//! leaderboard ranked on every read.

mod api;
mod args;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod ranking;
mod scoring;
mod seed;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use args::{Args, Command};
use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Database path: {:?}", config.db_path);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(repo, config).await?,
        Command::CreateAdmin { username, password } => {
            seed::create_admin(&repo, &username, &password).await?;
        }
        Command::Seed { file, force } => {
            let members = seed::load_members(&file).await?;
            tracing::info!("Seeding {} members from {:?}", members.len(), file);
            seed::seed_leaderboard(&repo, &members, force).await?;
        }
        Command::BackfillScores => {
            let updated = repo.backfill_scores().await?;
            tracing::info!("Done. Updated: {}", updated);
        }
    }

    Ok(())
}

async fn serve(repo: Arc<Repository>, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting Bionary backend");
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if no signing secret is configured
    if config.jwt_secret.is_none() {
        tracing::warn!(
            "No JWT secret configured (BIONARY_JWT_SECRET). Admin endpoints are unprotected!"
        );
    }

    let bind_addr = config.bind_addr;
    let state = AppState {
        repo,
        config: Arc::new(config),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone secret for the auth layer
    let secret = state.config.jwt_secret.clone();

    // Admin writes
    let protected_routes = Router::new()
        .route("/leaderboard", post(api::create_entry))
        .route("/leaderboard/{id}", put(api::update_entry).delete(api::delete_entry))
        .route("/events", post(api::create_event))
        .route("/events/{id}", put(api::update_event).delete(api::delete_event))
        .route("/gallery", post(api::create_gallery_item))
        .route(
            "/gallery/{id}",
            put(api::update_gallery_item).delete(api::delete_gallery_item),
        )
        .route("/blog", post(api::create_blog_post))
        .route("/blog/{id}", put(api::update_blog_post).delete(api::delete_blog_post))
        .layer(middleware::from_fn(move |req, next| {
            auth::jwt_auth_layer(secret.clone(), req, next)
        }));

    // Reads and login (no auth required)
    let public_routes = Router::new()
        .route("/leaderboard", get(api::get_leaderboard))
        .route("/leaderboard/{id}", get(api::get_entry))
        .route("/events", get(api::list_events))
        .route("/events/{id}", get(api::get_event))
        .route("/gallery", get(api::list_gallery))
        .route("/gallery/{id}", get(api::get_gallery_item))
        .route("/blog", get(api::list_blog_posts))
        .route("/blog/{id}", get(api::get_blog_post))
        .route("/departments", get(api::list_departments))
        .route("/revision", get(api::get_revision))
        .route("/health", get(api_health))
        .route("/auth/login", post(api::login));

    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

/// JSON health check polled by the website.
async fn api_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
