mod config;

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use config::AppConfig;
use reviewcrab_api::{
    AppState, decide_review, get_review, handle_webhook, health, list_branch_rules, list_reviews,
    root, stats,
};
use reviewcrab_db::branch_rules::seed_default_rules;
use reviewcrab_db::{create_pool, run_migrations};
use reviewcrab_github::{GithubApiClient, WebhookSecret};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Install SQLite driver for sqlx::Any
    sqlx::any::install_default_drivers();

    // Load configuration
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Configuration loaded successfully");

    // Create database connection pool
    let db_pool = match create_pool(&config.database.url, config.database.max_connections).await {
        Ok(pool) => {
            info!("Database connection pool created: {}", config.database.url);
            pool
        }
        Err(e) => {
            error!("Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    // Run database migrations
    if let Err(e) = run_migrations(&db_pool).await {
        error!("Failed to run database migrations: {}", e);
        std::process::exit(1);
    }
    info!("Database migrations completed successfully");

    // Seed the built-in branch rule catalog (idempotent, additive only)
    match seed_default_rules(&db_pool).await {
        Ok(inserted) => info!("Branch rule catalog seeded ({} rules inserted)", inserted),
        Err(e) => {
            error!("Failed to seed branch rules: {}", e);
            std::process::exit(1);
        }
    }

    // Create GitHub API client
    let github_client = match GithubApiClient::new(config.github.token.clone()) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create GitHub API client: {}", e);
            std::process::exit(1);
        }
    };

    // Create webhook secret
    let webhook_secret = WebhookSecret::new(config.github.webhook_secret.clone());

    // Create application state
    let app_state = AppState::new(db_pool, github_client, webhook_secret);

    // Build Axum router
    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/webhooks/github", post(handle_webhook))
        .route("/api/reviews", get(list_reviews))
        .route("/api/reviews/stats/summary", get(stats))
        .route("/api/reviews/{id}", get(get_review))
        .route("/api/reviews/{id}/decide", post(decide_review))
        .route("/api/rules", get(list_branch_rules))
        .layer(cors_layer(&config.cors.allowed_origins))
        .with_state(app_state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("Server listening on http://{}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    info!("Server shutdown complete");
}

/// CORS layer for the instructor frontend
fn cors_layer(allowed_origins: &str) -> CorsLayer {
    if allowed_origins.trim() == "*" {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Wait for SIGINT/SIGTERM for graceful shutdown
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
