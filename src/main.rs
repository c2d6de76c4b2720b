use std::net::SocketAddr;

use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taller_backend::{config::Config, db, routes, AppState};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taller_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    if config.jwt_secret.is_none() {
        tracing::warn!("JWT_SECRET is not set; login and protected routes will fail");
    }
    tracing::info!("Starting server at {}", config.server_addr());

    // Connections open lazily, so this only fails on a malformed URL
    let db = db::connect(&config)
        .await
        .expect("Failed to configure database pool");

    if db::check_connectivity(&db).await {
        match migration::Migrator::up(&db, None).await {
            Ok(()) => tracing::info!("Migrations complete"),
            Err(e) => tracing::error!("Failed to run migrations: {}", e),
        }

        if let Some(seed) = &config.admin_seed {
            if let Err(e) = db::seed_admin(&db, seed).await {
                tracing::error!("Failed to seed admin account: {}", e);
            }
        }
    }

    let state = AppState {
        db,
        config: config.clone(),
    };

    let app = routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    let addr: SocketAddr = config.server_addr().parse().expect("Invalid address");
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
