use pagegate::{
    AppState, MemoryRepository,
    config::{AppConfig, Env},
    create_router,
    repository::RepositoryState,
    seed::SeedData,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, installs logging, starts the rate-limit sweeper and serves the
/// router.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production settings)
    dotenv::dotenv().ok();
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };

    // 2. Logging: RUST_LOG wins, otherwise sensible local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pagegate=debug,tower_http=info".into());

    // 3. Pretty output locally, JSON for log aggregation in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);
    if config.env == Env::Production && config.admin_user_ids.is_none() {
        tracing::warn!("ADMIN_USER_IDS is not set: maintenance endpoints will deny everyone");
    }

    // 4. State: in-memory persistence and the shared rate-limit counter store.
    let repo = Arc::new(MemoryRepository::new()) as RepositoryState;
    match &config.seed_file {
        Some(path) => match SeedData::from_file(path) {
            Ok(seed) => {
                let (users, pages) = seed.apply(repo.as_ref()).await;
                tracing::info!(users, pages, path = %path.display(), "Repository seeded");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load seed data");
                std::process::exit(1);
            }
        },
        None => tracing::warn!("SEED_FILE is not set: starting with no users or pages"),
    }
    let bind_addr = config.bind_addr.clone();
    let sweep_every = config.rate_limit_sweep_every;
    let sweep_max_age = config.longest_rate_window();
    let app_state = AppState::new(repo, config);

    // 5. Background eviction of stale counters (memory bound only).
    let _sweeper = app_state
        .limiter
        .clone()
        .spawn_sweeper(sweep_every, sweep_max_age);

    // 6. Router and server
    let app = create_router(app_state);

    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, addr = %bind_addr, "Failed to bind listener");
            std::process::exit(1);
        }
    };

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server terminated");
        std::process::exit(1);
    }
}
