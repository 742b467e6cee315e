use actix_web::{middleware::Logger, web, App, HttpServer};
use personalization_service::config::StoreBackend;
use personalization_service::handlers::{self, AppState};
use personalization_service::{
    build_service, Config, ContentCatalog, InMemoryPreferenceStore, PreferenceStore,
    RedisPreferenceStore,
};
use std::io;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Starting personalization-service v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!("Environment: {}", config.app.env);

    let catalog = match &config.catalog.path {
        Some(path) => match ContentCatalog::from_path(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                error!(path = %path, error = %e, "Catalog loading failed");
                eprintln!("ERROR: Failed to load catalog from {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => ContentCatalog::builtin().clone(),
    };
    info!(version = %catalog.version, default_role = %catalog.default_role, "Catalog ready");

    let store: Arc<dyn PreferenceStore> = match (config.store.backend, &config.store.redis_url) {
        (StoreBackend::Redis, Some(url)) => match redis::Client::open(url.as_str()) {
            Ok(client) => {
                info!("Using Redis preference store");
                Arc::new(RedisPreferenceStore::new(client))
            }
            Err(e) => {
                error!("Redis client creation failed: {}", e);
                eprintln!("ERROR: Invalid REDIS_URL: {}", e);
                std::process::exit(1);
            }
        },
        _ => {
            if config.is_production() {
                warn!("In-memory preference store in production: settings are lost on restart");
            }
            Arc::new(InMemoryPreferenceStore::new())
        }
    };

    let state = web::Data::new(AppState {
        personalization: Arc::new(build_service(&config, catalog, store)),
    });

    let bind_address = format!("0.0.0.0:{}", config.app.port);
    info!("HTTP server listening on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .run()
    .await
}
