//! API server entry point.

use std::sync::Arc;

use api::{AppState, Config, LogFormat, Stores};
use common::Money;
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use store::{EventStore, InMemoryCatalogStore, InMemoryEventStore, PostgresEventStore, ProductDraft};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Starter catalog for in-memory mode.
fn sample_products() -> Vec<ProductDraft> {
    let mut food = ProductDraft::new("Premium Cat Food Mix", Money::from_major(890));
    food.original_price = Some(Money::from_major(1200));
    food.is_featured = true;
    food.stock = Some(40);
    food.tags = vec!["cat".to_string(), "food".to_string()];

    let mut toys = ProductDraft::new("Interactive Dog Toy Set", Money::from_major(450));
    toys.stock = Some(25);
    toys.tags = vec!["dog".to_string(), "toys".to_string()];

    let mut bed = ProductDraft::new("Cozy Pet Bed", Money::from_major(1250));
    bed.stock = Some(0);

    vec![food, toys, bed]
}

async fn serve<S: EventStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    config: &Config,
    metrics_handle: PrometheusHandle,
) {
    // Replay any existing orders into the read models
    state.refresh_views().await.expect("catch-up failed");

    let app = api::create_app(state, metrics_handle, &config.login_url);

    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();
    init_tracing(&config);

    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(url)
                .await
                .expect("failed to connect to PostgreSQL");
            store::run_migrations(&pool)
                .await
                .expect("failed to run migrations");
            tracing::info!("using PostgreSQL stores");

            let state = AppState::new(
                PostgresEventStore::new(pool.clone()),
                Stores::postgres(pool),
                config.shipping_fee,
            );
            serve(state, &config, metrics_handle).await;
        }
        None => {
            let catalog = InMemoryCatalogStore::seeded(sample_products())
                .await
                .expect("failed to seed catalog");
            tracing::warn!("DATABASE_URL not set, using in-memory stores");

            let state = AppState::new(
                InMemoryEventStore::new(),
                Stores::in_memory(catalog),
                config.shipping_fee,
            );
            serve(state, &config, metrics_handle).await;
        }
    }

    tracing::info!("server shut down gracefully");
}
