use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fileshare::{
    api,
    config::{Config, NotifierBackend, StorageBackend},
    notify,
    object_store as obj,
    storage::Database,
    AppState,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "gcp" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_stackdriver::layer())
                .init();
        }
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "fileshare starting");

    // Load configuration
    let config = Config::load()?;

    // Initialize database
    let db = Database::open(&config.node.data_dir)?;
    info!("Database opened at: {}", config.node.data_dir);

    // Initialize object store backend
    let mut local_store: Option<Arc<obj::LocalStore>> = None;
    let object_store: Arc<dyn obj::ObjectStore> = match config.storage.backend {
        StorageBackend::Local => {
            let store = Arc::new(obj::LocalStore::new(
                &config.storage.local_storage_path,
                &config.node.public_base_url,
                &config.storage.local_signing_secret,
                config.url_ttl_secs,
            )?);
            info!(
                "Using local storage backend at: {}",
                config.storage.local_storage_path
            );
            local_store = Some(Arc::clone(&store));
            store
        }
        StorageBackend::S3 => {
            let bucket = config
                .storage
                .s3_bucket
                .as_deref()
                .expect("S3_BUCKET validated in config");
            let store = obj::S3Store::new(
                bucket,
                &config.storage.s3_region,
                config
                    .storage
                    .s3_access_key
                    .as_deref()
                    .expect("S3_ACCESS_KEY validated in config"),
                config
                    .storage
                    .s3_secret_key
                    .as_deref()
                    .expect("S3_SECRET_KEY validated in config"),
                config.storage.s3_endpoint.as_deref(),
                config.url_ttl_secs,
            )?;
            info!("Using S3 storage backend, bucket: {}", bucket);
            Arc::new(store)
        }
    };

    // Initialize notification sink
    let notifier: Arc<dyn notify::Notifier> = match config.notifier.backend {
        NotifierBackend::Http => {
            let endpoint = config
                .notifier
                .endpoint
                .as_deref()
                .expect("MAIL_API_ENDPOINT validated in config");
            let token = config
                .notifier
                .api_token
                .as_deref()
                .expect("MAIL_API_TOKEN validated in config");
            info!("Using HTTP mail notifier: {}", endpoint);
            Arc::new(notify::HttpNotifier::new(
                endpoint,
                token,
                &config.notifier.from_address,
            )?)
        }
        NotifierBackend::Log => {
            info!("Using log notifier (emails are not sent)");
            Arc::new(notify::LogNotifier)
        }
    };

    // Create shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        object_store,
        notifier,
        local_store,
    });

    // Build and start the HTTP server
    let app = api::create_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(&config.node.bind_address).await?;
    info!("Listening on: {}", config.node.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
