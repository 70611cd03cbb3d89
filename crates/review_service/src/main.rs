//! Review helpfulness prediction service

use anyhow::{Context, Result};
use review_core::features::sentiment::{DirectoryLexicons, EmbeddedLexicons, LexiconLoader};
use review_core::FeatureExtractor;
use review_registry::{ModelRegistry, RegistryError};
use review_service::{start_server, PredictionService, ServiceConfig, ServiceError, ServingContext};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    info!(version = review_service::VERSION, "Starting review helpfulness service");

    let config = ServiceConfig::load().context("Failed to load configuration")?;
    info!(
        bind_addr = %config.bind_addr,
        models_dir = %config.models_dir.display(),
        model_name = %config.model_name,
        "Configuration loaded"
    );

    let loader: Box<dyn LexiconLoader> = match &config.lexicon_dir {
        Some(dir) => Box::new(DirectoryLexicons::new(dir)),
        None => Box::new(EmbeddedLexicons),
    };
    let extractor =
        FeatureExtractor::from_loader(loader.as_ref()).context("Failed to load lexicons")?;

    let registry = ModelRegistry::open(&config.models_dir, &config.model_name)
        .context("Failed to open model registry")?;
    let context = Arc::new(ServingContext::new(registry));
    match context.reload() {
        Ok(loaded) => info!(id = %loaded.id, "Model ready"),
        Err(ServiceError::Registry(RegistryError::NotFound(path))) => warn!(
            path = %path,
            "No trained model found; starting degraded until POST /model/reload"
        ),
        Err(err) => warn!(error = %err, "Failed to load model; starting degraded"),
    }

    let service = Arc::new(PredictionService::new(extractor, context));
    start_server(service, &config.bind_addr, shutdown_signal()).await?;
    info!("Service stopped");
    Ok(())
}

fn init_logging() {
    let env = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(env)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
