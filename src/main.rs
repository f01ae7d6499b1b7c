use std::sync::Arc;
use std::sync::atomic::Ordering;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logsage::config::{CacheBackend, Config};
use logsage::services::{
    AnalyticsService, CacheStore, CompletionService, ErrorLogConsumer, ErrorProcessor,
    HistoryService, KafkaQueueSource, LLMClient, MemoryCacheStore, ProcessorSettings,
    RedisCacheStore,
};
use logsage::{AppState, handlers};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration first
    let config = Config::load()?;

    // Initialize logging
    let log_filter = tracing_subscriber::EnvFilter::new(&config.logging.level);

    let registry = tracing_subscriber::registry().with(log_filter);

    // Keep the non-blocking writer guard alive for the whole process
    let mut _log_guard = None;
    if let Some(log_file) = &config.logging.file {
        let log_path = std::path::Path::new(log_file);
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let log_dir = log_path.parent().and_then(|p| p.to_str()).unwrap_or("logs");
        let file_name = log_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("logsage.log");
        // Remove .log extension if present (rolling appender adds date suffix)
        let file_prefix = file_name.strip_suffix(".log").unwrap_or(file_name);

        let file_appender = tracing_appender::rolling::daily(log_dir, file_prefix);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        _log_guard = Some(guard);
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
            .with(tracing_subscriber::fmt::layer())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
    tracing::info!("LogSage starting up");
    tracing::info!("Configuration loaded successfully");

    // Cache store
    let cache: Arc<dyn CacheStore> = match config.cache.backend {
        CacheBackend::Redis => Arc::new(RedisCacheStore::connect(&config.cache.redis_url()).await?),
        CacheBackend::Memory => {
            tracing::warn!("Using in-memory cache store, records are lost on restart");
            Arc::new(MemoryCacheStore::new())
        },
    };

    // Completion client
    let llm_client = LLMClient::new(&config.llm);
    tracing::info!("LLM client initialized (model: {})", llm_client.model());
    let completion: Arc<dyn CompletionService> = Arc::new(llm_client);

    let processor = Arc::new(ErrorProcessor::new(
        Arc::clone(&cache),
        Arc::clone(&completion),
        ProcessorSettings {
            key_prefix: config.cache.key_prefix.clone(),
            cache_ttl: config.cache.ttl(),
            completion_timeout: config.llm.timeout(),
        },
    ));
    let history_service =
        Arc::new(HistoryService::new(Arc::clone(&cache), config.cache.key_prefix.clone()));
    let analytics_service = Arc::new(AnalyticsService::new(
        Arc::clone(&history_service),
        Arc::clone(&completion),
        config.llm.timeout(),
    ));

    // Start the Kafka consumption loop
    let mut consumer_task = None;
    if config.consumer.enabled {
        match KafkaQueueSource::connect(&config.kafka) {
            Ok(source) => {
                let consumer =
                    ErrorLogConsumer::new(Arc::clone(&processor), config.kafka.poll_timeout());
                let shutdown = consumer.shutdown_handle();
                let handle = consumer.spawn(Box::new(source));
                consumer_task = Some((shutdown, handle));
                tracing::info!("Kafka consumer started successfully");
            },
            Err(e) => {
                tracing::error!("Failed to start Kafka consumer: {}", e);
                tracing::warn!("Dashboard will serve existing cache entries only");
            },
        }
    } else {
        tracing::warn!("Kafka consumer disabled by configuration");
    }

    let app_state = Arc::new(AppState { history_service, analytics_service });
    let app = handlers::router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("API documentation available at http://{}/api-docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some((shutdown, handle)) = consumer_task {
        shutdown.store(true, Ordering::Relaxed);
        match handle.await {
            Ok(exit) => tracing::info!("Kafka consumer exited: {:?}", exit),
            Err(e) => tracing::error!("Kafka consumer task failed: {}", e),
        }
    }

    tracing::info!("LogSage stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
