use {
    cashin_sync::{
        AppState,
        adapters::{callback::HttpsCallbackSender, http, paypack_client::PaypackClient},
        config::Config,
        services::cashin_pipeline::Processor,
    },
    std::{sync::Arc, time::Duration},
    tokio::{signal, sync::watch},
    tower_http::timeout::TimeoutLayer,
};

// Authorize and cash-in (30s each) plus the callback (15s), on top of the
// polling deadline. Expiry drops the response, not the invocation.
const REQUEST_SLACK: Duration = Duration::from_secs(90);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("invalid configuration");

    let client = PaypackClient::new(&config.base_url, &config.app_id, &config.app_secret);
    let sender = HttpsCallbackSender::new(&config.callback_url, config.callback_secret.clone())
        .expect("failed to configure callback sender");

    let processor = Processor::new(Arc::new(client))
        .with_poll_interval(config.poll_interval)
        .with_timeout(config.timeout)
        .with_notifier(Arc::new(sender));
    let request_timeout = processor.timeout() + REQUEST_SLACK;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let state = AppState {
        processor: Arc::new(processor),
        shutdown: shutdown_rx,
    };

    let app = http::router(state).layer(TimeoutLayer::new(request_timeout));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind listener");
    tracing::info!(
        addr = %config.listen_addr,
        poll_interval_secs = config.poll_interval.as_secs(),
        timeout_secs = config.timeout.as_secs(),
        "listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await
        .expect("server error");
}

async fn shutdown_signal(shutdown: watch::Sender<bool>) {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl+c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }

    // In-flight cash-ins stop polling and still report their outcome.
    let _ = shutdown.send(true);
}
