pub mod adapters;
pub mod config;
pub mod domain;
pub mod services;

use {services::cashin_pipeline::Processor, std::sync::Arc, tokio::sync::watch};

#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<Processor>,
    /// Flips to `true` on shutdown; in-flight invocations stop polling and
    /// report an unconfirmed outcome.
    pub shutdown: watch::Receiver<bool>,
}
