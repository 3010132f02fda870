use {
    crate::domain::{
        error::PipelineError,
        id::TransactionRef,
        notifier::OutcomeNotifier,
        outcome::Outcome,
        provider::PaymentProvider,
        request::DebitRequest,
        transaction::Transaction,
    },
    std::{sync::Arc, time::Duration},
    tokio::{sync::watch, time::Instant},
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

enum PollResult {
    Confirmed(Transaction),
    Expired,
}

/// Drives one cash-in from acceptance to a terminal outcome:
/// validate, initiate, poll until confirmed or out of time, notify.
pub struct Processor {
    provider: Arc<dyn PaymentProvider>,
    notifier: Option<Arc<dyn OutcomeNotifier>>,
    poll_interval: Duration,
    timeout: Duration,
}

impl Processor {
    pub fn new(provider: Arc<dyn PaymentProvider>) -> Self {
        Self {
            provider,
            notifier: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.poll_interval = interval;
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.timeout = timeout;
        }
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn OutcomeNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one invocation with no external cancellation.
    pub async fn handle(&self, request: DebitRequest) -> Result<Outcome, PipelineError> {
        let (_tx, shutdown) = watch::channel(false);
        self.handle_until(request, shutdown).await
    }

    /// Run one invocation. Once `shutdown` flips to `true` the polling phase
    /// ends the same way it does on timeout: an unconfirmed outcome is built
    /// and still delivered to the notifier.
    #[tracing::instrument(
        name = "cashin",
        skip_all,
        fields(number = %request.number, reference = tracing::field::Empty)
    )]
    pub async fn handle_until(
        &self,
        request: DebitRequest,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<Outcome, PipelineError> {
        let amount = request.validate()?;

        tracing::info!(%amount, "initiating cashin");
        let initiated = self
            .provider
            .cash_in(&request.number, amount)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "cashin failed"))?;

        let reference = initiated.reference;
        if reference.is_empty() {
            return Err(PipelineError::Protocol(
                "cashin response missing reference".into(),
            ));
        }
        tracing::Span::current().record("reference", tracing::field::display(&reference));
        tracing::info!("cashin accepted, polling");

        let outcome = match self.poll_transaction(&reference, &mut shutdown).await? {
            PollResult::Confirmed(txn) => Outcome::confirmed(reference, txn, request),
            PollResult::Expired => {
                tracing::warn!(timeout_secs = self.timeout.as_secs(), "transaction not confirmed in time");
                Outcome::not_confirmed(reference, request)
            }
        };

        self.emit_callback(&outcome).await;
        Ok(outcome)
    }

    async fn poll_transaction(
        &self,
        reference: &TransactionRef,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<PollResult, PipelineError> {
        let expiry = tokio::time::sleep_until(Instant::now() + self.timeout);
        tokio::pin!(expiry);

        loop {
            let attempt = tokio::select! {
                biased;
                _ = &mut expiry => return Ok(PollResult::Expired),
                _ = cancelled(shutdown) => return Ok(PollResult::Expired),
                result = self.provider.find_transaction(reference) => result,
            };

            match attempt {
                Ok(txn) => {
                    tracing::info!(status = %txn.status, "transaction confirmed");
                    return Ok(PollResult::Confirmed(txn));
                }
                Err(e) if e.is_not_found() => {
                    tracing::debug!(wait_ms = self.poll_interval.as_millis() as u64, "transaction not ready");
                }
                Err(e) => {
                    tracing::error!(error = %e, "transaction lookup failed");
                    return Err(e);
                }
            }

            tokio::select! {
                biased;
                _ = &mut expiry => return Ok(PollResult::Expired),
                _ = cancelled(shutdown) => return Ok(PollResult::Expired),
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }

    async fn emit_callback(&self, outcome: &Outcome) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        if let Err(e) = notifier.send(outcome).await {
            tracing::warn!(error = %e, "callback delivery failed");
        }
    }
}

/// Resolves once the shutdown flag is set. A dropped sender never cancels.
async fn cancelled(shutdown: &mut watch::Receiver<bool>) {
    let closed = shutdown.wait_for(|stop| *stop).await.is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}
