use {
    super::error::PipelineError,
    super::outcome::Outcome,
    std::{future::Future, pin::Pin},
};

/// Downstream destination for finished outcomes. One attempt per outcome.
pub trait OutcomeNotifier: Send + Sync {
    fn send<'a>(
        &'a self,
        outcome: &'a Outcome,
    ) -> Pin<Box<dyn Future<Output = Result<(), PipelineError>> + Send + 'a>>;
}
