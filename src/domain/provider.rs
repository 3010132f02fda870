use {
    super::error::PipelineError,
    super::id::TransactionRef,
    super::transaction::Transaction,
    serde_json::Number,
    std::{future::Future, pin::Pin},
};

pub trait PaymentProvider: Send + Sync {
    /// Start a mobile-money debit. The returned transaction always carries a
    /// reference.
    fn cash_in<'a>(
        &'a self,
        number: &'a str,
        amount: &'a Number,
    ) -> Pin<Box<dyn Future<Output = Result<Transaction, PipelineError>> + Send + 'a>>;

    /// Look a transaction up. Misses come back as `PipelineError::NotFound`.
    fn find_transaction<'a>(
        &'a self,
        reference: &'a TransactionRef,
    ) -> Pin<Box<dyn Future<Output = Result<Transaction, PipelineError>> + Send + 'a>>;
}
