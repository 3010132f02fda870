use {
    super::id::TransactionRef,
    super::request::DebitRequest,
    super::transaction::Transaction,
    serde::Serialize,
};

/// Fixed text tied to the provider's confirmation SLA. It does not follow the
/// configured polling timeout.
pub const NOT_CONFIRMED_MESSAGE: &str = "transaction not confirmed within 5 minutes";

pub const FAILED_STATUS: &str = "failed";

/// Terminal record of one cash-in invocation.
///
/// `found` is true exactly when `transaction` is set and `message` is not;
/// the constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    #[serde(rename = "ref")]
    reference: TransactionRef,
    status: String,
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    transaction: Option<Transaction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    request: DebitRequest,
}

impl Outcome {
    pub fn confirmed(reference: TransactionRef, transaction: Transaction, request: DebitRequest) -> Self {
        Self {
            reference,
            status: transaction.status.clone(),
            found: true,
            transaction: Some(transaction),
            message: None,
            request,
        }
    }

    pub fn not_confirmed(reference: TransactionRef, request: DebitRequest) -> Self {
        Self {
            reference,
            status: FAILED_STATUS.to_string(),
            found: false,
            transaction: None,
            message: Some(NOT_CONFIRMED_MESSAGE.to_string()),
            request,
        }
    }

    pub fn reference(&self) -> &TransactionRef {
        &self.reference
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn found(&self) -> bool {
        self.found
    }

    pub fn transaction(&self) -> Option<&Transaction> {
        self.transaction.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn request(&self) -> &DebitRequest {
        &self.request
    }
}
