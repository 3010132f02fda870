use {
    super::error::PipelineError,
    serde::{Deserialize, Serialize},
    serde_json::Number,
};

/// Inbound cash-in request. Unknown fields are ignored; the value is echoed
/// back untouched inside the outcome, so `amount` keeps its JSON form
/// (`1000` stays `1000`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DebitRequest {
    #[serde(default)]
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl DebitRequest {
    pub fn new(number: impl Into<String>, amount: impl Into<Number>) -> Self {
        Self {
            number: number.into(),
            amount: Some(amount.into()),
            client: None,
            metadata: None,
        }
    }

    /// Returns the amount once the request is known to be acceptable.
    pub fn validate(&self) -> Result<&Number, PipelineError> {
        validate_debit(&self.number, self.amount.as_ref())
    }
}

/// Shared by the orchestrator and the provider client so both reject the
/// same inputs before touching the network.
pub fn validate_debit<'a>(
    number: &str,
    amount: Option<&'a Number>,
) -> Result<&'a Number, PipelineError> {
    if number.trim().is_empty() {
        return Err(PipelineError::Validation("number is required".into()));
    }
    match amount {
        Some(n) if n.as_f64().is_some_and(|v| v.is_finite() && v > 0.0) => Ok(n),
        _ => Err(PipelineError::Validation("amount must be positive".into())),
    }
}
