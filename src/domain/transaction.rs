use {
    super::id::TransactionRef,
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

/// Payload of `POST /api/auth/agents/authorize`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub access: String,
    #[serde(default)]
    pub refresh: String,
    /// Lifetime of `access` in seconds.
    #[serde(default)]
    pub expires: i64,
}

/// Provider-reported state of a single payment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "ref", default)]
    pub reference: TransactionRef,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    /// Kept in its wire form; providers send integers, decimals or `null`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<serde_json::Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn new(reference: TransactionRef, status: impl Into<String>) -> Self {
        Self {
            reference,
            status: status.into(),
            ..Default::default()
        }
    }
}

/// Error body returned by find-transaction for unknown references.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionNotFound {
    #[serde(default)]
    pub message: String,
}
