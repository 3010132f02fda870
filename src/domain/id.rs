use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::error::PipelineError;

/// Provider-assigned transaction reference.
///
/// Deserialization is lenient (a missing `ref` decodes to an empty value) so
/// adapters can tell "no reference" apart from "undecodable body".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionRef(String);

impl TransactionRef {
    pub fn new(id: impl Into<String>) -> Result<Self, PipelineError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(PipelineError::Validation("ref is required".into()));
        }
        Ok(Self(id))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
