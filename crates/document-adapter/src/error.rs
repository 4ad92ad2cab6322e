use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical adapter error kinds surfaced to the perceiver and scheduler.
#[derive(Clone, Copy, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum AdapterErrorKind {
    #[error("node not found")]
    NodeNotFound,
    #[error("invalid mutation")]
    InvalidMutation,
    #[error("mutation subscription unavailable")]
    SubscriptionUnavailable,
    #[error("invalid document fixture")]
    Fixture,
    #[error("internal error")]
    Internal,
}

/// Enriched error metadata passed back to higher layers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdapterError {
    pub kind: AdapterErrorKind,
    pub hint: Option<String>,
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(hint) = &self.hint {
            write!(f, ": {}", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for AdapterError {}

impl AdapterError {
    pub fn new(kind: AdapterErrorKind) -> Self {
        Self { kind, hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn node_not_found(node: impl fmt::Display) -> Self {
        Self::new(AdapterErrorKind::NodeNotFound).with_hint(node.to_string())
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(AdapterErrorKind::Fixture).with_hint(err.to_string())
    }
}
