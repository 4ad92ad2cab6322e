use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Shared error type for the observer crates.
#[derive(Debug, Error, Clone)]
pub enum SweepError {
    #[error("{message}")]
    Message { message: String },
}

impl SweepError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

/// Identity of an element inside an in-process document arena.
///
/// Ids are handed out monotonically and never reused, so two equal ids always
/// refer to the same element, even after the element has been detached.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// One Debouncing -> Polling run of the mutation scheduler.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct EpisodeId(pub String);

impl EpisodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for EpisodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// User-facing toggles threaded into every detection cycle.
///
/// The struct is replaced wholesale between cycles; nothing mutates it while a
/// cycle is running.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ObserverConfig {
    /// Draw the diagnostics overlay over every merged tree.
    pub diagnostics_enabled: bool,
    /// Keep detecting, but never suppress anything.
    pub globally_disabled: bool,
}

impl ObserverConfig {
    pub fn with_diagnostics(self, diagnostics_enabled: bool) -> Self {
        Self {
            diagnostics_enabled,
            ..self
        }
    }

    pub fn with_disabled(self, globally_disabled: bool) -> Self {
        Self {
            globally_disabled,
            ..self
        }
    }
}

impl fmt::Display for ObserverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "diagnostics={} disabled={}",
            self.diagnostics_enabled, self.globally_disabled
        )
    }
}
