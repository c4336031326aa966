use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComputerError {
    /// Launch, connect or initial navigation failed. The session never became usable.
    #[error("session start failed: {0}")]
    SessionStart(String),
    /// A single action failed against the live page. The session stays usable.
    #[error("{action} failed: {reason}")]
    Backend { action: &'static str, reason: String },
    #[error("invalid computer call: {0}")]
    InvalidCall(String),
}

impl ComputerError {
    pub(crate) fn start<E: Display>(stage: &'static str) -> impl FnOnce(E) -> Self {
        move |e| Self::SessionStart(format!("{stage}: {e}"))
    }

    pub(crate) fn backend<E: Display>(action: &'static str) -> impl FnOnce(E) -> Self {
        move |e| Self::Backend { action, reason: e.to_string() }
    }
}
