use std::fmt;
use std::path::PathBuf;

pub type RequestId = u64;

/// Timers sharing a slot replace each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerSlot {
    pub name: &'static str,
    pub instance: u64,
}

impl TimerSlot {
    pub const fn new(name: &'static str, instance: u64) -> Self {
        Self { name, instance }
    }
}

/// Raw endpoint reply. Status interpretation is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeUploadRequest {
    pub file_name: String,
    pub path: PathBuf,
    pub account_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    SearchFinished {
        request_id: RequestId,
        result: Result<HttpReply, TransportError>,
    },
    UploadFinished {
        request_id: RequestId,
        result: Result<HttpReply, TransportError>,
    },
    TimerFired {
        slot: TimerSlot,
        tag: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Io,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Io => write!(f, "io error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
