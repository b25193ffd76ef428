//! Formfill engine: endpoint transport, timers and effect execution.
mod engine;
mod scheduler;
mod transport;
mod types;

pub use engine::EngineHandle;
pub use scheduler::TimerScheduler;
pub use transport::{
    search_path, FormTransport, ReqwestTransport, TransportSettings, PARSE_RESUME_PATH,
    SEARCH_PATH,
};
pub use types::{
    EngineEvent, FailureKind, HttpReply, RequestId, ResumeUploadRequest, TimerSlot, TransportError,
};
