use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use formfill_logging::{formfill_debug, formfill_error};

use crate::scheduler::TimerScheduler;
use crate::transport::{FormTransport, ReqwestTransport, TransportSettings};
use crate::{EngineEvent, RequestId, ResumeUploadRequest, TimerSlot};

enum EngineCommand {
    Search {
        request_id: RequestId,
        text: String,
        captcha_response: String,
    },
    Upload {
        request_id: RequestId,
        upload: ResumeUploadRequest,
    },
    AbortUpload {
        request_id: RequestId,
    },
    Schedule {
        slot: TimerSlot,
        tag: u64,
        delay: Duration,
    },
}

struct UploadTask {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Owns a background runtime that performs requests and timers and
/// reports their outcomes as [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: TransportSettings) -> Self {
        Self::with_transport(Arc::new(ReqwestTransport::new(settings)))
    }

    pub fn with_transport(transport: Arc<dyn FormTransport>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    formfill_error!("failed to start engine runtime: {}", err);
                    return;
                }
            };
            let mut scheduler = TimerScheduler::new(runtime.handle().clone(), event_tx.clone());
            let mut uploads: HashMap<RequestId, UploadTask> = HashMap::new();

            while let Ok(command) = cmd_rx.recv() {
                uploads.retain(|_, upload| !upload.task.is_finished());
                match command {
                    EngineCommand::Search {
                        request_id,
                        text,
                        captcha_response,
                    } => {
                        let transport = transport.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let result = transport.search_locations(&text, &captcha_response).await;
                            let _ = event_tx.send(EngineEvent::SearchFinished { request_id, result });
                        });
                    }
                    EngineCommand::Upload { request_id, upload } => {
                        let transport = transport.clone();
                        let event_tx = event_tx.clone();
                        let cancel = CancellationToken::new();
                        let cancelled = cancel.clone();
                        let task = runtime.spawn(async move {
                            tokio::select! {
                                _ = cancelled.cancelled() => {
                                    formfill_debug!("upload {} aborted", request_id);
                                }
                                result = transport.parse_resume(&upload) => {
                                    let _ = event_tx.send(EngineEvent::UploadFinished { request_id, result });
                                }
                            }
                        });
                        uploads.insert(request_id, UploadTask { cancel, task });
                    }
                    EngineCommand::AbortUpload { request_id } => {
                        if let Some(upload) = uploads.remove(&request_id) {
                            upload.cancel.cancel();
                        }
                    }
                    EngineCommand::Schedule { slot, tag, delay } => {
                        scheduler.schedule(slot, tag, delay);
                    }
                }
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn search(&self, request_id: RequestId, text: impl Into<String>, captcha_response: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Search {
            request_id,
            text: text.into(),
            captcha_response: captcha_response.into(),
        });
    }

    pub fn upload(&self, request_id: RequestId, upload: ResumeUploadRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Upload { request_id, upload });
    }

    /// Cancels an in-flight upload; it will not report completion.
    pub fn abort_upload(&self, request_id: RequestId) {
        let _ = self.cmd_tx.send(EngineCommand::AbortUpload { request_id });
    }

    pub fn schedule(&self, slot: TimerSlot, tag: u64, delay: Duration) {
        let _ = self.cmd_tx.send(EngineCommand::Schedule { slot, tag, delay });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}
