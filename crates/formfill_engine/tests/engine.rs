use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use formfill_engine::{
    EngineEvent, EngineHandle, FormTransport, HttpReply, ResumeUploadRequest, TimerSlot,
    TransportError,
};
use pretty_assertions::assert_eq;

const WAIT: Duration = Duration::from_secs(2);

/// Echoes the request back after a fixed delay.
struct EchoTransport {
    delay: Duration,
}

#[async_trait::async_trait]
impl FormTransport for EchoTransport {
    async fn search_locations(
        &self,
        text: &str,
        captcha_response: &str,
    ) -> Result<HttpReply, TransportError> {
        tokio::time::sleep(self.delay).await;
        Ok(HttpReply {
            status: 200,
            body: format!("{text}|{captcha_response}"),
        })
    }

    async fn parse_resume(&self, upload: &ResumeUploadRequest) -> Result<HttpReply, TransportError> {
        tokio::time::sleep(self.delay).await;
        Ok(HttpReply {
            status: 200,
            body: upload.file_name.clone(),
        })
    }
}

fn engine(delay: Duration) -> EngineHandle {
    EngineHandle::with_transport(Arc::new(EchoTransport { delay }))
}

fn upload(name: &str) -> ResumeUploadRequest {
    ResumeUploadRequest {
        file_name: name.to_string(),
        path: PathBuf::from(name),
        account_id: String::new(),
    }
}

#[test]
fn search_result_is_reported_with_its_request_id() {
    let engine = engine(Duration::from_millis(5));
    engine.search(7, "Lyon", "cap");

    let event = engine.recv_timeout(WAIT).expect("search event");
    assert_eq!(
        event,
        EngineEvent::SearchFinished {
            request_id: 7,
            result: Ok(HttpReply {
                status: 200,
                body: "Lyon|cap".to_string(),
            }),
        }
    );
}

#[test]
fn upload_completion_is_reported() {
    let engine = engine(Duration::from_millis(5));
    engine.upload(3, upload("cv.pdf"));

    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::UploadFinished { request_id, result }) => {
            assert_eq!(request_id, 3);
            assert_eq!(result.unwrap().body, "cv.pdf");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn aborted_upload_never_completes() {
    let engine = engine(Duration::from_millis(200));
    engine.upload(1, upload("first.pdf"));
    engine.abort_upload(1);
    engine.upload(2, upload("second.pdf"));

    let events: Vec<_> = std::iter::from_fn(|| engine.recv_timeout(Duration::from_millis(600))).collect();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        EngineEvent::UploadFinished { request_id: 2, .. }
    ));
}

#[test]
fn rescheduled_timer_fires_once_with_latest_tag() {
    let engine = engine(Duration::ZERO);
    let slot = TimerSlot::new("location-search", 0);
    engine.schedule(slot, 1, Duration::from_millis(50));
    engine.schedule(slot, 2, Duration::from_millis(50));

    assert_eq!(
        engine.recv_timeout(WAIT),
        Some(EngineEvent::TimerFired { slot, tag: 2 })
    );
    assert_eq!(engine.recv_timeout(Duration::from_millis(150)), None);
    assert_eq!(engine.try_recv(), None);
}
