//! Runs a single file transfer against a [`Transport`], racing it with cancellation.

use tokio_util::sync::CancellationToken;

use super::error::UploadError;
use super::transport::{ProgressFn, TransferRequest, Transport};
use super::types::UploadResponse;

/// How a transfer settled.
#[derive(Debug)]
pub enum TransferOutcome {
    Completed(UploadResponse),
    Failed(UploadError),
    Aborted,
}

pub async fn run_transfer(
    transport: &dyn Transport,
    request: TransferRequest,
    cancel: &CancellationToken,
    on_progress: ProgressFn,
) -> TransferOutcome {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => TransferOutcome::Aborted,
        result = transport.send(request, on_progress) => match result {
            Ok(response) if (200..300).contains(&response.status) => {
                TransferOutcome::Completed(UploadResponse::from_body(response.body))
            }
            Ok(response) => TransferOutcome::Failed(UploadError::Http {
                status: response.status,
                body: response.body,
            }),
            Err(e) => TransferOutcome::Failed(e),
        },
    }
}

/// `bytes_sent / total_bytes` as a rounded percentage.
pub fn percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    ((sent as f64 / total as f64) * 100.0).round().min(100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::transport::TransportResponse;
    use crate::upload::types::SelectedFile;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Arc;

    struct Fixed(Result<TransportResponse, String>);

    impl Transport for Fixed {
        fn send(
            &self,
            _request: TransferRequest,
            on_progress: ProgressFn,
        ) -> Pin<Box<dyn Future<Output = Result<TransportResponse, UploadError>> + Send + '_>>
        {
            Box::pin(async move {
                on_progress(5, 10);
                self.0.clone().map_err(UploadError::Transport)
            })
        }
    }

    struct Hang;

    impl Transport for Hang {
        fn send(
            &self,
            _request: TransferRequest,
            _on_progress: ProgressFn,
        ) -> Pin<Box<dyn Future<Output = Result<TransportResponse, UploadError>> + Send + '_>>
        {
            Box::pin(std::future::pending::<Result<TransportResponse, UploadError>>())
        }
    }

    fn request() -> TransferRequest {
        TransferRequest {
            url: "http://upload.test".into(),
            headers: Default::default(),
            file: SelectedFile::new("a.txt", "text/plain", b"0123456789".to_vec()),
        }
    }

    fn ok(status: u16, body: &str) -> Fixed {
        Fixed(Ok(TransportResponse {
            status,
            body: body.into(),
        }))
    }

    #[test]
    fn percent_rounds() {
        assert_eq!(percent(0, 10), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(10, 10), 100);
        assert_eq!(percent(5, 0), 0);
    }

    #[tokio::test]
    async fn success_parses_json() {
        let outcome = run_transfer(
            &ok(201, r#"{"ok":true}"#),
            request(),
            &CancellationToken::new(),
            Arc::new(|_, _| {}),
        )
        .await;
        match outcome {
            TransferOutcome::Completed(UploadResponse::Json(v)) => assert_eq!(v["ok"], true),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_2xx_is_failure() {
        let outcome = run_transfer(
            &ok(413, "too large"),
            request(),
            &CancellationToken::new(),
            Arc::new(|_, _| {}),
        )
        .await;
        match outcome {
            TransferOutcome::Failed(UploadError::Http { status, body }) => {
                assert_eq!(status, 413);
                assert_eq!(body, "too large");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_error_is_failure() {
        let outcome = run_transfer(
            &Fixed(Err("connection refused".into())),
            request(),
            &CancellationToken::new(),
            Arc::new(|_, _| {}),
        )
        .await;
        assert!(matches!(outcome, TransferOutcome::Failed(UploadError::Transport(_))));
    }

    #[tokio::test]
    async fn progress_is_forwarded() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        run_transfer(
            &ok(200, ""),
            request(),
            &CancellationToken::new(),
            Arc::new(move |sent, total| s.lock().unwrap().push(percent(sent, total))),
        )
        .await;
        assert_eq!(*seen.lock().unwrap(), vec![50]);
    }

    #[tokio::test]
    async fn cancellation_aborts_in_flight_transfer() {
        let cancel = CancellationToken::new();
        let c = cancel.clone();
        let handle = tokio::spawn(async move {
            run_transfer(&Hang, request(), &c, Arc::new(|_, _| {})).await
        });
        tokio::task::yield_now().await;
        cancel.cancel();
        assert!(matches!(handle.await.unwrap(), TransferOutcome::Aborted));
    }
}
