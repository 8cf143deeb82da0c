use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

use super::error::UploadError;
use super::types::SelectedFile;
use crate::utils::content_type::detect_content_type;

/// Multipart field the file is sent under.
pub const FILE_FIELD: &str = "file";

/// Size of the slices the request body is streamed in.
const CHUNK_SIZE: usize = 64 * 1024;

/// Receives `(bytes_sent, total_bytes)` as the body goes out.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub file: SelectedFile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Moves one file to the endpoint.
///
/// Implementations report body progress through `on_progress` and resolve with
/// whatever the server answered; deciding success is left to the caller.
/// Dropping the returned future must abort the request.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: TransferRequest,
        on_progress: ProgressFn,
    ) -> Pin<Box<dyn Future<Output = Result<TransportResponse, UploadError>> + Send + '_>>;
}

/// `POST`s the file as a multipart form with `reqwest`.
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: TransferRequest,
        on_progress: ProgressFn,
    ) -> Pin<Box<dyn Future<Output = Result<TransportResponse, UploadError>> + Send + '_>> {
        Box::pin(async move {
            let TransferRequest { url, headers, file } = request;

            let part = match file_part(&file, on_progress.clone()).mime_str(&file.mime_type) {
                Ok(part) => part,
                Err(_) => {
                    let fallback = detect_content_type(&file.name);
                    debug!(
                        file = %file.name,
                        mime_type = %file.mime_type,
                        fallback,
                        "unusable content type, guessing from name"
                    );
                    file_part(&file, on_progress).mime_str(fallback)?
                }
            };
            let form = Form::new().part(FILE_FIELD, part);

            let response = self
                .client
                .post(&url)
                .headers(headers)
                .multipart(form)
                .send()
                .await?;

            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, UploadError>(TransportResponse { status, body })
        })
    }
}

fn file_part(file: &SelectedFile, on_progress: ProgressFn) -> Part {
    Part::stream_with_length(progress_body(file, on_progress), file.size)
        .file_name(file.name.clone())
}

/// Streams the file in chunks, reporting the running byte count as each chunk is pulled.
fn progress_body(file: &SelectedFile, on_progress: ProgressFn) -> Body {
    let total = file.size;
    let data = file.data.clone();
    let chunks: Vec<Bytes> = (0..data.len())
        .step_by(CHUNK_SIZE)
        .map(|start| data.slice(start..data.len().min(start + CHUNK_SIZE)))
        .collect();
    let mut sent = 0u64;

    let stream = futures::stream::iter(chunks).map(move |chunk| {
        sent += chunk.len() as u64;
        on_progress(sent, total);
        Ok::<_, std::io::Error>(chunk)
    });
    Body::wrap_stream(stream)
}
