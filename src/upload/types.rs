use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::io;
use std::path::Path;
use uuid::Uuid;

use super::error::UploadError;
use crate::utils::content_type::detect_content_type;

/// Opaque identifier assigned to a file when it is admitted. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FileId(Uuid);

impl FileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A local file selected for upload: its bytes plus the metadata the validator looks at.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub data: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: data.len() as u64,
            mime_type: mime_type.into(),
            data: Bytes::from(data),
        }
    }

    /// Reads a file from disk. The MIME type is derived from the extension.
    pub fn from_path(path: &Path) -> Result<Self, UploadError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Invalid filename"))?
            .to_string();
        let data = std::fs::read(path)?;
        let mime_type = detect_content_type(&name);
        Ok(Self::new(name, mime_type, data))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UploadStatus {
    Pending,
    Uploading,
    Completed,
    Error,
}

/// Body returned by the endpoint: parsed JSON when possible, raw text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UploadResponse {
    Json(Value),
    Text(String),
}

impl UploadResponse {
    pub fn from_body(body: String) -> Self {
        match serde_json::from_str(&body) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(body),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub id: FileId,
    pub file: SelectedFile,
    pub progress: u8,
    pub status: UploadStatus,
    /// Set only while `status` is `Error`.
    pub error: Option<String>,
    /// Set only while `status` is `Completed`.
    pub response: Option<UploadResponse>,
}

impl UploadRecord {
    pub fn pending(file: SelectedFile) -> Self {
        Self {
            id: FileId::new(),
            file,
            progress: 0,
            status: UploadStatus::Pending,
            error: None,
            response: None,
        }
    }

    pub fn rejected(file: SelectedFile, reason: String) -> Self {
        Self {
            status: UploadStatus::Error,
            error: Some(reason),
            ..Self::pending(file)
        }
    }

    pub fn summary(&self) -> RecordSummary<'_> {
        RecordSummary {
            id: self.id,
            name: &self.file.name,
            size: self.file.size,
            mime_type: &self.file.mime_type,
            status: self.status,
            progress: self.progress,
            error: self.error.as_deref(),
            response: self.response.as_ref(),
        }
    }
}

/// A record without its bytes, for reports and logs.
#[derive(Debug, Serialize)]
pub struct RecordSummary<'a> {
    pub id: FileId,
    pub name: &'a str,
    pub size: u64,
    pub mime_type: &'a str,
    pub status: UploadStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<&'a UploadResponse>,
}

#[derive(Serialize)]
struct Report<'a> {
    overall_progress: u8,
    is_transferring: bool,
    files: Vec<RecordSummary<'a>>,
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, Default)]
pub struct UploadSnapshot {
    pub records: Vec<UploadRecord>,
    pub is_transferring: bool,
    pub overall_progress: u8,
}

impl UploadSnapshot {
    pub fn count(&self, status: UploadStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }

    pub fn get_status_text(&self) -> String {
        format!(
            "Files: {} | ⏳ Pending: {} | 📤 Uploading: {} | ✅ Done: {} | ❌ Failed: {}",
            self.records.len(),
            self.count(UploadStatus::Pending),
            self.count(UploadStatus::Uploading),
            self.count(UploadStatus::Completed),
            self.count(UploadStatus::Error)
        )
    }

    /// Pretty-printed JSON of every record's outcome, suitable for the clipboard.
    pub fn report_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&Report {
            overall_progress: self.overall_progress,
            is_transferring: self.is_transferring,
            files: self.records.iter().map(UploadRecord::summary).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parses_json_body() {
        let response = UploadResponse::from_body(r#"{"ok":true}"#.to_string());
        assert_eq!(response, UploadResponse::Json(serde_json::json!({"ok": true})));
    }

    #[test]
    fn response_falls_back_to_text() {
        let response = UploadResponse::from_body("stored".to_string());
        assert_eq!(response, UploadResponse::Text("stored".to_string()));
    }

    #[test]
    fn rejected_record_carries_reason() {
        let file = SelectedFile::new("a.txt", "text/plain", b"hi".to_vec());
        let record = UploadRecord::rejected(file, "nope".to_string());
        assert_eq!(record.status, UploadStatus::Error);
        assert_eq!(record.error.as_deref(), Some("nope"));
        assert_eq!(record.progress, 0);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(FileId::new(), FileId::new());
    }

    #[test]
    fn from_path_reads_bytes_and_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let file = SelectedFile::from_path(&path).unwrap();
        assert_eq!(file.name, "notes.txt");
        assert_eq!(file.size, 5);
        assert_eq!(file.mime_type, "text/plain");
        assert_eq!(&file.data[..], b"hello");
    }

    #[test]
    fn from_path_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SelectedFile::from_path(&dir.path().join("gone.txt")).unwrap_err();
        assert!(matches!(err, UploadError::Io(_)));
    }

    #[test]
    fn report_lists_outcomes_without_bytes() {
        let mut done = UploadRecord::pending(SelectedFile::new(
            "a.json",
            "application/json",
            b"{}".to_vec(),
        ));
        done.status = UploadStatus::Completed;
        done.progress = 100;
        done.response = Some(UploadResponse::from_body(r#"{"id":7}"#.to_string()));
        let failed = UploadRecord::rejected(
            SelectedFile::new("b.exe", "application/octet-stream", vec![0; 3]),
            "File type not accepted".to_string(),
        );
        let snapshot = UploadSnapshot {
            records: vec![done.clone(), failed],
            is_transferring: false,
            overall_progress: 50,
        };

        let report: Value = serde_json::from_str(&snapshot.report_json().unwrap()).unwrap();
        assert_eq!(report["overall_progress"], 50);
        assert_eq!(report["files"][0]["id"], done.id.to_string());
        assert_eq!(report["files"][0]["status"], "Completed");
        assert_eq!(report["files"][0]["response"], serde_json::json!({"id": 7}));
        assert!(report["files"][0].get("error").is_none());
        assert_eq!(report["files"][1]["error"], "File type not accepted");
        assert_eq!(report["files"][1]["size"], 3);
        assert!(report["files"][1].get("data").is_none());
    }
}
