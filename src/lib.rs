//! Batch file uploads with validation, per-file progress and cancellation.
//!
//! [`UploadManager`] is the entry point: it admits files through the
//! validator, keeps one record per file, transfers them to an HTTP endpoint
//! and publishes an [`UploadSnapshot`] after every change.

pub mod upload;
pub mod utils;

pub use upload::{
    AcceptSpec, Endpoint, FileId, RuleOutcome, SelectedFile, UploadConfig, UploadError,
    UploadManager, UploadRecord, UploadResponse, UploadSnapshot, UploadStatus,
};
