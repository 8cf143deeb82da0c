use derivative::Derivative;
use reqwest::header::HeaderMap;
use std::sync::Arc;

use super::error::UploadError;
use super::types::{FileId, SelectedFile, UploadRecord, UploadResponse};
use super::validator::{AcceptSpec, CustomRule, RuleOutcome};

pub const DEFAULT_MAX_FILES: usize = 10;
pub const DEFAULT_MAX_SIZE: u64 = 10 * 1024 * 1024;

pub type FilesSelectCallback = Arc<dyn Fn(&[UploadRecord]) + Send + Sync>;
pub type UploadStartCallback = Arc<dyn Fn(&UploadRecord) + Send + Sync>;
pub type UploadProgressCallback = Arc<dyn Fn(FileId, u8) + Send + Sync>;
pub type UploadCompleteCallback = Arc<dyn Fn(FileId, &UploadResponse) + Send + Sync>;
pub type UploadErrorCallback = Arc<dyn Fn(FileId, &UploadError) + Send + Sync>;
pub type ValidationErrorCallback = Arc<dyn Fn(&SelectedFile, &str) + Send + Sync>;

/// Where transfers go.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub url: String,
    pub headers: HeaderMap,
}

impl Endpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HeaderMap::new(),
        }
    }
}

/// Hooks fired by the manager. All optional.
#[derive(Derivative, Clone, Default)]
#[derivative(Debug)]
pub struct Callbacks {
    #[derivative(Debug = "ignore")]
    pub on_files_select: Option<FilesSelectCallback>,
    #[derivative(Debug = "ignore")]
    pub on_upload_start: Option<UploadStartCallback>,
    #[derivative(Debug = "ignore")]
    pub on_upload_progress: Option<UploadProgressCallback>,
    #[derivative(Debug = "ignore")]
    pub on_upload_complete: Option<UploadCompleteCallback>,
    #[derivative(Debug = "ignore")]
    pub on_upload_error: Option<UploadErrorCallback>,
    #[derivative(Debug = "ignore")]
    pub on_validation_error: Option<ValidationErrorCallback>,
}

#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct UploadConfig {
    pub max_files: usize,
    pub max_size: u64,
    pub accept: AcceptSpec,
    pub auto_upload: bool,
    pub endpoint: Option<Endpoint>,
    #[derivative(Debug = "ignore")]
    pub validate: Option<CustomRule>,
    pub callbacks: Callbacks,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            max_size: DEFAULT_MAX_SIZE,
            accept: AcceptSpec::Any,
            auto_upload: false,
            endpoint: None,
            validate: None,
            callbacks: Callbacks::default(),
        }
    }
}

impl UploadConfig {
    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_accept(mut self, accept: AcceptSpec) -> Self {
        self.accept = accept;
        self
    }

    pub fn with_auto_upload(mut self, auto_upload: bool) -> Self {
        self.auto_upload = auto_upload;
        self
    }

    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn with_validate<F>(mut self, rule: F) -> Self
    where
        F: Fn(&SelectedFile) -> RuleOutcome + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(rule));
        self
    }

    pub fn on_files_select<F>(mut self, f: F) -> Self
    where
        F: Fn(&[UploadRecord]) + Send + Sync + 'static,
    {
        self.callbacks.on_files_select = Some(Arc::new(f));
        self
    }

    pub fn on_upload_start<F>(mut self, f: F) -> Self
    where
        F: Fn(&UploadRecord) + Send + Sync + 'static,
    {
        self.callbacks.on_upload_start = Some(Arc::new(f));
        self
    }

    pub fn on_upload_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(FileId, u8) + Send + Sync + 'static,
    {
        self.callbacks.on_upload_progress = Some(Arc::new(f));
        self
    }

    pub fn on_upload_complete<F>(mut self, f: F) -> Self
    where
        F: Fn(FileId, &UploadResponse) + Send + Sync + 'static,
    {
        self.callbacks.on_upload_complete = Some(Arc::new(f));
        self
    }

    pub fn on_upload_error<F>(mut self, f: F) -> Self
    where
        F: Fn(FileId, &UploadError) + Send + Sync + 'static,
    {
        self.callbacks.on_upload_error = Some(Arc::new(f));
        self
    }

    pub fn on_validation_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&SelectedFile, &str) + Send + Sync + 'static,
    {
        self.callbacks.on_validation_error = Some(Arc::new(f));
        self
    }
}
