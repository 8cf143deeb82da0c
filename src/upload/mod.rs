mod config;
mod error;
mod manager;
mod store;
mod transfer;
mod transport;
mod types;
mod validator;

pub use config::{
    Callbacks, Endpoint, UploadConfig, DEFAULT_MAX_FILES, DEFAULT_MAX_SIZE,
};
pub use error::UploadError;
pub use manager::UploadManager;
pub use store::RecordStore;
pub use transfer::{percent, run_transfer, TransferOutcome};
pub use transport::{
    HttpTransport, ProgressFn, TransferRequest, Transport, TransportResponse, FILE_FIELD,
};
pub use types::{FileId, SelectedFile, UploadRecord, UploadResponse, UploadSnapshot, UploadStatus};
pub use validator::{validate, AcceptSpec, CustomRule, RuleOutcome, ValidationRules};
