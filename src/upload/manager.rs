//! Public entry point: admits files, drives transfers and publishes state.
//!
//! Every write locks the shared state, reads the record as it is at that
//! moment and applies the change there, so progress and completion events from
//! concurrent transfers can interleave freely without losing updates.
//! Callbacks always run after the lock is released.

use futures::future::join_all;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::UploadConfig;
use super::store::RecordStore;
use super::transfer::{percent, run_transfer, TransferOutcome};
use super::transport::{HttpTransport, ProgressFn, TransferRequest, Transport};
use super::types::{FileId, SelectedFile, UploadRecord, UploadSnapshot, UploadStatus};
use super::validator::{validate, ValidationRules};

/// Coordinates validation, the record store and transfers.
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct UploadManager {
    shared: Arc<Shared>,
}

struct Shared {
    config: UploadConfig,
    transport: Arc<dyn Transport>,
    state: Mutex<ManagerState>,
    snapshot_tx: watch::Sender<UploadSnapshot>,
}

#[derive(Default)]
struct ManagerState {
    store: RecordStore,
    /// Holds an entry exactly while the matching record is `Uploading`.
    in_flight: HashMap<FileId, CancellationToken>,
}

impl ManagerState {
    fn snapshot(&self) -> UploadSnapshot {
        UploadSnapshot {
            records: self.store.records().to_vec(),
            is_transferring: self.store.is_transferring(),
            overall_progress: self.store.overall_progress(),
        }
    }
}

impl UploadManager {
    pub fn new(config: UploadConfig) -> Self {
        Self::with_transport(config, Arc::new(HttpTransport::default()))
    }

    pub fn with_transport(config: UploadConfig, transport: Arc<dyn Transport>) -> Self {
        let (snapshot_tx, _) = watch::channel(UploadSnapshot::default());
        Self {
            shared: Arc::new(Shared {
                config,
                transport,
                state: Mutex::new(ManagerState::default()),
                snapshot_tx,
            }),
        }
    }

    pub fn config(&self) -> &UploadConfig {
        &self.shared.config
    }

    pub fn snapshot(&self) -> UploadSnapshot {
        self.lock().snapshot()
    }

    /// Receives a fresh snapshot after every change to the store.
    pub fn subscribe(&self) -> watch::Receiver<UploadSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    pub fn record(&self, id: FileId) -> Option<UploadRecord> {
        self.lock().store.get(id).cloned()
    }

    /// Validates and stores `files`, up to the configured capacity.
    ///
    /// Rejected files become `Error` records. Candidates past `max_files` are
    /// dropped. Returns the ids of every record created. With auto upload on,
    /// the accepted files are handed to the runtime to start on a later tick.
    pub fn add_files(&self, files: impl IntoIterator<Item = SelectedFile>) -> Vec<FileId> {
        let config = &self.shared.config;
        let rules = ValidationRules {
            max_size: config.max_size,
            accept: config.accept.clone(),
            custom: config.validate.clone(),
        };

        let room = config.max_files.saturating_sub(self.lock().store.len());
        let mut batch: Vec<UploadRecord> = Vec::new();
        let mut dropped = 0usize;
        for file in files {
            if batch.len() >= room {
                dropped += 1;
                continue;
            }
            let record = match validate(&file, &rules) {
                Ok(()) => UploadRecord::pending(file),
                Err(e) => UploadRecord::rejected(file, e.to_string()),
            };
            batch.push(record);
        }

        {
            let mut state = self.lock();
            // Another caller may have filled the store while we were validating.
            let room = config.max_files.saturating_sub(state.store.len());
            if batch.len() > room {
                dropped += batch.len() - room;
                batch.truncate(room);
            }
            state.store.extend(batch.iter().cloned());
            self.publish(&state);
        }

        if dropped > 0 {
            debug!(dropped, max_files = config.max_files, "file limit reached");
        }

        let callbacks = &config.callbacks;
        let mut accepted = Vec::new();
        for record in &batch {
            match record.status {
                UploadStatus::Pending => accepted.push(record.clone()),
                _ => {
                    let reason = record.error.as_deref().unwrap_or_default();
                    info!(file = %record.file.name, reason, "file rejected");
                    if let Some(cb) = &callbacks.on_validation_error {
                        cb(&record.file, reason);
                    }
                }
            }
        }

        if !accepted.is_empty() {
            if let Some(cb) = &callbacks.on_files_select {
                cb(&accepted);
            }
            if config.auto_upload && config.endpoint.is_some() {
                self.schedule(accepted.iter().map(|r| r.id));
            }
        }

        batch.iter().map(|r| r.id).collect()
    }

    /// Aborts the file's transfer if one is running, then drops its record.
    pub fn remove_file(&self, id: FileId) {
        let mut state = self.lock();
        if let Some(token) = state.in_flight.remove(&id) {
            token.cancel();
        }
        if state.store.remove(id).is_none() {
            warn!(%id, "remove_file: unknown id");
            return;
        }
        self.publish(&state);
    }

    /// Aborts the file's transfer. The record goes back to `Pending`.
    pub fn cancel_upload(&self, id: FileId) {
        match self.lock().in_flight.get(&id) {
            Some(token) => token.cancel(),
            None => debug!(%id, "cancel_upload: not in flight"),
        }
    }

    /// Aborts every transfer, then empties the store.
    pub fn clear_all(&self) {
        let mut state = self.lock();
        for (_, token) in state.in_flight.drain() {
            token.cancel();
        }
        state.store.clear();
        self.publish(&state);
    }

    /// Transfers one `Pending` file. Any other state makes this a no-op, so
    /// concurrent callers start at most one transfer per file.
    pub async fn upload_file(&self, id: FileId) {
        let Some(endpoint) = self.shared.config.endpoint.clone() else {
            warn!(%id, "upload_file: no upload endpoint configured");
            return;
        };
        let Some((record, cancel)) = self.begin_transfer(id) else {
            return;
        };

        if let Some(cb) = &self.shared.config.callbacks.on_upload_start {
            cb(&record);
        }
        debug!(%id, file = %record.file.name, url = %endpoint.url, "upload started");

        let request = TransferRequest {
            url: endpoint.url,
            headers: endpoint.headers,
            file: record.file,
        };
        let on_progress: ProgressFn = {
            let this = self.clone();
            let cancel = cancel.clone();
            Arc::new(move |sent, total| {
                if !cancel.is_cancelled() {
                    this.apply_progress(id, percent(sent, total));
                }
            })
        };

        let outcome =
            run_transfer(self.shared.transport.as_ref(), request, &cancel, on_progress).await;
        self.settle(id, outcome);
    }

    /// Transfers every `Pending` file at once and waits for all of them.
    pub async fn upload_all(&self) {
        if self.shared.config.endpoint.is_none() {
            warn!("upload_all: no upload endpoint configured");
            return;
        }
        let ids = self.lock().store.ids_with_status(UploadStatus::Pending);
        debug!(count = ids.len(), "uploading all pending files");
        join_all(ids.into_iter().map(|id| self.upload_file(id))).await;
    }

    /// Resets a finished or failed file to `Pending` and transfers it again.
    pub async fn retry_upload(&self, id: FileId) {
        {
            let mut state = self.lock();
            let reset = match state.store.get(id).map(|r| r.status) {
                None => {
                    warn!(%id, "retry_upload: unknown id");
                    return;
                }
                Some(UploadStatus::Uploading) => {
                    debug!(%id, "retry_upload: already in flight");
                    return;
                }
                Some(_) => state.store.update(id, |r| {
                    r.status = UploadStatus::Pending;
                    r.progress = 0;
                    r.error = None;
                    r.response = None;
                }),
            };
            if reset {
                self.publish(&state);
            }
        }
        self.upload_file(id).await;
    }

    fn lock(&self) -> MutexGuard<'_, ManagerState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &ManagerState) {
        self.shared.snapshot_tx.send_replace(state.snapshot());
    }

    fn schedule(&self, ids: impl Iterator<Item = FileId>) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("auto upload skipped: no tokio runtime");
                return;
            }
        };
        for id in ids {
            let this = self.clone();
            handle.spawn(async move { this.upload_file(id).await });
        }
    }

    /// Flips `id` to `Uploading` and registers its cancellation handle, in one step.
    fn begin_transfer(&self, id: FileId) -> Option<(UploadRecord, CancellationToken)> {
        let mut state = self.lock();
        match state.store.get(id).map(|r| r.status) {
            None => {
                warn!(%id, "upload_file: unknown id");
                return None;
            }
            Some(UploadStatus::Pending) => {}
            Some(status) => {
                debug!(%id, ?status, "upload_file: not pending, skipping");
                return None;
            }
        }

        let cancel = CancellationToken::new();
        state.store.update(id, |r| {
            r.status = UploadStatus::Uploading;
            r.error = None;
            r.response = None;
        });
        state.in_flight.insert(id, cancel.clone());
        let record = state.store.get(id).cloned()?;
        self.publish(&state);
        Some((record, cancel))
    }

    /// Progress only moves forward; observers are told the stored value.
    fn apply_progress(&self, id: FileId, progress: u8) {
        let stored = {
            let mut state = self.lock();
            if !state.in_flight.contains_key(&id) {
                return;
            }
            let mut stored = None;
            state.store.update(id, |r| {
                if r.status == UploadStatus::Uploading {
                    r.progress = r.progress.max(progress);
                    stored = Some(r.progress);
                }
            });
            if stored.is_some() {
                self.publish(&state);
            }
            stored
        };

        if let Some(progress) = stored {
            if let Some(cb) = &self.shared.config.callbacks.on_upload_progress {
                cb(id, progress);
            }
        }
    }

    fn settle(&self, id: FileId, outcome: TransferOutcome) {
        {
            let mut state = self.lock();
            if state.in_flight.remove(&id).is_none() {
                // Removed or cleared while in flight; nothing left to update.
                debug!(%id, "transfer settled after removal");
                return;
            }
            state.store.update(id, |r| match &outcome {
                TransferOutcome::Completed(response) => {
                    r.status = UploadStatus::Completed;
                    r.progress = 100;
                    r.response = Some(response.clone());
                    r.error = None;
                }
                TransferOutcome::Failed(e) => {
                    r.status = UploadStatus::Error;
                    r.error = Some(e.to_string());
                    r.response = None;
                }
                TransferOutcome::Aborted => {
                    r.status = UploadStatus::Pending;
                    r.progress = 0;
                    r.error = None;
                }
            });
            self.publish(&state);
        }

        let callbacks = &self.shared.config.callbacks;
        match &outcome {
            TransferOutcome::Completed(response) => {
                info!(%id, "upload completed");
                if let Some(cb) = &callbacks.on_upload_complete {
                    cb(id, response);
                }
            }
            TransferOutcome::Failed(e) => {
                warn!(%id, error = %e, "upload failed");
                if let Some(cb) = &callbacks.on_upload_error {
                    cb(id, e);
                }
            }
            TransferOutcome::Aborted => info!(%id, "upload cancelled"),
        }
    }
}
