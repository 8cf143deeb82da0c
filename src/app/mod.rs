mod state;
mod ui;

use eframe::{egui, App};
pub use state::UploadState;
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{info, warn};
use upload_manager::utils::curl_parser::CurlParser;
use upload_manager::utils::folder::collect_folder;
use upload_manager::{AcceptSpec, FileId, SelectedFile, UploadConfig, UploadManager};

/// Desktop front-end over an [`UploadManager`].
pub struct UploaderApp {
    curl_text: String,
    accept_text: String,
    auto_upload: bool,
    endpoint_url: Option<String>,
    runtime: Runtime,
    manager: UploadManager,
    state: UploadState,
    curl_parser: CurlParser,
}

impl UploaderApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, runtime: Runtime) -> Self {
        info!("initializing file uploader");
        let manager = UploadManager::new(UploadConfig::default());
        let state = UploadState {
            snapshot_receiver: Some(manager.subscribe()),
            ..Default::default()
        };
        Self {
            curl_text: String::new(),
            accept_text: "*".to_string(),
            auto_upload: false,
            endpoint_url: None,
            runtime,
            manager,
            state,
            curl_parser: CurlParser::new(),
        }
    }

    /// Rebuilds the manager from the pasted curl command and the form settings.
    /// Files already in the list are admitted again under the new rules.
    pub fn apply_settings(&mut self) {
        let mut config = UploadConfig::default()
            .with_accept(AcceptSpec::parse(&self.accept_text))
            .with_auto_upload(self.auto_upload);

        if self.curl_text.trim().is_empty() {
            self.endpoint_url = None;
        } else {
            match self.curl_parser.parse(&self.curl_text) {
                Ok(endpoint) => {
                    info!(url = %endpoint.url, headers = endpoint.headers.len(), "endpoint configured");
                    self.endpoint_url = Some(endpoint.url.clone());
                    config = config.with_endpoint(endpoint);
                }
                Err(e) => {
                    warn!(error = %e, "could not parse curl command");
                    self.state.error_message = Some(format!("Error parsing curl command: {}", e));
                    return;
                }
            }
        }

        let files: Vec<SelectedFile> = self
            .manager
            .snapshot()
            .records
            .into_iter()
            .map(|r| r.file)
            .collect();
        self.manager.clear_all();

        self.manager = UploadManager::new(config);
        self.state.clear();
        self.state.snapshot_receiver = Some(self.manager.subscribe());
        self.add_files(files);
    }

    pub fn pick_files(&mut self) {
        let Some(paths) = rfd::FileDialog::new().pick_files() else {
            return;
        };
        self.add_paths(paths);
    }

    pub fn pick_folder(&mut self) {
        let Some(folder) = rfd::FileDialog::new().pick_folder() else {
            return;
        };
        info!(folder = %folder.display(), "adding folder");
        self.add_paths(collect_folder(&folder));
    }

    fn add_paths(&mut self, paths: Vec<PathBuf>) {
        let mut files = Vec::new();
        for path in paths {
            match SelectedFile::from_path(&path) {
                Ok(file) => files.push(file),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to read file");
                    self.state.error_message =
                        Some(format!("Failed to read {}: {}", path.display(), e));
                }
            }
        }
        self.add_files(files);
    }

    fn add_files(&mut self, files: Vec<SelectedFile>) {
        if files.is_empty() {
            return;
        }
        // Auto upload schedules transfers on the runtime of the calling context.
        let _guard = self.runtime.enter();
        self.manager.add_files(files);
    }

    pub fn upload_all(&self) {
        let manager = self.manager.clone();
        self.runtime.spawn(async move { manager.upload_all().await });
    }

    pub fn retry(&self, id: FileId) {
        let manager = self.manager.clone();
        self.runtime.spawn(async move { manager.retry_upload(id).await });
    }

    pub fn upload_one(&self, id: FileId) {
        let manager = self.manager.clone();
        self.runtime.spawn(async move { manager.upload_file(id).await });
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        if self.state.refresh() {
            ctx.request_repaint();
        }
        if self.state.snapshot.is_transferring {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

impl App for UploaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}
