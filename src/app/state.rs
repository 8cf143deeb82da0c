use tokio::sync::watch;
use upload_manager::UploadSnapshot;

/// What the window shows, refreshed from the manager's snapshot channel.
#[derive(Default)]
pub struct UploadState {
    pub snapshot: UploadSnapshot,
    pub error_message: Option<String>,
    pub show_details: bool,
    pub snapshot_receiver: Option<watch::Receiver<UploadSnapshot>>,
}

impl UploadState {
    pub fn clear(&mut self) {
        self.snapshot = UploadSnapshot::default();
        self.error_message = None;
    }

    /// Pulls the latest snapshot if the manager published one. Returns whether it changed.
    pub fn refresh(&mut self) -> bool {
        let Some(receiver) = &mut self.snapshot_receiver else {
            return false;
        };
        match receiver.has_changed() {
            Ok(true) => {
                self.snapshot = receiver.borrow_and_update().clone();
                true
            }
            _ => false,
        }
    }

    pub fn get_progress_percentage(&self) -> f32 {
        f32::from(self.snapshot.overall_progress) / 100.0
    }

    pub fn get_status_text(&self) -> String {
        if self.snapshot.records.is_empty() {
            return String::new();
        }
        self.snapshot.get_status_text()
    }
}
