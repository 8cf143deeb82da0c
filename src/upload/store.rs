use super::types::{FileId, UploadRecord, UploadStatus};

/// Ordered collection of upload records. Insertion order is display order.
///
/// All writes go through [`RecordStore::update`], which hands the closure the
/// record as it is *now*, so interleaved transfers never overwrite each other.
#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    records: Vec<UploadRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[UploadRecord] {
        &self.records
    }

    pub fn get(&self, id: FileId) -> Option<&UploadRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn extend(&mut self, batch: impl IntoIterator<Item = UploadRecord>) {
        for record in batch {
            debug_assert!(self.get(record.id).is_none(), "duplicate id {}", record.id);
            self.records.push(record);
        }
    }

    /// Applies `f` to the record for `id`. Returns `false` if there is no such record.
    pub fn update<F>(&mut self, id: FileId, f: F) -> bool
    where
        F: FnOnce(&mut UploadRecord),
    {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                f(record);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: FileId) -> Option<UploadRecord> {
        let index = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(index))
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn ids_with_status(&self, status: UploadStatus) -> Vec<FileId> {
        self.records
            .iter()
            .filter(|r| r.status == status)
            .map(|r| r.id)
            .collect()
    }

    pub fn is_transferring(&self) -> bool {
        self.records
            .iter()
            .any(|r| r.status == UploadStatus::Uploading)
    }

    /// Mean of every record's progress, rounded; 0 when empty.
    pub fn overall_progress(&self) -> u8 {
        if self.records.is_empty() {
            return 0;
        }
        let total: u32 = self.records.iter().map(|r| u32::from(r.progress)).sum();
        (total as f64 / self.records.len() as f64).round() as u8
    }
}
