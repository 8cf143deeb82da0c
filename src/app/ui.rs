use super::UploaderApp;
use eframe::egui::{self, Color32, RichText};
use upload_manager::utils::file_size::FileSizeUtils;
use upload_manager::{FileId, UploadRecord, UploadStatus};

const ACCENT: Color32 = Color32::from_rgb(161, 89, 225);

enum RowAction {
    Upload(FileId),
    Retry(FileId),
    Cancel(FileId),
    Remove(FileId),
}

impl UploaderApp {
    pub fn render(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(20.0);
                ui.vertical_centered(|ui| {
                    ui.heading("File Uploader");
                    ui.add_space(5.0);
                    ui.label(
                        RichText::new("Validate, upload and track a batch of files")
                            .color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                });

                ui.add_space(20.0);
                self.render_settings(ui);

                ui.add_space(20.0);
                ui.horizontal(|ui| {
                    if ui.button("📄 Add Files").clicked() {
                        self.pick_files();
                    }
                    if ui.button("📁 Add Folder").clicked() {
                        self.pick_folder();
                    }
                    ui.label("Files listed in .gitignore are skipped");
                });

                ui.add_space(10.0);
                ui.vertical_centered(|ui| {
                    let snapshot = &self.state.snapshot;
                    let can_upload = self.endpoint_url.is_some()
                        && snapshot.count(UploadStatus::Pending) > 0;

                    ui.add_enabled_ui(can_upload, |ui| {
                        let button = egui::Button::new("📤 Upload All")
                            .min_size(egui::vec2(200.0, 40.0));
                        if ui.add(button).clicked() {
                            self.upload_all();
                        }
                    });

                    ui.add_space(5.0);
                    if ui.button("🗑 Clear All").clicked() {
                        self.manager.clear_all();
                    }
                });

                if !self.state.snapshot.records.is_empty() {
                    ui.add_space(20.0);
                    ui.group(|ui| {
                        let label = if self.state.snapshot.is_transferring {
                            "📤 Uploading"
                        } else {
                            "Overall progress"
                        };
                        ui.label(label);
                        let progress_bar =
                            egui::ProgressBar::new(self.state.get_progress_percentage())
                                .show_percentage()
                                .fill(ACCENT);
                        ui.add(progress_bar);
                        ui.label(self.state.get_status_text());
                    });

                    ui.add_space(10.0);
                    self.render_details(ui);
                }

                if let Some(error) = &self.state.error_message {
                    ui.add_space(10.0);
                    ui.vertical_centered(|ui| {
                        ui.colored_label(Color32::from_rgb(220, 50, 50), error);
                    });
                }
            });
        });
    }

    fn render_settings(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label("Paste the upload request as cURL");
                ui.add_space(4.0);
                ui.label("ℹ").on_hover_text_at_pointer(
                    "To get the curl command:\n\
                    1. Open Developer Tools (F12)\n\
                    2. Go to Network tab\n\
                    3. Upload a single file manually\n\
                    4. Right-click the upload request and Copy as cURL",
                );
            });
            ui.add_space(8.0);

            let text_edit = egui::TextEdit::multiline(&mut self.curl_text)
                .desired_width(ui.available_width())
                .font(egui::TextStyle::Monospace)
                .hint_text("curl 'https://example.com/api/upload' -H 'authorization: ...'");
            ui.add_sized([ui.available_width(), 100.0], text_edit);

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.label("Accept:");
                ui.text_edit_singleline(&mut self.accept_text);
                ui.checkbox(&mut self.auto_upload, "Upload on add");
                if ui.button("Apply").clicked() {
                    self.apply_settings();
                }
            });

            match &self.endpoint_url {
                Some(url) => ui.label(format!("Uploading to: {}", url)),
                None => ui.label("No endpoint configured"),
            };
        });
    }

    fn render_details(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui
                .button(if self.state.show_details {
                    "Hide Details"
                } else {
                    "Show Details"
                })
                .clicked()
            {
                self.state.show_details = !self.state.show_details;
            }
            if ui.button("📋 Copy Report").clicked() {
                self.copy_report(ui);
            }
        });

        if !self.state.show_details {
            return;
        }

        let mut actions = Vec::new();
        egui::ScrollArea::vertical()
            .id_source("records")
            .max_height(300.0)
            .show(ui, |ui| {
                egui::Frame::none()
                    .fill(ui.style().visuals.extreme_bg_color)
                    .show(ui, |ui| {
                        ui.add_space(8.0);
                        for record in &self.state.snapshot.records {
                            render_record(ui, record, &mut actions);
                            ui.add_space(4.0);
                        }
                        ui.add_space(8.0);
                    });
            });

        for action in actions {
            match action {
                RowAction::Upload(id) => self.upload_one(id),
                RowAction::Retry(id) => self.retry(id),
                RowAction::Cancel(id) => self.manager.cancel_upload(id),
                RowAction::Remove(id) => self.manager.remove_file(id),
            }
        }
    }

    fn copy_report(&mut self, ui: &egui::Ui) {
        match self.state.snapshot.report_json() {
            Ok(json) => ui.output_mut(|o| o.copied_text = json),
            Err(e) => self.state.error_message = Some(format!("Failed to build report: {}", e)),
        }
    }
}

fn render_record(ui: &mut egui::Ui, record: &UploadRecord, actions: &mut Vec<RowAction>) {
    let name = format!(
        "{} ({})",
        record.file.name,
        FileSizeUtils::format_size(record.file.size)
    );

    ui.horizontal(|ui| {
        match record.status {
            UploadStatus::Pending => {
                ui.label("⏳");
                ui.colored_label(Color32::from_rgb(150, 150, 150), &name);
                if ui.small_button("Upload").clicked() {
                    actions.push(RowAction::Upload(record.id));
                }
            }
            UploadStatus::Uploading => {
                ui.label("📤");
                ui.label(&name);
                ui.add(
                    egui::ProgressBar::new(f32::from(record.progress) / 100.0)
                        .desired_width(120.0)
                        .show_percentage()
                        .fill(ACCENT),
                );
                if ui.small_button("Cancel").clicked() {
                    actions.push(RowAction::Cancel(record.id));
                }
            }
            UploadStatus::Completed => {
                ui.label("✅");
                ui.colored_label(Color32::from_rgb(0, 180, 0), &name);
            }
            UploadStatus::Error => {
                ui.label("❌");
                ui.colored_label(
                    Color32::from_rgb(220, 50, 50),
                    format!("{} - {}", name, record.error.as_deref().unwrap_or("failed")),
                );
                if ui.small_button("Retry").clicked() {
                    actions.push(RowAction::Retry(record.id));
                }
            }
        }
        if ui.small_button("✖").clicked() {
            actions.push(RowAction::Remove(record.id));
        }
    });
}
