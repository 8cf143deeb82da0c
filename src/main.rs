mod app;

use app::UploaderApp;
use eframe::CreationContext;
use tokio::runtime::Runtime;
use tracing::error;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "upload_manager=info".into()),
        )
        .init();

    let runtime = match Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "failed to start tokio runtime");
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([640.0, 720.0])
            .with_min_inner_size([420.0, 520.0]),
        ..Default::default()
    };

    eframe::run_native(
        "File Uploader",
        options,
        Box::new(move |cc: &CreationContext| Box::new(UploaderApp::new(cc, runtime))),
    )
}
