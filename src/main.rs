use medscribe::gui::ScribeApp;
use medscribe::settings::Settings;

use eframe::egui;

const DEFAULT_SETTINGS_FILE: &str = "settings.json";

fn main() -> anyhow::Result<()> {
    let settings_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_FILE.to_string());
    let settings = Settings::load(&settings_path)?;
    medscribe::logging::init(settings.debug_logging, settings.log_file.clone());
    tracing::info!(settings = %settings_path, "starting medscribe");

    let [pad_w, pad_h] = settings.pad_size;
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([pad_w.max(400.0) + 360.0, pad_h + 420.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Medscribe",
        native_options,
        Box::new(move |_cc| Box::new(ScribeApp::new(&settings))),
    )
    .map_err(|e| anyhow::anyhow!("ui loop failed: {e}"))
}
