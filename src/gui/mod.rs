mod pad_panel;
mod search_panel;

pub use pad_panel::{device_events, PadPanel};
pub use search_panel::SearchPanel;

use crate::catalog::{load_patients, Patient};
use crate::dispense::{
    ButtonState, DispenseButton, DispenseClient, DispenseRequest, HttpDispenseClient,
};
use crate::notify::{NoticeKind, Notifications};
use crate::recognition::recognizer_from_name;
use crate::search::{load_records, patient_visible};
use crate::settings::Settings;
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use std::sync::Arc;
use std::time::Instant;

fn toast_kind(kind: NoticeKind) -> ToastKind {
    match kind {
        NoticeKind::Info => ToastKind::Info,
        NoticeKind::Success => ToastKind::Success,
        NoticeKind::Warning => ToastKind::Warning,
        NoticeKind::Error => ToastKind::Error,
    }
}

struct PatientEntry {
    patient: Patient,
    buttons: Vec<DispenseButton>,
}

impl PatientEntry {
    fn new(patient: Patient) -> Self {
        let buttons = patient
            .prescriptions
            .iter()
            .enumerate()
            .map(|(index, p)| {
                DispenseButton::new(
                    DispenseRequest {
                        patient_id: patient.id.clone(),
                        prescription_index: index,
                        quantity: 1,
                    },
                    p.status,
                )
            })
            .collect();
        Self { patient, buttons }
    }
}

pub struct ScribeApp {
    pad: PadPanel,
    search: SearchPanel,
    patients: Vec<PatientEntry>,
    patient_query: String,
    dispense_client: Option<Arc<dyn DispenseClient>>,
    notifications: Notifications,
    toasts: Toasts,
    enable_toasts: bool,
}

impl ScribeApp {
    pub fn new(settings: &Settings) -> Self {
        let records = load_records(&settings.medicines_file).unwrap_or_else(|err| {
            tracing::error!(
                ?err,
                path = %settings.medicines_file.display(),
                "failed to load medicines"
            );
            Vec::new()
        });
        let patients = load_patients(&settings.patients_file).unwrap_or_else(|err| {
            tracing::error!(
                ?err,
                path = %settings.patients_file.display(),
                "failed to load patients"
            );
            Vec::new()
        });
        let dispense_client: Option<Arc<dyn DispenseClient>> =
            match settings.dispense_endpoint.as_deref() {
                Some(endpoint) => {
                    match HttpDispenseClient::new(endpoint, settings.dispense_timeout()) {
                        Ok(client) => Some(Arc::new(client)),
                        Err(err) => {
                            tracing::error!(?err, "dispense client unavailable");
                            None
                        }
                    }
                }
                None => None,
            };
        let [width, height] = settings.pad_size;
        Self {
            pad: PadPanel::new(
                egui::vec2(width, height),
                settings.pen_style(),
                recognizer_from_name(&settings.recognizer),
                settings.recognition_latency(),
            ),
            search: SearchPanel::new(
                records,
                settings.search_debounce(),
                settings.search_min_query_len,
            ),
            patients: patients.into_iter().map(PatientEntry::new).collect(),
            patient_query: String::new(),
            dispense_client,
            notifications: Notifications::new(
                settings.notice_duration(),
                settings.toast_log.clone(),
            ),
            toasts: Toasts::new().anchor(egui::Align2::RIGHT_TOP, [10.0, 10.0]),
            enable_toasts: settings.enable_toasts,
        }
    }

    fn flush_notifications(&mut self, ctx: &egui::Context, now: Instant) {
        let duration = self.notifications.duration().as_secs_f64();
        for notice in self.notifications.take_unshown() {
            if self.enable_toasts {
                self.toasts.add(Toast {
                    text: notice.message.into(),
                    kind: toast_kind(notice.kind),
                    options: ToastOptions::default().duration_in_seconds(duration),
                });
            }
        }
        self.notifications.expire(now);
        if self.enable_toasts {
            self.toasts.show(ctx);
        }
    }

    fn patients_ui(&mut self, ui: &mut egui::Ui, now: Instant) {
        ui.add(
            egui::TextEdit::singleline(&mut self.patient_query).hint_text("Filter patients..."),
        );
        let query = self.patient_query.clone();
        let client = self.dispense_client.clone();
        let mut busy = false;
        for entry in &mut self.patients {
            for button in &mut entry.buttons {
                button.poll(&mut self.notifications, now);
                busy |= button.state() == ButtonState::Submitting;
            }
            if !patient_visible(&entry.patient.card(), &query) {
                continue;
            }
            egui::CollapsingHeader::new(format!("{} ({})", entry.patient.name, entry.patient.age))
                .id_source(&entry.patient.id)
                .show(ui, |ui| {
                    for (prescription, button) in
                        entry.patient.prescriptions.iter().zip(entry.buttons.iter_mut())
                    {
                        ui.horizontal(|ui| {
                            ui.label(format!(
                                "{} {} {}",
                                prescription.medicine_name,
                                prescription.dosage,
                                prescription.frequency
                            ));
                            ui.weak(button.status().to_string());
                            let enabled = button.is_enabled() && client.is_some();
                            let clicked = ui
                                .add_enabled(enabled, egui::Button::new(button.label()))
                                .clicked();
                            if clicked {
                                if let Some(client) = &client {
                                    button.submit(client.clone());
                                }
                            }
                        });
                    }
                });
        }
        if busy {
            ui.ctx().request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

impl eframe::App for ScribeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        egui::SidePanel::right("patients")
            .resizable(true)
            .show(ctx, |ui| {
                ui.heading("Patients");
                self.patients_ui(ui, now);
            });
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Prescription pad");
            if let Some(label) = self.pad.ui(ui, &mut self.notifications, now) {
                self.search.set_query(&label, now);
            }
            ui.separator();
            ui.heading("Medicine search");
            self.search.ui(ui, now);
        });
        self.flush_notifications(ctx, now);
    }
}
