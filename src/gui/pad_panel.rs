use crate::notify::{NoticeKind, Notifications, MSG_COPIED, MSG_EMPTY_PAD};
use crate::pad::{DeviceEvent, InputNormalizer, PenStyle, Point, StrokeCapture, TouchPoint};
use crate::recognition::{RecognitionError, RecognitionJob, RecognitionResult, Recognizer};
use eframe::egui::{self, Color32, Pos2, Rect, Sense, TextureHandle, TextureOptions, Vec2};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Translate one frame of egui input into device events for a pad at
/// `rect`.
///
/// Presses only count inside the pad. Leaving the pad while a mouse stroke
/// is active is reported as [`DeviceEvent::MouseLeave`].
pub fn device_events(events: &[egui::Event], rect: Rect, mouse_drawing: bool) -> Vec<DeviceEvent> {
    let mut out = Vec::new();
    let mut drawing = mouse_drawing;
    for event in events {
        match event {
            egui::Event::PointerButton {
                pos,
                button: egui::PointerButton::Primary,
                pressed,
                ..
            } => {
                if *pressed {
                    if rect.contains(*pos) {
                        drawing = true;
                        out.push(DeviceEvent::MouseDown {
                            client_x: pos.x,
                            client_y: pos.y,
                        });
                    }
                } else if drawing {
                    drawing = false;
                    out.push(DeviceEvent::MouseUp);
                }
            }
            egui::Event::PointerMoved(pos) if drawing => {
                if rect.contains(*pos) {
                    out.push(DeviceEvent::MouseMove {
                        client_x: pos.x,
                        client_y: pos.y,
                    });
                } else {
                    drawing = false;
                    out.push(DeviceEvent::MouseLeave);
                }
            }
            egui::Event::PointerGone if drawing => {
                drawing = false;
                out.push(DeviceEvent::MouseLeave);
            }
            egui::Event::Touch { id, phase, pos, .. } => {
                let touch = TouchPoint {
                    id: id.0,
                    client_x: pos.x,
                    client_y: pos.y,
                };
                match phase {
                    egui::TouchPhase::Start if rect.contains(*pos) => {
                        out.push(DeviceEvent::TouchStart(touch));
                    }
                    egui::TouchPhase::Start => {}
                    egui::TouchPhase::Move => out.push(DeviceEvent::TouchMove(touch)),
                    egui::TouchPhase::End => out.push(DeviceEvent::TouchEnd { id: id.0 }),
                    egui::TouchPhase::Cancel => {
                        out.push(DeviceEvent::TouchCancel { id: id.0 })
                    }
                }
            }
            _ => {}
        }
    }
    out
}

/// Stroke export as pretty JSON for the clipboard, confirmed with a notice.
fn copy_strokes(
    capture: &StrokeCapture,
    notifications: &mut Notifications,
    now: Instant,
) -> Option<String> {
    match serde_json::to_string_pretty(&capture.export_strokes()) {
        Ok(json) => {
            notifications.push(NoticeKind::Success, MSG_COPIED, now);
            Some(json)
        }
        Err(err) => {
            tracing::error!(?err, "stroke export failed");
            notifications.push(NoticeKind::Error, "Failed to copy strokes", now);
            None
        }
    }
}

enum PadInit {
    Pending,
    Ready(StrokeCapture),
    Failed(String),
}

/// Handwriting panel: the pad, its clear/recognize controls and the last
/// recognition answer.
pub struct PadPanel {
    size: Vec2,
    pen: PenStyle,
    init: PadInit,
    input: InputNormalizer,
    mouse_drawing: bool,
    texture: Option<TextureHandle>,
    uploaded_revision: Option<u64>,
    recognizer: Arc<dyn Recognizer>,
    latency: Duration,
    job: Option<RecognitionJob>,
    last_result: Option<RecognitionResult>,
}

impl PadPanel {
    pub fn new(
        size: Vec2,
        pen: PenStyle,
        recognizer: Arc<dyn Recognizer>,
        latency: Duration,
    ) -> Self {
        Self {
            size,
            pen,
            init: PadInit::Pending,
            input: InputNormalizer::default(),
            mouse_drawing: false,
            texture: None,
            uploaded_revision: None,
            recognizer,
            latency,
            job: None,
            last_result: None,
        }
    }

    pub fn capture(&self) -> Option<&StrokeCapture> {
        match &self.init {
            PadInit::Ready(capture) => Some(capture),
            _ => None,
        }
    }

    pub fn is_recognizing(&self) -> bool {
        self.job.is_some()
    }

    fn ensure_capture(&mut self, ctx: &egui::Context) {
        if !matches!(self.init, PadInit::Pending) {
            return;
        }
        let dpr = ctx.pixels_per_point();
        self.init = match StrokeCapture::with_raster(self.size.x, self.size.y, dpr, self.pen) {
            Ok(capture) => {
                tracing::info!(dpr, width = self.size.x, height = self.size.y, "pad ready");
                PadInit::Ready(capture)
            }
            Err(err) => {
                tracing::error!(%err, "pad initialisation failed");
                PadInit::Failed(err.to_string())
            }
        };
    }

    fn start_recognition(&mut self, notifications: &mut Notifications, now: Instant) {
        let PadInit::Ready(capture) = &self.init else {
            return;
        };
        match RecognitionJob::spawn(self.recognizer.clone(), capture.snapshot(), self.latency) {
            Ok(job) => {
                self.last_result = None;
                self.job = Some(job);
            }
            Err(RecognitionError::EmptyInput) => {
                notifications.push(NoticeKind::Warning, MSG_EMPTY_PAD, now);
            }
            Err(err) => {
                notifications.push(NoticeKind::Error, err.to_string(), now);
            }
        }
    }

    fn poll_recognition(&mut self, notifications: &mut Notifications, now: Instant) {
        let Some(job) = self.job.as_mut() else {
            return;
        };
        match job.try_result() {
            None => {}
            Some(Ok(result)) => {
                notifications.push(
                    NoticeKind::Info,
                    format!("Recognized: {}", result.label),
                    now,
                );
                self.last_result = Some(result);
                self.job = None;
            }
            Some(Err(err)) => {
                notifications.push(NoticeKind::Error, err.to_string(), now);
                self.job = None;
            }
        }
    }

    fn upload_texture(&mut self, ctx: &egui::Context) {
        let PadInit::Ready(capture) = &self.init else {
            return;
        };
        let revision = capture.surface().revision();
        if self.uploaded_revision == Some(revision) && self.texture.is_some() {
            return;
        }
        let image = capture.surface().image();
        let size = [image.width() as usize, image.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
        if let Some(tex) = self.texture.as_mut() {
            tex.set(color_image, TextureOptions::LINEAR);
        } else {
            self.texture =
                Some(ctx.load_texture("handwriting_pad", color_image, TextureOptions::LINEAR));
        }
        self.uploaded_revision = Some(revision);
    }

    /// Draw the panel. Returns a label the user chose to search for.
    pub fn ui(
        &mut self,
        ui: &mut egui::Ui,
        notifications: &mut Notifications,
        now: Instant,
    ) -> Option<String> {
        let ctx = ui.ctx().clone();
        self.ensure_capture(&ctx);
        self.poll_recognition(notifications, now);
        if self.job.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        if let PadInit::Failed(reason) = &self.init {
            ui.colored_label(Color32::RED, format!("Handwriting pad unavailable: {reason}"));
            return None;
        }

        let (rect, _response) = ui.allocate_exact_size(self.size, Sense::click_and_drag());
        ui.painter().rect_filled(rect, 4.0, Color32::WHITE);

        self.input.set_origin(Point::new(rect.min.x, rect.min.y));
        let events = ctx.input(|i| i.events.clone());
        let device = device_events(&events, rect, self.mouse_drawing);
        if let PadInit::Ready(capture) = &mut self.init {
            for event in device {
                match event {
                    DeviceEvent::MouseDown { .. } => self.mouse_drawing = true,
                    DeviceEvent::MouseUp | DeviceEvent::MouseLeave => self.mouse_drawing = false,
                    _ => {}
                }
                if let Some(pad_event) = self.input.normalize(event).event {
                    capture.handle(pad_event);
                }
            }
        }

        self.upload_texture(&ctx);
        if let Some(tex) = &self.texture {
            ui.painter().image(
                tex.id(),
                rect,
                Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }
        let has_content = self.capture().map(|c| c.has_content()).unwrap_or(false);
        if !has_content {
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Write the medicine name here",
                egui::FontId::proportional(14.0),
                Color32::GRAY,
            );
        }

        let mut chosen = None;
        ui.horizontal(|ui| {
            if ui.button("Clear").clicked() {
                if let PadInit::Ready(capture) = &mut self.init {
                    capture.clear();
                }
                self.last_result = None;
            }
            let recognize = ui.add_enabled(self.job.is_none(), egui::Button::new("Recognize"));
            if recognize.clicked() {
                self.start_recognition(notifications, now);
            }
            if self.job.is_some() {
                ui.spinner();
            }
            if ui.button("Copy strokes").clicked() {
                if let Some(json) = self
                    .capture()
                    .and_then(|capture| copy_strokes(capture, notifications, now))
                {
                    ui.output_mut(|o| o.copied_text = json);
                }
            }
        });

        if let Some(result) = &self.last_result {
            ui.horizontal(|ui| {
                ui.label(format!(
                    "{} ({:.0}%)",
                    result.label,
                    result.confidence * 100.0
                ));
                if ui.button("Search").clicked() {
                    chosen = Some(result.label.clone());
                }
                for alt in &result.alternatives {
                    if ui.small_button(alt).clicked() {
                        chosen = Some(alt.clone());
                    }
                }
            });
        }
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad_rect() -> Rect {
        Rect::from_min_size(Pos2::new(10.0, 10.0), Vec2::new(100.0, 100.0))
    }

    fn press(x: f32, y: f32, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos: Pos2::new(x, y),
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::default(),
        }
    }

    #[test]
    fn copying_strokes_confirms_with_notice() {
        let mut capture =
            StrokeCapture::with_raster(50.0, 50.0, 1.0, PenStyle::default()).unwrap();
        capture.begin(Point::new(3.0, 4.0));
        capture.end();
        let mut notifications = Notifications::default();

        let json = copy_strokes(&capture, &mut notifications, Instant::now()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["strokes"][0][0]["x"], 3.0);

        let shown = notifications.take_unshown();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].kind, NoticeKind::Success);
        assert_eq!(shown[0].message, MSG_COPIED);
    }

    #[test]
    fn press_outside_pad_is_ignored() {
        let events = [press(500.0, 500.0, true), egui::Event::PointerMoved(Pos2::new(20.0, 20.0))];
        assert!(device_events(&events, pad_rect(), false).is_empty());
    }

    #[test]
    fn drag_inside_pad_maps_to_mouse_stream() {
        let events = [
            press(20.0, 20.0, true),
            egui::Event::PointerMoved(Pos2::new(30.0, 30.0)),
            press(30.0, 30.0, false),
        ];
        let out = device_events(&events, pad_rect(), false);
        assert_eq!(
            out,
            vec![
                DeviceEvent::MouseDown {
                    client_x: 20.0,
                    client_y: 20.0
                },
                DeviceEvent::MouseMove {
                    client_x: 30.0,
                    client_y: 30.0
                },
                DeviceEvent::MouseUp,
            ]
        );
    }

    #[test]
    fn leaving_pad_mid_stroke_reports_leave() {
        let events = [egui::Event::PointerMoved(Pos2::new(300.0, 30.0))];
        assert_eq!(
            device_events(&events, pad_rect(), true),
            vec![DeviceEvent::MouseLeave]
        );
    }
}
