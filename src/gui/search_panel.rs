use crate::search::{ResultList, SearchBox, SearchRecord, Selection};
use eframe::egui::{self, Rect};
use std::time::{Duration, Instant};

/// Medicine search box with its dropdown.
pub struct SearchPanel {
    search: SearchBox,
    query: String,
    selected: Option<Selection>,
}

impl SearchPanel {
    pub fn new(records: Vec<SearchRecord>, quiet: Duration, min_query_len: usize) -> Self {
        Self {
            search: SearchBox::new(records, quiet, min_query_len),
            query: String::new(),
            selected: None,
        }
    }

    pub fn selected(&self) -> Option<&Selection> {
        self.selected.as_ref()
    }

    /// Put `text` in the box as if typed.
    pub fn set_query(&mut self, text: &str, now: Instant) {
        self.query = text.to_string();
        self.search.on_input(text, now);
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, now: Instant) {
        let ctx = ui.ctx().clone();
        if self.search.poll(now) {
            ctx.request_repaint();
        }
        if let Some(deadline) = self.search.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }

        let input = ui.add(
            egui::TextEdit::singleline(&mut self.query).hint_text("Search medicines..."),
        );
        if input.changed() {
            self.search.on_input(&self.query, now);
        }

        let mut list_rect: Option<Rect> = None;
        let mut picked: Option<usize> = None;
        match self.search.results() {
            ResultList::Hidden => {}
            ResultList::NoResults => {
                let response = ui.weak("No medicines found");
                list_rect = Some(response.rect);
            }
            ResultList::Matches(_) => {
                let frame = egui::Frame::group(ui.style()).show(ui, |ui| {
                    for (pos, record) in self.search.matched_records().into_iter().enumerate() {
                        let row = ui
                            .vertical(|ui| {
                                let name = ui.selectable_label(
                                    false,
                                    egui::RichText::new(&record.name).strong(),
                                );
                                ui.small(record.detail_line());
                                name
                            })
                            .inner;
                        if row.clicked() {
                            picked = Some(pos);
                        }
                    }
                });
                list_rect = Some(frame.response.rect);
            }
        }

        if let Some(pos) = picked {
            if let Some(selection) = self.search.select(pos) {
                self.query = selection.name.clone();
                self.selected = Some(selection);
            }
        } else if let Some(list_rect) = list_rect {
            let clicked_outside = ctx.input(|i| {
                i.pointer.any_pressed()
                    && i.pointer
                        .interact_pos()
                        .map(|pos| !list_rect.contains(pos) && !input.rect.contains(pos))
                        .unwrap_or(false)
            });
            if clicked_outside {
                self.search.dismiss();
            }
        }

        if let Some(selection) = &self.selected {
            ui.label(format!("Selected: {}", selection.name));
        }
    }
}
