//! Small windows answering the surface callbacks: the title prompt after a
//! create gesture and the details window after a click.

use egui::Color32;

use super::PlannerApp;
use crate::models::event::EventDefinition;
use crate::models::occurrence::Occurrence;
use crate::ui_egui::gesture::CreateRequest;
use crate::ui_egui::views::palette::CategoryPalette;

pub(super) struct TitlePrompt {
    pub request: CreateRequest,
    pub title: String,
    focus_requested: bool,
}

impl TitlePrompt {
    pub fn new(request: CreateRequest) -> Self {
        Self {
            request,
            title: String::new(),
            focus_requested: false,
        }
    }
}

pub(super) struct DetailsState {
    pub occurrence: Occurrence,
    pub color: [u8; 3],
}

impl DetailsState {
    pub fn new(occurrence: Occurrence, palette: &CategoryPalette) -> Self {
        let current = palette.color_for(&occurrence);
        Self {
            occurrence,
            color: [current.r(), current.g(), current.b()],
        }
    }
}

enum DetailsAction {
    Recolor(String),
    DeleteOccurrence,
    DeleteSeries(i64),
    Close,
}

fn to_hex(color: [u8; 3]) -> String {
    format!("#{:02X}{:02X}{:02X}", color[0], color[1], color[2])
}

impl PlannerApp {
    pub(super) fn render_title_prompt(&mut self, ctx: &egui::Context) {
        let Some(prompt) = self.title_prompt.as_mut() else {
            return;
        };

        let mut submit = false;
        let mut cancel = false;
        let request = prompt.request;

        egui::Window::new("New event")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(format!(
                    "{}  {} - {}",
                    request.date.format("%A %d %B"),
                    request.start.format("%H:%M"),
                    request.end.format("%H:%M")
                ));
                let response = ui.text_edit_singleline(&mut prompt.title);
                if !prompt.focus_requested {
                    response.request_focus();
                    prompt.focus_requested = true;
                }
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submit = true;
                }
                ui.horizontal(|ui| {
                    if ui.button("Create").clicked() {
                        submit = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });

        if cancel {
            self.title_prompt = None;
            return;
        }
        if !submit {
            return;
        }

        let title = prompt.title.trim().to_string();
        match EventDefinition::new(title, request.date, request.start, request.end) {
            Ok(definition) => {
                self.title_prompt = None;
                match self.surface.create_event(definition) {
                    Ok(created) => self.toasts.success(format!("Created '{}'", created.title)),
                    Err(e) => self.toasts.error(e.to_string()),
                }
            }
            // keep the prompt open so the title can be fixed
            Err(message) => self.toasts.error(message),
        }
    }

    pub(super) fn render_details(&mut self, ctx: &egui::Context) {
        let Some(details) = self.details.as_mut() else {
            return;
        };
        let recurring = self
            .surface
            .definition(details.occurrence.source)
            .map_or(false, EventDefinition::is_recurring);

        let mut action = None;
        let mut open = true;
        egui::Window::new(details.occurrence.title.clone())
            .id(egui::Id::new("occurrence_details"))
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                let occurrence = &details.occurrence;
                ui.label(format!(
                    "{}  {} - {}",
                    occurrence.date.format("%A %d %B %Y"),
                    occurrence.start.format("%H:%M"),
                    occurrence.end.format("%H:%M")
                ));
                if let Some(note) = occurrence.note.as_deref().filter(|n| !n.is_empty()) {
                    ui.separator();
                    ui.label(note);
                }
                if recurring {
                    ui.weak("Part of a recurring series");
                }
                ui.separator();

                ui.horizontal(|ui| {
                    ui.color_edit_button_srgb(&mut details.color);
                    let label = if recurring {
                        "Color this occurrence"
                    } else {
                        "Apply color"
                    };
                    if ui.button(label).clicked() {
                        action = Some(DetailsAction::Recolor(to_hex(details.color)));
                    }
                });

                ui.horizontal(|ui| {
                    let delete = egui::Button::new(
                        egui::RichText::new("Delete").color(Color32::from_rgb(200, 60, 60)),
                    );
                    if recurring {
                        if ui.button("Delete this occurrence").clicked() {
                            action = Some(DetailsAction::DeleteOccurrence);
                        }
                        if let crate::models::occurrence::DefinitionRef::Saved(id) =
                            occurrence.source
                        {
                            if ui.add(delete).on_hover_text("Delete the whole series").clicked() {
                                action = Some(DetailsAction::DeleteSeries(id));
                            }
                        }
                    } else if ui.add(delete).clicked() {
                        action = Some(DetailsAction::DeleteOccurrence);
                    }
                    if ui.button("Close").clicked() {
                        action = Some(DetailsAction::Close);
                    }
                });
            });

        if !open {
            action = Some(DetailsAction::Close);
        }
        let Some(action) = action else {
            return;
        };
        let occurrence = details.occurrence.clone();
        self.details = None;

        let result = match action {
            DetailsAction::Close => return,
            DetailsAction::Recolor(color) => self.surface.set_occurrence_color(&occurrence, Some(color)),
            DetailsAction::DeleteOccurrence => self
                .surface
                .delete_occurrence(&occurrence)
                .map(|()| self.toasts.info(format!("Deleted '{}'", occurrence.title))),
            DetailsAction::DeleteSeries(id) => self
                .surface
                .delete_definition(id)
                .map(|()| self.toasts.info(format!("Deleted series '{}'", occurrence.title))),
        };
        self.report(result);
    }
}
