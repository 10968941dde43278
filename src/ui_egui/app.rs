mod prompts;
mod shortcuts;
mod toast;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};
use egui::{vec2, Align, Sense};

use self::prompts::{DetailsState, TitlePrompt};
use self::toast::ToastManager;
use crate::error::{GridError, GridResult};
use crate::models::occurrence::Occurrence;
use crate::models::settings::GridSettings;
use crate::services::database::Database;
use crate::services::event::EventService;
use crate::ui_egui::geometry::GridGeometry;
use crate::ui_egui::gesture::CreateRequest;
use crate::ui_egui::surface::{GridSurface, Hit};
use crate::ui_egui::time_mapper::TimeMapper;
use crate::ui_egui::views::palette::TimeGridPalette;
use crate::ui_egui::views::time_grid::{
    draw_current_time_indicator, paint_frame, paint_time_labels, TIME_LABEL_WIDTH,
};
use crate::utils::date::{shift_weeks, visible_dates};

/// Hour the grid scrolls to on startup
const MORNING_HOUR: u32 = 7;
const HEADER_HEIGHT: f32 = 22.0;

pub struct PlannerApp {
    surface: GridSurface<EventService<'static>>,
    settings: GridSettings,
    /// Any date inside the visible week
    current_date: NaiveDate,
    /// Filled by the surface callbacks, drained once per frame
    pending_create: Rc<RefCell<Option<CreateRequest>>>,
    pending_click: Rc<RefCell<Option<Occurrence>>>,
    title_prompt: Option<TitlePrompt>,
    details: Option<DetailsState>,
    hovered: Option<Hit>,
    toasts: ToastManager,
    scrolled_to_morning: bool,
}

impl eframe::App for PlannerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keyboard_shortcuts(ctx);
        self.render_toolbar(ctx);
        egui::CentralPanel::default().show(ctx, |ui| self.render_grid(ui));
        self.drain_callbacks();
        self.render_title_prompt(ctx);
        self.render_details(ctx);
        self.toasts.render(ctx, ctx.style().visuals.dark_mode);

        // throttled pointer moves still need a frame to land in
        if self.surface.has_pending_move() {
            ctx.request_repaint_after(Duration::from_millis(self.settings.frame_interval_ms));
        }
    }
}

impl PlannerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        database: &'static Database,
        settings: GridSettings,
    ) -> Self {
        let mut surface = GridSurface::new(EventService::new(database.connection()), &settings);

        let pending_create = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&pending_create);
        surface.on_create(move |request| *sink.borrow_mut() = Some(*request));

        let pending_click = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&pending_click);
        surface.on_click(move |occurrence| *sink.borrow_mut() = Some(occurrence.clone()));

        let mut toasts = ToastManager::new();
        if let Err(e) = surface.reload() {
            log::error!("{}", e);
            toasts.error("Could not load events");
        }

        Self {
            surface,
            settings,
            current_date: Local::now().date_naive(),
            pending_create,
            pending_click,
            title_prompt: None,
            details: None,
            hovered: None,
            toasts,
            scrolled_to_morning: false,
        }
    }

    fn dialog_open(&self) -> bool {
        self.title_prompt.is_some() || self.details.is_some()
    }

    fn visible_dates(&self) -> Vec<NaiveDate> {
        visible_dates(
            self.current_date,
            self.settings.first_day_of_week,
            self.settings.days_visible,
        )
    }

    fn navigate_weeks(&mut self, weeks: i64) {
        self.surface.cancel();
        self.current_date = shift_weeks(self.current_date, weeks);
    }

    fn jump_to_today(&mut self) {
        self.surface.cancel();
        self.current_date = Local::now().date_naive();
    }

    fn reload(&mut self) {
        match self.surface.reload() {
            Ok(()) => self.toasts.info("Events reloaded"),
            Err(e) => {
                log::error!("{}", e);
                self.toasts.error("Could not load events");
            }
        }
    }

    /// Surface a commit result to the user.
    fn report(&mut self, result: GridResult<()>) {
        match result {
            Ok(()) => {}
            Err(e @ GridError::Commit(_)) => self.toasts.error(e.to_string()),
            Err(e) => log::warn!("{}", e),
        }
    }

    fn drain_callbacks(&mut self) {
        if let Some(request) = self.pending_create.borrow_mut().take() {
            self.title_prompt = Some(TitlePrompt::new(request));
        }
        if let Some(occurrence) = self.pending_click.borrow_mut().take() {
            self.details = Some(DetailsState::new(occurrence, self.surface.palette()));
        }
    }

    fn render_toolbar(&mut self, ctx: &egui::Context) {
        let dates = self.visible_dates();
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("◀").on_hover_text("Previous week").clicked() {
                    self.navigate_weeks(-1);
                }
                if ui.button("Today").clicked() {
                    self.jump_to_today();
                }
                if ui.button("▶").on_hover_text("Next week").clicked() {
                    self.navigate_weeks(1);
                }
                if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
                    ui.heading(format!(
                        "{} - {}",
                        first.format("%d %b"),
                        last.format("%d %b %Y")
                    ));
                }
                ui.with_layout(egui::Layout::right_to_left(Align::Center), |ui| {
                    ui.weak("Drag to create · Alt-drag to duplicate · Esc cancels");
                });
            });
        });
    }

    fn render_grid(&mut self, ui: &mut egui::Ui) {
        let dates = self.visible_dates();
        let column_width =
            ((ui.available_width() - TIME_LABEL_WIDTH) / dates.len().max(1) as f32).max(1.0);

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            ui.add_space(TIME_LABEL_WIDTH);
            let today = Local::now().date_naive();
            for date in &dates {
                ui.allocate_ui(vec2(column_width, HEADER_HEIGHT), |ui| {
                    ui.set_width(column_width);
                    let text = egui::RichText::new(date.format("%a %d").to_string());
                    ui.centered_and_justified(|ui| {
                        ui.label(if *date == today { text.strong() } else { text });
                    });
                });
            }
        });

        egui::ScrollArea::vertical()
            .drag_to_scroll(false)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let mapper = TimeMapper::from_settings(&self.settings);
                let (rect, response) = ui.allocate_exact_size(
                    vec2(ui.available_width(), mapper.day_height()),
                    Sense::click_and_drag(),
                );
                let geometry = GridGeometry::new(
                    mapper,
                    rect.min + vec2(TIME_LABEL_WIDTH, 0.0),
                    column_width,
                    dates.clone(),
                );
                self.surface.set_geometry(geometry.clone());
                self.handle_pointer(ui.ctx(), &response);

                let painter = ui.painter_at(rect);
                let palette = TimeGridPalette::from_visuals(ui.visuals());
                paint_time_labels(&painter, &geometry, &palette);
                paint_frame(
                    &painter,
                    &self.surface.frame(),
                    &palette,
                    self.hovered
                        .as_ref()
                        .map(|hit| (&hit.occurrence.id, hit.handle)),
                );
                draw_current_time_indicator(&painter, &geometry, Local::now().naive_local());

                if !self.scrolled_to_morning {
                    let y = rect.top() + mapper.time_to_offset(MORNING_HOUR, 0);
                    ui.scroll_to_rect(
                        egui::Rect::from_min_size(egui::pos2(rect.left(), y), vec2(1.0, 1.0)),
                        Some(Align::TOP),
                    );
                    self.scrolled_to_morning = true;
                }
            });
    }

    fn handle_pointer(&mut self, ctx: &egui::Context, response: &egui::Response) {
        let (pressed, released, latest, alt) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.latest_pos(),
                i.modifiers.alt,
            )
        });
        let Some(pos) = latest else {
            return;
        };
        let now = Instant::now();

        if pressed && response.hovered() && !self.dialog_open() {
            self.hovered = None;
            if let Err(e) = self.surface.pointer_down(pos, alt) {
                log::debug!("Pointer down ignored: {}", e);
            }
        }

        if self.surface.is_gesture_active() {
            if released {
                let result = self.surface.pointer_released(pos);
                self.report(result);
            } else {
                self.surface.pointer_moved(pos, now);
                self.surface.tick(now);
            }
            return;
        }

        self.hovered = if response.hovered() && !self.dialog_open() {
            self.surface.hit_test(pos)
        } else {
            None
        };
        match &self.hovered {
            Some(Hit {
                handle: Some(handle),
                ..
            }) => ctx.set_cursor_icon(handle.cursor_icon()),
            Some(_) => ctx.set_cursor_icon(egui::CursorIcon::Grab),
            None => {}
        }
    }
}
