use super::PlannerApp;

impl PlannerApp {
    pub(super) fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        let (escape, left, right, today, reload) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::ArrowLeft),
                i.key_pressed(egui::Key::ArrowRight),
                i.key_pressed(egui::Key::T) && !i.modifiers.any(),
                i.modifiers.command && i.key_pressed(egui::Key::R),
            )
        });

        // Escape unwinds one layer: gesture first, then dialogs
        if escape {
            if self.surface.is_gesture_active() {
                self.surface.cancel();
            } else if self.title_prompt.is_some() {
                self.title_prompt = None;
            } else {
                self.details = None;
            }
        }

        if self.dialog_open() || self.surface.is_gesture_active() {
            return;
        }

        if left {
            self.navigate_weeks(-1);
        }
        if right {
            self.navigate_weeks(1);
        }
        if today {
            self.jump_to_today();
        }
        if reload {
            self.reload();
        }
    }
}
