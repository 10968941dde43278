// Event Resize Handles
//
// Hit zones on the top/bottom borders of event boxes. Dragging the top zone
// moves the start time, dragging the bottom zone moves the end time.

use egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

/// Which edge of the event is being dragged
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeHandle {
    /// Top edge - adjusts start time
    Top,
    /// Bottom edge - adjusts end time
    Bottom,
}

impl ResizeHandle {
    pub fn cursor_icon(&self) -> egui::CursorIcon {
        egui::CursorIcon::ResizeVertical
    }
}

/// Visual size of the handle circle
pub const HANDLE_VISUAL_SIZE: f32 = 6.0;
/// Height of the hit zone on tall boxes
const EDGE_ZONE: f32 = 8.0;

/// Handle hit zones for one event box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandleRects {
    pub top: Rect,
    pub bottom: Rect,
}

impl HandleRects {
    pub fn for_timed_event(event_rect: Rect) -> Self {
        // Short boxes still need a body to grab for moving, so each zone
        // takes at most a quarter of the height.
        let zone_height = EDGE_ZONE.min(event_rect.height() / 4.0);

        Self {
            top: Rect::from_min_size(
                event_rect.left_top(),
                Vec2::new(event_rect.width(), zone_height),
            ),
            bottom: Rect::from_min_size(
                Pos2::new(event_rect.left(), event_rect.bottom() - zone_height),
                Vec2::new(event_rect.width(), zone_height),
            ),
        }
    }

    pub fn hit_test(&self, pos: Pos2) -> Option<ResizeHandle> {
        if self.top.contains(pos) {
            Some(ResizeHandle::Top)
        } else if self.bottom.contains(pos) {
            Some(ResizeHandle::Bottom)
        } else {
            None
        }
    }

    pub fn get(&self, handle: ResizeHandle) -> Rect {
        match handle {
            ResizeHandle::Top => self.top,
            ResizeHandle::Bottom => self.bottom,
        }
    }
}

/// Draw the bar indicators for both handles of an event box
pub fn draw_handles(
    painter: &Painter,
    handles: &HandleRects,
    hovered_handle: Option<ResizeHandle>,
    color: Color32,
) {
    for handle in [ResizeHandle::Top, ResizeHandle::Bottom] {
        let rect = handles.get(handle);
        let is_hovered = hovered_handle == Some(handle);
        let bar_y = match handle {
            ResizeHandle::Top => rect.top() + HANDLE_VISUAL_SIZE / 2.0,
            ResizeHandle::Bottom => rect.bottom() - HANDLE_VISUAL_SIZE / 2.0,
        };
        let half_width = rect.width().min(40.0) / 2.0;
        let center_x = rect.center().x;

        painter.line_segment(
            [
                Pos2::new(center_x - half_width, bar_y),
                Pos2::new(center_x + half_width, bar_y),
            ],
            Stroke::new(
                if is_hovered { 3.0 } else { 2.0 },
                if is_hovered {
                    Color32::WHITE
                } else {
                    Color32::from_rgba_unmultiplied(
                        color.r().saturating_add(60),
                        color.g().saturating_add(60),
                        color.b().saturating_add(60),
                        200,
                    )
                },
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_hit_test() {
        let rect = Rect::from_min_size(Pos2::new(100.0, 100.0), Vec2::new(200.0, 60.0));
        let handles = HandleRects::for_timed_event(rect);

        assert_eq!(handles.hit_test(Pos2::new(200.0, 101.0)), Some(ResizeHandle::Top));
        assert_eq!(handles.hit_test(Pos2::new(200.0, 159.0)), Some(ResizeHandle::Bottom));
        assert_eq!(handles.hit_test(Pos2::new(200.0, 130.0)), None);
        assert_eq!(handles.hit_test(Pos2::new(50.0, 101.0)), None);
    }

    #[test]
    fn test_short_boxes_keep_a_body() {
        let rect = Rect::from_min_size(Pos2::new(0.0, 0.0), Vec2::new(100.0, 12.0));
        let handles = HandleRects::for_timed_event(rect);

        assert_eq!(handles.top.height(), 3.0);
        assert_eq!(handles.bottom.height(), 3.0);
        assert_eq!(handles.hit_test(Pos2::new(50.0, 6.0)), None);
    }
}
