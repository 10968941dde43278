use std::collections::BTreeMap;

use egui::Color32;

use crate::models::occurrence::Occurrence;
use crate::models::settings::PaletteSettings;

pub(crate) fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

pub(crate) fn blend(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |c1: u8, c2: u8| -> u8 { ((c1 as f32 * (1.0 - t)) + (c2 as f32 * t)).round() as u8 };
    Color32::from_rgb(lerp(a.r(), b.r()), lerp(a.g(), b.g()), lerp(a.b(), b.b()))
}

/// Parse `#RRGGBB` or `#RGB`.
pub fn parse_color(hex: &str) -> Option<Color32> {
    let hex = hex.strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();

    match hex.len() {
        6 => Some(Color32::from_rgb(
            channel(hex.get(0..2)?)?,
            channel(hex.get(2..4)?)?,
            channel(hex.get(4..6)?)?,
        )),
        3 => {
            let short = |i: usize| channel(hex.get(i..i + 1)?).map(|v| v * 17);
            Some(Color32::from_rgb(short(0)?, short(1)?, short(2)?))
        }
        _ => None,
    }
}

/// Tag colors injected from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPalette {
    default: Color32,
    tags: BTreeMap<i64, Color32>,
}

impl Default for CategoryPalette {
    fn default() -> Self {
        Self::from_settings(&PaletteSettings::default())
    }
}

impl CategoryPalette {
    pub fn from_settings(settings: &PaletteSettings) -> Self {
        let default = parse_color(&settings.default_color).unwrap_or(Color32::from_rgb(100, 150, 200));
        let tags = settings
            .tags
            .iter()
            .filter_map(|(id, hex)| {
                let color = parse_color(hex);
                if color.is_none() {
                    log::warn!("Ignoring invalid palette color '{}' for tag {}", hex, id);
                }
                Some((id.parse::<i64>().ok()?, color?))
            })
            .collect();
        Self { default, tags }
    }

    pub fn default_color(&self) -> Color32 {
        self.default
    }

    pub fn tag_color(&self, tag_id: i64) -> Option<Color32> {
        self.tags.get(&tag_id).copied()
    }

    /// Explicit occurrence color, then the first colored tag, then the default.
    pub fn color_for(&self, occurrence: &Occurrence) -> Color32 {
        occurrence
            .color
            .as_deref()
            .and_then(parse_color)
            .or_else(|| {
                occurrence
                    .tag_ids
                    .iter()
                    .find_map(|id| self.tag_color(*id))
            })
            .unwrap_or(self.default)
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct TimeGridPalette {
    pub hour_bg: Color32,
    pub regular_bg: Color32,
    pub weekend_bg: Color32,
    pub hour_line: Color32,
    pub slot_line: Color32,
    pub divider: Color32,
    pub label: Color32,
    pub drop_indicator: Color32,
    pub preview_stroke: Color32,
    pub cross_day_stroke: Color32,
    pub event_text: Color32,
}

impl TimeGridPalette {
    pub fn from_visuals(visuals: &egui::Visuals) -> Self {
        let background = visuals.panel_fill;
        let border = visuals.widgets.noninteractive.bg_stroke.color;
        let accent = visuals.selection.bg_fill;
        Self {
            hour_bg: blend(background, visuals.extreme_bg_color, 0.4),
            regular_bg: background,
            weekend_bg: blend(background, visuals.faint_bg_color, 0.6),
            hour_line: border,
            slot_line: with_alpha(border, 90),
            divider: with_alpha(border, 220),
            label: visuals.weak_text_color(),
            drop_indicator: with_alpha(accent, if visuals.dark_mode { 70 } else { 45 }),
            preview_stroke: accent,
            cross_day_stroke: Color32::from_rgb(230, 160, 40),
            event_text: Color32::WHITE,
        }
    }
}
