// Settings module
// Grid geometry, snapping and palette configuration loaded from TOML

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tunables for the time grid. Serialized as the `[grid]` table of the
/// configuration file, with colors under `[palette]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Pixel height of one hour row
    pub hour_height: f32,
    /// Grid resolution in minutes
    pub snap_minutes: u32,
    /// Raw values within this many minutes of the current snap stay put
    pub dead_zone_minutes: u32,
    /// Shortest duration a resize may produce
    pub min_duration_minutes: u32,
    /// Minimum time between applied pointer updates
    pub frame_interval_ms: u64,
    pub days_visible: u32,
    /// 0 = Sunday, 1 = Monday
    pub first_day_of_week: u8,
    pub palette: PaletteSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteSettings {
    pub default_color: String,
    /// Tag id (as string key, TOML tables need string keys) to hex color
    pub tags: BTreeMap<String, String>,
}

impl Default for PaletteSettings {
    fn default() -> Self {
        Self {
            default_color: "#6496C8".to_string(),
            tags: BTreeMap::new(),
        }
    }
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            hour_height: 48.0,
            snap_minutes: 15,
            dead_zone_minutes: 5,
            min_duration_minutes: 15,
            frame_interval_ms: 16,
            days_visible: 7,
            first_day_of_week: 1,
            palette: PaletteSettings::default(),
        }
    }
}

impl GridSettings {
    pub fn validate(&self) -> Result<(), String> {
        if !self.hour_height.is_finite() || self.hour_height <= 0.0 {
            return Err("Hour height must be a positive number".to_string());
        }

        if self.snap_minutes == 0 || 60 % self.snap_minutes != 0 {
            return Err("Snap resolution must divide an hour (e.g. 5, 10, 15, 30)".to_string());
        }

        if self.dead_zone_minutes > 5 || self.dead_zone_minutes * 2 >= self.snap_minutes {
            return Err(
                "Dead zone must be at most 5 minutes and less than half the snap resolution"
                    .to_string(),
            );
        }

        if self.min_duration_minutes == 0 || self.min_duration_minutes > 12 * 60 {
            return Err("Minimum duration must be between 1 minute and 12 hours".to_string());
        }

        if self.days_visible == 0 || self.days_visible > 7 {
            return Err("Visible days must be between 1 and 7".to_string());
        }

        if self.first_day_of_week > 6 {
            return Err("First day of week must be between 0 (Sunday) and 6".to_string());
        }

        for (tag, color) in &self.palette.tags {
            if tag.parse::<i64>().is_err() {
                return Err(format!("Palette key '{}' is not a tag id", tag));
            }
            if !is_hex_color(color) {
                return Err(format!("Palette color '{}' is not #RRGGBB", color));
            }
        }
        if !is_hex_color(&self.palette.default_color) {
            return Err("Default palette color must be #RRGGBB".to_string());
        }

        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}
