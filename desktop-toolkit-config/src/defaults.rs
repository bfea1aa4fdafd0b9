//! Default value functions for configuration.
//!
//! Used as `#[serde(default = "crate::defaults::...")]` attributes so a config
//! file only has to mention the settings it changes.

pub fn slow_item_warn_ms() -> u64 {
    100
}

pub fn window_title() -> String {
    "desktop-toolkit".to_string()
}

pub fn window_width() -> f64 {
    800.0
}

pub fn window_height() -> f64 {
    600.0
}

pub fn window_min_width() -> f64 {
    200.0
}

pub fn window_min_height() -> f64 {
    150.0
}
