use crate::storage::{ClientStore, KEY_PDF_COLOR_MODE, KEY_PDF_SCROLL, KEY_PDF_ZOOM};
use serde::{Deserialize, Serialize};

pub const ZOOM_MIN: f64 = 0.25;
pub const ZOOM_MAX: f64 = 4.0;
pub const ZOOM_STEP: f64 = 0.25;
pub const ZOOM_DEFAULT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Light,
    Dark,
}

impl ColorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMode::Light => "light",
            ColorMode::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            ColorMode::Light => ColorMode::Dark,
            ColorMode::Dark => ColorMode::Light,
        }
    }
}

/// PDF view state: zoom, scroll position and color mode, persisted
/// best-effort in the client store.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    zoom: f64,
    scroll: (f64, f64),
    color_mode: ColorMode,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            zoom: ZOOM_DEFAULT,
            scroll: (0.0, 0.0),
            color_mode: ColorMode::Light,
        }
    }
}

impl ViewerState {
    /// Restore persisted view state; absent keys fall back to defaults.
    pub fn load(store: &ClientStore) -> Self {
        Self {
            zoom: store
                .get::<f64>(KEY_PDF_ZOOM)
                .map(clamp_zoom)
                .unwrap_or(ZOOM_DEFAULT),
            scroll: store.get(KEY_PDF_SCROLL).unwrap_or((0.0, 0.0)),
            color_mode: store.get(KEY_PDF_COLOR_MODE).unwrap_or_default(),
        }
    }

    pub fn persist(&self, store: &mut ClientStore) {
        store.set(KEY_PDF_ZOOM, &self.zoom);
        store.set(KEY_PDF_SCROLL, &self.scroll);
        store.set(KEY_PDF_COLOR_MODE, &self.color_mode);
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = clamp_zoom(zoom);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    pub fn scroll(&self) -> (f64, f64) {
        self.scroll
    }

    pub fn set_scroll(&mut self, x: f64, y: f64) {
        self.scroll = (x.max(0.0), y.max(0.0));
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.color_mode = mode;
    }

    pub fn toggle_color_mode(&mut self) {
        self.color_mode = self.color_mode.toggled();
    }
}

fn clamp_zoom(zoom: f64) -> f64 {
    zoom.clamp(ZOOM_MIN, ZOOM_MAX)
}
