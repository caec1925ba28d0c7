//! Page geometry — derives the usable page capacity from the physical format.
//!
//! All heights in this crate are CSS pixels at 1:1 (unscaled) layout, so the
//! measured block heights and the capacity constant share a unit. At 96 dpi,
//! 1 mm ≈ 3.78 px; an A4 page (297 mm) is ~1122.7 px tall, and with 76 px of
//! fixed padding top and bottom the usable content height comes out at ~971 px.

use serde::{Deserialize, Serialize};

/// CSS reference pixel ratio at 96 dpi: 96 / 25.4.
pub const PX_PER_MM: f64 = 3.78;

/// A trailing page filled below this fraction of capacity is considered
/// near-empty and becomes a backfill candidate.
pub const BACKFILL_RATIO: f64 = 0.15;

/// Physical paper formats the editor emulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    A4,
    Letter,
}

impl PageFormat {
    pub fn width_mm(&self) -> f64 {
        match self {
            PageFormat::A4 => 210.0,
            PageFormat::Letter => 215.9,
        }
    }

    pub fn height_mm(&self) -> f64 {
        match self {
            PageFormat::A4 => 297.0,
            PageFormat::Letter => 279.4,
        }
    }
}

/// Geometry of one emulated page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    pub format: PageFormat,
    pub px_per_mm: f64,
    /// Fixed horizontal padding per side, px.
    pub padding_x_px: f64,
    /// Fixed vertical padding per side (top and bottom), px.
    pub padding_y_px: f64,
}

impl PageConfig {
    /// Usable content height of one page — the capacity constant fed to the
    /// pagination pass.
    pub fn max_page_height(&self) -> f64 {
        self.format.height_mm() * self.px_per_mm - 2.0 * self.padding_y_px
    }

    /// Content width the measurement probe must lay fragments out at, so
    /// word-wrapping matches the printed page.
    pub fn content_width_px(&self) -> f64 {
        self.format.width_mm() * self.px_per_mm - 2.0 * self.padding_x_px
    }
}

/// Default geometry for the given format: 96 dpi, 76 px padding on all sides.
pub fn default_page_config(format: PageFormat) -> PageConfig {
    PageConfig {
        format,
        px_per_mm: PX_PER_MM,
        padding_x_px: 76.0,
        padding_y_px: 76.0,
    }
}
