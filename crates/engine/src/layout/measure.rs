//! Measurement probe — turns rendered fragments into real pixel heights.
//!
//! In the browser product this is an invisible, unscaled container kept at the
//! printed content width; heights are read back one rendering frame after the
//! probe content updates. Here the seam is the `HeightProbe` trait: a
//! DOM-backed implementation can await its frame, while `MetricsProbe` is a
//! deterministic headless model that estimates heights from font metrics.
//!
//! A probe that is not yet mounted reports `Ok(None)` — the caller skips the
//! pass and retries on the next trigger. That state is never an error.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::content::RenderedBlock;
use crate::errors::EngineError;
use crate::model::BlockKind;

/// Baseline line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.4;

// ────────────────────────────────────────────────────────────────────────────
// Probe seam
// ────────────────────────────────────────────────────────────────────────────

/// Typography applied to the probe container before reading heights. The font
/// family comes from the active template, the base size from the engine
/// config; both change fragment wrapping, so both travel with every call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font: FontFamily,
    pub font_size_px: f64,
}

/// Source of rendered block heights.
///
/// The returned height of each fragment is
/// `bounding box height + margin_top + margin_bottom`, in px at 1:1 scale,
/// laid out at `content_width_px` in `style` so wrapping matches the printed
/// page. One measurement is in flight at a time per editor; the probe
/// container is a shared resource.
#[async_trait]
pub trait HeightProbe: Send + Sync {
    /// Measures every fragment, in order. `Ok(None)` means the probe is not
    /// mounted yet and the pass should be skipped and retried later.
    async fn measure(
        &self,
        fragments: &[RenderedBlock],
        content_width_px: f64,
        style: TextStyle,
    ) -> Result<Option<Vec<f64>>, EngineError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Font metrics
// ────────────────────────────────────────────────────────────────────────────

/// Font families of the editor's template set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    Inter,
    EbGaramond,
    Lato,
    Oswald,
    ComputerModern,
}

/// Average-width font model, in em units. Block-height estimation needs line
/// counts, not per-glyph break quality, so averages are enough: the error is
/// within a line or two per page and the backfill/anchoring rules are
/// threshold-based, not exact.
#[derive(Debug, Clone, Copy)]
pub struct FontMetrics {
    pub average_char_width_em: f64,
    pub space_width_em: f64,
}

/// Per-family average widths, matching the template fonts.
pub fn metrics_for(font: FontFamily) -> FontMetrics {
    match font {
        FontFamily::Inter => FontMetrics { average_char_width_em: 0.52, space_width_em: 0.25 },
        FontFamily::EbGaramond => FontMetrics { average_char_width_em: 0.44, space_width_em: 0.21 },
        FontFamily::Lato => FontMetrics { average_char_width_em: 0.55, space_width_em: 0.26 },
        FontFamily::Oswald => FontMetrics { average_char_width_em: 0.35, space_width_em: 0.17 },
        FontFamily::ComputerModern => FontMetrics { average_char_width_em: 0.47, space_width_em: 0.23 },
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MetricsProbe
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic headless probe: greedy word-wrap line counting at the page
/// content width, plus per-kind vertical margins. Stateless apart from the
/// mounted flag; typography arrives with each call.
pub struct MetricsProbe {
    mounted: AtomicBool,
}

impl Default for MetricsProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProbe {
    /// A freshly built probe starts mounted.
    pub fn new() -> Self {
        MetricsProbe {
            mounted: AtomicBool::new(true),
        }
    }

    /// Simulates mount/unmount of the probe container (the container only
    /// exists once the host UI has attached it).
    pub fn set_mounted(&self, mounted: bool) {
        self.mounted.store(mounted, Ordering::SeqCst);
    }

    fn measure_fragment(fragment: &RenderedBlock, content_width_px: f64, style: TextStyle) -> f64 {
        let metrics = metrics_for(style.font);
        let lines: u32 = fragment
            .text
            .lines()
            .map(|line| wrapped_lines(line, &metrics, style.font_size_px, content_width_px))
            .sum::<u32>()
            .max(1);

        let line_height = match fragment.meta.kind {
            // Section headings render larger.
            BlockKind::Header => style.font_size_px * 1.3 * LINE_HEIGHT_FACTOR,
            _ => style.font_size_px * LINE_HEIGHT_FACTOR,
        };
        let (margin_top, margin_bottom) = vertical_margins(fragment.meta.kind);
        f64::from(lines) * line_height + margin_top + margin_bottom
    }
}

#[async_trait]
impl HeightProbe for MetricsProbe {
    async fn measure(
        &self,
        fragments: &[RenderedBlock],
        content_width_px: f64,
        style: TextStyle,
    ) -> Result<Option<Vec<f64>>, EngineError> {
        if !self.mounted.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(
            fragments
                .iter()
                .map(|f| Self::measure_fragment(f, content_width_px, style))
                .collect(),
        ))
    }
}

/// Vertical margins (top, bottom) per block kind, px.
fn vertical_margins(kind: BlockKind) -> (f64, f64) {
    match kind {
        BlockKind::Header => (18.0, 8.0),
        BlockKind::Contact => (0.0, 14.0),
        BlockKind::Summary => (0.0, 12.0),
        BlockKind::Entry | BlockKind::Projects | BlockKind::Custom => (0.0, 10.0),
        BlockKind::Skills => (0.0, 6.0),
    }
}

/// Greedy word-wrap line estimate for one hard line of text.
/// An empty line still occupies one line box.
fn wrapped_lines(
    text: &str,
    metrics: &FontMetrics,
    font_size_px: f64,
    max_width_px: f64,
) -> u32 {
    let words = text.split_whitespace();
    let space_w = metrics.space_width_em * font_size_px;
    let char_w = metrics.average_char_width_em * font_size_px;

    let mut lines = 1u32;
    let mut current = 0.0f64;
    let mut first = true;

    for word in words {
        let word_w = word.chars().count() as f64 * char_w;
        let lead = if first { 0.0 } else { space_w };

        if !first && current + lead + word_w > max_width_px {
            lines = lines.saturating_add(1);
            current = word_w;
        } else {
            current += lead + word_w;
            first = false;
        }
    }
    lines
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
