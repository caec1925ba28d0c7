//! Block model — the atomic content unit of pagination and its derived views.
//!
//! A `Block` is a rendered resume fragment with a measured height. Pages are
//! derived, ephemeral groupings: every pagination pass rebuilds them from
//! scratch, and no page identity persists across passes except positionally.
//! A `PageLayout` snapshot stores only structural metadata (ids, heights, an
//! index back into the live fragment array) — never rendered content — so the
//! editor can recombine it with fresh content on every render.

use serde::{Deserialize, Serialize};

/// Closed set of semantic block kinds.
///
/// Kinds drive anchoring policy only (a `Header` must not be stranded at the
/// bottom of a page); layout math treats all kinds identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Header,
    Entry,
    Contact,
    Summary,
    Skills,
    Projects,
    Custom,
}

/// Atomic unit of page-fitting. Never split across pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Stable unique id within one pagination pass.
    pub id: String,
    pub kind: BlockKind,
    /// Rendered height in px at 1:1 scale, including vertical margins.
    /// `0.0` until first measured.
    pub height: f64,
    /// Logical resume section this block belongs to, when any. Used to detect
    /// a page break landing mid-section.
    pub section_id: Option<String>,
    /// Human-readable section label, rendered as a "(Continued)" marker when
    /// the section is split across pages.
    pub section_title: Option<String>,
}

/// Lightweight block descriptor stored in a page-layout snapshot.
///
/// `live_index` points back into the current live fragment array, so the
/// grouping can be recombined with up-to-the-keystroke content at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRef {
    pub id: String,
    pub kind: BlockKind,
    pub live_index: usize,
    pub height: f64,
    pub section_id: Option<String>,
    pub section_title: Option<String>,
}

impl BlockRef {
    /// Builds the descriptor for `block` at position `live_index` in the
    /// fragment array the pass was run over.
    pub fn of(live_index: usize, block: &Block) -> Self {
        BlockRef {
            id: block.id.clone(),
            kind: block.kind,
            live_index,
            height: block.height,
            section_id: block.section_id.clone(),
            section_title: block.section_title.clone(),
        }
    }
}

/// One page: an ordered, contiguous run of block descriptors plus the running
/// sum of their heights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub blocks: Vec<BlockRef>,
    pub height: f64,
    /// Section label to render as "(Continued)" when this page's first block
    /// continues a section the previous page break split.
    pub continued_section: Option<String>,
}

/// Output of one pagination pass. Supersedes the previous snapshot entirely;
/// there is no incremental patching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub pages: Vec<Page>,
    /// Sequence token of the pass that produced this snapshot. Monotonically
    /// increasing; the scheduler drops results carrying an older token.
    pub pass_seq: u64,
}
