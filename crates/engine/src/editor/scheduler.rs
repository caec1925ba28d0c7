//! Live/deferred rendering split.
//!
//! Two independent tracks keep typing latency at zero while reflow lags:
//!
//! - **Live track**: `update_content` replaces the live snapshot synchronously,
//!   and `pages()` re-renders fragments from it on every call. No debounce, no
//!   intermediate state — what is on screen is always the latest content.
//! - **Deferred track**: every change schedules a measurement+pagination pass
//!   behind a short debounce window; a newer change aborts the pending timer.
//!   Each pass carries a monotonically increasing sequence token and only a
//!   result newer than the last committed one is published, so an overlapping
//!   older pass can never clobber a newer layout.
//!
//! Recombination joins the structural snapshot (ids, heights, live indices)
//! with the live fragments, so page grouping may be ~100 ms stale after an
//! edit but the text inside the pages never is.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::content::{fallback_block, BlockRenderer, RenderedBlock, ResumeContent};
use crate::errors::EngineError;
use crate::layout::engine::paginate;
use crate::layout::geometry::{default_page_config, PageConfig};
use crate::layout::measure::{HeightProbe, TextStyle};
use crate::model::{Block, Page, PageLayout};

/// View mode supplied by the surrounding UI. Continuous mode bypasses the
/// pagination engine entirely and renders one unbounded page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Paginated,
    Continuous,
}

/// One on-screen page after recombination: the deferred structural grouping
/// joined with the current live fragments.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub blocks: Vec<RenderedBlock>,
    /// Measured height of the grouping, or `None` for an unbounded page
    /// (continuous mode, degenerate fallback, or before the first pass).
    pub height: Option<f64>,
    pub continued_section: Option<String>,
}

/// The editor core: live content, deferred layout, and the pass scheduler.
///
/// Cheap to clone (all clones share state). Methods that schedule passes must
/// be called from within a Tokio runtime.
#[derive(Clone)]
pub struct Editor {
    inner: Arc<EditorInner>,
}

struct EditorInner {
    renderer: RwLock<Arc<dyn BlockRenderer>>,
    probe: Arc<dyn HeightProbe>,
    config: EngineConfig,
    page: PageConfig,
    live: RwLock<ResumeContent>,
    view_mode: RwLock<ViewMode>,
    layout: Mutex<Option<PageLayout>>,
    /// Token issued to each scheduled pass.
    pass_seq: AtomicU64,
    /// Token of the last committed pass.
    last_applied: AtomicU64,
    /// Pending debounce timer; replaced (and the old one aborted) on every
    /// newer trigger.
    pending: Mutex<Option<JoinHandle<()>>>,
    /// The probe container is shared — one measurement in flight at a time.
    measure_gate: tokio::sync::Mutex<()>,
}

impl Editor {
    pub fn new(
        renderer: Arc<dyn BlockRenderer>,
        probe: Arc<dyn HeightProbe>,
        config: EngineConfig,
    ) -> Self {
        let page = default_page_config(config.page_format);
        Editor {
            inner: Arc::new(EditorInner {
                renderer: RwLock::new(renderer),
                probe,
                config,
                page,
                live: RwLock::new(ResumeContent::default()),
                view_mode: RwLock::new(ViewMode::Paginated),
                layout: Mutex::new(None),
                pass_seq: AtomicU64::new(0),
                last_applied: AtomicU64::new(0),
                pending: Mutex::new(None),
                measure_gate: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Live snapshot of the content.
    pub fn content(&self) -> ResumeContent {
        self.inner
            .live
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the live content. Takes effect on screen immediately; the
    /// structural reflow follows after the debounce window.
    pub fn update_content(&self, content: ResumeContent) {
        *self
            .inner
            .live
            .write()
            .unwrap_or_else(PoisonError::into_inner) = content;
        self.schedule_pass();
    }

    /// Swaps the template renderer. Triggers a fresh measurement pass since
    /// fragment heights are template-dependent.
    pub fn set_template(&self, renderer: Arc<dyn BlockRenderer>) {
        *self
            .inner
            .renderer
            .write()
            .unwrap_or_else(PoisonError::into_inner) = renderer;
        self.schedule_pass();
    }

    pub fn view_mode(&self) -> ViewMode {
        *self
            .inner
            .view_mode
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Switches between paginated and continuous rendering. Entering paginated
    /// mode schedules a pass so the layout is fresh.
    pub fn set_view_mode(&self, mode: ViewMode) {
        *self
            .inner
            .view_mode
            .write()
            .unwrap_or_else(PoisonError::into_inner) = mode;
        if mode == ViewMode::Paginated {
            self.schedule_pass();
        }
    }

    /// The last committed structural layout, if any pass has completed.
    pub fn layout(&self) -> Option<PageLayout> {
        self.inner
            .layout
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recombines the deferred page layout with the live content.
    ///
    /// Fragments are re-rendered from the live snapshot on every call; block
    /// descriptors resolve through `live_index`, so a descriptor whose block
    /// no longer exists (content shrank since the last pass) is dropped until
    /// the next reflow catches up.
    pub fn pages(&self) -> Vec<PageView> {
        let content = self.content();
        let renderer = self
            .inner
            .renderer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let Some(fragments) = renderer.render_blocks(&content) else {
            // Template without block-level rendering: one unbounded block.
            return vec![PageView {
                blocks: vec![fallback_block(&content)],
                height: None,
                continued_section: None,
            }];
        };

        if self.view_mode() == ViewMode::Continuous {
            return vec![PageView {
                blocks: fragments,
                height: None,
                continued_section: None,
            }];
        }

        match self.layout() {
            // First pass hasn't landed yet — show everything unbounded rather
            // than nothing.
            None => vec![PageView {
                blocks: fragments,
                height: None,
                continued_section: None,
            }],
            Some(layout) => layout
                .pages
                .iter()
                .map(|page| PageView {
                    blocks: page
                        .blocks
                        .iter()
                        .filter_map(|r| fragments.get(r.live_index).cloned())
                        .collect(),
                    height: Some(page.height),
                    continued_section: page.continued_section.clone(),
                })
                .collect(),
        }
    }

    /// Issues a fresh pass token and restarts the debounce timer. The
    /// previously pending timer, if any, is aborted — last write wins.
    fn schedule_pass(&self) {
        let seq = self.inner.pass_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let inner = Arc::clone(&self.inner);
        let debounce = Duration::from_millis(inner.config.measure_debounce_ms);

        let handle = tokio::spawn(async move {
            sleep(debounce).await;
            if let Err(e) = run_pass(&inner, seq).await {
                warn!(seq, error = %e, "measurement/pagination pass failed");
            }
        });

        let mut pending = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(old) = pending.replace(handle) {
            old.abort();
        }
    }
}

/// One deferred pass: render → measure → paginate → commit (if still newest).
async fn run_pass(inner: &Arc<EditorInner>, seq: u64) -> Result<(), EngineError> {
    if seq <= inner.last_applied.load(Ordering::SeqCst) {
        debug!(seq, "pass already superseded, dropping");
        return Ok(());
    }

    let _gate = inner.measure_gate.lock().await;

    // The deferred snapshot: content as of pass execution time.
    let content = inner
        .live
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    let renderer = inner
        .renderer
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    let Some(fragments) = renderer.render_blocks(&content) else {
        debug!(seq, "template has no block rendering; nothing to paginate");
        return Ok(());
    };

    // Typography of the pass: the template's font at the configured base size.
    let style = TextStyle {
        font: renderer.font(),
        font_size_px: inner.config.font_size_px,
    };

    let heights = match inner
        .probe
        .measure(&fragments, inner.page.content_width_px(), style)
        .await?
    {
        Some(heights) => heights,
        None => {
            debug!(seq, "probe not mounted; keeping previous layout, will retry");
            return Ok(());
        }
    };
    if heights.len() != fragments.len() {
        warn!(
            seq,
            fragments = fragments.len(),
            heights = heights.len(),
            "probe returned a partial measurement; skipping pass"
        );
        return Ok(());
    }

    let blocks: Vec<Block> = fragments
        .iter()
        .zip(heights.iter())
        .map(|(f, &h)| Block {
            id: f.meta.id.clone(),
            kind: f.meta.kind,
            height: h.max(0.0),
            section_id: f.meta.section_id.clone(),
            section_title: f.meta.section_title.clone(),
        })
        .collect();

    // CPU-bound packing runs off the async executor.
    let max_height = inner.page.max_page_height();
    let pages = tokio::task::spawn_blocking(move || paginate(&blocks, max_height))
        .await
        .map_err(|e| {
            EngineError::Internal(anyhow::anyhow!("spawn_blocking failed in pagination: {e}"))
        })?;

    inner.commit_layout(seq, pages);
    Ok(())
}

impl EditorInner {
    /// Publishes a pass result unless a newer pass already committed. The
    /// token check and the publication happen under one lock, so an older
    /// result can never land after a newer one.
    fn commit_layout(&self, seq: u64, pages: Vec<Page>) -> bool {
        let mut layout = self.layout.lock().unwrap_or_else(PoisonError::into_inner);
        let last = self.last_applied.load(Ordering::SeqCst);
        if seq <= last {
            debug!(seq, last_applied = last, "discarding stale pass result");
            return false;
        }
        self.last_applied.store(seq, Ordering::SeqCst);
        *layout = Some(PageLayout { pages, pass_seq: seq });
        true
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
