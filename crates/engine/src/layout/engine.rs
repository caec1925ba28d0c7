//! Pagination engine — groups measured blocks into fixed-height pages.
//!
//! Pure and deterministic: identical blocks and capacity always produce the
//! identical page list. Blocks are atomic (never split) and never reordered;
//! the engine only chooses where the contiguous sequence breaks.
//!
//! # Packing rules
//! - Single left-to-right greedy pass: a block that would overflow the current
//!   non-empty page closes it and opens the next one.
//! - A block taller than the capacity is placed alone on its own page and
//!   allowed to overflow visually. Accepted degradation, not an error.
//! - Header anchoring: a `Header` block whose immediate follower would not fit
//!   with it breaks to the next page early, so a section title is never the
//!   last thing on a page.
//! - Anti-orphan backfill: after the greedy pass, if the final page is filled
//!   below `BACKFILL_RATIO` of capacity, one block is pulled from the tail of
//!   the second-to-last page — at most once, never cascading, and only when
//!   the move does not overflow the final page.

use tracing::{debug, warn};

use crate::layout::geometry::BACKFILL_RATIO;
use crate::model::{Block, BlockKind, BlockRef, Page};

/// Partitions `blocks`, in order, into pages of at most `max_page_height`.
///
/// Empty input yields an empty page list, not a single empty page.
pub fn paginate(blocks: &[Block], max_page_height: f64) -> Vec<Page> {
    if blocks.is_empty() {
        return Vec::new();
    }

    let mut pages: Vec<Page> = Vec::new();
    let mut current = Page::default();

    let mut iter = blocks.iter().enumerate().peekable();
    while let Some((index, block)) = iter.next() {
        // A header is anchored to its immediate follower: if header + follower
        // would not both fit here, break before the header instead of after it.
        let anchor_break = block.kind == BlockKind::Header
            && !current.blocks.is_empty()
            && iter.peek().map_or(false, |(_, next)| {
                current.height + block.height + next.height > max_page_height
            });

        let capacity_break =
            !current.blocks.is_empty() && current.height + block.height > max_page_height;

        if anchor_break || capacity_break {
            pages.push(std::mem::take(&mut current));
        }

        if current.blocks.is_empty() && block.height > max_page_height {
            warn!(
                id = %block.id,
                height = block.height,
                capacity = max_page_height,
                "block taller than page capacity, placing alone and letting it overflow"
            );
        }

        current.height += block.height;
        current.blocks.push(BlockRef::of(index, block));
    }
    if !current.blocks.is_empty() {
        pages.push(current);
    }

    backfill_last_page(&mut pages, max_page_height);
    mark_continued_sections(&mut pages);
    pages
}

/// Moves the tail block of the second-to-last page onto a near-empty final
/// page. Runs at most once per pass and never cascades to earlier pages.
fn backfill_last_page(pages: &mut Vec<Page>, max_page_height: f64) {
    if pages.len() < 2 {
        return;
    }

    let last = pages.len() - 1;
    let donor = pages.len() - 2;

    if pages[last].height >= BACKFILL_RATIO * max_page_height {
        return;
    }
    // The donor must keep at least one block.
    if pages[donor].blocks.len() <= 1 {
        return;
    }

    // A final page whose first block still fits on the donor was not opened
    // by a capacity break: either this step already balanced the layout, or
    // an anchored header opened the page. Leave both alone, so rerunning on a
    // balanced layout never cascades a second block down.
    let Some(first) = pages[last].blocks.first() else {
        return;
    };
    if pages[donor].height + first.height <= max_page_height {
        return;
    }

    let Some(candidate) = pages[donor].blocks.last().cloned() else {
        return;
    };
    if pages[last].height + candidate.height > max_page_height {
        debug!(
            moved_height = candidate.height,
            "backfill skipped: move would overflow the final page"
        );
        return;
    }

    pages[donor].blocks.pop();
    pages[donor].height -= candidate.height;
    pages[last].height += candidate.height;
    pages[last].blocks.insert(0, candidate);
}

/// Marks pages whose first block continues a section the previous page break
/// split, so the host can render a "(Continued)" label.
fn mark_continued_sections(pages: &mut [Page]) {
    for i in 1..pages.len() {
        let prev_section = pages[i - 1]
            .blocks
            .last()
            .and_then(|b| b.section_id.clone());

        let marker = match pages[i].blocks.first() {
            Some(first)
                if first.kind != BlockKind::Header
                    && first.section_id.is_some()
                    && first.section_id == prev_section =>
            {
                first.section_title.clone().or_else(|| first.section_id.clone())
            }
            _ => None,
        };
        pages[i].continued_section = marker;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: f64 = 971.0;

    fn block(id: &str, kind: BlockKind, height: f64) -> Block {
        Block {
            id: id.to_string(),
            kind,
            height,
            section_id: None,
            section_title: None,
        }
    }

    fn entry(id: &str, height: f64) -> Block {
        block(id, BlockKind::Entry, height)
    }

    fn sectioned(id: &str, kind: BlockKind, height: f64, section: &str, title: &str) -> Block {
        Block {
            id: id.to_string(),
            kind,
            height,
            section_id: Some(section.to_string()),
            section_title: Some(title.to_string()),
        }
    }

    fn page_ids(page: &Page) -> Vec<&str> {
        page.blocks.iter().map(|b| b.id.as_str()).collect()
    }

    // ── core packing ────────────────────────────────────────────────────────

    #[test]
    fn test_empty_input_yields_no_pages() {
        assert!(paginate(&[], MAX).is_empty());
    }

    #[test]
    fn test_everything_fits_on_one_page() {
        let blocks = vec![entry("a", 300.0), entry("b", 300.0), entry("c", 300.0)];
        let pages = paginate(&blocks, MAX);
        assert_eq!(pages.len(), 1);
        assert_eq!(page_ids(&pages[0]), vec!["a", "b", "c"]);
        assert_eq!(pages[0].height, 900.0);
    }

    #[test]
    fn test_three_400s_split_two_and_one() {
        // 800 fits; 1200 would not; the third block opens page 2 and is tall
        // enough (400 > 0.15 × 971) that backfill stays off.
        let blocks = vec![entry("b1", 400.0), entry("b2", 400.0), entry("b3", 400.0)];
        let pages = paginate(&blocks, MAX);
        assert_eq!(pages.len(), 2);
        assert_eq!(page_ids(&pages[0]), vec!["b1", "b2"]);
        assert_eq!(page_ids(&pages[1]), vec!["b3"]);
        assert_eq!(pages[0].height, 800.0);
        assert_eq!(pages[1].height, 400.0);
    }

    #[test]
    fn test_exact_fit_on_second_page() {
        // 900 + 900 breaks, but 900 + 50 = 950 ≤ 971 keeps b3 on page 2.
        let blocks = vec![entry("b1", 900.0), entry("b2", 900.0), entry("b3", 50.0)];
        let pages = paginate(&blocks, MAX);
        assert_eq!(pages.len(), 2);
        assert_eq!(page_ids(&pages[0]), vec!["b1"]);
        assert_eq!(page_ids(&pages[1]), vec!["b2", "b3"]);
        assert_eq!(pages[1].height, 950.0);
    }

    #[test]
    fn test_block_exactly_at_capacity_fits() {
        let blocks = vec![entry("a", MAX)];
        let pages = paginate(&blocks, MAX);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].height, MAX);
    }

    #[test]
    fn test_oversized_block_sits_alone_and_overflows() {
        let blocks = vec![entry("a", 500.0), entry("huge", 1200.0), entry("b", 300.0)];
        let pages = paginate(&blocks, MAX);
        assert_eq!(pages.len(), 3);
        assert_eq!(page_ids(&pages[1]), vec!["huge"]);
        assert!(pages[1].height > MAX, "oversized page is allowed to overflow");
        assert_eq!(page_ids(&pages[2]), vec!["b"]);
    }

    #[test]
    fn test_zero_height_blocks_stay_on_current_page() {
        let blocks = vec![entry("a", 971.0), entry("z1", 0.0), entry("z2", 0.0)];
        let pages = paginate(&blocks, MAX);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].blocks.len(), 3);
        assert_eq!(pages[0].height, 971.0);
    }

    // ── completeness / determinism properties ───────────────────────────────

    #[test]
    fn test_no_block_dropped_duplicated_or_reordered() {
        let blocks: Vec<Block> = (0..40)
            .map(|i| entry(&format!("b{i}"), 37.0 + (i as f64 * 53.0) % 400.0))
            .collect();
        let pages = paginate(&blocks, MAX);

        let flattened: Vec<&str> = pages.iter().flat_map(page_ids).collect();
        let expected: Vec<String> = (0..40).map(|i| format!("b{i}")).collect();
        assert_eq!(
            flattened,
            expected.iter().map(String::as_str).collect::<Vec<_>>()
        );

        // live_index runs 0..n in order across the concatenated pages
        let indices: Vec<usize> = pages
            .iter()
            .flat_map(|p| p.blocks.iter().map(|b| b.live_index))
            .collect();
        assert_eq!(indices, (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn test_every_page_within_capacity_or_singleton() {
        let blocks: Vec<Block> = (0..30)
            .map(|i| entry(&format!("b{i}"), 90.0 + (i as f64 * 211.0) % 1100.0))
            .collect();
        for page in paginate(&blocks, MAX) {
            assert!(
                page.height <= MAX || page.blocks.len() == 1,
                "page of {} blocks at height {} violates capacity",
                page.blocks.len(),
                page.height
            );
        }
    }

    #[test]
    fn test_same_input_twice_gives_identical_output() {
        let blocks: Vec<Block> = (0..25)
            .map(|i| entry(&format!("b{i}"), 55.5 + (i as f64 * 97.0) % 600.0))
            .collect();
        assert_eq!(paginate(&blocks, MAX), paginate(&blocks, MAX));
    }

    // ── header anchoring ────────────────────────────────────────────────────

    #[test]
    fn test_header_breaks_early_when_follower_would_not_fit() {
        // Greedy alone would leave the header as the last block of page 1.
        let blocks = vec![
            entry("intro", 500.0),
            block("head", BlockKind::Header, 100.0),
            entry("body", 400.0),
        ];
        let pages = paginate(&blocks, MAX);
        assert_eq!(pages.len(), 2);
        assert_eq!(page_ids(&pages[0]), vec!["intro"]);
        assert_eq!(page_ids(&pages[1]), vec!["head", "body"]);
    }

    #[test]
    fn test_header_stays_when_follower_fits() {
        let blocks = vec![
            entry("intro", 500.0),
            block("head", BlockKind::Header, 100.0),
            entry("body", 300.0),
        ];
        let pages = paginate(&blocks, MAX);
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_trailing_header_with_no_follower_uses_plain_capacity_rule() {
        // Nothing to anchor to — the header simply fills the remaining space.
        let blocks = vec![entry("intro", 500.0), block("head", BlockKind::Header, 100.0)];
        let pages = paginate(&blocks, MAX);
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_no_page_ends_with_a_followed_header() {
        let blocks: Vec<Block> = (0..24)
            .flat_map(|i| {
                vec![
                    block(&format!("h{i}"), BlockKind::Header, 60.0),
                    entry(&format!("e{i}"), 120.0 + (i as f64 * 71.0) % 300.0),
                ]
            })
            .collect();
        let pages = paginate(&blocks, MAX);
        assert!(pages.len() > 1, "fixture should span multiple pages");
        for page in &pages[..pages.len() - 1] {
            let last = page.blocks.last().expect("pages are non-empty");
            assert_ne!(
                last.kind,
                BlockKind::Header,
                "header {} stranded at the bottom of a page",
                last.id
            );
        }
    }

    // ── anti-orphan backfill ────────────────────────────────────────────────

    #[test]
    fn test_backfill_moves_one_block_onto_sparse_last_page() {
        // Greedy: [450, 450] then [100]. 100 < 145.65 and the donor holds two
        // blocks, so its tail moves; 450 + 100 = 550 ≤ 971.
        let blocks = vec![entry("a", 450.0), entry("b", 450.0), entry("c", 100.0)];
        let pages = paginate(&blocks, MAX);
        assert_eq!(pages.len(), 2);
        assert_eq!(page_ids(&pages[0]), vec!["a"]);
        assert_eq!(page_ids(&pages[1]), vec!["b", "c"]);
        assert_eq!(pages[0].height, 450.0);
        assert_eq!(pages[1].height, 550.0);
    }

    #[test]
    fn test_backfill_skipped_when_move_would_overflow() {
        // Greedy: [30, 940] then [100]. Moving the 940 block would put the
        // last page at 1040 > 971, so the sparse page stays sparse.
        let blocks = vec![entry("a", 30.0), entry("b", 940.0), entry("c", 100.0)];
        let pages = paginate(&blocks, MAX);
        assert_eq!(pages.len(), 2);
        assert_eq!(page_ids(&pages[0]), vec!["a", "b"]);
        assert_eq!(page_ids(&pages[1]), vec!["c"]);
    }

    #[test]
    fn test_backfill_skipped_when_donor_has_single_block() {
        let blocks = vec![entry("a", 950.0), entry("b", 100.0)];
        let pages = paginate(&blocks, MAX);
        assert_eq!(pages.len(), 2);
        assert_eq!(page_ids(&pages[0]), vec!["a"]);
        assert_eq!(page_ids(&pages[1]), vec!["b"]);
    }

    #[test]
    fn test_backfill_skipped_when_last_page_full_enough() {
        // 400 is 41% of capacity — well above the 15% threshold.
        let blocks = vec![entry("a", 400.0), entry("b", 400.0), entry("c", 400.0)];
        let pages = paginate(&blocks, MAX);
        assert_eq!(pages[1].blocks.len(), 1);
    }

    #[test]
    fn test_backfill_not_triggered_on_single_page() {
        let blocks = vec![entry("a", 50.0), entry("b", 20.0)];
        let pages = paginate(&blocks, MAX);
        assert_eq!(pages.len(), 1, "a lone sparse page is left alone");
    }

    #[test]
    fn test_backfill_is_idempotent() {
        let blocks = vec![entry("a", 450.0), entry("b", 450.0), entry("c", 100.0)];
        let mut once = paginate(&blocks, MAX);
        let snapshot = once.clone();
        backfill_last_page(&mut once, MAX);
        assert_eq!(once, snapshot, "a second backfill run must change nothing");
    }

    #[test]
    fn test_backfill_never_cascades_on_still_sparse_last_page() {
        // Greedy: [900, 60, 5] then [100]. The move lands "c" on the last
        // page, which at 105 px is still under the 15% threshold — a rerun
        // must not pull "b" down as well.
        let blocks = vec![
            entry("a", 900.0),
            entry("b", 60.0),
            entry("c", 5.0),
            entry("d", 100.0),
        ];
        let mut pages = paginate(&blocks, MAX);
        assert_eq!(page_ids(&pages[0]), vec!["a", "b"]);
        assert_eq!(page_ids(&pages[1]), vec!["c", "d"]);

        let snapshot = pages.clone();
        backfill_last_page(&mut pages, MAX);
        assert_eq!(pages, snapshot, "one block per pass, even below threshold");
    }

    // ── continued-section markers ───────────────────────────────────────────

    #[test]
    fn test_split_section_marks_continuation() {
        let blocks = vec![
            sectioned("h", BlockKind::Header, 60.0, "experience", "Experience"),
            sectioned("e1", BlockKind::Entry, 500.0, "experience", "Experience"),
            sectioned("e2", BlockKind::Entry, 500.0, "experience", "Experience"),
        ];
        let pages = paginate(&blocks, MAX);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].continued_section, None);
        assert_eq!(pages[1].continued_section.as_deref(), Some("Experience"));
    }

    #[test]
    fn test_new_section_on_next_page_is_not_marked_continued() {
        let blocks = vec![
            sectioned("h1", BlockKind::Header, 60.0, "experience", "Experience"),
            sectioned("e1", BlockKind::Entry, 800.0, "experience", "Experience"),
            sectioned("h2", BlockKind::Header, 60.0, "education", "Education"),
            sectioned("e2", BlockKind::Entry, 200.0, "education", "Education"),
        ];
        let pages = paginate(&blocks, MAX);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].continued_section, None);
    }
}
