//! folio-engine — the pagination core of the Folio resume editor.
//!
//! Takes a flat sequence of variable-height content blocks (rendered resume
//! fragments) and partitions them into fixed-height pages that emulate printed
//! A4/Letter paper, with widow/orphan policy: section headers are anchored to
//! their first follower and a near-empty trailing page is backfilled with one
//! block from its predecessor.
//!
//! Around the pure engine sit the pieces a live editor needs:
//!
//! - a closed content model and a template renderer seam ([`content`]),
//! - an off-screen height-measurement contract ([`layout::measure`]),
//! - a live/deferred scheduler that keeps typing latency at zero while reflow
//!   is debounced and sequence-token guarded ([`editor::scheduler`]),
//! - debounced, crash-safe autosave ([`editor::autosave`]).
//!
//! ```no_run
//! use std::sync::Arc;
//! use folio_engine::{Editor, EngineConfig, MetricsProbe, StandardTemplate};
//!
//! # async fn demo(content: folio_engine::ResumeContent) {
//! let editor = Editor::new(
//!     Arc::new(StandardTemplate::default()),
//!     Arc::new(MetricsProbe::new()),
//!     EngineConfig::default(),
//! );
//! editor.update_content(content); // visible immediately, reflow follows
//! let pages = editor.pages();
//! # }
//! ```

pub mod config;
pub mod content;
pub mod editor;
pub mod errors;
pub mod layout;
pub mod model;

pub use config::EngineConfig;
pub use content::{
    BlockMeta, BlockRenderer, ContactInfo, CustomEntry, EducationEntry, ExperienceEntry,
    ProjectEntry, RenderedBlock, ResumeContent, Section, SkillGroup, StandardTemplate,
};
pub use editor::{Autosaver, BackupStore, DocumentStore, Editor, PageView, ResumeDocument, ViewMode};
pub use errors::EngineError;
pub use layout::{
    default_page_config, paginate, FontFamily, HeightProbe, MetricsProbe, PageConfig, PageFormat,
    TextStyle,
};
pub use model::{Block, BlockKind, BlockRef, Page, PageLayout};
