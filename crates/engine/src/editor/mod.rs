// Editor runtime: the live/deferred rendering split and debounced autosave.
// Everything here is scheduling; the pure layout math lives in `crate::layout`.

pub mod autosave;
pub mod scheduler;

pub use autosave::{Autosaver, BackupStore, DocumentStore, ResumeDocument};
pub use scheduler::{Editor, PageView, ViewMode};
