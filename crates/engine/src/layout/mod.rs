// Layout core: page geometry, off-screen height measurement, and the pure
// pagination pass. Everything here is deterministic; scheduling lives in
// `crate::editor`.

pub mod engine;
pub mod geometry;
pub mod measure;

// Re-export the surface consumed by the editor and by hosts.
pub use engine::paginate;
pub use geometry::{default_page_config, PageConfig, PageFormat, BACKFILL_RATIO};
pub use measure::{FontFamily, HeightProbe, MetricsProbe, TextStyle};
