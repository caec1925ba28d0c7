use anyhow::{Context, Result};

use crate::layout::geometry::PageFormat;

/// Engine runtime configuration.
///
/// Defaults suit a live editor: reflow lags typing by ~100 ms, autosave by a
/// couple of seconds. All values can be overridden via environment variables
/// (a `.env` file is honored when present).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Quiet period after an edit before a measurement+pagination pass runs.
    pub measure_debounce_ms: u64,
    /// Quiet period after an edit before an autosave write.
    pub autosave_debounce_ms: u64,
    pub page_format: PageFormat,
    /// Base font size the templates render at, px.
    pub font_size_px: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            measure_debounce_ms: 100,
            autosave_debounce_ms: 2_000,
            page_format: PageFormat::A4,
            font_size_px: 12.0,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = EngineConfig::default();
        Ok(EngineConfig {
            measure_debounce_ms: env_or("FOLIO_MEASURE_DEBOUNCE_MS", defaults.measure_debounce_ms)?,
            autosave_debounce_ms: env_or(
                "FOLIO_AUTOSAVE_DEBOUNCE_MS",
                defaults.autosave_debounce_ms,
            )?,
            page_format: match std::env::var("FOLIO_PAGE_FORMAT").ok().as_deref() {
                None | Some("a4") | Some("A4") => PageFormat::A4,
                Some("letter") | Some("Letter") => PageFormat::Letter,
                Some(other) => {
                    anyhow::bail!("FOLIO_PAGE_FORMAT must be 'a4' or 'letter', got '{other}'")
                }
            },
            font_size_px: env_or("FOLIO_FONT_SIZE_PX", defaults.font_size_px)?,
        })
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("'{key}' has an invalid value")),
        Err(_) => Ok(default),
    }
}
