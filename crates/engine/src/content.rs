//! Resume content model and the template rendering seam.
//!
//! Section shapes form a closed tagged union — every template renderer must be
//! total over it, so an unhandled section kind is a compile error rather than
//! a runtime hole. Rendering is pure: the same content snapshot always yields
//! the same fragments, tagged with the metadata the pagination pass needs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::layout::measure::FontFamily;
use crate::model::BlockKind;

// ────────────────────────────────────────────────────────────────────────────
// Section payloads
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub links: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub id: Uuid,
    pub company: String,
    pub title: String,
    pub date_range: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub id: Uuid,
    pub school: String,
    pub degree: String,
    pub date_range: String,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGroup {
    pub name: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub bullets: Vec<String>,
}

/// Free-form user-defined entry. `data` carries whatever shape the custom
/// template section expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEntry {
    pub id: Uuid,
    pub title: String,
    pub data: Value,
}

/// Closed union over the logical resume section kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Section {
    Contact(ContactInfo),
    Summary { text: String },
    Experience { title: String, entries: Vec<ExperienceEntry> },
    Education { title: String, entries: Vec<EducationEntry> },
    Skills { title: String, groups: Vec<SkillGroup> },
    Projects { title: String, entries: Vec<ProjectEntry> },
    Custom { title: String, entries: Vec<CustomEntry> },
}

impl Section {
    /// Stable slug used to build section and block ids.
    pub fn kind_slug(&self) -> &'static str {
        match self {
            Section::Contact(_) => "contact",
            Section::Summary { .. } => "summary",
            Section::Experience { .. } => "experience",
            Section::Education { .. } => "education",
            Section::Skills { .. } => "skills",
            Section::Projects { .. } => "projects",
            Section::Custom { .. } => "custom",
        }
    }
}

/// The full editable document: an ordered list of sections, read top-to-bottom.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeContent {
    pub sections: Vec<Section>,
}

// ────────────────────────────────────────────────────────────────────────────
// Rendered fragments
// ────────────────────────────────────────────────────────────────────────────

/// Metadata tagged on the root of every rendered fragment. This is what the
/// measurement pass reads back to build blocks for pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockMeta {
    pub id: String,
    pub kind: BlockKind,
    pub section_id: Option<String>,
    pub section_title: Option<String>,
}

/// One renderable content fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedBlock {
    pub meta: BlockMeta,
    /// Fragment body. Lines are separated by `\n`; the probe word-wraps each
    /// line at the page content width.
    pub text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer seam
// ────────────────────────────────────────────────────────────────────────────

/// Template-specific block renderer.
///
/// Must be pure and deterministic for a given content snapshot. Held by the
/// editor as `Arc<dyn BlockRenderer>` and swappable at runtime (a template
/// switch re-triggers measurement and pagination).
pub trait BlockRenderer: Send + Sync {
    /// Renders the content into an ordered fragment list, each tagged with
    /// `(id, kind, section_id, section_title)`.
    ///
    /// Returns `None` when this template has no block-level rendering
    /// capability; the editor then renders the whole document as a single
    /// unbounded block with no internal pagination.
    fn render_blocks(&self, content: &ResumeContent) -> Option<Vec<RenderedBlock>>;

    /// Font family this template renders with; drives height measurement.
    fn font(&self) -> FontFamily {
        FontFamily::Inter
    }
}

/// Renders the whole document as one unbounded fragment — the fallback for
/// templates without block-level rendering.
pub fn fallback_block(content: &ResumeContent) -> RenderedBlock {
    let text = content
        .sections
        .iter()
        .map(section_plain_text)
        .collect::<Vec<_>>()
        .join("\n\n");
    RenderedBlock {
        meta: BlockMeta {
            id: "document".to_string(),
            kind: BlockKind::Custom,
            section_id: None,
            section_title: None,
        },
        text,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// StandardTemplate — default single-column renderer
// ────────────────────────────────────────────────────────────────────────────

/// Default template: one fragment per heading/entry, single column.
#[derive(Debug, Clone, Copy)]
pub struct StandardTemplate {
    pub font: FontFamily,
}

impl Default for StandardTemplate {
    fn default() -> Self {
        StandardTemplate { font: FontFamily::Inter }
    }
}

impl BlockRenderer for StandardTemplate {
    fn render_blocks(&self, content: &ResumeContent) -> Option<Vec<RenderedBlock>> {
        let mut out = Vec::new();
        for (pos, section) in content.sections.iter().enumerate() {
            render_section(pos, section, &mut out);
        }
        Some(out)
    }

    fn font(&self) -> FontFamily {
        self.font
    }
}

fn render_section(pos: usize, section: &Section, out: &mut Vec<RenderedBlock>) {
    let sid = format!("{}-{pos}", section.kind_slug());

    match section {
        Section::Contact(contact) => {
            let mut lines = vec![contact.full_name.clone(), contact.email.clone()];
            lines.extend(contact.phone.iter().cloned());
            lines.extend(contact.location.iter().cloned());
            lines.extend(contact.links.iter().cloned());
            out.push(fragment(&sid, "contact", None, BlockKind::Contact, lines.join("\n")));
        }

        Section::Summary { text } => {
            out.push(fragment(&sid, "body", None, BlockKind::Summary, text.clone()));
        }

        Section::Experience { title, entries } => {
            out.push(header(&sid, title));
            for entry in entries {
                let text = format!(
                    "{} — {}\n{}\n{}",
                    entry.title,
                    entry.company,
                    entry.date_range,
                    entry.bullets.join("\n")
                );
                out.push(entry_fragment(&sid, title, &entry.id, BlockKind::Entry, text));
            }
        }

        Section::Education { title, entries } => {
            out.push(header(&sid, title));
            for entry in entries {
                let text = format!(
                    "{} — {}\n{}\n{}",
                    entry.degree,
                    entry.school,
                    entry.date_range,
                    entry.notes.join("\n")
                );
                out.push(entry_fragment(&sid, title, &entry.id, BlockKind::Entry, text));
            }
        }

        Section::Skills { title, groups } => {
            out.push(header(&sid, title));
            for (i, group) in groups.iter().enumerate() {
                let text = format!("{}: {}", group.name, group.items.join(", "));
                out.push(RenderedBlock {
                    meta: BlockMeta {
                        id: format!("{sid}-group-{i}"),
                        kind: BlockKind::Skills,
                        section_id: Some(sid.clone()),
                        section_title: Some(title.clone()),
                    },
                    text,
                });
            }
        }

        Section::Projects { title, entries } => {
            out.push(header(&sid, title));
            for entry in entries {
                let text = format!(
                    "{}\n{}\n{}",
                    entry.name,
                    entry.description,
                    entry.bullets.join("\n")
                );
                out.push(entry_fragment(&sid, title, &entry.id, BlockKind::Projects, text));
            }
        }

        Section::Custom { title, entries } => {
            out.push(header(&sid, title));
            for entry in entries {
                let body = custom_entry_text(entry);
                out.push(entry_fragment(&sid, title, &entry.id, BlockKind::Custom, body));
            }
        }
    }
}

fn fragment(
    sid: &str,
    suffix: &str,
    title: Option<&str>,
    kind: BlockKind,
    text: String,
) -> RenderedBlock {
    RenderedBlock {
        meta: BlockMeta {
            id: format!("{sid}-{suffix}"),
            kind,
            section_id: Some(sid.to_string()),
            section_title: title.map(str::to_string),
        },
        text,
    }
}

fn header(sid: &str, title: &str) -> RenderedBlock {
    RenderedBlock {
        meta: BlockMeta {
            id: format!("{sid}-header"),
            kind: BlockKind::Header,
            section_id: Some(sid.to_string()),
            section_title: Some(title.to_string()),
        },
        text: title.to_string(),
    }
}

fn entry_fragment(
    sid: &str,
    title: &str,
    entry_id: &Uuid,
    kind: BlockKind,
    text: String,
) -> RenderedBlock {
    RenderedBlock {
        meta: BlockMeta {
            id: format!("{sid}-{entry_id}"),
            kind,
            section_id: Some(sid.to_string()),
            section_title: Some(title.to_string()),
        },
        text,
    }
}

fn custom_entry_text(entry: &CustomEntry) -> String {
    let body = match &entry.data {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    format!("{}\n{}", entry.title, body)
}

fn section_plain_text(section: &Section) -> String {
    match section {
        Section::Contact(c) => format!("{}\n{}", c.full_name, c.email),
        Section::Summary { text } => text.clone(),
        Section::Experience { title, entries } => format!(
            "{title}\n{}",
            entries
                .iter()
                .map(|e| format!("{} — {}\n{}", e.title, e.company, e.bullets.join("\n")))
                .collect::<Vec<_>>()
                .join("\n")
        ),
        Section::Education { title, entries } => format!(
            "{title}\n{}",
            entries
                .iter()
                .map(|e| format!("{} — {}", e.degree, e.school))
                .collect::<Vec<_>>()
                .join("\n")
        ),
        Section::Skills { title, groups } => format!(
            "{title}\n{}",
            groups
                .iter()
                .map(|g| format!("{}: {}", g.name, g.items.join(", ")))
                .collect::<Vec<_>>()
                .join("\n")
        ),
        Section::Projects { title, entries } => format!(
            "{title}\n{}",
            entries
                .iter()
                .map(|e| format!("{}\n{}", e.name, e.description))
                .collect::<Vec<_>>()
                .join("\n")
        ),
        Section::Custom { title, entries } => format!(
            "{title}\n{}",
            entries
                .iter()
                .map(custom_entry_text)
                .collect::<Vec<_>>()
                .join("\n")
        ),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
