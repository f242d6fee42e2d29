//! The resume document: settings, styles, layout and the normalized section
//! map, plus JSON import/export.

use crate::layout::{Layout, clamp_columns};
use crate::section::{Section, SectionId, SectionItem, SectionType, SectionVariant};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use uuid::Uuid;

/// Top-level keys an imported document must carry.
pub const REQUIRED_FIELDS: [&str; 2] = ["id", "sections"];

/// Errors raised when importing a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("Document must be a JSON object")]
    NotAnObject,
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),
    #[error("Invalid document: {0}")]
    Schema(#[source] serde_json::Error),
}

/// Physical page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    /// Page height in CSS pixels at 96 DPI.
    pub fn height_px(self) -> f64 {
        match self {
            PageSize::A4 => 1123.0,
            PageSize::Letter => 1056.0,
        }
    }
}

/// Page geometry and column arrangement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub page_size: PageSize,
    /// Page margins in millimetres.
    pub margins: f64,
    /// Number of layout columns, 1 or 2.
    pub columns: usize,
    /// Width of the first column as a percentage (e.g. 35 for 35/65).
    pub column_ratio: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margins: 20.0,
            columns: 1,
            column_ratio: 35.0,
        }
    }
}

/// Partial settings update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<PageSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margins: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_ratio: Option<f64>,
}

impl SettingsPatch {
    /// A patch that only changes the column count.
    pub fn columns(columns: usize) -> Self {
        Self {
            columns: Some(columns),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TitleStyle {
    Simple,
    Underline,
    Box,
    LeftBorder,
    Background,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleCase {
    Uppercase,
    Capitalize,
    None,
}

/// Typography and colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Styles {
    pub font_family: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_font_family: Option<String>,
    pub accent_color: String,
    pub base_font_size: f64,
    pub line_height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidebar_background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_title_align: Option<TitleAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_title_style: Option<TitleStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_title_case: Option<TitleCase>,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            font_family: "Inter".to_string(),
            heading_font_family: None,
            accent_color: "#3b82f6".to_string(),
            base_font_size: 14.0,
            line_height: 1.5,
            sidebar_background_color: None,
            page_background_color: None,
            section_title_align: None,
            section_title_style: None,
            section_title_case: None,
        }
    }
}

/// Partial styles update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StylesPatch {
    pub font_family: Option<String>,
    pub heading_font_family: Option<String>,
    pub accent_color: Option<String>,
    pub base_font_size: Option<f64>,
    pub line_height: Option<f64>,
    pub sidebar_background_color: Option<String>,
    pub page_background_color: Option<String>,
    pub section_title_align: Option<TitleAlign>,
    pub section_title_style: Option<TitleStyle>,
    pub section_title_case: Option<TitleCase>,
}

impl Styles {
    /// Overlay every field present in `patch`.
    pub fn apply(&mut self, patch: &StylesPatch) {
        if let Some(v) = &patch.font_family {
            self.font_family = v.clone();
        }
        if let Some(v) = &patch.heading_font_family {
            self.heading_font_family = Some(v.clone());
        }
        if let Some(v) = &patch.accent_color {
            self.accent_color = v.clone();
        }
        if let Some(v) = patch.base_font_size {
            self.base_font_size = v;
        }
        if let Some(v) = patch.line_height {
            self.line_height = v;
        }
        if let Some(v) = &patch.sidebar_background_color {
            self.sidebar_background_color = Some(v.clone());
        }
        if let Some(v) = &patch.page_background_color {
            self.page_background_color = Some(v.clone());
        }
        if patch.section_title_align.is_some() {
            self.section_title_align = patch.section_title_align;
        }
        if patch.section_title_style.is_some() {
            self.section_title_style = patch.section_title_style;
        }
        if patch.section_title_case.is_some() {
            self.section_title_case = patch.section_title_case;
        }
    }
}

fn default_name() -> String {
    "Untitled".to_string()
}

/// A complete resume document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeConfig {
    /// Unique document identifier.
    pub id: String,
    /// Document name.
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub styles: Styles,
    #[serde(default)]
    pub layout: Layout,
    /// Normalized section store, keyed by section id.
    pub sections: HashMap<SectionId, Section>,
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ResumeConfig {
    /// Create an empty single-column document.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: default_name(),
            settings: Settings::default(),
            styles: Styles::default(),
            layout: Layout::default(),
            sections: HashMap::new(),
        }
    }

    /// The two-column sample resume a fresh session starts from.
    pub fn demo() -> Self {
        let mut doc = Self {
            id: "demo-1".to_string(),
            name: "Modern Developer".to_string(),
            settings: Settings {
                columns: 2,
                ..Settings::default()
            },
            ..Self::new()
        };

        let mut add = |id: &str, kind, title: &str, variant, items: Vec<Value>| {
            let mut section = Section::with_id(id, kind, title);
            section.variant = variant;
            section.items = items
                .into_iter()
                .enumerate()
                .filter_map(|(n, data)| match data {
                    Value::Object(data) => Some(SectionItem {
                        id: format!("{}{}", id, n + 1),
                        is_visible: true,
                        data,
                    }),
                    _ => None,
                })
                .collect();
            doc.sections.insert(id.to_string(), section);
        };

        add(
            "header",
            SectionType::Header,
            "Profile",
            SectionVariant::Compact,
            vec![json!({ "name": "Alex Brown", "role": "Senior Frontend Engineer" })],
        );
        add(
            "summary",
            SectionType::Summary,
            "About Me",
            SectionVariant::Expanded,
            vec![json!({
                "text": "Passionate developer with 5 years of experience in React and Node.js."
            })],
        );
        add(
            "skills",
            SectionType::Skills,
            "Skills",
            SectionVariant::Tags,
            vec![
                json!({ "name": "React" }),
                json!({ "name": "TypeScript" }),
                json!({ "name": "Node.js" }),
            ],
        );
        add("languages", SectionType::Custom, "Languages", SectionVariant::List, Vec::new());
        add(
            "experience",
            SectionType::Experience,
            "Work Experience",
            SectionVariant::Expanded,
            vec![json!({ "role": "Senior Dev", "company": "TechCorp", "date": "2020-Present" })],
        );
        add("education", SectionType::Education, "Education", SectionVariant::Compact, Vec::new());
        add("projects", SectionType::Projects, "Projects", SectionVariant::Grid, Vec::new());

        doc.layout = Layout::new(vec![
            ["header", "skills", "summary", "languages"].map(String::from).to_vec(),
            ["experience", "education", "projects"].map(String::from).to_vec(),
        ]);
        doc
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.get(id)
    }

    pub fn section_mut(&mut self, id: &str) -> Option<&mut Section> {
        self.sections.get_mut(id)
    }

    /// Number of sections of the given type.
    pub fn count_of(&self, kind: SectionType) -> usize {
        self.sections.values().filter(|s| s.kind == kind).count()
    }

    /// Repair referential and structural inconsistencies:
    /// section keys and ids disagree, dangling layout ids, repeated layout
    /// ids, and a column count that does not match the settings.
    pub fn validate_and_clean(&mut self) {
        for (key, section) in self.sections.iter_mut() {
            if section.id != *key {
                log::warn!("Section keyed '{}' carries id '{}'; using the key", key, section.id);
                section.id = key.clone();
            }
        }

        let sections = &self.sections;
        let mut zombies = HashSet::new();
        self.layout.retain(|id| {
            let known = sections.contains_key(id);
            if !known {
                zombies.insert(id.clone());
            }
            known
        });
        if !zombies.is_empty() {
            log::warn!("Removed {} dangling section id(s) from layout", zombies.len());
        }

        let duplicates = self.layout.dedup();
        if duplicates > 0 {
            log::warn!("Removed {} repeated section id(s) from layout", duplicates);
        }

        let columns = clamp_columns(self.settings.columns);
        if columns != self.settings.columns {
            log::warn!("Unsupported column count {}; using {}", self.settings.columns, columns);
            self.settings.columns = columns;
        }
        if self.layout.column_count() != columns {
            log::warn!(
                "Layout has {} column(s) but settings ask for {}",
                self.layout.column_count(),
                columns
            );
            self.layout.conform_to(columns);
        }
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a document from JSON without validation.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse, validate and clean a document from user-supplied JSON.
    pub fn import_json(json: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(json).map_err(DocumentError::InvalidJson)?;
        let object = value.as_object().ok_or(DocumentError::NotAnObject)?;
        for field in REQUIRED_FIELDS {
            if !object.contains_key(field) {
                return Err(DocumentError::MissingField(field));
            }
        }

        let mut doc: Self = serde_json::from_value(value).map_err(DocumentError::Schema)?;
        doc.validate_and_clean();
        Ok(doc)
    }
}
