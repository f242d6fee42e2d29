//! Resume sections and their repeatable items.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Identifier of a section. Stable across moves between columns.
pub type SectionId = String;

/// Identifier of an item inside a section.
pub type ItemId = String;

/// Free-form content of an item (e.g. role, company, date).
pub type ItemData = serde_json::Map<String, Value>;

/// The closed set of section kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Header,
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    Languages,
    Custom,
}

impl SectionType {
    /// All section types in declaration order.
    pub const ALL: [SectionType; 8] = [
        SectionType::Header,
        SectionType::Summary,
        SectionType::Experience,
        SectionType::Education,
        SectionType::Skills,
        SectionType::Projects,
        SectionType::Languages,
        SectionType::Custom,
    ];

    /// Name used in persisted documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Header => "header",
            SectionType::Summary => "summary",
            SectionType::Experience => "experience",
            SectionType::Education => "education",
            SectionType::Skills => "skills",
            SectionType::Projects => "projects",
            SectionType::Languages => "languages",
            SectionType::Custom => "custom",
        }
    }

    /// Variant given to a freshly added section of this type.
    pub fn default_variant(self) -> SectionVariant {
        match self {
            SectionType::Skills => SectionVariant::Tags,
            _ => SectionVariant::Expanded,
        }
    }

    /// Whether sections of this type belong in the sidebar column when a
    /// single column is split in two without a remembered arrangement.
    pub fn is_sidebar(self) -> bool {
        matches!(
            self,
            SectionType::Header | SectionType::Skills | SectionType::Languages | SectionType::Custom
        )
    }

    /// Default fields for a new item of this section type.
    pub fn default_item_data(self) -> ItemData {
        ITEM_FACTORIES
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, factory)| factory())
            .unwrap_or_default()
    }
}

/// Presentation style of a section. Carried through layout and pagination
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionVariant {
    Compact,
    #[default]
    Expanded,
    Grid,
    Minimal,
    Classic,
    Tags,
    List,
    Sidebar,
    Modern,
    Simple,
    Centered,
}

type ItemFactory = fn() -> ItemData;

/// Default-item factories keyed by section type. Types without an entry
/// start their items empty.
const ITEM_FACTORIES: &[(SectionType, ItemFactory)] = &[
    (SectionType::Skills, named_item),
    (SectionType::Languages, named_item),
    (SectionType::Custom, named_item),
    (SectionType::Experience, role_item),
    (SectionType::Projects, role_item),
    (SectionType::Education, education_item),
];

fn fields(pairs: &[(&str, &str)]) -> ItemData {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
        .collect()
}

fn named_item() -> ItemData {
    fields(&[("name", "New Item")])
}

fn role_item() -> ItemData {
    fields(&[
        ("role", "Title/Role"),
        ("company", "Company/Project"),
        ("date", "Date"),
        ("description", "Description..."),
    ])
}

fn education_item() -> ItemData {
    fields(&[("school", "School Name"), ("degree", "Degree"), ("year", "Year")])
}

/// Shallow merge: every key in `patch` overwrites the key in `target`.
pub fn merge_data(target: &mut ItemData, patch: ItemData) {
    for (key, value) in patch {
        target.insert(key, value);
    }
}

fn default_visible() -> bool {
    true
}

/// A repeatable sub-entry of a section (one job, one school, one skill).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionItem {
    pub id: ItemId,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub data: ItemData,
}

impl SectionItem {
    /// Create a visible item with a fresh id.
    pub fn new(data: ItemData) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            is_visible: true,
            data,
        }
    }
}

/// A named, typed content block of the resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: SectionId,
    #[serde(rename = "type")]
    pub kind: SectionType,
    pub title: String,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub variant: SectionVariant,
    #[serde(default)]
    pub items: Vec<SectionItem>,
}

impl Section {
    /// Create an empty, visible section with a fresh id and the type's
    /// default variant.
    pub fn new(kind: SectionType, title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), kind, title)
    }

    /// Create an empty, visible section with the given id.
    pub fn with_id(id: impl Into<SectionId>, kind: SectionType, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            is_visible: true,
            variant: kind.default_variant(),
            items: Vec::new(),
        }
    }

    pub fn item(&self, item_id: &str) -> Option<&SectionItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: &str) -> Option<&mut SectionItem> {
        self.items.iter_mut().find(|item| item.id == item_id)
    }

    /// Append an item built from the type defaults overlaid with `overrides`.
    /// Returns the new item's id.
    pub fn push_item(&mut self, overrides: ItemData) -> ItemId {
        let mut data = self.kind.default_item_data();
        merge_data(&mut data, overrides);
        let item = SectionItem::new(data);
        let id = item.id.clone();
        self.items.push(item);
        id
    }

    /// Remove an item by id.
    pub fn remove_item(&mut self, item_id: &str) -> Option<SectionItem> {
        let index = self.items.iter().position(|item| item.id == item_id)?;
        Some(self.items.remove(index))
    }

    /// Shallow-merge `patch` into an item's data.
    /// Returns false if the item does not exist.
    pub fn update_item(&mut self, item_id: &str, patch: ItemData) -> bool {
        match self.item_mut(item_id) {
            Some(item) => {
                merge_data(&mut item.data, patch);
                true
            }
            None => false,
        }
    }
}
