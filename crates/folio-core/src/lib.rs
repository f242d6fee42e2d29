//! Folio Core Library
//!
//! Document model, column layout, pagination and undo history for the Folio
//! resume editor. Rendering and measurement live outside this crate: callers
//! feed measured section heights in and get page assignments back.

pub mod config;
pub mod document;
pub mod editor;
pub mod heights;
pub mod history;
pub mod layout;
pub mod pagination;
pub mod section;
pub mod storage;
pub mod template;

pub use config::{ConfigError, EditorConfig};
pub use document::{
    DocumentError, PageSize, ResumeConfig, Settings, SettingsPatch, Styles, StylesPatch,
};
pub use editor::Editor;
pub use heights::HeightRegistry;
pub use history::{History, HistoryEntry};
pub use layout::{Layout, LayoutStructure};
pub use pagination::{Page, PageFlow, PaginationOptions, paginate, paginate_with};
pub use section::{ItemData, ItemId, Section, SectionId, SectionItem, SectionType, SectionVariant};
pub use storage::{AutoSaveManager, MemoryStorage, Storage, StorageError, StorageResult};
pub use template::{Template, builtin_templates, find_template, random_theme, theme_from_seed};
