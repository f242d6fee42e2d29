//! The editor store: the document being edited, its undo history and the
//! layout remembered across column-count changes.
//!
//! Every mutating action snapshots the document into history before it
//! changes anything. Actions that target a section or item that does not
//! exist are no-ops: they record nothing and change nothing, since the UI
//! may still be holding ids that a previous action removed.

use crate::config::EditorConfig;
use crate::document::{DocumentError, ResumeConfig, SettingsPatch, StylesPatch};
use crate::heights::HeightRegistry;
use crate::history::{History, HistoryEntry};
use crate::layout::{self, Layout, LayoutStructure, clamp_columns};
use crate::pagination::{Page, PaginationOptions, paginate_with};
use crate::section::{ItemData, ItemId, Section, SectionId, SectionType, SectionVariant};
use crate::template::Template;
use std::collections::HashMap;

/// Document state plus undo/redo, passed explicitly to whoever edits it.
#[derive(Debug, Clone)]
pub struct Editor {
    document: ResumeConfig,
    history: History,
    /// Two-column arrangement cached when collapsing to one column.
    previous_layout: Option<Layout>,
    config: EditorConfig,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(ResumeConfig::demo())
    }
}

impl Editor {
    /// Start editing `document` with the default configuration.
    pub fn new(document: ResumeConfig) -> Self {
        Self::with_config(document, &EditorConfig::default())
    }

    pub fn with_config(mut document: ResumeConfig, config: &EditorConfig) -> Self {
        document.validate_and_clean();
        Self {
            document,
            history: History::new(config.history_limit),
            previous_layout: None,
            config: config.clone(),
        }
    }

    /// Resume editing with an undo stack restored from storage, oldest
    /// first. Redo starts empty.
    pub fn with_history(
        document: ResumeConfig,
        past: Vec<HistoryEntry>,
        config: &EditorConfig,
    ) -> Self {
        let mut editor = Self::with_config(document, config);
        editor.history = History::with_past(past, config.history_limit);
        editor
    }

    pub fn document(&self) -> &ResumeConfig {
        &self.document
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Layout cached by the last collapse to one column.
    pub fn previous_layout(&self) -> Option<&Layout> {
        self.previous_layout.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn record(&mut self, action: impl Into<String>) {
        self.history.record(&self.document, action);
    }

    fn has_section(&self, id: &str) -> bool {
        if self.document.sections.contains_key(id) {
            true
        } else {
            log::debug!("Ignoring action on unknown section {}", id);
            false
        }
    }

    // --- Sections ---

    /// Add an empty section of `kind` at the end of the first column.
    ///
    /// If sections of this type already exist the title gets a number
    /// (`"Skills 2"`, `"Skills 3"`, ...).
    pub fn add_section(&mut self, kind: SectionType, title: &str) -> SectionId {
        self.record(format!("Add {}", title));

        let existing = self.document.count_of(kind);
        let title = if existing > 0 {
            format!("{} {}", title, existing + 1)
        } else {
            title.to_string()
        };
        let section = Section::new(kind, title);
        let id = section.id.clone();

        self.document.layout.append(0, id.clone());
        self.document.sections.insert(id.clone(), section);
        id
    }

    /// Delete a section and remove it from every column.
    pub fn delete_section(&mut self, id: &str) -> bool {
        if !self.has_section(id) {
            return false;
        }
        self.record("Delete Section");
        self.document.sections.remove(id);
        self.document.layout.remove(id);
        true
    }

    /// Show or hide a section. Hidden sections keep their place in the
    /// layout but are left out of pagination.
    pub fn toggle_section_visibility(&mut self, id: &str) -> bool {
        if !self.has_section(id) {
            return false;
        }
        self.record("Toggle Visibility");
        if let Some(section) = self.document.section_mut(id) {
            section.is_visible = !section.is_visible;
        }
        true
    }

    pub fn rename_section(&mut self, id: &str, title: &str) -> bool {
        if !self.has_section(id) {
            return false;
        }
        self.record("Rename Section");
        if let Some(section) = self.document.section_mut(id) {
            section.title = title.to_string();
        }
        true
    }

    /// Set presentation variants. Keys match a section id, or else every
    /// section whose type has that name.
    pub fn update_section_variants(&mut self, variants: &HashMap<String, SectionVariant>) {
        self.record("Layout Variant");
        self.apply_variants(variants);
    }

    fn apply_variants(&mut self, variants: &HashMap<String, SectionVariant>) {
        for section in self.document.sections.values_mut() {
            let variant = variants
                .get(&section.id)
                .or_else(|| variants.get(section.kind.as_str()));
            if let Some(variant) = variant {
                section.variant = *variant;
            }
        }
    }

    // --- Items ---

    /// Append an item built from the section type's defaults and `data`.
    pub fn add_section_item(&mut self, section_id: &str, data: ItemData) -> Option<ItemId> {
        if !self.has_section(section_id) {
            return None;
        }
        self.record("Add Item");
        self.document
            .section_mut(section_id)
            .map(|section| section.push_item(data))
    }

    pub fn remove_section_item(&mut self, section_id: &str, item_id: &str) -> bool {
        let exists = self
            .document
            .section(section_id)
            .is_some_and(|s| s.item(item_id).is_some());
        if !exists {
            log::debug!("Ignoring removal of unknown item {}/{}", section_id, item_id);
            return false;
        }
        self.record("Remove Item");
        self.document
            .section_mut(section_id)
            .and_then(|section| section.remove_item(item_id))
            .is_some()
    }

    /// Shallow-merge `data` into an item.
    pub fn update_section_data(&mut self, section_id: &str, item_id: &str, data: ItemData) -> bool {
        let exists = self
            .document
            .section(section_id)
            .is_some_and(|s| s.item(item_id).is_some());
        if !exists {
            log::debug!("Ignoring edit of unknown item {}/{}", section_id, item_id);
            return false;
        }
        self.record("Edit Content");
        self.document
            .section_mut(section_id)
            .is_some_and(|section| section.update_item(item_id, data))
    }

    // --- Layout ---

    /// Move a section to `target_index` in column `target_col`.
    pub fn move_section(
        &mut self,
        source_col: usize,
        target_col: usize,
        id: &str,
        target_index: usize,
    ) -> bool {
        if !self.has_section(id) {
            return false;
        }
        let columns = self.document.layout.column_count();
        if source_col >= columns || target_col >= columns {
            log::debug!(
                "Ignoring move of {} between columns {} and {} of {}",
                id,
                source_col,
                target_col,
                columns
            );
            return false;
        }
        self.record("Move Section");
        self.document.layout.move_section(source_col, target_col, id, target_index)
    }

    /// Apply a settings change, reflowing the layout if the column count
    /// changes.
    pub fn update_settings(&mut self, patch: &SettingsPatch) {
        self.record("Update Settings");
        self.apply_settings(patch);
    }

    fn apply_settings(&mut self, patch: &SettingsPatch) {
        let settings = &mut self.document.settings;
        if let Some(page_size) = patch.page_size {
            settings.page_size = page_size;
        }
        if let Some(margins) = patch.margins {
            settings.margins = margins;
        }
        if let Some(ratio) = patch.column_ratio {
            settings.column_ratio = ratio;
        }

        let from = clamp_columns(settings.columns);
        let to = match patch.columns {
            Some(requested) => {
                let to = clamp_columns(requested);
                if to != requested {
                    log::warn!("Unsupported column count {}; using {}", requested, to);
                }
                to
            }
            None => from,
        };
        settings.columns = to;

        if from != to {
            log::debug!("Reflowing layout from {} to {} column(s)", from, to);
        }
        self.document.layout = layout::reflow(
            &self.document.layout,
            from,
            to,
            &self.document.sections,
            &mut self.previous_layout,
        );
    }

    pub fn update_styles(&mut self, patch: &StylesPatch) {
        self.record("Update Styles");
        self.document.styles.apply(patch);
    }

    /// Rebuild the layout for a template structure.
    pub fn apply_template_layout(&mut self, structure: LayoutStructure) {
        self.record("Change Template Layout");
        self.document.layout =
            layout::apply_structure(&self.document.layout, structure, &self.document.sections);
        self.document.settings.columns = structure.column_count();
    }

    /// Apply a template's settings, styles and variants as one undoable
    /// action.
    pub fn apply_template(&mut self, template: &Template) {
        self.record(format!("Apply Template: {}", template.name));
        self.apply_settings(&template.settings);
        self.document.styles.apply(&template.styles);
        self.apply_variants(&template.section_variants);
        log::info!("Applied template {}", template.id);
    }

    // --- Whole document ---

    /// Replace the document. Dangling and repeated layout ids are cleaned
    /// first.
    pub fn set_document(&mut self, mut document: ResumeConfig) {
        document.validate_and_clean();
        self.record("Load Resume");
        self.document = document;
        self.previous_layout = None;
    }

    /// Import a document from JSON. On error the current document is left
    /// untouched.
    pub fn load_json(&mut self, json: &str) -> Result<(), DocumentError> {
        let document = ResumeConfig::import_json(json)?;
        log::info!("Imported document {}", document.id);
        self.set_document(document);
        Ok(())
    }

    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        self.document.to_json()
    }

    // --- History ---

    /// Undo the last change.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(&self.document) {
            Some(document) => {
                self.document = document;
                true
            }
            None => false,
        }
    }

    /// Redo the last undone change.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(&self.document) {
            Some(document) => {
                self.document = document;
                true
            }
            None => false,
        }
    }

    /// Jump to a saved snapshot. The jump can itself be undone.
    pub fn restore_version(&mut self, entry: &HistoryEntry) {
        self.document = self.history.restore(&self.document, entry);
    }

    // --- Pagination ---

    /// Page assignment of the current document for the given measurements.
    pub fn paginate(&self, heights: &HeightRegistry) -> Vec<Page> {
        let options = PaginationOptions::for_page(self.document.settings.page_size, &self.config);
        paginate_with(
            &self.document.layout.columns,
            heights.as_map(),
            &self.document.sections,
            &options,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PageFlow;
    use crate::template::find_template;
    use serde_json::{Value, json};
    use std::collections::HashSet;

    fn data(value: Value) -> ItemData {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn ids(values: &[&str]) -> Vec<SectionId> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn assert_exclusive(editor: &Editor) {
        let mut seen = HashSet::new();
        for id in editor.document().layout.ids() {
            assert!(seen.insert(id.clone()), "{id} appears twice");
        }
    }

    #[test]
    fn test_add_section_numbers_titles() {
        let mut editor = Editor::new(ResumeConfig::new());
        let a = editor.add_section(SectionType::Skills, "Skills");
        let b = editor.add_section(SectionType::Skills, "Skills");
        let c = editor.add_section(SectionType::Skills, "Skills");

        let doc = editor.document();
        assert_eq!(doc.section(&a).unwrap().title, "Skills");
        assert_eq!(doc.section(&b).unwrap().title, "Skills 2");
        assert_eq!(doc.section(&c).unwrap().title, "Skills 3");
        assert_eq!(doc.section(&a).unwrap().variant, SectionVariant::Tags);
        assert_eq!(doc.layout.columns[0], vec![a, b, c]);
        assert_eq!(editor.history().past()[0].action, "Add Skills");
    }

    #[test]
    fn test_add_section_goes_to_first_column() {
        let mut editor = Editor::default();
        let id = editor.add_section(SectionType::Projects, "Side Projects");
        let doc = editor.document();
        assert_eq!(doc.layout.columns[0].last(), Some(&id));
        assert_eq!(doc.section(&id).unwrap().variant, SectionVariant::Expanded);
    }

    #[test]
    fn test_delete_section() {
        let mut editor = Editor::default();
        assert!(editor.delete_section("skills"));
        assert!(editor.document().section("skills").is_none());
        assert!(!editor.document().layout.contains("skills"));

        let past = editor.history().past().len();
        assert!(!editor.delete_section("skills"));
        assert_eq!(editor.history().past().len(), past);
    }

    #[test]
    fn test_toggle_visibility_keeps_layout() {
        let mut editor = Editor::default();
        let layout = editor.document().layout.clone();
        assert!(editor.toggle_section_visibility("summary"));
        assert!(!editor.document().section("summary").unwrap().is_visible);
        assert_eq!(editor.document().layout, layout);

        let pages = editor.paginate(&HeightRegistry::new());
        assert!(pages.iter().flatten().flatten().all(|id| id != "summary"));

        assert!(!editor.toggle_section_visibility("ghost"));
    }

    #[test]
    fn test_item_operations() {
        let mut editor = Editor::default();
        let item = editor
            .add_section_item("experience", data(json!({ "company": "Initech" })))
            .unwrap();

        let section = editor.document().section("experience").unwrap();
        assert_eq!(section.items.len(), 2);
        assert_eq!(section.item(&item).unwrap().data["company"], json!("Initech"));
        assert_eq!(section.item(&item).unwrap().data["role"], json!("Title/Role"));

        assert!(editor.update_section_data("experience", &item, data(json!({ "role": "Lead" }))));
        let section = editor.document().section("experience").unwrap();
        assert_eq!(section.item(&item).unwrap().data["role"], json!("Lead"));
        assert_eq!(section.item(&item).unwrap().data["company"], json!("Initech"));

        assert!(editor.remove_section_item("experience", &item));
        assert_eq!(editor.document().section("experience").unwrap().items.len(), 1);
    }

    #[test]
    fn test_missing_targets_are_noops() {
        let mut editor = Editor::default();
        let before = editor.document().clone();

        assert!(editor.add_section_item("ghost", ItemData::new()).is_none());
        assert!(!editor.remove_section_item("experience", "ghost"));
        assert!(!editor.remove_section_item("ghost", "exp1"));
        assert!(!editor.update_section_data("skills", "ghost", ItemData::new()));
        assert!(!editor.move_section(0, 1, "ghost", 0));
        assert!(!editor.move_section(0, 5, "skills", 0));
        assert!(!editor.rename_section("ghost", "Boo"));

        assert_eq!(editor.document(), &before);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_move_section() {
        let mut editor = Editor::default();
        assert!(editor.move_section(0, 1, "skills", 1));
        let layout = &editor.document().layout;
        assert_eq!(layout.columns[0], ids(&["header", "summary", "languages"]));
        assert_eq!(layout.columns[1], ids(&["experience", "skills", "education", "projects"]));
        assert_exclusive(&editor);
    }

    #[test]
    fn test_column_toggle_restores_arrangement() {
        let mut editor = Editor::default();
        editor.move_section(0, 1, "summary", 0);
        let arranged = editor.document().layout.clone();

        editor.update_settings(&SettingsPatch::columns(1));
        assert_eq!(editor.document().settings.columns, 1);
        assert_eq!(editor.document().layout.column_count(), 1);
        assert_eq!(editor.previous_layout(), Some(&arranged));

        editor.update_settings(&SettingsPatch::columns(2));
        assert_eq!(editor.document().layout, arranged);
    }

    #[test]
    fn test_column_toggle_with_edits() {
        let mut editor = Editor::default();
        editor.update_settings(&SettingsPatch::columns(1));
        let added = editor.add_section(SectionType::Education, "Certifications");
        editor.delete_section("skills");
        editor.update_settings(&SettingsPatch::columns(2));

        let layout = &editor.document().layout;
        assert_eq!(layout.columns[0], ids(&["header", "summary", "languages"]));
        assert_eq!(layout.columns[1].last(), Some(&added));
        assert!(!layout.contains("skills"));
        assert_exclusive(&editor);
    }

    #[test]
    fn test_expand_without_cache_uses_type_split() {
        let mut doc = ResumeConfig::demo();
        doc.settings.columns = 1;
        doc.layout.flatten();
        let mut editor = Editor::new(doc);

        editor.update_settings(&SettingsPatch::columns(2));
        let layout = &editor.document().layout;
        // "languages" is a custom section
        assert_eq!(layout.columns[0], ids(&["header", "skills", "languages"]));
        assert_eq!(layout.columns[1], ids(&["summary", "experience", "education", "projects"]));
    }

    #[test]
    fn test_settings_without_column_change() {
        let mut editor = Editor::default();
        let layout = editor.document().layout.clone();
        editor.update_settings(&SettingsPatch {
            margins: Some(12.0),
            ..Default::default()
        });
        assert_eq!(editor.document().settings.margins, 12.0);
        assert_eq!(editor.document().layout, layout);

        editor.update_settings(&SettingsPatch::columns(7));
        assert_eq!(editor.document().settings.columns, 2);
        assert_eq!(editor.document().layout, layout);
    }

    #[test]
    fn test_undo_redo_symmetry() {
        let mut editor = Editor::default();
        let a = editor.add_section(SectionType::Languages, "Languages");
        editor.add_section_item(&a, ItemData::new());
        editor.move_section(0, 1, "header", 0);
        editor.update_settings(&SettingsPatch::columns(1));
        editor.toggle_section_visibility("projects");
        editor.update_styles(&StylesPatch {
            accent_color: Some("#111111".into()),
            ..Default::default()
        });
        let final_doc = editor.document().clone();
        let steps = editor.history().past().len();
        assert_eq!(steps, 6);

        for _ in 0..steps {
            assert!(editor.undo());
        }
        assert!(!editor.undo());
        assert_eq!(editor.document(), &ResumeConfig::demo());

        for _ in 0..steps {
            assert!(editor.redo());
        }
        assert!(!editor.redo());
        assert_eq!(editor.document(), &final_doc);
    }

    #[test]
    fn test_history_cap() {
        let mut editor = Editor::new(ResumeConfig::new());
        for n in 0..60 {
            editor.add_section(SectionType::Custom, &format!("Custom {n}"));
        }
        let past = editor.history().past();
        assert_eq!(past.len(), 50);
        assert_eq!(past[0].action, "Add Custom 10");
        assert_eq!(past[49].action, "Add Custom 59");
        // The oldest kept snapshot is the document before the eleventh add
        assert_eq!(past[0].document.sections.len(), 10);
    }

    #[test]
    fn test_configured_history_limit() {
        let config = EditorConfig {
            history_limit: 3,
            ..Default::default()
        };
        let mut editor = Editor::with_config(ResumeConfig::new(), &config);
        for _ in 0..5 {
            editor.add_section(SectionType::Summary, "Summary");
        }
        assert_eq!(editor.history().past().len(), 3);
    }

    #[test]
    fn test_with_history_can_undo_restored_edits() {
        let mut editor = Editor::default();
        editor.delete_section("skills");
        let past = editor.history().past().to_vec();

        let mut reopened = Editor::with_history(
            editor.document().clone(),
            past,
            &EditorConfig::default(),
        );
        assert!(reopened.can_undo());
        assert!(!reopened.can_redo());
        assert!(reopened.document().section("skills").is_none());

        assert!(reopened.undo());
        assert!(reopened.document().section("skills").is_some());
    }

    #[test]
    fn test_restore_version() {
        let mut editor = Editor::default();
        editor.delete_section("skills");
        editor.delete_section("summary");
        let first = editor.history().past()[0].clone();

        editor.restore_version(&first);
        assert!(editor.document().section("skills").is_some());
        assert!(editor.document().section("summary").is_some());
        assert!(!editor.can_redo());

        assert!(editor.undo());
        assert!(editor.document().section("skills").is_none());
    }

    #[test]
    fn test_load_json_rejects_without_mutation() {
        let mut editor = Editor::default();
        let before = editor.document().clone();

        assert!(editor.load_json(r#"{ "name": "no id" }"#).is_err());
        assert!(editor.load_json("garbage").is_err());
        assert_eq!(editor.document(), &before);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_load_json_replaces_and_is_undoable() {
        let mut editor = Editor::default();
        let json = r#"{
            "id": "imported",
            "settings": { "columns": 1 },
            "layout": { "columns": [["a", "zombie"]] },
            "sections": { "a": { "id": "a", "type": "summary", "title": "About" } }
        }"#;
        editor.load_json(json).unwrap();

        assert_eq!(editor.document().id, "imported");
        assert_eq!(editor.document().layout.columns, vec![ids(&["a"])]);
        assert_eq!(editor.history().past()[0].action, "Load Resume");

        assert!(editor.undo());
        assert_eq!(editor.document().id, "demo-1");
    }

    #[test]
    fn test_export_import_round_trip() {
        let editor = Editor::default();
        let json = editor.export_json().unwrap();
        let mut other = Editor::new(ResumeConfig::new());
        other.load_json(&json).unwrap();
        assert_eq!(other.document(), editor.document());
    }

    #[test]
    fn test_apply_template_reflows() {
        let mut editor = Editor::default();
        editor.move_section(0, 1, "languages", 0);
        let arranged = editor.document().layout.clone();

        let classic = find_template("classic").unwrap();
        editor.apply_template(&classic);
        let doc = editor.document();
        assert_eq!(doc.settings.columns, 1);
        assert_eq!(doc.layout.column_count(), 1);
        assert_eq!(doc.styles.font_family, "Merriweather");
        assert_eq!(doc.section("header").unwrap().variant, SectionVariant::Classic);
        assert_eq!(doc.section("skills").unwrap().variant, SectionVariant::List);
        assert_eq!(editor.history().past().last().unwrap().action, "Apply Template: Classic Pro");

        let modern = find_template("modern").unwrap();
        editor.apply_template(&modern);
        assert_eq!(editor.document().layout, arranged);
        assert_eq!(editor.document().settings.column_ratio, 35.0);

        assert!(editor.undo());
        assert_eq!(editor.document().styles.font_family, "Merriweather");
    }

    #[test]
    fn test_apply_template_layout() {
        let mut editor = Editor::default();
        editor.apply_template_layout(LayoutStructure::Single);
        assert_eq!(editor.document().settings.columns, 1);
        assert_eq!(
            editor.document().layout.columns,
            vec![ids(&[
                "header",
                "skills",
                "summary",
                "languages",
                "experience",
                "education",
                "projects"
            ])]
        );

        editor.apply_template_layout(LayoutStructure::Sidebar);
        assert_eq!(editor.document().settings.columns, 2);
        assert_eq!(
            editor.document().layout.columns[0],
            ids(&["header", "skills", "languages"])
        );
    }

    #[test]
    fn test_update_section_variants_by_id_and_type() {
        let mut editor = Editor::default();
        let mut variants = HashMap::new();
        variants.insert("summary".to_string(), SectionVariant::Minimal);
        variants.insert("experience".to_string(), SectionVariant::Compact);
        editor.update_section_variants(&variants);

        let doc = editor.document();
        assert_eq!(doc.section("summary").unwrap().variant, SectionVariant::Minimal);
        assert_eq!(doc.section("experience").unwrap().variant, SectionVariant::Compact);
        assert_eq!(doc.section("skills").unwrap().variant, SectionVariant::Tags);
    }

    #[test]
    fn test_end_to_end_pagination() {
        let mut editor = Editor::new(ResumeConfig::new());
        let header = editor.add_section(SectionType::Header, "Header");
        let exp = editor.add_section(SectionType::Experience, "Experience");
        let edu = editor.add_section(SectionType::Education, "Education");

        let mut flow = PageFlow::new(editor.config());
        flow.refresh(editor.document());
        assert_eq!(flow.page_count(), 1);

        flow.set_height(header.clone(), 100.0, editor.document());
        flow.set_height(exp.clone(), 900.0, editor.document());
        flow.set_height(edu.clone(), 300.0, editor.document());
        assert_eq!(flow.pages(), &[vec![vec![header.clone(), exp]], vec![vec![edu.clone()]]]);

        editor.toggle_section_visibility(&edu);
        flow.refresh(editor.document());
        assert_eq!(flow.page_count(), 1);
        assert_eq!(flow.locate(&header), Some((0, 0)));
    }
}
