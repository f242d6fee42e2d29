//! Template catalog.
//!
//! A template combines a page layout (column count, ratio, margins) with a
//! theme (typography, colors, per-section variants). Applying one goes
//! through the same settings path as a manual change, so switching between
//! one and two columns reflows the layout.

use crate::document::{PageSize, SettingsPatch, StylesPatch, TitleAlign, TitleCase, TitleStyle};
use crate::section::SectionVariant;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A flattened template, ready to apply to a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub settings: SettingsPatch,
    #[serde(default)]
    pub styles: StylesPatch,
    /// Variants keyed by section id or section type name.
    #[serde(default)]
    pub section_variants: HashMap<String, SectionVariant>,
}

struct Theme {
    styles: StylesPatch,
    variants: [(&'static str, SectionVariant); 4],
}

fn layout(columns: usize, column_ratio: Option<f64>, margins: f64) -> SettingsPatch {
    SettingsPatch {
        page_size: Some(PageSize::A4),
        margins: Some(margins),
        columns: Some(columns),
        column_ratio,
    }
}

fn single_col() -> SettingsPatch {
    layout(1, None, 25.0)
}

fn sidebar() -> SettingsPatch {
    layout(2, Some(35.0), 20.0)
}

fn narrow_sidebar() -> SettingsPatch {
    layout(2, Some(25.0), 20.0)
}

fn compact_single() -> SettingsPatch {
    layout(1, None, 15.0)
}

#[allow(clippy::too_many_arguments)]
fn styles(
    font: &str,
    heading: &str,
    accent: &str,
    size: f64,
    line_height: f64,
    page_bg: &str,
    sidebar_bg: &str,
    title: (TitleAlign, TitleStyle, TitleCase),
) -> StylesPatch {
    StylesPatch {
        font_family: Some(font.to_string()),
        heading_font_family: Some(heading.to_string()),
        accent_color: Some(accent.to_string()),
        base_font_size: Some(size),
        line_height: Some(line_height),
        page_background_color: Some(page_bg.to_string()),
        sidebar_background_color: Some(sidebar_bg.to_string()),
        section_title_align: Some(title.0),
        section_title_style: Some(title.1),
        section_title_case: Some(title.2),
    }
}

fn variants(
    header: SectionVariant,
    experience: SectionVariant,
    skills: SectionVariant,
    summary: SectionVariant,
) -> [(&'static str, SectionVariant); 4] {
    [
        ("header", header),
        ("experience", experience),
        ("skills", skills),
        ("summary", summary),
    ]
}

fn classic() -> Theme {
    use SectionVariant::*;
    Theme {
        styles: styles(
            "Merriweather",
            "Merriweather",
            "#2c3e50",
            11.0,
            1.6,
            "#ffffff",
            "#ffffff",
            (TitleAlign::Center, TitleStyle::Background, TitleCase::Uppercase),
        ),
        variants: variants(Classic, Classic, List, Classic),
    }
}

fn modern() -> Theme {
    use SectionVariant::*;
    Theme {
        styles: styles(
            "Open Sans",
            "Montserrat",
            "#2563eb",
            10.5,
            1.5,
            "#ffffff",
            "#f1f5f9",
            (TitleAlign::Left, TitleStyle::Simple, TitleCase::Capitalize),
        ),
        variants: variants(Sidebar, Modern, Tags, Modern),
    }
}

fn minimal() -> Theme {
    use SectionVariant::*;
    Theme {
        styles: styles(
            "Inter",
            "Inter",
            "#18181b",
            10.0,
            1.6,
            "#ffffff",
            "#ffffff",
            (TitleAlign::Left, TitleStyle::Underline, TitleCase::Uppercase),
        ),
        variants: variants(Simple, Compact, List, Simple),
    }
}

fn creative() -> Theme {
    use SectionVariant::*;
    Theme {
        styles: styles(
            "Lato",
            "Playfair Display",
            "#7c3aed",
            11.0,
            1.5,
            "#ffffff",
            "#ffffff",
            (TitleAlign::Center, TitleStyle::Box, TitleCase::Uppercase),
        ),
        variants: variants(Centered, Modern, Grid, Centered),
    }
}

fn professional() -> Theme {
    use SectionVariant::*;
    Theme {
        styles: styles(
            "Calibri",
            "Roboto",
            "#0f172a",
            10.5,
            1.45,
            "#ffffff",
            "#ffffff",
            (TitleAlign::Left, TitleStyle::LeftBorder, TitleCase::Uppercase),
        ),
        variants: variants(Simple, Classic, List, Simple),
    }
}

fn technical() -> Theme {
    use SectionVariant::*;
    Theme {
        styles: styles(
            "Roboto",
            "Roboto",
            "#059669",
            10.0,
            1.4,
            "#ffffff",
            "#ffffff",
            (TitleAlign::Left, TitleStyle::Simple, TitleCase::Uppercase),
        ),
        variants: variants(Compact, Modern, Grid, Simple),
    }
}

fn executive() -> Theme {
    use SectionVariant::*;
    Theme {
        styles: styles(
            "Georgia",
            "Merriweather",
            "#78350f",
            11.0,
            1.6,
            "#fffbf0",
            "#fffbf0",
            (TitleAlign::Center, TitleStyle::Background, TitleCase::Uppercase),
        ),
        variants: variants(Centered, Classic, Grid, Expanded),
    }
}

fn compose(id: &str, name: &str, settings: SettingsPatch, theme: Theme) -> Template {
    Template {
        id: id.to_string(),
        name: name.to_string(),
        settings,
        styles: theme.styles,
        section_variants: theme
            .variants
            .into_iter()
            .map(|(key, variant)| (key.to_string(), variant))
            .collect(),
    }
}

/// The templates shipped with the editor.
pub fn builtin_templates() -> Vec<Template> {
    vec![
        compose("modern", "Modern One", sidebar(), modern()),
        compose("classic", "Classic Pro", single_col(), classic()),
        compose("compact", "Compact", compact_single(), technical()),
        compose("creative", "Creative Studio", narrow_sidebar(), creative()),
        compose("professional", "Corporate", single_col(), professional()),
        compose("minimal", "Clean Minimal", single_col(), minimal()),
        compose("executive", "Executive", single_col(), executive()),
    ]
}

/// Accent and page background pairs for generated themes.
const PALETTES: [(&str, &str); 9] = [
    ("#3b82f6", "#ffffff"),
    ("#ef4444", "#fff1f2"),
    ("#10b981", "#ecfdf5"),
    ("#f59e0b", "#fffbeb"),
    ("#8b5cf6", "#f5f3ff"),
    ("#ec4899", "#fdf2f8"),
    ("#14b8a6", "#f0fdfa"),
    ("#6366f1", "#eef2ff"),
    ("#2c3e50", "#f8fafc"),
];

const FONTS: [&str; 6] = [
    "Inter",
    "Merriweather",
    "Roboto",
    "Playfair Display",
    "Lora",
    "Open Sans",
];

/// Theme picked from the generated palettes and fonts by `seed`.
///
/// Only the accent color, page background and body font are set; apply
/// it with [`Editor::update_styles`](crate::Editor::update_styles).
pub fn theme_from_seed(seed: u64) -> StylesPatch {
    let palettes = PALETTES.len() as u64;
    let (accent, background) = PALETTES[(seed % palettes) as usize];
    let font = FONTS[(seed / palettes % FONTS.len() as u64) as usize];

    StylesPatch {
        font_family: Some(font.to_string()),
        accent_color: Some(accent.to_string()),
        page_background_color: Some(background.to_string()),
        ..Default::default()
    }
}

/// A random palette and body font.
pub fn random_theme() -> StylesPatch {
    theme_from_seed(uuid::Uuid::new_v4().as_u128() as u64)
}

/// Look up a built-in template by id.
pub fn find_template(id: &str) -> Option<Template> {
    builtin_templates().into_iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_ids_unique() {
        let templates = builtin_templates();
        let ids: HashSet<_> = templates.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), templates.len());
        assert_eq!(templates.len(), 7);
    }

    #[test]
    fn test_find_template() {
        let modern = find_template("modern").unwrap();
        assert_eq!(modern.settings.columns, Some(2));
        assert_eq!(modern.settings.column_ratio, Some(35.0));
        assert_eq!(modern.section_variants["skills"], SectionVariant::Tags);
        assert_eq!(modern.styles.sidebar_background_color.as_deref(), Some("#f1f5f9"));

        let classic = find_template("classic").unwrap();
        assert_eq!(classic.settings.columns, Some(1));
        assert_eq!(classic.settings.column_ratio, None);

        assert!(find_template("nope").is_none());
    }

    #[test]
    fn test_template_from_json() {
        let json = r##"{
            "id": "custom",
            "name": "Custom",
            "settings": { "columns": 2, "columnRatio": 30 },
            "styles": { "accentColor": "#ff0000" },
            "sectionVariants": { "experience": "compact" }
        }"##;
        let template: Template = serde_json::from_str(json).unwrap();
        assert_eq!(template.settings.columns, Some(2));
        assert_eq!(template.styles.accent_color.as_deref(), Some("#ff0000"));
        assert_eq!(template.section_variants["experience"], SectionVariant::Compact);
    }

    #[test]
    fn test_theme_from_seed_covers_catalog() {
        let themes: Vec<StylesPatch> = (0..54).map(theme_from_seed).collect();
        let combos: HashSet<_> = themes
            .iter()
            .map(|t| (t.accent_color.clone(), t.font_family.clone()))
            .collect();
        assert_eq!(combos.len(), 54);

        let first = &themes[0];
        assert_eq!(first.accent_color.as_deref(), Some("#3b82f6"));
        assert_eq!(first.page_background_color.as_deref(), Some("#ffffff"));
        assert_eq!(first.font_family.as_deref(), Some("Inter"));
        assert_eq!(first.heading_font_family, None);
        assert_eq!(first.base_font_size, None);

        let last = theme_from_seed(53);
        assert_eq!(last.accent_color.as_deref(), Some("#2c3e50"));
        assert_eq!(last.font_family.as_deref(), Some("Open Sans"));
        assert_eq!(theme_from_seed(54), theme_from_seed(0));
    }

    #[test]
    fn test_random_theme_uses_catalog() {
        for _ in 0..20 {
            let theme = random_theme();
            let accent = theme.accent_color.as_deref().unwrap();
            let palette = PALETTES.iter().find(|(a, _)| *a == accent).unwrap();
            assert_eq!(theme.page_background_color.as_deref(), Some(palette.1));
            assert!(FONTS.contains(&theme.font_family.as_deref().unwrap()));
        }
    }
}
