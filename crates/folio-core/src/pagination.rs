//! Page assignment for laid-out sections.
//!
//! Columns are paginated independently but share one page index space: page
//! `k` always has a slot for every column, even when a column has run out
//! of content (its slot is then empty). This models a sidebar that repeats
//! next to the main column on every page rather than text flowing from one
//! column into the next.
//!
//! Sections are never split. A section taller than the page budget is placed
//! on a page of its own and overflows it.

use crate::config::EditorConfig;
use crate::document::{PageSize, ResumeConfig};
use crate::heights::HeightRegistry;
use crate::section::{Section, SectionId};
use std::collections::HashMap;

/// A4 page height at 96 DPI.
pub const A4_HEIGHT_PX: f64 = 1123.0;

/// Top plus bottom page padding.
pub const PAGE_MARGIN_Y: f64 = 100.0;

/// Content height budget of an A4 page.
pub const CONTENT_HEIGHT: f64 = A4_HEIGHT_PX - PAGE_MARGIN_Y;

/// Height assumed for sections that have not been measured.
pub const DEFAULT_SECTION_HEIGHT: f64 = 80.0;

/// Section ids of one column on one page, in render order.
pub type Column = Vec<SectionId>;

/// One slot per layout column.
pub type Page = Vec<Column>;

/// Budget and fallback height used by [`paginate_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaginationOptions {
    /// Usable height of a page.
    pub content_height: f64,
    /// Height used for unmeasured sections.
    pub default_section_height: f64,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            content_height: CONTENT_HEIGHT,
            default_section_height: DEFAULT_SECTION_HEIGHT,
        }
    }
}

impl PaginationOptions {
    /// Options for a page size with the configured padding and fallback.
    pub fn for_page(page_size: PageSize, config: &EditorConfig) -> Self {
        Self {
            content_height: page_size.height_px() - config.page_margin_y,
            default_section_height: config.default_section_height,
        }
    }

    /// Height to use for a section: the measurement when it is usable,
    /// otherwise the fallback estimate.
    fn height_of(&self, id: &str, heights: &HashMap<SectionId, f64>) -> f64 {
        match heights.get(id) {
            Some(&h) if h.is_finite() && h > 0.0 => h,
            _ => self.default_section_height,
        }
    }
}

/// Paginate with the A4 budget and the default estimate.
pub fn paginate(
    columns: &[Vec<SectionId>],
    heights: &HashMap<SectionId, f64>,
    sections: &HashMap<SectionId, Section>,
) -> Vec<Page> {
    paginate_with(columns, heights, sections, &PaginationOptions::default())
}

/// Assign every visible section to a page, column by column.
///
/// Hidden sections and ids without a section are skipped. A section moves
/// to the next page when it would push the column past the budget, unless
/// the column is still empty on the current page. The result always
/// contains at least one page, and every page has one slot per column
/// (at least one).
pub fn paginate_with(
    columns: &[Vec<SectionId>],
    heights: &HashMap<SectionId, f64>,
    sections: &HashMap<SectionId, Section>,
    options: &PaginationOptions,
) -> Vec<Page> {
    let slots = columns.len().max(1);
    let mut pages: Vec<Page> = vec![vec![Vec::new(); slots]];

    for (col, column) in columns.iter().enumerate() {
        let mut page = 0;
        let mut used = 0.0;

        for id in column {
            let Some(section) = sections.get(id) else {
                log::debug!("Skipping unknown section {} in column {}", id, col);
                continue;
            };
            if !section.is_visible {
                continue;
            }

            let height = options.height_of(id, heights);
            if used + height > options.content_height && used > 0.0 {
                page += 1;
                used = 0.0;
            }

            while pages.len() <= page {
                pages.push(vec![Vec::new(); slots]);
            }
            pages[page][col].push(id.clone());
            used += height;
        }
    }

    pages
}

/// Keeps the page assignment of a document current as heights arrive.
///
/// Call [`PageFlow::set_height`] for every measurement and
/// [`PageFlow::refresh`] after every document change; both re-paginate
/// synchronously.
#[derive(Debug, Clone)]
pub struct PageFlow {
    config: EditorConfig,
    heights: HeightRegistry,
    pages: Vec<Page>,
}

impl Default for PageFlow {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl PageFlow {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            config: config.clone(),
            heights: HeightRegistry::new(),
            pages: vec![vec![Vec::new()]],
        }
    }

    /// Current page assignment.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn heights(&self) -> &HeightRegistry {
        &self.heights
    }

    /// Page and column a section was placed on.
    pub fn locate(&self, id: &str) -> Option<(usize, usize)> {
        self.pages.iter().enumerate().find_map(|(page, columns)| {
            columns
                .iter()
                .position(|column| column.iter().any(|s| s == id))
                .map(|col| (page, col))
        })
    }

    /// Record a measurement and re-paginate if it changed anything.
    /// Returns true if pagination was re-run.
    pub fn set_height(
        &mut self,
        id: impl Into<SectionId>,
        height: f64,
        document: &ResumeConfig,
    ) -> bool {
        if !self.heights.set_height(id, height) {
            return false;
        }
        self.refresh(document);
        true
    }

    /// Re-paginate after a document change. Heights of deleted sections are
    /// forgotten.
    pub fn refresh(&mut self, document: &ResumeConfig) {
        let pruned = self.heights.prune(&document.sections);
        if pruned > 0 {
            log::debug!("Dropped {} height(s) of deleted sections", pruned);
        }

        let options = PaginationOptions::for_page(document.settings.page_size, &self.config);
        let pages = paginate_with(
            &document.layout.columns,
            self.heights.as_map(),
            &document.sections,
            &options,
        );
        if pages.len() != self.pages.len() {
            log::debug!("Document now spans {} page(s)", pages.len());
        }
        self.pages = pages;
    }
}
