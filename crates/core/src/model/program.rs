//! The decoded DVI document.

use crate::model::font::DviFont;
use crate::model::instruction::PageProgram;
use num_rational::Ratio;
use rustc_hash::FxHashMap;

/// Scalars read from the `pre` command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preamble {
    /// Format identification byte (2 for standard DVI).
    pub format: u8,
    /// Numerator of the unit-of-measure fraction.
    pub numerator: u32,
    /// Denominator of the unit-of-measure fraction.
    pub denominator: u32,
    /// 1000 times the magnification the document asks for.
    pub magnification: u32,
    /// Free-form comment written by the producer.
    pub comment: String,
}

/// Scalars read from the `post` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Postamble {
    /// Height-plus-depth of the tallest page, DVI units.
    pub max_height: i32,
    /// Width of the widest page, DVI units.
    pub max_width: i32,
    /// Largest excess of pushes over pops in any page.
    pub max_stack_depth: u16,
    /// Total number of pages declared.
    pub page_count: u16,
}

/// A fully decoded document: registered fonts, pages in document order, and
/// the preamble/postamble scalars. Built by the container parser; immutable
/// afterward.
#[derive(Debug, Default)]
pub struct DviProgram {
    pub preamble: Preamble,
    pub postamble: Postamble,
    fonts: FxHashMap<u32, DviFont>,
    pages: Vec<PageProgram>,
}

impl DviProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the postamble scalars and size the page list; pages are then
    /// filled in by index as the backward traversal reaches them.
    pub(crate) fn set_postamble(&mut self, postamble: Postamble) {
        self.pages = vec![PageProgram::default(); usize::from(postamble.page_count)];
        self.postamble = postamble;
    }

    pub(crate) fn set_page(&mut self, index: usize, page: PageProgram) {
        self.pages[index] = page;
    }

    /// Register a font declaration. Fonts are legitimately declared twice
    /// (once in the page stream, once in the postamble); the first
    /// registration wins and later ones are dropped.
    pub(crate) fn register_font(&mut self, font: DviFont) {
        use std::collections::hash_map::Entry;
        match self.fonts.entry(font.id) {
            Entry::Occupied(existing) => {
                if *existing.get() != font {
                    tracing::warn!(
                        id = font.id,
                        first = %existing.get().name,
                        ignored = %font.name,
                        "font id declared twice with different parameters"
                    );
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(font);
            }
        }
    }

    pub fn font(&self, id: u32) -> Option<&DviFont> {
        self.fonts.get(&id)
    }

    pub fn fonts(&self) -> impl Iterator<Item = &DviFont> {
        self.fonts.values()
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    pub fn page(&self, index: usize) -> Option<&PageProgram> {
        self.pages.get(index)
    }

    /// Pages indexed in document order.
    pub fn pages(&self) -> &[PageProgram] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Size of one DVI unit in 10^-7 meters, as the exact fraction
    /// `mag * num / (1000 * den)`.
    pub fn dvi_unit(&self) -> Ratio<u64> {
        let num = u64::from(self.preamble.magnification) * u64::from(self.preamble.numerator);
        let den = 1000 * u64::from(self.preamble.denominator);
        if den == 0 {
            return Ratio::from_integer(0);
        }
        Ratio::new(num, den)
    }
}
