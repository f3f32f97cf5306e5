use crate::schema::FieldDefinition;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageDirection {
    Next,
    Previous,
}

impl PageDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageDirection::Next => "next",
            PageDirection::Previous => "previous",
        }
    }
}

impl fmt::Display for PageDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The navigation sequence: distinct page numbers of all fields, ascending.
/// Gaps between page numbers are skipped, not rendered as empty pages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageSequence {
    pages: Vec<u32>,
}

impl PageSequence {
    pub fn from_fields(fields: &[FieldDefinition]) -> Self {
        let distinct: BTreeSet<u32> = fields.iter().map(FieldDefinition::page_number).collect();
        let mut pages: Vec<u32> = distinct.into_iter().collect();
        if pages.is_empty() {
            pages.push(1);
        }
        Self { pages }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn has_pages(&self) -> bool {
        self.pages.len() > 1
    }

    pub fn number_at(&self, index: usize) -> Option<u32> {
        self.pages.get(index).copied()
    }

    pub fn index_of(&self, page: u32) -> Option<usize> {
        self.pages.iter().position(|p| *p == page)
    }

    pub fn last_index(&self) -> usize {
        self.pages.len().saturating_sub(1)
    }

    pub fn numbers(&self) -> &[u32] {
        &self.pages
    }

    /// 0-100 position of the page at `index`. A single page is fully on
    /// screen from the start, so it reports 100.
    pub fn progress(&self, index: usize) -> f64 {
        if self.has_pages() {
            (index as f64 / self.last_index() as f64) * 100.0
        } else {
            100.0
        }
    }
}
