use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::error::SelectorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRef {
    Number(u32),
    End,
}

impl PageRef {
    fn resolve(self, total_pages: u32) -> u32 {
        match self {
            PageRef::Number(n) => n,
            PageRef::End => total_pages,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: PageRef,
    pub end: Option<PageRef>,
}

impl PageRange {
    /// Parse a single selector token like "7", "1-5", "9-6" or "3-end"
    pub fn parse(token: &str) -> Result<Self, SelectorError> {
        let token = token.trim();
        let malformed = || SelectorError::Malformed(token.to_string());

        match token.split_once('-') {
            Some((start, end)) => Ok(PageRange {
                start: parse_page_ref(start).ok_or_else(malformed)?,
                end: Some(parse_page_ref(end).ok_or_else(malformed)?),
            }),
            None => Ok(PageRange {
                start: parse_page_ref(token).ok_or_else(malformed)?,
                end: None,
            }),
        }
    }

    /// Inclusive bounds of this range in a document of `total_pages` pages.
    /// The bounds may lie outside the document or be reversed.
    fn bounds(&self, total_pages: u32) -> (u32, u32) {
        let start = self.start.resolve(total_pages);
        let end = self.end.map_or(start, |end| end.resolve(total_pages));
        (start, end)
    }
}

fn parse_page_ref(s: &str) -> Option<PageRef> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("end") {
        Some(PageRef::End)
    } else if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        // Too large for u32 is still a page number, just not one that exists.
        Some(PageRef::Number(s.parse::<u32>().unwrap_or(u32::MAX)))
    } else {
        None
    }
}

/// A syntactically valid page selector such as "1, 3, 5-10".
///
/// Parsing only checks the grammar; which pages it denotes depends on the
/// document it is resolved against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSelector {
    ranges: Vec<PageRange>,
}

impl PageSelector {
    /// Parse a comma-separated list of page ranges. Empty tokens are ignored.
    pub fn parse(s: &str) -> Result<Self, SelectorError> {
        let ranges = s
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(PageRange::parse)
            .collect::<Result<_, _>>()?;
        Ok(PageSelector { ranges })
    }

    /// Resolve into the ascending set of existing pages this selector names.
    ///
    /// Pages outside `1..=total_pages` and reversed ranges are dropped.
    pub fn resolve(&self, total_pages: u32) -> Result<PageIndexSet, SelectorError> {
        let mut pages = BTreeSet::new();
        for range in &self.ranges {
            let (start, end) = range.bounds(total_pages);
            if start > end {
                continue;
            }
            let lo = start.max(1);
            let hi = end.min(total_pages);
            if lo <= hi {
                pages.extend(lo..=hi);
            }
        }

        if pages.is_empty() {
            return Err(SelectorError::EmptySelection);
        }
        Ok(PageIndexSet {
            pages: pages.into_iter().collect(),
        })
    }

    /// Resolve into pages in the order the user wrote them.
    ///
    /// A reversed range walks backwards, pages outside the document are
    /// dropped, and a page named twice keeps its first position.
    pub fn resolve_order(&self, total_pages: u32) -> Result<PageOrder, SelectorError> {
        let mut seen = HashSet::new();
        let mut pages = Vec::new();
        let mut push = |page: u32| {
            if seen.insert(page) {
                pages.push(page);
            }
        };

        for range in &self.ranges {
            let (start, end) = range.bounds(total_pages);
            if start <= end {
                let lo = start.max(1);
                let hi = end.min(total_pages);
                if lo <= hi {
                    (lo..=hi).for_each(&mut push);
                }
            } else {
                let hi = start.min(total_pages);
                let lo = end.max(1);
                if lo <= hi {
                    (lo..=hi).rev().for_each(&mut push);
                }
            }
        }

        if pages.is_empty() {
            return Err(SelectorError::EmptySelection);
        }
        Ok(PageOrder { pages })
    }
}

impl FromStr for PageSelector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageSelector::parse(s)
    }
}

/// Parse `selector` and resolve it against a document of `total_pages` pages.
pub fn parse_selector(selector: &str, total_pages: u32) -> Result<PageIndexSet, SelectorError> {
    PageSelector::parse(selector)?.resolve(total_pages)
}

/// Non-empty, strictly ascending list of 1-based page numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageIndexSet {
    pages: Vec<u32>,
}

impl PageIndexSet {
    pub fn single(page: u32) -> Self {
        PageIndexSet { pages: vec![page] }
    }

    /// Every page of a document, or `EmptySelection` if it has none.
    pub fn all(total_pages: u32) -> Result<Self, SelectorError> {
        if total_pages == 0 {
            return Err(SelectorError::EmptySelection);
        }
        Ok(PageIndexSet {
            pages: (1..=total_pages).collect(),
        })
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }
}

impl fmt::Display for PageIndexSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_pages(f, &self.pages)
    }
}

/// Non-empty list of distinct 1-based page numbers in user-chosen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOrder {
    pages: Vec<u32>,
}

impl PageOrder {
    pub fn as_slice(&self) -> &[u32] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }
}

impl fmt::Display for PageOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_pages(f, &self.pages)
    }
}

fn write_pages(f: &mut fmt::Formatter<'_>, pages: &[u32]) -> fmt::Result {
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{}", page)?;
    }
    Ok(())
}
