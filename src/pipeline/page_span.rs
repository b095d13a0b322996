//! Page partition of the content stream.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::error::{Error, Result};
use crate::model::{AnalysisResult, Page};

/// Partition of the content offsets into one interval per page.
///
/// Page intervals are closed: a page covers `start..=end`, and the next page
/// starts at `end + 1`. The first page starts at offset 0. Element extents use
/// the half-open [`SpanBounds`](crate::model::SpanBounds) instead.
#[derive(Debug, Clone)]
pub struct PageSpanCalculator {
    bounds: BTreeMap<u32, RangeInclusive<usize>>,
    doc_end: usize,
}

impl PageSpanCalculator {
    /// Compute the partition for every page of `result`.
    ///
    /// Fails with [`Error::Consistency`] when the pages leave a gap in the
    /// content stream, and with [`Error::InvalidInput`] when the result has no
    /// pages at all.
    pub fn new(result: &AnalysisResult) -> Result<Self> {
        let mut pages: Vec<&Page> = result.pages.iter().collect();
        if pages.is_empty() {
            return Err(Error::InvalidInput(
                "analysis result contains no pages".to_string(),
            ));
        }
        pages.sort_by_key(|page| page.page_number);

        let mut bounds = BTreeMap::new();
        let mut next_offset = 0usize;
        for page in pages {
            if bounds.contains_key(&page.page_number) {
                return Err(Error::Consistency(format!(
                    "page {} appears more than once",
                    page.page_number
                )));
            }
            if let Some(declared_start) = page.spans.iter().map(|s| s.offset).min() {
                if declared_start > next_offset {
                    return Err(Error::Consistency(format!(
                        "gap in the content stream before page {} (expected offset {}, page starts at {})",
                        page.page_number, next_offset, declared_start
                    )));
                }
            }
            let end = page_end(page).unwrap_or(next_offset).max(next_offset);
            bounds.insert(page.page_number, next_offset..=end);
            next_offset = end + 1;
        }

        let doc_end = bounds.values().map(|b| *b.end()).max().unwrap_or(0);
        log::debug!(
            "page partition computed for {} pages, document ends at {}",
            bounds.len(),
            doc_end
        );
        Ok(Self { bounds, doc_end })
    }

    /// The page containing `offset`.
    pub fn page_for_offset(&self, offset: usize) -> Result<u32> {
        if offset > self.doc_end {
            return Err(Error::OutOfRange {
                offset,
                end: self.doc_end,
            });
        }
        self.bounds
            .iter()
            .find(|(_, bounds)| bounds.contains(&offset))
            .map(|(page_number, _)| *page_number)
            .ok_or_else(|| {
                Error::Consistency(format!("offset {} is not covered by any page", offset))
            })
    }

    /// Closed interval of a page; both ends belong to the page.
    pub fn bounds(&self, page_number: u32) -> Option<RangeInclusive<usize>> {
        self.bounds.get(&page_number).cloned()
    }

    /// Last offset covered by the document.
    pub fn doc_end(&self) -> usize {
        self.doc_end
    }

    /// Page intervals in page order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, RangeInclusive<usize>)> + '_ {
        self.bounds.iter().map(|(page, bounds)| (*page, bounds.clone()))
    }

    pub fn page_count(&self) -> usize {
        self.bounds.len()
    }
}

/// Largest span end among the page's own spans and its words.
fn page_end(page: &Page) -> Option<usize> {
    page.spans
        .iter()
        .map(|span| span.end())
        .chain(page.words.iter().map(|word| word.span.end()))
        .max()
}
