//! Element collection and total ordering.

use std::cmp::Reverse;

use super::{PageSpanCalculator, SectionHierarchy};
use crate::error::Result;
use crate::model::{AnalysisResult, Element, ElementInfo, Numbering, SpanBounds};

/// Gather every element of `result` with its derived metadata, in collection
/// order. Elements without spans are skipped with a warning.
pub fn collect_elements<'a>(
    result: &'a AnalysisResult,
    pages: &PageSpanCalculator,
    hierarchy: &SectionHierarchy,
) -> Result<Vec<ElementInfo<'a>>> {
    let mut infos = Vec::new();

    let mut line_counter = 0usize;
    let mut word_counter = 0usize;
    let mut mark_counter = 0usize;
    for (page_idx, page) in result.pages.iter().enumerate() {
        let page_id = format!("/pages/{}", page_idx);
        let bounds = SpanBounds::covering(&page.spans)
            .or_else(|| {
                pages
                    .bounds(page.page_number)
                    .map(|range| SpanBounds::new(*range.start(), range.end() + 1))
            })
            .unwrap_or_default();
        infos.push(ElementInfo {
            element_id: page_id.clone(),
            element: Element::Page(page),
            spans: page.spans.clone(),
            full_span_bounds: bounds,
            start_page_number: page.page_number,
            numbering: None,
        });

        for line in &page.lines {
            let id = format!("{}/lines/{}", page_id, line_counter);
            line_counter += 1;
            push_page_child(&mut infos, id, Element::Line(line), page.page_number);
        }
        for word in &page.words {
            let id = format!("{}/words/{}", page_id, word_counter);
            word_counter += 1;
            push_page_child(&mut infos, id, Element::Word(word), page.page_number);
        }
        for mark in &page.selection_marks {
            let id = format!("{}/selectionMarks/{}", page_id, mark_counter);
            mark_counter += 1;
            push_page_child(&mut infos, id, Element::SelectionMark(mark), page.page_number);
        }
    }

    let mut top_level = |collection: &str, index: usize, element: Element<'a>| -> Result<()> {
        let spans = element.spans();
        let Some(bounds) = SpanBounds::covering(&spans) else {
            log::warn!("/{}/{} has no spans and is skipped", collection, index);
            return Ok(());
        };
        let start_page_number = pages.page_for_offset(bounds.offset)?;
        infos.push(ElementInfo {
            element_id: format!("/{}/{}", collection, index),
            element,
            spans,
            full_span_bounds: bounds,
            start_page_number,
            numbering: hierarchy
                .element_numbering(collection, index)
                .cloned()
                .filter(|numbering: &Numbering| !numbering.is_empty()),
        });
        Ok(())
    };

    for (idx, section) in result.sections.iter().enumerate() {
        top_level("sections", idx, Element::Section(section))?;
    }
    for (idx, paragraph) in result.paragraphs.iter().enumerate() {
        top_level("paragraphs", idx, Element::Paragraph(paragraph))?;
    }
    for (idx, table) in result.tables.iter().enumerate() {
        top_level("tables", idx, Element::Table(table))?;
    }
    for (idx, figure) in result.figures.iter().enumerate() {
        top_level("figures", idx, Element::Figure(figure))?;
    }
    for (idx, list) in result.lists.iter().enumerate() {
        top_level("lists", idx, Element::List(list))?;
    }
    for (idx, pair) in result.key_value_pairs.iter().enumerate() {
        top_level("keyValuePairs", idx, Element::KeyValuePair(pair))?;
    }
    for (idx, document) in result.documents.iter().enumerate() {
        top_level("documents", idx, Element::Document(document))?;
    }

    log::debug!("collected {} elements", infos.len());
    Ok(infos)
}

fn push_page_child<'a>(
    infos: &mut Vec<ElementInfo<'a>>,
    element_id: String,
    element: Element<'a>,
    page_number: u32,
) {
    let spans = element.spans();
    let Some(bounds) = SpanBounds::covering(&spans) else {
        log::warn!("{} has no spans and is skipped", element_id);
        return;
    };
    infos.push(ElementInfo {
        element_id,
        element,
        spans,
        full_span_bounds: bounds,
        start_page_number: page_number,
        numbering: None,
    });
}

/// Sort elements by start page, start offset, kind priority and, for equal
/// starts, the element covering more content first. The sort is stable, so
/// full ties keep collection order.
pub fn order_elements(elements: &mut [ElementInfo<'_>]) {
    elements.sort_by_key(|info| {
        (
            info.start_page_number,
            info.full_span_bounds.offset,
            info.kind().priority(),
            Reverse(info.full_span_bounds.end),
        )
    });
}
