//! Figure types.

use serde::{Deserialize, Serialize};

use super::{BoundingRegion, Span, TextRegion};

/// A figure (chart, photo, diagram) detected by the analysis service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Figure {
    pub id: Option<String>,
    pub caption: Option<TextRegion>,
    pub footnotes: Vec<TextRegion>,
    pub spans: Vec<Span>,

    /// References to the elements drawn inside the figure, e.g. "/paragraphs/4"
    pub elements: Vec<String>,
    pub bounding_regions: Vec<BoundingRegion>,
}

impl Figure {
    /// Sorted, de-duplicated page numbers the figure is drawn on.
    pub fn page_numbers(&self) -> Vec<u32> {
        let mut pages: Vec<u32> = self
            .bounding_regions
            .iter()
            .map(|region| region.page_number)
            .collect();
        pages.sort_unstable();
        pages.dedup();
        pages
    }

    /// Spans of the figure body, excluding its caption and footnotes.
    pub fn content_spans(&self) -> Vec<Span> {
        let excluded: Vec<&Span> = self
            .caption
            .iter()
            .flat_map(|caption| caption.spans.iter())
            .chain(self.footnotes.iter().flat_map(|note| note.spans.iter()))
            .collect();
        self.spans
            .iter()
            .filter(|span| !excluded.contains(span))
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(page_number: u32) -> BoundingRegion {
        BoundingRegion {
            page_number,
            polygon: vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
        }
    }

    #[test]
    fn test_page_numbers_dedup() {
        let figure = Figure {
            bounding_regions: vec![region(3), region(2), region(3)],
            ..Default::default()
        };
        assert_eq!(figure.page_numbers(), vec![2, 3]);
    }

    #[test]
    fn test_content_spans_exclude_caption() {
        let figure = Figure {
            caption: Some(TextRegion {
                content: "Figure 1".into(),
                spans: vec![Span::new(40, 8)],
                ..Default::default()
            }),
            spans: vec![Span::new(10, 20), Span::new(40, 8)],
            ..Default::default()
        };
        assert_eq!(figure.content_spans(), vec![Span::new(10, 20)]);
    }
}
