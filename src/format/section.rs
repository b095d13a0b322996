//! Section units.

use super::Template;
use crate::error::{Error, Result};
use crate::model::{ElementInfo, Numbering, OutputUnit, UnitMeta};

pub(crate) const SECTION_PLACEHOLDERS: &[&str] = &["section_incremental_id"];

/// Produces an optional unit announcing each section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionFormatter {
    text_format: Option<Template>,
    /// Numbering deeper than this renders empty; `None` is unlimited
    max_depth: Option<usize>,
}

impl Default for SectionFormatter {
    fn default() -> Self {
        Self {
            text_format: None,
            max_depth: Some(3),
        }
    }
}

impl SectionFormatter {
    /// Create a section formatter. A negative `max_depth` is rejected.
    pub fn new(text_format: Option<&str>, max_depth: Option<i64>) -> Result<Self> {
        let max_depth = match max_depth {
            Some(depth) if depth < 0 => {
                return Err(Error::Configuration(format!(
                    "section max depth must not be negative (got {})",
                    depth
                )))
            }
            Some(depth) => Some(depth as usize),
            None => None,
        };
        Ok(Self {
            text_format: text_format
                .map(|format| Template::parse(format, SECTION_PLACEHOLDERS))
                .transpose()?,
            max_depth,
        })
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Units for a section element. `numbering` is the section's own.
    pub fn produce(
        &self,
        info: &ElementInfo<'_>,
        numbering: Option<&Numbering>,
    ) -> Vec<OutputUnit> {
        let (Some(format), Some(numbering)) = (&self.text_format, numbering) else {
            return Vec::new();
        };
        if numbering.is_empty() {
            return Vec::new();
        }
        let id_text = match self.max_depth {
            Some(max) if numbering.depth() > max => String::new(),
            _ => numbering.to_string(),
        };
        match format.render_if_content(&[("section_incremental_id", id_text.as_str())]) {
            Some(text) => vec![OutputUnit::text(
                info.element_id.clone(),
                text,
                UnitMeta::new(
                    info.element_id.clone(),
                    info.kind(),
                    info.start_page_number,
                    Some(numbering.clone()),
                ),
            )],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Element, Section, SpanBounds};

    fn info(section: &Section) -> ElementInfo<'_> {
        ElementInfo {
            element_id: "/sections/3".to_string(),
            element: Element::Section(section),
            spans: Vec::new(),
            full_span_bounds: SpanBounds::new(0, 0),
            start_page_number: 2,
            numbering: None,
        }
    }

    #[test]
    fn test_default_emits_nothing() {
        let section = Section::default();
        let numbering = Numbering::new(vec![1, 2]);
        assert!(SectionFormatter::default()
            .produce(&info(&section), Some(&numbering))
            .is_empty());
    }

    #[test]
    fn test_numbered_section() {
        let section = Section::default();
        let formatter =
            SectionFormatter::new(Some("Section {section_incremental_id}"), Some(2)).unwrap();
        let units = formatter.produce(&info(&section), Some(&Numbering::new(vec![2, 1])));
        assert_eq!(units[0].text_content(), Some("Section 2.1"));
        assert_eq!(units[0].meta.section_numbering, Some(Numbering::new(vec![2, 1])));

        // Deeper than the limit renders empty and is suppressed
        let deep = formatter.produce(&info(&section), Some(&Numbering::new(vec![2, 1, 1])));
        assert!(deep.is_empty());
        // Root sections have no numbering
        assert!(formatter.produce(&info(&section), None).is_empty());
    }

    #[test]
    fn test_negative_depth() {
        assert!(matches!(
            SectionFormatter::new(None, Some(-1)),
            Err(Error::Configuration(_))
        ));
        assert_eq!(SectionFormatter::new(None, None).unwrap().max_depth(), None);
    }
}
