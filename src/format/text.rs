//! Paragraph, line, word and key-value units.

use super::{Template, UnitContext};
use crate::error::Result;
use crate::model::{
    ElementInfo, KeyValuePair, Line, OutputUnit, Paragraph, ParagraphRole, Word,
};

pub(crate) const PARAGRAPH_PLACEHOLDERS: &[&str] = &["content", "heading_hashes"];
pub(crate) const CONTENT_PLACEHOLDERS: &[&str] = &["content"];
pub(crate) const KEY_VALUE_PLACEHOLDERS: &[&str] = &["key_content", "value_content"];

const HEADING_FORMAT: &str = "\n{heading_hashes} **{content}**";

fn parse_optional(format: Option<&str>, allowed: &[&str]) -> Result<Option<Template>> {
    format.map(|f| Template::parse(f, allowed)).transpose()
}

fn single_unit(
    format: Option<&Template>,
    values: &[(&str, &str)],
    info: &ElementInfo<'_>,
    ctx: &UnitContext<'_>,
) -> Vec<OutputUnit> {
    format
        .and_then(|format| format.render_if_content(values))
        .map(|text| vec![OutputUnit::text(info.element_id.clone(), text, ctx.meta(info))])
        .unwrap_or_default()
}

/// Paragraph formats keyed by role. A role without a format is suppressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphFormatter {
    pub general: Option<Template>,
    pub title: Option<Template>,
    pub section_heading: Option<Template>,
    pub footnote: Option<Template>,
    pub formula_block: Option<Template>,
    pub page_header: Option<Template>,
    pub page_footer: Option<Template>,
    pub page_number: Option<Template>,
}

impl Default for ParagraphFormatter {
    fn default() -> Self {
        let builtin = |source| Some(Template::builtin(source, PARAGRAPH_PLACEHOLDERS));
        Self {
            general: builtin("{content}"),
            title: builtin(HEADING_FORMAT),
            section_heading: builtin(HEADING_FORMAT),
            footnote: builtin("*Footnote:* {content}"),
            formula_block: builtin("*Formula:* {content}"),
            page_header: None,
            page_footer: None,
            page_number: None,
        }
    }
}

impl ParagraphFormatter {
    /// Parse a single paragraph format.
    pub fn parse_format(format: Option<&str>) -> Result<Option<Template>> {
        parse_optional(format, PARAGRAPH_PLACEHOLDERS)
    }

    /// Format for a paragraph role. Unknown roles use the general format.
    pub fn format_for(&self, role: Option<&ParagraphRole>) -> Option<&Template> {
        match role {
            None | Some(ParagraphRole::Other(_)) => self.general.as_ref(),
            Some(ParagraphRole::Title) => self.title.as_ref(),
            Some(ParagraphRole::SectionHeading) => self.section_heading.as_ref(),
            Some(ParagraphRole::Footnote) => self.footnote.as_ref(),
            Some(ParagraphRole::FormulaBlock) => self.formula_block.as_ref(),
            Some(ParagraphRole::PageHeader) => self.page_header.as_ref(),
            Some(ParagraphRole::PageFooter) => self.page_footer.as_ref(),
            Some(ParagraphRole::PageNumber) => self.page_number.as_ref(),
        }
    }

    pub fn produce(
        &self,
        info: &ElementInfo<'_>,
        paragraph: &Paragraph,
        ctx: &UnitContext<'_>,
    ) -> Result<Vec<OutputUnit>> {
        let Some(format) = self.format_for(paragraph.role.as_ref()) else {
            return Ok(Vec::new());
        };
        let content = ctx.resolve_text(&paragraph.content, &paragraph.spans)?;
        let heading_hashes = info
            .numbering
            .as_ref()
            .map(|numbering| numbering.heading_hashes())
            .unwrap_or_default();
        Ok(single_unit(
            Some(format),
            &[("content", content.as_str()), ("heading_hashes", heading_hashes.as_str())],
            info,
            ctx,
        ))
    }
}

/// Format for page lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFormatter {
    pub format: Option<Template>,
}

impl Default for LineFormatter {
    fn default() -> Self {
        Self {
            format: Some(Template::builtin("{content}", CONTENT_PLACEHOLDERS)),
        }
    }
}

impl LineFormatter {
    pub fn new(format: Option<&str>) -> Result<Self> {
        Ok(Self {
            format: parse_optional(format, CONTENT_PLACEHOLDERS)?,
        })
    }

    pub fn produce(
        &self,
        info: &ElementInfo<'_>,
        line: &Line,
        ctx: &UnitContext<'_>,
    ) -> Result<Vec<OutputUnit>> {
        if self.format.is_none() {
            return Ok(Vec::new());
        }
        let content = ctx.resolve_text(&line.content, &line.spans)?;
        Ok(single_unit(
            self.format.as_ref(),
            &[("content", content.as_str())],
            info,
            ctx,
        ))
    }
}

/// Format for page words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordFormatter {
    pub format: Option<Template>,
}

impl Default for WordFormatter {
    fn default() -> Self {
        Self {
            format: Some(Template::builtin("{content}", CONTENT_PLACEHOLDERS)),
        }
    }
}

impl WordFormatter {
    pub fn new(format: Option<&str>) -> Result<Self> {
        Ok(Self {
            format: parse_optional(format, CONTENT_PLACEHOLDERS)?,
        })
    }

    pub fn produce(
        &self,
        info: &ElementInfo<'_>,
        word: &Word,
        ctx: &UnitContext<'_>,
    ) -> Result<Vec<OutputUnit>> {
        if self.format.is_none() {
            return Ok(Vec::new());
        }
        let content = ctx.resolve_text(&word.content, std::slice::from_ref(&word.span))?;
        Ok(single_unit(
            self.format.as_ref(),
            &[("content", content.as_str())],
            info,
            ctx,
        ))
    }
}

/// Format for key-value pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValueFormatter {
    pub format: Option<Template>,
}

impl Default for KeyValueFormatter {
    fn default() -> Self {
        Self {
            format: Some(Template::builtin(
                "*Key Value Pair*: {key_content}: {value_content}",
                KEY_VALUE_PLACEHOLDERS,
            )),
        }
    }
}

impl KeyValueFormatter {
    pub fn new(format: Option<&str>) -> Result<Self> {
        Ok(Self {
            format: parse_optional(format, KEY_VALUE_PLACEHOLDERS)?,
        })
    }

    pub fn produce(
        &self,
        info: &ElementInfo<'_>,
        pair: &KeyValuePair,
        ctx: &UnitContext<'_>,
    ) -> Result<Vec<OutputUnit>> {
        if self.format.is_none() {
            return Ok(Vec::new());
        }
        let key = ctx.resolve_text(&pair.key.content, &pair.key.spans)?;
        let value = match &pair.value {
            Some(value) => ctx.resolve_text(&value.content, &value.spans)?,
            None => String::new(),
        };
        Ok(single_unit(
            self.format.as_ref(),
            &[("key_content", key.as_str()), ("value_content", value.as_str())],
            info,
            ctx,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::SelectionMarkFormatter;
    use crate::model::{
        AnalysisResult, Element, KeyValueElement, Numbering, Span, SpanBounds,
    };

    fn info<'a>(element: Element<'a>, numbering: Option<Numbering>) -> ElementInfo<'a> {
        ElementInfo {
            element_id: "/paragraphs/0".to_string(),
            element,
            spans: element.spans(),
            full_span_bounds: SpanBounds::new(0, 10),
            start_page_number: 1,
            numbering,
        }
    }

    fn with_ctx<T>(f: impl FnOnce(&UnitContext<'_>) -> T) -> T {
        let result = AnalysisResult::default();
        let marks = SelectionMarkFormatter::default();
        let ctx = UnitContext {
            result: &result,
            formulas: &[],
            barcodes: &[],
            numbering: None,
            selection_marks: &marks,
        };
        f(&ctx)
    }

    #[test]
    fn test_heading_uses_own_numbering() {
        let para = Paragraph::new("Results", Span::new(0, 7)).with_role(ParagraphRole::Title);
        let units = with_ctx(|ctx| {
            ParagraphFormatter::default()
                .produce(
                    &info(Element::Paragraph(&para), Some(Numbering::new(vec![2, 1]))),
                    &para,
                    ctx,
                )
                .unwrap()
        });
        assert_eq!(units[0].text_content(), Some("\n## **Results**"));
    }

    #[test]
    fn test_suppressed_roles() {
        let para =
            Paragraph::new("Page 3", Span::new(0, 6)).with_role(ParagraphRole::PageNumber);
        let units = with_ctx(|ctx| {
            ParagraphFormatter::default()
                .produce(&info(Element::Paragraph(&para), None), &para, ctx)
                .unwrap()
        });
        assert!(units.is_empty());
    }

    #[test]
    fn test_empty_paragraph_suppressed() {
        let para = Paragraph::new("", Span::new(0, 0));
        let units = with_ctx(|ctx| {
            ParagraphFormatter::default()
                .produce(&info(Element::Paragraph(&para), None), &para, ctx)
                .unwrap()
        });
        assert!(units.is_empty());
    }

    #[test]
    fn test_checkbox_in_line() {
        let line = Line {
            content: ":selected: Approved".into(),
            spans: vec![Span::new(0, 19)],
            ..Default::default()
        };
        let units = with_ctx(|ctx| {
            LineFormatter::default()
                .produce(&info(Element::Line(&line), None), &line, ctx)
                .unwrap()
        });
        assert_eq!(units[0].text_content(), Some("[X] Approved"));
    }

    #[test]
    fn test_key_value_without_value() {
        let pair = KeyValuePair {
            key: KeyValueElement {
                content: "Name".into(),
                spans: vec![Span::new(0, 4)],
                ..Default::default()
            },
            ..Default::default()
        };
        let units = with_ctx(|ctx| {
            KeyValueFormatter::default()
                .produce(&info(Element::KeyValuePair(&pair), None), &pair, ctx)
                .unwrap()
        });
        assert_eq!(units[0].text_content(), Some("*Key Value Pair*: Name: "));
    }

    #[test]
    fn test_word_format_disabled() {
        let word = Word {
            content: "hi".into(),
            ..Default::default()
        };
        let formatter = WordFormatter::new(None).unwrap();
        let units = with_ctx(|ctx| {
            formatter
                .produce(&info(Element::Word(&word), None), &word, ctx)
                .unwrap()
        });
        assert!(units.is_empty());
    }
}
