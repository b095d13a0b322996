//! Figure units: surrounding text, reconstructed content and the cropped image.

use super::{figure_pixel_rect, PageImageCache, Template, TemplateList, UnitContext};
use crate::error::Result;
use crate::model::{ElementInfo, Figure, OutputUnit, Span, SpanBounds};

pub(crate) const FIGURE_PLACEHOLDERS: &[&str] =
    &["figure_number", "caption", "footnotes", "content"];

/// Produces the text around a figure and, when page images are available,
/// the figure image cut from its page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigureFormatter {
    before_formats: TemplateList,
    after_formats: TemplateList,
    output_image: bool,
    image_text: Option<Template>,
}

impl Default for FigureFormatter {
    fn default() -> Self {
        Self {
            before_formats: TemplateList::builtin(
                &[
                    "**Figure {figure_number} Info**\n",
                    "*Figure Caption:* {caption}",
                    "*Figure Footnotes:* {footnotes}",
                    "*Figure Content:*\n{content}",
                ],
                FIGURE_PLACEHOLDERS,
            ),
            after_formats: TemplateList::default(),
            output_image: true,
            image_text: Some(Template::builtin("\n*Figure Image:*", FIGURE_PLACEHOLDERS)),
        }
    }
}

impl FigureFormatter {
    pub fn new(
        before: &[impl AsRef<str>],
        after: &[impl AsRef<str>],
        output_image: bool,
        image_text: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            before_formats: TemplateList::parse(before, FIGURE_PLACEHOLDERS)?,
            after_formats: TemplateList::parse(after, FIGURE_PLACEHOLDERS)?,
            output_image,
            image_text: image_text
                .map(|text| Template::parse(text, FIGURE_PLACEHOLDERS))
                .transpose()?,
        })
    }

    pub fn before_sources(&self) -> Vec<&str> {
        self.before_formats.sources()
    }

    pub fn after_sources(&self) -> Vec<&str> {
        self.after_formats.sources()
    }

    pub fn output_image(&self) -> bool {
        self.output_image
    }

    pub fn image_text_source(&self) -> Option<&str> {
        self.image_text.as_ref().map(Template::source)
    }

    pub fn produce(
        &self,
        info: &ElementInfo<'_>,
        figure: &Figure,
        ctx: &UnitContext<'_>,
        images: &mut PageImageCache<'_>,
    ) -> Result<Vec<OutputUnit>> {
        let needs_content = self.before_formats.uses("content")
            || self.after_formats.uses("content")
            || self.image_text.as_ref().is_some_and(|t| t.uses("content"));
        let values = FigureTextValues::new(info, figure, ctx, needs_content)?;
        let pairs = values.as_pairs();
        let mut units = Vec::new();

        if let Some(text) = self.before_formats.render(&pairs) {
            units.push(OutputUnit::text(
                format!("{}_before_figure_text", info.element_id),
                text,
                ctx.meta(info),
            ));
        }

        if self.output_image && images.has_images() {
            units.extend(self.image_unit(info, figure, ctx, images, &pairs)?);
        }

        if let Some(text) = self.after_formats.render(&pairs) {
            units.push(OutputUnit::text(
                format!("{}_after_figure_text", info.element_id),
                text,
                ctx.meta(info),
            ));
        }
        Ok(units)
    }

    fn image_unit(
        &self,
        info: &ElementInfo<'_>,
        figure: &Figure,
        ctx: &UnitContext<'_>,
        images: &mut PageImageCache<'_>,
        pairs: &[(&str, &str)],
    ) -> Result<Option<OutputUnit>> {
        let pages = figure.page_numbers();
        let Some(&first_page) = pages.first() else {
            log::warn!("{} has no bounding regions, skipping its image", info.element_id);
            return Ok(None);
        };
        if pages.len() > 1 {
            log::warn!(
                "{} spans pages {:?}; only the image of page {} is used",
                info.element_id,
                pages,
                first_page
            );
        }
        let Some(page) = ctx.result.page(first_page) else {
            log::warn!("{} refers to missing page {}", info.element_id, first_page);
            return Ok(None);
        };
        let Some(page_image) = images.ensure(page)?.cloned() else {
            return Ok(None);
        };
        let Some(rect) = figure_pixel_rect(figure, page, &page_image) else {
            log::warn!(
                "{} has no usable polygon on page {}",
                info.element_id,
                first_page
            );
            return Ok(None);
        };
        let cropped = images.transformer().crop(&page_image.image, rect)?;
        let text = self
            .image_text
            .as_ref()
            .and_then(|template| {
                if template.has_placeholders() {
                    template.render_if_content(pairs)
                } else {
                    Some(template.render_empty())
                }
            });
        let mut meta = ctx.meta(info);
        meta.rotation_applied = page_image.rotation_applied;
        Ok(Some(OutputUnit::image(
            format!("{}_img", info.element_id),
            text,
            cropped,
            meta,
        )))
    }
}

struct FigureTextValues {
    number: String,
    caption: String,
    footnotes: String,
    content: String,
}

impl FigureTextValues {
    fn new(
        info: &ElementInfo<'_>,
        figure: &Figure,
        ctx: &UnitContext<'_>,
        needs_content: bool,
    ) -> Result<Self> {
        let caption = match &figure.caption {
            Some(caption) => ctx.resolve_text(&caption.content, &caption.spans)?,
            None => String::new(),
        };
        let footnotes = figure
            .footnotes
            .iter()
            .map(|note| ctx.resolve_text(&note.content, &note.spans))
            .collect::<Result<Vec<_>>>()?
            .join("\n");
        let content = if needs_content {
            figure_content(figure, ctx)?
        } else {
            String::new()
        };
        Ok(Self {
            number: info
                .element_number()
                .map(|n| n.to_string())
                .unwrap_or_default(),
            caption,
            footnotes,
            content,
        })
    }

    fn as_pairs(&self) -> [(&str, &str); 4] {
        [
            ("figure_number", self.number.as_str()),
            ("caption", self.caption.as_str()),
            ("footnotes", self.footnotes.as_str()),
            ("content", self.content.as_str()),
        ]
    }
}

fn all_within(spans: &[Span], parent: &Span) -> bool {
    !spans.is_empty() && spans.iter().all(|span| span.is_within(parent))
}

/// Text drawn inside a figure, rebuilt from the document's elements.
///
/// For every content span of the figure, paragraphs inside it are taken
/// first, then lines on the figure's pages, then loose words, which are
/// joined with spaces into one line. Spans already taken by a coarser
/// element suppress the finer elements inside them.
pub fn figure_content(figure: &Figure, ctx: &UnitContext<'_>) -> Result<String> {
    let content_spans = figure.content_spans();
    let Some(bounds) = SpanBounds::covering(&content_spans) else {
        return Ok(String::new());
    };
    let pages = figure.page_numbers();
    let mut output: Vec<String> = Vec::new();
    let mut words: Vec<String> = Vec::new();
    let mut matched: Vec<Span> = Vec::new();

    let flush = |words: &mut Vec<String>, output: &mut Vec<String>| {
        if !words.is_empty() {
            output.push(words.join(" "));
            words.clear();
        }
    };

    for content_span in &content_spans {
        for para in &ctx.result.paragraphs {
            let Some(first) = para.spans.first() else {
                continue;
            };
            if first.offset > bounds.end {
                break;
            }
            if all_within(&para.spans, content_span) {
                matched.extend(para.spans.iter().copied());
                flush(&mut words, &mut output);
                output.push(ctx.resolve_text(&para.content, &para.spans)?);
            }
        }

        for page in pages.iter().filter_map(|&n| ctx.result.page(n)) {
            for line in &page.lines {
                let Some(first) = line.spans.first() else {
                    continue;
                };
                if first.offset > bounds.end {
                    break;
                }
                if line.spans.iter().any(|s| s.is_within_any(&matched)) {
                    continue;
                }
                if all_within(&line.spans, content_span) {
                    matched.extend(line.spans.iter().copied());
                    flush(&mut words, &mut output);
                    output.push(ctx.resolve_text(&line.content, &line.spans)?);
                }
            }
            for word in &page.words {
                if word.span.offset > bounds.end {
                    break;
                }
                if word.span.is_within_any(&matched) {
                    continue;
                }
                if word.span.is_within(content_span) {
                    words.push(
                        ctx.resolve_text(&word.content, std::slice::from_ref(&word.span))?,
                    );
                }
            }
        }
        flush(&mut words, &mut output);
    }
    Ok(output.join("\n"))
}
