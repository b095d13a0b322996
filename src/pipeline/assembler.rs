//! The single forward pass turning ordered elements into output units.

use super::ordering::{collect_elements, order_elements};
use super::{
    ErrorMode, PageSpanCalculator, ProcessOptions, ProcessOutput, ProcessReport,
    SectionHierarchy, SkippedElement,
};
use crate::error::{Error, Result};
use crate::format::{
    Formatters, IdentityTransformer, ImageTransformer, PageImageCache, UnitContext,
};
use crate::model::{
    AnalysisResult, Element, ElementInfo, ElementKind, Numbering, OutputUnit, PageImages, Span,
};

static IDENTITY: IdentityTransformer = IdentityTransformer;

/// Spans claimed by already emitted elements on the active page, sorted by
/// offset.
#[derive(Debug, Default)]
struct ClaimedSpans {
    spans: Vec<Span>,
}

impl ClaimedSpans {
    fn claim(&mut self, spans: &[Span]) {
        for span in spans {
            let pos = self.spans.partition_point(|s| s.offset <= span.offset);
            self.spans.insert(pos, *span);
        }
    }

    /// The first claimed span fully containing any of `spans`.
    fn covering(&self, spans: &[Span]) -> Option<Span> {
        spans.iter().find_map(|span| {
            self.spans
                .iter()
                .take_while(|claimed| claimed.offset <= span.offset)
                .find(|claimed| span.is_within(claimed))
                .copied()
        })
    }

    /// Drop spans ending at or before `offset`.
    fn prune_before(&mut self, offset: usize) {
        self.spans.retain(|span| span.end() > offset);
    }

    fn len(&self) -> usize {
        self.spans.len()
    }
}

/// Rolling state of one pass.
struct PassState<'e, 'a> {
    page: Option<&'e ElementInfo<'a>>,
    numbering: Option<Numbering>,
    claimed: ClaimedSpans,
    units: Vec<OutputUnit>,
    report: ProcessReport,
}

/// Reconstructs the reading-order unit stream of an analysis result.
///
/// # Example
///
/// ```no_run
/// use unlayout::format::Formatters;
/// use unlayout::model::AnalysisResult;
/// use unlayout::pipeline::ContentAssembler;
///
/// let result = AnalysisResult::from_file("analysis.json")?;
/// let formatters = Formatters::default();
/// let output = ContentAssembler::new(&formatters).process(&result, None)?;
/// println!("{} units", output.len());
/// # Ok::<(), unlayout::Error>(())
/// ```
pub struct ContentAssembler<'f> {
    formatters: &'f Formatters,
    options: ProcessOptions,
    transformer: &'f dyn ImageTransformer,
}

impl<'f> ContentAssembler<'f> {
    pub fn new(formatters: &'f Formatters) -> Self {
        Self {
            formatters,
            options: ProcessOptions::default(),
            transformer: &IDENTITY,
        }
    }

    pub fn with_options(mut self, options: ProcessOptions) -> Self {
        self.options = options;
        self
    }

    /// Use `transformer` to rotate page images and crop figures.
    pub fn with_transformer(mut self, transformer: &'f dyn ImageTransformer) -> Self {
        self.transformer = transformer;
        self
    }

    /// Run the pass over `result`. When `images` is given its keys must be
    /// exactly the document's page numbers.
    pub fn process(
        &self,
        result: &AnalysisResult,
        images: Option<&PageImages>,
    ) -> Result<ProcessOutput> {
        let pages = PageSpanCalculator::new(result)?;
        let hierarchy = SectionHierarchy::resolve(result);
        let mut elements = collect_elements(result, &pages, &hierarchy)?;
        order_elements(&mut elements);

        let mut images = PageImageCache::new(
            images,
            result.page_numbers(),
            self.transformer,
            self.formatters.page.adjust_rotation(),
        )?;
        let formulas = result.formulas();
        let barcodes = result.barcodes();

        let mut state = PassState {
            page: None,
            numbering: None,
            claimed: ClaimedSpans::default(),
            units: Vec::new(),
            report: ProcessReport::new(),
        };

        for (idx, info) in elements.iter().enumerate() {
            state.report.elements_visited += 1;

            if state
                .page
                .is_some_and(|page| info.start_page_number > page.start_page_number)
            {
                self.close_page(&mut state, &images);
                let page_start = pages
                    .bounds(info.start_page_number)
                    .map(|range| *range.start())
                    .unwrap_or(info.full_span_bounds.offset);
                state.claimed.prune_before(page_start);
            }

            if info.kind().is_suppressible() {
                if let Some(covered_by) = state.claimed.covering(&info.spans) {
                    log::trace!("{} is covered by {:?}", info.element_id, covered_by);
                    if self.options.trace_skipped {
                        state.report.skipped.push(SkippedElement {
                            element_id: info.element_id.clone(),
                            spans: info.spans.clone(),
                            covered_by,
                        });
                    }
                    continue;
                }
            }

            let produced = match info.element {
                Element::SelectionMark(_) => continue,
                Element::Page(page) => {
                    state.page = Some(info);
                    images.ensure(page).map(|image| {
                        self.formatters
                            .page
                            .start_units(info, image, state.numbering.as_ref())
                    })
                }
                Element::Section(_) => {
                    state.numbering = info.numbering.clone();
                    Ok(self.formatters.section.produce(info, state.numbering.as_ref()))
                }
                _ => {
                    let ctx = UnitContext {
                        result,
                        formulas: &formulas,
                        barcodes: &barcodes,
                        numbering: state.numbering.as_ref(),
                        selection_marks: &self.formatters.selection_marks,
                    };
                    self.produce(info, &ctx, &mut images)
                }
            };

            match produced {
                Ok(units) => {
                    state.units.extend(units);
                    if !matches!(info.kind(), ElementKind::Page | ElementKind::Section) {
                        state.claimed.claim(&info.spans);
                        if let Some(limit) = self.options.break_after.filter(|&limit| idx > limit)
                        {
                            log::info!(
                                "{} elements processed (break after {}), stopping early",
                                idx + 1,
                                limit
                            );
                            state.report.stopped_early = true;
                            break;
                        }
                    }
                }
                Err(err) if err.is_fatal() => {
                    log::error!(
                        "Error processing element {} (start page {}): {}",
                        info.element_id,
                        info.start_page_number,
                        err
                    );
                    return Err(err);
                }
                Err(err) => {
                    log::error!(
                        "Error processing element {} (start page {}): {}",
                        info.element_id,
                        info.start_page_number,
                        err
                    );
                    state.report.add_unprocessed(info.kind().name());
                    if self.options.error_mode == ErrorMode::Raise {
                        return Err(err);
                    }
                }
            }
        }

        self.close_page(&mut state, &images);

        if !state.report.unprocessed.is_empty() {
            log::warn!(
                "Some elements were not processed: {}",
                state.report.unprocessed_summary()
            );
        }
        log::debug!(
            "visited {} elements, {} spans claimed on the last page",
            state.report.elements_visited,
            state.claimed.len()
        );

        state.report.units_emitted = state.units.len();
        Ok(ProcessOutput::new(state.units, state.report))
    }

    /// Emit the closing units of the active page, if any.
    fn close_page(&self, state: &mut PassState<'_, '_>, images: &PageImageCache<'_>) {
        let Some(page) = state.page.take() else {
            return;
        };
        let image = images.get(page.start_page_number);
        state.units.extend(
            self.formatters
                .page
                .end_units(page, image, state.numbering.as_ref()),
        );
    }

    fn produce(
        &self,
        info: &ElementInfo<'_>,
        ctx: &UnitContext<'_>,
        images: &mut PageImageCache<'_>,
    ) -> Result<Vec<OutputUnit>> {
        let formatters = self.formatters;
        match info.element {
            Element::Paragraph(paragraph) => formatters.paragraph.produce(info, paragraph, ctx),
            Element::Line(line) => formatters.line.produce(info, line, ctx),
            Element::Word(word) => formatters.word.produce(info, word, ctx),
            Element::KeyValuePair(pair) => formatters.key_value.produce(info, pair, ctx),
            Element::Table(table) => formatters.table.produce(info, table, ctx),
            Element::Figure(figure) => formatters.figure.produce(info, figure, ctx, images),
            Element::List(_) | Element::Document(_) => Err(Error::UnsupportedElement {
                kind: info.kind().name().to_string(),
                element_id: info.element_id.clone(),
            }),
            Element::Page(_) | Element::Section(_) | Element::SelectionMark(_) => Ok(Vec::new()),
        }
    }
}
