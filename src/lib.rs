//! # unlayout
//!
//! Reading-order reconstruction for document layout analysis results.
//!
//! A layout analysis service returns a flat element graph: pages, sections,
//! paragraphs, lines, words, tables, figures and key-value pairs, each
//! anchored to offsets in one text stream. This library orders those
//! elements, drops content already covered by a larger element, and emits a
//! stream of output units that render to Markdown. A second stage packs the
//! Markdown into token-bounded chunks.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unlayout::Unlayout;
//!
//! fn main() -> unlayout::Result<()> {
//!     let markdown = Unlayout::new().markdown_file("analysis.json")?;
//!     println!("{}", markdown);
//!
//!     let chunks = unlayout::chunk_markdown(&markdown, &Default::default())?;
//!     println!("{} chunks", chunks.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Reading order**: page, offset and kind priority with span-containment suppression
//! - **Configurable templates**: every element kind renders through `{placeholder}` formats
//! - **Tables and figures**: Markdown tables with merged cells, figure crops from page images
//! - **Chunking**: header splits merged into token-bounded chunks
//! - **Dispatch** (`async` feature): oversized chunks handed to a model-backed splitter
//! - **Batch processing**: independent documents processed in parallel with Rayon

pub mod chunk;
pub mod error;
pub mod format;
pub mod model;
pub mod pipeline;
pub mod render;

#[cfg(feature = "async")]
pub mod llm;

pub use chunk::{ChunkLimits, ChunkMerger, MergedChunk, Split};
pub use error::{Error, Result};
pub use format::{FormatConfig, Formatters, IdentityTransformer, ImageTransformer};
pub use model::{AnalysisResult, OutputUnit, PageImage, PageImages};
pub use pipeline::{ContentAssembler, ErrorMode, ProcessOptions, ProcessOutput, ProcessReport};
pub use render::{ImageMode, JsonFormat, PageSelection, RenderOptions};

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;

use chunk::{split_markdown, EstimatingCounter};

/// Process an analysis result file with the default formatters.
pub fn process_file<P: AsRef<Path>>(path: P) -> Result<ProcessOutput> {
    Unlayout::new().process_file(path)
}

/// Convert an analysis result file to Markdown with default settings.
///
/// # Example
///
/// ```no_run
/// let markdown = unlayout::to_markdown_file("analysis.json").unwrap();
/// ```
pub fn to_markdown_file<P: AsRef<Path>>(path: P) -> Result<String> {
    Unlayout::new().markdown_file(path)
}

/// Split Markdown at headers and merge the splits within `limits`, counting
/// tokens with the [`EstimatingCounter`].
pub fn chunk_markdown(markdown: &str, limits: &ChunkLimits) -> Result<Vec<MergedChunk>> {
    let merger = ChunkMerger::new(*limits)?;
    let splits = split_markdown(markdown, &EstimatingCounter);
    Ok(merger.merge(&splits))
}

/// Builder-style front end tying formatters, processing and rendering
/// together.
///
/// # Example
///
/// ```no_run
/// use unlayout::{ImageMode, Unlayout};
///
/// let markdown = Unlayout::new()
///     .strict()
///     .with_image_mode(ImageMode::Omit)
///     .without_page_units()
///     .markdown_file("analysis.json")
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct Unlayout {
    formatters: Formatters,
    process_options: ProcessOptions,
    render_options: RenderOptions,
    transformer: Arc<dyn ImageTransformer>,
}

impl Unlayout {
    pub fn new() -> Self {
        Self {
            formatters: Formatters::default(),
            process_options: ProcessOptions::default(),
            render_options: RenderOptions::default(),
            transformer: Arc::new(IdentityTransformer),
        }
    }

    pub fn with_formatters(mut self, formatters: Formatters) -> Self {
        self.formatters = formatters;
        self
    }

    /// Build the formatters from a JSON [`FormatConfig`].
    pub fn with_format_config(mut self, json: &str) -> Result<Self> {
        self.formatters = Formatters::from_json(json)?;
        Ok(self)
    }

    /// Fail on the first element that cannot be processed.
    pub fn strict(mut self) -> Self {
        self.process_options = self.process_options.strict();
        self
    }

    /// Stop after the element at index `n` (debug aid).
    pub fn break_after(mut self, n: usize) -> Self {
        self.process_options = self.process_options.break_after(n);
        self
    }

    /// Record elements suppressed by span containment in the report.
    pub fn trace_skipped(mut self, trace: bool) -> Self {
        self.process_options = self.process_options.with_trace_skipped(trace);
        self
    }

    pub fn with_process_options(mut self, options: ProcessOptions) -> Self {
        self.process_options = options;
        self
    }

    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    pub fn with_image_mode(mut self, mode: ImageMode) -> Self {
        self.render_options = self.render_options.with_image_mode(mode);
        self
    }

    pub fn without_page_units(mut self) -> Self {
        self.render_options = self.render_options.with_page_units(false);
        self
    }

    /// Render only the selected pages.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.render_options = self.render_options.with_pages(pages);
        self
    }

    pub fn with_transformer(mut self, transformer: Arc<dyn ImageTransformer>) -> Self {
        self.transformer = transformer;
        self
    }

    pub fn formatters(&self) -> &Formatters {
        &self.formatters
    }

    pub fn render_options(&self) -> &RenderOptions {
        &self.render_options
    }

    /// Run the assembly pass over `result`.
    pub fn process(
        &self,
        result: &AnalysisResult,
        images: Option<&PageImages>,
    ) -> Result<ProcessOutput> {
        ContentAssembler::new(&self.formatters)
            .with_options(self.process_options.clone())
            .with_transformer(self.transformer.as_ref())
            .process(result, images)
    }

    pub fn process_json(&self, json: &str) -> Result<ProcessOutput> {
        let result = AnalysisResult::from_json(json)?;
        self.process(&result, None)
    }

    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> Result<ProcessOutput> {
        let result = AnalysisResult::from_file(path)?;
        self.process(&result, None)
    }

    /// Render units with this instance's render options.
    pub fn render(&self, units: &[OutputUnit]) -> Result<String> {
        render::to_markdown(units, &self.render_options)
    }

    pub fn to_markdown(&self, result: &AnalysisResult) -> Result<String> {
        let output = self.process(result, None)?;
        self.render(&output.units)
    }

    pub fn markdown_file<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        let output = self.process_file(path)?;
        self.render(&output.units)
    }

    /// Process independent documents in parallel. Each document gets its own
    /// pass; results keep the input order.
    pub fn process_batch(&self, results: &[AnalysisResult]) -> Vec<Result<ProcessOutput>> {
        results
            .par_iter()
            .map(|result| self.process(result, None))
            .collect()
    }
}

impl Default for Unlayout {
    fn default() -> Self {
        Self::new()
    }
}
