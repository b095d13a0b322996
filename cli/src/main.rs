//! unlayout CLI - layout analysis to Markdown and chunks

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use unlayout::chunk::{
    split_markdown, write_chunks, write_splits, ChunkDispatcher, ChunkFile, DispatchOptions,
    EstimatingCounter,
};
use unlayout::llm::IdentitySplitter;
use unlayout::render::{save_images, to_json};
use unlayout::{
    AnalysisResult, ChunkLimits, ChunkMerger, Formatters, ImageMode, JsonFormat, PageSelection,
    ProcessOptions, ProcessOutput, RenderOptions, Unlayout,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "unlayout")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Convert layout analysis results to Markdown and token-bounded chunks", long_about = None)]
struct Cli {
    /// Input analysis JSON file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an analysis result to Markdown, units, and chunks
    Convert {
        /// Input analysis JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        process: ProcessArgs,

        #[command(flatten)]
        limits: LimitArgs,
    },

    /// Convert an analysis result to Markdown
    #[command(alias = "md")]
    Markdown {
        /// Input analysis JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        process: ProcessArgs,

        /// How images are written
        #[arg(long, value_enum, default_value = "embed")]
        images: ImageArg,

        /// Directory for linked images (with --images link)
        #[arg(long, value_name = "DIR")]
        image_dir: Option<PathBuf>,

        /// Leave out page start and end units
        #[arg(long)]
        no_page_units: bool,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Emit the output units as JSON
    Units {
        /// Input analysis JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        process: ProcessArgs,

        /// Compact JSON output
        #[arg(short, long)]
        compact: bool,
    },

    /// Split a Markdown file into token-bounded chunks
    Chunk {
        /// Input Markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        limits: LimitArgs,
    },

    /// Show element statistics of an analysis result
    Info {
        /// Input analysis JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone, Default)]
struct ProcessArgs {
    /// Fail on the first element that cannot be processed
    #[arg(long)]
    strict: bool,

    /// Stop after this many elements of the ordered stream
    #[arg(long, value_name = "N")]
    break_after: Option<usize>,

    /// Record elements suppressed by span containment
    #[arg(long)]
    trace_skipped: bool,

    /// JSON file describing the element formats
    #[arg(long, value_name = "FILE")]
    format_config: Option<PathBuf>,
}

impl ProcessArgs {
    fn build(&self) -> CliResult<Unlayout> {
        let mut options = ProcessOptions::new().with_trace_skipped(self.trace_skipped);
        if self.strict {
            options = options.strict();
        }
        if let Some(n) = self.break_after {
            options = options.break_after(n);
        }

        let formatters = match &self.format_config {
            Some(path) => Formatters::from_json(&fs::read_to_string(path)?)?,
            None => Formatters::default(),
        };

        Ok(Unlayout::new()
            .with_formatters(formatters)
            .with_process_options(options))
    }
}

#[derive(Args, Clone)]
struct LimitArgs {
    /// Splits at or below this many tokens are treated as snippets
    #[arg(long, env = "SNIPPET_SIZE", default_value_t = 600)]
    snippet_size: usize,

    /// Target minimum chunk size in tokens
    #[arg(long, env = "CHUNK_MIN_SIZE", default_value_t = 1000)]
    chunk_min_size: usize,

    /// Target maximum chunk size in tokens
    #[arg(long, env = "CHUNK_MAX_SIZE", default_value_t = 1400)]
    chunk_max_size: usize,

    /// Chunks at or above this size are re-split
    #[arg(long, env = "CHUNK_ABSOLUTE_MAX_SIZE", default_value_t = 2400)]
    chunk_absolute_max_size: usize,

    /// Maximum number of concurrent re-split calls
    #[arg(long, env = "CONCURRENT_SIZE", default_value_t = 10)]
    concurrent_size: usize,
}

impl Default for LimitArgs {
    fn default() -> Self {
        Self {
            snippet_size: 600,
            chunk_min_size: 1000,
            chunk_max_size: 1400,
            chunk_absolute_max_size: 2400,
            concurrent_size: 10,
        }
    }
}

impl LimitArgs {
    fn limits(&self) -> unlayout::Result<ChunkLimits> {
        ChunkLimits::new(
            self.snippet_size,
            self.chunk_min_size,
            self.chunk_max_size,
            self.chunk_absolute_max_size,
        )
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ImageArg {
    /// Inline base64 data URLs
    Embed,
    /// Links to image files
    Link,
    /// No images
    Omit,
}

impl From<ImageArg> for ImageMode {
    fn from(arg: ImageArg) -> Self {
        match arg {
            ImageArg::Embed => ImageMode::Embed,
            ImageArg::Link => ImageMode::Link,
            ImageArg::Omit => ImageMode::Omit,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            process,
            limits,
        }) => cmd_convert(&input, output.as_deref(), &process, &limits),
        Some(Commands::Markdown {
            input,
            output,
            process,
            images,
            image_dir,
            no_page_units,
            pages,
        }) => cmd_markdown(
            &input,
            output.as_deref(),
            &process,
            images,
            image_dir.as_deref(),
            no_page_units,
            pages.as_deref(),
        ),
        Some(Commands::Units {
            input,
            output,
            process,
            compact,
        }) => cmd_units(&input, output.as_deref(), &process, compact),
        Some(Commands::Chunk {
            input,
            output,
            limits,
        }) => cmd_chunk(&input, output.as_deref(), &limits),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            if let Some(input) = cli.input {
                cmd_convert(
                    &input,
                    cli.output.as_deref(),
                    &ProcessArgs::default(),
                    &LimitArgs::default(),
                )
            } else {
                println!("{}", "Usage: unlayout <FILE> [OUTPUT]".yellow());
                println!("       unlayout --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

fn write_or_print(output: Option<&Path>, content: &str) -> CliResult<()> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn print_unprocessed(output: &ProcessOutput) {
    if output.report.unprocessed_total() > 0 {
        eprintln!(
            "{} {}",
            "Unprocessed elements:".yellow(),
            output.report.unprocessed_summary()
        );
    }
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    process: &ProcessArgs,
    limits: &LimitArgs,
) -> CliResult<()> {
    let output_dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("{}_output", file_stem(input))));
    fs::create_dir_all(&output_dir)?;
    let chunk_limits = limits.limits()?;

    let pb = ProgressBar::new(4);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Assembling units...");
    let render_options = RenderOptions::new()
        .with_image_mode(ImageMode::Link)
        .with_image_prefix("images/");
    let unlayout = process.build()?.with_render_options(render_options);
    let result = AnalysisResult::from_file(input)?;
    let processed = unlayout.process(&result, None)?;
    log::debug!(
        "{} units from {} elements",
        processed.report.units_emitted,
        processed.report.elements_visited
    );
    pb.inc(1);

    pb.set_message("Writing images...");
    save_images(&processed.units, output_dir.join("images"))?;
    pb.inc(1);

    pb.set_message("Generating Markdown...");
    let markdown = unlayout.render(&processed.units)?;
    fs::write(output_dir.join("content.md"), &markdown)?;
    fs::write(
        output_dir.join("units.json"),
        to_json(&processed, JsonFormat::Pretty)?,
    )?;
    pb.inc(1);

    pb.set_message("Merging chunks...");
    let splits = split_markdown(&markdown, &EstimatingCounter);
    let chunks = ChunkMerger::new(chunk_limits)?.merge(&splits);
    let files = write_chunks(&chunks, output_dir.join("chunks"), &file_stem(input))?;
    pb.inc(1);

    pb.finish_with_message("Done!");
    print_unprocessed(&processed);

    println!("\n{}", "Output files:".green().bold());
    println!("  {} content.md", "├─".dimmed());
    println!("  {} units.json", "├─".dimmed());
    println!("  {} chunks/ ({} files)", "├─".dimmed(), files.len());
    println!("  {} images/", "└─".dimmed());

    Ok(())
}

fn cmd_markdown(
    input: &Path,
    output: Option<&Path>,
    process: &ProcessArgs,
    images: ImageArg,
    image_dir: Option<&Path>,
    no_page_units: bool,
    pages: Option<&str>,
) -> CliResult<()> {
    let page_selection = if let Some(p) = pages {
        PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?
    } else {
        PageSelection::All
    };

    let mut render_options = RenderOptions::new()
        .with_image_mode(images.into())
        .with_page_units(!no_page_units)
        .with_pages(page_selection);
    if let Some(dir) = image_dir {
        render_options = render_options.with_image_prefix(format!("{}/", dir.display()));
    }

    let unlayout = process.build()?.with_render_options(render_options);
    let processed = unlayout.process_file(input)?;
    if let (ImageArg::Link, Some(dir)) = (images, image_dir) {
        save_images(&processed.units, dir)?;
    }
    print_unprocessed(&processed);

    let markdown = unlayout.render(&processed.units)?;
    write_or_print(output, &markdown)
}

fn cmd_units(
    input: &Path,
    output: Option<&Path>,
    process: &ProcessArgs,
    compact: bool,
) -> CliResult<()> {
    let processed = process.build()?.process_file(input)?;
    print_unprocessed(&processed);

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    write_or_print(output, &to_json(&processed, format)?)
}

fn cmd_chunk(input: &Path, output: Option<&Path>, limits: &LimitArgs) -> CliResult<()> {
    let chunk_limits = limits.limits()?;
    let markdown = fs::read_to_string(input)?;
    let name = file_stem(input);
    let output_dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("{}_chunks", name)));

    let splits = split_markdown(&markdown, &EstimatingCounter);
    write_splits(&splits, output_dir.join("splits"), &name)?;
    let chunks = ChunkMerger::new(chunk_limits)?.merge(&splits);
    let files = write_chunks(&chunks, output_dir.join("merged"), &name)?;
    println!(
        "{} {} splits into {} chunks",
        "Merged".green(),
        splits.len(),
        chunks.len()
    );

    let options = DispatchOptions::new(output_dir.join("final"))
        .with_concurrency(limits.concurrent_size)
        .with_absolute_max(chunk_limits.absolute_max);
    let written = dispatch(&files, options)?;
    println!(
        "{} {} files to {}",
        "Wrote".green(),
        written.len(),
        output_dir.join("final").display()
    );

    Ok(())
}

fn dispatch(files: &[ChunkFile], options: DispatchOptions) -> CliResult<Vec<PathBuf>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let dispatcher = ChunkDispatcher::new(Arc::new(IdentitySplitter), options)?;
        let outcome = dispatcher.dispatch(files).await?;
        log::info!(
            "dispatched {} chunks: {} files written, {} failed",
            outcome.total,
            outcome.written.len(),
            outcome.failures.len()
        );
        for failure in &outcome.failures {
            eprintln!(
                "{} {}: {}",
                "Failed".red(),
                failure.source.display(),
                failure.error
            );
        }
        Ok::<_, Box<dyn std::error::Error>>(outcome.into_result()?)
    })
}

fn cmd_info(input: &Path) -> CliResult<()> {
    let result = AnalysisResult::from_file(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    if let Some(ref version) = result.api_version {
        println!("{}: {}", "API Version".bold(), version);
    }
    if let Some(ref model) = result.model_id {
        println!("{}: {}", "Model".bold(), model);
    }
    println!("{}: {}", "Pages".bold(), result.pages.len());
    println!("{}: {}", "Characters".bold(), result.content.chars().count());

    println!();
    println!("{}", "Element Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let count = |f: fn(&unlayout::model::Page) -> usize| -> usize {
        result.pages.iter().map(f).sum()
    };
    println!("{}: {}", "Sections".bold(), result.sections.len());
    println!("{}: {}", "Paragraphs".bold(), result.paragraphs.len());
    println!("{}: {}", "Tables".bold(), result.tables.len());
    println!("{}: {}", "Figures".bold(), result.figures.len());
    println!("{}: {}", "Key-value pairs".bold(), result.key_value_pairs.len());
    println!("{}: {}", "Lists".bold(), result.lists.len());
    println!("{}: {}", "Lines".bold(), count(|p| p.lines.len()));
    println!("{}: {}", "Words".bold(), count(|p| p.words.len()));
    println!("{}: {}", "Selection marks".bold(), count(|p| p.selection_marks.len()));
    println!("{}: {}", "Formulas".bold(), count(|p| p.formulas.len()));
    println!("{}: {}", "Barcodes".bold(), count(|p| p.barcodes.len()));

    let mut roles: BTreeMap<String, usize> = BTreeMap::new();
    for paragraph in &result.paragraphs {
        let role = paragraph
            .role
            .as_ref()
            .map(|r| r.as_str().to_string())
            .unwrap_or_else(|| "text".to_string());
        *roles.entry(role).or_default() += 1;
    }
    if !roles.is_empty() {
        println!();
        println!("{}", "Paragraph Roles".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        for (role, n) in roles {
            println!("{}: {}", role.bold(), n);
        }
    }

    let processed = Unlayout::new().process(&result, None)?;
    println!();
    println!("{}: {}", "Output units".bold(), processed.report.units_emitted);
    if processed.report.unprocessed_total() > 0 {
        println!(
            "{}: {}",
            "Unprocessed".bold(),
            processed.report.unprocessed_summary().yellow()
        );
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "unlayout".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Layout analysis to Markdown and chunks");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/unlayout".dimmed());
    println!("License: MIT");
}
