//! Markdown rendering for output units.

use std::path::{Path, PathBuf};

use md5::{Digest, Md5};

use crate::error::Result;
use crate::model::{ElementKind, OutputUnit, PageImage, UnitContent};

use super::{ImageMode, RenderOptions};

/// Convert output units to Markdown.
pub fn to_markdown(units: &[OutputUnit], options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(units)
}

/// Convert groups of units to Markdown, each group introduced by the chunk
/// prefix.
pub fn chunks_to_markdown(chunks: &[Vec<OutputUnit>], options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    let mut parts = Vec::with_capacity(chunks.len() * 3);
    for chunk in chunks {
        parts.push(options.chunk_prefix.clone());
        parts.push("\n".to_string());
        parts.push(renderer.render(chunk)?);
    }
    Ok(parts.join("\n\n"))
}

/// Markdown renderer.
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render units to Markdown.
    pub fn render(&self, units: &[OutputUnit]) -> Result<String> {
        let mut output = String::new();
        for unit in units.iter().filter(|unit| self.includes(unit)) {
            self.render_unit(&mut output, unit);
        }
        Ok(output.trim().to_string())
    }

    fn includes(&self, unit: &OutputUnit) -> bool {
        if !self.options.include_page_units && unit.meta.element_kind == ElementKind::Page {
            return false;
        }
        self.options.page_selection.includes(unit.meta.page_number)
    }

    fn render_unit(&self, output: &mut String, unit: &OutputUnit) {
        let separator = unit
            .separator
            .as_deref()
            .unwrap_or(&self.options.default_separator);

        match &unit.content {
            UnitContent::Text { text } | UnitContent::Table { text, .. } => {
                let padded = needs_padding(text);
                if padded {
                    output.push_str("\n\n");
                }
                output.push_str(text);
                if padded {
                    output.push('\n');
                }
                output.push_str(separator);
            }
            UnitContent::Image { text, image, .. } => {
                let Some(target) = self.image_target(unit, image) else {
                    return;
                };
                if let Some(intro) = text {
                    if needs_padding(intro) {
                        output.push_str("\n\n");
                    }
                    output.push_str(intro);
                    output.push('\n');
                }
                output.push('\n');
                output.push_str(&format!("![]({})", target));
                output.push('\n');
                output.push_str(separator);
            }
        }
    }

    fn image_target(&self, unit: &OutputUnit, image: &PageImage) -> Option<String> {
        match self.options.image_mode {
            ImageMode::Embed => Some(image.to_data_url()),
            ImageMode::Link => Some(format!(
                "{}{}",
                self.options.image_path_prefix,
                image_file_name(&unit.id, image)
            )),
            ImageMode::Omit => None,
        }
    }
}

/// Emphasis at the edges of a block must not merge with neighbouring text.
fn needs_padding(text: &str) -> bool {
    text.starts_with('*') || text.ends_with('*') || text.starts_with('_')
}

/// File name of a linked image: the MD5 of the unit id plus the extension.
pub fn image_file_name(unit_id: &str, image: &PageImage) -> String {
    let digest = Md5::digest(unit_id.as_bytes());
    format!("{:x}_img.{}", digest, image.extension())
}

/// Write every image unit to `dir` under its linked file name.
pub fn save_images(units: &[OutputUnit], dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut written = Vec::new();
    for unit in units {
        let UnitContent::Image { image, .. } = &unit.content else {
            continue;
        };
        if written.is_empty() {
            std::fs::create_dir_all(dir)?;
        }
        let path = dir.join(image_file_name(&unit.id, image));
        std::fs::write(&path, &image.data)?;
        log::debug!("wrote {} ({} bytes)", path.display(), image.size());
        written.push(path);
    }
    Ok(written)
}

/// A run of merged text, or a single image unit.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock<'u> {
    Text(String),
    Image(&'u OutputUnit),
}

/// Collapse runs of text and table units into single text blocks, keeping
/// images as their own blocks. Each unit is followed by its separator or
/// `default_separator`.
pub fn merge_adjacent_text<'u>(
    units: &'u [OutputUnit],
    default_separator: &str,
) -> Vec<ContentBlock<'u>> {
    let mut blocks = Vec::new();
    let mut text = String::new();
    for unit in units {
        match &unit.content {
            UnitContent::Text { text: t } | UnitContent::Table { text: t, .. } => {
                text.push_str(t);
                text.push_str(unit.separator.as_deref().unwrap_or(default_separator));
            }
            UnitContent::Image { .. } => {
                if !text.is_empty() {
                    blocks.push(ContentBlock::Text(std::mem::take(&mut text)));
                }
                blocks.push(ContentBlock::Image(unit));
            }
        }
    }
    if !text.is_empty() {
        blocks.push(ContentBlock::Text(text));
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PageLocation, UnitMeta};

    fn meta(kind: ElementKind, page: u32) -> UnitMeta {
        UnitMeta::new("/x/0", kind, page, None)
    }

    fn text(id: &str, text: &str) -> OutputUnit {
        OutputUnit::text(id, text, meta(ElementKind::Paragraph, 1))
    }

    fn image(id: &str) -> OutputUnit {
        OutputUnit::image(
            id,
            Some("*Page 1 Image:*".to_string()),
            PageImage::png(vec![1, 2, 3], 4, 4),
            meta(ElementKind::Page, 1).at(PageLocation::End),
        )
    }

    #[test]
    fn test_plain_and_emphasised_text() {
        let units = vec![text("a", "Hello"), text("b", "*Footnote:* x"), text("c", "World")];
        let md = to_markdown(&units, &RenderOptions::default()).unwrap();
        assert_eq!(md, "Hello\n\n\n*Footnote:* x\n\nWorld");
    }

    #[test]
    fn test_separator_override() {
        let units = vec![text("a", "One").with_separator(" | "), text("b", "Two")];
        let md = to_markdown(&units, &RenderOptions::default()).unwrap();
        assert_eq!(md, "One | Two");
    }

    #[test]
    fn test_image_modes() {
        let units = vec![text("a", "Body"), image("/pages/0_img")];

        let embedded = to_markdown(&units, &RenderOptions::default()).unwrap();
        assert!(embedded.contains("![](data:image/png;base64,AQID)"));
        assert!(embedded.contains("\n\n*Page 1 Image:*\n\n![]"));

        let linked = to_markdown(
            &units,
            &RenderOptions::new()
                .with_image_mode(ImageMode::Link)
                .with_image_prefix("img/"),
        )
        .unwrap();
        let name = image_file_name("/pages/0_img", &PageImage::png(vec![], 1, 1));
        assert!(name.ends_with("_img.png"));
        assert_eq!(name.len(), 32 + "_img.png".len());
        assert!(linked.ends_with(&format!("![](img/{})", name)));

        let omitted = to_markdown(
            &units,
            &RenderOptions::new().with_image_mode(ImageMode::Omit),
        )
        .unwrap();
        assert_eq!(omitted, "Body");
    }

    #[test]
    fn test_page_units_excluded() {
        let page_text = OutputUnit::text(
            "/pages/0_text",
            "Page 1",
            meta(ElementKind::Page, 1).at(PageLocation::Start),
        );
        let units = vec![page_text, text("a", "Body")];
        let md = to_markdown(&units, &RenderOptions::new().with_page_units(false)).unwrap();
        assert_eq!(md, "Body");
    }

    #[test]
    fn test_merge_adjacent_text() {
        let units = vec![
            text("a", "One"),
            text("b", "Two"),
            image("/pages/0_img"),
            text("c", "Three"),
        ];
        let blocks = merge_adjacent_text(&units, "\n\n");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], ContentBlock::Text("One\n\nTwo\n\n".to_string()));
        assert!(matches!(blocks[1], ContentBlock::Image(unit) if unit.id == "/pages/0_img"));
        assert_eq!(blocks[2], ContentBlock::Text("Three\n\n".to_string()));
    }

    #[test]
    fn test_chunks_to_markdown() {
        let chunks = vec![vec![text("a", "One")], vec![text("b", "Two")]];
        let md = chunks_to_markdown(&chunks, &RenderOptions::default()).unwrap();
        assert!(md.starts_with("**###### Start of New Chunk ######**"));
        assert_eq!(md.matches("Start of New Chunk").count(), 2);
        assert!(md.ends_with("Two"));
    }

    #[test]
    fn test_save_images() {
        let dir = tempfile::tempdir().unwrap();
        let units = vec![text("a", "Body"), image("/pages/0_img")];
        let written = save_images(&units, dir.path().join("images")).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(std::fs::read(&written[0]).unwrap(), vec![1, 2, 3]);
    }
}
