//! Rendering module for converting output units to Markdown and JSON.

mod json;
mod markdown;
mod options;

pub use json::{to_json, JsonFormat};
pub use markdown::{
    chunks_to_markdown, image_file_name, merge_adjacent_text, save_images, to_markdown,
    ContentBlock, MarkdownRenderer,
};
pub use options::{ImageMode, PageSelection, RenderOptions};
