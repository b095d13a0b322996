use std::collections::BTreeMap;

use super::ImageCaptioner;
use crate::error::Result;
use crate::model::{OutputUnit, UnitContent};

/// Fill the description of every image unit with the captioner's output.
///
/// The captioner sees the image, the text units of the image's page joined
/// with newlines, and the image's own text as caption. Returns the number of
/// images described.
pub async fn caption_images(
    units: &mut [OutputUnit],
    captioner: &dyn ImageCaptioner,
) -> Result<usize> {
    let mut page_texts: BTreeMap<u32, Vec<&str>> = BTreeMap::new();
    for unit in units.iter() {
        if let UnitContent::Text { text } | UnitContent::Table { text, .. } = &unit.content {
            page_texts.entry(unit.meta.page_number).or_default().push(text);
        }
    }
    let page_texts: BTreeMap<u32, String> = page_texts
        .into_iter()
        .map(|(page, texts)| (page, texts.join("\n")))
        .collect();

    let mut described = 0;
    for unit in units.iter_mut() {
        let page_text = page_texts
            .get(&unit.meta.page_number)
            .map(String::as_str)
            .unwrap_or_default();
        if let UnitContent::Image {
            text,
            image,
            description,
        } = &mut unit.content
        {
            let result = captioner.describe(image, page_text, text.as_deref()).await?;
            log::info!("described image {}", unit.id);
            *description = Some(result);
            described += 1;
        }
    }
    Ok(described)
}
