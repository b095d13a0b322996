//! Page start and end units.

use serde::{Deserialize, Serialize};

use super::{Template, TemplateList, TransformedImage};
use crate::error::Result;
use crate::model::{ElementInfo, Numbering, OutputUnit, PageLocation, UnitMeta};

pub(crate) const PAGE_PLACEHOLDERS: &[&str] = &["page_number"];

/// Where the page image goes relative to the page content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagePlacement {
    Before,
    #[default]
    After,
}

/// Produces the units emitted when a page opens and closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFormatter {
    start_formats: TemplateList,
    end_formats: TemplateList,
    /// `None` disables page images
    image_placement: Option<ImagePlacement>,
    image_intro: Option<Template>,
    adjust_rotation: bool,
}

impl Default for PageFormatter {
    fn default() -> Self {
        Self {
            start_formats: TemplateList::builtin(
                &["\n*Page {page_number} content:*\n"],
                PAGE_PLACEHOLDERS,
            ),
            end_formats: TemplateList::default(),
            image_placement: Some(ImagePlacement::After),
            image_intro: Some(Template::builtin(
                "*Page {page_number} Image:*",
                PAGE_PLACEHOLDERS,
            )),
            adjust_rotation: true,
        }
    }
}

impl PageFormatter {
    pub fn new(
        start_formats: &[impl AsRef<str>],
        end_formats: &[impl AsRef<str>],
        image_placement: Option<ImagePlacement>,
        image_intro: Option<&str>,
        adjust_rotation: bool,
    ) -> Result<Self> {
        Ok(Self {
            start_formats: TemplateList::parse(start_formats, PAGE_PLACEHOLDERS)?,
            end_formats: TemplateList::parse(end_formats, PAGE_PLACEHOLDERS)?,
            image_placement,
            image_intro: image_intro
                .map(|intro| Template::parse(intro, PAGE_PLACEHOLDERS))
                .transpose()?,
            adjust_rotation,
        })
    }

    /// Whether page images are rotated to undo the detected page angle.
    pub fn adjust_rotation(&self) -> bool {
        self.adjust_rotation
    }

    pub fn image_placement(&self) -> Option<ImagePlacement> {
        self.image_placement
    }

    pub fn start_sources(&self) -> Vec<&str> {
        self.start_formats.sources()
    }

    pub fn end_sources(&self) -> Vec<&str> {
        self.end_formats.sources()
    }

    pub fn image_intro_source(&self) -> Option<&str> {
        self.image_intro.as_ref().map(Template::source)
    }

    pub fn start_units(
        &self,
        info: &ElementInfo<'_>,
        image: Option<&TransformedImage>,
        numbering: Option<&Numbering>,
    ) -> Vec<OutputUnit> {
        let meta = page_meta(info, numbering, PageLocation::Start);
        let mut units = Vec::new();
        if self.image_placement == Some(ImagePlacement::Before) {
            units.extend(self.image_unit(info, image, meta.clone()));
        }
        units.extend(self.text_unit(info, &self.start_formats, meta));
        units
    }

    pub fn end_units(
        &self,
        info: &ElementInfo<'_>,
        image: Option<&TransformedImage>,
        numbering: Option<&Numbering>,
    ) -> Vec<OutputUnit> {
        let meta = page_meta(info, numbering, PageLocation::End);
        let mut units = Vec::new();
        units.extend(self.text_unit(info, &self.end_formats, meta.clone()));
        if self.image_placement == Some(ImagePlacement::After) {
            units.extend(self.image_unit(info, image, meta));
        }
        units
    }

    fn text_unit(
        &self,
        info: &ElementInfo<'_>,
        formats: &TemplateList,
        meta: UnitMeta,
    ) -> Option<OutputUnit> {
        let page_number = info.start_page_number.to_string();
        let text = formats.render(&[("page_number", page_number.as_str())])?;
        Some(OutputUnit::text(
            format!("{}_text", info.element_id),
            text,
            meta,
        ))
    }

    fn image_unit(
        &self,
        info: &ElementInfo<'_>,
        image: Option<&TransformedImage>,
        mut meta: UnitMeta,
    ) -> Option<OutputUnit> {
        let image = image?;
        let page_number = info.start_page_number.to_string();
        let intro = self
            .image_intro
            .as_ref()
            .map(|intro| intro.render(&[("page_number", page_number.as_str())]));
        meta.rotation_applied = image.rotation_applied;
        Some(OutputUnit::image(
            format!("{}_img", info.element_id),
            intro,
            image.image.clone(),
            meta,
        ))
    }
}

fn page_meta(
    info: &ElementInfo<'_>,
    numbering: Option<&Numbering>,
    location: PageLocation,
) -> UnitMeta {
    UnitMeta::new(
        info.element_id.clone(),
        info.kind(),
        info.start_page_number,
        numbering.cloned(),
    )
    .at(location)
}
