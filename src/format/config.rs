//! JSON description of every formatter.
//!
//! Every field is optional; anything left out keeps the built-in default.
//! A field set to `null` disables that output.
//!
//! ```json
//! {
//!   "page": { "startFormats": ["--- page {page_number} ---"], "imagePlacement": null },
//!   "paragraph": { "pageHeader": "*Header:* {content}" },
//!   "section": { "textFormat": "Section {section_incremental_id}", "maxDepth": 2 }
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::{
    FigureFormatter, Formatters, ImagePlacement, KeyValueFormatter, LineFormatter,
    PageFormatter, ParagraphFormatter, SectionFormatter, SelectionMarkFormatter,
    TableFormatter, WordFormatter,
};
use crate::error::Result;

/// Distinguishes a missing field (keep the default) from `null` (disable).
type Setting<T> = Option<Option<T>>;

fn setting<'de, D, T>(deserializer: D) -> std::result::Result<Setting<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatConfig {
    pub page: PageConfig,
    pub section: SectionConfig,
    pub paragraph: ParagraphConfig,
    #[serde(deserialize_with = "setting")]
    pub line: Setting<String>,
    #[serde(deserialize_with = "setting")]
    pub word: Setting<String>,
    #[serde(deserialize_with = "setting")]
    pub key_value_pair: Setting<String>,
    pub table: TableConfig,
    pub figure: FigureConfig,
    pub selection_marks: Option<SelectionMarkFormatter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageConfig {
    pub start_formats: Option<Vec<String>>,
    pub end_formats: Option<Vec<String>>,
    #[serde(deserialize_with = "setting")]
    pub image_placement: Setting<ImagePlacement>,
    #[serde(deserialize_with = "setting")]
    pub image_intro: Setting<String>,
    pub adjust_rotation: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionConfig {
    pub text_format: Option<String>,
    #[serde(deserialize_with = "setting")]
    pub max_depth: Setting<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParagraphConfig {
    #[serde(deserialize_with = "setting")]
    pub general: Setting<String>,
    #[serde(deserialize_with = "setting")]
    pub title: Setting<String>,
    #[serde(deserialize_with = "setting")]
    pub section_heading: Setting<String>,
    #[serde(deserialize_with = "setting")]
    pub footnote: Setting<String>,
    #[serde(deserialize_with = "setting")]
    pub formula_block: Setting<String>,
    #[serde(deserialize_with = "setting")]
    pub page_header: Setting<String>,
    #[serde(deserialize_with = "setting")]
    pub page_footer: Setting<String>,
    #[serde(deserialize_with = "setting")]
    pub page_number: Setting<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableConfig {
    pub before_formats: Option<Vec<String>>,
    pub after_formats: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FigureConfig {
    pub before_formats: Option<Vec<String>>,
    pub after_formats: Option<Vec<String>>,
    pub output_image: Option<bool>,
    #[serde(deserialize_with = "setting")]
    pub image_text: Setting<String>,
}

impl FormatConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate every template and build the formatter set.
    pub fn build(&self) -> Result<Formatters> {
        let defaults = Formatters::default();
        Ok(Formatters {
            page: self.page.build(&defaults.page)?,
            section: self.section.build(&defaults.section)?,
            paragraph: self.paragraph.build(&defaults.paragraph)?,
            line: match &self.line {
                Some(format) => LineFormatter::new(format.as_deref())?,
                None => defaults.line,
            },
            word: match &self.word {
                Some(format) => WordFormatter::new(format.as_deref())?,
                None => defaults.word,
            },
            key_value: match &self.key_value_pair {
                Some(format) => KeyValueFormatter::new(format.as_deref())?,
                None => defaults.key_value,
            },
            table: self.table.build(&defaults.table)?,
            figure: self.figure.build(&defaults.figure)?,
            selection_marks: self.selection_marks.clone().unwrap_or_default(),
        })
    }
}

fn sources_or(configured: &Option<Vec<String>>, default: Vec<&str>) -> Vec<String> {
    configured
        .clone()
        .unwrap_or_else(|| default.into_iter().map(str::to_string).collect())
}

impl PageConfig {
    fn build(&self, defaults: &PageFormatter) -> Result<PageFormatter> {
        PageFormatter::new(
            &sources_or(&self.start_formats, defaults.start_sources()),
            &sources_or(&self.end_formats, defaults.end_sources()),
            self.image_placement
                .unwrap_or(defaults.image_placement()),
            match &self.image_intro {
                Some(intro) => intro.as_deref(),
                None => defaults.image_intro_source(),
            },
            self.adjust_rotation.unwrap_or(defaults.adjust_rotation()),
        )
    }
}

impl SectionConfig {
    fn build(&self, defaults: &SectionFormatter) -> Result<SectionFormatter> {
        let max_depth = match self.max_depth {
            Some(depth) => depth,
            None => defaults.max_depth().map(|d| d as i64),
        };
        SectionFormatter::new(self.text_format.as_deref(), max_depth)
    }
}

impl ParagraphConfig {
    fn build(&self, defaults: &ParagraphFormatter) -> Result<ParagraphFormatter> {
        let pick = |setting: &Setting<String>, default: &Option<super::Template>| match setting {
            Some(format) => ParagraphFormatter::parse_format(format.as_deref()),
            None => Ok(default.clone()),
        };
        Ok(ParagraphFormatter {
            general: pick(&self.general, &defaults.general)?,
            title: pick(&self.title, &defaults.title)?,
            section_heading: pick(&self.section_heading, &defaults.section_heading)?,
            footnote: pick(&self.footnote, &defaults.footnote)?,
            formula_block: pick(&self.formula_block, &defaults.formula_block)?,
            page_header: pick(&self.page_header, &defaults.page_header)?,
            page_footer: pick(&self.page_footer, &defaults.page_footer)?,
            page_number: pick(&self.page_number, &defaults.page_number)?,
        })
    }
}

impl TableConfig {
    fn build(&self, defaults: &TableFormatter) -> Result<TableFormatter> {
        TableFormatter::new(
            &sources_or(&self.before_formats, defaults.before_sources()),
            &sources_or(&self.after_formats, defaults.after_sources()),
        )
    }
}

impl FigureConfig {
    fn build(&self, defaults: &FigureFormatter) -> Result<FigureFormatter> {
        FigureFormatter::new(
            &sources_or(&self.before_formats, defaults.before_sources()),
            &sources_or(&self.after_formats, defaults.after_sources()),
            self.output_image.unwrap_or(defaults.output_image()),
            match &self.image_text {
                Some(text) => text.as_deref(),
                None => defaults.image_text_source(),
            },
        )
    }
}
