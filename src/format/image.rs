//! Page image transforms and figure cropping geometry.
//!
//! Pixel operations are delegated to an [`ImageTransformer`]; this module only
//! decides which page image to use and where a figure lies on it.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::model::{BoundingRegion, Figure, Page, PageImage, PageImages};

/// An axis-aligned pixel rectangle, right and bottom exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl PixelRect {
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }
}

/// Pixel transforms applied to page images.
pub trait ImageTransformer: Send + Sync {
    /// Rotate `image` counterclockwise by `angle` degrees onto an expanded
    /// canvas. `None` means the image was left as is.
    fn rotate(&self, image: &PageImage, angle: f64) -> Result<Option<PageImage>>;

    /// Cut `rect` out of `image`.
    fn crop(&self, image: &PageImage, rect: PixelRect) -> Result<PageImage>;
}

/// Transformer that returns every image unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransformer;

impl ImageTransformer for IdentityTransformer {
    fn rotate(&self, _image: &PageImage, _angle: f64) -> Result<Option<PageImage>> {
        Ok(None)
    }

    fn crop(&self, image: &PageImage, _rect: PixelRect) -> Result<PageImage> {
        Ok(image.clone())
    }
}

/// A page image after rotation correction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedImage {
    pub image: PageImage,
    pub original: PageImage,
    /// Rotation in degrees, when one was applied
    pub rotation_applied: Option<f64>,
}

/// Lazily transformed page images for one document.
pub struct PageImageCache<'a> {
    source: Option<&'a PageImages>,
    transformer: &'a dyn ImageTransformer,
    adjust_rotation: bool,
    transformed: BTreeMap<u32, TransformedImage>,
}

impl<'a> PageImageCache<'a> {
    /// Create a cache over `source`, whose keys must equal `page_numbers`.
    pub fn new(
        source: Option<&'a PageImages>,
        page_numbers: impl IntoIterator<Item = u32>,
        transformer: &'a dyn ImageTransformer,
        adjust_rotation: bool,
    ) -> Result<Self> {
        if let Some(images) = source {
            let expected: Vec<u32> = page_numbers.into_iter().collect();
            let actual: Vec<u32> = images.keys().copied().collect();
            if expected != actual {
                return Err(Error::Consistency(format!(
                    "page images {:?} do not match the document pages {:?}",
                    actual, expected
                )));
            }
        }
        Ok(Self {
            source,
            transformer,
            adjust_rotation,
            transformed: BTreeMap::new(),
        })
    }

    /// Whether page images were supplied at all.
    pub fn has_images(&self) -> bool {
        self.source.is_some()
    }

    /// Transform the image of `page` once and return it.
    pub fn ensure(&mut self, page: &Page) -> Result<Option<&TransformedImage>> {
        let Some(images) = self.source else {
            return Ok(None);
        };
        if !self.transformed.contains_key(&page.page_number) {
            let Some(original) = images.get(&page.page_number) else {
                return Ok(None);
            };
            let angle = page.angle.unwrap_or(0.0);
            let rotated = if self.adjust_rotation && angle != 0.0 {
                self.transformer.rotate(original, angle)?
            } else {
                None
            };
            let transformed = match rotated {
                Some(image) => TransformedImage {
                    image,
                    original: original.clone(),
                    rotation_applied: Some(angle),
                },
                None => TransformedImage {
                    image: original.clone(),
                    original: original.clone(),
                    rotation_applied: None,
                },
            };
            self.transformed.insert(page.page_number, transformed);
        }
        Ok(self.transformed.get(&page.page_number))
    }

    pub fn get(&self, page_number: u32) -> Option<&TransformedImage> {
        self.transformed.get(&page_number)
    }

    pub fn transformer(&self) -> &dyn ImageTransformer {
        self.transformer
    }
}

/// Pixel rectangle of `figure` on the image of `page`.
///
/// Only the regions on `page` are used. Polygons are scaled from page units
/// to the original image's pixels, merged into one bounding rectangle, and
/// moved onto the rotated canvas when a rotation was applied.
pub fn figure_pixel_rect(
    figure: &Figure,
    page: &Page,
    image: &TransformedImage,
) -> Option<PixelRect> {
    let (page_width, page_height) = page.dimensions()?;
    let original = &image.original;
    let scale_x = original.width as f64 / page_width;
    let scale_y = original.height as f64 / page_height;

    let points: Vec<(f64, f64)> = figure
        .bounding_regions
        .iter()
        .filter(|region| region.page_number == page.page_number)
        .flat_map(region_points)
        .map(|(x, y)| (x * scale_x, y * scale_y))
        .collect();
    let (min_x, min_y, max_x, max_y) = bounding_box(&points)?;

    let corners = [(min_x, min_y), (max_x, min_y), (max_x, max_y), (min_x, max_y)];
    let corners: Vec<(f64, f64)> = match image.rotation_applied {
        Some(angle) => corners
            .iter()
            .map(|&point| {
                rotate_point(
                    point,
                    angle,
                    original.width as f64,
                    original.height as f64,
                )
            })
            .collect(),
        None => corners.to_vec(),
    };
    let (min_x, min_y, max_x, max_y) = bounding_box(&corners)?;

    let target = &image.image;
    let clamp = |value: f64, limit: u32| value.round().clamp(0.0, limit as f64) as u32;
    let rect = PixelRect {
        left: clamp(min_x, target.width),
        top: clamp(min_y, target.height),
        right: clamp(max_x, target.width),
        bottom: clamp(max_y, target.height),
    };
    (rect.width() > 0 && rect.height() > 0).then_some(rect)
}

fn region_points(region: &BoundingRegion) -> impl Iterator<Item = (f64, f64)> + '_ {
    region
        .polygon
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
}

fn bounding_box(points: &[(f64, f64)]) -> Option<(f64, f64, f64, f64)> {
    if points.is_empty() {
        return None;
    }
    let init = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    Some(
        points
            .iter()
            .fold(init, |(min_x, min_y, max_x, max_y), &(x, y)| {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            }),
    )
}

/// Move a point of a `width` x `height` image onto the canvas of the same
/// image rotated counterclockwise by `angle` degrees with expansion.
pub fn rotate_point(point: (f64, f64), angle: f64, width: f64, height: f64) -> (f64, f64) {
    let theta = angle.to_radians();
    let (sin, cos) = theta.sin_cos();
    let new_width = (width * cos).abs() + (height * sin).abs();
    let new_height = (width * sin).abs() + (height * cos).abs();

    let dx = point.0 - width / 2.0;
    let dy = point.1 - height / 2.0;
    let rx = dx * cos + dy * sin;
    let ry = -dx * sin + dy * cos;
    (rx + new_width / 2.0, ry + new_height / 2.0)
}
