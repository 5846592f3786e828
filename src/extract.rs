// Region extractor: rasterize a page rectangle into a compressed image
use std::path::Path;

use image::RgbImage;
use pdfium_render::prelude::*;

use crate::error::{LabelError, Result};
use crate::geometry::{Rect, RegionSpec};
use crate::pdf;

/// A rasterized page region: JPEG bytes plus pixel dimensions, tagged with
/// the spec it was extracted from. Transient; never written to storage here.
#[derive(Debug, Clone)]
pub struct ExtractedImage {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub spec: RegionSpec,
}

impl ExtractedImage {
    /// Encode an RGB raster as JPEG at the spec's quality.
    pub fn encode(img: &RgbImage, spec: RegionSpec) -> Result<Self> {
        let mut jpeg = Vec::new();
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, spec.quality)
            .encode_image(img)
            .map_err(|e| LabelError::extraction(format!("jpeg encode: {e}")))?;
        Ok(Self {
            jpeg,
            width: img.width(),
            height: img.height(),
            spec,
        })
    }
}

/// Check that a region lies strictly inside the page box. Callers must not
/// clamp: a clipped rectangle would silently corrupt the composed sheet.
pub(crate) fn validate_region(rect: &Rect, page_width: f32, page_height: f32) -> Result<()> {
    let ok = rect.x0.is_finite()
        && rect.y0.is_finite()
        && rect.x1.is_finite()
        && rect.y1.is_finite()
        && rect.x0 >= 0.0
        && rect.y0 >= 0.0
        && rect.x0 < rect.x1
        && rect.y0 < rect.y1
        && rect.x1 <= page_width
        && rect.y1 <= page_height;
    if ok {
        Ok(())
    } else {
        Err(LabelError::extraction(format!(
            "rect ({}, {}, {}, {}) outside page bounds {page_width}x{page_height}",
            rect.x0, rect.y0, rect.x1, rect.y1
        )))
    }
}

/// Map a top-left-origin point rect to a pixel window of the rendered page.
pub(crate) fn pixel_window(
    rect: &Rect,
    page_width: f32,
    page_height: f32,
    image_width: u32,
    image_height: u32,
) -> (u32, u32, u32, u32) {
    // The renderer rounds pixel dimensions, so derive the effective scale
    // from the rendered surface rather than reusing dpi / 72 directly.
    let scale_x = image_width as f32 / page_width;
    let scale_y = image_height as f32 / page_height;

    let left = (rect.x0 * scale_x).floor().max(0.0) as u32;
    let top = (rect.y0 * scale_y).floor().max(0.0) as u32;
    let right = ((rect.x1 * scale_x).ceil() as u32).min(image_width);
    let bottom = ((rect.y1 * scale_y).ceil() as u32).min(image_height);

    (left, top, right.max(left + 1) - left, bottom.max(top + 1) - top)
}

/// Rasterize one page region at the spec's DPI and compress it.
///
/// The page is rendered at dpi / 72 of its native point size and the region
/// is cut out of the rendered surface; any alpha channel is flattened to
/// three-channel color before encoding.
pub fn extract_region(pdf_path: &Path, page_index: u16, spec: &RegionSpec) -> Result<ExtractedImage> {
    pdf::with_pdfium(|pdfium| {
        let document = pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| LabelError::extraction(format!("{}: {e}", pdf_path.display())))?;

        let pages = document.pages();
        if page_index >= pages.len() {
            return Err(LabelError::extraction(format!(
                "page {page_index} out of range ({} pages) in {}",
                pages.len(),
                pdf_path.display()
            )));
        }
        let page = pages
            .get(page_index)
            .map_err(|e| LabelError::extraction(format!("{}: {e}", pdf_path.display())))?;

        let page_width = page.width().value;
        let page_height = page.height().value;
        validate_region(&spec.rect, page_width, page_height)?;

        let scale = spec.dpi as f32 / 72.0;
        let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| LabelError::extraction(format!("render: {e}")))?;
        let rendered = bitmap.as_image();

        let (left, top, width, height) = pixel_window(
            &spec.rect,
            page_width,
            page_height,
            rendered.width(),
            rendered.height(),
        );
        let region = rendered.crop_imm(left, top, width, height).to_rgb8();

        ExtractedImage::encode(&region, *spec)
    })
}
