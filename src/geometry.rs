// Geometry registry: crop and placement rectangles per carrier
//
// All rectangles are in page points with a top-left origin (y grows downward),
// matching the coordinate convention of the source label layouts. The composer
// converts to PDF user space (bottom-left origin) when it writes the sheet.
use serde::{Deserialize, Serialize};

use crate::category::Category;

// Output sheet: landscape A5 in points at 72 dpi-equivalent units
pub const SHEET_WIDTH: f32 = 595.0;
pub const SHEET_HEIGHT: f32 = 420.0;

// Rasterization parameters shared by both extracted regions
pub const REGION_DPI: u32 = 260;
pub const JPEG_QUALITY: u8 = 75;

// Vertical dashed cut guide down the middle of the sheet
pub const CUT_GUIDE_X: f32 = 297.0;
pub const CUT_SEGMENT_LEN: f32 = 2.0;
pub const CUT_PERIOD: f32 = 3.0;
pub const CUT_Y_START: f32 = 1.0;
pub const CUT_Y_END: f32 = 419.0;
pub const CUT_LINE_WIDTH: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// One crop operation: a rectangle plus rendering parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionSpec {
    pub rect: Rect,
    pub dpi: u32,
    pub quality: u8,
}

impl RegionSpec {
    pub const fn new(rect: Rect) -> Self {
        Self {
            rect,
            dpi: REGION_DPI,
            quality: JPEG_QUALITY,
        }
    }
}

/// A source crop paired with its destination placement on the output sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetGeometry {
    pub source: RegionSpec,
    pub dest: Rect,
}

/// Promo region of the flyer intermediate; category-independent.
pub fn promo_geometry() -> SheetGeometry {
    SheetGeometry {
        source: RegionSpec::new(Rect::new(6.0, 10.0, 297.0, 410.0)),
        dest: Rect::new(0.0, 0.0, 297.0, 420.0),
    }
}

impl Category {
    /// Label crop and placement for this carrier.
    pub fn geometry(self) -> SheetGeometry {
        match self {
            Category::MercadoLibre => SheetGeometry {
                source: RegionSpec::new(Rect::new(30.0, 140.0, 297.0, 600.0)),
                dest: Rect::new(297.0, 10.0, 595.0, 420.0),
            },
            Category::CorreoArg => SheetGeometry {
                source: RegionSpec::new(Rect::new(50.0, 57.0, 305.0, 490.0)),
                dest: Rect::new(297.0, 10.0, 595.0, 420.0),
            },
        }
    }
}

/// Dashed cut-guide segments as (y_top, y_bottom) pairs along `CUT_GUIDE_X`.
pub fn cut_guide_segments() -> Vec<(f32, f32)> {
    let mut segments = Vec::new();
    let mut y = CUT_Y_START;
    while y + CUT_SEGMENT_LEN <= CUT_Y_END {
        segments.push((y, y + CUT_SEGMENT_LEN));
        y += CUT_PERIOD;
    }
    segments
}

/// Box for the scissors icon near the bottom of the cut guide.
pub fn scissors_rect() -> Rect {
    Rect::new(
        CUT_GUIDE_X - 6.0,
        CUT_Y_END - 18.0,
        CUT_GUIDE_X + 6.0,
        CUT_Y_END,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inside_sheet(rect: &Rect) -> bool {
        rect.x0 >= 0.0 && rect.y0 >= 0.0 && rect.x1 <= SHEET_WIDTH && rect.y1 <= SHEET_HEIGHT
    }

    #[test]
    fn every_category_has_one_geometry_pair_inside_the_sheet() {
        for category in Category::ALL {
            let geo = category.geometry();
            assert!(geo.source.rect.width() > 0.0);
            assert!(geo.source.rect.height() > 0.0);
            assert!(inside_sheet(&geo.dest), "{category} dest escapes the sheet");
        }
        assert!(inside_sheet(&promo_geometry().dest));
    }

    #[test]
    fn cut_guide_has_expected_segment_count() {
        let segments = cut_guide_segments();
        let expected = ((CUT_Y_END - CUT_Y_START) / CUT_PERIOD).floor() as usize;
        assert_eq!(expected, 139);
        assert_eq!(segments.len(), expected);
        // Segments stay on the sheet
        let (first_top, _) = segments[0];
        let (_, last_bottom) = segments[segments.len() - 1];
        assert_eq!(first_top, CUT_Y_START);
        assert!(last_bottom <= CUT_Y_END);
    }

    #[test]
    fn scissors_box_sits_on_the_guide() {
        let rect = scissors_rect();
        assert_eq!((rect.x0 + rect.x1) / 2.0, CUT_GUIDE_X);
        assert_eq!(rect.y1, CUT_Y_END);
    }
}
