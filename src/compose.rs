// Sheet composer: two extracted regions onto one A5 landscape page
//
// The output page is assembled from scratch with lopdf: both regions are
// embedded as DCTDecode image XObjects, the dashed cut guide is stroked down
// the middle, and the optional scissors icon is stamped near the bottom.
use std::fs;
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::{info, warn};

use crate::category::Category;
use crate::config::Config;
use crate::error::{LabelError, Result};
use crate::extract::{extract_region, ExtractedImage};
use crate::geometry::{
    cut_guide_segments, promo_geometry, scissors_rect, Rect, RegionSpec, SheetGeometry,
    CUT_GUIDE_X, CUT_LINE_WIDTH, SHEET_HEIGHT, SHEET_WIDTH,
};

/// Deletes the promotional intermediate on every exit path, including errors
/// raised partway through composition.
struct TempGuard(PathBuf);

impl Drop for TempGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.0) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(file = %self.0.display(), "failed to remove intermediate: {e}");
            }
        }
    }
}

fn image_xobject(image: &ExtractedImage) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => image.width as i64,
            "Height" => image.height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        image.jpeg.clone(),
    )
}

/// Largest aspect-preserving placement of an image inside a destination box,
/// centered, in top-left page coordinates.
fn fit_rect(img_width: u32, img_height: u32, dest: &Rect) -> (f32, f32, f32, f32) {
    let scale = (dest.width() / img_width as f32).min(dest.height() / img_height as f32);
    let width = img_width as f32 * scale;
    let height = img_height as f32 * scale;
    let x = dest.x0 + (dest.width() - width) / 2.0;
    let y_top = dest.y0 + (dest.height() - height) / 2.0;
    (x, y_top, width, height)
}

fn place_image_ops(name: &str, image: &ExtractedImage, dest: &Rect) -> Vec<Operation> {
    let (x, y_top, width, height) = fit_rect(image.width, image.height, dest);
    // PDF user space has a bottom-left origin; the geometry table is top-left
    let y = SHEET_HEIGHT - (y_top + height);
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                Object::Real(width),
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(height),
                Object::Real(x),
                Object::Real(y),
            ],
        ),
        Operation::new("Do", vec![name.into()]),
        Operation::new("Q", vec![]),
    ]
}

fn cut_guide_ops() -> Vec<Operation> {
    let mut ops = vec![
        Operation::new("q", vec![]),
        Operation::new("w", vec![Object::Real(CUT_LINE_WIDTH)]),
        Operation::new(
            "RG",
            vec![Object::Real(0.0), Object::Real(0.0), Object::Real(0.0)],
        ),
    ];
    for (y_top, y_bottom) in cut_guide_segments() {
        ops.push(Operation::new(
            "m",
            vec![Object::Real(CUT_GUIDE_X), Object::Real(SHEET_HEIGHT - y_top)],
        ));
        ops.push(Operation::new(
            "l",
            vec![
                Object::Real(CUT_GUIDE_X),
                Object::Real(SHEET_HEIGHT - y_bottom),
            ],
        ));
        ops.push(Operation::new("S", vec![]));
    }
    ops.push(Operation::new("Q", vec![]));
    ops
}

/// Assemble the output document: promo on the left half, label overlaid on
/// the right half (ordering matters where the destinations touch), then the
/// cut guide and the optional scissors icon.
pub fn build_sheet(
    promo: &ExtractedImage,
    label: &ExtractedImage,
    geometry: &SheetGeometry,
    scissors: Option<&ExtractedImage>,
) -> Result<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let promo_id = doc.add_object(image_xobject(promo));
    let label_id = doc.add_object(image_xobject(label));

    let mut xobjects = dictionary! {
        "ImPromo" => promo_id,
        "ImLabel" => label_id,
    };
    let mut operations = Vec::new();
    operations.extend(place_image_ops("ImPromo", promo, &promo_geometry().dest));
    operations.extend(place_image_ops("ImLabel", label, &geometry.dest));
    operations.extend(cut_guide_ops());

    if let Some(icon) = scissors {
        let icon_id = doc.add_object(image_xobject(icon));
        xobjects.set("ImScissors", icon_id);
        operations.extend(place_image_ops("ImScissors", icon, &scissors_rect()));
    }

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().map_err(LabelError::composition)?,
    ));
    let resources_id = doc.add_object(dictionary! {
        "XObject" => Object::Dictionary(xobjects),
    });
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            (SHEET_WIDTH as i64).into(),
            (SHEET_HEIGHT as i64).into(),
        ],
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    Ok(doc)
}

fn load_scissors(path: &Path) -> Option<ExtractedImage> {
    if !path.exists() {
        return None;
    }
    // A broken icon only costs the stamp; the cut line alone is sufficient
    match image::open(path) {
        Ok(img) => {
            let spec = RegionSpec::new(scissors_rect());
            match ExtractedImage::encode(&img.to_rgb8(), spec) {
                Ok(icon) => Some(icon),
                Err(e) => {
                    warn!(file = %path.display(), "unusable scissors icon: {e}");
                    None
                }
            }
        }
        Err(e) => {
            warn!(file = %path.display(), "unusable scissors icon: {e}");
            None
        }
    }
}

/// Produce the finished sheet for a classified label document.
///
/// The promotional intermediate must already exist (the flyer generator runs
/// first); it is deleted on the way out no matter how composition ends.
pub fn compose_sheet(
    config: &Config,
    category_label: &str,
    label_pdf: &Path,
    output: &Path,
) -> Result<()> {
    let promo_pdf = config.flyer_intermediate();
    if !promo_pdf.exists() {
        warn!(
            "missing {}; run the flyer step before composing",
            promo_pdf.display()
        );
        return Err(LabelError::MissingInput { path: promo_pdf });
    }
    if !label_pdf.exists() {
        return Err(LabelError::MissingInput {
            path: label_pdf.to_path_buf(),
        });
    }

    let category: Category = match category_label.parse() {
        Ok(category) => category,
        Err(e) => {
            warn!(category = category_label, "no geometry entry for this carrier");
            return Err(e);
        }
    };
    let _guard = TempGuard(promo_pdf.clone());
    let geometry = category.geometry();

    let promo = extract_region(&promo_pdf, 0, &promo_geometry().source)
        .map_err(LabelError::composition)?;
    let label = extract_region(label_pdf, 0, &geometry.source).map_err(LabelError::composition)?;
    let scissors = load_scissors(&config.scissors_icon());

    let mut doc = build_sheet(&promo, &label, &geometry, scissors.as_ref())?;
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(LabelError::composition)?;
    }
    doc.compress();
    if let Err(e) = doc.save(output) {
        // Never leave a partial sheet behind
        let _ = fs::remove_file(output);
        return Err(LabelError::composition(e));
    }
    info!(output = %output.display(), category = %category, "sheet composed");
    Ok(())
}
