// Promotional flyer generation: QR code stamped onto the static template
use std::path::PathBuf;

use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use qrcode::QrCode;
use tracing::info;

use crate::config::Config;
use crate::error::{LabelError, Result};
use crate::extract::ExtractedImage;
use crate::geometry::{Rect, RegionSpec};

// Where the QR lands on the template's first page (top-left origin points)
const QR_RECT: Rect = Rect::new(190.0, 295.0, 259.0, 364.0);
const QR_JPEG_QUALITY: u8 = 90;

/// Produces the promotional intermediate consumed by the sheet composer.
/// Injectable so the pipeline can run against a stub in tests.
pub trait FlyerGenerator {
    fn generate(&self, medium: &str, order: &str) -> Result<PathBuf>;
}

/// Shop URL carried by the QR code for one order. The parameter names are
/// what the shop backend expects.
pub(crate) fn promo_url(shop_url: &str, medium: &str, order: &str) -> String {
    format!("{shop_url}?origen={medium}&id={order}")
}

pub struct QrFlyer {
    config: Config,
}

impl QrFlyer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

fn media_box_height(doc: &Document, page_dict: &lopdf::Dictionary) -> f32 {
    // MediaBox may be a direct array or a reference; default to US Letter
    let fallback = 792.0;
    let Ok(media_box) = page_dict.get(b"MediaBox") else {
        return fallback;
    };
    let array = match media_box {
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Array(a)) => a.clone(),
            _ => return fallback,
        },
        Object::Array(a) => a.clone(),
        _ => return fallback,
    };
    let mut bounds = Vec::new();
    for value in &array {
        match value {
            Object::Integer(i) => bounds.push(*i as f32),
            Object::Real(f) => bounds.push(*f),
            _ => {}
        }
    }
    if bounds.len() == 4 {
        bounds[3] - bounds[1]
    } else {
        fallback
    }
}

impl FlyerGenerator for QrFlyer {
    fn generate(&self, medium: &str, order: &str) -> Result<PathBuf> {
        let template = self.config.flyer_template();
        if !template.exists() {
            return Err(LabelError::MissingInput { path: template });
        }

        let url = promo_url(&self.config.shop_url, medium, order);
        let code = QrCode::new(url.as_bytes())
            .map_err(|e| LabelError::composition(format!("qr encode: {e}")))?;
        let qr = code.render::<image::Luma<u8>>().build();
        // The QR never touches disk; it is embedded straight from memory
        let rgb = DynamicImage::ImageLuma8(qr).to_rgb8();
        let mut spec = RegionSpec::new(QR_RECT);
        spec.quality = QR_JPEG_QUALITY;
        let qr_image = ExtractedImage::encode(&rgb, spec)?;

        let mut doc = Document::load(&template)?;
        let page_id = *doc
            .get_pages()
            .get(&1)
            .ok_or_else(|| LabelError::composition(format!("{} has no pages", template.display())))?;
        let page_height = {
            let page_dict = doc.get_object(page_id)?.as_dict()?.clone();
            media_box_height(&doc, &page_dict)
        };

        let xobject_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => qr_image.width as i64,
                "Height" => qr_image.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            qr_image.jpeg.clone(),
        ));
        doc.add_xobject(page_id, "ImQr", xobject_id)?;

        let operations = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(QR_RECT.width()),
                    Object::Real(0.0),
                    Object::Real(0.0),
                    Object::Real(QR_RECT.height()),
                    Object::Real(QR_RECT.x0),
                    Object::Real(page_height - QR_RECT.y1),
                ],
            ),
            Operation::new("Do", vec!["ImQr".into()]),
            Operation::new("Q", vec![]),
        ];
        doc.add_to_page_content(page_id, Content { operations })?;

        let intermediate = self.config.flyer_intermediate();
        if let Some(parent) = intermediate.parent() {
            std::fs::create_dir_all(parent)?;
        }
        doc.save(&intermediate)?;
        info!(flyer = %intermediate.display(), "promotional intermediate ready");
        Ok(intermediate)
    }
}
