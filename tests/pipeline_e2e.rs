// Full pipeline runs over synthetic PDFs.
//
// These tests rasterize through pdfium, so they are ignored unless a pdfium
// shared library is reachable (LABELPRESS_PDFIUM_PATH or the system loader).
use std::fs;
use std::path::Path;

use labelpress::classifier::train_from_corpus;
use labelpress::error::{LabelError, Result};
use labelpress::extract::extract_region;
use labelpress::flyer::{FlyerGenerator, QrFlyer};
use labelpress::geometry::{Rect, RegionSpec};
use labelpress::print::PrintSink;
use labelpress::{Config, Pipeline};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// A print sink that always fails; a finished sheet must survive it.
struct BrokenPrinter;

impl PrintSink for BrokenPrinter {
    fn print(&self, _sheet: &Path) -> Result<()> {
        Err(LabelError::Print {
            reason: "spooler offline".to_string(),
        })
    }
}

/// Write a single-page A4 PDF whose text layer is `lines` in Courier.
fn write_text_pdf(path: &Path, lines: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
        operations.push(Operation::new(
            "Td",
            vec![60.into(), (720 - 20 * i as i64).into()],
        ));
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("ET", vec![]));
    }
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
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
    doc.save(path).unwrap();
}

fn trained_config(base: &Path) -> Config {
    let config = Config::new(base);
    config.ensure_dirs().unwrap();

    let mut texts = Vec::new();
    let mut labels = Vec::new();
    for i in 0..10 {
        texts.push(format!("mercado envios flex guia despacho colecta {i}"));
        labels.push("MercadoLibre".to_string());
        texts.push(format!("correo argentino sucursal encomienda franqueo {i}"));
        labels.push("CorreoArg".to_string());
    }
    let (classifier, _) = train_from_corpus(&texts, &labels, Vec::new()).unwrap();
    classifier.save(&config.model_dir()).unwrap();

    write_text_pdf(&config.flyer_template(), &["flyer promo"]);
    config
}

#[test]
#[ignore = "requires a pdfium shared library"]
fn pipeline_produces_sheet_archives_input_and_cleans_tmp() {
    let dir = tempfile::tempdir().unwrap();
    let config = trained_config(dir.path());
    write_text_pdf(
        &dir.path().join("meli-123456.pdf"),
        &["mercado envios flex", "guia despacho colecta"],
    );

    let pipeline = Pipeline::with_collaborators(
        config.clone(),
        Box::new(QrFlyer::new(config.clone())),
        Box::new(BrokenPrinter),
    );
    let sheet = pipeline.run().unwrap();

    assert_eq!(sheet, config.out_dir().join("meli123456.pdf"));
    assert!(sheet.exists());
    // Original archived next to the sheet
    assert!(!dir.path().join("meli-123456.pdf").exists());
    assert!(config.out_dir().join("meli-123456.pdf").exists());
    // No stale intermediates
    assert!(fs::read_dir(config.temp_dir()).unwrap().next().is_none());
}

#[test]
#[ignore = "requires a pdfium shared library"]
fn repeated_extraction_yields_identical_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("label.pdf");
    write_text_pdf(&pdf, &["mercado envios flex", "guia despacho"]);

    let spec = RegionSpec::new(Rect::new(30.0, 140.0, 297.0, 600.0));
    let first = extract_region(&pdf, 0, &spec).unwrap();
    let second = extract_region(&pdf, 0, &spec).unwrap();
    assert_eq!((first.width, first.height), (second.width, second.height));
}

#[test]
#[ignore = "requires a pdfium shared library"]
fn label_outside_the_registry_aborts_before_the_flyer_runs() {
    struct PanicFlyer;
    impl FlyerGenerator for PanicFlyer {
        fn generate(&self, _: &str, _: &str) -> Result<std::path::PathBuf> {
            panic!("flyer must not run for an unregistered carrier");
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let config = trained_config(dir.path());
    write_text_pdf(
        &dir.path().join("meli-5.pdf"),
        &["correo argentino sucursal encomienda"],
    );

    // A stale artifact can carry classes the registry never heard of
    let labels_path = config.model_dir().join(labelpress::classifier::LABELS_FILE);
    let mut value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&labels_path).unwrap()).unwrap();
    value["classes"] = serde_json::json!(["Andreani", "MercadoLibre"]);
    fs::write(&labels_path, value.to_string()).unwrap();

    let pipeline = Pipeline::with_collaborators(
        config.clone(),
        Box::new(PanicFlyer),
        Box::new(BrokenPrinter),
    );
    let err = pipeline.run().unwrap_err();
    assert!(matches!(err, LabelError::UnsupportedCategory { .. }));
    assert!(fs::read_dir(config.temp_dir()).unwrap().next().is_none());
    assert!(fs::read_dir(config.out_dir()).unwrap().next().is_none());
}

#[test]
#[ignore = "requires a pdfium shared library"]
fn pipeline_aborts_on_textless_label_before_any_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = trained_config(dir.path());
    write_text_pdf(&dir.path().join("meli-7.pdf"), &[]);

    let pipeline = Pipeline::with_collaborators(
        config.clone(),
        Box::new(QrFlyer::new(config.clone())),
        Box::new(BrokenPrinter),
    );
    let err = pipeline.run().unwrap_err();
    assert!(matches!(err, LabelError::EmptyText { .. }));
    assert!(fs::read_dir(config.out_dir()).unwrap().next().is_none());
    assert!(dir.path().join("meli-7.pdf").exists());
}
