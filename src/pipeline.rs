// Label pipeline: discover, classify, flyer, compose, print, archive
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::category::Category;
use crate::classifier::Classifier;
use crate::compose::compose_sheet;
use crate::config::Config;
use crate::error::{LabelError, Result};
use crate::flyer::{FlyerGenerator, QrFlyer};
use crate::print::{CupsPrinter, PrintSink};

/// One input label located in the base directory, named `<medium>-<order>.pdf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLabel {
    pub path: PathBuf,
    pub medium: String,
    pub order: String,
}

/// Locate the input document. Zero candidates is fatal; with several, the
/// lexicographically smallest name wins and the rest are reported.
pub fn discover_input(dir: &Path) -> Result<DiscoveredLabel> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
                && path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .is_some_and(|stem| stem.contains('-'))
        })
        .collect();
    candidates.sort();

    let Some(path) = candidates.first().cloned() else {
        return Err(LabelError::NoInputFound {
            dir: dir.to_path_buf(),
        });
    };
    if candidates.len() > 1 {
        let skipped: Vec<String> = candidates[1..]
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        warn!(?skipped, "multiple label documents found, taking the first");
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let (medium, order) = stem.split_once('-').unwrap_or((stem, ""));
    Ok(DiscoveredLabel {
        medium: medium.to_string(),
        order: order.to_string(),
        path,
    })
}

fn archive(input: &Path, out_dir: &Path) -> Result<()> {
    let file_name = input
        .file_name()
        .ok_or_else(|| LabelError::MissingInput {
            path: input.to_path_buf(),
        })?;
    let destination = out_dir.join(file_name);
    if fs::rename(input, &destination).is_err() {
        // Cross-device moves fall back to copy + remove
        fs::copy(input, &destination)?;
        fs::remove_file(input)?;
    }
    Ok(())
}

pub struct Pipeline {
    config: Config,
    flyer: Box<dyn FlyerGenerator>,
    printer: Box<dyn PrintSink>,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        let flyer = Box::new(QrFlyer::new(config.clone()));
        Self {
            config,
            flyer,
            printer: Box::new(CupsPrinter),
        }
    }

    /// Swap the external collaborators, mainly for tests.
    pub fn with_collaborators(
        config: Config,
        flyer: Box<dyn FlyerGenerator>,
        printer: Box<dyn PrintSink>,
    ) -> Self {
        Self {
            config,
            flyer,
            printer,
        }
    }

    /// Run the full pipeline for the single document in the base directory.
    /// Returns the path of the composed sheet.
    pub fn run(&self) -> Result<PathBuf> {
        let input = discover_input(self.config.base_dir())?;
        info!(
            file = %input.path.display(),
            medium = %input.medium,
            order = %input.order,
            "processing label"
        );

        // Any classification failure aborts before side effects; a label
        // outside the registry is caught here, before the flyer is built
        let classifier = Classifier::load(&self.config.model_dir())?;
        let category: Category = classifier.predict_document(&input.path)?.parse()?;
        info!(category = %category, "label classified");

        self.flyer.generate(&input.medium, &input.order)?;

        let output = self
            .config
            .out_dir()
            .join(format!("{}{}.pdf", input.medium, input.order));
        compose_sheet(&self.config, category.as_str(), &input.path, &output)?;

        // A composed sheet is never lost to a printing problem
        if let Err(e) = self.printer.print(&output) {
            warn!("{e}; print {} manually", output.display());
        }

        archive(&input.path, &self.config.out_dir())?;
        info!(sheet = %output.display(), "pipeline finished");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_requires_a_hyphenated_pdf() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::write(dir.path().join("plain.pdf"), b"%PDF").unwrap();
        let err = discover_input(dir.path()).unwrap_err();
        assert!(matches!(err, LabelError::NoInputFound { .. }));
    }

    #[test]
    fn discovery_splits_medium_and_order_on_the_first_hyphen() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("meli-123-456.pdf"), b"%PDF").unwrap();
        let found = discover_input(dir.path()).unwrap();
        assert_eq!(found.medium, "meli");
        assert_eq!(found.order, "123-456");
    }

    #[test]
    fn discovery_is_deterministic_with_multiple_candidates() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("meli-2.pdf"), b"%PDF").unwrap();
        fs::write(dir.path().join("correo-1.pdf"), b"%PDF").unwrap();
        fs::write(dir.path().join("meli-1.pdf"), b"%PDF").unwrap();
        let found = discover_input(dir.path()).unwrap();
        assert_eq!(found.medium, "correo");
        assert_eq!(found.order, "1");
    }

    #[test]
    fn archive_moves_the_input_into_the_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir_all(&out).unwrap();
        let input = dir.path().join("meli-9.pdf");
        fs::write(&input, b"%PDF").unwrap();

        archive(&input, &out).unwrap();
        assert!(!input.exists());
        assert!(out.join("meli-9.pdf").exists());
    }

    #[test]
    fn classifier_failure_aborts_before_any_output() {
        struct PanicFlyer;
        impl FlyerGenerator for PanicFlyer {
            fn generate(&self, _: &str, _: &str) -> Result<PathBuf> {
                panic!("flyer must not run when classification fails");
            }
        }
        struct PanicPrinter;
        impl PrintSink for PanicPrinter {
            fn print(&self, _: &Path) -> Result<()> {
                panic!("printer must not run when classification fails");
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path());
        config.ensure_dirs().unwrap();
        fs::write(dir.path().join("meli-1.pdf"), b"%PDF").unwrap();

        // No artifact files in the model directory
        let pipeline = Pipeline::with_collaborators(
            config.clone(),
            Box::new(PanicFlyer),
            Box::new(PanicPrinter),
        );
        let err = pipeline.run().unwrap_err();
        assert!(matches!(err, LabelError::ArtifactLoad { .. }));
        assert!(fs::read_dir(config.out_dir()).unwrap().next().is_none());
        assert!(dir.path().join("meli-1.pdf").exists());
    }
}
