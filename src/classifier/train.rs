// Offline training over the labeled PDF folders
use std::fs;
use std::path::Path;

use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::category::Category;
use crate::classifier::vectorizer::MAX_FEATURES;
use crate::classifier::{Classifier, LabelEncoder, LinearSvm, TfidfVectorizer};
use crate::config::Config;
use crate::error::{LabelError, Result};
use crate::pdf;

const SPLIT_SEED: u64 = 42;
const TEST_FRACTION: f32 = 0.2;
const CV_FOLDS: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct TrainReport {
    pub documents: usize,
    pub skipped: usize,
    /// Mean k-fold accuracy over the training split. Diagnostic only.
    pub cv_accuracy: Option<f32>,
    pub holdout_accuracy: f32,
}

/// Read every stop word from a plain-text file, one per line, blanks ignored.
pub fn load_stop_words(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Collect (text, label) pairs from each category's training folder.
/// Documents without a text layer are skipped with a warning, never fatally.
fn load_corpus(config: &Config) -> Result<(Vec<String>, Vec<String>, usize)> {
    let mut texts = Vec::new();
    let mut labels = Vec::new();
    let mut skipped = 0usize;

    for category in Category::ALL {
        let folder = config.data_dir().join(category.training_dir());
        let mut entries: Vec<_> = fs::read_dir(&folder)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
            })
            .collect();
        entries.sort();

        for path in entries {
            let text = pdf::document_text(&path)?;
            if text.is_empty() {
                warn!(file = %path.display(), "no extractable text, skipping");
                skipped += 1;
                continue;
            }
            texts.push(text);
            labels.push(category.as_str().to_string());
        }
    }

    Ok((texts, labels, skipped))
}

fn select_rows(x: &Array2<f32>, indices: &[usize]) -> Array2<f32> {
    x.select(Axis(0), indices)
}

fn select_targets(y: &[usize], indices: &[usize]) -> Vec<usize> {
    indices.iter().map(|&i| y[i]).collect()
}

/// Mean accuracy over k folds of the training split.
fn cross_val_accuracy(
    x: &Array2<f32>,
    y: &[usize],
    n_classes: usize,
    folds: usize,
) -> Option<f32> {
    let n = y.len();
    if n < folds * 2 {
        return None;
    }
    let mut scores = Vec::with_capacity(folds);
    for fold in 0..folds {
        let (eval_idx, fit_idx): (Vec<usize>, Vec<usize>) =
            (0..n).partition(|i| i % folds == fold);
        let model = LinearSvm::fit(&select_rows(x, &fit_idx), &select_targets(y, &fit_idx), n_classes)
            .ok()?;
        scores.push(model.accuracy(&select_rows(x, &eval_idx), &select_targets(y, &eval_idx)));
    }
    Some(scores.iter().sum::<f32>() / folds as f32)
}

/// Fit the full artifact from an in-memory corpus.
pub fn train_from_corpus(
    texts: &[String],
    labels: &[String],
    stop_words: Vec<String>,
) -> Result<(Classifier, TrainReport)> {
    if texts.len() < 2 || texts.len() != labels.len() {
        return Err(LabelError::artifact(format!(
            "corpus has {} documents for {} labels; need at least two",
            texts.len(),
            labels.len()
        )));
    }

    let encoder = LabelEncoder::fit(labels)?;
    let y: Vec<usize> = labels
        .iter()
        .map(|label| {
            encoder
                .transform(label)
                .ok_or_else(|| LabelError::artifact(format!("unencodable label '{label}'")))
        })
        .collect::<Result<_>>()?;

    let mut vectorizer = TfidfVectorizer::new(stop_words, MAX_FEATURES);
    let x = vectorizer.fit_transform(texts)?;

    // 80/20 held-out split, seeded so runs are reproducible
    let n = texts.len();
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(SPLIT_SEED));
    let n_test = (((n as f32) * TEST_FRACTION).ceil() as usize).clamp(1, n.saturating_sub(1));
    let (test_idx, train_idx) = indices.split_at(n_test);

    let x_train = select_rows(&x, train_idx);
    let y_train = select_targets(&y, train_idx);
    let model = LinearSvm::fit(&x_train, &y_train, encoder.len())?;

    let cv_accuracy = cross_val_accuracy(&x_train, &y_train, encoder.len(), CV_FOLDS);
    let holdout_accuracy = model.accuracy(&select_rows(&x, test_idx), &select_targets(&y, test_idx));

    let report = TrainReport {
        documents: n,
        skipped: 0,
        cv_accuracy,
        holdout_accuracy,
    };
    Ok((Classifier::from_parts(vectorizer, model, encoder)?, report))
}

/// Train from the configured data folders and persist the artifact.
pub fn train(config: &Config) -> Result<TrainReport> {
    let stop_words = load_stop_words(&config.stop_words_path())?;
    let (texts, labels, skipped) = load_corpus(config)?;
    if texts.is_empty() {
        return Err(LabelError::NoInputFound {
            dir: config.data_dir(),
        });
    }

    let (classifier, mut report) = train_from_corpus(&texts, &labels, stop_words)?;
    report.skipped = skipped;
    classifier.save(&config.model_dir())?;

    match report.cv_accuracy {
        Some(acc) => info!(
            documents = report.documents,
            skipped = report.skipped,
            "classifier trained: cv accuracy {:.4}, holdout {:.4}",
            acc,
            report.holdout_accuracy
        ),
        None => info!(
            documents = report.documents,
            skipped = report.skipped,
            "classifier trained: holdout {:.4} (corpus too small for cross-validation)",
            report.holdout_accuracy
        ),
    }
    Ok(report)
}
