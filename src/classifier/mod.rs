// Document classifier: TF-IDF features into a linear SVM
//
// The persisted artifact is three co-versioned JSON files (vectorizer, model,
// label encoder). They are trained together and must be loaded together; any
// mismatch between them is a configuration error, not something to mask.
pub mod labels;
pub mod model;
pub mod train;
pub mod vectorizer;

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{LabelError, Result};
use crate::pdf;

pub use labels::LabelEncoder;
pub use model::LinearSvm;
pub use train::{train, train_from_corpus, TrainReport};
pub use vectorizer::TfidfVectorizer;

pub const ARTIFACT_VERSION: u32 = 1;

pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const MODEL_FILE: &str = "svm_model.json";
pub const LABELS_FILE: &str = "label_encoder.json";

#[derive(Debug)]
pub struct Classifier {
    vectorizer: TfidfVectorizer,
    model: LinearSvm,
    labels: LabelEncoder,
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .map_err(|e| LabelError::artifact(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| LabelError::artifact(format!("{}: {e}", path.display())))
}

fn write_artifact<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)
        .map_err(|e| LabelError::artifact(format!("{}: {e}", path.display())))?;
    fs::write(path, raw)?;
    Ok(())
}

impl Classifier {
    pub(crate) fn from_parts(
        vectorizer: TfidfVectorizer,
        model: LinearSvm,
        labels: LabelEncoder,
    ) -> Result<Self> {
        let classifier = Self {
            vectorizer,
            model,
            labels,
        };
        classifier.validate()?;
        Ok(classifier)
    }

    /// Load the three artifact files from the model directory as one unit.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let vectorizer: TfidfVectorizer = read_artifact(&model_dir.join(VECTORIZER_FILE))?;
        let model: LinearSvm = read_artifact(&model_dir.join(MODEL_FILE))?;
        let labels: LabelEncoder = read_artifact(&model_dir.join(LABELS_FILE))?;
        Self::from_parts(vectorizer, model, labels)
    }

    pub fn save(&self, model_dir: &Path) -> Result<()> {
        fs::create_dir_all(model_dir)?;
        write_artifact(&model_dir.join(VECTORIZER_FILE), &self.vectorizer)?;
        write_artifact(&model_dir.join(MODEL_FILE), &self.model)?;
        write_artifact(&model_dir.join(LABELS_FILE), &self.labels)?;
        Ok(())
    }

    /// The three components must have been trained together.
    fn validate(&self) -> Result<()> {
        let versions = [
            self.vectorizer.version,
            self.model.version,
            self.labels.version,
        ];
        if versions.iter().any(|&v| v != ARTIFACT_VERSION) {
            return Err(LabelError::artifact(format!(
                "artifact version mismatch {versions:?}, expected {ARTIFACT_VERSION}"
            )));
        }
        if self.vectorizer.vocabulary_len() != self.model.n_features() {
            return Err(LabelError::artifact(format!(
                "vectorizer vocabulary ({}) does not match model input ({})",
                self.vectorizer.vocabulary_len(),
                self.model.n_features()
            )));
        }
        if self.model.n_classes() != self.labels.len() {
            return Err(LabelError::artifact(format!(
                "model classes ({}) do not match label encoder ({})",
                self.model.n_classes(),
                self.labels.len()
            )));
        }
        Ok(())
    }

    pub fn classes(&self) -> &[String] {
        self.labels.classes()
    }

    /// Classify already-extracted text. `origin` names the document in errors.
    pub fn predict_text(&self, text: &str, origin: &Path) -> Result<String> {
        if text.trim().is_empty() {
            return Err(LabelError::EmptyText {
                path: origin.to_path_buf(),
            });
        }
        let features = self.vectorizer.transform(text);
        let index = self.model.predict(&features);
        self.labels
            .inverse(index)
            .map(str::to_string)
            .ok_or_else(|| {
                LabelError::prediction(
                    origin,
                    LabelError::artifact(format!("class index {index} has no label")),
                )
            })
    }

    /// Extract a document's text layer and classify it.
    pub fn predict_document(&self, path: &Path) -> Result<String> {
        let text = pdf::document_text(path)
            .map_err(|e| LabelError::prediction(path, e))?;
        self.predict_text(&text, path)
    }
}
