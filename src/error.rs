// Error taxonomy for the label pipeline
use std::path::PathBuf;

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    /// The persisted classifier artifact is missing, corrupt, or internally
    /// inconsistent. Always fatal before any side effect.
    #[error("classifier artifact unusable: {reason}")]
    ArtifactLoad { reason: String },

    #[error("{} contains no extractable text", path.display())]
    EmptyText { path: PathBuf },

    #[error("prediction failed for {}: {source}", path.display())]
    Prediction {
        path: PathBuf,
        #[source]
        source: BoxedError,
    },

    #[error("no usable input found in {}", dir.display())]
    NoInputFound { dir: PathBuf },

    #[error("missing input file {}", path.display())]
    MissingInput { path: PathBuf },

    /// The classifier produced a label with no geometry registry entry.
    /// Surfaced distinctly so operators know to extend the registry.
    #[error("unsupported category '{label}'")]
    UnsupportedCategory { label: String },

    #[error("region extraction failed: {reason}")]
    Extraction { reason: String },

    #[error("sheet composition failed: {source}")]
    Composition {
        #[source]
        source: BoxedError,
    },

    #[error("print failed: {reason}")]
    Print { reason: String },

    #[error("pdfium: {0}")]
    Pdfium(String),

    #[error("pdf: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl LabelError {
    pub fn artifact(reason: impl Into<String>) -> Self {
        LabelError::ArtifactLoad {
            reason: reason.into(),
        }
    }

    pub fn extraction(reason: impl Into<String>) -> Self {
        LabelError::Extraction {
            reason: reason.into(),
        }
    }

    pub fn composition(source: impl Into<BoxedError>) -> Self {
        LabelError::Composition {
            source: source.into(),
        }
    }

    pub fn prediction(path: impl Into<PathBuf>, source: impl Into<BoxedError>) -> Self {
        LabelError::Prediction {
            path: path.into(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LabelError>;
