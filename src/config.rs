// Configuration for labelpress
//
// All paths hang off one base directory so components can be pointed at a
// temporary tree in tests instead of process-wide state.
use std::env;
use std::io;
use std::path::{Path, PathBuf};

// Directory names under the base directory
pub const DATA_DIR: &str = "data";
pub const MODEL_DIR: &str = "model";
pub const TEMP_DIR: &str = "tmp";
pub const OUT_DIR: &str = "out";

// Well-known file names
pub const STOP_WORDS_FILE: &str = "custom_stopwords.txt";
pub const FLYER_TEMPLATE: &str = "flyer.pdf";
pub const SCISSORS_ICON: &str = "scissors.png";
pub const FLYER_INTERMEDIATE: &str = "interm.pdf";

const DEFAULT_SHOP_URL: &str = "https://www.3dcp.com.ar/eshop/catalogue/";

/// Get the pdfium library directory from the environment or use the default
pub fn pdfium_library_path() -> PathBuf {
    env::var("LABELPRESS_PDFIUM_PATH")
        .unwrap_or_else(|_| "./lib".to_string())
        .into()
}

#[derive(Debug, Clone)]
pub struct Config {
    base_dir: PathBuf,
    pub shop_url: String,
}

impl Config {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let shop_url =
            env::var("LABELPRESS_SHOP_URL").unwrap_or_else(|_| DEFAULT_SHOP_URL.to_string());
        Self {
            base_dir: base_dir.into(),
            shop_url,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join(DATA_DIR)
    }

    pub fn model_dir(&self) -> PathBuf {
        self.base_dir.join(MODEL_DIR)
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.base_dir.join(TEMP_DIR)
    }

    pub fn out_dir(&self) -> PathBuf {
        self.base_dir.join(OUT_DIR)
    }

    pub fn stop_words_path(&self) -> PathBuf {
        self.model_dir().join(STOP_WORDS_FILE)
    }

    pub fn flyer_template(&self) -> PathBuf {
        self.data_dir().join(FLYER_TEMPLATE)
    }

    pub fn scissors_icon(&self) -> PathBuf {
        self.data_dir().join(SCISSORS_ICON)
    }

    /// Path of the promotional intermediate produced by the flyer generator
    /// and consumed (then deleted) by the sheet composer.
    pub fn flyer_intermediate(&self) -> PathBuf {
        self.temp_dir().join(FLYER_INTERMEDIATE)
    }

    /// Create the derived directories if they do not exist yet.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        for dir in [
            self.data_dir(),
            self.model_dir(),
            self.temp_dir(),
            self.out_dir(),
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
