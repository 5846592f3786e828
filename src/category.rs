// Shipping carrier categories
//
// The classifier's label space and the geometry registry are both keyed by
// this enum. Supporting a new carrier means adding a variant here plus its
// geometry arm; the compiler flags every place that needs updating.
use std::fmt;
use std::str::FromStr;

use crate::error::LabelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    MercadoLibre,
    CorreoArg,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::MercadoLibre, Category::CorreoArg];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::MercadoLibre => "MercadoLibre",
            Category::CorreoArg => "CorreoArg",
        }
    }

    /// Training folder for this carrier under the data directory.
    pub fn training_dir(&self) -> &'static str {
        match self {
            Category::MercadoLibre => "labelsMl",
            Category::CorreoArg => "labelsCorreoArg",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| LabelError::UnsupportedCategory {
                label: s.to_string(),
            })
    }
}
