// Bidirectional mapping between category names and class indices
use serde::{Deserialize, Serialize};

use crate::error::{LabelError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub version: u32,
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Learn the class set: sorted unique label names, so indices are stable
    /// regardless of corpus order.
    pub fn fit(labels: &[String]) -> Result<Self> {
        if labels.is_empty() {
            return Err(LabelError::artifact("cannot fit label encoder without labels"));
        }
        let mut classes: Vec<String> = labels.to_vec();
        classes.sort();
        classes.dedup();
        Ok(Self {
            version: super::ARTIFACT_VERSION,
            classes,
        })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn transform(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == label)
    }

    pub fn inverse(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_are_sorted_and_unique() {
        let labels: Vec<String> = ["MercadoLibre", "CorreoArg", "MercadoLibre"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let encoder = LabelEncoder::fit(&labels).unwrap();
        assert_eq!(encoder.classes(), ["CorreoArg", "MercadoLibre"]);
    }

    #[test]
    fn transform_and_inverse_round_trip() {
        let labels: Vec<String> = ["b", "a"].iter().map(|s| s.to_string()).collect();
        let encoder = LabelEncoder::fit(&labels).unwrap();
        for label in encoder.classes() {
            let idx = encoder.transform(label).unwrap();
            assert_eq!(encoder.inverse(idx).unwrap(), label);
        }
        assert!(encoder.transform("missing").is_none());
        assert!(encoder.inverse(99).is_none());
    }
}
