//! Category label encoders for the month and day columns
//!
//! Labels are mapped to their index in sorted order of the distinct values
//! seen at training time. When every label is an integer the ordering is
//! numeric, otherwise lexicographic. The fitted mapping is persisted in the
//! model artifact so inference reuses exactly the training encoding.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Label ⇄ index mapping for one categorical column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEncoder {
    labels: Vec<String>,
}

impl CategoryEncoder {
    /// Fit on the raw column values
    pub fn fit<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let distinct: BTreeSet<&str> = values.into_iter().map(str::trim).collect();

        let numeric: Option<Vec<(i64, &str)>> = distinct
            .iter()
            .map(|label| label.parse::<i64>().ok().map(|n| (n, *label)))
            .collect();

        let labels = match numeric {
            Some(mut pairs) if !pairs.is_empty() => {
                pairs.sort_by_key(|(n, _)| *n);
                pairs.into_iter().map(|(_, label)| label.to_string()).collect()
            }
            _ => distinct.into_iter().map(str::to_string).collect(),
        };

        Self { labels }
    }

    /// Index of a label, `None` for labels unseen at training time
    pub fn encode(&self, label: &str) -> Option<usize> {
        let label = label.trim();
        self.labels.iter().position(|known| known == label)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Encoders for every encoded feature in the layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEncoders {
    pub month: CategoryEncoder,
    pub day: CategoryEncoder,
}

impl CategoryEncoders {
    /// Encoder for a layout feature name
    pub fn for_feature(&self, name: &str) -> Option<&CategoryEncoder> {
        match name {
            "month" => Some(&self.month),
            "day" => Some(&self.day),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_label_order() {
        let encoder = CategoryEncoder::fit(["mar", "oct", "aug", "mar", "apr"]);
        assert_eq!(encoder.labels(), &["apr", "aug", "mar", "oct"]);
        assert_eq!(encoder.encode("aug"), Some(1));
        assert_eq!(encoder.encode("oct"), Some(3));
        assert_eq!(encoder.encode("mar"), Some(2));
    }

    #[test]
    fn test_numeric_labels_sort_numerically() {
        let encoder = CategoryEncoder::fit(["10", "2", "1", "2"]);
        assert_eq!(encoder.labels(), &["1", "2", "10"]);
        assert_eq!(encoder.encode("10"), Some(2));
    }

    #[test]
    fn test_unknown_label() {
        let encoder = CategoryEncoder::fit(["mon", "tue"]);
        assert_eq!(encoder.encode("sun"), None);
    }

    #[test]
    fn test_whitespace_is_ignored() {
        let encoder = CategoryEncoder::fit([" fri", "fri "]);
        assert_eq!(encoder.len(), 1);
        assert_eq!(encoder.encode("fri"), Some(0));
    }

    #[test]
    fn test_for_feature() {
        let encoders = CategoryEncoders {
            month: CategoryEncoder::fit(["jan"]),
            day: CategoryEncoder::fit(["mon", "sun"]),
        };
        assert_eq!(encoders.for_feature("day").map(|e| e.len()), Some(2));
        assert!(encoders.for_feature("temp").is_none());
    }
}
