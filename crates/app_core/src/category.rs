//! Category filter values derived from the collection

use crate::ImageRecord;
use std::fmt;

/// Label of the catch-all filter
pub const ALL_LABEL: &str = "All";

/// A filter value: the `All` sentinel or one concrete category
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    All,
    Named(String),
}

impl Category {
    /// Parse a label; `"All"` maps to the sentinel
    pub fn from_label(label: &str) -> Self {
        if label == ALL_LABEL {
            Category::All
        } else {
            Category::Named(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Category::All => ALL_LABEL,
            Category::Named(name) => name,
        }
    }

    /// Does this filter admit the record?
    pub fn matches(&self, record: &ImageRecord) -> bool {
        match self {
            Category::All => true,
            Category::Named(name) => record.category == *name,
        }
    }

    /// `All` followed by distinct categories in first-appearance order
    pub fn derive(images: &[ImageRecord]) -> Vec<Category> {
        let mut categories = vec![Category::All];
        for image in images {
            let exists = categories
                .iter()
                .any(|c| matches!(c, Category::Named(n) if *n == image.category));
            if !exists {
                categories.push(Category::Named(image.category.clone()));
            }
        }
        categories
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_images;

    #[test]
    fn test_derive_from_seed() {
        let labels: Vec<String> = Category::derive(&default_images())
            .iter()
            .map(|c| c.label().to_string())
            .collect();
        assert_eq!(labels, vec!["All", "Nature", "Urban", "Art"]);
    }

    #[test]
    fn test_derive_empty() {
        assert_eq!(Category::derive(&[]), vec![Category::All]);
    }

    #[test]
    fn test_label_round_trip() {
        assert_eq!(Category::from_label("All"), Category::All);
        assert_eq!(Category::from_label("Art"), Category::Named("Art".into()));
        assert_eq!(Category::Named("Art".into()).to_string(), "Art");
    }
}
