//! The fixed disease catalog.

/// Predictable labels. A label's position is its class index in the model.
pub const DISEASES: [&str; 5] = [
    "Sog'lom",
    "Yurak kasalligi",
    "Diabet",
    "Gipertenziya",
    "Astma",
];

/// Ordered label set shared by training, artifacts and responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiseaseCatalog;

impl DiseaseCatalog {
    pub fn labels(&self) -> &'static [&'static str] {
        &DISEASES
    }

    pub fn len(&self) -> usize {
        DISEASES.len()
    }

    pub fn is_empty(&self) -> bool {
        DISEASES.is_empty()
    }

    /// Label for a class index.
    pub fn label(&self, index: usize) -> Option<&'static str> {
        DISEASES.get(index).copied()
    }

    /// Owned copy of the index to label mapping, as persisted with a model.
    pub fn encoding(&self) -> Vec<String> {
        DISEASES.iter().map(|d| d.to_string()).collect()
    }

    /// True when a persisted mapping binds exactly the same index to each label.
    pub fn matches(&self, labels: &[String]) -> bool {
        labels.len() == DISEASES.len() && labels.iter().zip(DISEASES).all(|(a, b)| a == b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_by_index() {
        let catalog = DiseaseCatalog;
        assert_eq!(catalog.label(0), Some("Sog'lom"));
        assert_eq!(catalog.label(4), Some("Astma"));
        assert_eq!(catalog.label(5), None);
        assert_eq!(catalog.len(), 5);
    }

    #[test]
    fn test_matches_rejects_reordering() {
        let catalog = DiseaseCatalog;
        assert!(catalog.matches(&catalog.encoding()));

        let mut swapped = catalog.encoding();
        swapped.swap(1, 2);
        assert!(!catalog.matches(&swapped));

        let short = catalog.encoding()[..4].to_vec();
        assert!(!catalog.matches(&short));
    }
}
