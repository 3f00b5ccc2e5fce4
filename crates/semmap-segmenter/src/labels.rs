//! Vertex color → semantic label classification.
//!
//! The reconstruction frontend paints every mesh vertex with the color of its
//! semantic class; recovering the class is a table lookup owned by whoever
//! trained the classifier.  The segmenter consumes that capability through
//! [`LabelClassifier`] and never interprets colors itself.

use std::collections::HashMap;

use semmap_types::{Color, SemanticLabel};

/// Capability interface for resolving a vertex color to a semantic label.
pub trait LabelClassifier {
    /// The label for `color`, or `None` when the color is not a known class.
    fn label_for(&self, color: Color) -> Option<SemanticLabel>;
}

/// Exact-color lookup table.
///
/// # Example
///
/// ```rust
/// use semmap_segmenter::labels::{ColorLabelMap, LabelClassifier};
/// use semmap_types::{Color, SemanticLabel};
///
/// let map = ColorLabelMap::from_entries([
///     (Color::new(255, 0, 0), SemanticLabel(1)),
///     (Color::new(0, 255, 0), SemanticLabel(2)),
/// ]);
///
/// assert_eq!(map.label_for(Color::new(255, 0, 0)), Some(SemanticLabel(1)));
/// assert_eq!(map.label_for(Color::new(1, 1, 1)), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ColorLabelMap {
    table: HashMap<Color, SemanticLabel>,
}

impl ColorLabelMap {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(color, label)` pairs.  Later entries win on
    /// duplicate colors.
    pub fn from_entries<I: IntoIterator<Item = (Color, SemanticLabel)>>(
        entries: I,
    ) -> Self {
        Self {
            table: entries.into_iter().collect(),
        }
    }

    /// Register or replace the label for `color`.
    pub fn insert(&mut self, color: Color, label: SemanticLabel) {
        self.table.insert(color, label);
    }
}

impl LabelClassifier for ColorLabelMap {
    fn label_for(&self, color: Color) -> Option<SemanticLabel> {
        self.table.get(&color).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_color_resolves() {
        let mut map = ColorLabelMap::new();
        map.insert(Color::new(10, 20, 30), SemanticLabel(4));
        assert_eq!(map.label_for(Color::new(10, 20, 30)), Some(SemanticLabel(4)));
    }

    #[test]
    fn unknown_color_is_none() {
        let map = ColorLabelMap::new();
        assert_eq!(map.label_for(Color::new(1, 2, 3)), None);
    }

    #[test]
    fn later_entry_wins_on_duplicate_color() {
        let map = ColorLabelMap::from_entries([
            (Color::new(0, 0, 0), SemanticLabel(1)),
            (Color::new(0, 0, 0), SemanticLabel(2)),
        ]);
        assert_eq!(map.label_for(Color::new(0, 0, 0)), Some(SemanticLabel(2)));
    }
}
