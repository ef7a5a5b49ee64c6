use std::fmt;

/// Zero-based feature column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureIndex(usize);

impl FeatureIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based column position.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FeatureIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a node in a tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// The root is always the first node pushed into the arena.
    pub(crate) const ROOT: NodeIndex = NodeIndex(0);

    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based arena position.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Impurity of a node under the configured criterion.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Impurity(f64);

impl Impurity {
    pub(crate) const PURE: Impurity = Impurity(0.0);

    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw impurity value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Return `true` when the node holds a single class.
    #[must_use]
    pub fn is_pure(self) -> bool {
        self.0 <= 0.0
    }
}

impl fmt::Display for Impurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// A node in a decision tree arena.
///
/// Children are referenced by [`NodeIndex`] into the owning tree's
/// `Vec<Node>`.
#[derive(Debug, Clone)]
pub enum Node {
    /// Interior node: samples with `value <= threshold` go left.
    Split {
        feature: FeatureIndex,
        threshold: f64,
        left: NodeIndex,
        right: NodeIndex,
        impurity: Impurity,
        n_samples: usize,
        /// `n * parent - n_left * left - n_right * right`, accumulated into
        /// mean-decrease-in-impurity importances.
        weighted_decrease: f64,
    },
    /// Terminal node holding the class frequencies of its training samples.
    Leaf {
        distribution: Vec<f64>,
        impurity: Impurity,
        n_samples: usize,
    },
}

impl Node {
    /// Impurity at this node before any split.
    #[must_use]
    pub fn impurity(&self) -> Impurity {
        match self {
            Node::Split { impurity, .. } | Node::Leaf { impurity, .. } => *impurity,
        }
    }

    /// Number of training samples that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Node::Split { n_samples, .. } | Node::Leaf { n_samples, .. } => *n_samples,
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtypes_expose_their_index() {
        assert_eq!(FeatureIndex::new(7).index(), 7);
        assert_eq!(NodeIndex::new(3).index(), 3);
        assert_eq!(NodeIndex::ROOT.index(), 0);
        assert!(FeatureIndex::new(1) < FeatureIndex::new(5));
    }

    #[test]
    fn impurity_display_and_purity() {
        assert_eq!(format!("{}", Impurity::new(1.0 / 3.0)), "0.333333");
        assert!(Impurity::PURE.is_pure());
        assert!(!Impurity::new(0.5).is_pure());
    }

    #[test]
    fn accessors_cover_both_variants() {
        let leaf = Node::Leaf {
            distribution: vec![0.25, 0.75],
            impurity: Impurity::new(0.375),
            n_samples: 8,
        };
        let split = Node::Split {
            feature: FeatureIndex::new(2),
            threshold: 1.5,
            left: NodeIndex::new(1),
            right: NodeIndex::new(2),
            impurity: Impurity::new(0.5),
            n_samples: 16,
            weighted_decrease: 4.0,
        };
        assert!(leaf.is_leaf());
        assert!(!split.is_leaf());
        assert_eq!(leaf.n_samples(), 8);
        assert_eq!(split.n_samples(), 16);
        assert!((split.impurity().value() - 0.5).abs() < f64::EPSILON);
    }
}
