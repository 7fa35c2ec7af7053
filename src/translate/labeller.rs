//! Block labels used as goto targets.

use crate::ir::BlockId;

/// Maps block identities to labels; injective because block ids are
/// unique within a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLabeller {
    prefix: String,
}

impl Default for BlockLabeller {
    fn default() -> Self {
        Self::new("BLOCK #")
    }
}

impl BlockLabeller {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn label(&self, block: BlockId) -> String {
        format!("{}{}", self.prefix, block.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_label_format() {
        let labeller = BlockLabeller::default();
        assert_eq!(labeller.label(BlockId(0)), "BLOCK #0");
        assert_eq!(labeller.label(BlockId(17)), "BLOCK #17");
    }

    #[test]
    fn test_labels_are_distinct() {
        let labeller = BlockLabeller::new("L");
        let labels: std::collections::HashSet<_> =
            (0..64).map(|i| labeller.label(BlockId(i))).collect();
        assert_eq!(labels.len(), 64);
    }
}
