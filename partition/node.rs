use serde::{Deserialize, Serialize};

use crate::poi::{BoundingRect, PoiRecord};

/// One block of the space-partition tree.
///
/// `bounds` is always the region the node was asked to cover, never the
/// tight box around its records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PartitionNode {
    Leaf {
        bounds: BoundingRect,
        records: Vec<PoiRecord>,
    },
    Branch {
        bounds: BoundingRect,
        children: Box<[PartitionNode; 2]>,
    },
}

impl PartitionNode {
    pub fn leaf(bounds: BoundingRect, records: Vec<PoiRecord>) -> Self {
        PartitionNode::Leaf { bounds, records }
    }

    pub fn branch(bounds: BoundingRect, first: PartitionNode, second: PartitionNode) -> Self {
        PartitionNode::Branch {
            bounds,
            children: Box::new([first, second]),
        }
    }

    pub fn bounds(&self) -> &BoundingRect {
        match self {
            PartitionNode::Leaf { bounds, .. } | PartitionNode::Branch { bounds, .. } => bounds,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, PartitionNode::Leaf { .. })
    }

    /// True when no record exists anywhere below this node.
    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }

    /// Pre-order walk yielding `(node, depth)`, root at depth 0.
    pub fn iter(&self) -> NodeIter<'_> {
        NodeIter {
            stack: vec![(self, 0)],
        }
    }

    /// All records in encoding order.
    pub fn records(&self) -> impl Iterator<Item = &PoiRecord> {
        self.iter().flat_map(|(node, _)| match node {
            PartitionNode::Leaf { records, .. } => records.as_slice(),
            PartitionNode::Branch { .. } => &[][..],
        })
    }

    pub fn record_count(&self) -> usize {
        self.records().count()
    }

    pub fn leaf_count(&self) -> usize {
        self.iter().filter(|(node, _)| node.is_leaf()).count()
    }

    pub fn branch_count(&self) -> usize {
        self.iter().filter(|(node, _)| !node.is_leaf()).count()
    }

    /// Number of levels, so a lone leaf has depth 1.
    pub fn depth(&self) -> usize {
        self.iter().map(|(_, depth)| depth + 1).max().unwrap_or(0)
    }

    /// Largest leaf, in records.
    pub fn max_leaf_len(&self) -> usize {
        self.iter()
            .filter_map(|(node, _)| match node {
                PartitionNode::Leaf { records, .. } => Some(records.len()),
                PartitionNode::Branch { .. } => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Pretty JSON rendering for inspecting a built tree.
    pub fn export_to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Iterator returned by [`PartitionNode::iter`].
pub struct NodeIter<'a> {
    stack: Vec<(&'a PartitionNode, usize)>,
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = (&'a PartitionNode, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, depth) = self.stack.pop()?;
        if let PartitionNode::Branch { children, .. } = node {
            self.stack.push((&children[1], depth + 1));
            self.stack.push((&children[0], depth + 1));
        }
        Some((node, depth))
    }
}
