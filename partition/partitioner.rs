use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::node::PartitionNode;
use crate::error::{Ov2Error, Result};
use crate::index::PoiIndex;
use crate::poi::BoundingRect;

/// Navigation units conventionally hold at most 20 POI per block.
pub const DEFAULT_MAX_PER_BLOCK: usize = 20;

/// Axis a block is halved along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitAxis {
    /// East/west halves.
    Lon,
    /// North/south halves.
    Lat,
}

impl SplitAxis {
    pub fn flip(self) -> Self {
        match self {
            SplitAxis::Lon => SplitAxis::Lat,
            SplitAxis::Lat => SplitAxis::Lon,
        }
    }

    /// Axis used at `depth` when the root splits along `self`.
    pub fn at_depth(self, depth: usize) -> Self {
        if depth % 2 == 0 {
            self
        } else {
            self.flip()
        }
    }

    pub fn split(self, bounds: &BoundingRect) -> (BoundingRect, BoundingRect) {
        match self {
            SplitAxis::Lon => bounds.split_lon(),
            SplitAxis::Lat => bounds.split_lat(),
        }
    }
}

/// Builds a [`PartitionNode`] tree by halving regions of a [`PoiIndex`]
/// until every block fits.
#[derive(Debug, Clone, Copy)]
pub struct Partitioner {
    max_per_block: usize,
    first_axis: SplitAxis,
}

impl Default for Partitioner {
    fn default() -> Self {
        Self {
            max_per_block: DEFAULT_MAX_PER_BLOCK,
            first_axis: SplitAxis::Lat,
        }
    }
}

enum Work {
    Visit { bounds: BoundingRect, depth: usize },
    Join { bounds: BoundingRect },
}

impl Partitioner {
    /// Blocks of at most `max_per_block` POI; zero is rejected.
    pub fn new(max_per_block: usize) -> Result<Self> {
        if max_per_block == 0 {
            return Err(Ov2Error::Config(
                "Blocks must hold at least one POI".to_string(),
            ));
        }
        Ok(Self {
            max_per_block,
            ..Self::default()
        })
    }

    pub fn with_first_axis(mut self, axis: SplitAxis) -> Self {
        self.first_axis = axis;
        self
    }

    pub fn max_per_block(&self) -> usize {
        self.max_per_block
    }

    // A strip one unit across cannot be halved any further, so it takes
    // every POI inside it; this also stops coincident points from splitting
    // forever.
    fn limit_for(&self, bounds: &BoundingRect) -> usize {
        if bounds.is_degenerate() {
            usize::MAX - 1
        } else {
            self.max_per_block
        }
    }

    /// Partition `bounds` against `index`.
    ///
    /// Uses an explicit work stack; children are produced in order (the
    /// lower half first), so the result matches a depth-first recursion.
    pub fn partition(&self, index: &PoiIndex, bounds: BoundingRect) -> PartitionNode {
        let mut work = vec![Work::Visit { bounds, depth: 0 }];
        let mut built: Vec<PartitionNode> = Vec::new();
        let mut max_depth = 0usize;

        while let Some(item) = work.pop() {
            match item {
                Work::Visit { bounds, depth } => {
                    max_depth = max_depth.max(depth);
                    let limit = self.limit_for(&bounds);
                    let records = index.query_rect(&bounds, limit);

                    if records.len() <= limit {
                        trace!("leaf {} with {} records", bounds, records.len());
                        built.push(PartitionNode::leaf(bounds, records));
                        continue;
                    }

                    let axis = self.first_axis.at_depth(depth);
                    let (low, high) = axis.split(&bounds);
                    work.push(Work::Join { bounds });
                    work.push(Work::Visit {
                        bounds: high,
                        depth: depth + 1,
                    });
                    work.push(Work::Visit {
                        bounds: low,
                        depth: depth + 1,
                    });
                }
                Work::Join { bounds } => {
                    let (Some(second), Some(first)) = (built.pop(), built.pop()) else {
                        unreachable!("both halves are built before their join");
                    };
                    built.push(PartitionNode::branch(bounds, first, second));
                }
            }
        }

        debug!("partitioned {} to depth {}", bounds, max_depth + 1);
        built
            .pop()
            .unwrap_or_else(|| PartitionNode::leaf(bounds, Vec::new()))
    }
}

/// Partition with the default capacity and axis order.
pub fn partition(index: &PoiIndex, bounds: BoundingRect) -> PartitionNode {
    Partitioner::default().partition(index, bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poi::PoiRecord;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn grid_index(cols: i32, rows: i32, step: i32) -> (PoiIndex, BoundingRect) {
        let mut index = PoiIndex::new();
        let mut bounds = BoundingRect::inverted();
        for x in 0..cols {
            for y in 0..rows {
                let (lon, lat) = (x * step, y * step);
                index.insert(PoiRecord::new(lon, lat, format!("p{}_{}", x, y)));
                bounds.extend(lon, lat);
            }
        }
        (index, bounds)
    }

    fn assert_invariants(tree: &PartitionNode, capacity: usize) {
        for (node, _) in tree.iter() {
            match node {
                PartitionNode::Leaf { bounds, records } => {
                    assert!(
                        records.len() <= capacity || bounds.is_degenerate(),
                        "leaf {} holds {} records",
                        bounds,
                        records.len()
                    );
                    for record in records {
                        assert!(bounds.contains_point(record.lon, record.lat));
                    }
                    assert!(records.windows(2).all(|w| w[0].lon <= w[1].lon));
                }
                PartitionNode::Branch { bounds, children } => {
                    let (a, b) = (children[0].bounds(), children[1].bounds());
                    assert!(!a.intersects(b), "children of {} overlap", bounds);
                    assert_eq!(a.union(b), *bounds);
                    let lon_cover = a.lon_span() + 1 + b.lon_span() + 1;
                    let lat_cover = a.lat_span() + 1 + b.lat_span() + 1;
                    assert!(
                        lon_cover == bounds.lon_span() + 1 || lat_cover == bounds.lat_span() + 1,
                        "children of {} leave a gap",
                        bounds
                    );
                }
            }
        }
    }

    #[test]
    fn test_axis_alternates_from_lat() {
        assert_eq!(SplitAxis::Lat.at_depth(0), SplitAxis::Lat);
        assert_eq!(SplitAxis::Lat.at_depth(1), SplitAxis::Lon);
        assert_eq!(SplitAxis::Lat.at_depth(2), SplitAxis::Lat);
        assert_eq!(SplitAxis::Lon.at_depth(3), SplitAxis::Lat);
    }

    #[test]
    fn test_small_set_is_single_leaf() {
        let (index, bounds) = grid_index(4, 5, 10);
        let tree = partition(&index, bounds);
        assert!(tree.is_leaf());
        assert_eq!(tree.record_count(), 20);
        assert_eq!(tree.bounds(), &bounds);
    }

    #[test]
    fn test_overflow_splits_latitude_first() {
        let (index, bounds) = grid_index(3, 7, 10);
        let tree = partition(&index, bounds);

        match &tree {
            PartitionNode::Branch { children, .. } => {
                let (south, north) = bounds.split_lat();
                assert_eq!(children[0].bounds(), &south);
                assert_eq!(children[1].bounds(), &north);
            }
            PartitionNode::Leaf { .. } => panic!("21 records must split"),
        }
        assert_eq!(tree.record_count(), 21);
        assert_invariants(&tree, DEFAULT_MAX_PER_BLOCK);
    }

    #[test]
    fn test_first_axis_override() {
        let (index, bounds) = grid_index(7, 3, 10);
        let tree = Partitioner::default()
            .with_first_axis(SplitAxis::Lon)
            .partition(&index, bounds);

        let PartitionNode::Branch { children, .. } = &tree else {
            panic!("21 records must split");
        };
        let (west, east) = bounds.split_lon();
        assert_eq!(children[0].bounds(), &west);
        assert_eq!(children[1].bounds(), &east);
        assert_invariants(&tree, DEFAULT_MAX_PER_BLOCK);
    }

    #[test]
    fn test_second_level_splits_longitude() {
        let (index, bounds) = grid_index(20, 20, 100);
        let tree = partition(&index, bounds);

        let PartitionNode::Branch { children, .. } = &tree else {
            panic!("400 records must split");
        };
        let PartitionNode::Branch { bounds: child, children: grand } = &children[0] else {
            panic!("200 records must split again");
        };
        let (west, east) = child.split_lon();
        assert_eq!(grand[0].bounds(), &west);
        assert_eq!(grand[1].bounds(), &east);
        assert_invariants(&tree, DEFAULT_MAX_PER_BLOCK);
    }

    #[test]
    fn test_empty_index() {
        let index = PoiIndex::new();
        let bounds = BoundingRect::new(100, 100, 0, 0);
        let tree = partition(&index, bounds);
        assert_eq!(tree, PartitionNode::leaf(bounds, Vec::new()));
    }

    #[test]
    fn test_coincident_points_terminate() {
        let mut index = PoiIndex::new();
        for i in 0..50 {
            index.insert(PoiRecord::new(500, 500, format!("dup{}", i)));
        }
        index.insert(PoiRecord::new(0, 0, "corner"));
        index.insert(PoiRecord::new(1000, 1000, "corner"));

        let tree = partition(&index, BoundingRect::new(1000, 1000, 0, 0));
        assert_eq!(tree.record_count(), 52);
        assert!(tree.max_leaf_len() >= 50);
        assert_invariants(&tree, DEFAULT_MAX_PER_BLOCK);
    }

    #[test]
    fn test_single_point_root() {
        let mut index = PoiIndex::new();
        for i in 0..30 {
            index.insert(PoiRecord::new(7, 7, format!("same{}", i)));
        }
        let tree = partition(&index, BoundingRect::from_point(7, 7));
        assert!(tree.is_leaf());
        assert_eq!(tree.record_count(), 30);
    }

    #[test]
    fn test_single_parallel_keeps_axis_order() {
        let mut index = PoiIndex::new();
        for i in 0..21 {
            index.insert(PoiRecord::new(i * 10, 500, format!("line{}", i)));
        }
        let bounds = BoundingRect::new(200, 500, 0, 500);
        let tree = partition(&index, bounds);

        // depth 0 still halves latitude; the upper half is empty and inverted
        let PartitionNode::Branch { children, .. } = &tree else {
            panic!("21 records must split");
        };
        let (south, north) = bounds.split_lat();
        assert_eq!(children[0].bounds(), &south);
        assert_eq!(children[1].bounds(), &north);
        assert!(north.is_inverted());
        assert!(children[1].is_leaf() && children[1].is_empty());
        assert!(crate::encoder::encode(&children[1]).unwrap().is_empty());

        // depth 1 halves longitude
        let PartitionNode::Branch { children: grand, .. } = &children[0] else {
            panic!("the lower half holds all 21 records");
        };
        let (west, east) = south.split_lon();
        assert_eq!(grand[0].bounds(), &west);
        assert_eq!(grand[1].bounds(), &east);

        assert_eq!(tree.record_count(), 21);
        assert!(tree.max_leaf_len() <= DEFAULT_MAX_PER_BLOCK);
        assert_invariants(&tree, DEFAULT_MAX_PER_BLOCK);
    }

    #[test]
    fn test_long_parallel_fills_blocks() {
        let mut index = PoiIndex::new();
        for i in 0..100 {
            index.insert(PoiRecord::new(i * 10, 4_000_000, format!("line{}", i)));
        }
        let tree = partition(&index, BoundingRect::new(990, 4_000_000, 0, 4_000_000));

        assert_eq!(tree.record_count(), 100);
        assert!(tree.max_leaf_len() <= DEFAULT_MAX_PER_BLOCK);
        assert_invariants(&tree, DEFAULT_MAX_PER_BLOCK);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let err = Partitioner::new(0).unwrap_err();
        assert!(matches!(err, Ov2Error::Config(_)));
        assert_eq!(Partitioner::new(1).unwrap().max_per_block(), 1);
    }

    #[test]
    fn test_custom_capacity() {
        let (index, bounds) = grid_index(10, 10, 10);
        let tree = Partitioner::new(4).unwrap().partition(&index, bounds);
        assert_eq!(tree.record_count(), 100);
        assert!(!tree.is_leaf());
        assert_invariants(&tree, 4);
    }

    #[test]
    fn test_random_points_keep_invariants() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut index = PoiIndex::new();
        let mut bounds = BoundingRect::inverted();
        for i in 0..3_000 {
            let lon = rng.gen_range(-18_000_000..=18_000_000);
            let lat = rng.gen_range(-9_000_000..=9_000_000);
            index.insert(PoiRecord::new(lon, lat, format!("r{}", i)));
            bounds.extend(lon, lat);
        }

        let tree = partition(&index, bounds);
        assert_eq!(tree.record_count(), 3_000);
        assert_invariants(&tree, DEFAULT_MAX_PER_BLOCK);
    }
}
