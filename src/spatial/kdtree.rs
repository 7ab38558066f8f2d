//! 3-d k-d tree for nearest-neighbor queries over splat positions.
//!
//! Built once per frame from the frame's point positions, then queried once
//! per point. Build is O(n log n) via median splits; each query prunes
//! subtrees whose splitting plane is farther than the best candidate found
//! so far. The tree stores the original point indices so a query can skip
//! the query point itself.

use nalgebra::Vector3;

struct Node {
    /// Index into the original point slice
    index: u32,

    position: Vector3<f32>,

    /// Split axis at this node: 0 = x, 1 = y, 2 = z
    axis: usize,

    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

/// A k-d tree over a fixed set of 3-d points.
pub struct KdTree {
    root: Option<Box<Node>>,
    len: usize,
}

impl KdTree {
    /// Build a tree from point positions. Index i in queries refers to
    /// `positions[i]`.
    pub fn build(positions: &[Vector3<f32>]) -> Self {
        let mut entries: Vec<(u32, Vector3<f32>)> = positions
            .iter()
            .enumerate()
            .map(|(i, p)| (i as u32, *p))
            .collect();

        Self {
            root: build_node(&mut entries, 0),
            len: positions.len(),
        }
    }

    /// Number of points in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Find the point nearest to `query`, skipping the point stored under
    /// `exclude`. Returns the neighbor's index and distance, or `None` when
    /// no other point exists.
    pub fn nearest_excluding(&self, query: &Vector3<f32>, exclude: u32) -> Option<(u32, f32)> {
        let mut best: Option<(u32, f32)> = None;
        search(self.root.as_deref(), query, exclude, &mut best);
        best.map(|(i, d2)| (i, d2.sqrt()))
    }
}

fn build_node(entries: &mut [(u32, Vector3<f32>)], depth: usize) -> Option<Box<Node>> {
    if entries.is_empty() {
        return None;
    }

    let axis = depth % 3;
    let mid = entries.len() / 2;
    entries.select_nth_unstable_by(mid, |a, b| {
        a.1[axis].partial_cmp(&b.1[axis]).unwrap_or(std::cmp::Ordering::Equal)
    });

    let (index, position) = entries[mid];
    let (lower, rest) = entries.split_at_mut(mid);
    let upper = &mut rest[1..];

    Some(Box::new(Node {
        index,
        position,
        axis,
        left: build_node(lower, depth + 1),
        right: build_node(upper, depth + 1),
    }))
}

/// Branch-and-bound descent; `best` carries (index, squared distance).
fn search(
    node: Option<&Node>,
    query: &Vector3<f32>,
    exclude: u32,
    best: &mut Option<(u32, f32)>,
) {
    let Some(node) = node else {
        return;
    };

    if node.index != exclude {
        let d2 = (node.position - query).norm_squared();
        if best.map_or(true, |(_, best_d2)| d2 < best_d2) {
            *best = Some((node.index, d2));
        }
    }

    let delta = query[node.axis] - node.position[node.axis];
    let (near, far) = if delta < 0.0 {
        (node.left.as_deref(), node.right.as_deref())
    } else {
        (node.right.as_deref(), node.left.as_deref())
    };

    search(near, query, exclude, best);

    // Only cross the splitting plane if it could still hold a closer point.
    if best.map_or(true, |(_, best_d2)| delta * delta < best_d2) {
        search(far, query, exclude, best);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// All-pairs reference used to validate the tree.
    fn brute_force_nearest(
        positions: &[Vector3<f32>],
        query: usize,
    ) -> Option<(u32, f32)> {
        positions
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != query)
            .map(|(i, p)| (i as u32, (p - positions[query]).norm()))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
    }

    #[test]
    fn test_empty_and_single_point() {
        let tree = KdTree::build(&[]);
        assert!(tree.is_empty());
        assert!(tree.nearest_excluding(&Vector3::zeros(), 0).is_none());

        let tree = KdTree::build(&[Vector3::new(1.0, 2.0, 3.0)]);
        assert_eq!(tree.len(), 1);
        assert!(tree.nearest_excluding(&Vector3::new(1.0, 2.0, 3.0), 0).is_none());
    }

    #[test]
    fn test_two_points() {
        let positions = [Vector3::zeros(), Vector3::new(3.0, 4.0, 0.0)];
        let tree = KdTree::build(&positions);

        let (idx, dist) = tree.nearest_excluding(&positions[0], 0).unwrap();
        assert_eq!(idx, 1);
        assert_relative_eq!(dist, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_matches_brute_force_on_random_cloud() {
        let mut rng = StdRng::seed_from_u64(42);
        let positions: Vec<Vector3<f32>> = (0..500)
            .map(|_| {
                Vector3::new(
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                )
            })
            .collect();

        let tree = KdTree::build(&positions);
        for i in 0..positions.len() {
            let (_, tree_dist) = tree.nearest_excluding(&positions[i], i as u32).unwrap();
            let (_, brute_dist) = brute_force_nearest(&positions, i).unwrap();
            // Indices may differ under distance ties; distances may not.
            assert_relative_eq!(tree_dist, brute_dist, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_coincident_points_have_zero_distance() {
        let positions = vec![Vector3::new(1.0, 1.0, 1.0); 5];
        let tree = KdTree::build(&positions);
        let (_, dist) = tree.nearest_excluding(&positions[0], 0).unwrap();
        assert_relative_eq!(dist, 0.0, epsilon = 1e-6);
    }
}
