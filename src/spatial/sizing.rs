//! Proximity-based splat sizing (autosize).
//!
//! A splat should be big enough to fill the gap to its neighbors and no
//! bigger, so sparse regions stay covered and dense regions stay sharp.
//! Nearest-neighbor spacing is the local density proxy: each point's scale
//! factor is its distance to the nearest other point, times a tunable gain,
//! times the job's global size multiplier.

use crate::core::MIN_SCALE;
use crate::sample::Point;
use crate::spatial::KdTree;

/// Distance from each point to its nearest other point, in point order.
///
/// A single-point set has no neighbor and yields an empty signal; callers
/// handle that case explicitly.
pub fn nearest_neighbor_distances(points: &[Point]) -> Vec<f32> {
    let positions: Vec<_> = points.iter().map(|p| p.position).collect();
    let tree = KdTree::build(&positions);

    positions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            tree.nearest_excluding(p, i as u32)
                .map(|(_, dist)| dist)
                .unwrap_or(0.0)
        })
        .collect()
}

/// Per-point splat scales from local density.
///
/// scale_i = nn_distance_i × `gain` × `global_size`, floored to `MIN_SCALE`.
/// With fewer than two points there is no spacing signal, so every point
/// falls back to `global_size` alone.
pub fn autosize_scales(points: &[Point], gain: f32, global_size: f32) -> Vec<f32> {
    if points.len() < 2 {
        return vec![global_size.max(MIN_SCALE); points.len()];
    }

    nearest_neighbor_distances(points)
        .into_iter()
        .map(|dist| (dist * gain * global_size).max(MIN_SCALE))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::PointSource;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn point(x: f32, y: f32, z: f32) -> Point {
        Point {
            position: Vector3::new(x, y, z),
            source: PointSource::Vertex(0),
        }
    }

    #[test]
    fn test_scales_are_parallel_and_positive() {
        let points = vec![
            point(0.0, 0.0, 0.0),
            point(1.0, 0.0, 0.0),
            point(0.0, 2.0, 0.0),
        ];
        let scales = autosize_scales(&points, 1.0, 1.0);
        assert_eq!(scales.len(), points.len());
        for s in &scales {
            assert!(*s > 0.0);
        }
    }

    #[test]
    fn test_evenly_spaced_line() {
        let points: Vec<Point> = (0..5).map(|i| point(i as f32, 0.0, 0.0)).collect();
        let scales = autosize_scales(&points, 1.0, 1.0);
        // Unit spacing everywhere, so every scale is 1.0.
        for s in &scales {
            assert_relative_eq!(*s, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_isolated_point_gets_larger_scale_than_cluster() {
        let mut points: Vec<Point> = vec![
            point(0.0, 0.0, 0.0),
            point(0.1, 0.0, 0.0),
            point(0.0, 0.1, 0.0),
            point(0.1, 0.1, 0.0),
        ];
        points.push(point(100.0, 0.0, 0.0));

        let scales = autosize_scales(&points, 1.0, 1.0);
        let isolated = scales[4];
        for cluster_scale in &scales[..4] {
            assert!(isolated > *cluster_scale);
        }
    }

    #[test]
    fn test_gain_and_global_size_multiply() {
        let points = vec![point(0.0, 0.0, 0.0), point(2.0, 0.0, 0.0)];
        let scales = autosize_scales(&points, 0.5, 3.0);
        // nn distance 2.0 × gain 0.5 × size 3.0
        assert_relative_eq!(scales[0], 3.0, epsilon = 1e-6);
        assert_relative_eq!(scales[1], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_single_point_falls_back_to_global_size() {
        let points = vec![point(1.0, 2.0, 3.0)];
        let scales = autosize_scales(&points, 10.0, 2.5);
        assert_eq!(scales, vec![2.5]);
    }

    #[test]
    fn test_coincident_points_floor_to_min_scale() {
        let points = vec![point(1.0, 1.0, 1.0), point(1.0, 1.0, 1.0)];
        let scales = autosize_scales(&points, 1.0, 1.0);
        for s in &scales {
            assert_relative_eq!(*s, MIN_SCALE, epsilon = 1e-9);
            assert!(*s > 0.0);
        }
    }
}
