use crate::core::models::particle::ExclusionSet;
use crate::core::models::positions::WorkingPositions;
use crate::core::utils::periodic::minimum_image;
use nalgebra::Vector3;
use std::collections::HashMap;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

type VoxelKey = [i32; 3];

/// Interacting particle pairs `(i, j)` with `i < j`, valid for one set of positions.
///
/// Pairs are sorted by `i`, then `j`, so the list does not depend on the order in
/// which particles were hashed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighborList {
    pairs: Vec<(usize, usize)>,
}

impl NeighborList {
    /// Finds every non-excluded pair within `cutoff` of each other.
    ///
    /// Distances use the minimum-image convention when `periodic_box` is given; a pair
    /// at exactly the cutoff is included. With `cutoff` of `None` every non-excluded
    /// pair is returned.
    pub fn compute(
        positions: &WorkingPositions,
        exclusions: &ExclusionSet,
        periodic_box: Option<&Vector3<f32>>,
        cutoff: Option<f32>,
    ) -> Self {
        let pairs = match cutoff {
            Some(cutoff) => voxel_search(positions, exclusions, periodic_box, cutoff),
            None => all_pairs(positions.len(), exclusions),
        };
        debug!(
            num_particles = positions.len(),
            num_pairs = pairs.len(),
            "Neighbor list built"
        );
        Self { pairs }
    }

    #[inline]
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn all_pairs(n: usize, exclusions: &ExclusionSet) -> Vec<(usize, usize)> {
    let partners_of = |i: usize| -> Vec<(usize, usize)> {
        (i + 1..n)
            .filter(|&j| !exclusions.contains(i, j))
            .map(|j| (i, j))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let iterator = 0..n;

    #[cfg(feature = "parallel")]
    let iterator = (0..n).into_par_iter();

    let per_particle: Vec<Vec<(usize, usize)>> = iterator.map(partners_of).collect();
    per_particle.into_iter().flatten().collect()
}

fn voxel_search(
    positions: &WorkingPositions,
    exclusions: &ExclusionSet,
    periodic_box: Option<&Vector3<f32>>,
    cutoff: f32,
) -> Vec<(usize, usize)> {
    let grid = VoxelGrid::new(positions, periodic_box, cutoff);
    let mut voxels: HashMap<VoxelKey, Vec<usize>> = HashMap::new();
    for i in 0..positions.len() {
        voxels
            .entry(grid.key(&positions.position(i)))
            .or_default()
            .push(i);
    }

    let cutoff_sq = cutoff * cutoff;
    let partners_of = |i: usize| -> Vec<(usize, usize)> {
        let pos_i = positions.position(i);
        let mut partners: Vec<usize> = grid
            .neighborhood(grid.key(&pos_i))
            .iter()
            .filter_map(|key| voxels.get(key))
            .flatten()
            .copied()
            .filter(|&j| j > i && !exclusions.contains(i, j))
            .filter(|&j| {
                let delta = minimum_image(positions.position(j) - pos_i, periodic_box);
                delta.norm_squared() <= cutoff_sq
            })
            .collect();
        partners.sort_unstable();
        partners.into_iter().map(|j| (i, j)).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let iterator = 0..positions.len();

    #[cfg(feature = "parallel")]
    let iterator = (0..positions.len()).into_par_iter();

    let per_particle: Vec<Vec<(usize, usize)>> = iterator.map(partners_of).collect();
    per_particle.into_iter().flatten().collect()
}

/// Maps positions to integer voxel coordinates.
struct VoxelGrid {
    origin: Vector3<f32>,
    voxel_size: Vector3<f32>,
    /// Box edges and voxels per axis; neighbor indices wrap modulo the counts.
    periodic: Option<(Vector3<f32>, [i32; 3])>,
}

impl VoxelGrid {
    fn new(positions: &WorkingPositions, periodic_box: Option<&Vector3<f32>>, cutoff: f32) -> Self {
        match periodic_box {
            Some(b) => {
                let counts = [b.x, b.y, b.z].map(|l| ((l / cutoff).floor() as i32).max(1));
                Self {
                    origin: Vector3::zeros(),
                    voxel_size: Vector3::new(
                        b.x / counts[0] as f32,
                        b.y / counts[1] as f32,
                        b.z / counts[2] as f32,
                    ),
                    periodic: Some((*b, counts)),
                }
            }
            None => {
                let origin = positions
                    .iter()
                    .fold(Vector3::repeat(f32::INFINITY), |min, p| min.inf(&p.xyz()));
                Self {
                    origin: if origin.x.is_finite() {
                        origin
                    } else {
                        Vector3::zeros()
                    },
                    voxel_size: Vector3::repeat(cutoff),
                    periodic: None,
                }
            }
        }
    }

    fn key(&self, pos: &Vector3<f32>) -> VoxelKey {
        match self.periodic {
            Some((lengths, counts)) => {
                let mut key = [0; 3];
                for axis in 0..3 {
                    let frac = pos[axis] / lengths[axis];
                    let frac = frac - frac.floor();
                    key[axis] = ((frac * counts[axis] as f32) as i32).clamp(0, counts[axis] - 1);
                }
                key
            }
            None => {
                let rel = pos - self.origin;
                [0, 1, 2].map(|axis| (rel[axis] / self.voxel_size[axis]).floor() as i32)
            }
        }
    }

    /// The voxel itself and its adjacent voxels, each listed once.
    fn neighborhood(&self, key: VoxelKey) -> Vec<VoxelKey> {
        let offsets = |axis: usize| -> Vec<i32> {
            // Keys of far-away particles saturate, so stepping past them finds nothing.
            let mut indices: Vec<i32> = (-1..=1)
                .filter_map(|d| {
                    let k = key[axis].checked_add(d)?;
                    Some(match self.periodic {
                        Some((_, counts)) => k.rem_euclid(counts[axis]),
                        None => k,
                    })
                })
                .collect();
            indices.sort_unstable();
            indices.dedup();
            indices
        };
        let (xs, ys, zs) = (offsets(0), offsets(1), offsets(2));
        let mut keys = Vec::with_capacity(xs.len() * ys.len() * zs.len());
        for &x in &xs {
            for &y in &ys {
                for &z in &zs {
                    keys.push([x, y, z]);
                }
            }
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn working(points: &[[f64; 3]], periodic_box: Option<&Vector3<f64>>) -> WorkingPositions {
        let positions: Vec<Point3<f64>> = points.iter().map(|&p| Point3::from(p)).collect();
        WorkingPositions::from_host(&positions, std::iter::repeat(0.0), periodic_box)
    }

    /// Deterministic scattered coordinates in `[0, scale)`.
    fn scattered(n: usize, scale: f64) -> Vec<[f64; 3]> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                [
                    ((t * 12.9898).sin() * 43758.5453).fract().abs() * scale,
                    ((t * 78.233).sin() * 12345.6789).fract().abs() * scale,
                    ((t * 37.719).sin() * 24634.6345).fract().abs() * scale,
                ]
            })
            .collect()
    }

    fn brute_force(
        positions: &WorkingPositions,
        exclusions: &ExclusionSet,
        periodic_box: Option<&Vector3<f32>>,
        cutoff: f32,
    ) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..positions.len() {
            for j in i + 1..positions.len() {
                let delta = minimum_image(
                    positions.position(j) - positions.position(i),
                    periodic_box,
                );
                if !exclusions.contains(i, j) && delta.norm_squared() <= cutoff * cutoff {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    #[test]
    fn no_cutoff_returns_every_non_excluded_pair() {
        let positions = working(&[[0.0; 3], [10.0, 0.0, 0.0], [0.0, 50.0, 0.0]], None);
        let mut exclusions = ExclusionSet::new(3);
        exclusions.insert(0, 2);
        let list = NeighborList::compute(&positions, &exclusions, None, None);
        assert_eq!(list.pairs(), &[(0, 1), (1, 2)]);
    }

    #[test]
    fn far_away_particles_do_not_overflow_voxel_keys() {
        let points = [
            [0.0; 3],
            [0.5, 0.0, 0.0],
            [3.0e9, 0.0, 0.0],
            [-3.0e9, 0.0, 0.0],
        ];
        let positions = working(&points, None);
        let exclusions = ExclusionSet::new(4);
        let list = NeighborList::compute(&positions, &exclusions, None, Some(1.0));
        assert_eq!(list.pairs(), &[(0, 1)]);
    }

    #[test]
    fn pair_at_exactly_the_cutoff_is_included() {
        let positions = working(&[[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.5, 0.0]], None);
        let list = NeighborList::compute(&positions, &ExclusionSet::new(3), None, Some(1.0));
        assert_eq!(list.pairs(), &[(0, 1)]);
    }

    #[test]
    fn excluded_pairs_never_appear() {
        let points = scattered(60, 3.0);
        let positions = working(&points, None);
        let mut exclusions = ExclusionSet::new(60);
        for i in 0..59 {
            exclusions.insert(i, i + 1);
        }
        let list = NeighborList::compute(&positions, &exclusions, None, Some(1.0));
        assert!(!list.is_empty());
        let excluded = |&(i, j): &(usize, usize)| exclusions.contains(i, j);
        assert!(!list.pairs().iter().any(excluded));
    }

    #[test]
    fn non_periodic_search_matches_brute_force() {
        let points = scattered(120, 4.0);
        let positions = working(&points, None);
        let exclusions = ExclusionSet::new(120);
        let list = NeighborList::compute(&positions, &exclusions, None, Some(0.9));
        let expected = brute_force(&positions, &exclusions, None, 0.9);
        assert_eq!(list.pairs(), expected.as_slice());
    }

    #[test]
    fn periodic_search_matches_brute_force() {
        let box_size = Vector3::new(4.0, 3.5, 5.0);
        let box_f32 = box_size.map(|x| x as f32);
        let points = scattered(150, 5.0);
        let positions = working(&points, Some(&box_size));
        let exclusions = ExclusionSet::new(150);
        let list = NeighborList::compute(&positions, &exclusions, Some(&box_f32), Some(1.0));
        assert_eq!(
            list.pairs(),
            brute_force(&positions, &exclusions, Some(&box_f32), 1.0).as_slice()
        );
    }

    #[test]
    fn periodic_search_finds_pairs_across_the_boundary() {
        let box_size = Vector3::new(3.0, 3.0, 3.0);
        let box_f32 = box_size.map(|x| x as f32);
        let positions = working(&[[0.1, 0.0, 0.0], [2.9, 0.0, 0.0]], Some(&box_size));
        let exclusions = ExclusionSet::new(2);
        let list = NeighborList::compute(&positions, &exclusions, Some(&box_f32), Some(1.0));
        assert_eq!(list.pairs(), &[(0, 1)]);
    }

    #[test]
    fn small_periodic_box_lists_each_pair_once() {
        // Two voxels per axis: the -1 and +1 neighbors are the same voxel.
        let box_size = Vector3::new(2.0, 2.0, 2.0);
        let box_f32 = box_size.map(|x| x as f32);
        let points = scattered(40, 2.0);
        let positions = working(&points, Some(&box_size));
        let exclusions = ExclusionSet::new(40);
        let list = NeighborList::compute(&positions, &exclusions, Some(&box_f32), Some(1.0));
        assert_eq!(
            list.pairs(),
            brute_force(&positions, &exclusions, Some(&box_f32), 1.0).as_slice()
        );
    }

    #[test]
    fn pair_set_is_independent_of_particle_order() {
        let points = scattered(80, 3.0);
        let reversed: Vec<_> = points.iter().rev().copied().collect();
        let n = points.len();

        let exclusions = ExclusionSet::new(n);
        let search = |points: &[[f64; 3]]| {
            NeighborList::compute(&working(points, None), &exclusions, None, Some(0.8))
        };
        let forward = search(&points);
        let backward = search(&reversed);

        let mut relabeled: Vec<(usize, usize)> = backward
            .pairs()
            .iter()
            .map(|&(i, j)| {
                let (a, b) = (n - 1 - i, n - 1 - j);
                (a.min(b), a.max(b))
            })
            .collect();
        relabeled.sort_unstable();
        assert_eq!(forward.pairs(), relabeled.as_slice());
    }

    #[test]
    fn empty_positions_give_empty_list() {
        let positions = working(&[], None);
        let list = NeighborList::compute(&positions, &ExclusionSet::new(0), None, Some(1.0));
        assert!(list.is_empty());
    }
}
