// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Single-linkage proximity clustering
//!
//! Grouping is order-dependent: an item joins the first existing group that
//! holds any member closer than the threshold, so two groups that a later
//! item would bridge are not combined in the same pass. Iterating to a
//! fixpoint folds such chains together. Callers control the outcome by
//! passing items in a stable order.

use nalgebra::Point3;

/// Group item indices by proximity
///
/// Item `i` joins the first group holding a member `j` with
/// `distance(i, j) < threshold`; otherwise it opens a new group. Groups keep
/// their members in input order.
pub fn cluster<K>(keys: &[K], distance: impl Fn(&K, &K) -> f64, threshold: f64) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for i in 0..keys.len() {
        let home = groups
            .iter()
            .position(|group| group.iter().any(|&j| distance(&keys[i], &keys[j]) < threshold));
        match home {
            Some(g) => groups[g].push(i),
            None => groups.push(vec![i]),
        }
    }
    groups
}

/// Outcome of [`cluster_to_fixpoint`]
#[derive(Debug)]
pub struct Fixpoint<T> {
    pub items: Vec<T>,
    /// Item count after every pass, the last one being the pass that
    /// changed nothing
    pub pass_counts: Vec<usize>,
}

/// Cluster and merge repeatedly until a pass no longer reduces the count
///
/// `key` extracts the representation compared by `distance` and is
/// recomputed for every pass. Every group of more than one item is handed
/// to `merge` in member order. Since each productive pass removes at least
/// one item, at most `items.len()` passes run.
pub fn cluster_to_fixpoint<T, K, E>(
    mut items: Vec<T>,
    key: impl Fn(&T) -> K,
    distance: impl Fn(&K, &K) -> f64,
    threshold: f64,
    mut merge: impl FnMut(Vec<T>) -> Result<T, E>,
) -> Result<Fixpoint<T>, E> {
    let mut pass_counts = Vec::new();
    loop {
        let before = items.len();
        let keys: Vec<K> = items.iter().map(&key).collect();
        let groups = cluster(&keys, &distance, threshold);

        if groups.len() == before {
            pass_counts.push(before);
            return Ok(Fixpoint { items, pass_counts });
        }

        let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
        let mut merged = Vec::with_capacity(groups.len());
        for group in groups {
            let members: Vec<T> = group.iter().filter_map(|&i| slots[i].take()).collect();
            if members.len() == 1 {
                merged.extend(members);
            } else {
                merged.push(merge(members)?);
            }
        }
        items = merged;
        pass_counts.push(items.len());
    }
}

/// Minimum distance between any vertex of `a` and any vertex of `b`
///
/// Infinite when either set is empty.
pub fn vertex_distance(a: &[Point3<f64>], b: &[Point3<f64>]) -> f64 {
    let mut best = f64::INFINITY;
    for p in a {
        for q in b {
            best = best.min((p - q).norm_squared());
        }
    }
    best.sqrt()
}

/// Distance between two representative points
#[inline]
pub fn centroid_distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    nalgebra::distance(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn points(xs: &[f64]) -> Vec<Point3<f64>> {
        xs.iter().map(|&x| Point3::new(x, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_cluster_is_single_linkage_in_input_order() {
        let keys = points(&[0.0, 10.0, 0.1, 10.05, 20.0]);
        let groups = cluster(&keys, centroid_distance, 0.15);
        assert_eq!(groups, vec![vec![0, 2], vec![1, 3], vec![4]]);
    }

    #[test]
    fn test_threshold_is_strict() {
        let keys = points(&[0.0, 0.5]);
        assert_eq!(cluster(&keys, centroid_distance, 0.5).len(), 2);
    }

    #[test]
    fn test_chain_needs_a_second_pass() {
        // 0.14 joins 0.0 in the first pass; 0.28 only reaches the merged group
        let items: Vec<Vec<Point3<f64>>> = points(&[0.0, 0.28, 0.14])
            .into_iter()
            .map(|p| vec![p])
            .collect();
        let outcome = cluster_to_fixpoint(
            items,
            |v: &Vec<Point3<f64>>| v.clone(),
            |a: &Vec<Point3<f64>>, b: &Vec<Point3<f64>>| vertex_distance(a, b),
            0.15,
            |groups: Vec<Vec<Point3<f64>>>| Ok::<_, Infallible>(groups.concat()),
        )
        .unwrap();

        assert_eq!(outcome.pass_counts, vec![2, 1, 1]);
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].len(), 3);
    }

    #[test]
    fn test_fixpoint_terminates_and_never_grows() {
        // Evenly spaced points with spacings around the threshold
        for spacing in [0.05, 0.1, 0.149, 0.15, 0.3] {
            for count in 1..12usize {
                let items: Vec<Vec<Point3<f64>>> = (0..count)
                    .map(|i| vec![Point3::new(((i * 7) % count) as f64 * spacing, 0.0, 0.0)])
                    .collect();
                let outcome = cluster_to_fixpoint(
                    items,
                    |v: &Vec<Point3<f64>>| v.clone(),
                    |a: &Vec<Point3<f64>>, b: &Vec<Point3<f64>>| vertex_distance(a, b),
                    0.15,
                    |groups: Vec<Vec<Point3<f64>>>| Ok::<_, Infallible>(groups.concat()),
                )
                .unwrap();

                assert!(outcome.pass_counts.len() <= count);
                let mut previous = count;
                for &c in &outcome.pass_counts {
                    assert!(c <= previous);
                    previous = c;
                }
                let total: usize = outcome.items.iter().map(Vec::len).sum();
                assert_eq!(total, count);
            }
        }
    }

    #[test]
    fn test_vertex_distance() {
        let a = points(&[0.0, 1.0]);
        let b = points(&[1.1, 5.0]);
        assert!((vertex_distance(&a, &b) - 0.1).abs() < 1e-12);
        assert_eq!(vertex_distance(&a, &[]), f64::INFINITY);
    }
}
