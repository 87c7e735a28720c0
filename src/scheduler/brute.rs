//! Brute-force nearest-chain scheduler (spec.md §4.6).
//!
//! Grounded in original_source's `algos.py::sort_path_brute`: enumerate every
//! permutation of the onboard set, sum road-path distance leg by leg, and
//! keep the cheapest. The teacher has no direct analog (its `matching/`
//! directory picks a *driver* for a rider, not a *drop-off order*), so the
//! module shape follows `matching/cost_based.rs` (a scoring pass over
//! candidates) while the algorithm itself follows the Python original.

use bevy_ecs::prelude::Entity;

use super::Scheduler;
use crate::geo::{haversine, Point};
use crate::routing::{RouteCache, RoutingClient};

/// Total length of a road path, summed leg by leg in meters.
fn path_length(path: &[Point]) -> f64 {
    path.windows(2).map(|w| haversine(w[0], w[1])).sum()
}

/// Enumerates every ordering of `indices` via Heap's algorithm, invoking
/// `visit` on each complete permutation.
fn each_permutation(indices: &mut [usize], visit: &mut impl FnMut(&[usize])) {
    fn heap(k: usize, arr: &mut [usize], visit: &mut impl FnMut(&[usize])) {
        if k == 1 {
            visit(arr);
            return;
        }
        for i in 0..k {
            heap(k - 1, arr, visit);
            if k % 2 == 0 {
                arr.swap(i, k - 1);
            } else {
                arr.swap(0, k - 1);
            }
        }
    }
    let n = indices.len();
    if n == 0 {
        return;
    }
    heap(n, indices, visit);
}

/// Brute-force over all `k!` orderings of the onboard set (spec.md §4.6).
/// Tractable because `k` is bounded by vehicle capacity (`k! <= 720` at
/// `k = 6`).
#[derive(Debug, Default, Clone, Copy)]
pub struct BruteForce;

impl Scheduler for BruteForce {
    fn choose<R: RoutingClient>(
        &self,
        src: Point,
        dests: &[(Entity, Point)],
        route_cache: &mut RouteCache<R>,
    ) -> Option<(usize, Point)> {
        if dests.is_empty() {
            return None;
        }
        if dests.len() == 1 {
            return Some((0, dests[0].1));
        }

        let mut indices: Vec<usize> = (0..dests.len()).collect();
        let mut best_distance = f64::INFINITY;
        let mut best_first: Option<usize> = None;

        each_permutation(&mut indices, &mut |order| {
            let mut total = 0.0;
            let mut cur = src;
            for &i in order {
                let dest = dests[i].1;
                match route_cache.road_path(cur, dest) {
                    Ok(path) => total += path_length(&path),
                    Err(_) => {
                        total = f64::INFINITY;
                        break;
                    }
                }
                cur = dest;
            }
            if total < best_distance {
                best_distance = total;
                best_first = Some(order[0]);
            }
        });

        best_first.map(|i| (i, dests[i].1))
    }
}
