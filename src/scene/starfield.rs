use bevy::prelude::*;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::math;

/// Step between consecutive stars in the noise domain. Several lattice cells
/// wide so neighbouring stars are uncorrelated; off-integer so lattice points
/// (which all evaluate to zero) are never hit.
const STRIDE: [f64; 2] = [5.123, 1.371];
/// Distance between the sample rows used for each axis.
const AXIS_STRIDE: f64 = 97.31;
/// Row offset of the in-cell jitter samples.
const JITTER_ROW: f64 = 50.17;

/// Deterministic star positions inside `[0, extent]^3`.
///
/// Each axis orders the stars by a noise sample and hands out evenly sized
/// cells by rank, so the marginal spread along every axis is uniform rather
/// than bunched around the noise mean.
pub fn scatter(count: usize, extent: f32, seed: u32) -> Vec<Vec3> {
    if count == 0 {
        return Vec::new();
    }
    let fbm: Fbm<Perlin> = Fbm::new(seed).set_octaves(3);
    let [x, y, z] = [0, 1, 2].map(|axis| spread_axis(&fbm, count, axis, extent));
    (0..count).map(|i| Vec3::new(x[i], y[i], z[i])).collect()
}

fn spread_axis(fbm: &Fbm<Perlin>, count: usize, axis: usize, extent: f32) -> Vec<f32> {
    let row = axis as f64 * AXIS_STRIDE + 0.25;
    let point = |i: usize, row: f64| [i as f64 * STRIDE[0] + 0.5, i as f64 * STRIDE[1] + row];

    let keys: Vec<f64> = (0..count).map(|i| fbm.get(point(i, row))).collect();
    let mut ranked: Vec<usize> = (0..count).collect();
    ranked.sort_by(|&a, &b| keys[a].total_cmp(&keys[b]));

    let cell = extent / count as f32;
    let mut out = vec![0.0; count];
    for (rank, &i) in ranked.iter().enumerate() {
        let jitter = math::map_noise_to_range(fbm.get(point(i, row + JITTER_ROW)), 0.0, 1.0)
            .clamp(0.0, 1.0);
        out[i] = ((rank as f32 + jitter) * cell).min(extent);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTENT: f32 = 20000.0;

    #[test]
    fn scatter_fills_the_requested_count() {
        assert_eq!(scatter(1000, EXTENT, 7).len(), 1000);
        assert!(scatter(0, EXTENT, 7).is_empty());
    }

    #[test]
    fn stars_stay_inside_the_cube() {
        for star in scatter(500, EXTENT, 3) {
            for c in star.to_array() {
                assert!((0.0..=EXTENT).contains(&c), "{star:?} out of bounds");
            }
        }
    }

    #[test]
    fn same_seed_same_sky() {
        assert_eq!(scatter(64, 100.0, 11), scatter(64, 100.0, 11));
        assert_ne!(scatter(64, 100.0, 11), scatter(64, 100.0, 12));
    }

    // ── distribution ────────────────────────────────────────────────

    #[test]
    fn consecutive_stars_are_far_apart() {
        // two uniform points in a cube of side L average about 0.66 L apart
        let stars = scatter(1000, EXTENT, 1000);
        let mean = stars.windows(2).map(|p| p[0].distance(p[1])).sum::<f32>()
            / (stars.len() - 1) as f32;
        assert!(mean > 0.45 * EXTENT, "mean consecutive distance {mean}");
    }

    #[test]
    fn every_axis_spreads_evenly() {
        let stars = scatter(1000, EXTENT, 1000);
        for axis in 0..3 {
            let mut bins = [0; 10];
            for star in &stars {
                let bin = (star[axis] / EXTENT * 10.0) as usize;
                bins[bin.min(9)] += 1;
            }
            assert!(
                bins.iter().all(|&n| (90..=110).contains(&n)),
                "axis {axis}: {bins:?}"
            );
        }
    }

    #[test]
    fn stars_fill_the_whole_cube() {
        let stars = scatter(1000, EXTENT, 1000);
        let (lo, hi) = (EXTENT * 0.25, EXTENT * 0.75);
        let central = stars
            .iter()
            .filter(|s| s.to_array().iter().all(|c| (lo..hi).contains(c)))
            .count();
        // uniform puts about 125 of 1000 in the central eighth
        assert!(central < 250, "{central} stars in the central eighth");

        let mut octants = [0; 8];
        let half = EXTENT / 2.0;
        for s in &stars {
            let i = usize::from(s.x >= half)
                + 2 * usize::from(s.y >= half)
                + 4 * usize::from(s.z >= half);
            octants[i] += 1;
        }
        assert!(octants.iter().all(|&n| n >= 60), "octants {octants:?}");
    }
}
