use crate::core::models::particle::ParticleRecord;
use itertools::Itertools;
use std::collections::BTreeMap;
use std::f64::consts::PI;

const SWITCH_INTEGRATION_INTERVALS: usize = 200;

/// Coefficient of the long-range Lennard-Jones tail correction.
///
/// The correction energy is `coefficient / volume`. It assumes a uniform particle
/// density beyond the cutoff and averages the combined `(sigma, epsilon)` of every
/// particle pair. When a switching distance is given, the energy the switch removes
/// between `r_switch` and the cutoff is added back as well.
pub fn dispersion_coefficient(
    particles: &[ParticleRecord],
    cutoff: f64,
    switching_distance: Option<f64>,
) -> f64 {
    if particles.is_empty() {
        return 0.0;
    }

    // Ordered by bit pattern so the summation order, and hence the result, is reproducible.
    let mut classes: BTreeMap<(u64, u64), usize> = BTreeMap::new();
    for p in particles {
        *classes
            .entry((p.sigma.to_bits(), p.epsilon.to_bits()))
            .or_default() += 1;
    }
    let classes: Vec<(f64, f64, f64)> = classes
        .into_iter()
        .map(|((sigma, epsilon), count)| {
            (f64::from_bits(sigma), f64::from_bits(epsilon), count as f64)
        })
        .collect();

    let mut sum12 = 0.0;
    let mut sum6 = 0.0;
    let mut sum_switch = 0.0;
    for pair in (0..classes.len()).combinations_with_replacement(2) {
        let (sigma_i, epsilon_i, n_i) = classes[pair[0]];
        let (sigma_j, epsilon_j, n_j) = classes[pair[1]];
        let count = if pair[0] == pair[1] {
            n_i * (n_i + 1.0) / 2.0
        } else {
            n_i * n_j
        };
        let sigma = 0.5 * (sigma_i + sigma_j);
        let epsilon = (epsilon_i * epsilon_j).sqrt();
        let sigma6 = sigma.powi(6);
        sum12 += count * epsilon * sigma6 * sigma6;
        sum6 += count * epsilon * sigma6;
        if let Some(r_switch) = switching_distance {
            sum_switch += count * switched_tail_integral(sigma, epsilon, r_switch, cutoff);
        }
    }

    let n = particles.len() as f64;
    let num_interactions = n * (n + 1.0) / 2.0;
    sum12 /= num_interactions;
    sum6 /= num_interactions;
    sum_switch /= num_interactions;

    8.0 * n * n * PI * (sum12 / (9.0 * cutoff.powi(9)) - sum6 / (3.0 * cutoff.powi(3)) + sum_switch)
}

/// `∫ ε((σ/r)¹² − (σ/r)⁶)(1 − S(r)) r² dr` over the switching region, by Simpson's rule.
fn switched_tail_integral(sigma: f64, epsilon: f64, r_switch: f64, cutoff: f64) -> f64 {
    let width = cutoff - r_switch;
    if width <= 0.0 {
        return 0.0;
    }
    let integrand = |r: f64| {
        let t = (r - r_switch) / width;
        let s = 1.0 + t * t * t * (-10.0 + t * (15.0 - 6.0 * t));
        let sr6 = (sigma / r).powi(6);
        epsilon * (sr6 * sr6 - sr6) * (1.0 - s) * r * r
    };
    let h = width / SWITCH_INTEGRATION_INTERVALS as f64;
    let interior: f64 = (1..SWITCH_INTEGRATION_INTERVALS)
        .map(|k| {
            let weight = if k % 2 == 1 { 4.0 } else { 2.0 };
            weight * integrand(r_switch + k as f64 * h)
        })
        .sum();
    (integrand(r_switch) + interior + integrand(cutoff)) * h / 3.0
}
