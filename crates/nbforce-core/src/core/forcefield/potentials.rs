//! Pair potentials evaluated in reduced precision.
//!
//! Each function returns `(energy, force)` where `force` is `-dE/dr`: positive values
//! push the pair apart. The caller multiplies by `delta / r` to get the vector force.

use statrs::function::erf::{erf, erfc};

pub const COULOMB_CONSTANT: f64 = 138.935456; // In kJ·nm/(mol·e²)

const COULOMB_CONSTANT_F32: f32 = COULOMB_CONSTANT as f32;
const TWO_OVER_SQRT_PI: f32 = std::f32::consts::FRAC_2_SQRT_PI;

#[inline]
pub fn lennard_jones_12_6(dist: f32, sigma: f32, epsilon: f32) -> (f32, f32) {
    let inv_r = 1.0 / dist;
    let sig2 = sigma * sigma * inv_r * inv_r;
    let sig6 = sig2 * sig2 * sig2;
    let sig12 = sig6 * sig6;
    let energy = 4.0 * epsilon * (sig12 - sig6);
    let force = 4.0 * epsilon * (12.0 * sig12 - 6.0 * sig6) * inv_r;
    (energy, force)
}

#[inline]
pub fn coulomb(dist: f32, charge_prod: f32) -> (f32, f32) {
    let inv_r = 1.0 / dist;
    let energy = COULOMB_CONSTANT_F32 * charge_prod * inv_r;
    (energy, energy * inv_r)
}

/// Coulomb interaction in a dielectric continuum beyond the cutoff.
#[inline]
pub fn reaction_field(dist: f32, charge_prod: f32, krf: f32, crf: f32) -> (f32, f32) {
    let inv_r = 1.0 / dist;
    let prefactor = COULOMB_CONSTANT_F32 * charge_prod;
    let energy = prefactor * (inv_r + krf * dist * dist - crf);
    let force = prefactor * (inv_r * inv_r - 2.0 * krf * dist);
    (energy, force)
}

/// Real-space part of the Ewald sum, screened by `erfc(αr)`.
#[inline]
pub fn ewald_real_space(dist: f32, charge_prod: f32, alpha: f32) -> (f32, f32) {
    let inv_r = 1.0 / dist;
    let alpha_r = alpha * dist;
    let erfc_term = erfc(alpha_r as f64) as f32;
    let exp_term = (-alpha_r * alpha_r).exp();
    let prefactor = COULOMB_CONSTANT_F32 * charge_prod;
    let energy = prefactor * erfc_term * inv_r;
    let force =
        prefactor * (erfc_term * inv_r * inv_r + alpha * TWO_OVER_SQRT_PI * exp_term * inv_r);
    (energy, force)
}

/// Removes the `erf(αr)/r` interaction that the reciprocal sum implicitly includes for
/// an excluded pair.
#[inline]
pub fn ewald_exclusion_correction(dist: f32, charge_prod: f32, alpha: f32) -> (f32, f32) {
    let prefactor = COULOMB_CONSTANT_F32 * charge_prod;
    if dist < 1e-6 {
        return (-prefactor * alpha * TWO_OVER_SQRT_PI, 0.0);
    }
    let inv_r = 1.0 / dist;
    let alpha_r = alpha * dist;
    let erf_term = erf(alpha_r as f64) as f32;
    let exp_term = (-alpha_r * alpha_r).exp();
    let energy = -prefactor * erf_term * inv_r;
    let force =
        -prefactor * (erf_term * inv_r * inv_r - alpha * TWO_OVER_SQRT_PI * exp_term * inv_r);
    (energy, force)
}

/// Quintic switch `S(t) = 1 - 10t³ + 15t⁴ - 6t⁵` on `t = (r - r_sw)/(r_c - r_sw)`.
///
/// Returns `(S, dS/dr)`. `S` and its first two derivatives are continuous at both ends.
#[inline]
pub fn switching_function(dist: f32, switch_dist: f32, cutoff: f32) -> (f32, f32) {
    if dist <= switch_dist {
        return (1.0, 0.0);
    }
    if dist >= cutoff {
        return (0.0, 0.0);
    }
    let width = cutoff - switch_dist;
    let t = (dist - switch_dist) / width;
    let t2 = t * t;
    let s = 1.0 + t2 * t * (-10.0 + t * (15.0 - 6.0 * t));
    let ds = t2 * (-30.0 + t * (60.0 - 30.0 * t)) / width;
    (s, ds)
}

/// Applies a switch `(S, dS/dr)` to a potential `(E, -dE/dr)`.
#[inline]
pub fn apply_switch(potential: (f32, f32), switch: (f32, f32)) -> (f32, f32) {
    let (energy, force) = potential;
    let (s, ds) = switch;
    (energy * s, force * s - energy * ds)
}
