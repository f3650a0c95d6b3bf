use super::{ReciprocalError, ReciprocalRequest, ReciprocalSolver, check_force_buffer, self_energy};
use crate::core::forcefield::potentials::COULOMB_CONSTANT;
use crate::core::methods::ReciprocalBounds;
use nalgebra::Vector3;
use std::f64::consts::PI;
use tracing::trace;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Structure factor of one reciprocal lattice vector.
struct WaveTerm {
    k: Vector3<f64>,
    /// `4π/k²·exp(-k²/4α²)`
    weight: f64,
    re: f64,
    im: f64,
}

/// Explicit Ewald sum over every reciprocal vector `2π(nx/Lx, ny/Ly, nz/Lz)` with
/// `|n_d| < kmax_d`, excluding the origin.
#[derive(Debug, Clone, Default)]
pub struct EwaldSum;

impl EwaldSum {
    pub fn new() -> Self {
        Self
    }
}

impl ReciprocalSolver for EwaldSum {
    fn name(&self) -> &'static str {
        "ewald"
    }

    fn compute(
        &mut self,
        request: &ReciprocalRequest<'_>,
        forces: Option<&mut [Vector3<f64>]>,
    ) -> Result<f64, ReciprocalError> {
        let ReciprocalBounds::Ewald { kmax } = request.bounds else {
            return Err(ReciprocalError::UnsupportedBounds {
                solver: self.name(),
                bounds: request.bounds,
            });
        };
        check_force_buffer(request.positions, &forces)?;

        let positions: Vec<(Vector3<f64>, f64)> = request
            .positions
            .iter()
            .map(|p| (p.xyz().cast::<f64>(), p.w as f64))
            .collect();
        let box_size = request.box_size;
        let volume = box_size.x * box_size.y * box_size.z;
        let alpha = request.alpha;

        let reach = kmax.map(|k| k as i64 - 1);
        let mut lattice = Vec::new();
        for nx in -reach[0]..=reach[0] {
            for ny in -reach[1]..=reach[1] {
                for nz in -reach[2]..=reach[2] {
                    if (nx, ny, nz) != (0, 0, 0) {
                        lattice.push(Vector3::new(
                            2.0 * PI * nx as f64 / box_size.x,
                            2.0 * PI * ny as f64 / box_size.y,
                            2.0 * PI * nz as f64 / box_size.z,
                        ));
                    }
                }
            }
        }

        let structure_factor = |k: &Vector3<f64>| -> WaveTerm {
            let k2 = k.norm_squared();
            let weight = 4.0 * PI / k2 * (-k2 / (4.0 * alpha * alpha)).exp();
            let (mut re, mut im) = (0.0, 0.0);
            for (r, q) in &positions {
                let (s, c) = k.dot(r).sin_cos();
                re += q * c;
                im += q * s;
            }
            WaveTerm {
                k: *k,
                weight,
                re,
                im,
            }
        };

        #[cfg(not(feature = "parallel"))]
        let waves: Vec<WaveTerm> = lattice.iter().map(structure_factor).collect();

        #[cfg(feature = "parallel")]
        let waves: Vec<WaveTerm> = lattice.par_iter().map(structure_factor).collect();

        let sum: f64 = waves
            .iter()
            .map(|w| w.weight * (w.re * w.re + w.im * w.im))
            .sum();
        let energy = COULOMB_CONSTANT / (2.0 * volume) * sum;
        trace!(num_vectors = waves.len(), energy, "Ewald reciprocal sum");

        if let Some(forces) = forces {
            let prefactor = COULOMB_CONSTANT / volume;
            let force_on = |(r, q): &(Vector3<f64>, f64)| -> Vector3<f64> {
                let mut f = Vector3::<f64>::zeros();
                for w in &waves {
                    let (s, c) = w.k.dot(r).sin_cos();
                    f += w.k * (w.weight * (w.re * s - w.im * c));
                }
                f * (prefactor * q)
            };

            #[cfg(not(feature = "parallel"))]
            let contributions: Vec<Vector3<f64>> = positions.iter().map(force_on).collect();

            #[cfg(feature = "parallel")]
            let contributions: Vec<Vector3<f64>> = positions.par_iter().map(force_on).collect();

            for (f, c) in forces.iter_mut().zip(contributions) {
                *f += c;
            }
        }

        Ok(energy + self_energy(request.positions, alpha))
    }
}
