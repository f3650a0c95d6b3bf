//! # Reciprocal-Space Electrostatics
//!
//! Long-range half of the Ewald-family methods. The kernel hands each solver the
//! working positions, the current box and the derived splitting parameter and bounds;
//! the solver returns its energy, including the Ewald self term, and optionally adds
//! its forces into a caller-owned buffer.
//!
//! - [`ewald_sum`] - Explicit sum over reciprocal lattice vectors
//! - [`pme`] - Smooth particle-mesh Ewald on an FFT grid
//! - [`bspline`] - Cardinal B-spline weights shared by the mesh solver
//!
//! Hosts with their own long-range machinery implement [`ReciprocalSolver`] and hand
//! it to the kernel in place of the built-in solver.

pub mod bspline;
pub mod ewald_sum;
pub mod pme;

use crate::core::forcefield::params::NonbondedMethod;
use crate::core::forcefield::potentials::COULOMB_CONSTANT;
use crate::core::methods::ReciprocalBounds;
use crate::core::models::positions::WorkingPositions;
use nalgebra::Vector3;
use std::f64::consts::PI;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReciprocalError {
    #[error("The {solver} solver cannot use reciprocal bounds {bounds:?}")]
    UnsupportedBounds {
        solver: &'static str,
        bounds: ReciprocalBounds,
    },
    #[error("Force buffer holds {found} entries, but {expected} particles were given")]
    ForceBufferMismatch { expected: usize, found: usize },
}

/// Everything a solver needs for one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct ReciprocalRequest<'a> {
    pub positions: &'a WorkingPositions,
    pub box_size: Vector3<f64>,
    pub alpha: f64,
    pub bounds: ReciprocalBounds,
}

pub trait ReciprocalSolver: Send {
    fn name(&self) -> &'static str;

    /// Returns the reciprocal-space energy in kJ/mol, self term included.
    ///
    /// When `forces` is given, per-particle forces are added to it.
    fn compute(
        &mut self,
        request: &ReciprocalRequest<'_>,
        forces: Option<&mut [Vector3<f64>]>,
    ) -> Result<f64, ReciprocalError>;
}

/// Built-in solver for a method, or `None` for methods without a reciprocal part.
pub fn default_solver(method: NonbondedMethod) -> Option<Box<dyn ReciprocalSolver>> {
    match method {
        NonbondedMethod::Ewald => Some(Box::new(ewald_sum::EwaldSum::new())),
        NonbondedMethod::Pme => Some(Box::new(pme::SmoothPme::new())),
        _ => None,
    }
}

/// Ewald self-interaction energy `-k·α/√π·Σq²`.
pub fn self_energy(positions: &WorkingPositions, alpha: f64) -> f64 {
    let sum_q2: f64 = positions.iter().map(|p| (p.w as f64).powi(2)).sum();
    -COULOMB_CONSTANT * alpha / PI.sqrt() * sum_q2
}

fn check_force_buffer(
    positions: &WorkingPositions,
    forces: &Option<&mut [Vector3<f64>]>,
) -> Result<(), ReciprocalError> {
    match forces {
        Some(f) if f.len() != positions.len() => Err(ReciprocalError::ForceBufferMismatch {
            expected: positions.len(),
            found: f.len(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::methods::{ewald, pme as pme_sizing};
    use nalgebra::Point3;

    fn neutral_system(box_size: &Vector3<f64>) -> WorkingPositions {
        let points = [
            (Point3::new(0.31, 0.42, 0.27), 0.8),
            (Point3::new(1.12, 0.53, 0.94), -0.8),
            (Point3::new(0.65, 1.71, 1.33), 0.4),
            (Point3::new(1.84, 1.22, 0.48), -0.4),
            (Point3::new(2.21, 2.05, 1.77), 1.0),
            (Point3::new(0.17, 2.33, 2.46), -1.0),
        ];
        let positions: Vec<_> = points.iter().map(|(p, _)| *p).collect();
        WorkingPositions::from_host(&positions, points.iter().map(|(_, q)| *q), Some(box_size))
    }

    #[test]
    fn default_solver_matches_method() {
        let name = |method: NonbondedMethod| default_solver(method).map(|s| s.name());
        assert_eq!(name(NonbondedMethod::Ewald), Some("ewald"));
        assert_eq!(name(NonbondedMethod::Pme), Some("pme"));
        assert!(default_solver(NonbondedMethod::CutoffPeriodic).is_none());
        assert!(default_solver(NonbondedMethod::NoCutoff).is_none());
    }

    #[test]
    fn self_energy_is_negative_and_scales_with_alpha() {
        let box_size = Vector3::new(3.0, 3.0, 3.0);
        let positions = neutral_system(&box_size);
        let low = self_energy(&positions, 2.0);
        let high = self_energy(&positions, 4.0);
        assert!(low < 0.0);
        assert!((high - 2.0 * low).abs() < 1e-9 * high.abs());
    }

    #[test]
    fn ewald_and_pme_agree_for_a_neutral_system() {
        let box_size = Vector3::new(3.0, 3.0, 3.0);
        let positions = neutral_system(&box_size);
        let tolerance = 1e-5;
        let alpha = ewald::ewald_alpha(1.0, tolerance);

        let edges = [box_size.x, box_size.y, box_size.z];
        let kmax = edges.map(|w| ewald::ewald_kmax(w, alpha, tolerance));
        let grid = edges.map(|w| pme_sizing::pme_grid_size(w, alpha, tolerance));

        let mut ewald_forces = vec![Vector3::zeros(); positions.len()];
        let ewald_energy = ewald_sum::EwaldSum::new()
            .compute(
                &ReciprocalRequest {
                    positions: &positions,
                    box_size,
                    alpha,
                    bounds: ReciprocalBounds::Ewald { kmax },
                },
                Some(&mut ewald_forces),
            )
            .unwrap();

        let mut pme_forces = vec![Vector3::zeros(); positions.len()];
        let pme_energy = pme::SmoothPme::new()
            .compute(
                &ReciprocalRequest {
                    positions: &positions,
                    box_size,
                    alpha,
                    bounds: ReciprocalBounds::Pme { grid },
                },
                Some(&mut pme_forces),
            )
            .unwrap();

        assert!(
            (ewald_energy - pme_energy).abs() < 1e-3 * ewald_energy.abs(),
            "ewald {ewald_energy} vs pme {pme_energy}"
        );
        for (fe, fp) in ewald_forces.iter().zip(&pme_forces) {
            assert!(
                (fe - fp).norm() < 1e-2 * fe.norm().max(1.0),
                "ewald {fe:?} vs pme {fp:?}"
            );
        }
    }

    #[test]
    fn force_buffer_of_wrong_length_is_rejected() {
        let box_size = Vector3::new(3.0, 3.0, 3.0);
        let positions = neutral_system(&box_size);
        let mut forces = vec![Vector3::zeros(); 2];
        let result = ewald_sum::EwaldSum::new().compute(
            &ReciprocalRequest {
                positions: &positions,
                box_size,
                alpha: 3.0,
                bounds: ReciprocalBounds::Ewald { kmax: [5, 5, 5] },
            },
            Some(&mut forces),
        );
        assert_eq!(
            result,
            Err(ReciprocalError::ForceBufferMismatch {
                expected: 6,
                found: 2,
            })
        );
    }
}
