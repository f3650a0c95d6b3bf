//! # Method Parameter Derivation
//!
//! Pure functions that turn the configured nonbonded method, cutoff and accuracy
//! target into the numbers the evaluator needs: the Ewald splitting parameter, the
//! reciprocal-space bounds (Ewald k-max or PME grid), reaction-field constants and
//! the dispersion-correction coefficient.
//!
//! - [`ewald`] - Splitting parameter and k-vector bounds
//! - [`pme`] - FFT-friendly grid dimensions
//! - [`dispersion`] - Analytic Lennard-Jones tail correction
//!
//! [`MethodState`] bundles the results. It records the box it was derived for, and
//! [`MethodState::rederive_for_box`] refreshes the box-dependent bounds when the
//! host's box changes.

pub mod dispersion;
pub mod ewald;
pub mod pme;

use crate::core::forcefield::params::{NonbondedForceConfig, NonbondedMethod};
use crate::core::models::particle::ParticleRecord;
use crate::core::utils::periodic::box_fits_cutoff;
use nalgebra::Vector3;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DerivationError {
    #[error("{0}")]
    ConfigurationMismatch(String),
    #[error("box {box_size:?} is smaller than twice the cutoff {cutoff}")]
    InvalidBoxGeometry { box_size: Vector3<f64>, cutoff: f64 },
}

/// Reciprocal-space resolution for the Ewald-family methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReciprocalBounds {
    None,
    Ewald { kmax: [usize; 3] },
    Pme { grid: [usize; 3] },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodState {
    pub method: NonbondedMethod,
    pub cutoff: f64,
    pub switching_distance: Option<f64>,
    pub reaction_field_dielectric: f64,
    pub ewald_error_tolerance: f64,
    pub use_dispersion_correction: bool,
    pub ewald_alpha: f64,
    pub reciprocal: ReciprocalBounds,
    pub dispersion_coefficient: f64,
    /// Box size the reciprocal bounds were derived for; `None` for non-periodic methods.
    pub box_size: Option<Vector3<f64>>,
}

impl MethodState {
    pub fn derive(
        config: &NonbondedForceConfig,
        box_size: &Vector3<f64>,
        particles: &[ParticleRecord],
    ) -> Result<Self, DerivationError> {
        let method = config.method;

        if method.uses_cutoff() && !(config.cutoff.is_finite() && config.cutoff > 0.0) {
            return Err(DerivationError::ConfigurationMismatch(format!(
                "cutoff must be positive, got {}",
                config.cutoff
            )));
        }

        let switching_distance = match (method, config.switching_distance) {
            (NonbondedMethod::NoCutoff, _) | (_, None) => None,
            (_, Some(d)) if d >= 0.0 && d < config.cutoff => Some(d),
            (_, Some(d)) => {
                return Err(DerivationError::ConfigurationMismatch(format!(
                    "switching distance {d} must lie in [0, {})",
                    config.cutoff
                )));
            }
        };

        let dielectric = config.reaction_field_dielectric;
        if method.uses_cutoff()
            && !method.uses_ewald()
            && !(dielectric.is_finite() && dielectric > 0.0)
        {
            return Err(DerivationError::ConfigurationMismatch(format!(
                "reaction-field dielectric must be positive, got {dielectric}"
            )));
        }

        let tolerance = config.ewald_error_tolerance;
        if method.uses_ewald() && !(tolerance > 0.0 && tolerance < 0.5) {
            return Err(DerivationError::ConfigurationMismatch(format!(
                "Ewald error tolerance must lie in (0, 0.5), got {tolerance}"
            )));
        }

        let ewald_alpha = if method.uses_ewald() {
            ewald::ewald_alpha(config.cutoff, tolerance)
        } else {
            0.0
        };

        let mut state = Self {
            method,
            cutoff: config.cutoff,
            switching_distance,
            reaction_field_dielectric: config.reaction_field_dielectric,
            ewald_error_tolerance: tolerance,
            use_dispersion_correction: config.use_dispersion_correction,
            ewald_alpha,
            reciprocal: ReciprocalBounds::None,
            dispersion_coefficient: 0.0,
            box_size: None,
        };
        if method.is_periodic() {
            state.rederive_for_box(box_size)?;
        }
        state.refresh_dispersion_coefficient(particles);
        Ok(state)
    }

    /// Validates `box_size` against the cutoff and recomputes the box-dependent bounds.
    ///
    /// The splitting parameter depends only on the cutoff and tolerance and is left as is.
    pub fn rederive_for_box(&mut self, box_size: &Vector3<f64>) -> Result<(), DerivationError> {
        if !self.method.is_periodic() {
            return Ok(());
        }
        if !box_fits_cutoff(box_size, self.cutoff) {
            return Err(DerivationError::InvalidBoxGeometry {
                box_size: *box_size,
                cutoff: self.cutoff,
            });
        }
        let (alpha, tol) = (self.ewald_alpha, self.ewald_error_tolerance);
        let edges = [box_size.x, box_size.y, box_size.z];
        self.reciprocal = match self.method {
            NonbondedMethod::Ewald => ReciprocalBounds::Ewald {
                kmax: edges.map(|w| ewald::ewald_kmax(w, alpha, tol)),
            },
            NonbondedMethod::Pme => ReciprocalBounds::Pme {
                grid: edges.map(|w| pme::pme_grid_size(w, alpha, tol)),
            },
            _ => ReciprocalBounds::None,
        };
        self.box_size = Some(*box_size);
        Ok(())
    }

    /// Recomputes the dispersion coefficient; zero unless enabled on a periodic method.
    pub fn refresh_dispersion_coefficient(&mut self, particles: &[ParticleRecord]) {
        let enabled = self.use_dispersion_correction && self.method.is_periodic();
        self.dispersion_coefficient = if enabled {
            dispersion::dispersion_coefficient(particles, self.cutoff, self.switching_distance)
        } else {
            0.0
        };
    }

    /// Neighbor-search cutoff; `None` when every pair interacts.
    pub fn neighbor_cutoff(&self) -> Option<f64> {
        self.method.uses_cutoff().then_some(self.cutoff)
    }

    /// Reaction-field constants `(k_rf, c_rf)` for the plain cutoff methods.
    pub fn reaction_field_constants(&self) -> (f64, f64) {
        let eps = self.reaction_field_dielectric;
        let rc = self.cutoff;
        let krf = (eps - 1.0) / ((2.0 * eps + 1.0) * rc.powi(3));
        let crf = 3.0 * eps / ((2.0 * eps + 1.0) * rc);
        (krf, crf)
    }
}
