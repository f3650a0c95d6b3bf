use crate::core::forcefield::params::NonbondedMethod;
use crate::core::forcefield::potentials::{
    apply_switch, coulomb, ewald_exclusion_correction, ewald_real_space, lennard_jones_12_6,
    reaction_field, switching_function,
};
use crate::core::forcefield::table::ParameterTable;
use crate::core::forcefield::term::EnergyTerm;
use crate::core::methods::MethodState;
use crate::core::models::particle::ScaledPair;
use crate::core::models::positions::WorkingPositions;
use crate::core::spatial::neighbor_list::NeighborList;
use crate::core::utils::periodic::minimum_image;
use nalgebra::Vector3;
use tracing::trace;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Energies and force of one pair, in reduced precision.
#[derive(Debug, Clone, Copy)]
struct PairContribution {
    i: usize,
    j: usize,
    electrostatic: f32,
    vdw: f32,
    /// Force on `j`; `i` receives the negation.
    force: Vector3<f32>,
}

impl PairContribution {
    fn empty(i: usize, j: usize) -> Self {
        Self {
            i,
            j,
            electrostatic: 0.0,
            vdw: 0.0,
            force: Vector3::zeros(),
        }
    }
}

/// Coincident particles have no defined interaction and are skipped.
const MIN_PAIR_DISTANCE: f32 = 1e-6;

#[derive(Debug, Clone, Copy)]
enum CoulombKind {
    Plain,
    ReactionField { krf: f32, crf: f32 },
    Ewald { alpha: f32 },
}

/// Evaluates the pairwise terms of one step from a fixed set of working positions.
pub(crate) struct PairEvaluator<'a> {
    table: &'a ParameterTable,
    state: &'a MethodState,
    positions: &'a WorkingPositions,
    periodic_box: Option<Vector3<f32>>,
    lj: Vec<(f32, f32)>,
}

impl<'a> PairEvaluator<'a> {
    pub fn new(
        table: &'a ParameterTable,
        state: &'a MethodState,
        positions: &'a WorkingPositions,
        periodic_box: Option<Vector3<f32>>,
    ) -> Self {
        let lj = table
            .particles()
            .iter()
            .map(|p| (p.sigma as f32, p.epsilon as f32))
            .collect();
        Self {
            table,
            state,
            positions,
            periodic_box,
            lj,
        }
    }

    #[inline]
    fn separation(&self, i: usize, j: usize) -> (Vector3<f32>, f32) {
        let delta = minimum_image(
            self.positions.position(j) - self.positions.position(i),
            self.periodic_box.as_ref(),
        );
        (delta, delta.norm())
    }

    fn coulomb_kind(&self) -> CoulombKind {
        match self.state.method {
            NonbondedMethod::NoCutoff => CoulombKind::Plain,
            NonbondedMethod::CutoffNonPeriodic | NonbondedMethod::CutoffPeriodic => {
                let (krf, crf) = self.state.reaction_field_constants();
                CoulombKind::ReactionField {
                    krf: krf as f32,
                    crf: crf as f32,
                }
            }
            NonbondedMethod::Ewald | NonbondedMethod::Pme => CoulombKind::Ewald {
                alpha: self.state.ewald_alpha as f32,
            },
        }
    }

    /// Coulomb and Lennard-Jones over every neighbor pair.
    pub fn direct(
        &self,
        neighbors: &NeighborList,
        forces: Option<&mut [Vector3<f64>]>,
    ) -> EnergyTerm {
        let kind = self.coulomb_kind();
        let switch = self
            .state
            .switching_distance
            .map(|r_sw| (r_sw as f32, self.state.cutoff as f32));

        let evaluate = |&(i, j): &(usize, usize)| -> PairContribution {
            let (delta, r) = self.separation(i, j);
            if r < MIN_PAIR_DISTANCE {
                return PairContribution::empty(i, j);
            }
            let qq = self.positions.charge(i) * self.positions.charge(j);
            let (elec_energy, elec_force) = match kind {
                CoulombKind::Plain => coulomb(r, qq),
                CoulombKind::ReactionField { krf, crf } => reaction_field(r, qq, krf, crf),
                CoulombKind::Ewald { alpha } => ewald_real_space(r, qq, alpha),
            };

            let (sigma_i, epsilon_i) = self.lj[i];
            let (sigma_j, epsilon_j) = self.lj[j];
            let lj =
                lennard_jones_12_6(r, 0.5 * (sigma_i + sigma_j), (epsilon_i * epsilon_j).sqrt());
            let (vdw_energy, vdw_force) = match switch {
                Some((r_sw, rc)) => apply_switch(lj, switching_function(r, r_sw, rc)),
                None => lj,
            };

            PairContribution {
                i,
                j,
                electrostatic: elec_energy,
                vdw: vdw_energy,
                force: delta * ((elec_force + vdw_force) / r),
            }
        };

        let (electrostatic, vdw) = accumulate(neighbors.pairs(), evaluate, forces);
        trace!(
            num_pairs = neighbors.len(),
            electrostatic,
            vdw,
            "Direct-space pairs evaluated"
        );
        EnergyTerm {
            coulomb: electrostatic,
            vdw,
            ..Default::default()
        }
    }

    /// Removes the screened interaction the reciprocal sum includes for excluded pairs.
    pub fn exclusion_corrections(&self, forces: Option<&mut [Vector3<f64>]>) -> EnergyTerm {
        let alpha = self.state.ewald_alpha as f32;
        let evaluate = |&(i, j): &(usize, usize)| -> PairContribution {
            let (delta, r) = self.separation(i, j);
            let qq = self.positions.charge(i) * self.positions.charge(j);
            let (energy, force) = ewald_exclusion_correction(r, qq, alpha);
            let force = if r > 0.0 {
                delta * (force / r)
            } else {
                Vector3::zeros()
            };
            PairContribution {
                i,
                j,
                electrostatic: energy,
                vdw: 0.0,
                force,
            }
        };

        let (correction, _) = accumulate(self.table.excluded_pairs(), evaluate, forces);
        EnergyTerm {
            coulomb: correction,
            ..Default::default()
        }
    }

    /// Scaled 1-4 pairs, with neither cutoff nor switching.
    pub fn exceptions(&self, forces: Option<&mut [Vector3<f64>]>) -> EnergyTerm {
        let evaluate = |pair: &ScaledPair| -> PairContribution {
            let (i, j) = (pair.particle1, pair.particle2);
            let (delta, r) = self.separation(i, j);
            if r < MIN_PAIR_DISTANCE {
                return PairContribution::empty(i, j);
            }
            let (elec_energy, elec_force) = coulomb(r, pair.charge_prod as f32);
            let (vdw_energy, vdw_force) =
                lennard_jones_12_6(r, pair.sigma as f32, pair.epsilon as f32);
            PairContribution {
                i,
                j,
                electrostatic: elec_energy,
                vdw: vdw_energy,
                force: delta * ((elec_force + vdw_force) / r),
            }
        };

        let (electrostatic, vdw) = accumulate(self.table.scaled_pairs(), evaluate, forces);
        EnergyTerm {
            exceptions: electrostatic + vdw,
            ..Default::default()
        }
    }

    /// Uniform-density tail correction; energy only.
    pub fn dispersion(&self, box_size: &Vector3<f64>) -> EnergyTerm {
        if !self.state.method.is_periodic() || self.state.dispersion_coefficient == 0.0 {
            return EnergyTerm::default();
        }
        let volume = box_size.x * box_size.y * box_size.z;
        EnergyTerm {
            dispersion: self.state.dispersion_coefficient / volume,
            ..Default::default()
        }
    }
}

/// Evaluates `items` (in parallel when enabled), then scatters forces and sums energies
/// in item order so the result does not depend on scheduling.
fn accumulate<T, F>(items: &[T], evaluate: F, forces: Option<&mut [Vector3<f64>]>) -> (f64, f64)
where
    T: Sync,
    F: Fn(&T) -> PairContribution + Sync + Send,
{
    #[cfg(not(feature = "parallel"))]
    let contributions: Vec<PairContribution> = items.iter().map(evaluate).collect();

    #[cfg(feature = "parallel")]
    let contributions: Vec<PairContribution> = items.par_iter().map(evaluate).collect();

    let mut electrostatic = 0.0f64;
    let mut vdw = 0.0f64;
    for c in &contributions {
        electrostatic += c.electrostatic as f64;
        vdw += c.vdw as f64;
    }
    if let Some(forces) = forces {
        for c in &contributions {
            let f = c.force.cast::<f64>();
            forces[c.j] += f;
            forces[c.i] -= f;
        }
    }
    (electrostatic, vdw)
}
