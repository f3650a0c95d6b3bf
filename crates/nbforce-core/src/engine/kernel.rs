use super::config::{ComputeFlags, SystemTopology};
use super::context::SimulationContext;
use super::error::KernelError;
use super::evaluator::PairEvaluator;
use crate::core::forcefield::params::NonbondedForceConfig;
use crate::core::forcefield::table::ParameterTable;
use crate::core::forcefield::term::EnergyTerm;
use crate::core::methods::MethodState;
use crate::core::models::positions::WorkingPositions;
use crate::core::reciprocal::{ReciprocalRequest, ReciprocalSolver, default_solver};
use crate::core::spatial::neighbor_list::NeighborList;
use crate::core::utils::periodic::box_fits_cutoff;
use nalgebra::Vector3;
use tracing::{debug, info, instrument, warn};

/// CPU evaluator of one nonbonded force.
///
/// A kernel exists only in the ready state: [`NonbondedKernel::initialize`] either
/// returns a fully built kernel or an error. Evaluation and parameter updates take
/// `&mut self`, so one instance is never evaluated and updated at the same time.
pub struct NonbondedKernel {
    table: ParameterTable,
    state: MethodState,
    solver: Option<Box<dyn ReciprocalSolver>>,
}

impl std::fmt::Debug for NonbondedKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonbondedKernel")
            .field("num_particles", &self.table.num_particles())
            .field("state", &self.state)
            .field("solver", &self.solver.as_ref().map(|s| s.name()))
            .finish()
    }
}

impl NonbondedKernel {
    #[instrument(
        skip_all,
        name = "nonbonded_initialize",
        fields(method = ?config.method, num_particles = topology.num_particles)
    )]
    pub fn initialize(
        topology: &SystemTopology,
        config: &NonbondedForceConfig,
    ) -> Result<Self, KernelError> {
        if config.num_particles() != topology.num_particles {
            return Err(KernelError::ConfigurationMismatch(format!(
                "the force defines {} particles but the system has {}",
                config.num_particles(),
                topology.num_particles
            )));
        }

        let table = ParameterTable::build(config)?;
        let state = MethodState::derive(config, &topology.default_box_size, table.particles())?;
        let solver = default_solver(state.method);

        info!(
            num_exclusions = table.excluded_pairs().len(),
            num_scaled_pairs = table.scaled_pairs().len(),
            ewald_alpha = state.ewald_alpha,
            reciprocal = ?state.reciprocal,
            "Nonbonded kernel initialized"
        );
        Ok(Self {
            table,
            state,
            solver,
        })
    }

    pub fn num_particles(&self) -> usize {
        self.table.num_particles()
    }

    pub fn method_state(&self) -> &MethodState {
        &self.state
    }

    pub fn parameters(&self) -> &ParameterTable {
        &self.table
    }

    /// Replaces the reciprocal-space solver used by Ewald and PME.
    pub fn set_reciprocal_solver(
        &mut self,
        solver: Box<dyn ReciprocalSolver>,
    ) -> Result<(), KernelError> {
        if !self.state.method.uses_ewald() {
            return Err(KernelError::ConfigurationMismatch(format!(
                "method {:?} has no reciprocal-space part",
                self.state.method
            )));
        }
        debug!(solver = solver.name(), "Reciprocal solver replaced");
        self.solver = Some(solver);
        Ok(())
    }

    /// Runs one evaluation and returns the total energy, or `0.0` when energy is not
    /// requested.
    pub fn execute<C>(&mut self, context: &mut C, flags: ComputeFlags) -> Result<f64, KernelError>
    where
        C: SimulationContext + ?Sized,
    {
        let terms = self.execute_detailed(context, flags)?;
        Ok(if flags.include_energy {
            terms.total()
        } else {
            0.0
        })
    }

    /// Runs one evaluation and returns the energy split by contribution.
    ///
    /// Forces are added into the host's buffer only when `include_forces` is set and the
    /// whole evaluation succeeded.
    #[instrument(skip_all, name = "nonbonded_execute", fields(method = ?self.state.method))]
    pub fn execute_detailed<C>(
        &mut self,
        context: &mut C,
        flags: ComputeFlags,
    ) -> Result<EnergyTerm, KernelError>
    where
        C: SimulationContext + ?Sized,
    {
        let n = self.table.num_particles();
        let num_positions = context.positions().len();
        if num_positions != n {
            return Err(KernelError::ContextMismatch {
                expected: n,
                found: num_positions,
            });
        }
        let num_forces = context.forces_mut().len();
        if num_forces != n {
            return Err(KernelError::ContextMismatch {
                expected: n,
                found: num_forces,
            });
        }

        let box_size = context.box_size();
        let periodic = self.state.method.is_periodic();
        if periodic {
            if !box_fits_cutoff(&box_size, self.state.cutoff) {
                return Err(KernelError::PeriodicBoxTooSmall {
                    box_size,
                    cutoff: self.state.cutoff,
                });
            }
            if self.state.box_size != Some(box_size) {
                debug!(?box_size, "Periodic box changed; re-deriving method parameters");
                self.state.rederive_for_box(&box_size)?;
            }
        }

        let positions = WorkingPositions::from_host(
            context.positions(),
            self.table.charges(),
            periodic.then_some(&box_size),
        );
        let periodic_box: Option<Vector3<f32>> = periodic.then(|| box_size.cast());
        let mut forces = flags
            .include_forces
            .then(|| vec![Vector3::<f64>::zeros(); n]);

        let mut terms = EnergyTerm::default();
        if flags.include_direct {
            let cutoff = self.state.neighbor_cutoff().map(|c| c as f32);
            let neighbors = NeighborList::compute(
                &positions,
                self.table.exclusions(),
                periodic_box.as_ref(),
                cutoff,
            );
            let evaluator = PairEvaluator::new(&self.table, &self.state, &positions, periodic_box);

            terms += evaluator.direct(&neighbors, forces.as_deref_mut());
            if self.state.method.uses_ewald() {
                terms += evaluator.exclusion_corrections(forces.as_deref_mut());
            }
            terms += evaluator.exceptions(forces.as_deref_mut());
            terms += evaluator.dispersion(&box_size);
        }

        if flags.include_reciprocal && self.state.method.uses_ewald() {
            match self.solver.as_mut() {
                Some(solver) => {
                    let request = ReciprocalRequest {
                        positions: &positions,
                        box_size,
                        alpha: self.state.ewald_alpha,
                        bounds: self.state.reciprocal,
                    };
                    terms.reciprocal = solver.compute(&request, forces.as_deref_mut())?;
                }
                None => warn!("No reciprocal solver installed; skipping reciprocal space"),
            }
        }

        if let Some(forces) = forces {
            for (host, f) in context.forces_mut().iter_mut().zip(forces) {
                *host += f;
            }
        }

        debug!(total = terms.total(), "Nonbonded evaluation finished");
        Ok(terms)
    }

    /// Replaces charges and Lennard-Jones parameters of particles and scaled pairs.
    ///
    /// The particle count, the exception pairs and which exceptions carry an interaction
    /// must be unchanged. Method settings in `config` are not applied.
    #[instrument(skip_all, name = "nonbonded_update_parameters")]
    pub fn update_parameters(&mut self, config: &NonbondedForceConfig) -> Result<(), KernelError> {
        self.table.update(config)?;
        let particles = self.table.particles();
        self.state.refresh_dispersion_coefficient(particles);
        if config.method != self.state.method || config.cutoff != self.state.cutoff {
            warn!(
                requested = ?config.method,
                active = ?self.state.method,
                "Method settings cannot change after initialization and were ignored"
            );
        }
        Ok(())
    }
}
