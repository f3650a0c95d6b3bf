use crate::core::forcefield::term::EnergyTerm;
use crate::core::io::system_file::{SystemFile, SystemFileError};
use crate::core::methods::MethodState;
use crate::engine::config::{ComputeFlags, SystemTopology};
use crate::engine::context::SimulationState;
use crate::engine::error::KernelError;
use crate::engine::kernel::NonbondedKernel;
use nalgebra::Vector3;
use std::path::Path;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum EvaluateError {
    #[error("Failed to read system: {0}")]
    System(#[from] SystemFileError),
    #[error("Nonbonded evaluation failed: {0}")]
    Kernel(#[from] KernelError),
}

#[derive(Debug, Clone)]
pub struct EvaluationResult {
    pub energy: EnergyTerm,
    pub forces: Vec<Vector3<f64>>,
    /// Method parameters as derived for the system's box.
    pub method: MethodState,
}

#[instrument(skip_all, name = "evaluate_workflow")]
pub fn run(system: &SystemFile, flags: ComputeFlags) -> Result<EvaluationResult, EvaluateError> {
    let config = system.force_config()?;
    let positions = system.positions();
    let box_size = system.box_vector();

    let topology = SystemTopology::new(positions.len(), box_size);
    let mut kernel = NonbondedKernel::initialize(&topology, &config)?;
    let mut state = SimulationState::new(positions, box_size);

    let energy = kernel.execute_detailed(&mut state, flags)?;
    info!(total = energy.total(), "Evaluation complete");

    Ok(EvaluationResult {
        energy,
        forces: state.forces,
        method: kernel.method_state().clone(),
    })
}

/// Loads a system file and evaluates it.
pub fn run_file(path: &Path, flags: ComputeFlags) -> Result<EvaluationResult, EvaluateError> {
    let system = SystemFile::load(path)?;
    run(&system, flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::params::NonbondedMethod;
    use crate::core::forcefield::potentials::COULOMB_CONSTANT;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const DIMER: &str = r#"
        positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]

        [force]
        method = "no-cutoff"

        [[force.particles]]
        charge = 1.0
        sigma = 0.3
        epsilon = 0.0

        [[force.particles]]
        charge = -1.0
        sigma = 0.3
        epsilon = 0.0
    "#;

    #[test]
    fn run_file_evaluates_a_dimer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dimer.toml");
        write!(File::create(&path).unwrap(), "{DIMER}").unwrap();

        let result = run_file(&path, ComputeFlags::default()).unwrap();
        let deviation = (result.energy.total() + COULOMB_CONSTANT).abs();
        assert!(deviation < 1e-4 * COULOMB_CONSTANT);
        assert_eq!(result.forces.len(), 2);
        assert!(result.forces[0].x > 0.0);
        assert_eq!(result.method.method, NonbondedMethod::NoCutoff);
    }

    #[test]
    fn run_reports_kernel_errors() {
        let content = DIMER.replace("no-cutoff", "pme");
        let system: SystemFile = toml::from_str(&content).unwrap();
        // Default box is all zeros, which cannot hold the cutoff.
        assert!(matches!(
            run(&system, ComputeFlags::default()),
            Err(EvaluateError::Kernel(KernelError::InvalidBoxGeometry { .. }))
        ));
    }

    #[test]
    fn run_file_reports_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            run_file(&dir.path().join("absent.toml"), ComputeFlags::default()),
            Err(EvaluateError::System(SystemFileError::Io { .. }))
        ));
    }
}
