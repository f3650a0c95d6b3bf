use crate::cli::CheckArgs;
use crate::error::Result;
use nbforce::core::io::system_file::SystemFile;
use nbforce::engine::config::SystemTopology;
use nbforce::engine::kernel::NonbondedKernel;
use std::io::Write;
use tracing::info;

pub fn run(args: CheckArgs) -> Result<()> {
    info!("Checking system from {:?}", &args.system);
    let system = SystemFile::load(&args.system)?;
    let config = system.force_config()?;
    let topology = SystemTopology::new(system.positions.len(), system.box_vector());
    let kernel = NonbondedKernel::initialize(&topology, &config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    render(&kernel, &mut out)?;
    Ok(())
}

fn render(kernel: &NonbondedKernel, out: &mut impl Write) -> std::io::Result<()> {
    let state = kernel.method_state();
    let table = kernel.parameters();
    writeln!(out, "Particles:          {}", kernel.num_particles())?;
    writeln!(out, "Excluded pairs:     {}", table.excluded_pairs().len())?;
    writeln!(out, "Scaled pairs:       {}", table.scaled_pairs().len())?;
    writeln!(out, "Method:             {:?}", state.method)?;
    if let Some(cutoff) = state.neighbor_cutoff() {
        writeln!(out, "Cutoff (nm):        {cutoff}")?;
    }
    if let Some(switching) = state.switching_distance {
        writeln!(out, "Switching (nm):     {switching}")?;
    }
    if state.method.uses_ewald() {
        writeln!(out, "Ewald alpha (1/nm): {:.6}", state.ewald_alpha)?;
    }
    writeln!(out, "Reciprocal bounds:  {:?}", state.reciprocal)?;
    if state.dispersion_coefficient != 0.0 {
        writeln!(
            out,
            "Dispersion coeff.:  {:.6}",
            state.dispersion_coefficient
        )?;
    }
    Ok(())
}
