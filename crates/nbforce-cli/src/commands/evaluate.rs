use crate::cli::EvaluateArgs;
use crate::error::Result;
use nbforce::engine::config::ComputeFlags;
use nbforce::workflows::{self, evaluate::EvaluationResult};
use std::io::Write;
use tracing::info;

pub fn run(args: EvaluateArgs) -> Result<()> {
    let flags = ComputeFlags::default()
        .forces(args.forces)
        .direct(!args.no_direct)
        .reciprocal(!args.no_reciprocal);

    info!("Evaluating system from {:?}", &args.system);
    let result = workflows::evaluate::run_file(&args.system, flags)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    render(&result, args.forces, &mut out)?;
    Ok(())
}

fn render(
    result: &EvaluationResult,
    with_forces: bool,
    out: &mut impl Write,
) -> std::io::Result<()> {
    let energy = &result.energy;
    writeln!(out, "Method: {:?}", result.method.method)?;
    writeln!(out, "Energy (kJ/mol)")?;
    writeln!(out, "  {:<14}{:>18.6}", "coulomb", energy.coulomb)?;
    writeln!(out, "  {:<14}{:>18.6}", "vdw", energy.vdw)?;
    writeln!(out, "  {:<14}{:>18.6}", "reciprocal", energy.reciprocal)?;
    writeln!(out, "  {:<14}{:>18.6}", "exceptions", energy.exceptions)?;
    writeln!(out, "  {:<14}{:>18.6}", "dispersion", energy.dispersion)?;
    writeln!(out, "  {:<14}{:>18.6}", "total", energy.total())?;

    if with_forces {
        writeln!(out, "Forces (kJ/mol/nm)")?;
        for (i, f) in result.forces.iter().enumerate() {
            writeln!(out, "  {:>6} {:>16.6} {:>16.6} {:>16.6}", i, f.x, f.y, f.z)?;
        }
    }
    Ok(())
}
