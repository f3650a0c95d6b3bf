use super::bspline::{PME_ORDER, bspline_moduli, bspline_weights};
use super::{ReciprocalError, ReciprocalRequest, ReciprocalSolver, check_force_buffer, self_energy};
use crate::core::forcefield::potentials::COULOMB_CONSTANT;
use crate::core::methods::ReciprocalBounds;
use nalgebra::Vector3;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftDirection, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;
use tracing::{debug, trace};

/// Spline support of one particle: first grid index and weights along each axis.
struct Stencil {
    base: [usize; 3],
    theta: [[f64; PME_ORDER]; 3],
    dtheta: [[f64; PME_ORDER]; 3],
}

/// Per-grid-size state reused across evaluations.
struct MeshPlan {
    grid: [usize; 3],
    moduli: [Vec<f64>; 3],
    forward: [Arc<dyn Fft<f64>>; 3],
    inverse: [Arc<dyn Fft<f64>>; 3],
}

impl MeshPlan {
    fn new(grid: [usize; 3]) -> Self {
        let mut planner = FftPlanner::new();
        let forward = grid.map(|n| planner.plan_fft(n, FftDirection::Forward));
        let inverse = grid.map(|n| planner.plan_fft(n, FftDirection::Inverse));
        Self {
            grid,
            moduli: grid.map(bspline_moduli),
            forward,
            inverse,
        }
    }

    #[inline]
    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (x * self.grid[1] + y) * self.grid[2] + z
    }

    /// In-place 3D transform as three passes of 1D transforms.
    fn transform(&self, mesh: &mut [Complex<f64>], direction: FftDirection) {
        let plans = match direction {
            FftDirection::Forward => &self.forward,
            FftDirection::Inverse => &self.inverse,
        };
        let [nx, ny, nz] = self.grid;

        plans[2].process(mesh);

        let mut line = vec![Complex::default(); ny];
        for x in 0..nx {
            for z in 0..nz {
                for (y, v) in line.iter_mut().enumerate() {
                    *v = mesh[self.index(x, y, z)];
                }
                plans[1].process(&mut line);
                for (y, v) in line.iter().enumerate() {
                    mesh[self.index(x, y, z)] = *v;
                }
            }
        }

        let mut line = vec![Complex::default(); nx];
        for y in 0..ny {
            for z in 0..nz {
                for (x, v) in line.iter_mut().enumerate() {
                    *v = mesh[self.index(x, y, z)];
                }
                plans[0].process(&mut line);
                for (x, v) in line.iter().enumerate() {
                    mesh[self.index(x, y, z)] = *v;
                }
            }
        }
    }
}

/// Smooth particle-mesh Ewald with order-5 B-splines on a rectangular box.
#[derive(Default)]
pub struct SmoothPme {
    plan: Option<MeshPlan>,
}

impl SmoothPme {
    pub fn new() -> Self {
        Self::default()
    }

    fn plan_for(&mut self, grid: [usize; 3]) -> &MeshPlan {
        if self.plan.as_ref().is_none_or(|p| p.grid != grid) {
            debug!(?grid, "Planning PME mesh transforms");
            self.plan = Some(MeshPlan::new(grid));
        }
        self.plan.get_or_insert_with(|| MeshPlan::new(grid))
    }
}

impl ReciprocalSolver for SmoothPme {
    fn name(&self) -> &'static str {
        "pme"
    }

    fn compute(
        &mut self,
        request: &ReciprocalRequest<'_>,
        forces: Option<&mut [Vector3<f64>]>,
    ) -> Result<f64, ReciprocalError> {
        let ReciprocalBounds::Pme { grid } = request.bounds else {
            return Err(ReciprocalError::UnsupportedBounds {
                solver: self.name(),
                bounds: request.bounds,
            });
        };
        check_force_buffer(request.positions, &forces)?;

        let box_size = request.box_size;
        let alpha = request.alpha;
        let plan = self.plan_for(grid);

        let charges: Vec<f64> = request.positions.iter().map(|p| p.w as f64).collect();
        let stencils: Vec<Stencil> = request
            .positions
            .iter()
            .map(|p| {
                let mut base = [0; 3];
                let mut theta = [[0.0; PME_ORDER]; 3];
                let mut dtheta = [[0.0; PME_ORDER]; 3];
                for d in 0..3 {
                    let t = p[d] as f64 / box_size[d];
                    let scaled = (t - t.floor()) * grid[d] as f64;
                    let cell = scaled.floor();
                    base[d] = (cell as usize) % grid[d];
                    (theta[d], dtheta[d]) = bspline_weights(scaled - cell);
                }
                Stencil {
                    base,
                    theta,
                    dtheta,
                }
            })
            .collect();

        let mut mesh = vec![Complex::default(); grid[0] * grid[1] * grid[2]];
        for (stencil, &q) in stencils.iter().zip(&charges) {
            for ix in 0..PME_ORDER {
                let x = (stencil.base[0] + ix) % grid[0];
                let wx = q * stencil.theta[0][ix];
                for iy in 0..PME_ORDER {
                    let y = (stencil.base[1] + iy) % grid[1];
                    let wxy = wx * stencil.theta[1][iy];
                    for iz in 0..PME_ORDER {
                        let z = (stencil.base[2] + iz) % grid[2];
                        mesh[plan.index(x, y, z)].re += wxy * stencil.theta[2][iz];
                    }
                }
            }
        }

        plan.transform(&mut mesh, FftDirection::Forward);

        let volume = box_size.x * box_size.y * box_size.z;
        let mut energy = 0.0;
        for x in 0..grid[0] {
            let mx = wave_number(x, grid[0]) / box_size.x;
            for y in 0..grid[1] {
                let my = wave_number(y, grid[1]) / box_size.y;
                for z in 0..grid[2] {
                    let index = plan.index(x, y, z);
                    if index == 0 {
                        mesh[0] = Complex::default();
                        continue;
                    }
                    let mz = wave_number(z, grid[2]) / box_size.z;
                    let m2 = mx * mx + my * my + mz * mz;
                    let moduli = plan.moduli[0][x] * plan.moduli[1][y] * plan.moduli[2][z];
                    let decay = (-PI * PI * m2 / (alpha * alpha)).exp();
                    let eterm = COULOMB_CONSTANT * decay / (PI * volume * m2 * moduli);
                    energy += 0.5 * eterm * mesh[index].norm_sqr();
                    mesh[index] *= eterm;
                }
            }
        }
        trace!(?grid, energy, "PME reciprocal convolution");

        if let Some(forces) = forces {
            plan.transform(&mut mesh, FftDirection::Inverse);
            for ((stencil, &q), force) in stencils.iter().zip(&charges).zip(forces.iter_mut()) {
                let mut f = Vector3::<f64>::zeros();
                for ix in 0..PME_ORDER {
                    let x = (stencil.base[0] + ix) % grid[0];
                    for iy in 0..PME_ORDER {
                        let y = (stencil.base[1] + iy) % grid[1];
                        for iz in 0..PME_ORDER {
                            let z = (stencil.base[2] + iz) % grid[2];
                            let value = mesh[plan.index(x, y, z)].re;
                            let (tx, ty, tz) = (
                                stencil.theta[0][ix],
                                stencil.theta[1][iy],
                                stencil.theta[2][iz],
                            );
                            f.x += stencil.dtheta[0][ix] * ty * tz * value;
                            f.y += tx * stencil.dtheta[1][iy] * tz * value;
                            f.z += tx * ty * stencil.dtheta[2][iz] * value;
                        }
                    }
                }
                *force -= Vector3::new(
                    q * f.x * grid[0] as f64 / box_size.x,
                    q * f.y * grid[1] as f64 / box_size.y,
                    q * f.z * grid[2] as f64 / box_size.z,
                );
            }
        }

        Ok(energy + self_energy(request.positions, alpha))
    }
}

/// Signed frequency of grid index `k` on an axis of `n` points.
#[inline]
fn wave_number(k: usize, n: usize) -> f64 {
    if k < n.div_ceil(2) {
        k as f64
    } else {
        k as f64 - n as f64
    }
}
