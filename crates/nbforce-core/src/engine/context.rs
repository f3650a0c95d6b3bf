use nalgebra::{Point3, Vector3};

/// The host simulation state a kernel reads positions from and adds forces into.
///
/// Positions and forces are indexed by particle and must both have the length the
/// kernel was initialized with. The box is read on every evaluation, so a host that
/// rescales its box only has to report the new size.
pub trait SimulationContext {
    fn positions(&self) -> &[Point3<f64>];
    fn forces_mut(&mut self) -> &mut [Vector3<f64>];
    /// Edge lengths of the rectangular periodic box; ignored by non-periodic methods.
    fn box_size(&self) -> Vector3<f64>;
}

/// An in-memory [`SimulationContext`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub positions: Vec<Point3<f64>>,
    pub forces: Vec<Vector3<f64>>,
    pub box_size: Vector3<f64>,
}

impl SimulationState {
    /// Creates a state with zeroed forces.
    pub fn new(positions: Vec<Point3<f64>>, box_size: Vector3<f64>) -> Self {
        let forces = vec![Vector3::zeros(); positions.len()];
        Self {
            positions,
            forces,
            box_size,
        }
    }

    pub fn clear_forces(&mut self) {
        self.forces.iter_mut().for_each(|f| *f = Vector3::zeros());
    }
}

impl SimulationContext for SimulationState {
    fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    fn forces_mut(&mut self) -> &mut [Vector3<f64>] {
        &mut self.forces
    }

    fn box_size(&self) -> Vector3<f64> {
        self.box_size
    }
}
