use nalgebra::Vector3;

/// What a single evaluation should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputeFlags {
    pub include_forces: bool,
    pub include_energy: bool,
    /// Direct-space pairs, exclusion corrections, 1-4 exceptions and the dispersion term.
    pub include_direct: bool,
    /// The Ewald or PME reciprocal-space sum.
    pub include_reciprocal: bool,
}

impl Default for ComputeFlags {
    fn default() -> Self {
        Self {
            include_forces: true,
            include_energy: true,
            include_direct: true,
            include_reciprocal: true,
        }
    }
}

impl ComputeFlags {
    pub fn energy_only() -> Self {
        Self::default().forces(false)
    }

    pub fn forces(mut self, enabled: bool) -> Self {
        self.include_forces = enabled;
        self
    }
    pub fn energy(mut self, enabled: bool) -> Self {
        self.include_energy = enabled;
        self
    }
    pub fn direct(mut self, enabled: bool) -> Self {
        self.include_direct = enabled;
        self
    }
    pub fn reciprocal(mut self, enabled: bool) -> Self {
        self.include_reciprocal = enabled;
        self
    }
}

/// The parts of the host's system the kernel is sized against at initialization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemTopology {
    pub num_particles: usize,
    /// Periodic box used to derive method parameters before the first evaluation.
    pub default_box_size: Vector3<f64>,
}

impl SystemTopology {
    pub fn new(num_particles: usize, default_box_size: Vector3<f64>) -> Self {
        Self {
            num_particles,
            default_box_size,
        }
    }
}
