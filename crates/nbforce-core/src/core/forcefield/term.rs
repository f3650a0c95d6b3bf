use std::ops::{Add, AddAssign};

/// Energy of one evaluation, split by contribution. All values in kJ/mol.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnergyTerm {
    /// Direct-space electrostatics, including the Ewald exclusion correction.
    pub coulomb: f64,
    /// Direct-space Lennard-Jones.
    pub vdw: f64,
    /// Reciprocal-space electrostatics, including the Ewald self energy.
    pub reciprocal: f64,
    /// Scaled 1-4 exception interactions.
    pub exceptions: f64,
    /// Long-range dispersion correction.
    pub dispersion: f64,
}

impl EnergyTerm {
    #[inline]
    pub fn total(&self) -> f64 {
        self.coulomb + self.vdw + self.reciprocal + self.exceptions + self.dispersion
    }
}

impl Add for EnergyTerm {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            coulomb: self.coulomb + rhs.coulomb,
            vdw: self.vdw + rhs.vdw,
            reciprocal: self.reciprocal + rhs.reciprocal,
            exceptions: self.exceptions + rhs.exceptions,
            dispersion: self.dispersion + rhs.dispersion,
        }
    }
}

impl AddAssign for EnergyTerm {
    fn add_assign(&mut self, rhs: Self) {
        self.coulomb += rhs.coulomb;
        self.vdw += rhs.vdw;
        self.reciprocal += rhs.reciprocal;
        self.exceptions += rhs.exceptions;
        self.dispersion += rhs.dispersion;
    }
}
