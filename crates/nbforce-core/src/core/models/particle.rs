use std::collections::HashSet;

/// Nonbonded parameters of a single particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleRecord {
    /// Index of the particle in the host's arrays.
    pub index: usize,
    /// Partial charge in elementary charge units.
    pub charge: f64,
    /// Lennard-Jones sigma (the "radius") in nm.
    pub sigma: f64,
    /// Lennard-Jones epsilon (the "well depth") in kJ/mol.
    pub epsilon: f64,
}

/// An excluded pair that still interacts through its own, typically scaled, parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledPair {
    pub particle1: usize,
    pub particle2: usize,
    pub charge_prod: f64,
    pub sigma: f64,
    pub epsilon: f64,
}

/// Symmetric per-particle exclusion sets.
///
/// Inserting `(a, b)` always records both directions, and a particle never excludes itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    partners: Vec<HashSet<usize>>,
}

impl ExclusionSet {
    pub fn new(num_particles: usize) -> Self {
        Self {
            partners: vec![HashSet::new(); num_particles],
        }
    }

    /// Records an exclusion. Returns `false` if the pair was already excluded.
    ///
    /// Panics in debug builds on a self-exclusion; callers validate indices first.
    pub fn insert(&mut self, a: usize, b: usize) -> bool {
        debug_assert_ne!(a, b, "a particle cannot exclude itself");
        let fresh = self.partners[a].insert(b);
        self.partners[b].insert(a);
        fresh
    }

    #[inline]
    pub fn contains(&self, a: usize, b: usize) -> bool {
        self.partners
            .get(a)
            .is_some_and(|partners| partners.contains(&b))
    }

    /// Every excluded pair once, as `(i, j)` with `i < j`, in ascending order.
    pub fn unique_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs: Vec<_> = self
            .partners
            .iter()
            .enumerate()
            .flat_map(|(i, set)| {
                set.iter().filter(move |&&j| j > i).map(move |&j| (i, j))
            })
            .collect();
        pairs.sort_unstable();
        pairs
    }
}
