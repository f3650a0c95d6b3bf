use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// The algorithm used to handle nonbonded interactions.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NonbondedMethod {
    /// Every pair interacts; no periodic images.
    #[default]
    NoCutoff,
    /// Pairs beyond the cutoff are ignored and Coulomb uses a reaction field.
    CutoffNonPeriodic,
    /// As [`NonbondedMethod::CutoffNonPeriodic`], under the minimum-image convention.
    CutoffPeriodic,
    /// Periodic Ewald summation with an explicit k-space sum.
    Ewald,
    /// Periodic smooth particle-mesh Ewald.
    Pme,
}

impl NonbondedMethod {
    pub fn is_periodic(self) -> bool {
        matches!(self, Self::CutoffPeriodic | Self::Ewald | Self::Pme)
    }

    pub fn uses_cutoff(self) -> bool {
        !matches!(self, Self::NoCutoff)
    }

    pub fn uses_ewald(self) -> bool {
        matches!(self, Self::Ewald | Self::Pme)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ParticleParams {
    pub charge: f64,
    pub sigma: f64,
    pub epsilon: f64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ExceptionParams {
    pub particle1: usize,
    pub particle2: usize,
    pub charge_prod: f64,
    pub sigma: f64,
    pub epsilon: f64,
}

impl ExceptionParams {
    /// Whether the exception carries any interaction, or only excludes the pair.
    #[inline]
    pub fn is_scaled(&self) -> bool {
        self.charge_prod != 0.0 || self.epsilon != 0.0
    }
}

fn default_cutoff() -> f64 {
    1.0
}
fn default_rf_dielectric() -> f64 {
    78.3
}
fn default_ewald_tolerance() -> f64 {
    5e-4
}
fn default_true() -> bool {
    true
}

/// Raw nonbonded force-field configuration as supplied by the host.
///
/// Per-particle parameters are `(charge, sigma, epsilon)`; per-exception parameters
/// replace the combined interaction of one particle pair. An exception with zero
/// charge product and zero epsilon is a pure exclusion.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct NonbondedForceConfig {
    #[serde(default)]
    pub method: NonbondedMethod,
    #[serde(default = "default_cutoff")]
    pub cutoff: f64,
    #[serde(default)]
    pub switching_distance: Option<f64>,
    #[serde(default = "default_rf_dielectric")]
    pub reaction_field_dielectric: f64,
    #[serde(default = "default_true")]
    pub use_dispersion_correction: bool,
    #[serde(default = "default_ewald_tolerance")]
    pub ewald_error_tolerance: f64,
    #[serde(default)]
    pub particles: Vec<ParticleParams>,
    #[serde(default)]
    pub exceptions: Vec<ExceptionParams>,
}

impl Default for NonbondedForceConfig {
    fn default() -> Self {
        Self::new(NonbondedMethod::default())
    }
}

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BondGraphError {
    #[error("Bond ({0}, {1}) references a particle outside the configured range")]
    ParticleOutOfRange(usize, usize),
    #[error("Bond ({0}, {0}) connects a particle to itself")]
    SelfBond(usize),
}

impl NonbondedForceConfig {
    pub fn new(method: NonbondedMethod) -> Self {
        Self {
            method,
            cutoff: default_cutoff(),
            switching_distance: None,
            reaction_field_dielectric: default_rf_dielectric(),
            use_dispersion_correction: true,
            ewald_error_tolerance: default_ewald_tolerance(),
            particles: Vec::new(),
            exceptions: Vec::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ParamLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ParamLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }
    pub fn with_switching_distance(mut self, distance: f64) -> Self {
        self.switching_distance = Some(distance);
        self
    }
    pub fn with_reaction_field_dielectric(mut self, dielectric: f64) -> Self {
        self.reaction_field_dielectric = dielectric;
        self
    }
    pub fn with_dispersion_correction(mut self, enabled: bool) -> Self {
        self.use_dispersion_correction = enabled;
        self
    }
    pub fn with_ewald_error_tolerance(mut self, tolerance: f64) -> Self {
        self.ewald_error_tolerance = tolerance;
        self
    }

    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    pub fn num_exceptions(&self) -> usize {
        self.exceptions.len()
    }

    pub fn add_particle(&mut self, charge: f64, sigma: f64, epsilon: f64) -> usize {
        self.particles.push(ParticleParams {
            charge,
            sigma,
            epsilon,
        });
        self.particles.len() - 1
    }

    pub fn add_exception(
        &mut self,
        particle1: usize,
        particle2: usize,
        charge_prod: f64,
        sigma: f64,
        epsilon: f64,
    ) -> usize {
        self.exceptions.push(ExceptionParams {
            particle1,
            particle2,
            charge_prod,
            sigma,
            epsilon,
        });
        self.exceptions.len() - 1
    }

    /// Generates exceptions from a bond graph.
    ///
    /// Pairs separated by one or two bonds are fully excluded. Pairs separated by
    /// exactly three bonds (and not closer through another path) receive a scaled
    /// 1-4 interaction built from the current particle parameters: the charge
    /// product is scaled by `coulomb14_scale`, sigma is the arithmetic mean and
    /// epsilon the geometric mean scaled by `lj14_scale`.
    ///
    /// Call this after all particles are added and before the kernel is initialized.
    pub fn create_exceptions_from_bonds(
        &mut self,
        bonds: &[(usize, usize)],
        coulomb14_scale: f64,
        lj14_scale: f64,
    ) -> Result<(), BondGraphError> {
        let n = self.particles.len();
        let mut bonded: Vec<HashSet<usize>> = vec![HashSet::new(); n];
        for &(a, b) in bonds {
            if a >= n || b >= n {
                return Err(BondGraphError::ParticleOutOfRange(a, b));
            }
            if a == b {
                return Err(BondGraphError::SelfBond(a));
            }
            bonded[a].insert(b);
            bonded[b].insert(a);
        }

        for i in 0..n {
            // Shells of bonded neighbors at graph distance 1, 2 and 3.
            let mut seen: HashSet<usize> = HashSet::from([i]);
            let mut frontier = vec![i];
            for depth in 1..=3 {
                let mut next = Vec::new();
                for &p in &frontier {
                    for &q in &bonded[p] {
                        if seen.insert(q) {
                            next.push(q);
                        }
                    }
                }
                next.sort_unstable();
                for &j in next.iter().filter(|&&j| j > i) {
                    if depth < 3 {
                        self.add_exception(i, j, 0.0, 1.0, 0.0);
                    } else {
                        let (pi, pj) = (self.particles[i], self.particles[j]);
                        self.add_exception(
                            i,
                            j,
                            coulomb14_scale * pi.charge * pj.charge,
                            0.5 * (pi.sigma + pj.sigma),
                            lj14_scale * (pi.epsilon * pj.epsilon).sqrt(),
                        );
                    }
                }
                frontier = next;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn load_succeeds_with_valid_toml() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("force.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(
            file,
            r#"
            method = "pme"
            cutoff = 0.9
            switching-distance = 0.8
            ewald-error-tolerance = 1e-5

            [[particles]]
            charge = 0.5
            sigma = 0.3
            epsilon = 0.6

            [[particles]]
            charge = -0.5
            sigma = 0.3
            epsilon = 0.6

            [[exceptions]]
            particle1 = 0
            particle2 = 1
            charge-prod = 0.0
            sigma = 1.0
            epsilon = 0.0
            "#
        )
        .unwrap();

        let config = NonbondedForceConfig::load(&file_path).unwrap();
        assert_eq!(config.method, NonbondedMethod::Pme);
        assert_eq!(config.cutoff, 0.9);
        assert_eq!(config.switching_distance, Some(0.8));
        assert_eq!(config.ewald_error_tolerance, 1e-5);
        assert_eq!(config.reaction_field_dielectric, 78.3);
        assert!(config.use_dispersion_correction);
        assert_eq!(config.num_particles(), 2);
        assert_eq!(config.num_exceptions(), 1);
        assert!(!config.exceptions[0].is_scaled());
    }

    #[test]
    fn load_applies_defaults_for_missing_fields() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("minimal.toml");
        let contents = "[[particles]]\ncharge = 1.0\nsigma = 0.1\nepsilon = 0.0\n";
        fs::write(&file_path, contents).unwrap();

        let config = NonbondedForceConfig::load(&file_path).unwrap();
        assert_eq!(config.method, NonbondedMethod::NoCutoff);
        assert_eq!(config.cutoff, 1.0);
        assert_eq!(config.switching_distance, None);
        assert_eq!(config.num_particles(), 1);
    }

    #[test]
    fn load_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("non_existent.toml");
        let result = NonbondedForceConfig::load(&file_path);
        assert!(matches!(result, Err(ParamLoadError::Io { .. })));
    }

    #[test]
    fn load_fails_for_unknown_method() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("bad_method.toml");
        fs::write(&file_path, "method = \"reaction-field\"\n").unwrap();
        let result = NonbondedForceConfig::load(&file_path);
        assert!(matches!(result, Err(ParamLoadError::Toml { .. })));
    }

    #[test]
    fn method_classification_is_consistent() {
        assert!(!NonbondedMethod::NoCutoff.is_periodic());
        assert!(!NonbondedMethod::NoCutoff.uses_cutoff());
        assert!(!NonbondedMethod::CutoffNonPeriodic.is_periodic());
        assert!(NonbondedMethod::CutoffPeriodic.is_periodic());
        assert!(!NonbondedMethod::CutoffPeriodic.uses_ewald());
        assert!(NonbondedMethod::Ewald.uses_ewald());
        assert!(NonbondedMethod::Pme.is_periodic());
    }

    fn linear_chain(n: usize) -> NonbondedForceConfig {
        let mut config = NonbondedForceConfig::new(NonbondedMethod::NoCutoff);
        for i in 0..n {
            let charge = if i % 2 == 0 { 0.4 } else { -0.4 };
            config.add_particle(charge, 0.3, 0.5);
        }
        config
    }

    #[test]
    fn exceptions_from_bonds_excludes_12_13_and_scales_14() {
        let mut config = linear_chain(5);
        let bonds = [(0, 1), (1, 2), (2, 3), (3, 4)];
        config
            .create_exceptions_from_bonds(&bonds, 0.5, 0.25)
            .unwrap();

        // 1-2: 4 pairs, 1-3: 3 pairs, 1-4: 2 pairs.
        assert_eq!(config.num_exceptions(), 9);
        let scaled: Vec<_> = config.exceptions.iter().filter(|e| e.is_scaled()).collect();
        assert_eq!(scaled.len(), 2);

        let e = scaled
            .iter()
            .find(|e| e.particle1 == 0 && e.particle2 == 3)
            .unwrap();
        assert!((e.charge_prod - 0.5 * 0.4 * -0.4).abs() < 1e-12);
        assert!((e.sigma - 0.3).abs() < 1e-12);
        assert!((e.epsilon - 0.25 * 0.5).abs() < 1e-12);
    }

    #[test]
    fn exceptions_from_bonds_prefers_shortest_path_in_rings() {
        let mut config = linear_chain(4);
        let bonds = [(0, 1), (1, 2), (2, 3), (3, 0)];
        config
            .create_exceptions_from_bonds(&bonds, 0.5, 0.5)
            .unwrap();

        // In a four-membered ring every pair is within two bonds.
        assert_eq!(config.num_exceptions(), 6);
        assert!(config.exceptions.iter().all(|e| !e.is_scaled()));
    }

    #[test]
    fn exceptions_from_bonds_rejects_invalid_bonds() {
        let mut config = linear_chain(2);
        assert_eq!(
            config.create_exceptions_from_bonds(&[(0, 2)], 1.0, 1.0),
            Err(BondGraphError::ParticleOutOfRange(0, 2))
        );
        assert_eq!(
            config.create_exceptions_from_bonds(&[(1, 1)], 1.0, 1.0),
            Err(BondGraphError::SelfBond(1))
        );
    }
}
