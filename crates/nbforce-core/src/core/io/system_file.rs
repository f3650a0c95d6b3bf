use crate::core::forcefield::params::{BondGraphError, NonbondedForceConfig};
use nalgebra::{Point3, Vector3};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

fn default_coulomb14_scale() -> f64 {
    0.8333
}
fn default_lj14_scale() -> f64 {
    0.5
}

/// A complete system description: positions, box and nonbonded force field.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SystemFile {
    /// Edge lengths of the rectangular periodic box in nm; ignored by non-periodic methods.
    #[serde(default)]
    pub box_size: [f64; 3],
    pub positions: Vec<[f64; 3]>,
    #[serde(default)]
    pub bonds: Vec<(usize, usize)>,
    #[serde(default = "default_coulomb14_scale")]
    pub coulomb14_scale: f64,
    #[serde(default = "default_lj14_scale")]
    pub lj14_scale: f64,
    pub force: NonbondedForceConfig,
}

#[derive(Debug, Error)]
pub enum SystemFileError {
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
    #[error("System lists {positions} positions but {particles} particles")]
    ParticleCountMismatch { positions: usize, particles: usize },
    #[error("Invalid bond list: {0}")]
    Bonds(#[from] BondGraphError),
}

impl SystemFile {
    pub fn load(path: &Path) -> Result<Self, SystemFileError> {
        let content = std::fs::read_to_string(path).map_err(|e| SystemFileError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let system: Self = toml::from_str(&content).map_err(|e| SystemFileError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        if system.positions.len() != system.force.num_particles() {
            return Err(SystemFileError::ParticleCountMismatch {
                positions: system.positions.len(),
                particles: system.force.num_particles(),
            });
        }
        Ok(system)
    }

    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.positions
            .iter()
            .map(|&[x, y, z]| Point3::new(x, y, z))
            .collect()
    }

    pub fn box_vector(&self) -> Vector3<f64> {
        Vector3::from(self.box_size)
    }

    /// The force configuration with bond-derived exceptions appended.
    pub fn force_config(&self) -> Result<NonbondedForceConfig, SystemFileError> {
        let mut config = self.force.clone();
        if !self.bonds.is_empty() {
            config.create_exceptions_from_bonds(
                &self.bonds,
                self.coulomb14_scale,
                self.lj14_scale,
            )?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::params::NonbondedMethod;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("system.toml");
        let mut file = File::create(&path).unwrap();
        write!(file, "{content}").unwrap();
        (dir, path)
    }

    const CHAIN: &str = r#"
        box-size = [3.0, 3.0, 3.0]
        positions = [
            [0.0, 0.0, 0.0],
            [0.15, 0.0, 0.0],
            [0.3, 0.0, 0.0],
            [0.45, 0.0, 0.0],
        ]
        bonds = [[0, 1], [1, 2], [2, 3]]
        coulomb14-scale = 0.5

        [force]
        method = "cutoff-periodic"
        cutoff = 1.0

        [[force.particles]]
        charge = 0.2
        sigma = 0.3
        epsilon = 0.4

        [[force.particles]]
        charge = -0.2
        sigma = 0.3
        epsilon = 0.4

        [[force.particles]]
        charge = 0.2
        sigma = 0.3
        epsilon = 0.4

        [[force.particles]]
        charge = -0.2
        sigma = 0.3
        epsilon = 0.4
    "#;

    #[test]
    fn load_reads_positions_box_and_force() {
        let (_dir, path) = write_file(CHAIN);
        let system = SystemFile::load(&path).unwrap();

        assert_eq!(system.box_vector(), Vector3::new(3.0, 3.0, 3.0));
        assert_eq!(system.positions()[3], Point3::new(0.45, 0.0, 0.0));
        assert_eq!(system.force.method, NonbondedMethod::CutoffPeriodic);
        assert_eq!(system.coulomb14_scale, 0.5);
        assert_eq!(system.lj14_scale, 0.5);
    }

    #[test]
    fn force_config_appends_bond_exceptions() {
        let (_dir, path) = write_file(CHAIN);
        let system = SystemFile::load(&path).unwrap();
        let config = system.force_config().unwrap();

        // Three 1-2, two 1-3 and one 1-4 pair.
        assert_eq!(config.num_exceptions(), 6);
        let one_four = config
            .exceptions
            .iter()
            .find(|e| (e.particle1, e.particle2) == (0, 3))
            .unwrap();
        assert!((one_four.charge_prod - 0.5 * 0.2 * -0.2).abs() < 1e-12);
        assert!((one_four.epsilon - 0.5 * 0.4).abs() < 1e-12);
        assert!(system.force.exceptions.is_empty());
    }

    #[test]
    fn load_rejects_position_count_mismatch() {
        let content = CHAIN.replace("[0.45, 0.0, 0.0],", "");
        let (_dir, path) = write_file(&content);
        assert!(matches!(
            SystemFile::load(&path),
            Err(SystemFileError::ParticleCountMismatch {
                positions: 3,
                particles: 4
            })
        ));
    }

    #[test]
    fn load_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let result = SystemFile::load(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(SystemFileError::Io { .. })));
    }

    #[test]
    fn load_fails_for_unknown_field() {
        let content = format!("temperature = 300.0\n{CHAIN}");
        let (_dir, path) = write_file(&content);
        let result = SystemFile::load(&path);
        assert!(matches!(result, Err(SystemFileError::Toml { .. })));
    }
}
