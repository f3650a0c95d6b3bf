use super::params::{ExceptionParams, NonbondedForceConfig, ParticleParams};
use crate::core::models::particle::{ExclusionSet, ParticleRecord, ScaledPair};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("{0}")]
    ConfigurationMismatch(String),
    #[error("{0}")]
    TopologyChanged(String),
}

/// Per-particle parameters, exclusions and scaled 1-4 pairs for one force.
///
/// Built once from configuration. [`ParameterTable::update`] replaces the numeric
/// parameters in bulk but never touches the exclusion topology.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterTable {
    particles: Vec<ParticleRecord>,
    exclusions: ExclusionSet,
    excluded_pairs: Vec<(usize, usize)>,
    scaled_pairs: Vec<ScaledPair>,
    /// For each configured exception, its particle pair and whether it is a scaled pair.
    exception_layout: Vec<(usize, usize, bool)>,
}

impl ParameterTable {
    pub fn build(config: &NonbondedForceConfig) -> Result<Self, TableError> {
        let n = config.num_particles();
        if n == 0 {
            return Err(TableError::ConfigurationMismatch(
                "the force defines no particles".to_string(),
            ));
        }

        for (i, p) in config.particles.iter().enumerate() {
            validate_particle(i, p)?;
        }

        let mut exclusions = ExclusionSet::new(n);
        let mut scaled_pairs = Vec::new();
        let mut exception_layout = Vec::with_capacity(config.num_exceptions());
        for (k, e) in config.exceptions.iter().enumerate() {
            validate_exception(k, e, n)?;
            if !exclusions.insert(e.particle1, e.particle2) {
                return Err(TableError::ConfigurationMismatch(format!(
                    "exception {k} duplicates the pair ({}, {})",
                    e.particle1, e.particle2
                )));
            }
            let scaled = e.is_scaled();
            if scaled {
                scaled_pairs.push(scaled_pair(e));
            }
            exception_layout.push((e.particle1, e.particle2, scaled));
        }

        let excluded_pairs = exclusions.unique_pairs();
        Ok(Self {
            particles: records(&config.particles),
            exclusions,
            excluded_pairs,
            scaled_pairs,
            exception_layout,
        })
    }

    /// Overwrites particle and scaled-pair parameters in place.
    ///
    /// The particle count, the exception count, every exception's particle pair and the
    /// set of exceptions that carry an interaction must all match the table as built.
    /// On error the table is left unchanged.
    pub fn update(&mut self, config: &NonbondedForceConfig) -> Result<(), TableError> {
        if config.num_particles() != self.particles.len() {
            return Err(TableError::TopologyChanged(format!(
                "the number of particles has changed from {} to {}",
                self.particles.len(),
                config.num_particles()
            )));
        }
        if config.num_exceptions() != self.exception_layout.len() {
            return Err(TableError::TopologyChanged(format!(
                "the number of exceptions has changed from {} to {}",
                self.exception_layout.len(),
                config.num_exceptions()
            )));
        }
        for (i, p) in config.particles.iter().enumerate() {
            validate_particle(i, p)?;
        }

        let n = self.particles.len();
        let mut scaled_pairs = Vec::with_capacity(self.scaled_pairs.len());
        for (k, (e, &(p1, p2, was_scaled))) in config
            .exceptions
            .iter()
            .zip(&self.exception_layout)
            .enumerate()
        {
            validate_exception(k, e, n)?;
            if (e.particle1, e.particle2) != (p1, p2) && (e.particle2, e.particle1) != (p1, p2) {
                return Err(TableError::TopologyChanged(format!(
                    "exception {k} now pairs ({}, {}) instead of ({p1}, {p2})",
                    e.particle1, e.particle2
                )));
            }
            if e.is_scaled() != was_scaled {
                return Err(TableError::TopologyChanged(
                    "the number of non-excluded exceptions has changed".to_string(),
                ));
            }
            if was_scaled {
                scaled_pairs.push(scaled_pair(e));
            }
        }

        self.particles = records(&config.particles);
        self.scaled_pairs = scaled_pairs;
        Ok(())
    }

    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    pub fn particles(&self) -> &[ParticleRecord] {
        &self.particles
    }

    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    /// Every excluded pair once, `(i, j)` with `i < j`. Scaled pairs are included.
    pub fn excluded_pairs(&self) -> &[(usize, usize)] {
        &self.excluded_pairs
    }

    pub fn scaled_pairs(&self) -> &[ScaledPair] {
        &self.scaled_pairs
    }

    pub fn charges(&self) -> impl Iterator<Item = f64> + '_ {
        self.particles.iter().map(|p| p.charge)
    }
}

fn records(params: &[ParticleParams]) -> Vec<ParticleRecord> {
    params
        .iter()
        .enumerate()
        .map(|(index, p)| ParticleRecord {
            index,
            charge: p.charge,
            sigma: p.sigma,
            epsilon: p.epsilon,
        })
        .collect()
}

fn scaled_pair(e: &ExceptionParams) -> ScaledPair {
    ScaledPair {
        particle1: e.particle1,
        particle2: e.particle2,
        charge_prod: e.charge_prod,
        sigma: e.sigma,
        epsilon: e.epsilon,
    }
}

fn validate_particle(i: usize, p: &ParticleParams) -> Result<(), TableError> {
    if !(p.charge.is_finite() && p.sigma.is_finite() && p.epsilon.is_finite()) {
        return Err(TableError::ConfigurationMismatch(format!(
            "particle {i} has non-finite parameters"
        )));
    }
    if p.sigma < 0.0 || p.epsilon < 0.0 {
        return Err(TableError::ConfigurationMismatch(format!(
            "particle {i} has a negative sigma or epsilon"
        )));
    }
    Ok(())
}

fn validate_exception(k: usize, e: &ExceptionParams, n: usize) -> Result<(), TableError> {
    if e.particle1 >= n || e.particle2 >= n {
        return Err(TableError::ConfigurationMismatch(format!(
            "exception {k} references particle ({}, {}) but only {n} particles exist",
            e.particle1, e.particle2
        )));
    }
    if e.particle1 == e.particle2 {
        return Err(TableError::ConfigurationMismatch(format!(
            "exception {k} pairs particle {} with itself",
            e.particle1
        )));
    }
    if !(e.charge_prod.is_finite() && e.sigma.is_finite() && e.epsilon.is_finite()) {
        return Err(TableError::ConfigurationMismatch(format!(
            "exception {k} has non-finite parameters"
        )));
    }
    if e.epsilon < 0.0 {
        return Err(TableError::ConfigurationMismatch(format!(
            "exception {k} has a negative epsilon"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::params::NonbondedMethod;

    fn three_particle_config() -> NonbondedForceConfig {
        let mut config = NonbondedForceConfig::new(NonbondedMethod::NoCutoff);
        config.add_particle(0.5, 0.3, 0.4);
        config.add_particle(-0.5, 0.3, 0.4);
        config.add_particle(0.0, 0.2, 0.1);
        config.add_exception(0, 1, 0.0, 1.0, 0.0);
        config.add_exception(1, 2, -0.1, 0.25, 0.2);
        config
    }

    #[test]
    fn build_partitions_exceptions_into_exclusions_and_scaled_pairs() {
        let table = ParameterTable::build(&three_particle_config()).unwrap();
        assert_eq!(table.num_particles(), 3);
        assert!(table.exclusions().contains(0, 1));
        assert!(table.exclusions().contains(2, 1));
        assert!(!table.exclusions().contains(0, 2));
        assert_eq!(table.excluded_pairs(), &[(0, 1), (1, 2)]);
        assert_eq!(table.scaled_pairs().len(), 1);
        assert_eq!(table.scaled_pairs()[0].charge_prod, -0.1);
    }

    #[test]
    fn build_fails_with_no_particles() {
        let config = NonbondedForceConfig::new(NonbondedMethod::NoCutoff);
        assert!(matches!(
            ParameterTable::build(&config),
            Err(TableError::ConfigurationMismatch(_))
        ));
    }

    #[test]
    fn build_fails_for_out_of_range_exception() {
        let mut config = three_particle_config();
        config.add_exception(0, 3, 0.0, 1.0, 0.0);
        assert!(matches!(
            ParameterTable::build(&config),
            Err(TableError::ConfigurationMismatch(_))
        ));
    }

    #[test]
    fn build_fails_for_self_exception() {
        let mut config = three_particle_config();
        config.add_exception(2, 2, 0.0, 1.0, 0.0);
        assert!(matches!(
            ParameterTable::build(&config),
            Err(TableError::ConfigurationMismatch(_))
        ));
    }

    #[test]
    fn build_fails_for_duplicate_exception_in_reverse_order() {
        let mut config = three_particle_config();
        config.add_exception(1, 0, 0.0, 1.0, 0.0);
        assert!(matches!(
            ParameterTable::build(&config),
            Err(TableError::ConfigurationMismatch(_))
        ));
    }

    #[test]
    fn build_fails_for_non_finite_charge() {
        let mut config = three_particle_config();
        config.particles[0].charge = f64::NAN;
        assert!(matches!(
            ParameterTable::build(&config),
            Err(TableError::ConfigurationMismatch(_))
        ));
    }

    #[test]
    fn update_overwrites_parameters_in_place() {
        let mut table = ParameterTable::build(&three_particle_config()).unwrap();
        let mut updated = three_particle_config();
        updated.particles[2].charge = 0.75;
        updated.exceptions[1].epsilon = 0.9;

        table.update(&updated).unwrap();
        assert_eq!(table.particles()[2].charge, 0.75);
        assert_eq!(table.scaled_pairs()[0].epsilon, 0.9);
        assert!(table.exclusions().contains(0, 1));
    }

    #[test]
    fn update_rejects_changed_particle_count() {
        let mut table = ParameterTable::build(&three_particle_config()).unwrap();
        let mut updated = three_particle_config();
        updated.add_particle(0.0, 0.1, 0.1);
        let result = table.update(&updated);
        assert!(matches!(result, Err(TableError::TopologyChanged(_))));
    }

    #[test]
    fn update_rejects_changed_exception_count() {
        let mut table = ParameterTable::build(&three_particle_config()).unwrap();
        let mut updated = three_particle_config();
        updated.exceptions.pop();
        let result = table.update(&updated);
        assert!(matches!(result, Err(TableError::TopologyChanged(_))));
    }

    #[test]
    fn update_rejects_exception_that_becomes_scaled() {
        let mut table = ParameterTable::build(&three_particle_config()).unwrap();
        let mut updated = three_particle_config();
        updated.exceptions[0].charge_prod = 0.2;
        let before = table.clone();
        let result = table.update(&updated);
        assert!(matches!(result, Err(TableError::TopologyChanged(_))));
        assert_eq!(table, before);
    }

    #[test]
    fn update_rejects_exception_moved_to_another_pair() {
        let mut table = ParameterTable::build(&three_particle_config()).unwrap();
        let mut updated = three_particle_config();
        updated.exceptions[0].particle2 = 2;
        let result = table.update(&updated);
        assert!(matches!(result, Err(TableError::TopologyChanged(_))));
    }

    #[test]
    fn update_with_identical_values_is_a_no_op() {
        let config = three_particle_config();
        let mut table = ParameterTable::build(&config).unwrap();
        let before = table.clone();
        table.update(&config).unwrap();
        assert_eq!(table, before);
    }
}
