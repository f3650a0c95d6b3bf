//! # Force Field Module
//!
//! Parameters and pair potentials for nonbonded interactions.
//!
//! ## Key Components
//!
//! - [`params`] - Host-facing configuration: method, cutoff, particles and exceptions
//! - [`table`] - Validated per-particle records, exclusions and scaled 1-4 pairs
//! - [`potentials`] - Lennard-Jones, Coulomb, reaction-field and Ewald pair terms
//! - [`term`] - Energy breakdown by interaction type
//!
//! ## Usage
//!
//! ```ignore
//! use nbforce::core::forcefield::params::{NonbondedForceConfig, NonbondedMethod};
//!
//! let mut config = NonbondedForceConfig::new(NonbondedMethod::Pme).with_cutoff(0.9);
//! config.add_particle(0.4, 0.32, 0.65);
//! config.add_particle(-0.4, 0.32, 0.65);
//! config.create_exceptions_from_bonds(&[(0, 1)], 0.8333, 0.5)?;
//! ```

pub mod params;
pub mod potentials;
pub mod table;
pub mod term;
