//! # nbforce
//!
//! A CPU evaluator for pairwise nonbonded interactions in particle simulations:
//! Lennard-Jones and electrostatics with cutoffs, reaction fields, periodic
//! boundaries, Ewald summation or smooth particle-mesh Ewald, scaled 1-4 exceptions
//! and a long-range dispersion correction.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless parameter tables, pair potentials, method
//!   parameter derivation, neighbor search and reciprocal-space solvers.
//!
//! - **[`engine`]: The Logic Core.** [`NonbondedKernel`](engine::kernel::NonbondedKernel)
//!   owns the validated parameters and derived method state, and evaluates a host's
//!   [`SimulationContext`](engine::context::SimulationContext) once per step.
//!
//! - **[`workflows`]: The Public API.** One-shot evaluation of a system described in a
//!   TOML file.
//!
//! ## Units
//!
//! Lengths in nm, energies in kJ/mol, charges in elementary charges.
//!
//! ## Features
//!
//! - `parallel` (default) - Data-parallel neighbor search, pair evaluation and Ewald
//!   sums with `rayon`. Results are identical with and without it.

pub mod core;
pub mod engine;
pub mod workflows;
