//! # Core Module
//!
//! Stateless building blocks of the nonbonded engine: parameter handling, pair
//! potentials, method parameter derivation, neighbor search and the reciprocal-space
//! solvers. Nothing here owns simulation state between evaluations; that is the job
//! of the [`engine`](crate::engine) layer.
//!
//! ## Architecture
//!
//! - **Parameters and Potentials** ([`forcefield`]) - Configuration, validated tables, pair terms
//! - **Working Data** ([`models`]) - Particle records, exclusions, reduced-precision positions
//! - **Method Derivation** ([`methods`]) - Ewald splitting, k-space bounds, dispersion tail
//! - **Neighbor Search** ([`spatial`]) - Voxel-hash pair finding under periodic wrap
//! - **Long-Range Electrostatics** ([`reciprocal`]) - Ewald sum and smooth PME
//! - **File I/O** ([`io`]) - TOML system descriptions
//! - **Utilities** ([`utils`]) - Periodic-boundary helpers
//!
//! ## Numeric Policy
//!
//! Host positions arrive as `f64`. Per-pair work is done in `f32` on
//! [`WorkingPositions`](models::positions::WorkingPositions); energies are accumulated
//! in `f64`. The reciprocal solvers work entirely in `f64`.

pub mod forcefield;
pub mod io;
pub mod methods;
pub mod models;
pub mod reciprocal;
pub mod spatial;
pub mod utils;
