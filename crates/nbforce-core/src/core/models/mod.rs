//! # Core Models Module
//!
//! Plain data carried between the stages of a nonbonded evaluation.
//!
//! - [`particle`] - Per-particle parameters, scaled 1-4 pairs and the symmetric exclusion set
//! - [`positions`] - The reduced-precision working copy of particle positions and charges
//!
//! The authoritative double-precision state stays with the host; only
//! [`positions::WorkingPositions`] is narrowed to `f32`.

pub mod particle;
pub mod positions;
