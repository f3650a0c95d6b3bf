//! # Workflows Module
//!
//! High-level entry points that tie [`core`](crate::core) and [`engine`](crate::engine)
//! together for one-shot use, without a host simulation loop.
//!
//! - **Evaluation Workflow** ([`evaluate`]) - Load a system description, build a kernel,
//!   and compute the energy breakdown and forces for a single configuration.

pub mod evaluate;
