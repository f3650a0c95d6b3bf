//! # Engine Module
//!
//! The stateful layer that couples the stateless [`core`](crate::core) building blocks
//! to a host simulation loop.
//!
//! ## Architecture
//!
//! - **Kernel** ([`kernel`]) - [`NonbondedKernel`](kernel::NonbondedKernel): initialize once, execute every step
//! - **Host Coupling** ([`context`]) - The [`SimulationContext`](context::SimulationContext) trait and an in-memory state
//! - **Configuration** ([`config`]) - Per-call compute flags and the system topology
//! - **Error Handling** ([`error`]) - [`KernelError`](error::KernelError)
//!
//! ## Evaluation Flow
//!
//! Each call narrows the host's `f64` positions to `f32` working positions, wraps them
//! into the periodic box when the method is periodic, builds a neighbor list, evaluates
//! direct-space pairs, exclusion corrections, 1-4 exceptions and the reciprocal sum into
//! a private buffer, and adds that buffer into the host's forces only once every stage
//! has succeeded.

pub mod config;
pub mod context;
pub mod error;
pub(crate) mod evaluator;
pub mod kernel;
