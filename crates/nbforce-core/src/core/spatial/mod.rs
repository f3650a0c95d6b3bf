//! Spatial queries over working positions.
//!
//! [`neighbor_list`] builds the per-evaluation list of interacting pairs with a voxel
//! hash whose cells are at least one cutoff wide.

pub mod neighbor_list;
