//! Provides file input for nonbonded systems.
//!
//! A system file is a TOML document bundling particle positions, the periodic box
//! and the `[force]` configuration, optionally with a bond list from which the
//! exclusions and scaled 1-4 exceptions are generated.

pub mod system_file;
