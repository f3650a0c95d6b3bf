use crate::core::forcefield::table::TableError;
use crate::core::methods::DerivationError;
use crate::core::reciprocal::ReciprocalError;
use nalgebra::Vector3;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum KernelError {
    #[error("Configuration mismatch: {0}")]
    ConfigurationMismatch(String),

    #[error("Topology changed since initialization: {0}")]
    TopologyChanged(String),

    #[error(
        "Invalid box geometry: every edge of the periodic box {box_size:?} must be at least twice the cutoff ({cutoff})"
    )]
    InvalidBoxGeometry { box_size: Vector3<f64>, cutoff: f64 },

    #[error(
        "The periodic box {box_size:?} has decreased to less than twice the nonbonded cutoff ({cutoff})"
    )]
    PeriodicBoxTooSmall { box_size: Vector3<f64>, cutoff: f64 },

    #[error("Simulation context holds {found} particles, but the kernel expects {expected}")]
    ContextMismatch { expected: usize, found: usize },
}

impl From<TableError> for KernelError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::ConfigurationMismatch(msg) => Self::ConfigurationMismatch(msg),
            TableError::TopologyChanged(msg) => Self::TopologyChanged(msg),
        }
    }
}

impl From<DerivationError> for KernelError {
    fn from(err: DerivationError) -> Self {
        match err {
            DerivationError::ConfigurationMismatch(msg) => Self::ConfigurationMismatch(msg),
            DerivationError::InvalidBoxGeometry { box_size, cutoff } => {
                Self::InvalidBoxGeometry { box_size, cutoff }
            }
        }
    }
}

impl From<ReciprocalError> for KernelError {
    fn from(err: ReciprocalError) -> Self {
        match err {
            ReciprocalError::ForceBufferMismatch { expected, found } => {
                Self::ContextMismatch { expected, found }
            }
            other => Self::ConfigurationMismatch(other.to_string()),
        }
    }
}
