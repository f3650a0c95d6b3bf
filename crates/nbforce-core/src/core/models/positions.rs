use crate::core::utils::periodic::wrap_coordinate;
use nalgebra::{Point3, Vector3, Vector4};

/// Reduced-precision `(x, y, z, q)` working copy of the host's particle state.
///
/// This is rebuilt from the authoritative `f64` positions at the start of every
/// evaluation and discarded at its end. Keeping it as a separate type makes every
/// narrowing conversion explicit.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingPositions {
    posq: Vec<Vector4<f32>>,
}

impl WorkingPositions {
    /// Narrows host positions to `f32`, wrapping each axis into `[-L/2, L/2)` when a
    /// periodic box is given.
    pub fn from_host(
        positions: &[Point3<f64>],
        charges: impl IntoIterator<Item = f64>,
        periodic_box: Option<&Vector3<f64>>,
    ) -> Self {
        let posq = positions
            .iter()
            .zip(charges)
            .map(|(p, q)| {
                let (x, y, z) = match periodic_box {
                    Some(b) => (
                        wrap_coordinate(p.x, b.x),
                        wrap_coordinate(p.y, b.y),
                        wrap_coordinate(p.z, b.z),
                    ),
                    None => (p.x, p.y, p.z),
                };
                Vector4::new(x as f32, y as f32, z as f32, q as f32)
            })
            .collect();
        Self { posq }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.posq.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.posq.is_empty()
    }

    #[inline]
    pub fn position(&self, i: usize) -> Vector3<f32> {
        self.posq[i].xyz()
    }

    #[inline]
    pub fn charge(&self, i: usize) -> f32 {
        self.posq[i].w
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vector4<f32>> {
        self.posq.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_host_narrows_without_wrapping_when_not_periodic() {
        let positions = [Point3::new(5.0, -3.0, 0.25)];
        let working = WorkingPositions::from_host(&positions, [0.5], None);
        assert_eq!(working.len(), 1);
        assert_eq!(working.position(0), Vector3::new(5.0f32, -3.0, 0.25));
        assert_eq!(working.charge(0), 0.5);
    }

    #[test]
    fn from_host_wraps_into_the_central_box() {
        let positions = [Point3::new(5.0, -3.0, 0.25)];
        let b = Vector3::new(4.0, 4.0, 4.0);
        let working = WorkingPositions::from_host(&positions, [-1.0], Some(&b));
        let p = working.position(0);
        assert!((p.x - 1.0).abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
        assert!((p.z - 0.25).abs() < 1e-6);
        assert_eq!(working.charge(0), -1.0);
    }
}
