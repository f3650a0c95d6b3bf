use nalgebra::Vector3;

/// Wraps a coordinate into `[-L/2, L/2)` using `x - floor(x/L + 0.5) * L`.
#[inline]
pub fn wrap_coordinate(x: f64, length: f64) -> f64 {
    x - (x / length + 0.5).floor() * length
}

/// Applies the minimum-image convention to a displacement, component-wise.
///
/// `box_size` is `None` for non-periodic systems, in which case `delta` is returned unchanged.
#[inline]
pub fn minimum_image(delta: Vector3<f32>, box_size: Option<&Vector3<f32>>) -> Vector3<f32> {
    match box_size {
        Some(b) => Vector3::new(
            delta.x - (delta.x / b.x).round() * b.x,
            delta.y - (delta.y / b.y).round() * b.y,
            delta.z - (delta.z / b.z).round() * b.z,
        ),
        None => delta,
    }
}

/// Smallest edge of a rectangular box.
#[inline]
pub fn min_edge(box_size: &Vector3<f64>) -> f64 {
    box_size.x.min(box_size.y).min(box_size.z)
}

/// Whether the box is large enough for the minimum-image convention at this cutoff.
///
/// The comparison is against `1.999999 * cutoff` so a box of exactly twice the cutoff
/// survives round-off in the host's box bookkeeping.
#[inline]
pub fn box_fits_cutoff(box_size: &Vector3<f64>, cutoff: f64) -> bool {
    min_edge(box_size) >= 1.999999 * cutoff
}
