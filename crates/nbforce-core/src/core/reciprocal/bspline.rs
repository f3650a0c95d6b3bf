//! Cardinal B-splines used to spread charges onto, and interpolate forces from, the
//! PME mesh.

use std::f64::consts::PI;

pub const PME_ORDER: usize = 5;

/// B-spline weights and their derivatives at fractional offset `w` in `[0, 1)`.
///
/// `theta[k]` is the weight of grid point `base + k`, where `base` is the grid point
/// at or below the particle.
pub fn bspline_weights(w: f64) -> ([f64; PME_ORDER], [f64; PME_ORDER]) {
    let mut theta = [0.0; PME_ORDER];
    theta[PME_ORDER - 1] = 0.0;
    theta[1] = w;
    theta[0] = 1.0 - w;
    for k in 3..PME_ORDER {
        raise_order(&mut theta, k, w);
    }

    let mut dtheta = [0.0; PME_ORDER];
    dtheta[0] = -theta[0];
    for k in 1..PME_ORDER {
        dtheta[k] = theta[k - 1] - theta[k];
    }

    raise_order(&mut theta, PME_ORDER, w);
    (theta, dtheta)
}

/// One step of the Cox-de Boor recursion, from order `k - 1` to order `k`.
fn raise_order(theta: &mut [f64; PME_ORDER], k: usize, w: f64) {
    let div = 1.0 / (k as f64 - 1.0);
    theta[k - 1] = div * w * theta[k - 2];
    for l in 1..k - 1 {
        theta[k - l - 1] =
            div * ((w + l as f64) * theta[k - l - 2] + ((k - l) as f64 - w) * theta[k - l - 1]);
    }
    theta[0] *= div * (1.0 - w);
}

/// Squared moduli `|b(m)|²` of the B-spline structure factor along one grid axis.
///
/// Values that vanish numerically are replaced by the mean of their neighbors so the
/// reciprocal convolution never divides by zero.
pub fn bspline_moduli(size: usize) -> Vec<f64> {
    let (theta, _) = bspline_weights(0.0);
    let mut coefficients = vec![0.0; size];
    for (i, value) in theta.iter().enumerate() {
        if i + 1 < size {
            coefficients[i + 1] = *value;
        }
    }

    let mut moduli: Vec<f64> = (0..size)
        .map(|m| {
            let (mut sc, mut ss) = (0.0, 0.0);
            for (j, c) in coefficients.iter().enumerate() {
                let arg = 2.0 * PI * (m * j) as f64 / size as f64;
                sc += c * arg.cos();
                ss += c * arg.sin();
            }
            sc * sc + ss * ss
        })
        .collect();

    for m in 0..size {
        if moduli[m] < 1e-7 {
            let prev = moduli[(m + size - 1) % size];
            let next = moduli[(m + 1) % size];
            moduli[m] = 0.5 * (prev + next);
        }
    }
    moduli
}
