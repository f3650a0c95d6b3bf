use std::f64::consts::PI;

const KMAX_INITIAL_GUESS: i64 = 10;

/// Ewald splitting parameter for a real-space cutoff and a target relative error.
///
/// Chosen so that `erfc(α·rc) ≈ 2·tol`, which bounds the real-space truncation error.
pub fn ewald_alpha(cutoff: f64, tolerance: f64) -> f64 {
    (-(2.0 * tolerance).ln()).sqrt() / cutoff
}

/// Number of reciprocal vectors along one box edge needed to reach `tolerance`.
///
/// The result is always odd so the k-space grid is symmetric about the origin.
pub fn ewald_kmax(width: f64, alpha: f64, tolerance: f64) -> usize {
    let error = |k: i64| {
        let k = k as f64;
        let temp = k * PI / (width * alpha);
        tolerance - 0.05 * (width * alpha).sqrt() * k * (-temp * temp).exp()
    };
    let mut kmax = find_zero(error, KMAX_INITIAL_GUESS) as usize;
    if kmax % 2 == 0 {
        kmax += 1;
    }
    kmax
}

/// Finds the first integer at which a reciprocal-space error estimate drops below
/// its target, walking from `initial` in whichever direction the sign demands.
fn find_zero(f: impl Fn(i64) -> f64, initial: i64) -> i64 {
    let mut arg = initial;
    let mut value = f(arg);
    if value > 0.0 {
        while value > 0.0 && arg > 0 {
            arg -= 1;
            value = f(arg);
        }
        return arg + 1;
    }
    while value < 0.0 {
        arg += 1;
        value = f(arg);
    }
    arg
}
