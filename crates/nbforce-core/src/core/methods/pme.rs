const MIN_GRID_SIZE: usize = 6;

/// PME grid points along one box edge of `width` for a target relative error.
pub fn pme_grid_size(width: f64, alpha: f64, tolerance: f64) -> usize {
    let minimum = (2.0 * alpha * width / (3.0 * tolerance.powf(0.2))).ceil() as usize;
    find_fft_dimension(minimum.max(MIN_GRID_SIZE))
}

/// Smallest size `>= minimum` whose prime factors are all 2, 3, 5 or 7.
pub fn find_fft_dimension(minimum: usize) -> usize {
    let mut size = minimum.max(1);
    loop {
        let mut unfactored = size;
        for factor in [2, 3, 5, 7] {
            while unfactored % factor == 0 {
                unfactored /= factor;
            }
        }
        if unfactored == 1 {
            return size;
        }
        size += 1;
    }
}
