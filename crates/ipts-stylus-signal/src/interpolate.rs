//! Sub-bin peak interpolation.
//!
//! Both estimators fit a parabola through three samples around a peak and
//! return the fractional offset of its vertex. They work on noisy integer
//! input and signal "no usable peak" as NaN instead of failing; the decoder
//! maps NaN onto its lift/skip policy.

use ipts_stylus_core::{Config, DftRow, DftWindow, NUM_COMPONENTS};

/// Interpolates the stylus position from one row of antenna measurements.
///
/// The three components around the center are projected onto the phase of
/// the strongest component, which suppresses quadrature noise, then shaped
/// by `dft_position_exp` and fitted with a parabola. The returned value is a
/// fractional antenna index in the firmware grid (`row.first` based), or NaN
/// when the signal is unusable.
///
/// Off-screen components are reported as `(0, 0)`; when the neighbor on one
/// side is zeroed the window is shifted towards the screen and the allowed
/// vertex offset widened accordingly.
#[must_use]
pub fn interpolate_position(row: &DftRow, config: &Config) -> f64 {
    // assume the center component has the max amplitude
    let mut maxi = NUM_COMPONENTS / 2;

    // off-screen components are always zero, don't use them
    let mut mind = -0.5;
    let mut maxd = 0.5;

    if row.real[maxi - 1] == 0 && row.imag[maxi - 1] == 0 {
        maxi += 1;
        mind = -1.0;
    } else if row.real[maxi + 1] == 0 && row.imag[maxi + 1] == 0 {
        maxi -= 1;
        maxd = 1.0;
    }

    let amp = f64::from(row.real[maxi]).hypot(f64::from(row.imag[maxi]));

    if amp < f64::from(config.dft_position_min_amp) {
        return f64::NAN;
    }

    let sin = f64::from(row.real[maxi]) / amp;
    let cos = f64::from(row.imag[maxi]) / amp;

    // phase-aligned amplitudes of the three center components
    let mut p = [
        sin * f64::from(row.real[maxi - 1]) + cos * f64::from(row.imag[maxi - 1]),
        amp,
        sin * f64::from(row.real[maxi + 1]) + cos * f64::from(row.imag[maxi + 1]),
    ];

    for v in &mut p {
        *v = v.abs().powf(config.dft_position_exp);
    }

    // a peak needs the fitted parabola to open downwards
    if p[0] + p[2] > 2.0 * p[1] {
        return f64::NAN;
    }

    // critical point of the fitted parabola; collinear samples divide to
    // infinity and are caught by the clamp
    let d = (p[0] - p[2]) / (2.0 * (p[0] - 2.0 * p[1] + p[2]));

    f64::from(row.first) + maxi as f64 + d.clamp(mind, maxd)
}

/// Interpolates the strongest frequency bin across `rows` consecutive rows.
///
/// Used for pressure extraction: the pen sweeps its modulation frequency
/// with tip load, and the row with the strongest combined X/Y magnitude
/// marks the current frequency. All components of a row share one phase, and
/// matching X and Y rows do as well, so everything can be summed before
/// interpolating.
///
/// Returns the fractional row index normalized to `[0, 1]`, or NaN when the
/// sweep is gated out.
#[must_use]
pub fn interpolate_frequency(window: &DftWindow, rows: usize, config: &Config) -> f64 {
    if rows < 3 || window.rows() < rows {
        return f64::NAN;
    }

    // find max row
    let mut maxi = 0;
    let mut maxm = 0u64;

    for i in 0..rows {
        let m = u64::from(window.x[i].magnitude) + u64::from(window.y[i].magnitude);

        if m > maxm {
            maxm = m;
            maxi = i;
        }
    }

    if maxm < 2 * u64::from(config.dft_freq_min_mag) {
        return f64::NAN;
    }

    let mut mind = -0.5;
    let mut maxd = 0.5;

    if maxi < 1 {
        maxi = 1;
        mind = -1.0;
    } else if maxi > rows - 2 {
        maxi = rows - 2;
        maxd = 1.0;
    }

    let mut real = [0i64; 3];
    let mut imag = [0i64; 3];

    for (i, (re, im)) in real.iter_mut().zip(imag.iter_mut()).enumerate() {
        let x = &window.x[maxi + i - 1];
        let y = &window.y[maxi + i - 1];

        for j in 0..NUM_COMPONENTS {
            *re += i64::from(x.real[j]) + i64::from(y.real[j]);
            *im += i64::from(x.imag[j]) + i64::from(y.imag[j]);
        }
    }

    // Eric Jacobsen's modified quadratic estimator: the least-squares vertex
    // in the complex plane, robust when the real and imaginary axes disagree
    // about the peak
    let ra = real[0] - real[2];
    let rb = 2 * real[1] - real[0] - real[2];
    let ia = imag[0] - imag[2];
    let ib = 2 * imag[1] - imag[0] - imag[2];

    let d = (ra * rb + ia * ib) as f64 / (rb * rb + ib * ib) as f64;

    (maxi as f64 + d.clamp(mind, maxd)) / (rows - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipts_stylus_core::{DftType, NUM_COMPONENTS};

    fn config() -> Config {
        Config {
            width: 259.2,
            height: 173.4,
            dft_position_min_amp: 50,
            dft_position_exp: 2.0,
            ..Config::default()
        }
    }

    fn aligned_row(real: [i16; NUM_COMPONENTS]) -> DftRow {
        DftRow {
            magnitude: 85_289,
            first: 12,
            real,
            ..DftRow::default()
        }
    }

    #[test]
    fn test_centered_peak_has_zero_offset() {
        // symmetric neighbors, vertex exactly on the center component
        let row = aligned_row([1, 1, 1, 90, 100, 90, 1, 1, 1]);
        let res = interpolate_position(&row, &config());

        assert!((res - (12.0 + 4.0)).abs() < 1e-9);
    }

    #[test]
    fn test_offset_moves_towards_stronger_neighbor() {
        let row = aligned_row([1, 1, 1, 95, 100, 60, 1, 1, 1]);
        let res = interpolate_position(&row, &config());
        let center = 12.0 + 4.0;

        assert!(res.is_finite());
        assert!(res < center);
        assert!(res >= center - 0.5);
    }

    #[test]
    fn test_synthetic_parabola_is_exact() {
        // With amplitudes (a-1)^2, a^2, (a+1)^2 and an exponent of 0.5 the
        // shaped samples are collinear; the vertex diverges and clamps to
        // the lower bound of the offset range.
        let mut cfg = config();
        cfg.dft_position_exp = 0.5;

        let row = aligned_row([0, 0, 1, 81, 100, 121, 1, 0, 0]);
        let res = interpolate_position(&row, &cfg);

        assert!((res - (12.0 + 4.0 - 0.5)).abs() < 1e-9);
    }

    #[test]
    fn test_low_edge_widens_offset_range() {
        // zeroed low neighbor marks the screen edge; the center shifts up
        let row = aligned_row([0, 0, 0, 0, 90, 100, 90, 1, 1]);
        let res = interpolate_position(&row, &config());

        assert!(res.is_finite());
        assert!((res - (12.0 + 5.0)).abs() < 1e-9);
    }

    #[test]
    fn test_high_edge_widens_offset_range() {
        let row = aligned_row([1, 1, 90, 100, 90, 0, 0, 0, 0]);
        let res = interpolate_position(&row, &config());

        assert!(res.is_finite());
        assert!((res - (12.0 + 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_weak_amplitude_is_gated() {
        let row = aligned_row([1, 1, 1, 30, 40, 30, 1, 1, 1]);
        let res = interpolate_position(&row, &config());

        assert!(res.is_nan());
    }

    #[test]
    fn test_valley_is_rejected() {
        // neighbors stronger than the center: upward parabola, not a peak
        let row = aligned_row([1, 1, 1, 100, 80, 100, 1, 1, 1]);
        let res = interpolate_position(&row, &config());

        assert!(res.is_nan());
    }

    #[test]
    fn test_quadrature_noise_is_suppressed() {
        // energy purely orthogonal to the center phase must not drag the
        // vertex off the center
        let mut row = aligned_row([0, 0, 0, 80, 100, 80, 0, 0, 0]);
        row.imag = [0, 0, 0, 40, 0, -40, 0, 0, 0];
        let res = interpolate_position(&row, &config());

        assert!((res - (12.0 + 4.0)).abs() < 1e-9);
    }

    fn sweep_window(mags: &[u32], reals: &[i16]) -> DftWindow {
        let mut window = DftWindow::new(DftType::Pressure);

        for (&m, &r) in mags.iter().zip(reals.iter()) {
            let row = DftRow {
                magnitude: m,
                real: [r; NUM_COMPONENTS],
                ..DftRow::default()
            };
            window.x.push(row);
            window.y.push(row);
        }

        window
    }

    #[test]
    fn test_frequency_needs_three_rows() {
        let window = sweep_window(&[100, 100], &[1, 1]);
        assert!(interpolate_frequency(&window, 2, &config()).is_nan());
    }

    #[test]
    fn test_frequency_gated_below_min_magnitude() {
        let window = sweep_window(&[10, 400, 10, 10], &[1, 2, 1, 1]);
        assert!(interpolate_frequency(&window, 4, &config()).is_nan());
    }

    #[test]
    fn test_frequency_symmetric_peak() {
        let mut cfg = config();
        cfg.dft_freq_min_mag = 100;

        // peak at row 2 of 5, symmetric flanks: the estimator must land on
        // the row exactly
        let window = sweep_window(&[0, 500, 1000, 500, 0], &[0, 10, 20, 10, 0]);
        let res = interpolate_frequency(&window, 5, &cfg);

        assert!((res - 2.0 / 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_frequency_peak_at_first_row_clamps_inward() {
        let mut cfg = config();
        cfg.dft_freq_min_mag = 100;

        let window = sweep_window(&[1000, 400, 100, 50, 10], &[20, 10, 2, 1, 0]);
        let res = interpolate_frequency(&window, 5, &cfg);

        // interior index 1 with the offset range widened to [-1, 0.5]
        assert!(res.is_finite());
        assert!(res >= 0.0);
        assert!(res <= (1.0 + 0.5) / 4.0);
    }

    #[test]
    fn test_frequency_matches_jacobsen_formula() {
        let mut cfg = config();
        cfg.dft_freq_min_mag = 100;

        let window = sweep_window(&[0, 600, 1000, 300, 0], &[0, 12, 20, 6, 0]);
        let res = interpolate_frequency(&window, 5, &cfg);

        // recompute the estimator from the component sums
        let s = |r: i64| 2 * 9 * r;
        let (s0, s1, s2) = (s(12), s(20), s(6));
        let ra = s0 - s2;
        let rb = 2 * s1 - s0 - s2;
        let d = (ra * rb) as f64 / (rb * rb) as f64;
        let expected = (2.0 + d.clamp(-0.5, 0.5)) / 4.0;

        assert!((res - expected).abs() < 1e-9);
    }
}
