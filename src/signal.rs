//! Zero-phase Butterworth low-pass filtering for multi-channel sample
//! batches.
//!
//! The filter is designed as a cascade of second-order sections and applied
//! once forward and once backward over the whole signal, so the net phase
//! shift is zero. This is inherently a batch operation: the full channel
//! buffer must be in memory before any output sample exists.

use ndarray::{Array2, ArrayView2};

use crate::error::{Result, TrajectoryError};

/// One direct-form-II-transposed second-order section. A first-order
/// section is represented with `b2 = a2 = 0`.
#[derive(Clone, Copy, Debug)]
struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl Biquad {
    /// Section for a conjugate Butterworth pole pair, bilinear-transformed.
    /// `c` is the pre-warped cutoff `tan(pi * normalized / 2)` and `q` the
    /// pair's damping term `2 * sin(theta)`.
    fn pole_pair(c: f64, q: f64) -> Self {
        let d = c * c + q * c + 1.0;
        Self {
            b0: c * c / d,
            b1: 2.0 * c * c / d,
            b2: c * c / d,
            a1: 2.0 * (c * c - 1.0) / d,
            a2: (c * c - q * c + 1.0) / d,
        }
    }

    /// First-order section for the single real pole of odd-order designs.
    fn real_pole(c: f64) -> Self {
        let d = c + 1.0;
        Self {
            b0: c / d,
            b1: c / d,
            b2: 0.0,
            a1: (c - 1.0) / d,
            a2: 0.0,
        }
    }

    /// Internal state for a steady-state input `x0` (unity DC gain), so a
    /// constant signal passes without an edge transient.
    fn steady_state(&self, x0: f64) -> (f64, f64) {
        (x0 * (1.0 - self.b0), x0 * (self.b2 - self.a2))
    }

    fn run(&self, x: f64, z: &mut (f64, f64)) -> f64 {
        let y = self.b0 * x + z.0;
        z.0 = self.b1 * x + z.1 - self.a1 * y;
        z.1 = self.b2 * x - self.a2 * y;
        y
    }
}

/// Design an order-`order` Butterworth low-pass as second-order sections.
///
/// Fails with [`TrajectoryError::InvalidFilterDesign`] when the normalized
/// cutoff `cutoff / (0.5 * sample_rate)` is not strictly between 0 and 1,
/// which covers a zero or negative sample rate and a cutoff at or above
/// Nyquist.
fn butter_lowpass(order: usize, cutoff: f64, sample_rate: f64) -> Result<Vec<Biquad>> {
    let normalized = cutoff / (0.5 * sample_rate);
    if !(normalized > 0.0 && normalized < 1.0) || order == 0 {
        return Err(TrajectoryError::InvalidFilterDesign { normalized });
    }

    // Pre-warp so the digital cutoff lands at the requested frequency.
    let c = (std::f64::consts::PI * normalized / 2.0).tan();

    let mut sections = Vec::with_capacity(order / 2 + 1);
    for k in 0..order / 2 {
        let theta = std::f64::consts::PI * (2 * k + 1) as f64 / (2 * order) as f64;
        sections.push(Biquad::pole_pair(c, 2.0 * theta.sin()));
    }
    if order % 2 == 1 {
        sections.push(Biquad::real_pole(c));
    }
    Ok(sections)
}

/// One pass of the cascade over a single channel, in place. The state of
/// every section is seeded for a steady input equal to the first sample
/// visited, which suppresses the start-up transient.
fn run_cascade(sections: &[Biquad], channel: &mut [f64], reverse: bool) {
    if channel.is_empty() {
        return;
    }
    let seed = if reverse {
        channel[channel.len() - 1]
    } else {
        channel[0]
    };
    let mut states: Vec<(f64, f64)> = sections.iter().map(|s| s.steady_state(seed)).collect();

    let mut step = |x: f64| -> f64 {
        let mut value = x;
        for (section, state) in sections.iter().zip(states.iter_mut()) {
            value = section.run(value, state);
        }
        value
    };

    if reverse {
        for i in (0..channel.len()).rev() {
            channel[i] = step(channel[i]);
        }
    } else {
        for value in channel.iter_mut() {
            *value = step(*value);
        }
    }
}

/// Zero-phase low-pass filter a multi-channel signal (N samples × C
/// channels) along the time axis, independently per channel.
///
/// The caller's data is never touched; a filtered copy of identical shape
/// is returned. The design is validated before any sample is read, so an
/// invalid cutoff fails fast.
pub fn lowpass_filtfilt(
    signal: ArrayView2<'_, f64>,
    cutoff: f64,
    sample_rate: f64,
    order: usize,
) -> Result<Array2<f64>> {
    let sections = butter_lowpass(order, cutoff, sample_rate)?;
    if signal.nrows() == 0 {
        return Err(TrajectoryError::EmptyInput);
    }

    let mut filtered = signal.to_owned();
    for mut column in filtered.columns_mut() {
        // Columns of a row-major array are not contiguous, so work on a
        // scratch buffer per channel.
        let mut buffer: Vec<f64> = column.iter().copied().collect();
        run_cascade(&sections, &mut buffer, false);
        run_cascade(&sections, &mut buffer, true);
        for (slot, value) in column.iter_mut().zip(buffer.iter()) {
            *slot = *value;
        }
    }
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn constant_signal(value: f64, n: usize, channels: usize) -> Array2<f64> {
        Array2::from_elem((n, channels), value)
    }

    #[test]
    fn dc_signal_passes_unchanged() {
        let signal = constant_signal(3.25, 64, 3);
        let filtered = lowpass_filtfilt(signal.view(), 0.1, 10.0, 5).unwrap();
        for value in filtered.iter() {
            assert!((value - 3.25).abs() < 1e-9, "got {value}");
        }
    }

    #[test]
    fn output_shape_matches_and_input_untouched() {
        let mut signal = constant_signal(1.0, 32, 2);
        signal[[10, 0]] = 5.0;
        let copy = signal.clone();
        let filtered = lowpass_filtfilt(signal.view(), 0.5, 10.0, 5).unwrap();
        assert_eq!(filtered.dim(), (32, 2));
        assert_eq!(signal, copy);
    }

    #[test]
    fn nyquist_alternation_is_attenuated() {
        let mut signal = Array2::zeros((512, 1));
        for i in 0..512 {
            signal[[i, 0]] = if i % 2 == 0 { 1.0 } else { -1.0 };
        }
        let filtered = lowpass_filtfilt(signal.view(), 0.5, 10.0, 5).unwrap();
        // The alternating component sits exactly at Nyquist, where the
        // design places all its zeros; away from the edge transients it
        // must vanish.
        for i in 200..312 {
            assert!(filtered[[i, 0]].abs() < 1e-3, "sample {i}: {}", filtered[[i, 0]]);
        }
    }

    #[test]
    fn valid_normalized_cutoff_accepted() {
        // normalized = 0.1 / 5 = 0.02
        assert!(lowpass_filtfilt(constant_signal(0.0, 16, 1).view(), 0.1, 10.0, 5).is_ok());
    }

    #[test]
    fn cutoff_above_nyquist_rejected() {
        // normalized = 6 / 5 = 1.2
        let err = lowpass_filtfilt(constant_signal(0.0, 16, 1).view(), 6.0, 10.0, 5).unwrap_err();
        assert!(matches!(err, TrajectoryError::InvalidFilterDesign { .. }));
    }

    #[test]
    fn degenerate_rates_rejected() {
        let signal = constant_signal(0.0, 16, 1);
        for (cutoff, fs) in [(0.1, 0.0), (0.1, -10.0), (0.0, 10.0), (5.0, 10.0), (-1.0, 10.0)] {
            let err = lowpass_filtfilt(signal.view(), cutoff, fs, 5).unwrap_err();
            assert!(
                matches!(err, TrajectoryError::InvalidFilterDesign { .. }),
                "cutoff={cutoff} fs={fs}"
            );
        }
    }

    #[test]
    fn second_order_matches_reference_coefficients() {
        // Known coefficients for a 2nd-order design: the damping term is
        // sqrt(2) and the section reduces to the textbook biquad.
        let sections = butter_lowpass(2, 1.0, 8.0).unwrap();
        assert_eq!(sections.len(), 1);
        let s = sections[0];
        let c = (std::f64::consts::PI * 0.25 / 2.0).tan();
        let d = c * c + std::f64::consts::SQRT_2 * c + 1.0;
        assert!((s.b0 - c * c / d).abs() < 1e-12);
        assert!((s.a2 - (c * c - std::f64::consts::SQRT_2 * c + 1.0) / d).abs() < 1e-12);
        // Unity DC gain per section.
        assert!(((s.b0 + s.b1 + s.b2) / (1.0 + s.a1 + s.a2) - 1.0).abs() < 1e-12);
    }
}
