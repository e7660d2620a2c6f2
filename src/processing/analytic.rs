//! Analytic-signal computation using rustfft
//!
//! Converts one real-valued, evenly-sampled series into its analytic signal
//! `z[t] = x[t] + i*H(x)[t]` via the frequency-domain Hilbert construction,
//! then derives the amplitude envelope `|z|` and the instantaneous frequency
//! from the unwrapped phase.
//!
//! # Example
//!
//! ```ignore
//! use motorguard::processing::analytic_signal;
//!
//! let samples: Vec<f64> = read_phase_current();
//! let result = analytic_signal(&samples)?;
//! let peak_envelope = result.envelope.iter().cloned().fold(0.0, f64::max);
//! ```

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::sync::Arc;

use super::ProcessingError;

/// Envelope and instantaneous-frequency traces derived from one real series.
///
/// Both traces have exactly the length of the input signal; no resampling
/// or truncation occurs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticSignalResult {
    /// Analytic-signal magnitude per sample. Non-negative by construction.
    pub envelope: Vec<f64>,
    /// Derivative of the unwrapped analytic phase, in cycles per sample.
    pub instantaneous_frequency: Vec<f64>,
}

/// Compute the analytic-signal envelope and instantaneous frequency of a
/// real-valued series.
///
/// This is the primary entry point for one-off transforms. When computing
/// many transforms of the same length, use [`AnalyticSignalTransform`] to
/// reuse the FFT plans.
///
/// # Errors
///
/// - [`ProcessingError::InsufficientSamples`] if the series has fewer than
///   2 samples (instantaneous frequency is undefined below that).
/// - [`ProcessingError::NonFiniteSample`] if any sample is NaN or infinite.
pub fn analytic_signal(signal: &[f64]) -> Result<AnalyticSignalResult, ProcessingError> {
    let transform = AnalyticSignalTransform::new(signal.len())?;
    transform.transform(signal)
}

/// Analytic-signal transform with pre-planned FFTs for repeated computation.
///
/// Pure function of its input; holds no state between calls beyond the
/// cached FFT plans.
pub struct AnalyticSignalTransform {
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    size: usize,
}

impl AnalyticSignalTransform {
    /// Minimum series length for which the transform is defined.
    pub const MIN_SAMPLES: usize = 2;

    /// Create a transform for series of exactly `size` samples.
    ///
    /// Unlike a plain spectrum FFT there is no zero-padding to a power of
    /// two: padding would distort the envelope, and rustfft handles
    /// arbitrary lengths.
    pub fn new(size: usize) -> Result<Self, ProcessingError> {
        if size < Self::MIN_SAMPLES {
            return Err(ProcessingError::InsufficientSamples {
                needed: Self::MIN_SAMPLES,
                available: size,
            });
        }

        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);

        Ok(Self {
            forward,
            inverse,
            size,
        })
    }

    /// Compute the envelope and instantaneous frequency of `signal`.
    ///
    /// `signal` must have exactly the length this transform was planned for.
    pub fn transform(&self, signal: &[f64]) -> Result<AnalyticSignalResult, ProcessingError> {
        if signal.len() != self.size {
            return Err(ProcessingError::SizeMismatch {
                expected: self.size,
                actual: signal.len(),
            });
        }
        if let Some(index) = signal.iter().position(|v| !v.is_finite()) {
            return Err(ProcessingError::NonFiniteSample { index });
        }

        // Forward transform of the real signal
        let mut buffer: Vec<Complex<f64>> =
            signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
        self.forward.process(&mut buffer);

        // One-sided spectrum: double positive frequencies (excluding DC and,
        // for even lengths, Nyquist), zero the negative half.
        apply_analytic_weights(&mut buffer);

        // Back to the time domain; rustfft leaves the inverse unnormalized.
        self.inverse.process(&mut buffer);
        let scale = 1.0 / self.size as f64;

        let envelope: Vec<f64> = buffer.iter().map(|z| z.norm() * scale).collect();

        // Instantaneous frequency from the unwrapped phase. The uniform
        // 1/N scale does not affect arg().
        let wrapped: Vec<f64> = buffer.iter().map(|z| z.arg()).collect();
        let unwrapped = unwrap_phase(&wrapped);
        let instantaneous_frequency: Vec<f64> = gradient(&unwrapped)
            .into_iter()
            .map(|d| d / (2.0 * PI))
            .collect();

        Ok(AnalyticSignalResult {
            envelope,
            instantaneous_frequency,
        })
    }

    /// Series length this transform was planned for.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Weight a full spectrum so its inverse transform is the analytic signal.
///
/// DC stays at weight 1, positive frequencies are doubled, negative
/// frequencies are zeroed. For even lengths the Nyquist bin is shared
/// between the halves and stays at weight 1.
fn apply_analytic_weights(spectrum: &mut [Complex<f64>]) {
    let n = spectrum.len();
    let positive_end = if n % 2 == 0 { n / 2 } else { (n + 1) / 2 };

    for bin in spectrum.iter_mut().take(positive_end).skip(1) {
        *bin *= 2.0;
    }
    let negative_start = if n % 2 == 0 { n / 2 + 1 } else { positive_end };
    for bin in spectrum.iter_mut().skip(negative_start) {
        *bin = Complex::new(0.0, 0.0);
    }
}

/// Remove artificial 2π discontinuities from a principal-value phase
/// sequence so consecutive samples never differ by more than π.
fn unwrap_phase(wrapped: &[f64]) -> Vec<f64> {
    let mut unwrapped = Vec::with_capacity(wrapped.len());
    let mut offset = 0.0;
    let mut prev = match wrapped.first() {
        Some(&p) => p,
        None => return unwrapped,
    };
    unwrapped.push(prev);

    for &curr in &wrapped[1..] {
        // arg() is confined to (-π, π], so one 2π correction always suffices
        let delta = curr - prev;
        if delta > PI {
            offset -= 2.0 * PI;
        } else if delta < -PI {
            offset += 2.0 * PI;
        }
        unwrapped.push(curr + offset);
        prev = curr;
    }

    unwrapped
}

/// Central-difference gradient with one-sided differences at the two
/// boundary samples. Requires `y.len() >= 2`.
fn gradient(y: &[f64]) -> Vec<f64> {
    let n = y.len();
    let mut g = Vec::with_capacity(n);

    g.push(y[1] - y[0]);
    for i in 1..n - 1 {
        g.push((y[i + 1] - y[i - 1]) / 2.0);
    }
    g.push(y[n - 1] - y[n - 2]);

    g
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Sinusoid with an integer number of cycles over `n` samples, so the
    /// spectrum is bin-exact and edge effects vanish.
    fn bin_exact_sinusoid(n: usize, cycles: usize, amplitude: f64) -> Vec<f64> {
        (0..n)
            .map(|t| amplitude * (2.0 * PI * cycles as f64 * t as f64 / n as f64).sin())
            .collect()
    }

    #[test]
    fn test_rejects_short_series() {
        let err = analytic_signal(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::InsufficientSamples {
                needed: 2,
                available: 1
            }
        ));
        assert!(analytic_signal(&[]).is_err());
    }

    #[test]
    fn test_rejects_non_finite_input() {
        let mut signal = bin_exact_sinusoid(64, 4, 1.0);
        signal[17] = f64::NAN;
        let err = analytic_signal(&signal).unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::NonFiniteSample { index: 17 }
        ));

        signal[17] = f64::INFINITY;
        assert!(analytic_signal(&signal).is_err());
    }

    #[test]
    fn test_rejects_size_mismatch() {
        let transform = AnalyticSignalTransform::new(64).unwrap();
        let err = transform.transform(&[0.0; 32]).unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::SizeMismatch {
                expected: 64,
                actual: 32
            }
        ));
    }

    #[test]
    fn test_length_preservation() {
        for n in [2, 3, 17, 100, 256] {
            let signal = bin_exact_sinusoid(n, 1, 1.0);
            let result = analytic_signal(&signal).unwrap();
            assert_eq!(result.envelope.len(), n);
            assert_eq!(result.instantaneous_frequency.len(), n);
        }
    }

    #[test]
    fn test_envelope_non_negative() {
        let signal: Vec<f64> = (0..200)
            .map(|t| (0.3 * t as f64).sin() + 0.4 * (0.07 * t as f64).cos() - 0.2)
            .collect();
        let result = analytic_signal(&signal).unwrap();
        assert!(result.envelope.iter().all(|&e| e >= 0.0));
    }

    #[test]
    fn test_pure_sinusoid_envelope_and_frequency() {
        let n = 256;
        let cycles = 16;
        let amplitude = 2.5;
        let signal = bin_exact_sinusoid(n, cycles, amplitude);

        let result = analytic_signal(&signal).unwrap();
        let expected_freq = cycles as f64 / n as f64;

        // Bin-exact input: envelope and frequency hold to tight tolerance
        // across the interior; boundaries get a looser bound.
        for t in 1..n - 1 {
            assert!(
                (result.envelope[t] - amplitude).abs() < 1e-6,
                "envelope[{}] = {}",
                t,
                result.envelope[t]
            );
            assert!(
                (result.instantaneous_frequency[t] - expected_freq).abs() < 1e-6,
                "freq[{}] = {}",
                t,
                result.instantaneous_frequency[t]
            );
        }
        assert!((result.envelope[0] - amplitude).abs() < 1e-3);
        assert!((result.envelope[n - 1] - amplitude).abs() < 1e-3);
    }

    #[test]
    fn test_odd_length_sinusoid() {
        // Odd lengths exercise the other branch of the spectrum weighting.
        let n = 255;
        let cycles = 15;
        let signal = bin_exact_sinusoid(n, cycles, 1.0);

        let result = analytic_signal(&signal).unwrap();
        let expected_freq = cycles as f64 / n as f64;

        for t in 1..n - 1 {
            assert!((result.envelope[t] - 1.0).abs() < 1e-6);
            assert!((result.instantaneous_frequency[t] - expected_freq).abs() < 1e-6);
        }
    }

    #[test]
    fn test_phase_wrapping_handled() {
        // High enough frequency that the raw phase wraps every few samples;
        // without unwrapping the gradient would show ±1-cycle jumps.
        let n = 256;
        let cycles = 77; // ~0.3 cycles/sample
        let signal = bin_exact_sinusoid(n, cycles, 1.0);

        let result = analytic_signal(&signal).unwrap();
        let expected_freq = cycles as f64 / n as f64;

        for t in 1..n - 1 {
            assert!(
                (result.instantaneous_frequency[t] - expected_freq).abs() < 1e-6,
                "freq[{}] = {} (expected {})",
                t,
                result.instantaneous_frequency[t],
                expected_freq
            );
        }
    }

    #[test]
    fn test_unwrap_phase_removes_jumps() {
        let wrapped = vec![3.0, -3.0, 3.0, -3.0];
        let unwrapped = unwrap_phase(&wrapped);
        for pair in unwrapped.windows(2) {
            assert!((pair[1] - pair[0]).abs() <= PI + 1e-12);
        }
        // Principal values are preserved modulo 2π
        for (w, u) in wrapped.iter().zip(unwrapped.iter()) {
            let k = ((u - w) / (2.0 * PI)).round();
            assert!((u - w - k * 2.0 * PI).abs() < 1e-12);
        }
    }

    #[test]
    fn test_gradient_of_line_is_constant() {
        let y: Vec<f64> = (0..10).map(|i| 3.0 * i as f64 + 1.0).collect();
        let g = gradient(&y);
        assert_eq!(g.len(), 10);
        for v in g {
            assert!((v - 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_gradient_boundary_differences() {
        let y = vec![0.0, 1.0, 4.0];
        let g = gradient(&y);
        assert!((g[0] - 1.0).abs() < 1e-12); // forward difference
        assert!((g[1] - 2.0).abs() < 1e-12); // central difference
        assert!((g[2] - 3.0).abs() < 1e-12); // backward difference
    }

    #[test]
    fn test_transform_reuse_matches_standalone() {
        let transform = AnalyticSignalTransform::new(128).unwrap();
        let a = bin_exact_sinusoid(128, 8, 1.0);
        let b = bin_exact_sinusoid(128, 20, 0.7);

        let ra = transform.transform(&a).unwrap();
        let rb = transform.transform(&b).unwrap();
        let sa = analytic_signal(&a).unwrap();
        let sb = analytic_signal(&b).unwrap();

        assert_eq!(ra.envelope, sa.envelope);
        assert_eq!(rb.envelope, sb.envelope);
        assert_eq!(
            ra.instantaneous_frequency,
            sa.instantaneous_frequency
        );
        assert_eq!(
            rb.instantaneous_frequency,
            sb.instantaneous_frequency
        );
    }
}
