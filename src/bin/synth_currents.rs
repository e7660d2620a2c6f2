//! Synthetic Three-Phase Current Recordings
//!
//! Generates per-motor waveform CSVs for exercising the motorguard
//! pipeline without plant data. Two scenarios:
//! - Stable motors: constant-frequency phase currents (expect Healthy)
//! - Faulty motors: per-sample frequency jitter on all phases
//!   (expect Unhealthy at the default threshold)
//!
//! # Usage
//! ```bash
//! ./synth-currents --output-dir data/motors --stable 4 --faulty 2
//! ./motorguard --data-dir data/motors --motor SM-01 --motor FM-01
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

// ============================================================================
// Waveform Constants
// ============================================================================

/// Nominal phase current amplitude (A)
const BASE_AMPLITUDE: f64 = 12.0;
/// Nominal supply frequency (cycles per sample)
const BASE_FREQUENCY: f64 = 0.1;
/// Half-width of the recorder's max/min window around the true signal (A)
const WINDOW_SPREAD: f64 = 0.5;
/// Electrical offset between consecutive phases (radians)
const PHASE_SHIFT: f64 = 2.0 * PI / 3.0;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "synth-currents")]
#[command(about = "Synthetic three-phase current recordings for motorguard testing")]
#[command(version)]
struct Args {
    /// Directory to write `<motor_id>.csv` recordings into
    #[arg(long, default_value = "data/motors")]
    output_dir: PathBuf,

    /// Number of stable motors to generate (SM-01, SM-02, ...)
    #[arg(long, default_value = "4")]
    stable: usize,

    /// Number of frequency-jittered motors to generate (FM-01, ...)
    #[arg(long, default_value = "2")]
    faulty: usize,

    /// Samples per recording
    #[arg(long, default_value = "2048", value_parser = clap::value_parser!(u32).range(2..))]
    samples: u32,

    /// Frequency jitter standard deviation for faulty motors
    /// (cycles per sample)
    #[arg(long, default_value = "0.05")]
    jitter_std: f64,

    /// RNG seed for reproducible recordings
    #[arg(long, default_value = "1")]
    seed: u64,
}

// ============================================================================
// Generation
// ============================================================================

/// One motor's three phase-current series (true signal, before the
/// recorder's max/min windowing).
struct MotorWaveforms {
    phases: [Vec<f64>; 3],
}

fn stable_motor(samples: usize) -> MotorWaveforms {
    let phases = [0, 1, 2].map(|k| {
        (0..samples)
            .map(|t| {
                BASE_AMPLITUDE * (2.0 * PI * BASE_FREQUENCY * t as f64 + k as f64 * PHASE_SHIFT).sin()
            })
            .collect()
    });
    MotorWaveforms { phases }
}

fn jittered_motor(samples: usize, jitter_std: f64, rng: &mut StdRng) -> Result<MotorWaveforms> {
    let jitter = Normal::new(0.0, jitter_std).context("Invalid jitter std")?;
    let mut phases: [Vec<f64>; 3] = [
        Vec::with_capacity(samples),
        Vec::with_capacity(samples),
        Vec::with_capacity(samples),
    ];
    for (k, series) in phases.iter_mut().enumerate() {
        let mut phase_angle = k as f64 * PHASE_SHIFT;
        for _ in 0..samples {
            series.push(BASE_AMPLITUDE * phase_angle.sin());
            phase_angle += 2.0 * PI * (BASE_FREQUENCY + jitter.sample(rng));
        }
    }
    Ok(MotorWaveforms { phases })
}

fn write_recording(dir: &Path, motor_id: &str, waveforms: &MotorWaveforms) -> Result<()> {
    let path = dir.join(format!("{motor_id}.csv"));
    let file = File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(
        writer,
        "Time,A(A) Max,A(A) Min,B(A) Max,B(A) Min,C(A) Max,C(A) Min"
    )?;
    let samples = waveforms.phases[0].len();
    for t in 0..samples {
        write!(writer, "{t}")?;
        for series in &waveforms.phases {
            let x = series[t];
            write!(writer, ",{:.6},{:.6}", x + WINDOW_SPREAD, x - WINDOW_SPREAD)?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;

    println!("Wrote {} ({} samples)", path.display(), samples);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let samples = args.samples as usize;

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create {}", args.output_dir.display()))?;

    let mut rng = StdRng::seed_from_u64(args.seed);

    for i in 1..=args.stable {
        let motor_id = format!("SM-{i:02}");
        write_recording(&args.output_dir, &motor_id, &stable_motor(samples))?;
    }

    for i in 1..=args.faulty {
        let motor_id = format!("FM-{i:02}");
        let waveforms = jittered_motor(samples, args.jitter_std, &mut rng)?;
        write_recording(&args.output_dir, &motor_id, &waveforms)?;
    }

    println!(
        "Generated {} stable and {} faulty recordings in {}",
        args.stable,
        args.faulty,
        args.output_dir.display()
    );
    Ok(())
}
