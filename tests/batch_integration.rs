//! Batch Analysis Integration Tests
//!
//! Exercises the full pipeline, from recording CSVs on disk through batch
//! evaluation to rendered reports, against synthetic waveforms with known
//! health outcomes: stable sinusoids, frequency-jittered signals, and
//! recordings that must be skipped (missing phase columns, too few rows,
//! missing file).

use std::f64::consts::PI;
use std::io::Write;
use std::path::Path;

use rand::prelude::*;
use rand_distr::{Distribution, Normal};

use motorguard::{batch, report, AnalysisConfig, HealthStatus, Phase};

const HEADER: &str = "Time,A(A) Max,A(A) Min,B(A) Max,B(A) Min,C(A) Max,C(A) Min";

/// Write a recording whose three phases all carry `signal`, with the
/// recorder's max/min window straddling the true value.
fn write_recording(dir: &Path, motor_id: &str, signal: &[f64]) {
    let path = dir.join(format!("{motor_id}.csv"));
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for (t, &x) in signal.iter().enumerate() {
        writeln!(
            file,
            "{t},{},{},{},{},{},{}",
            x + 0.5,
            x - 0.5,
            x + 0.3,
            x - 0.3,
            x + 0.7,
            x - 0.7
        )
        .unwrap();
    }
}

fn stable_sinusoid(n: usize, cycles: usize) -> Vec<f64> {
    (0..n)
        .map(|t| 12.0 * (2.0 * PI * cycles as f64 * t as f64 / n as f64).sin())
        .collect()
}

fn jittered_sinusoid(n: usize, jitter_std: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let jitter = Normal::new(0.0, jitter_std).unwrap();
    let mut phase = 0.0_f64;
    (0..n)
        .map(|_| {
            let sample = 12.0 * phase.sin();
            phase += 2.0 * PI * (0.1 + jitter.sample(&mut rng));
            sample
        })
        .collect()
}

fn site_config(dir: &Path, motors: &[&str]) -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    config.input.data_dir = dir.to_path_buf();
    config.input.motors = motors.iter().map(|m| (*m).to_string()).collect();
    config.report.csv_path = dir.join("health_results.csv");
    config.report.json_path = dir.join("health_results.json");
    config
}

#[test]
fn full_batch_with_mixed_outcomes() {
    let dir = tempfile::tempdir().unwrap();

    // Two stable motors, one jittered, and three that must be skipped
    write_recording(dir.path(), "SM-01", &stable_sinusoid(1024, 64));
    write_recording(dir.path(), "SM-02", &stable_sinusoid(1024, 100));
    write_recording(dir.path(), "FM-01", &jittered_sinusoid(1024, 0.05, 99));

    // Missing phase C columns
    let path = dir.path().join("NP-01.csv");
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "Time,A(A) Max,A(A) Min,B(A) Max,B(A) Min").unwrap();
    for t in 0..128 {
        writeln!(file, "{t},1.0,0.0,1.0,0.0").unwrap();
    }

    // Single-sample recording (too short for the transform)
    let path = dir.path().join("SS-01.csv");
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "{HEADER}").unwrap();
    writeln!(file, "0,1.0,0.0,1.0,0.0,1.0,0.0").unwrap();

    // GH-01 has no recording file at all

    let config = site_config(
        dir.path(),
        &["SM-01", "SM-02", "FM-01", "NP-01", "SS-01", "GH-01"],
    );
    let batch_report = batch::run_batch(&config);

    assert_eq!(batch_report.outcomes.len(), 6);
    assert_eq!(batch_report.analyzed_count(), 3);
    assert_eq!(batch_report.skipped_count(), 3);

    let verdict_of = |motor: &str| {
        batch_report
            .analyses()
            .find(|(id, _)| *id == motor)
            .map(|(_, a)| a.verdict.global)
    };
    assert_eq!(verdict_of("SM-01"), Some(HealthStatus::Healthy));
    assert_eq!(verdict_of("SM-02"), Some(HealthStatus::Healthy));
    assert_eq!(verdict_of("FM-01"), Some(HealthStatus::Unhealthy));

    let skipped: Vec<&str> = batch_report.failures().map(|(id, _)| id).collect();
    assert_eq!(skipped, vec!["NP-01", "SS-01", "GH-01"]);

    // Every analyzed motor retains full-length traces for plotting
    for (_, analysis) in batch_report.analyses() {
        for phase in Phase::ALL {
            let trace = analysis.trace(phase);
            assert_eq!(trace.envelope.len(), 1024);
            assert_eq!(trace.instantaneous_frequency.len(), 1024);
            assert!(trace.envelope.iter().all(|&e| e >= 0.0));
        }
    }
}

#[test]
fn reports_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();

    write_recording(dir.path(), "SM-01", &stable_sinusoid(512, 32));
    write_recording(dir.path(), "FM-01", &jittered_sinusoid(512, 0.05, 5));

    let config = site_config(dir.path(), &["SM-01", "FM-01", "GH-01"]);
    let batch_report = batch::run_batch(&config);

    report::write_results_table(&batch_report, &config.report.csv_path).unwrap();
    report::write_json(&batch_report, &config.report.json_path).unwrap();

    // Results table: four rows per analyzed motor, skipped motor absent
    let csv = std::fs::read_to_string(&config.report.csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Motor,Phase,Health,Standard deviation frequency");
    assert_eq!(lines.len(), 1 + 4 + 4);
    assert!(lines[1].starts_with("SM-01,A,Healthy,"));
    assert_eq!(lines[4], ",Global,Healthy,");
    assert!(lines[5].starts_with("FM-01,A,Unhealthy,"));
    assert_eq!(lines[8], ",Global,Unhealthy,");
    assert!(!csv.contains("GH-01"));

    // JSON report: statistics and skip reasons for downstream consumers
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&config.report.json_path).unwrap()).unwrap();
    assert_eq!(json["threshold"], 0.0001);
    assert_eq!(json["motors"].as_array().unwrap().len(), 2);
    assert_eq!(json["motors"][0]["motor_id"], "SM-01");
    let stat = json["motors"][1]["phases"][0]["stability_statistic"]
        .as_f64()
        .unwrap();
    assert!(stat > 0.0001, "jittered motor statistic {stat} too small");
    assert_eq!(json["skipped"][0]["motor_id"], "GH-01");
    assert!(json["skipped"][0]["reason"].as_str().unwrap().contains("GH-01.csv"));
}

#[test]
fn threshold_override_flips_jittered_motor() {
    let dir = tempfile::tempdir().unwrap();
    write_recording(dir.path(), "FM-01", &jittered_sinusoid(1024, 0.05, 21));

    let mut config = site_config(dir.path(), &["FM-01"]);
    let strict = batch::run_batch(&config);
    assert_eq!(
        strict.analyses().next().unwrap().1.verdict.global,
        HealthStatus::Unhealthy
    );

    config.health.threshold = 1.0;
    let lenient = batch::run_batch(&config);
    assert_eq!(
        lenient.analyses().next().unwrap().1.verdict.global,
        HealthStatus::Healthy
    );
}

#[test]
fn identical_runs_produce_identical_statistics() {
    let dir = tempfile::tempdir().unwrap();
    write_recording(dir.path(), "FM-01", &jittered_sinusoid(512, 0.02, 8));

    let config = site_config(dir.path(), &["FM-01"]);
    let first = batch::run_batch(&config);
    let second = batch::run_batch(&config);

    let stats = |r: &motorguard::BatchReport| -> Vec<f64> {
        r.analyses()
            .flat_map(|(_, a)| a.verdict.phases.iter().map(|p| p.stability_statistic))
            .collect::<Vec<_>>()
    };
    assert_eq!(stats(&first), stats(&second));
}
