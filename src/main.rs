use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use ndarray::Array2;
use serde::Serialize;

use trajectory_rs::calibration::SensorCalibration;
use trajectory_rs::geodesy::project_to_local_plane;
use trajectory_rs::io::{extract_magnetometer_columns, load_records, load_sample_file};
use trajectory_rs::trajectory::{imu_mag_trajectory, imu_trajectory, TrajectoryConfig};

#[derive(Parser, Debug)]
#[command(name = "trajectory_tracker")]
#[command(about = "Reconstruct 3D trajectories from logged IMU, magnetometer and GPS data", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the trajectory pipelines over a raw semicolon-delimited log.
    Track {
        /// Path to the raw CSV log
        csv: PathBuf,

        /// Which trajectory to compute
        #[arg(long, value_enum, default_value = "all")]
        pipeline: Pipeline,

        /// Sample interval in seconds
        #[arg(long, default_value_t = 0.1)]
        dt: f64,

        /// Disable the 9.81 m/s² z-channel compensation in the IMU-only
        /// pipeline
        #[arg(long)]
        no_gravity_compensation: bool,

        /// Low-pass cutoff frequency in Hz (IMU+mag pipeline)
        #[arg(long, default_value_t = 0.1)]
        cutoff: f64,

        /// Low-pass sampling frequency in Hz (defaults to 1/dt)
        #[arg(long)]
        sample_rate: Option<f64>,

        /// Butterworth filter order
        #[arg(long, default_value_t = 5)]
        order: usize,

        /// Re-orthonormalize the attitude every N steps (off by default)
        #[arg(long)]
        renormalize_every: Option<usize>,

        /// Output JSON path (defaults to a timestamped file)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Extract the scaled magnetometer columns of a raw log into a
    /// whitespace-separated sample file.
    ExtractMag {
        /// Path to the raw CSV log
        csv: PathBuf,

        /// Output text file
        output: PathBuf,
    },

    /// Apply a bias + matrix calibration to a magnetometer sample file.
    Calibrate {
        /// Whitespace-separated N×3 sample file
        samples: PathBuf,

        /// JSON calibration description (defaults to the bench-measured
        /// magnetometer calibration)
        #[arg(long)]
        calibration: Option<PathBuf>,

        /// Output JSON path (defaults to stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Pipeline {
    Gps,
    Imu,
    ImuMag,
    All,
}

#[derive(Serialize)]
struct TrajectoryOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    gps: Option<Vec<[f64; 3]>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    imu: Option<Vec<[f64; 3]>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    imu_mag: Option<Vec<[f64; 3]>>,
}

#[derive(Serialize)]
struct CalibrationOutput {
    before: Vec<[f64; 3]>,
    after: Vec<[f64; 3]>,
}

/// Bench-measured calibration for the project's magnetometer.
fn default_magnetometer_calibration() -> SensorCalibration {
    SensorCalibration {
        bias: [2.836979, -1.014804, -3.421376],
        correction: [
            [1.194463, 0.000799, 0.002650],
            [0.000799, 1.052105, 0.001479],
            [0.002650, 0.001479, 1.081255],
        ],
        calibration: [
            [0.837202, -0.000633, -0.002051],
            [-0.000633, 0.950478, -0.001298],
            [-0.002051, -0.001298, 0.924858],
        ],
    }
}

fn positions_to_rows(positions: &Array2<f64>) -> Vec<[f64; 3]> {
    positions
        .rows()
        .into_iter()
        .map(|row| [row[0], row[1], row[2]])
        .collect()
}

fn run_track(
    csv: PathBuf,
    pipeline: Pipeline,
    dt: f64,
    no_gravity_compensation: bool,
    cutoff: f64,
    sample_rate: Option<f64>,
    order: usize,
    renormalize_every: Option<usize>,
    output: Option<PathBuf>,
) -> Result<()> {
    let records = load_records(&csv)?;
    log::info!(
        "{} records loaded, running pipeline(s): {:?}",
        records.inertial.len(),
        pipeline
    );

    let mut config = TrajectoryConfig::new(dt);
    config.gravity_compensation = !no_gravity_compensation;
    config.filter.cutoff = cutoff;
    config.filter.sample_rate = sample_rate.unwrap_or(1.0 / dt);
    config.filter.order = order;
    config.renormalize_every = renormalize_every;

    let mut result = TrajectoryOutput {
        gps: None,
        imu: None,
        imu_mag: None,
    };

    if matches!(pipeline, Pipeline::Gps | Pipeline::All) {
        let gps = project_to_local_plane(&records.fixes)?;
        result.gps = Some(positions_to_rows(&gps));
    }
    if matches!(pipeline, Pipeline::Imu | Pipeline::All) {
        let imu = imu_trajectory(&records.inertial, &config)?;
        result.imu = Some(positions_to_rows(&imu));
    }
    if matches!(pipeline, Pipeline::ImuMag | Pipeline::All) {
        let imu_mag = imu_mag_trajectory(&records.inertial, &records.magnetometer, &config)?;
        result.imu_mag = Some(positions_to_rows(&imu_mag));
    }

    let output = output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "trajectories_{}.json",
            Utc::now().format("%Y%m%d_%H%M%S")
        ))
    });
    let json = serde_json::to_string_pretty(&result)?;
    fs::write(&output, json).with_context(|| format!("failed to write {}", output.display()))?;
    println!("Trajectories written to {}", output.display());
    Ok(())
}

fn run_calibrate(
    samples: PathBuf,
    calibration: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let data = load_sample_file(&samples)?;
    let calibration = match calibration {
        Some(path) => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read calibration {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("invalid calibration JSON in {}", path.display()))?
        }
        None => default_magnetometer_calibration(),
    };
    let corrected = calibration.apply(data.view())?;

    let report = CalibrationOutput {
        before: positions_to_rows(&data),
        after: positions_to_rows(&corrected),
    };
    let json = serde_json::to_string_pretty(&report)?;
    match output {
        Some(path) => {
            fs::write(&path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Calibrated samples written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Track {
            csv,
            pipeline,
            dt,
            no_gravity_compensation,
            cutoff,
            sample_rate,
            order,
            renormalize_every,
            output,
        } => run_track(
            csv,
            pipeline,
            dt,
            no_gravity_compensation,
            cutoff,
            sample_rate,
            order,
            renormalize_every,
            output,
        ),
        Command::ExtractMag { csv, output } => {
            let written = extract_magnetometer_columns(&csv, &output)?;
            println!("{} magnetometer rows written to {}", written, output.display());
            Ok(())
        }
        Command::Calibrate {
            samples,
            calibration,
            output,
        } => run_calibrate(samples, calibration, output),
    }
}
