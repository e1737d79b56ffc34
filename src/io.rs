//! File adapters for the raw logger format.
//!
//! The logger writes semicolon-delimited records with a header row; every
//! numeric field is a fixed-point integer that must be divided by
//! [`RAW_SCALE`] to recover physical units. Columns 0–5 hold the inertial
//! channels, 6–9 the magnetometer field plus declination, and 13–14 the
//! latitude/longitude pair.

use std::fs;
use std::io::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use ndarray::Array2;

use crate::batch::{InertialBatch, MagnetometerBatch};
use crate::geodesy::GpsFix;

/// Fixed-point divisor applied to every raw field.
pub const RAW_SCALE: f64 = 100_000_000.0;

const DELIMITER: char = ';';
const MAG_COLUMNS: std::ops::Range<usize> = 6..10;
const LAT_COLUMN: usize = 13;
const LON_COLUMN: usize = 14;
const MIN_COLUMNS: usize = 15;

/// The three aligned sequences parsed from one log file.
pub struct RecordSet {
    pub inertial: InertialBatch,
    pub magnetometer: MagnetometerBatch,
    pub fixes: Vec<GpsFix>,
}

fn parse_scaled(fields: &[&str], column: usize, line: usize) -> Result<f64> {
    let raw: f64 = fields[column]
        .trim()
        .parse()
        .with_context(|| format!("line {line}: column {column} is not numeric"))?;
    Ok(raw / RAW_SCALE)
}

/// Parse a full log file into aligned inertial, magnetometer and GPS
/// sequences. The header row is skipped; any malformed record is an error.
pub fn load_records(path: &Path) -> Result<RecordSet> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read log file {}", path.display()))?;

    let mut imu_rows: Vec<[f64; 6]> = Vec::new();
    let mut mag_rows: Vec<[f64; 4]> = Vec::new();
    let mut fixes: Vec<GpsFix> = Vec::new();

    for (index, line) in text.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let lineno = index + 1;
        let fields: Vec<&str> = line.split(DELIMITER).collect();
        if fields.len() < MIN_COLUMNS {
            anyhow::bail!(
                "line {lineno}: expected at least {MIN_COLUMNS} columns, got {}",
                fields.len()
            );
        }

        let mut imu = [0.0; 6];
        for (slot, column) in imu.iter_mut().zip(0..6) {
            *slot = parse_scaled(&fields, column, lineno)?;
        }
        imu_rows.push(imu);

        let mut mag = [0.0; 4];
        for (slot, column) in mag.iter_mut().zip(MAG_COLUMNS) {
            *slot = parse_scaled(&fields, column, lineno)?;
        }
        mag_rows.push(mag);

        fixes.push(GpsFix::new(
            parse_scaled(&fields, LAT_COLUMN, lineno)?,
            parse_scaled(&fields, LON_COLUMN, lineno)?,
        ));
    }

    log::info!(
        "parsed {} records from {}",
        imu_rows.len(),
        path.display()
    );
    Ok(RecordSet {
        inertial: InertialBatch::from_rows(&imu_rows)
            .with_context(|| format!("{}: no usable records", path.display()))?,
        magnetometer: MagnetometerBatch::from_rows(&mag_rows)
            .with_context(|| format!("{}: no usable records", path.display()))?,
        fixes,
    })
}

/// Extract the three scaled magnetometer field columns into a
/// whitespace-separated text file. Rows that are too short or not numeric
/// are skipped with a warning, mirroring the logger's tolerance for
/// truncated tail records. Returns the number of rows written.
pub fn extract_magnetometer_columns(input: &Path, output: &Path) -> Result<usize> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read log file {}", input.display()))?;
    let mut file = fs::File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;

    let mut written = 0usize;
    for (index, line) in text.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(DELIMITER).collect();
        if fields.len() < 9 {
            log::warn!("line {}: too few columns, skipped", index + 1);
            continue;
        }
        let mut values = [0.0; 3];
        let mut ok = true;
        for (slot, column) in values.iter_mut().zip(6..9) {
            match fields[column].trim().parse::<f64>() {
                Ok(raw) => *slot = raw / RAW_SCALE,
                Err(_) => {
                    log::warn!("line {}: column {column} is not numeric, skipped", index + 1);
                    ok = false;
                    break;
                }
            }
        }
        if !ok {
            continue;
        }
        writeln!(file, "{} {} {}", values[0], values[1], values[2])?;
        written += 1;
    }
    Ok(written)
}

/// Load a whitespace-separated N×3 sample file (the output format of
/// [`extract_magnetometer_columns`]).
pub fn load_sample_file(path: &Path) -> Result<Array2<f64>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read sample file {}", path.display()))?;

    let mut rows: Vec<[f64; 3]> = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            anyhow::bail!("line {}: expected 3 values, got {}", index + 1, fields.len());
        }
        let mut row = [0.0; 3];
        for (slot, field) in row.iter_mut().zip(fields.iter()) {
            *slot = field
                .parse()
                .with_context(|| format!("line {}: not numeric: {field}", index + 1))?;
        }
        rows.push(row);
    }

    let mut data = Array2::zeros((rows.len(), 3));
    for (i, row) in rows.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            data[[i, j]] = *value;
        }
    }
    Ok(data)
}
