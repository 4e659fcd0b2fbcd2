//! Vendor GPU telemetry from `nvidia-smi`.

use crate::error::{CoreError, Result};
use crate::model::{GpuMetricSet, Metric};
use crate::platform::PlatformProvider;
use log::{debug, info, trace};
use std::time::Duration;

pub const NVIDIA_SMI: &str = "nvidia-smi";

pub const QUERY_ARGS: [&str; 2] = [
    "--query-gpu=index,name,temperature.gpu,power.draw,clocks.gr,clocks.mem",
    "--format=csv,noheader,nounits",
];

const PROBE_ARGS: [&str; 1] = ["-L"];

const FIELD_COUNT: usize = 6;

/// One parsed line of query output
#[derive(Debug, Clone, PartialEq)]
pub struct GpuSample {
    pub index: String,
    pub model: String,
    pub temperature: f64,
    pub power: f64,
    pub graphics_clock: f64,
    pub memory_clock: f64,
}

/// Parse one CSV line; `None` unless it has exactly six fields
pub fn parse_line(line: &str) -> Option<GpuSample> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != FIELD_COUNT {
        return None;
    }

    Some(GpuSample {
        index: fields[0].to_string(),
        model: fields[1].to_string(),
        temperature: parse_metric(fields[2]),
        power: parse_metric(fields[3]),
        graphics_clock: parse_metric(fields[4]),
        memory_clock: parse_metric(fields[5]),
    })
}

/// Permissive numeric parse; `[N/A]` and friends read as 0.0
pub fn parse_metric(field: &str) -> f64 {
    match field.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            trace!("Unparseable GPU field {:?}, using 0.0", field);
            0.0
        }
    }
}

/// Per-GPU metrics kept across refreshes, in first-seen order
#[derive(Debug, Clone)]
pub struct NvidiaCatalog {
    timeout: Duration,
    gpus: Vec<GpuMetricSet>,
}

impl NvidiaCatalog {
    /// One-time capability check; a failure disables GPU telemetry for the session
    pub fn probe(platform: &dyn PlatformProvider, timeout: Duration) -> Result<Self> {
        let listing = platform
            .run_command(NVIDIA_SMI, &PROBE_ARGS, timeout)
            .map_err(|e| CoreError::capability_absent(e.to_string()))?;

        info!(
            "{} available, {} GPU(s) listed",
            NVIDIA_SMI,
            listing.lines().filter(|l| !l.trim().is_empty()).count()
        );
        Ok(Self::new(timeout))
    }

    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            gpus: Vec::new(),
        }
    }

    /// Query the vendor tool and fold its output.
    ///
    /// On failure every existing metric is left untouched.
    pub fn refresh(&mut self, platform: &dyn PlatformProvider) -> Result<()> {
        let output = Self::query(platform, self.timeout)?;
        self.apply_output(&output);
        Ok(())
    }

    /// Run the vendor query without touching any catalog state
    pub fn query(platform: &dyn PlatformProvider, timeout: Duration) -> Result<String> {
        platform
            .run_command(NVIDIA_SMI, &QUERY_ARGS, timeout)
            .map_err(|e| CoreError::query(e.to_string()))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fold every well-formed line; returns how many were accepted
    pub fn apply_output(&mut self, output: &str) -> usize {
        let mut accepted = 0;
        for line in output.lines().filter(|l| !l.trim().is_empty()) {
            match parse_line(line) {
                Some(sample) => {
                    self.apply(sample);
                    accepted += 1;
                }
                None => debug!("Discarding malformed {} line: {:?}", NVIDIA_SMI, line),
            }
        }
        accepted
    }

    fn apply(&mut self, sample: GpuSample) {
        match self.gpus.iter_mut().find(|g| g.index == sample.index) {
            Some(gpu) => {
                gpu.temperature.update(sample.temperature);
                gpu.power.update(sample.power);
                gpu.graphics_clock.update(sample.graphics_clock);
                gpu.memory_clock.update(sample.memory_clock);
            }
            None => self.gpus.push(GpuMetricSet {
                index: sample.index,
                model: sample.model,
                temperature: Metric::new(sample.temperature),
                power: Metric::new(sample.power),
                graphics_clock: Metric::new(sample.graphics_clock),
                memory_clock: Metric::new(sample.memory_clock),
            }),
        }
    }

    pub fn reset_baselines(&mut self) {
        for gpu in &mut self.gpus {
            gpu.reset_baselines();
        }
    }

    pub fn gpus(&self) -> &[GpuMetricSet] {
        &self.gpus
    }

    pub fn get(&self, index: &str) -> Option<&GpuMetricSet> {
        self.gpus.iter().find(|g| g.index == index)
    }
}
