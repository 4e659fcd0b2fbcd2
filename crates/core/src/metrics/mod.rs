pub mod hwmon;
pub mod naming;
pub mod nvidia;
pub mod sampling;

pub use hwmon::{HwmonDevice, ReadOutcome, Sensor, SensorCatalog, SensorFailure};
pub use nvidia::NvidiaCatalog;
pub use sampling::{LoopState, SamplingLoop};

use crate::config::Config;
use crate::error::Result;
use crate::model::{GpuMetricSet, GpuStatus, MonitorSnapshot};
use crate::platform::{self, PlatformProvider};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Outcome of the vendor GPU step of a sampling pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpuRefresh {
    /// No catalog is active
    Skipped,
    Refreshed,
    Failed(String),
}

/// What one sampling pass did
#[derive(Debug)]
pub struct SampleReport {
    pub sensors_read: usize,
    pub failures: Vec<SensorFailure>,
    pub gpu: GpuRefresh,
}

impl SampleReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !matches!(self.gpu, GpuRefresh::Failed(_))
    }
}

/// A vendor query detached from the collector, so it can run without holding
/// the collector lock
pub struct GpuQuery {
    platform: Arc<dyn PlatformProvider>,
    timeout: Duration,
}

impl GpuQuery {
    pub fn run(&self) -> Result<String> {
        NvidiaCatalog::query(self.platform.as_ref(), self.timeout)
    }
}

/// Main collector that owns the sensor catalog and the vendor GPU catalog
pub struct MetricsCollector {
    platform: Arc<dyn PlatformProvider>,
    sensors: SensorCatalog,
    gpu: Option<NvidiaCatalog>,
    gpu_status: GpuStatus,
}

impl MetricsCollector {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_platform(platform::get_platform_provider(), config)
    }

    /// Discover hwmon devices and probe the vendor tool, once
    pub fn with_platform(platform: Arc<dyn PlatformProvider>, config: &Config) -> Result<Self> {
        config.validate()?;

        let timeout = config.command_timeout();
        let sensors = SensorCatalog::discover(platform.as_ref(), &config.paths, timeout);
        info!(
            "Discovered {} hwmon devices with {} sensors under {}",
            sensors.devices().len(),
            sensors.sensor_count(),
            config.paths.hwmon_root.display()
        );

        let (gpu, gpu_status) = if !config.nvidia {
            debug!("Vendor GPU telemetry disabled by configuration");
            (None, GpuStatus::Disabled)
        } else {
            match NvidiaCatalog::probe(platform.as_ref(), timeout) {
                Ok(catalog) => (Some(catalog), GpuStatus::Active),
                Err(e) => {
                    info!("Vendor GPU telemetry unavailable: {}", e);
                    (None, GpuStatus::Unavailable(e.to_string()))
                }
            }
        };

        Ok(Self {
            platform,
            sensors,
            gpu,
            gpu_status,
        })
    }

    /// Take the first sample so readable sensors have a metric before display
    pub fn init(&mut self) -> SampleReport {
        self.sample()
    }

    /// One tick: vendor GPU refresh first, then every hwmon sensor
    pub fn sample(&mut self) -> SampleReport {
        let gpu_output = self.gpu_query().map(|query| query.run());
        self.sample_with(gpu_output)
    }

    /// The vendor query for this tick; `None` when no GPU catalog is active
    pub fn gpu_query(&self) -> Option<GpuQuery> {
        self.gpu.as_ref().map(|catalog| GpuQuery {
            platform: Arc::clone(&self.platform),
            timeout: catalog.timeout(),
        })
    }

    /// Fold the output of an already-run vendor query, then read every hwmon sensor
    pub fn sample_with(&mut self, gpu_output: Option<Result<String>>) -> SampleReport {
        let gpu = self.fold_gpu(gpu_output);

        let ReadOutcome { read, failures } = self.sensors.read_all(self.platform.as_ref());
        for failure in &failures {
            debug!("{}/{}: {}", failure.id.device, failure.id.channel, failure.error);
        }

        SampleReport {
            sensors_read: read,
            failures,
            gpu,
        }
    }

    fn fold_gpu(&mut self, gpu_output: Option<Result<String>>) -> GpuRefresh {
        let (Some(catalog), Some(output)) = (self.gpu.as_mut(), gpu_output) else {
            return GpuRefresh::Skipped;
        };

        match output {
            Ok(text) => {
                catalog.apply_output(&text);
                if matches!(self.gpu_status, GpuStatus::QueryFailed(_)) {
                    info!("Vendor GPU query recovered");
                }
                self.gpu_status = GpuStatus::Active;
                GpuRefresh::Refreshed
            }
            Err(e) => {
                let reason = e.to_string();
                if !matches!(self.gpu_status, GpuStatus::QueryFailed(_)) {
                    warn!("{}; keeping last GPU values", reason);
                }
                self.gpu_status = GpuStatus::QueryFailed(reason.clone());
                GpuRefresh::Failed(reason)
            }
        }
    }

    /// Collapse every min/max to its current value, then sample immediately
    pub fn reset_all(&mut self) -> SampleReport {
        self.sensors.reset_baselines();
        if let Some(catalog) = self.gpu.as_mut() {
            catalog.reset_baselines();
        }
        self.sample()
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            timestamp: SystemTime::now(),
            devices: self.sensors.readings(),
            gpus: self.gpus().to_vec(),
            gpu_status: self.gpu_status.clone(),
        }
    }

    pub fn sensors(&self) -> &SensorCatalog {
        &self.sensors
    }

    pub fn gpus(&self) -> &[GpuMetricSet] {
        self.gpu.as_ref().map(NvidiaCatalog::gpus).unwrap_or(&[])
    }

    pub fn gpu_status(&self) -> &GpuStatus {
        &self.gpu_status
    }

    pub fn platform_name(&self) -> &'static str {
        self.platform.platform_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakePlatform, FakeSysfs};

    const QUERY_LINE: &str = "nvidia-smi --query-gpu=index,name,temperature.gpu,power.draw,clocks.gr,clocks.mem --format=csv,noheader,nounits";

    fn config(sysfs: &FakeSysfs, nvidia: bool) -> Config {
        Config {
            nvidia,
            paths: sysfs.paths(),
            ..Config::default()
        }
    }

    fn sysfs_with_acpitz() -> FakeSysfs {
        let sysfs = FakeSysfs::new();
        sysfs
            .hwmon("hwmon0", "name", "acpitz")
            .hwmon("hwmon0", "temp1_input", "27800");
        sysfs
    }

    #[test]
    fn test_disabled_gpu_never_probes() {
        let sysfs = sysfs_with_acpitz();
        let platform = Arc::new(FakePlatform::new());
        let mut collector = MetricsCollector::with_platform(platform.clone(), &config(&sysfs, false)).unwrap();

        assert_eq!(collector.gpu_status(), &GpuStatus::Disabled);
        let report = collector.init();
        assert_eq!(report.gpu, GpuRefresh::Skipped);
        assert_eq!(report.sensors_read, 1);
        assert!(platform.calls().is_empty());
    }

    #[test]
    fn test_failed_probe_disables_gpu() {
        let sysfs = sysfs_with_acpitz();
        let platform = Arc::new(FakePlatform::new());
        let mut collector = MetricsCollector::with_platform(platform.clone(), &config(&sysfs, true)).unwrap();

        assert!(matches!(collector.gpu_status(), GpuStatus::Unavailable(_)));
        collector.sample();
        collector.sample();
        assert_eq!(platform.calls(), vec!["nvidia-smi -L".to_string()]);
    }

    #[test]
    fn test_gpu_query_failure_keeps_stale_values() {
        let sysfs = sysfs_with_acpitz();
        let platform = Arc::new(
            FakePlatform::new()
                .with_output("nvidia-smi -L", "GPU 0: NVIDIA GeForce RTX 3080\n")
                .with_output(QUERY_LINE, "0, NVIDIA GeForce RTX 3080, 65, 220.50, 1800, 9500\n"),
        );
        let mut collector = MetricsCollector::with_platform(platform.clone(), &config(&sysfs, true)).unwrap();
        assert_eq!(collector.init().gpu, GpuRefresh::Refreshed);

        platform.set_failure(QUERY_LINE);
        let report = collector.sample();
        assert!(matches!(report.gpu, GpuRefresh::Failed(_)));
        assert!(!report.is_clean());
        assert_eq!(report.sensors_read, 1);
        assert!(matches!(collector.gpu_status(), GpuStatus::QueryFailed(_)));
        assert_eq!(collector.gpus()[0].temperature.current(), 65.0);

        platform.set_output(QUERY_LINE, "0, NVIDIA GeForce RTX 3080, 70, 230.00, 1800, 9500\n");
        collector.sample();
        assert_eq!(collector.gpu_status(), &GpuStatus::Active);
        assert_eq!(collector.gpus()[0].temperature.max(), 70.0);
    }

    #[test]
    fn test_reset_all_resamples() {
        let sysfs = sysfs_with_acpitz();
        let platform = Arc::new(FakePlatform::new());
        let mut collector = MetricsCollector::with_platform(platform, &config(&sysfs, false)).unwrap();
        collector.init();
        sysfs.hwmon("hwmon0", "temp1_input", "35000");
        collector.sample();

        sysfs.hwmon("hwmon0", "temp1_input", "30000");
        let report = collector.reset_all();
        assert!(report.is_clean());

        let snapshot = collector.snapshot();
        let metric = snapshot.devices[0].sensors[0].metric.unwrap();
        assert_eq!(metric.current(), 30000.0);
        assert_eq!(metric.min(), 30000.0);
        assert_eq!(metric.max(), 35000.0);
    }

    #[test]
    fn test_snapshot_before_first_sample() {
        let sysfs = sysfs_with_acpitz();
        let collector = MetricsCollector::with_platform(Arc::new(FakePlatform::new()), &config(&sysfs, false)).unwrap();

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.sensor_count(), 1);
        assert!(snapshot.devices[0].sensors[0].metric.is_none());
        assert!(snapshot.gpus.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let sysfs = FakeSysfs::new();
        let bad = Config {
            refresh_ms: 5,
            ..config(&sysfs, false)
        };
        assert!(MetricsCollector::with_platform(Arc::new(FakePlatform::new()), &bad).is_err());
    }

    #[test]
    fn test_detached_gpu_query_folds_later() {
        let sysfs = sysfs_with_acpitz();
        let platform = Arc::new(
            FakePlatform::new()
                .with_output("nvidia-smi -L", "GPU 0: NVIDIA GeForce RTX 3080\n")
                .with_output(QUERY_LINE, "0, NVIDIA GeForce RTX 3080, 65, 220.50, 1800, 9500\n"),
        );
        let mut collector = MetricsCollector::with_platform(platform, &config(&sysfs, true)).unwrap();

        let output = collector.gpu_query().unwrap().run();
        assert!(collector.gpus().is_empty());

        let report = collector.sample_with(Some(output));
        assert_eq!(report.gpu, GpuRefresh::Refreshed);
        assert_eq!(collector.gpus()[0].temperature.current(), 65.0);

        let report = collector.sample_with(None);
        assert_eq!(report.gpu, GpuRefresh::Skipped);
        assert_eq!(report.sensors_read, 1);
    }
}
