use super::naming::{self, NameContext};
use crate::config::PlatformPaths;
use crate::error::{CoreError, Result};
use crate::model::{DeviceId, DeviceReading, Metric, SensorId, SensorKind, SensorReading};
use crate::platform::PlatformProvider;
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

const INPUT_SUFFIX: &str = "_input";

/// One raw hwmon input file and its running metric
#[derive(Debug, Clone)]
pub struct Sensor {
    id: SensorId,
    path: PathBuf,
    file_name: String,
    label: String,
    metric: Option<Metric>,
}

impl Sensor {
    /// Read the input file and fold the value into the metric.
    ///
    /// On failure the metric is left exactly as it was.
    pub fn read(&mut self, platform: &dyn PlatformProvider) -> Result<f64> {
        let text = platform
            .read_text(&self.path)
            .map_err(|e| CoreError::read(&self.path, e))?;
        let value = text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| CoreError::parse(&self.path, text.trim()))?;

        match self.metric.as_mut() {
            Some(metric) => metric.update(value),
            None => self.metric = Some(Metric::new(value)),
        }
        Ok(value)
    }

    pub fn reset_baseline(&mut self) {
        if let Some(metric) = self.metric.as_mut() {
            metric.reset_baseline();
        }
    }

    pub fn id(&self) -> &SensorId {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> SensorKind {
        self.id.kind
    }

    pub fn metric(&self) -> Option<&Metric> {
        self.metric.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.metric.is_some()
    }

    fn reading(&self) -> SensorReading {
        SensorReading {
            id: self.id.clone(),
            label: self.label.clone(),
            kind: self.kind(),
            metric: self.metric,
        }
    }
}

/// A hwmon chip with its sensors in presentation order
#[derive(Debug, Clone)]
pub struct HwmonDevice {
    id: DeviceId,
    raw_name: String,
    display_name: String,
    sensor_dir: PathBuf,
    sensors: Vec<Sensor>,
}

impl HwmonDevice {
    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Directory holding the `name` and `*_input` files
    pub fn sensor_dir(&self) -> &Path {
        &self.sensor_dir
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn has_friendly_name(&self) -> bool {
        self.display_name != self.raw_name
    }

    pub fn reading(&self) -> DeviceReading {
        DeviceReading {
            id: self.id.clone(),
            raw_name: self.raw_name.clone(),
            display_name: self.display_name.clone(),
            sensors: self.sensors.iter().map(Sensor::reading).collect(),
        }
    }
}

/// A sensor that could not be sampled this pass
#[derive(Debug)]
pub struct SensorFailure {
    pub id: SensorId,
    pub error: CoreError,
}

/// Result of one read-and-fold pass over every sensor
#[derive(Debug, Default)]
pub struct ReadOutcome {
    pub read: usize,
    pub failures: Vec<SensorFailure>,
}

/// All discovered hwmon devices
#[derive(Debug, Clone, Default)]
pub struct SensorCatalog {
    devices: Vec<HwmonDevice>,
}

impl SensorCatalog {
    /// Enumerate the hwmon root once.
    ///
    /// Never fails: unreadable pieces degrade to fallbacks or are skipped, and
    /// a missing root yields an empty catalog.
    pub fn discover(platform: &dyn PlatformProvider, paths: &PlatformPaths, command_timeout: Duration) -> Self {
        let mut devices: Vec<HwmonDevice> = Vec::new();
        let mut ordinal = 0;

        for container in list_containers(&paths.hwmon_root) {
            let Some(sensor_dir) = locate_sensor_dir(&container) else {
                debug!("{}: no name file, not a hwmon device", container.display());
                continue;
            };

            let raw_name = match platform.read_text(&sensor_dir.join("name")) {
                Ok(name) => name,
                Err(e) => {
                    warn!("{}: unreadable name file: {}", sensor_dir.display(), e);
                    continue;
                }
            };

            let ctx = NameContext {
                platform,
                paths,
                container: &container,
                command_timeout,
            };
            let display_name = naming::resolve_display_name(&ctx, &raw_name);

            let id = DeviceId::new(ordinal, &raw_name);
            ordinal += 1;

            let sensors = find_sensors(platform, &id, &sensor_dir);
            debug!("{} ({}): {} sensors", id, display_name, sensors.len());

            let device = HwmonDevice {
                id,
                raw_name,
                display_name,
                sensor_dir,
                sensors,
            };

            if device.has_friendly_name() {
                devices.insert(0, device);
            } else {
                devices.push(device);
            }
        }

        Self { devices }
    }

    pub fn devices(&self) -> &[HwmonDevice] {
        &self.devices
    }

    pub fn device(&self, id: &DeviceId) -> Option<&HwmonDevice> {
        self.devices.iter().find(|d| &d.id == id)
    }

    pub fn sensor(&self, id: &SensorId) -> Option<&Sensor> {
        self.device(&id.device)?
            .sensors
            .iter()
            .find(|s| &s.id == id)
    }

    pub fn sensor_count(&self) -> usize {
        self.devices.iter().map(|d| d.sensors.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Read every sensor; one failure never stops the others
    pub fn read_all(&mut self, platform: &dyn PlatformProvider) -> ReadOutcome {
        let mut outcome = ReadOutcome::default();

        for sensor in self.devices.iter_mut().flat_map(|d| d.sensors.iter_mut()) {
            match sensor.read(platform) {
                Ok(_) => outcome.read += 1,
                Err(error) => outcome.failures.push(SensorFailure {
                    id: sensor.id.clone(),
                    error,
                }),
            }
        }

        outcome
    }

    pub fn reset_baselines(&mut self) {
        for sensor in self.devices.iter_mut().flat_map(|d| d.sensors.iter_mut()) {
            sensor.reset_baseline();
        }
    }

    pub fn readings(&self) -> Vec<DeviceReading> {
        self.devices.iter().map(HwmonDevice::reading).collect()
    }
}

/// Numeric suffix of a `hwmonN` container name
pub fn container_index(name: &str) -> Option<u32> {
    name.strip_prefix("hwmon")?.parse().ok()
}

/// Device containers under `root`, ordered by numeric suffix
fn list_containers(root: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("{} does not exist, no hwmon sensors", root.display());
            return Vec::new();
        }
        Err(e) => {
            warn!("Cannot list {}: {}", root.display(), e);
            return Vec::new();
        }
    };

    let mut containers: Vec<(u32, PathBuf)> = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            match container_index(&name) {
                Some(index) => Some((index, entry.path())),
                None => {
                    warn!("Skipping {}: no numeric hwmon suffix", entry.path().display());
                    None
                }
            }
        })
        .collect();

    containers.sort_by_key(|(index, _)| *index);
    containers.into_iter().map(|(_, path)| path).collect()
}

/// The container itself when it has a `name` file, else its `device` child
fn locate_sensor_dir(container: &Path) -> Option<PathBuf> {
    if container.join("name").is_file() {
        Some(container.to_path_buf())
    } else if container.join("device").join("name").is_file() {
        Some(container.join("device"))
    } else {
        None
    }
}

/// Valid sensor files: `<known prefix>..._input`
pub fn classify_sensor_file(file_name: &str) -> Option<SensorKind> {
    if !file_name.ends_with(INPUT_SUFFIX) {
        return None;
    }
    SensorKind::from_file_name(file_name)
}

fn find_sensors(platform: &dyn PlatformProvider, device: &DeviceId, sensor_dir: &Path) -> Vec<Sensor> {
    let entries = match fs::read_dir(sensor_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot list {}: {}", sensor_dir.display(), e);
            return Vec::new();
        }
    };

    let mut sensors: Vec<Sensor> = entries
        .flatten()
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let kind = classify_sensor_file(&file_name)?;
            let channel = file_name.strip_suffix(INPUT_SUFFIX)?.to_string();

            let label = platform
                .read_text(&sensor_dir.join(format!("{}_label", channel)))
                .ok()
                .filter(|label| !label.is_empty())
                .unwrap_or_else(|| file_name.clone());

            Some(Sensor {
                id: SensorId {
                    device: device.clone(),
                    kind,
                    channel,
                },
                path: entry.path(),
                file_name,
                label,
                metric: None,
            })
        })
        .collect();

    sort_sensors(&mut sensors);
    sensors
}

/// Order by kind rank, then filename
fn sort_sensors(sensors: &mut [Sensor]) {
    sensors.sort_by(|a, b| {
        a.kind()
            .rank()
            .cmp(&b.kind().rank())
            .then_with(|| a.file_name.cmp(&b.file_name))
    });
}
