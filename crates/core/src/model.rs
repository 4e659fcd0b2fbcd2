use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// A running value with current/min/max tracking.
///
/// Only [`Metric::update`] and [`Metric::reset_baseline`] mutate it, so
/// `min <= current <= max` holds for any sequence of finite readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    current: f64,
    min: f64,
    max: f64,
}

impl Metric {
    pub fn new(initial: f64) -> Self {
        Self {
            current: initial,
            min: initial,
            max: initial,
        }
    }

    pub fn update(&mut self, value: f64) {
        self.current = value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Collapse min and max onto the current value
    pub fn reset_baseline(&mut self) {
        self.min = self.current;
        self.max = self.current;
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

/// Sensor kind, derived from the hwmon filename prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    Temperature,
    Voltage,
    Rpm,
    Power,
    Clock,
    Other,
}

impl SensorKind {
    /// Filename prefix table, matched first to last
    pub const PREFIXES: [(&'static str, SensorKind); 5] = [
        ("temp", SensorKind::Temperature),
        ("in", SensorKind::Voltage),
        ("fan", SensorKind::Rpm),
        ("power", SensorKind::Power),
        ("freq", SensorKind::Clock),
    ];

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        Self::PREFIXES
            .iter()
            .find(|(prefix, _)| file_name.starts_with(prefix))
            .map(|(_, kind)| *kind)
    }

    /// Presentation rank; unranked kinds sort after all ranked ones
    pub fn rank(self) -> u8 {
        match self {
            Self::Temperature => 0,
            Self::Voltage => 1,
            Self::Rpm => 2,
            Self::Power => 3,
            Self::Clock => 4,
            Self::Other => u8::MAX,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Voltage => "Voltage",
            Self::Rpm => "RPM",
            Self::Power => "Power",
            Self::Clock => "Clock",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stable per-device key: discovery ordinal plus raw kernel name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(ordinal: usize, raw_name: &str) -> Self {
        Self(format!("hwmon{}{}", ordinal, raw_name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Typed address of one hwmon sensor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SensorId {
    pub device: DeviceId,
    pub kind: SensorKind,
    /// Input filename without the `_input` suffix, e.g. `temp2`
    pub channel: String,
}

/// The four metrics tracked per vendor GPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GpuMetricKind {
    Temperature,
    Power,
    GraphicsClock,
    MemoryClock,
}

impl GpuMetricKind {
    pub const ALL: [GpuMetricKind; 4] = [
        GpuMetricKind::Temperature,
        GpuMetricKind::Power,
        GpuMetricKind::GraphicsClock,
        GpuMetricKind::MemoryClock,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Power => "Power Draw",
            Self::GraphicsClock => "Graphics Clock",
            Self::MemoryClock => "Memory Clock",
        }
    }

    /// Closest hwmon kind, used for unit formatting
    pub fn sensor_kind(self) -> SensorKind {
        match self {
            Self::Temperature => SensorKind::Temperature,
            Self::Power => SensorKind::Power,
            Self::GraphicsClock | Self::MemoryClock => SensorKind::Clock,
        }
    }
}

/// Per-GPU metrics reported by the vendor tool, keyed by its index string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuMetricSet {
    pub index: String,
    pub model: String,
    pub temperature: Metric,
    pub power: Metric,
    pub graphics_clock: Metric,
    pub memory_clock: Metric,
}

impl GpuMetricSet {
    pub fn metric(&self, kind: GpuMetricKind) -> &Metric {
        match kind {
            GpuMetricKind::Temperature => &self.temperature,
            GpuMetricKind::Power => &self.power,
            GpuMetricKind::GraphicsClock => &self.graphics_clock,
            GpuMetricKind::MemoryClock => &self.memory_clock,
        }
    }

    pub fn reset_baselines(&mut self) {
        self.temperature.reset_baseline();
        self.power.reset_baseline();
        self.graphics_clock.reset_baseline();
        self.memory_clock.reset_baseline();
    }
}

/// Informational state of the vendor GPU subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GpuStatus {
    /// Turned off by configuration; no probe was attempted
    Disabled,
    /// The startup probe failed; disabled for the process lifetime
    Unavailable(String),
    Active,
    /// The last refresh failed; GPU values are stale
    QueryFailed(String),
}

impl fmt::Display for GpuStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "GPU: disabled"),
            Self::Unavailable(reason) => write!(f, "GPU: unavailable ({})", reason),
            Self::Active => write!(f, "GPU: active"),
            Self::QueryFailed(reason) => write!(f, "GPU: stale ({})", reason),
        }
    }
}

/// One sensor as seen by observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub id: SensorId,
    pub label: String,
    pub kind: SensorKind,
    /// `None` until the first successful read
    pub metric: Option<Metric>,
}

/// One hwmon device as seen by observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceReading {
    pub id: DeviceId,
    pub raw_name: String,
    pub display_name: String,
    pub sensors: Vec<SensorReading>,
}

/// Complete monitor state snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSnapshot {
    pub timestamp: SystemTime,
    pub devices: Vec<DeviceReading>,
    pub gpus: Vec<GpuMetricSet>,
    pub gpu_status: GpuStatus,
}

impl MonitorSnapshot {
    pub fn sensor_count(&self) -> usize {
        self.devices.iter().map(|d| d.sensors.len()).sum()
    }
}

/// Theme configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Dark,
    Light,
}

impl Default for Theme {
    fn default() -> Self {
        Self::Dark
    }
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

/// Display unit for temperatures; applied only at the presentation boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl Default for TemperatureUnit {
    fn default() -> Self {
        Self::Celsius
    }
}

impl TemperatureUnit {
    pub fn toggle(self) -> Self {
        match self {
            Self::Celsius => Self::Fahrenheit,
            Self::Fahrenheit => Self::Celsius,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }
}
