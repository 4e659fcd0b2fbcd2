use crate::units;
use sensmon_core::{GpuMetricKind, MonitorSnapshot, SensorKind, TemperatureUnit};

/// One line of the flattened sensor tree
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Device(String),
    Group(SensorKind),
    Value {
        label: String,
        columns: [String; 3],
        /// Current temperature in °C, used for colouring
        celsius: Option<f64>,
    },
}

impl Row {
    pub fn is_heading(&self) -> bool {
        !matches!(self, Row::Value { .. })
    }
}

/// Devices in catalog order, a group heading whenever the kind changes, then GPUs
pub fn build_rows(snapshot: &MonitorSnapshot, unit: TemperatureUnit) -> Vec<Row> {
    let mut rows = Vec::with_capacity(snapshot.sensor_count() * 2 + snapshot.gpus.len() * 5);

    for device in &snapshot.devices {
        rows.push(Row::Device(device.display_name.clone()));

        let mut group = None;
        for sensor in &device.sensors {
            if group != Some(sensor.kind) {
                group = Some(sensor.kind);
                rows.push(Row::Group(sensor.kind));
            }

            let celsius = match (sensor.kind, sensor.metric) {
                (SensorKind::Temperature, Some(metric)) => {
                    Some(metric.current() / units::divisor(SensorKind::Temperature))
                }
                _ => None,
            };
            rows.push(Row::Value {
                label: sensor.label.clone(),
                columns: units::sensor_columns(sensor.metric.as_ref(), sensor.kind, unit),
                celsius,
            });
        }
    }

    for gpu in &snapshot.gpus {
        rows.push(Row::Device(format!("GPU {}: {}", gpu.index, gpu.model)));
        for kind in GpuMetricKind::ALL {
            let metric = gpu.metric(kind);
            rows.push(Row::Value {
                label: kind.label().to_string(),
                columns: units::gpu_columns(metric, kind, unit),
                celsius: (kind == GpuMetricKind::Temperature).then(|| metric.current()),
            });
        }
    }

    rows
}
