//! Raw hwmon values to display units.
//!
//! The core stores kernel values untouched (millidegrees, millivolts, RPM,
//! microwatts, Hz); conversion happens only here.

use sensmon_core::{GpuMetricKind, Metric, SensorKind, TemperatureUnit};

/// Shown in place of a value that has never been read
pub const MISSING: &str = "--";

/// Divisor from the raw hwmon value to the display unit
pub fn divisor(kind: SensorKind) -> f64 {
    match kind {
        SensorKind::Temperature | SensorKind::Voltage => 1_000.0,
        SensorKind::Power | SensorKind::Clock => 1_000_000.0,
        SensorKind::Rpm | SensorKind::Other => 1.0,
    }
}

pub fn unit_suffix(kind: SensorKind, unit: TemperatureUnit) -> &'static str {
    match kind {
        SensorKind::Temperature => unit.symbol(),
        SensorKind::Voltage => "V",
        SensorKind::Rpm => "RPM",
        SensorKind::Power => "W",
        SensorKind::Clock => "MHz",
        SensorKind::Other => "",
    }
}

/// Celsius passes through; Fahrenheit is rounded to two decimals
pub fn convert_temperature(celsius: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => ((celsius * 9.0 / 5.0 + 32.0) * 100.0).round() / 100.0,
    }
}

fn scale(value: f64, kind: SensorKind, unit: TemperatureUnit, divisor: f64) -> f64 {
    let value = value / divisor;
    if kind == SensorKind::Temperature {
        convert_temperature(value, unit)
    } else {
        value
    }
}

fn with_suffix(value: f64, suffix: &str) -> String {
    if suffix.is_empty() {
        format!("{}", value)
    } else {
        format!("{} {}", value, suffix)
    }
}

/// One raw hwmon value ready for display
pub fn format_sensor_value(raw: f64, kind: SensorKind, unit: TemperatureUnit) -> String {
    with_suffix(scale(raw, kind, unit, divisor(kind)), unit_suffix(kind, unit))
}

/// Vendor GPU values arrive in °C, W and MHz already
pub fn format_gpu_value(value: f64, kind: GpuMetricKind, unit: TemperatureUnit) -> String {
    let sensor_kind = kind.sensor_kind();
    with_suffix(scale(value, sensor_kind, unit, 1.0), unit_suffix(sensor_kind, unit))
}

/// `[current, min, max]` columns for a hwmon sensor
pub fn sensor_columns(metric: Option<&Metric>, kind: SensorKind, unit: TemperatureUnit) -> [String; 3] {
    match metric {
        Some(m) => [m.current(), m.min(), m.max()].map(|v| format_sensor_value(v, kind, unit)),
        None => [MISSING.to_string(), MISSING.to_string(), MISSING.to_string()],
    }
}

/// `[current, min, max]` columns for a vendor GPU metric
pub fn gpu_columns(metric: &Metric, kind: GpuMetricKind, unit: TemperatureUnit) -> [String; 3] {
    [metric.current(), metric.min(), metric.max()].map(|v| format_gpu_value(v, kind, unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hwmon_divisors() {
        let c = TemperatureUnit::Celsius;
        assert_eq!(format_sensor_value(45125.0, SensorKind::Temperature, c), "45.125 °C");
        assert_eq!(format_sensor_value(1216.0, SensorKind::Voltage, c), "1.216 V");
        assert_eq!(format_sensor_value(1850.0, SensorKind::Rpm, c), "1850 RPM");
        assert_eq!(format_sensor_value(15_500_000.0, SensorKind::Power, c), "15.5 W");
        assert_eq!(format_sensor_value(800_000_000.0, SensorKind::Clock, c), "800 MHz");
        assert_eq!(format_sensor_value(7.0, SensorKind::Other, c), "7");
    }

    #[test]
    fn test_fahrenheit_rounding() {
        assert_eq!(convert_temperature(0.0, TemperatureUnit::Fahrenheit), 32.0);
        assert_eq!(convert_temperature(100.0, TemperatureUnit::Fahrenheit), 212.0);
        assert_eq!(convert_temperature(36.6, TemperatureUnit::Fahrenheit), 97.88);
        assert_eq!(
            format_sensor_value(37777.0, SensorKind::Temperature, TemperatureUnit::Fahrenheit),
            "100 °F"
        );
    }

    #[test]
    fn test_only_temperatures_change_with_unit() {
        let f = TemperatureUnit::Fahrenheit;
        assert_eq!(format_sensor_value(1216.0, SensorKind::Voltage, f), "1.216 V");
        assert_eq!(format_gpu_value(220.5, GpuMetricKind::Power, f), "220.5 W");
        assert_eq!(format_gpu_value(65.0, GpuMetricKind::Temperature, f), "149 °F");
    }

    #[test]
    fn test_gpu_values_are_not_divided() {
        let c = TemperatureUnit::Celsius;
        assert_eq!(format_gpu_value(65.0, GpuMetricKind::Temperature, c), "65 °C");
        assert_eq!(format_gpu_value(1800.0, GpuMetricKind::GraphicsClock, c), "1800 MHz");
        assert_eq!(format_gpu_value(9500.0, GpuMetricKind::MemoryClock, c), "9500 MHz");
    }

    #[test]
    fn test_unread_sensor_columns() {
        let columns = sensor_columns(None, SensorKind::Temperature, TemperatureUnit::Celsius);
        assert_eq!(columns, ["--", "--", "--"]);

        let mut metric = Metric::new(40000.0);
        metric.update(52000.0);
        let columns = sensor_columns(Some(&metric), SensorKind::Temperature, TemperatureUnit::Celsius);
        assert_eq!(columns, ["52 °C", "40 °C", "52 °C"]);
    }
}
