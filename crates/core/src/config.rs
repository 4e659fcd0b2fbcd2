use crate::{error::{CoreError, Result}, model::{TemperatureUnit, Theme}};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fs, path::{Path, PathBuf}, time::Duration};

/// Host locations the monitor reads from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformPaths {
    /// Directory holding the `hwmonN` device containers
    pub hwmon_root: PathBuf,

    /// DMI board vendor file
    pub board_vendor: PathBuf,

    /// DMI board name file
    pub board_name: PathBuf,

    /// CPU info text source
    pub cpuinfo: PathBuf,
}

impl Default for PlatformPaths {
    fn default() -> Self {
        Self {
            hwmon_root: PathBuf::from("/sys/class/hwmon"),
            board_vendor: PathBuf::from("/sys/class/dmi/id/board_vendor"),
            board_name: PathBuf::from("/sys/class/dmi/id/board_name"),
            cpuinfo: PathBuf::from("/proc/cpuinfo"),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sampling interval in milliseconds
    pub refresh_ms: u64,

    /// UI theme
    pub theme: Theme,

    /// Disable colors
    pub no_color: bool,

    /// Unit used to display temperatures
    pub temperature_unit: TemperatureUnit,

    /// Probe and poll nvidia-smi
    pub nvidia: bool,

    /// Upper bound for any external command, in milliseconds
    pub command_timeout_ms: u64,

    pub paths: PlatformPaths,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_ms: 1000,
            theme: Theme::Dark,
            no_color: false,
            temperature_unit: TemperatureUnit::Celsius,
            nvidia: true,
            command_timeout_ms: 2000,
            paths: PlatformPaths::default(),
        }
    }
}

impl Config {
    /// Load configuration from multiple sources in order of preference:
    /// 1. CLI arguments override everything
    /// 2. JSON config file if specified
    /// 3. Default config file locations
    /// 4. Built-in defaults
    ///
    /// Each file only overrides the keys it actually contains.
    pub fn load(cli_config: Option<&CliConfig>, json_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(default_layer) = Self::load_default_config()? {
            config.merge(default_layer)?;
        }

        if let Some(path) = json_path {
            let file_layer = Self::read_layer(path)?;
            config.merge(file_layer)?;
        }

        if let Some(cli) = cli_config {
            config.apply_cli_overrides(cli);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific JSON file over the built-in defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge(Self::read_layer(path)?)?;
        Ok(config)
    }

    /// Read a config file as a JSON overlay, rejecting values of the wrong shape
    fn read_layer(path: &Path) -> Result<Value> {
        let contents = fs::read_to_string(path)
            .map_err(|e| CoreError::config(format!("Failed to read config file {}: {}", path.display(), e)))?;

        let layer: Value = serde_json::from_str(&contents)
            .map_err(|e| CoreError::config(format!("Failed to parse config file {}: {}", path.display(), e)))?;

        if !layer.is_object() {
            return Err(CoreError::config(format!(
                "Config file {} must contain a JSON object",
                path.display()
            )));
        }

        Self::default()
            .overlaid(&layer)
            .map_err(|e| CoreError::config(format!("Invalid config file {}: {}", path.display(), e)))?;

        Ok(layer)
    }

    fn load_default_config() -> Result<Option<Value>> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::read_layer(&path) {
                    Ok(layer) => return Ok(Some(layer)),
                    Err(e) => {
                        warn!("Failed to load config from {}: {}", path.display(), e);
                        continue;
                    }
                }
            }
        }

        Ok(None)
    }

    /// Get default configuration file search paths
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("sensmon").join("config.json"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".sensmon.json"));
        }

        paths.push(PathBuf::from("sensmon.json"));

        paths
    }

    /// Apply every key present in `layer` on top of this configuration,
    /// including keys that set a value back to its default
    pub fn merge(&mut self, layer: Value) -> Result<()> {
        *self = self.overlaid(&layer)?;
        Ok(())
    }

    fn overlaid(&self, layer: &Value) -> serde_json::Result<Self> {
        let mut merged = serde_json::to_value(self)?;
        overlay(&mut merged, layer.clone());
        serde_json::from_value(merged)
    }

    fn apply_cli_overrides(&mut self, cli: &CliConfig) {
        if let Some(refresh) = cli.refresh_ms {
            self.refresh_ms = refresh;
        }
        if let Some(theme) = cli.theme {
            self.theme = theme;
        }
        if cli.no_color {
            self.no_color = true;
        }
        if let Some(unit) = cli.temperature_unit {
            self.temperature_unit = unit;
        }
        if cli.no_gpu {
            self.nvidia = false;
        }
        if let Some(root) = &cli.hwmon_root {
            self.paths.hwmon_root = root.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.refresh_ms < 100 {
            return Err(CoreError::config("Refresh interval must be at least 100ms"));
        }

        if self.refresh_ms > 10000 {
            return Err(CoreError::config("Refresh interval must be at most 10 seconds"));
        }

        if self.command_timeout_ms == 0 {
            return Err(CoreError::config("Command timeout must be positive"));
        }

        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

/// Recursive object merge; anything that is not an object replaces the base value
fn overlay(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

/// CLI configuration (temporary struct for CLI parsing)
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub refresh_ms: Option<u64>,
    pub theme: Option<Theme>,
    pub no_color: bool,
    pub temperature_unit: Option<TemperatureUnit>,
    pub no_gpu: bool,
    pub hwmon_root: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_takes_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "refresh_ms": 2500, "temperature_unit": "Fahrenheit" }}"#).unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.refresh_ms, 2500);
        assert_eq!(config.temperature_unit, TemperatureUnit::Fahrenheit);
        assert!(config.nvidia);
        assert_eq!(config.paths, PlatformPaths::default());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = Config::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_merge_applies_present_keys_only() {
        let mut config = Config::default();
        config
            .merge(serde_json::json!({ "nvidia": false, "paths": { "hwmon_root": "/tmp/hwmon" } }))
            .unwrap();

        assert!(!config.nvidia);
        assert_eq!(config.paths.hwmon_root, PathBuf::from("/tmp/hwmon"));
        assert_eq!(config.paths.cpuinfo, PathBuf::from("/proc/cpuinfo"));
        assert_eq!(config.refresh_ms, 1000);
    }

    #[test]
    fn test_later_layer_can_restore_defaults() {
        let mut config = Config::default();
        config
            .merge(serde_json::json!({ "refresh_ms": 2000, "nvidia": false, "theme": "Light" }))
            .unwrap();
        config
            .merge(serde_json::json!({ "refresh_ms": 1000, "nvidia": true }))
            .unwrap();

        assert_eq!(config.refresh_ms, 1000);
        assert!(config.nvidia);
        assert_eq!(config.theme, Theme::Light);
    }

    #[test]
    fn test_json_config_file_overrides_earlier_layer() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "refresh_ms": 1000, "nvidia": true, "paths": {{ "hwmon_root": "/sys/class/hwmon" }} }}"#).unwrap();

        let mut config = Config::default();
        config.refresh_ms = 2000;
        config.nvidia = false;
        config.paths.hwmon_root = PathBuf::from("/tmp/hwmon");
        config.merge(Config::read_layer(file.path()).unwrap()).unwrap();

        assert_eq!(config.refresh_ms, 1000);
        assert!(config.nvidia);
        assert_eq!(config.paths.hwmon_root, PathBuf::from("/sys/class/hwmon"));
    }

    #[test]
    fn test_wrongly_typed_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "refresh_ms": "fast" }}"#).unwrap();
        assert!(matches!(Config::load_from_file(file.path()).unwrap_err(), CoreError::Config(_)));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2]").unwrap();
        assert!(matches!(Config::load_from_file(file.path()).unwrap_err(), CoreError::Config(_)));
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let mut config = Config::default();
        config.refresh_ms = 3000;
        config.apply_cli_overrides(&CliConfig {
            refresh_ms: Some(500),
            theme: Some(Theme::Light),
            temperature_unit: Some(TemperatureUnit::Fahrenheit),
            no_gpu: true,
            ..CliConfig::default()
        });

        assert_eq!(config.refresh_ms, 500);
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.temperature_unit, TemperatureUnit::Fahrenheit);
        assert!(!config.nvidia);
    }

    #[test]
    fn test_validate_refresh_bounds() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.refresh_ms = 50;
        assert!(config.validate().is_err());

        config.refresh_ms = 20_000;
        assert!(config.validate().is_err());
    }
}
