use std::env;

use serde::Deserialize;

/// Top-level devflags.toml configuration
#[derive(Debug, Deserialize, Default)]
pub struct DevflagsConfig {
    #[serde(default)]
    pub device: DeviceConfig,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct DeviceConfig {
    pub serial: Option<String>,
    pub adb: Option<String>,
    pub scratch_dir: Option<String>,
}

/// Final device settings after CLI > env > file > default resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDevice {
    pub adb: String,
    pub serial: Option<String>,
    pub scratch_dir: Option<String>,
}

fn default_adb() -> String {
    "adb".to_string()
}

impl DevflagsConfig {
    /// Load configuration from a TOML file, falling back to defaults if the file
    /// doesn't exist or cannot be parsed.
    pub fn load(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: failed to parse {}: {}", path, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // ANDROID_SERIAL is what adb itself honours
        if let Some(val) = lookup("ANDROID_SERIAL").filter(|v| !v.is_empty()) {
            self.device.serial = Some(val);
        }
        if let Some(val) = lookup("DEVFLAGS_ADB").filter(|v| !v.is_empty()) {
            self.device.adb = Some(val);
        }
        if let Some(val) = lookup("DEVFLAGS_SCRATCH_DIR").filter(|v| !v.is_empty()) {
            self.device.scratch_dir = Some(val);
        }
    }

    pub fn resolve(&self, serial_arg: Option<&str>, adb_arg: Option<&str>) -> ResolvedDevice {
        ResolvedDevice {
            adb: adb_arg
                .map(String::from)
                .or_else(|| self.device.adb.clone())
                .unwrap_or_else(default_adb),
            serial: serial_arg
                .map(String::from)
                .or_else(|| self.device.serial.clone()),
            scratch_dir: self.device.scratch_dir.clone(),
        }
    }
}
