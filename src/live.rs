use log::debug;

use crate::device::DeviceTransport;
use crate::error::{DeviceFlagsError, Result};

pub const DEVICE_CONFIG_GET_CMD: &str = "device_config get";

/// What `device_config get` prints when no override is set.
pub const NULL_SENTINEL: &str = "null";

/// Reads runtime overrides from the device_config store. Nothing is cached.
pub struct LiveOverrideClient<'a, T: ?Sized> {
    transport: &'a T,
}

impl<'a, T: DeviceTransport + ?Sized> LiveOverrideClient<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// Raw, trimmed output of `device_config get <namespace> <name>`.
    /// May be [`NULL_SENTINEL`].
    pub fn get_live_value(&self, namespace: &str, name: &str) -> Result<String> {
        let command = format!("{} {} {}", DEVICE_CONFIG_GET_CMD, namespace, name);
        let output = self.transport.shell(&command)?;
        let value = String::from_utf8(output)
            .map_err(|_| DeviceFlagsError::transport(&command, "output is not valid UTF-8"))?;
        let value = value.trim().to_string();
        debug!("{} -> {}", command, value);
        Ok(value)
    }
}

pub fn is_unset(value: &str) -> bool {
    value == NULL_SENTINEL
}
