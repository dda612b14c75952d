use std::path::PathBuf;
use std::sync::OnceLock;

use log::trace;

use crate::device::DeviceTransport;
use crate::error::{DeviceFlagsError, Result};
use crate::fetch::fetch_snapshot;
use crate::index::SnapshotIndex;
use crate::live::{is_unset, LiveOverrideClient};

/// Flag values of one connected device.
///
/// The aconfig snapshot is pulled on the first query and kept for the life
/// of the session. Concurrent first queries share a single load, and a
/// failed load is reported to every later caller rather than retried.
/// Live device_config values are queried fresh every time.
pub struct DeviceFlags<T> {
    transport: T,
    scratch_dir: Option<PathBuf>,
    snapshot: OnceLock<Result<SnapshotIndex>>,
}

impl<T: DeviceTransport> DeviceFlags<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            scratch_dir: None,
            snapshot: OnceLock::new(),
        }
    }

    /// Pulled documents go under `dir` instead of the system temp directory.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// A session whose snapshot is already known; nothing is ever pulled.
    pub fn with_snapshot(transport: T, index: SnapshotIndex) -> Self {
        let snapshot = OnceLock::new();
        let _ = snapshot.set(Ok(index));
        Self {
            transport,
            scratch_dir: None,
            snapshot,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The aconfig snapshot, loading it on first use.
    pub fn snapshot(&self) -> Result<&SnapshotIndex> {
        self.snapshot
            .get_or_init(|| fetch_snapshot(&self.transport, self.scratch_dir.as_deref()))
            .as_ref()
            .map_err(|e| e.clone())
    }

    /// Gets the value of a flag as a string, e.g. `"true"` or `"3"`.
    ///
    /// For aconfig flags `name` is `{package}.{name}`; for device_config
    /// flags it is the bare key.
    ///
    /// A READ_ONLY aconfig flag is answered from the snapshot alone. Anything
    /// else asks device_config, falling back to the snapshot when no override
    /// is set. `None` means neither source knows the flag.
    pub fn get_value(&self, namespace: &str, name: &str) -> Result<Option<String>> {
        let compiled = self.snapshot()?.lookup(namespace, name);
        if let Some(record) = compiled {
            if record.is_read_only() {
                trace!("{namespace}/{name}: read-only, {}", record.value());
                return Ok(Some(record.value().to_string()));
            }
        }

        let live = LiveOverrideClient::new(&self.transport).get_live_value(namespace, name)?;
        if !is_unset(&live) {
            trace!("{namespace}/{name}: device_config override {live}");
            return Ok(Some(live));
        }
        Ok(compiled.map(|record| record.value().to_string()))
    }

    /// Gets the value of a flag as a boolean. Only `true` and `false`
    /// (any case) are accepted; anything else, including an unknown flag,
    /// is [`DeviceFlagsError::InvalidFlagType`].
    pub fn get_bool(&self, namespace: &str, name: &str) -> Result<bool> {
        let value = self.get_value(namespace, name)?;
        match value.as_deref().map(str::to_lowercase).as_deref() {
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            _ => Err(DeviceFlagsError::InvalidFlagType {
                namespace: namespace.to_string(),
                name: name.to_string(),
                value,
            }),
        }
    }
}
