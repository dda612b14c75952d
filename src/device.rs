use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use log::debug;

use crate::error::{DeviceFlagsError, Result};

/// The two device primitives flag resolution needs. Both block until the
/// device answers.
pub trait DeviceTransport {
    /// Copy `remote` from the device to `local` on the host.
    fn pull(&self, remote: &str, local: &Path) -> Result<()>;

    /// Run `command` in a device shell and return its raw stdout.
    fn shell(&self, command: &str) -> Result<Vec<u8>>;
}

impl<T: DeviceTransport + ?Sized> DeviceTransport for &T {
    fn pull(&self, remote: &str, local: &Path) -> Result<()> {
        (**self).pull(remote, local)
    }

    fn shell(&self, command: &str) -> Result<Vec<u8>> {
        (**self).shell(command)
    }
}

impl<T: DeviceTransport + ?Sized> DeviceTransport for Box<T> {
    fn pull(&self, remote: &str, local: &Path) -> Result<()> {
        (**self).pull(remote, local)
    }

    fn shell(&self, command: &str) -> Result<Vec<u8>> {
        (**self).shell(command)
    }
}

/// Talks to a device through the `adb` binary.
#[derive(Debug, Clone)]
pub struct AdbTransport {
    adb: PathBuf,
    serial: Option<String>,
}

impl AdbTransport {
    pub fn new(adb: impl Into<PathBuf>, serial: Option<String>) -> Self {
        Self {
            adb: adb.into(),
            serial,
        }
    }

    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    fn base_args(&self) -> Vec<String> {
        match &self.serial {
            Some(serial) => vec!["-s".to_string(), serial.clone()],
            None => Vec::new(),
        }
    }

    fn run(&self, args: &[String]) -> Result<Output> {
        let mut all = self.base_args();
        all.extend_from_slice(args);
        let rendered = format!("{} {}", self.adb.display(), all.join(" "));
        debug!("running {}", rendered);

        let output = Command::new(&self.adb)
            .args(&all)
            .output()
            .map_err(|e| DeviceFlagsError::transport(&rendered, e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DeviceFlagsError::transport(
                rendered,
                format!("{} ({})", stderr.trim(), output.status),
            ));
        }
        Ok(output)
    }
}

impl Default for AdbTransport {
    fn default() -> Self {
        Self::new("adb", None)
    }
}

impl DeviceTransport for AdbTransport {
    fn pull(&self, remote: &str, local: &Path) -> Result<()> {
        self.run(&[
            "pull".to_string(),
            remote.to_string(),
            local.display().to_string(),
        ])?;
        Ok(())
    }

    fn shell(&self, command: &str) -> Result<Vec<u8>> {
        Ok(self.run(&["shell".to_string(), command.to_string()])?.stdout)
    }
}
