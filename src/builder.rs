use std::path::PathBuf;

use crate::device::AdbTransport;
use crate::session::DeviceFlags;

pub struct DeviceFlagsBuilder {
    adb: PathBuf,
    serial: Option<String>,
    scratch_dir: Option<PathBuf>,
}

pub fn create_builder() -> DeviceFlagsBuilder {
    DeviceFlagsBuilder {
        adb: "adb".into(),
        serial: None,
        scratch_dir: None,
    }
}

impl DeviceFlagsBuilder {
    /// Path to the `adb` binary. Defaults to `adb` on `PATH`.
    pub fn adb(mut self, path: impl Into<PathBuf>) -> Self {
        self.adb = path.into();
        self
    }

    /// Device serial, passed as `adb -s`. Without one adb picks its default device.
    pub fn serial(mut self, serial: &str) -> Self {
        self.serial = Some(serial.to_string());
        self
    }

    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> DeviceFlags<AdbTransport> {
        let flags = DeviceFlags::new(AdbTransport::new(self.adb, self.serial));
        match self.scratch_dir {
            Some(dir) => flags.with_scratch_dir(dir),
            None => flags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_passes_serial_to_transport() {
        let flags = create_builder().adb("/opt/platform-tools/adb").serial("DEV00001").build();
        assert_eq!(flags.transport().serial(), Some("DEV00001"));
    }

    #[test]
    fn test_default_builder_has_no_serial() {
        assert_eq!(create_builder().build().transport().serial(), None);
    }

    #[test]
    fn test_unreachable_adb_fails_load() {
        let scratch = tempfile::tempdir().unwrap();
        let flags = create_builder()
            .adb("/nonexistent/adb")
            .scratch_dir(scratch.path())
            .build();
        assert!(flags.get_value("sample", "flag").is_err());
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }
}
