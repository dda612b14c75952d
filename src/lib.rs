pub mod ast;
pub mod builder;
pub mod device;
pub mod error;
pub mod fetch;
pub mod flag;
pub mod index;
pub mod live;
pub mod parse;
pub mod parse_flags;
pub mod session;

pub use device::{AdbTransport, DeviceTransport};
pub use error::{DeviceFlagsError, Result};
pub use flag::{FlagKey, FlagPermission, FlagState, ParsedFlagRecord, Partition};
pub use index::SnapshotIndex;
pub use live::{LiveOverrideClient, NULL_SENTINEL};
pub use parse_flags::parse_flags;
pub use session::DeviceFlags;

/// Returns a builder for a session against a device reached through `adb`.
///
/// # Examples
/// ```no_run
/// let flags = deviceflags_lib::init().serial("DEV00001").build();
///
/// // aconfig flags are addressed as `{package}.{name}`
/// let enabled = flags.get_bool("core_experiments", "com.android.foo.new_ui")?;
///
/// // plain device_config keys work too
/// let timeout = flags.get_value("netd_native", "dns_timeout_ms")?;
/// # Ok::<(), deviceflags_lib::DeviceFlagsError>(())
/// ```
pub fn init() -> builder::DeviceFlagsBuilder {
    builder::create_builder()
}
