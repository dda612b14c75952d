use core::fmt;

/// Identity of a flag: its namespace plus its qualified name.
///
/// For compiled (aconfig) flags the qualified name is `{package}.{name}`;
/// for plain device_config flags it is the bare key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlagKey {
    pub namespace: String,
    pub qualified_name: String,
}

impl FlagKey {
    pub fn new(namespace: impl Into<String>, qualified_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            qualified_name: qualified_name.into(),
        }
    }
}

impl fmt::Display for FlagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.qualified_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagState {
    Enabled,
    Disabled,
}

impl FlagState {
    /// Accepts the enum literal or its wire number.
    pub fn from_textproto(value: &str) -> Option<Self> {
        match value {
            "ENABLED" | "1" => Some(FlagState::Enabled),
            "DISABLED" | "2" => Some(FlagState::Disabled),
            _ => None,
        }
    }

    /// The string a flag in this state resolves to.
    pub fn as_value(self) -> &'static str {
        match self {
            FlagState::Enabled => "true",
            FlagState::Disabled => "false",
        }
    }
}

impl fmt::Display for FlagState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagState::Enabled => write!(f, "ENABLED"),
            FlagState::Disabled => write!(f, "DISABLED"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagPermission {
    ReadOnly,
    ReadWrite,
}

impl FlagPermission {
    pub fn from_textproto(value: &str) -> Option<Self> {
        match value {
            "READ_ONLY" | "1" => Some(FlagPermission::ReadOnly),
            "READ_WRITE" | "2" => Some(FlagPermission::ReadWrite),
            _ => None,
        }
    }
}

impl fmt::Display for FlagPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagPermission::ReadOnly => write!(f, "READ_ONLY"),
            FlagPermission::ReadWrite => write!(f, "READ_WRITE"),
        }
    }
}

/// One `parsed_flag` entry of a partition's flag document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFlagRecord {
    pub namespace: String,
    pub package: String,
    pub name: String,
    pub state: FlagState,
    pub permission: FlagPermission,
}

impl ParsedFlagRecord {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.package, self.name)
    }

    pub fn key(&self) -> FlagKey {
        FlagKey::new(self.namespace.clone(), self.qualified_name())
    }

    pub fn value(&self) -> &'static str {
        self.state.as_value()
    }

    pub fn is_read_only(&self) -> bool {
        self.permission == FlagPermission::ReadOnly
    }
}

pub const ACONFIG_TEXTPROTO_FILE: &str = "aconfig_flags.textproto";

/// Device partitions that may carry a flag document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Product,
    System,
    SystemExt,
    Vendor,
}

impl Partition {
    /// Fetch order. On key collisions the later partition wins.
    pub const ALL: [Partition; 4] = [
        Partition::Product,
        Partition::System,
        Partition::SystemExt,
        Partition::Vendor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Partition::Product => "product",
            Partition::System => "system",
            Partition::SystemExt => "system_ext",
            Partition::Vendor => "vendor",
        }
    }

    pub fn device_path(self) -> String {
        format!("/{}/etc/{}", self.name(), ACONFIG_TEXTPROTO_FILE)
    }

    pub fn local_file_name(self) -> String {
        format!("{}_{}", self.name(), ACONFIG_TEXTPROTO_FILE)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_paths() {
        assert_eq!(
            Partition::SystemExt.device_path(),
            "/system_ext/etc/aconfig_flags.textproto"
        );
        assert_eq!(
            Partition::Vendor.local_file_name(),
            "vendor_aconfig_flags.textproto"
        );
    }

    #[test]
    fn test_record_key() {
        let record = ParsedFlagRecord {
            namespace: "core_experiments".into(),
            package: "com.android.foo".into(),
            name: "new_ui".into(),
            state: FlagState::Disabled,
            permission: FlagPermission::ReadWrite,
        };
        assert_eq!(record.key().to_string(), "core_experiments/com.android.foo.new_ui");
        assert_eq!(record.value(), "false");
        assert!(!record.is_read_only());
    }

    #[test]
    fn test_enum_literals() {
        assert_eq!(FlagState::from_textproto("2"), Some(FlagState::Disabled));
        assert_eq!(FlagState::from_textproto("enabled"), None);
        assert_eq!(
            FlagPermission::from_textproto("READ_ONLY"),
            Some(FlagPermission::ReadOnly)
        );
    }
}
