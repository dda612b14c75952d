use thiserror::Error;

/// Everything that can go wrong while resolving a flag.
///
/// Cloneable so a failed snapshot load can be replayed to every caller of
/// the same session.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeviceFlagsError {
    #[error("`{command}` failed: {message}")]
    Transport { command: String, message: String },
    #[error("failed to parse {origin}: {message}")]
    Parse { origin: String, message: String },
    #[error(
        "flag {namespace}/{name} is not a boolean (value: {})",
        .value.as_deref().unwrap_or("<absent>")
    )]
    InvalidFlagType {
        namespace: String,
        name: String,
        value: Option<String>,
    },
    #[error("{context}: {message}")]
    Io { context: String, message: String },
}

impl DeviceFlagsError {
    pub(crate) fn transport(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            command: command.into(),
            message: message.into(),
        }
    }

    pub(crate) fn parse(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            origin: origin.into(),
            message: message.into(),
        }
    }

    pub(crate) fn io(context: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DeviceFlagsError>;
