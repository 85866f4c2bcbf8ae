//! Errors returned by registry lookups.

use alloc::string::String;

use crate::flags::GmeType;

/// Error returned when a file cannot be matched to a usable format.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum GmeError {
    /// Header bytes match no known signature.
    #[error("unrecognized music file header")]
    UnrecognizedFormat,
    /// File extension matches no known format.
    #[error("unknown file extension `{0}`")]
    UnknownExtension(String),
    /// Format recognized but its emulator was not compiled in.
    #[error("format {0} not supported (emulator not compiled in, enable {def})", def = .0.define())]
    UnsupportedFormat(GmeType),
    /// Format compiled in but disabled in the registry.
    #[error("format {0} is disabled in the format registry")]
    DisabledFormat(GmeType),
}
