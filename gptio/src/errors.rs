// SPDX-License-Identifier: MIT

use core::fmt;

/// Result type for BlockIO operations.
pub type BlockIOResult<T = ()> = core::result::Result<T, BlockIOError>;

/// Error type for BlockIO operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockIOError {
    /// Fewer bytes were available than requested.
    UnexpectedEof,
    /// Seek or read outside the device.
    OutOfBounds,
    Unsupported,
    /// Error reported by the host I/O layer.
    #[cfg(feature = "std")]
    Io(std::io::ErrorKind),
    Other(&'static str),
}

impl BlockIOError {
    pub fn msg(&self) -> &'static str {
        match self {
            BlockIOError::UnexpectedEof => "Unexpected end of device",
            BlockIOError::OutOfBounds => "Out of bounds",
            BlockIOError::Unsupported => "Unsupported operation",
            #[cfg(feature = "std")]
            BlockIOError::Io(_) => "Device I/O error",
            BlockIOError::Other(msg) => msg,
        }
    }
}

impl From<&'static str> for BlockIOError {
    #[inline]
    fn from(msg: &'static str) -> Self {
        BlockIOError::Other(msg)
    }
}

impl fmt::Display for BlockIOError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "std")]
            BlockIOError::Io(kind) => write!(f, "{}: {}", self.msg(), kind),
            _ => write!(f, "{}", self.msg()),
        }
    }
}

impl core::error::Error for BlockIOError {}
