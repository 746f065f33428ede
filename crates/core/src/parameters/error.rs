//! Parameter table errors

use core::fmt;

/// Why a parameter could not be registered or written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterError {
    UnknownParameter,
    /// Longer than a MAVLink `param_id`
    NameTooLong,
    StoreFull,
    ReadOnly,
}

impl ParameterError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownParameter => "no such parameter",
            Self::NameTooLong => "name exceeds 16 characters",
            Self::StoreFull => "parameter table full",
            Self::ReadOnly => "parameter is read-only",
        }
    }
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
