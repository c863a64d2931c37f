use std::fmt;

/// Failures surfaced by render targets and devices.
///
/// None of these are fatal to the host: a failed allocation leaves the target
/// empty (non-renderable) until a valid size is supplied again.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetError {
    /// Texture or command-buffer creation failed, or the size was degenerate.
    AllocationFailure { reason: String },
    /// A transform input was rejected (non-positive or non-finite).
    InvalidParameter { name: &'static str, value: f32 },
    /// The operation needs a color buffer and the target has none.
    NoActiveSession,
    /// Copying the color buffer back to the CPU failed.
    ReadbackFailure { reason: String },
}

impl TargetError {
    pub(crate) fn allocation(reason: impl Into<String>) -> Self {
        Self::AllocationFailure { reason: reason.into() }
    }

    pub(crate) fn readback(reason: impl Into<String>) -> Self {
        Self::ReadbackFailure { reason: reason.into() }
    }
}

impl fmt::Display for TargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailure { reason } => write!(f, "allocation failed: {reason}"),
            Self::InvalidParameter { name, value } => {
                write!(f, "invalid {name}: {value}")
            }
            Self::NoActiveSession => f.write_str("render target has no color buffer"),
            Self::ReadbackFailure { reason } => write!(f, "readback failed: {reason}"),
        }
    }
}

impl std::error::Error for TargetError {}
