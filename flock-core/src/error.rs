use thiserror::Error;

/// Errors reported by the validating constructors and `try_` operations.
///
/// The unchecked `Flock::new` / `step` paths never return these; they treat
/// bad input as a precondition violation instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlockError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
    #[error("flock population must be non-zero")]
    EmptyPopulation,
    #[error("time step must be finite and positive, got {0}")]
    InvalidTimeStep(f32),
    #[error("world {width}x{height} cannot hold agents of radius {radius}")]
    WorldTooSmall { width: f32, height: f32, radius: f32 },
    #[error("agent id {0} appears more than once")]
    DuplicateAgent(usize),
    #[error("flock capacity of {0} agents exceeded")]
    CapacityExceeded(usize),
}

impl FlockError {
    pub(crate) fn invalid(name: &'static str, reason: &'static str) -> Self {
        Self::InvalidParameter { name, reason }
    }
}

/// Checks a value that must be finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f32) -> Result<(), FlockError> {
    if !value.is_finite() {
        Err(FlockError::invalid(name, "must be finite"))
    } else if value <= 0.0 {
        Err(FlockError::invalid(name, "must be positive"))
    } else {
        Ok(())
    }
}

/// Checks a value that must be finite and not negative.
pub(crate) fn require_non_negative(name: &'static str, value: f32) -> Result<(), FlockError> {
    if !value.is_finite() {
        Err(FlockError::invalid(name, "must be finite"))
    } else if value < 0.0 {
        Err(FlockError::invalid(name, "must not be negative"))
    } else {
        Ok(())
    }
}
