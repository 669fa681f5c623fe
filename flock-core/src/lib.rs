#![cfg_attr(not(feature = "std"), no_std)]

//! Flocking simulation core.
//!
//! Agents are point masses driven by separation, alignment and cohesion
//! forces from their neighbors, a soft wall spring, an optional random
//! perturbation and a velocity damper. Every tick reads an immutable
//! snapshot of the population so that update order never leaks into the
//! result.

mod agent;
mod error;
mod fixed;
#[cfg(feature = "std")]
mod flock;
mod vector;

pub use agent::{AccelerationModel, Agent, AgentId, AgentParams, Bounds, ForceBreakdown};
pub use error::FlockError;
pub use fixed::FixedFlock;
#[cfg(feature = "std")]
pub use flock::{Flock, FlockConfig};
pub use vector::Vector2;

/// Below this length a vector has no meaningful direction.
pub const NORMALIZE_EPSILON: f32 = 1e-6;

/// Neighbors closer than this exert no separation force.
pub const NEIGHBOR_EPSILON: f32 = 1e-4;

/// Added to the neighbor distance in the separation denominator.
pub const SEPARATION_SOFTENING: f32 = 1e-3;

/// Added to the measured magnitude when rescaling a clamped vector.
pub const CLAMP_EPSILON: f32 = 1e-6;

/// Step shared by every flock container: each agent is driven against the
/// same pre-tick snapshot.
pub(crate) fn advance<R>(agents: &mut [Agent], snapshot: &[Agent], dt: f32, bounds: Bounds, rng: &mut R)
where
    R: rand::Rng + ?Sized,
{
    for agent in agents.iter_mut() {
        agent.drive(dt, snapshot, bounds, rng);
    }
}

pub(crate) fn check_time_step(dt: f32) -> Result<(), FlockError> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(FlockError::InvalidTimeStep(dt))
    }
}

pub(crate) mod math {
    #[inline]
    pub fn sqrtf(value: f32) -> f32 {
        #[cfg(feature = "std")]
        {
            value.sqrt()
        }
        #[cfg(not(feature = "std"))]
        {
            libm::sqrtf(value)
        }
    }

    #[inline]
    pub fn sin_cos(angle: f32) -> (f32, f32) {
        #[cfg(feature = "std")]
        {
            angle.sin_cos()
        }
        #[cfg(not(feature = "std"))]
        {
            (libm::sinf(angle), libm::cosf(angle))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_time_step() {
        assert!(check_time_step(0.01).is_ok());
        assert!(matches!(check_time_step(0.0), Err(FlockError::InvalidTimeStep(_))));
        assert!(matches!(check_time_step(-1.0), Err(FlockError::InvalidTimeStep(_))));
        assert!(matches!(check_time_step(f32::NAN), Err(FlockError::InvalidTimeStep(_))));
        assert!(matches!(check_time_step(f32::INFINITY), Err(FlockError::InvalidTimeStep(_))));
    }

    #[test]
    fn test_math_helpers() {
        assert_eq!(math::sqrtf(25.0), 5.0);
        let (sin, cos) = math::sin_cos(0.0);
        assert_eq!(sin, 0.0);
        assert_eq!(cos, 1.0);
    }
}
