use core::f32::consts::TAU;

use rand::Rng;

use crate::error::{require_non_negative, require_positive};
use crate::{FlockError, Vector2, NEIGHBOR_EPSILON, SEPARATION_SOFTENING};

/// Stable identity of an agent across snapshots.
///
/// Two agents may share identical state, so the neighbor scan skips the
/// agent itself by id rather than by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub usize);

/// How the net force turns into an acceleration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccelerationModel {
    /// Damping is folded into the force, the force is clipped to
    /// `max_force`, then divided by mass.
    #[default]
    ForceClamped,
    /// `a = (F - c·v) / m`, then `a` is clipped to `max_acceleration`.
    MassDamper,
}

/// Physical constants and behavior gains of one agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentParams {
    pub mass: f32,
    pub damping: f32,
    pub separation_gain: f32,
    pub alignment_gain: f32,
    pub cohesion_gain: f32,
    pub wall_gain: f32,
    /// Width of the band along each wall inside which the wall spring acts.
    pub wall_margin: f32,
    /// Magnitude of the random force; zero disables it.
    pub random_gain: f32,
    pub max_force: f32,
    pub max_acceleration: f32,
    pub max_speed: f32,
    pub model: AccelerationModel,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            mass: 1.0,
            damping: 1.2,
            separation_gain: 5.0,
            alignment_gain: 30.0,
            cohesion_gain: 8.0,
            wall_gain: 5.0,
            wall_margin: 30.0,
            random_gain: 0.0,
            max_force: 800.0,
            max_acceleration: 800.0,
            max_speed: 150.0,
            model: AccelerationModel::ForceClamped,
        }
    }
}

impl AgentParams {
    /// Parameters with every interaction gain zeroed; only damping and the
    /// limits remain. Handy as a starting point for isolating one force.
    pub fn inert() -> Self {
        Self {
            separation_gain: 0.0,
            alignment_gain: 0.0,
            cohesion_gain: 0.0,
            wall_gain: 0.0,
            random_gain: 0.0,
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: AccelerationModel) -> Self {
        self.model = model;
        self
    }

    pub fn validate(&self) -> Result<(), FlockError> {
        require_positive("mass", self.mass)?;
        require_non_negative("damping", self.damping)?;
        require_non_negative("separation_gain", self.separation_gain)?;
        require_non_negative("alignment_gain", self.alignment_gain)?;
        require_non_negative("cohesion_gain", self.cohesion_gain)?;
        require_non_negative("wall_gain", self.wall_gain)?;
        require_non_negative("wall_margin", self.wall_margin)?;
        require_non_negative("random_gain", self.random_gain)?;
        require_positive("max_force", self.max_force)?;
        require_positive("max_acceleration", self.max_acceleration)?;
        require_positive("max_speed", self.max_speed)?;
        Ok(())
    }
}

/// Extent of the rectangular world `[0, width] × [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vector2 {
        Vector2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Whether a disc of `radius` at `position` lies inside the world.
    pub fn contains(&self, position: Vector2, radius: f32) -> bool {
        position.x >= radius
            && position.x <= self.width - radius
            && position.y >= radius
            && position.y <= self.height - radius
    }

    pub fn validate(&self, agent_radius: f32) -> Result<(), FlockError> {
        require_positive("width", self.width)?;
        require_positive("height", self.height)?;
        require_non_negative("agent_radius", agent_radius)?;
        if self.width < 2.0 * agent_radius || self.height < 2.0 * agent_radius {
            return Err(FlockError::WorldTooSmall {
                width: self.width,
                height: self.height,
                radius: agent_radius,
            });
        }
        Ok(())
    }
}

/// The individual force terms acting on an agent during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForceBreakdown {
    pub separation: Vector2,
    pub alignment: Vector2,
    pub cohesion: Vector2,
    pub wall: Vector2,
    pub random: Vector2,
    /// Number of agents found inside the view radius.
    pub neighbors: usize,
}

impl ForceBreakdown {
    /// Net force before damping.
    pub fn total(&self) -> Vector2 {
        self.separation + self.alignment + self.cohesion + self.wall + self.random
    }
}

/// A single flocking agent
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    id: AgentId,
    position: Vector2,
    velocity: Vector2,
    acceleration: Vector2,
    radius: f32,
    view_radius: f32,
    params: AgentParams,
}

impl Agent {
    pub fn new(id: AgentId, position: Vector2, velocity: Vector2, radius: f32, view_radius: f32) -> Self {
        Self {
            id,
            position,
            velocity,
            acceleration: Vector2::ZERO,
            radius,
            view_radius,
            params: AgentParams::default(),
        }
    }

    /// Creates an agent at `position` with a uniformly random heading and a
    /// speed drawn uniformly from `speed`.
    pub fn with_random_heading<R>(
        id: AgentId,
        position: Vector2,
        speed: (f32, f32),
        radius: f32,
        view_radius: f32,
        rng: &mut R,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        let angle = rng.gen_range(0.0..TAU);
        let magnitude = rng.gen_range(speed.0..=speed.1);
        Self::new(id, position, Vector2::from_angle(angle) * magnitude, radius, view_radius)
    }

    pub fn with_params(mut self, params: AgentParams) -> Self {
        self.params = params;
        self
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn position(&self) -> Vector2 {
        self.position
    }

    pub fn velocity(&self) -> Vector2 {
        self.velocity
    }

    pub fn acceleration(&self) -> Vector2 {
        self.acceleration
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn view_radius(&self) -> f32 {
        self.view_radius
    }

    pub fn params(&self) -> &AgentParams {
        &self.params
    }

    /// Advances this agent by one tick.
    ///
    /// `snapshot` is the state of the whole population at the start of the
    /// tick, this agent included. Only this agent is mutated.
    ///
    /// The neighbor scan is a linear pass over the snapshot, O(N) per agent
    /// and O(N²) per tick. A spatial index would slot in here by narrowing
    /// `snapshot` to the candidates around `position`.
    ///
    /// Non-finite state or a non-positive `dt` give unspecified results.
    pub fn drive<R>(&mut self, dt: f32, snapshot: &[Agent], bounds: Bounds, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let forces = self.compute_forces(snapshot, bounds, rng);
        self.integrate(&forces, dt, bounds);
    }

    /// Evaluates every force term for this tick without touching any state.
    ///
    /// Draws one angle from `rng` when the random force is enabled and none
    /// otherwise.
    pub fn compute_forces<R>(&self, snapshot: &[Agent], bounds: Bounds, rng: &mut R) -> ForceBreakdown
    where
        R: Rng + ?Sized,
    {
        let params = &self.params;
        let mut forces = ForceBreakdown::default();
        let mut velocity_sum = Vector2::ZERO;
        let mut position_sum = Vector2::ZERO;

        for other in snapshot.iter().filter(|other| other.id != self.id) {
            let offset = other.position - self.position;
            let distance = offset.norm();
            if distance >= self.view_radius {
                continue;
            }

            if distance > NEIGHBOR_EPSILON {
                let overlap = self.view_radius - distance;
                forces.separation -=
                    offset.normalize() * (params.separation_gain * overlap / (distance + SEPARATION_SOFTENING));
            }

            velocity_sum += other.velocity;
            position_sum += other.position;
            forces.neighbors += 1;
        }

        if forces.neighbors > 0 {
            let inv_count = 1.0 / forces.neighbors as f32;
            forces.alignment = (velocity_sum * inv_count - self.velocity) * params.alignment_gain;
            forces.cohesion = (position_sum * inv_count - self.position) * params.cohesion_gain;
        }

        if params.random_gain > 0.0 {
            let angle = rng.gen_range(0.0..TAU);
            forces.random = Vector2::from_angle(angle) * params.random_gain;
        }

        forces.wall = self.wall_force(bounds);
        forces
    }

    /// Applies `forces` through the configured acceleration model, then
    /// integrates with semi-implicit Euler and clamps into the world.
    pub fn integrate(&mut self, forces: &ForceBreakdown, dt: f32, bounds: Bounds) {
        let params = self.params;
        let damped = forces.total() - self.velocity * params.damping;

        let acceleration = match params.model {
            AccelerationModel::ForceClamped => damped.clamp_norm(params.max_force) / params.mass,
            AccelerationModel::MassDamper => damped / params.mass,
        };
        self.acceleration = acceleration.clamp_norm(params.max_acceleration);

        self.velocity = (self.velocity + self.acceleration * dt).clamp_norm(params.max_speed);
        self.position += self.velocity * dt;

        self.confine(bounds);
    }

    /// One-sided spring on each wall, active only within `wall_margin`.
    fn wall_force(&self, bounds: Bounds) -> Vector2 {
        let gain = self.params.wall_gain;
        let margin = self.params.wall_margin;
        let p = self.position;
        let mut force = Vector2::ZERO;

        if p.x < margin {
            force.x += gain * (margin - p.x);
        }
        if p.x > bounds.width - margin {
            force.x -= gain * (p.x - (bounds.width - margin));
        }
        if p.y < margin {
            force.y += gain * (margin - p.y);
        }
        if p.y > bounds.height - margin {
            force.y -= gain * (p.y - (bounds.height - margin));
        }

        force
    }

    /// Hard clamp of the center into `[r, W - r] × [r, H - r]`.
    fn confine(&mut self, bounds: Bounds) {
        let r = self.radius;

        if self.position.x < r {
            self.position.x = r;
        }
        if self.position.x > bounds.width - r {
            self.position.x = bounds.width - r;
        }
        if self.position.y < r {
            self.position.y = r;
        }
        if self.position.y > bounds.height - r {
            self.position.y = bounds.height - r;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const BOUNDS: Bounds = Bounds::new(500.0, 500.0);

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(0)
    }

    fn agent(id: usize, x: f32, y: f32) -> Agent {
        Agent::new(AgentId(id), Vector2::new(x, y), Vector2::ZERO, 3.0, 200.0)
    }

    #[test]
    fn test_agent_creation() {
        let a = Agent::new(AgentId(4), Vector2::new(10.0, 20.0), Vector2::new(1.0, 1.0), 3.0, 50.0);

        assert_eq!(a.id(), AgentId(4));
        assert_eq!(a.position(), Vector2::new(10.0, 20.0));
        assert_eq!(a.velocity(), Vector2::new(1.0, 1.0));
        assert_eq!(a.acceleration(), Vector2::ZERO);
        assert_eq!(a.radius(), 3.0);
        assert_eq!(a.view_radius(), 50.0);
        assert_eq!(a.params(), &AgentParams::default());
    }

    #[test]
    fn test_random_heading_speed_band() {
        let mut rng = rng();
        for i in 0..100 {
            let a = Agent::with_random_heading(AgentId(i), BOUNDS.center(), (40.0, 100.0), 3.0, 200.0, &mut rng);
            let speed = a.velocity().norm();
            assert!((40.0 - 1e-3..=100.0 + 1e-3).contains(&speed), "speed {speed}");
            assert_eq!(a.position(), BOUNDS.center());
        }
    }

    #[test]
    fn test_params_validate() {
        assert!(AgentParams::default().validate().is_ok());
        assert!(AgentParams::inert().validate().is_ok());

        let params = AgentParams {
            mass: 0.0,
            ..AgentParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(FlockError::InvalidParameter { name: "mass", .. })
        ));

        let params = AgentParams {
            cohesion_gain: -1.0,
            ..AgentParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(FlockError::InvalidParameter { name: "cohesion_gain", .. })
        ));
    }

    #[test]
    fn test_bounds_validate() {
        assert!(BOUNDS.validate(3.0).is_ok());
        assert!(matches!(
            Bounds::new(4.0, 100.0).validate(3.0),
            Err(FlockError::WorldTooSmall { .. })
        ));
        assert!(matches!(
            Bounds::new(0.0, 100.0).validate(3.0),
            Err(FlockError::InvalidParameter { name: "width", .. })
        ));
    }

    #[test]
    fn test_self_is_skipped_by_id() {
        let me = agent(0, 250.0, 250.0);
        // Same state, different identity: counts as a neighbor.
        let twin = Agent {
            id: AgentId(1),
            ..me.clone()
        };

        let alone = me.compute_forces(&[me.clone()], BOUNDS, &mut rng());
        assert_eq!(alone.neighbors, 0);

        let paired = me.compute_forces(&[me.clone(), twin], BOUNDS, &mut rng());
        assert_eq!(paired.neighbors, 1);
        // Coincident neighbors exert no separation.
        assert_eq!(paired.separation, Vector2::ZERO);
    }

    #[test]
    fn test_lone_agent_has_no_flocking_forces() {
        let me = agent(0, 250.0, 250.0);
        let far = agent(1, 250.0, 460.0);

        let forces = me.compute_forces(&[me.clone(), far], BOUNDS, &mut rng());
        assert_eq!(forces.neighbors, 0);
        assert_eq!(forces.separation, Vector2::ZERO);
        assert_eq!(forces.alignment, Vector2::ZERO);
        assert_eq!(forces.cohesion, Vector2::ZERO);
    }

    #[test]
    fn test_separation_points_away() {
        let me = agent(0, 250.0, 250.0).with_params(AgentParams {
            separation_gain: 5.0,
            ..AgentParams::inert()
        });
        let right = agent(1, 260.0, 250.0);

        let forces = me.compute_forces(&[me.clone(), right], BOUNDS, &mut rng());
        assert!(forces.separation.x < 0.0);
        assert!(forces.separation.y.abs() < 1e-6);
        let expected = 5.0 * (200.0 - 10.0) / (10.0 + SEPARATION_SOFTENING);
        assert!((forces.separation.norm() - expected).abs() < 1e-2);
    }

    #[test]
    fn test_alignment_and_cohesion() {
        let me = agent(0, 250.0, 250.0);
        let other = Agent::new(AgentId(1), Vector2::new(270.0, 250.0), Vector2::new(10.0, 0.0), 3.0, 200.0);

        let forces = me.compute_forces(&[me.clone(), other], BOUNDS, &mut rng());
        assert_eq!(forces.neighbors, 1);
        assert_eq!(forces.alignment, Vector2::new(10.0 * 30.0, 0.0));
        assert_eq!(forces.cohesion, Vector2::new(20.0 * 8.0, 0.0));
    }

    #[test]
    fn test_wall_force_inside_margin() {
        let params = AgentParams {
            wall_gain: 5.0,
            ..AgentParams::inert()
        };
        let near_left = agent(0, 10.0, 250.0).with_params(params);
        let forces = near_left.compute_forces(&[], BOUNDS, &mut rng());
        assert_eq!(forces.wall, Vector2::new(5.0 * 20.0, 0.0));

        let near_corner = agent(0, 490.0, 480.0).with_params(params);
        let forces = near_corner.compute_forces(&[], BOUNDS, &mut rng());
        assert_eq!(forces.wall, Vector2::new(-5.0 * 20.0, -5.0 * 10.0));

        let interior = agent(0, 250.0, 250.0).with_params(params);
        let forces = interior.compute_forces(&[], BOUNDS, &mut rng());
        assert_eq!(forces.wall, Vector2::ZERO);
    }

    #[test]
    fn test_random_force_magnitude() {
        let me = agent(0, 250.0, 250.0).with_params(AgentParams {
            random_gain: 12.0,
            ..AgentParams::inert()
        });
        let mut rng = rng();
        for _ in 0..20 {
            let forces = me.compute_forces(&[], BOUNDS, &mut rng);
            assert!((forces.random.norm() - 12.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_disabled_random_force_draws_nothing() {
        let me = agent(0, 250.0, 250.0);
        let mut used = rng();
        let _ = me.compute_forces(&[], BOUNDS, &mut used);

        let mut fresh = rng();
        assert_eq!(used.gen::<u64>(), fresh.gen::<u64>());
    }

    #[test]
    fn test_mass_damper_decays_free_velocity() {
        let params = AgentParams::inert().with_model(AccelerationModel::MassDamper);
        let mut a = Agent::new(AgentId(0), BOUNDS.center(), Vector2::new(100.0, 0.0), 3.0, 200.0).with_params(params);

        a.drive(0.01, &[], BOUNDS, &mut rng());

        assert!((a.acceleration().x + 120.0).abs() < 1e-3);
        assert!((a.velocity().x - 98.8).abs() < 1e-3);
        assert!((a.position().x - (250.0 + 0.988)).abs() < 1e-3);
    }

    #[test]
    fn test_force_clamped_limits_force() {
        let params = AgentParams {
            mass: 2.0,
            max_force: 10.0,
            max_acceleration: 1000.0,
            ..AgentParams::inert()
        };
        let mut a = agent(0, 250.0, 250.0).with_params(params);
        let forces = ForceBreakdown {
            wall: Vector2::new(100.0, 0.0),
            ..ForceBreakdown::default()
        };

        a.integrate(&forces, 0.01, BOUNDS);

        // 100 clipped to 10, divided by a mass of 2.
        assert!((a.acceleration().x - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_mass_damper_limits_acceleration() {
        let params = AgentParams {
            max_acceleration: 50.0,
            ..AgentParams::inert().with_model(AccelerationModel::MassDamper)
        };
        let mut a = agent(0, 250.0, 250.0).with_params(params);
        let forces = ForceBreakdown {
            cohesion: Vector2::new(0.0, 1e4),
            ..ForceBreakdown::default()
        };

        a.integrate(&forces, 0.01, BOUNDS);

        assert!(a.acceleration().norm() <= 50.0 + 1e-4);
        assert!((a.acceleration().y - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_speed_is_capped() {
        let params = AgentParams {
            max_speed: 20.0,
            ..AgentParams::inert()
        };
        let mut a = Agent::new(AgentId(0), BOUNDS.center(), Vector2::new(500.0, 500.0), 3.0, 200.0).with_params(params);

        a.drive(0.01, &[], BOUNDS, &mut rng());

        assert!(a.velocity().norm() <= 20.0 + 1e-4);
    }

    #[test]
    fn test_boundary_clamp_from_origin() {
        let world = Bounds::new(100.0, 100.0);
        for velocity in [Vector2::new(-30.0, -40.0), Vector2::ZERO, Vector2::new(10.0, -100.0)] {
            let mut a = Agent::new(AgentId(0), Vector2::ZERO, velocity, 5.0, 50.0);
            a.drive(0.01, &[], world, &mut rng());
            assert!(a.position().x >= 5.0);
            assert!(a.position().y >= 5.0);
            assert!(world.contains(a.position(), 5.0));
        }
    }

    #[test]
    fn test_boundary_clamp_far_side() {
        let world = Bounds::new(100.0, 100.0);
        let mut a = Agent::new(AgentId(0), Vector2::new(100.0, 100.0), Vector2::new(150.0, 150.0), 5.0, 50.0);
        a.drive(0.1, &[], world, &mut rng());
        assert_eq!(a.position(), Vector2::new(95.0, 95.0));
    }
}
