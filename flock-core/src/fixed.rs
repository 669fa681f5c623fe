use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::error::require_non_negative;
use crate::{advance, check_time_step, Agent, AgentId, AgentParams, Bounds, FlockError};

/// A flock of at most `N` agents stored inline, for targets without an
/// allocator.
///
/// Unlike [`Flock`](crate::Flock) there is no entropy source here, so the
/// seed is mandatory.
pub struct FixedFlock<const N: usize> {
    agents: heapless::Vec<Agent, N>,
    bounds: Bounds,
    rng: SmallRng,
    tick: u64,
}

impl<const N: usize> FixedFlock<N> {
    pub fn new(bounds: Bounds, seed: u64) -> Self {
        Self {
            agents: heapless::Vec::new(),
            bounds,
            rng: SmallRng::seed_from_u64(seed),
            tick: 0,
        }
    }

    pub fn add_agent(&mut self, agent: Agent) -> Result<(), FlockError> {
        if self.agents.iter().any(|existing| existing.id() == agent.id()) {
            return Err(FlockError::DuplicateAgent(agent.id().0));
        }
        self.bounds.validate(agent.radius())?;
        agent.params().validate()?;
        self.agents.push(agent).map_err(|_| FlockError::CapacityExceeded(N))
    }

    /// Spawns `count` agents at the world center with random headings,
    /// numbered after the highest id already present.
    ///
    /// Either every agent is added or the flock is left untouched.
    pub fn populate(
        &mut self,
        count: usize,
        agent_radius: f32,
        view_radius: f32,
        params: AgentParams,
        initial_speed: (f32, f32),
    ) -> Result<(), FlockError> {
        if count > N - self.agents.len() {
            return Err(FlockError::CapacityExceeded(N));
        }
        self.bounds.validate(agent_radius)?;
        params.validate()?;
        require_non_negative("view_radius", view_radius)?;
        require_non_negative("initial_speed.min", initial_speed.0)?;
        require_non_negative("initial_speed.max", initial_speed.1)?;
        if initial_speed.0 > initial_speed.1 {
            return Err(FlockError::invalid("initial_speed", "min must not exceed max"));
        }

        let first = self.agents.iter().map(|agent| agent.id().0 + 1).max().unwrap_or(0);
        let center = self.bounds.center();
        for id in first..first + count {
            let agent = Agent::with_random_heading(AgentId(id), center, initial_speed, agent_radius, view_radius, &mut self.rng)
                .with_params(params);
            self.agents.push(agent).map_err(|_| FlockError::CapacityExceeded(N))?;
        }
        Ok(())
    }

    /// Advances every agent by `dt` against one shared pre-tick snapshot.
    pub fn step(&mut self, dt: f32) {
        let snapshot = self.agents.clone();
        advance(&mut self.agents, &snapshot, dt, self.bounds, &mut self.rng);
        self.tick += 1;
    }

    pub fn try_step(&mut self, dt: f32) -> Result<(), FlockError> {
        check_time_step(dt)?;
        self.step(dt);
        Ok(())
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }
}
