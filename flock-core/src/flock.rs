use std::collections::HashSet;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::error::require_non_negative;
use crate::{advance, check_time_step, Agent, AgentId, AgentParams, Bounds, FlockError, Vector2};

/// Everything needed to build a [`Flock`].
#[derive(Debug, Clone, PartialEq)]
pub struct FlockConfig {
    pub population: usize,
    pub bounds: Bounds,
    pub agent_radius: f32,
    pub view_radius: f32,
    pub params: AgentParams,
    /// Inclusive band the initial speed is drawn from.
    pub initial_speed: (f32, f32),
    /// Seed for the flock's random source; `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            population: 10,
            bounds: Bounds::new(500.0, 500.0),
            agent_radius: 3.0,
            view_radius: 200.0,
            params: AgentParams::default(),
            initial_speed: (40.0, 100.0),
            seed: None,
        }
    }
}

impl FlockConfig {
    pub fn new(population: usize, width: f32, height: f32, agent_radius: f32, view_radius: f32) -> Self {
        Self {
            population,
            bounds: Bounds::new(width, height),
            agent_radius,
            view_radius,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), FlockError> {
        if self.population == 0 {
            return Err(FlockError::EmptyPopulation);
        }
        self.bounds.validate(self.agent_radius)?;
        require_non_negative("view_radius", self.view_radius)?;
        require_non_negative("initial_speed.min", self.initial_speed.0)?;
        require_non_negative("initial_speed.max", self.initial_speed.1)?;
        if self.initial_speed.0 > self.initial_speed.1 {
            return Err(FlockError::invalid("initial_speed", "min must not exceed max"));
        }
        self.params.validate()
    }

    fn rng(&self) -> SmallRng {
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        }
    }
}

/// A fixed population of agents advanced in lockstep.
#[derive(Debug, Clone)]
pub struct Flock {
    agents: Vec<Agent>,
    bounds: Bounds,
    rng: SmallRng,
    tick: u64,
}

impl Flock {
    /// Spawns `n` agents with default parameters at the world center, each
    /// with a random heading and speed.
    ///
    /// Inputs are not checked; use [`Flock::from_config`] to reject bad
    /// extents or radii up front.
    pub fn new(n: usize, width: f32, height: f32, agent_radius: f32, view_radius: f32) -> Self {
        Self::spawn(&FlockConfig::new(n, width, height, agent_radius, view_radius))
    }

    pub fn from_config(config: &FlockConfig) -> Result<Self, FlockError> {
        config.validate()?;
        Ok(Self::spawn(config))
    }

    /// Builds a flock from explicitly placed agents.
    pub fn from_agents(agents: Vec<Agent>, bounds: Bounds, seed: Option<u64>) -> Result<Self, FlockError> {
        if agents.is_empty() {
            return Err(FlockError::EmptyPopulation);
        }

        let mut seen = HashSet::with_capacity(agents.len());
        for agent in &agents {
            if !seen.insert(agent.id()) {
                return Err(FlockError::DuplicateAgent(agent.id().0));
            }
            bounds.validate(agent.radius())?;
            agent.params().validate()?;
        }

        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        Ok(Self {
            agents,
            bounds,
            rng,
            tick: 0,
        })
    }

    fn spawn(config: &FlockConfig) -> Self {
        let mut rng = config.rng();
        let center = config.bounds.center();

        let agents = (0..config.population)
            .map(|i| {
                Agent::with_random_heading(
                    AgentId(i),
                    center,
                    config.initial_speed,
                    config.agent_radius,
                    config.view_radius,
                    &mut rng,
                )
                .with_params(config.params)
            })
            .collect();

        Self {
            agents,
            bounds: config.bounds,
            rng,
            tick: 0,
        }
    }

    /// Advances every agent by `dt` against one shared pre-tick snapshot.
    pub fn step(&mut self, dt: f32) {
        let snapshot = self.agents.clone();
        advance(&mut self.agents, &snapshot, dt, self.bounds, &mut self.rng);
        self.tick += 1;
    }

    /// Like [`Flock::step`], but rejects a non-finite or non-positive `dt`.
    pub fn try_step(&mut self, dt: f32) -> Result<(), FlockError> {
        check_time_step(dt)?;
        self.step(dt);
        Ok(())
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.id() == id)
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

    /// Number of completed steps.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Mean position of the population.
    pub fn centroid(&self) -> Vector2 {
        self.mean_of(|agent| agent.position())
    }

    pub fn mean_speed(&self) -> f32 {
        if self.agents.is_empty() {
            return 0.0;
        }
        let total: f32 = self.agents.iter().map(|agent| agent.velocity().norm()).sum();
        total / self.agents.len() as f32
    }

    /// Length of the mean unit heading: 1 when every agent moves the same
    /// way, near 0 when headings cancel out.
    pub fn polarization(&self) -> f32 {
        self.mean_of(|agent| agent.velocity().normalize()).norm()
    }

    fn mean_of<F>(&self, f: F) -> Vector2
    where
        F: Fn(&Agent) -> Vector2,
    {
        if self.agents.is_empty() {
            return Vector2::ZERO;
        }
        let mut sum = Vector2::ZERO;
        for agent in &self.agents {
            sum += f(agent);
        }
        sum / self.agents.len() as f32
    }
}
