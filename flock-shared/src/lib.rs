use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Extent of the simulated world in world units
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldSettings {
    pub width: f32,
    pub height: f32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 500.0,
        }
    }
}

/// Which acceleration strategy agents use
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    #[default]
    ForceClamped,
    MassDamper,
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "force_clamped" => Ok(Self::ForceClamped),
            "mass_damper" => Ok(Self::MassDamper),
            other => Err(format!(
                "unknown model '{}', expected 'force_clamped' or 'mass_damper'",
                other
            )),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForceClamped => f.write_str("force_clamped"),
            Self::MassDamper => f.write_str("mass_damper"),
        }
    }
}

/// Point-mass properties
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicsSettings {
    pub mass: f32,
    pub damping: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            mass: 1.0,
            damping: 1.2,
        }
    }
}

/// Behavior gains
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GainSettings {
    pub separation: f32,
    pub alignment: f32,
    pub cohesion: f32,
    pub wall: f32,
    pub wall_margin: f32,
    pub random: f32,
}

impl Default for GainSettings {
    fn default() -> Self {
        Self {
            separation: 5.0,
            alignment: 30.0,
            cohesion: 8.0,
            wall: 5.0,
            wall_margin: 30.0,
            random: 0.0,
        }
    }
}

/// Caps applied every tick
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LimitSettings {
    pub max_force: f32,
    pub max_acceleration: f32,
    pub max_speed: f32,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_force: 800.0,
            max_acceleration: 800.0,
            max_speed: 150.0,
        }
    }
}

/// Full run configuration, read from a JSON document.
///
/// Every field has a default, so `{}` is a valid configuration describing
/// ten agents in a 500x500 world stepped at 100 Hz.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationSettings {
    pub world: WorldSettings,
    pub population: usize,
    pub agent_radius: f32,
    pub view_radius: f32,
    pub dt: f32,
    pub steps: u64,
    pub seed: Option<u64>,
    /// Inclusive `[min, max]` band for the initial speed.
    pub initial_speed: [f32; 2],
    pub model: ModelKind,
    pub physics: PhysicsSettings,
    pub gains: GainSettings,
    pub limits: LimitSettings,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            world: WorldSettings::default(),
            population: 10,
            agent_radius: 3.0,
            view_radius: 200.0,
            dt: 0.01,
            steps: 1000,
            seed: None,
            initial_speed: [40.0, 100.0],
            model: ModelKind::default(),
            physics: PhysicsSettings::default(),
            gains: GainSettings::default(),
            limits: LimitSettings::default(),
        }
    }
}

impl SimulationSettings {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Render-facing state of one agent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AgentSample {
    pub id: usize,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
}

/// State of the whole flock after one tick
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameRecord {
    pub tick: u64,
    /// Simulated seconds since the start of the run.
    pub time: f32,
    pub agents: Vec<AgentSample>,
}

impl FrameRecord {
    /// Single-line JSON encoding, without the trailing newline.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
