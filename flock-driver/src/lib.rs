use std::fs;
use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use flock_core::{AccelerationModel, AgentParams, Bounds, Flock, FlockConfig, Vector2};
use flock_shared::{AgentSample, FrameRecord, ModelKind, SimulationSettings};

mod cli;
pub use cli::Args;

/// Reads settings from a JSON file, or returns the defaults when no path is
/// given.
pub fn load_settings(path: Option<&Path>) -> Result<SimulationSettings> {
    let Some(path) = path else {
        return Ok(SimulationSettings::default());
    };

    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    SimulationSettings::from_json(&json)
        .with_context(|| format!("Failed to parse settings file {}", path.display()))
}

/// Maps the serialized settings onto the core flock configuration.
pub fn flock_config(settings: &SimulationSettings) -> FlockConfig {
    let model = match settings.model {
        ModelKind::ForceClamped => AccelerationModel::ForceClamped,
        ModelKind::MassDamper => AccelerationModel::MassDamper,
    };

    FlockConfig {
        population: settings.population,
        bounds: Bounds::new(settings.world.width, settings.world.height),
        agent_radius: settings.agent_radius,
        view_radius: settings.view_radius,
        params: AgentParams {
            mass: settings.physics.mass,
            damping: settings.physics.damping,
            separation_gain: settings.gains.separation,
            alignment_gain: settings.gains.alignment,
            cohesion_gain: settings.gains.cohesion,
            wall_gain: settings.gains.wall,
            wall_margin: settings.gains.wall_margin,
            random_gain: settings.gains.random,
            max_force: settings.limits.max_force,
            max_acceleration: settings.limits.max_acceleration,
            max_speed: settings.limits.max_speed,
            model,
        },
        initial_speed: (settings.initial_speed[0], settings.initial_speed[1]),
        seed: settings.seed,
    }
}

/// Captures what a renderer needs from the flock for one frame.
pub fn frame_record(flock: &Flock, dt: f32) -> FrameRecord {
    FrameRecord {
        tick: flock.tick(),
        time: flock.tick() as f32 * dt,
        agents: flock
            .agents()
            .iter()
            .map(|agent| AgentSample {
                id: agent.id().0,
                x: agent.position().x,
                y: agent.position().y,
                vx: agent.velocity().x,
                vy: agent.velocity().y,
                radius: agent.radius(),
            })
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub realtime: bool,
    /// Ticks between summary log lines; 0 disables them.
    pub log_every: u64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            realtime: false,
            log_every: 100,
        }
    }
}

/// Final state of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub frames_written: u64,
    pub centroid: Vector2,
    pub mean_speed: f32,
    pub polarization: f32,
}

/// Sleeps until fixed deadlines spaced one tick apart, so the loop keeps
/// its average rate even when a tick runs long.
struct Pacer {
    period: Duration,
    next: Instant,
}

impl Pacer {
    fn new(dt: f32) -> Result<Self> {
        let period = Duration::try_from_secs_f32(dt)
            .with_context(|| format!("Tick of {}s cannot be paced in real time", dt))?;
        let next = Instant::now()
            .checked_add(period)
            .with_context(|| format!("Tick of {}s cannot be paced in real time", dt))?;
        Ok(Self { period, next })
    }

    fn wait(&mut self) {
        let now = Instant::now();
        if self.next > now {
            thread::sleep(self.next - now);
        }
        self.next = self.next.checked_add(self.period).unwrap_or(self.next);
    }
}

fn write_frame<W>(sink: &mut W, flock: &Flock, dt: f32) -> Result<()>
where
    W: Write + ?Sized,
{
    let line = frame_record(flock, dt)
        .to_json_line()
        .context("Failed to encode frame")?;
    writeln!(sink, "{}", line).context("Failed to write frame")?;
    Ok(())
}

/// Runs the simulation described by `settings`, writing one frame per tick
/// (plus the initial state) to `frames` when given.
pub fn run<W>(settings: &SimulationSettings, options: &RunOptions, mut frames: Option<&mut W>) -> Result<RunSummary>
where
    W: Write + ?Sized,
{
    anyhow::ensure!(
        settings.dt.is_finite() && settings.dt > 0.0,
        "dt must be finite and positive, got {}",
        settings.dt
    );

    let config = flock_config(settings);
    let mut flock = Flock::from_config(&config).context("Invalid simulation settings")?;
    let dt = settings.dt;

    log::info!(
        "Simulating {} agents in a {}x{} world, model {}, dt {}s, {} steps",
        flock.len(),
        settings.world.width,
        settings.world.height,
        settings.model,
        dt,
        settings.steps
    );
    match settings.seed {
        Some(seed) => log::info!("Seed: {}", seed),
        None => log::info!("Seed: from entropy"),
    }

    let mut frames_written = 0;
    if let Some(sink) = frames.as_deref_mut() {
        write_frame(sink, &flock, dt)?;
        frames_written += 1;
    }

    let mut pacer = if options.realtime { Some(Pacer::new(dt)?) } else { None };

    for _ in 0..settings.steps {
        flock
            .try_step(dt)
            .with_context(|| format!("Step {} failed", flock.tick() + 1))?;

        if let Some(sink) = frames.as_deref_mut() {
            if let Err(err) = write_frame(sink, &flock, dt) {
                log::warn!("Stopping at tick {}: {:#}", flock.tick(), err);
                return Err(err);
            }
            frames_written += 1;
        }

        if options.log_every > 0 && flock.tick() % options.log_every == 0 {
            let centroid = flock.centroid();
            log::info!(
                "tick {:>6}  centroid ({:.1}, {:.1})  mean speed {:.2}  polarization {:.3}",
                flock.tick(),
                centroid.x,
                centroid.y,
                flock.mean_speed(),
                flock.polarization()
            );
        }
        log::trace!("tick {} done", flock.tick());

        if let Some(pacer) = pacer.as_mut() {
            pacer.wait();
        }
    }

    if let Some(sink) = frames.as_deref_mut() {
        sink.flush().context("Failed to flush frames")?;
    }

    Ok(RunSummary {
        ticks: flock.tick(),
        frames_written,
        centroid: flock.centroid(),
        mean_speed: flock.mean_speed(),
        polarization: flock.polarization(),
    })
}
