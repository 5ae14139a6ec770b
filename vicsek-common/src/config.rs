use crate::domain::{Domain, Obstacle};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// Configuration for the simulation box
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct UniverseConfig {
    pub box_size: f64,
}

// Configuration for timing
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TimingConfig {
    pub timestep: f64,
    /// Number of steps the driver runs (one per animation frame).
    pub frames: u32,
    #[serde(default = "default_record_interval_steps")]
    pub record_interval_steps: u32,
}

// Initial conditions for the simulation, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct InitialConditions {
    /// Particles per unit area; the particle count is `floor(density * box_size^2)`.
    pub density: f64,
    /// Explicit particle count, overrides `density` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_particles: Option<usize>,
    pub seed: u64,
    #[serde(default = "default_max_placement_attempts")]
    pub max_placement_attempts: u32,
}

// Per-particle dynamics, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ParticleParamsConfig {
    pub interaction_radius: f64,
    /// Speed as a fraction of one interaction radius per timestep.
    pub speed_factor: f64,
    pub noise_amplitude: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ObstacleConfig {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborSearchKind {
    BruteForce,
    Grid,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ExecutionConfig {
    #[serde(default = "default_neighbor_search")]
    pub neighbor_search: NeighborSearchKind,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            neighbor_search: default_neighbor_search(),
            parallel: default_parallel(),
        }
    }
}

// Configuration for output settings, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    pub base_filename: String,
    pub save_final_state: bool,
    pub save_snapshots: bool,
    pub save_particles_in_snapshot: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>, // Output format: "json", "bincode", "messagepack"
}

// Main simulation configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SimulationConfig {
    pub universe: UniverseConfig,
    pub timing: TimingConfig,
    pub initial_conditions: InitialConditions,
    pub particle_params: ParticleParamsConfig,
    pub obstacle: ObstacleConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    pub output: OutputConfig,
}

impl Default for SimulationConfig {
    /// The reference setup: a 10x10 box at unit density with a 4x4 obstacle in the middle.
    fn default() -> Self {
        SimulationConfig {
            universe: UniverseConfig { box_size: 10.0 },
            timing: TimingConfig {
                timestep: 1.0,
                frames: 200,
                record_interval_steps: default_record_interval_steps(),
            },
            initial_conditions: InitialConditions {
                density: 1.0,
                num_particles: None,
                seed: 42,
                max_placement_attempts: default_max_placement_attempts(),
            },
            particle_params: ParticleParamsConfig {
                interaction_radius: 1.0,
                speed_factor: 0.5,
                noise_amplitude: 0.15,
            },
            obstacle: ObstacleConfig { x_min: 3.0, x_max: 7.0, y_min: 3.0, y_max: 7.0 },
            execution: ExecutionConfig::default(),
            output: OutputConfig {
                base_filename: "vicsek_barrier".to_string(),
                save_final_state: true,
                save_snapshots: true,
                save_particles_in_snapshot: true,
                format: Some("json".to_string()),
            },
        }
    }
}

impl SimulationConfig {
    /// Loads the simulation configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .with_context(|| format!("Failed to read config file '{}'", path_ref.display()))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("Invalid configuration in '{}'", path_ref.display()))
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: SimulationConfig =
            toml::from_str(config_str).map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the settings that are not covered by [`Domain::new`].
    pub fn validate(&self) -> Result<()> {
        if self.initial_conditions.density < 0.0 || !self.initial_conditions.density.is_finite() {
            anyhow::bail!("density must be a finite, non-negative number.");
        }
        if self.initial_conditions.max_placement_attempts == 0 {
            anyhow::bail!("max_placement_attempts must be greater than 0.");
        }
        if self.particle_params.speed_factor < 0.0 {
            anyhow::bail!("speed_factor must not be negative.");
        }
        if self.timing.record_interval_steps == 0 {
            anyhow::bail!("record_interval_steps must be greater than 0.");
        }
        self.to_domain().map(|_| ())
    }

    /// Number of particles implied by the density, unless overridden.
    pub fn particle_count(&self) -> usize {
        match self.initial_conditions.num_particles {
            Some(count) => count,
            None => {
                let box_size = self.universe.box_size;
                (self.initial_conditions.density * box_size * box_size).floor() as usize
            }
        }
    }

    /// Converts the configuration into the validated, immutable simulation domain.
    pub fn to_domain(&self) -> Result<Domain> {
        let radius = self.particle_params.interaction_radius;
        let timestep = self.timing.timestep;
        let speed = if timestep > 0.0 {
            radius / timestep * self.particle_params.speed_factor
        } else {
            0.0 // Domain::new rejects the timestep below
        };

        Domain::new(
            self.universe.box_size,
            self.particle_count(),
            radius,
            speed,
            timestep,
            self.particle_params.noise_amplitude,
            Obstacle::new(self.obstacle.x_min, self.obstacle.x_max, self.obstacle.y_min, self.obstacle.y_max),
        )
    }
}

fn default_record_interval_steps() -> u32 {
    1
}

fn default_max_placement_attempts() -> u32 {
    10_000
}

fn default_neighbor_search() -> NeighborSearchKind {
    NeighborSearchKind::BruteForce
}

fn default_parallel() -> bool {
    true
}
