use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    f64::consts::{FRAC_PI_4, PI},
    fmt::Debug,
    fs,
    ops::{Bound, RangeBounds},
    path::Path,
};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Vehicle and sensor parameters.
    pub agent: AgentConfig,
    /// Genetic algorithm parameters.
    pub population: PopulationConfig,
    /// Track layout.
    pub track: TrackConfig,
    /// Run length and output options.
    pub output: OutputConfig,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Velocity magnitude cap.
    pub max_velocity: f64,
    /// Steering angle reached at full lock (radians).
    pub max_steering_angle: f64,
    /// Magnitude of the steering impulse applied each tick.
    pub impulse: f64,
    /// Length of the body segment used for collisions.
    pub body_length: f64,
    /// Sensor angles relative to the heading (radians), one gene per sensor.
    pub ray_angles: Vec<f64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_velocity: 4.0,
            max_steering_angle: PI,
            impulse: 0.5,
            body_length: 30.0,
            ray_angles: vec![-FRAC_PI_4, FRAC_PI_4],
        }
    }
}

/// How a child genome is recombined from its two parents.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Crossover {
    /// Each gene comes from either parent with equal probability.
    #[default]
    Uniform,
    /// Every gene comes from the first parent. The second parent is drawn
    /// but never contributes.
    Parent1,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PopulationConfig {
    /// Number of agents per generation.
    pub n_agents: usize,
    /// Tick budget of every agent.
    pub ttl: u32,
    /// Per-gene mutation probability.
    pub mutation_rate: f64,
    #[serde(default)]
    pub crossover: Crossover,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            n_agents: 100,
            ttl: 400,
            mutation_rate: 0.1,
            crossover: Crossover::default(),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum TrackConfig {
    /// Polygonal ring road inside a bordered `width x height` area.
    Circular {
        width: f64,
        height: f64,
        n_segments: usize,
    },
    /// Explicit walls given as `[x1, y1, x2, y2]`.
    Custom {
        walls: Vec<[f64; 4]>,
        start: [f64; 2],
        border: Option<[f64; 2]>,
    },
    /// `n_walls` randomly placed walls inside a bordered `width x height` area.
    Random {
        width: f64,
        height: f64,
        n_walls: usize,
    },
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Number of generations per run; runs forever when absent.
    pub generations: Option<usize>,
    /// Random seed; drawn from the OS when absent.
    pub seed: Option<u64>,
    /// Write a snapshot of every tick to the frames file.
    #[serde(default)]
    pub save_frames: bool,
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        Self::from_toml(&contents)
    }

    /// Parse and validate a [`Config`] from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let agent = &self.agent;
        check_num(agent.max_velocity, 0.0..1_000.0).context("invalid maximum velocity")?;
        check_num(
            agent.max_steering_angle,
            (Bound::Excluded(0.0), Bound::Included(PI)),
        )
        .context("invalid maximum steering angle")?;
        check_num(agent.impulse, 0.0..1_000.0).context("invalid steering impulse")?;
        check_num(agent.body_length, 0.0..1_000.0).context("invalid body length")?;
        check_num(agent.ray_angles.len(), 1..=16).context("invalid number of rays")?;
        for (i_ray, &angle) in agent.ray_angles.iter().enumerate() {
            check_num(angle, -PI..=PI).with_context(|| format!("invalid angle of ray {i_ray}"))?;
        }

        let pop = &self.population;
        check_num(pop.n_agents, 1..100_000).context("invalid number of agents")?;
        check_num(pop.ttl, 1..1_000_000).context("invalid time to live")?;
        check_num(pop.mutation_rate, 0.0..=1.0).context("invalid mutation rate")?;

        match &self.track {
            TrackConfig::Circular {
                width,
                height,
                n_segments,
            } => {
                check_num(*width, 1.0..1e6).context("invalid track width")?;
                check_num(*height, 1.0..1e6).context("invalid track height")?;
                check_num(*n_segments, 3..1_000).context("invalid number of track segments")?;
            }
            TrackConfig::Custom { walls, start, .. } => {
                if walls.is_empty() {
                    bail!("custom track must have at least one wall");
                }
                if walls.iter().flatten().chain(start).any(|c| !c.is_finite()) {
                    bail!("custom track coordinates must be finite");
                }
            }
            TrackConfig::Random {
                width,
                height,
                n_walls,
            } => {
                check_num(*width, 1.0..1e6).context("invalid track width")?;
                check_num(*height, 1.0..1e6).context("invalid track height")?;
                check_num(*n_walls, 0..1_000).context("invalid number of random walls")?;
            }
        }

        if let Some(generations) = self.output.generations {
            check_num(generations, 1..).context("invalid number of generations")?;
        }

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}
