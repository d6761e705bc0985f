use crate::config::Config;
use crate::model::{Frame, GenerationRecord};
use crate::population::Population;
use crate::stats::Accumulator;
use crate::track::Track;
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rmp_serde::encode;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

/// Simulation engine.
///
/// Holds the configuration, track, population and random number generator,
/// and drives the tick loop across generations.
pub struct Engine {
    cfg: Config,
    track: Track,
    population: Population,
    rng: ChaCha12Rng,
}

impl Engine {
    /// Create a new `Engine` with a random first generation.
    pub fn new(cfg: Config) -> Result<Self> {
        let mut rng = match cfg.output.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::try_from_os_rng()?,
        };

        let track = Track::from_config(&cfg.track, &mut rng).context("failed to build track")?;

        let population = Population::new(
            cfg.agent.clone(),
            cfg.population.clone(),
            track.start,
            &mut rng,
        )
        .context("failed to spawn population")?;

        Ok(Self {
            cfg,
            track,
            population,
            rng,
        })
    }

    pub fn cfg(&self) -> &Config {
        &self.cfg
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Tick until every agent has finished, then breed the next generation.
    ///
    /// `on_tick` sees the population after every tick.
    pub fn run_generation<F>(&mut self, mut on_tick: F) -> Result<GenerationRecord>
    where
        F: FnMut(usize, &Population) -> Result<()>,
    {
        let generation = self.population.generation();

        let mut ticks = 0;
        while !self.population.all_finished() {
            self.population
                .update(&self.track.walls)
                .context("failed to update population")?;
            ticks += 1;

            on_tick(ticks, &self.population)?;
        }

        let record = self.record(generation, ticks);

        self.population
            .next_generation(&mut self.rng)
            .context("failed to breed next generation")?;

        Ok(record)
    }

    /// Run the configured number of generations, writing one record per
    /// generation to `history_file` and, if enabled, every tick to `frames_file`.
    pub fn run<P, Q>(&mut self, history_file: P, frames_file: Q) -> Result<()>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let history_file = history_file.as_ref();
        let file = File::create(history_file)
            .with_context(|| format!("failed to create {history_file:?}"))?;
        let mut history_writer = BufWriter::new(file);

        let mut frames_writer = if self.cfg.output.save_frames {
            let frames_file = frames_file.as_ref();
            let file = File::create(frames_file)
                .with_context(|| format!("failed to create {frames_file:?}"))?;
            Some(BufWriter::new(file))
        } else {
            None
        };

        let n_generations = self.cfg.output.generations;
        let mut i_gen = 0;
        while n_generations.is_none_or(|n| i_gen < n) {
            let record = self.run_generation(|tick, population| {
                if let Some(writer) = frames_writer.as_mut() {
                    let frame = Frame {
                        generation: population.generation(),
                        tick,
                        agents: population.snapshot(),
                    };
                    encode::write(writer, &frame).context("failed to serialize frame")?;
                }
                Ok(())
            })?;

            encode::write(&mut history_writer, &record).context("failed to serialize record")?;
            // Keep the history readable while an unbounded run is going.
            history_writer.flush().context("failed to flush writer stream")?;

            log::info!(
                "generation {:04}: best {:8.2} mean {:8.2} crashed {}/{} after {} ticks",
                record.generation,
                record.best_fitness,
                record.mean_fitness,
                record.n_crashed,
                self.cfg.population.n_agents,
                record.ticks
            );
            i_gen += 1;
        }

        if let Some(mut writer) = frames_writer {
            writer.flush().context("failed to flush writer stream")?;
        }

        Ok(())
    }

    fn record(&self, generation: usize, ticks: usize) -> GenerationRecord {
        let agents = self.population.agents();
        let fitness: Accumulator = agents.iter().map(|agt| agt.fitness()).collect();
        let n_crashed = agents.iter().filter(|agt| !agt.is_alive()).count();

        GenerationRecord {
            generation,
            ticks,
            best_fitness: fitness.max(),
            mean_fitness: fitness.mean(),
            std_dev_fitness: fitness.std_dev(),
            n_crashed,
            n_expired: agents.len() - n_crashed,
        }
    }
}
