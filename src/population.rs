use crate::agent::Agent;
use crate::config::{AgentConfig, Crossover, PopulationConfig};
use crate::error::SimError;
use crate::model::AgentSnapshot;
use crate::track::Wall;
use glam::DVec2;
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Fitness of every agent in the current generation, in agent order.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedPool {
    pub fitness: Vec<f64>,
    pub total: f64,
}

impl WeightedPool {
    pub fn new(fitness: Vec<f64>) -> Self {
        let total = fitness.iter().sum();
        Self { fitness, total }
    }

    pub fn len(&self) -> usize {
        self.fitness.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fitness.is_empty()
    }

    /// Roulette-wheel lookup: first index whose running sum reaches `r`.
    ///
    /// Falls back to the last index when rounding leaves `r` above the sum.
    pub fn select_index(&self, r: f64) -> usize {
        let mut s = 0.0;
        for (i_agt, &fitness) in self.fitness.iter().enumerate() {
            s += fitness;
            if s >= r {
                return i_agt;
            }
        }
        self.fitness.len().saturating_sub(1)
    }

    /// Draw two parent indices with fitness-proportionate probability.
    ///
    /// When no agent scored anything, both are drawn uniformly instead.
    pub fn choose_two_parents<R>(&self, rng: &mut R) -> Result<(usize, usize), SimError>
    where
        R: Rng + ?Sized,
    {
        if self.is_empty() {
            return Err(SimError::PreconditionViolation(
                "cannot choose parents from an empty pool".into(),
            ));
        }

        if !(self.total > 0.0 && self.total.is_finite()) {
            let idx_dist = Uniform::new(0, self.len())?;
            return Ok((idx_dist.sample(rng), idx_dist.sample(rng)));
        }

        let r_dist = Uniform::new(0.0, self.total)?;
        let r1 = r_dist.sample(rng);
        let r2 = r_dist.sample(rng);
        Ok((self.select_index(r1), self.select_index(r2)))
    }
}

/// Fixed-size cohort of agents evolving on a shared track.
#[derive(Debug)]
pub struct Population {
    agents: Vec<Agent>,
    agent_params: AgentConfig,
    params: PopulationConfig,
    start: DVec2,
    generation: usize,
    last_best_fitness: Option<f64>,
}

impl Population {
    /// Spawn the first, randomly initialized generation at `start`.
    pub fn new<R>(
        agent_params: AgentConfig,
        params: PopulationConfig,
        start: DVec2,
        rng: &mut R,
    ) -> Result<Self, SimError>
    where
        R: Rng + ?Sized,
    {
        let mut agents = Vec::with_capacity(params.n_agents);
        for _ in 0..params.n_agents {
            agents.push(Agent::new(agent_params.clone(), start, params.ttl, rng)?);
        }

        Ok(Self {
            agents,
            agent_params,
            params,
            start,
            generation: 0,
            last_best_fitness: None,
        })
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn start(&self) -> DVec2 {
        self.start
    }

    pub fn ttl(&self) -> u32 {
        self.params.ttl
    }

    pub fn crossover(&self) -> Crossover {
        self.params.crossover
    }

    /// Best fitness of the previous generation.
    pub fn last_best_fitness(&self) -> Option<f64> {
        self.last_best_fitness
    }

    /// Move every agent, then refresh its sensors for the next tick.
    pub fn update(&mut self, walls: &[Wall]) -> Result<(), SimError> {
        for agent in &mut self.agents {
            agent.update(walls)?;
            agent.look(walls);
        }
        Ok(())
    }

    pub fn all_finished(&self) -> bool {
        self.agents.iter().all(Agent::is_finished)
    }

    pub fn weighted_pool(&self) -> WeightedPool {
        WeightedPool::new(self.agents.iter().map(Agent::fitness).collect())
    }

    /// Replace every agent with an offspring of two fitness-selected parents.
    pub fn next_generation<R>(&mut self, rng: &mut R) -> Result<(), SimError>
    where
        R: Rng + ?Sized,
    {
        self.generation += 1;

        let pool = self.weighted_pool();
        self.last_best_fitness = pool.fitness.iter().copied().reduce(f64::max);

        let mut children = Vec::with_capacity(self.params.n_agents);
        for _ in 0..self.params.n_agents {
            let mut child =
                Agent::new(self.agent_params.clone(), self.start, self.params.ttl, rng)?;
            let (i_p1, i_p2) = pool.choose_two_parents(rng)?;
            child.crossover_genes(
                &self.agents[i_p1],
                &self.agents[i_p2],
                self.params.crossover,
                rng,
            )?;
            child.mutate_genes(self.params.mutation_rate, rng)?;
            children.push(child);
        }
        self.agents = children;

        log::debug!(
            "generation {} spawned {} agents",
            self.generation,
            self.agents.len()
        );

        Ok(())
    }

    pub fn snapshot(&self) -> Vec<AgentSnapshot> {
        self.agents.iter().map(Agent::snapshot).collect()
    }
}
