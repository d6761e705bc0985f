use crate::config::{AgentConfig, Crossover};
use crate::error::{SimError, check_range};
use crate::geometry::segments_intersect;
use crate::model::AgentSnapshot;
use crate::ray::Ray;
use crate::track::Wall;
use glam::DVec2;
use rand::Rng;
use rand_distr::{Bernoulli, Distribution, Uniform};
use std::f64::consts::PI;

/// Fixed steering angle of a manual turn.
const MANUAL_TURN_ANGLE: f64 = PI / 5.0;

/// Manual steering input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Vehicle driven by its sensors.
///
/// Each gene weights the inverse distance read by one ray; the weighted sum
/// decides how hard the agent turns.
#[derive(Debug, Clone)]
pub struct Agent {
    params: AgentConfig,

    starting_position: DVec2,
    position: DVec2,
    velocity: DVec2,
    acceleration: DVec2,

    rays: Vec<Ray>,
    genes: Vec<f64>,

    ttl: u32,
    alive: bool,
    // Set once a ray reported a real distance. Until then a collision is
    // only an artifact of spawning near a wall.
    ready: bool,
}

impl Agent {
    /// Spawn an agent at `position` heading along +x with a random genome.
    pub fn new<R>(
        params: AgentConfig,
        position: DVec2,
        ttl: u32,
        rng: &mut R,
    ) -> Result<Self, SimError>
    where
        R: Rng + ?Sized,
    {
        let mut agent = Self {
            params,
            starting_position: position,
            position,
            velocity: DVec2::X,
            acceleration: DVec2::ZERO,
            rays: Vec::new(),
            genes: Vec::new(),
            ttl,
            alive: true,
            ready: false,
        };
        agent.turn_rays();
        agent.random_genes(rng)?;
        Ok(agent)
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn starting_position(&self) -> DVec2 {
        self.starting_position
    }

    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    pub fn acceleration(&self) -> DVec2 {
        self.acceleration
    }

    /// Heading angle of the velocity (radians).
    pub fn heading(&self) -> f64 {
        self.velocity.y.atan2(self.velocity.x)
    }

    pub fn rays(&self) -> &[Ray] {
        &self.rays
    }

    pub fn genes(&self) -> &[f64] {
        &self.genes
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Crashed or out of time.
    pub fn is_finished(&self) -> bool {
        !self.alive || self.ttl == 0
    }

    /// Advance the agent by one tick.
    ///
    /// Steering reads the hits cached by the previous [`Agent::look`].
    pub fn update(&mut self, walls: &[Wall]) -> Result<(), SimError> {
        if self.is_finished() {
            return Ok(());
        }
        self.ttl -= 1;

        self.steer()?;
        self.velocity =
            (self.velocity + self.acceleration).clamp_length_max(self.params.max_velocity);
        self.position += self.velocity;
        self.sync_rays();
        self.acceleration = DVec2::ZERO;

        if self.collide(walls) && self.ready {
            self.alive = false;
        }

        Ok(())
    }

    /// Turn according to the current ray readings and genome.
    pub fn steer(&mut self) -> Result<(), SimError> {
        let mut total = 0.0_f64;
        for (ray, &gene) in self.rays.iter().zip(&self.genes) {
            let dist = ray.distance_to_wall();
            if dist > 0.0 {
                self.ready = true;
                total += 1.0 / (dist * gene);
            }
        }
        // Opposite infinite terms cancel to NaN: go straight.
        if total.is_nan() {
            total = 0.0;
        }

        // Map [-n, n] onto [-1, 1].
        let n_rays = self.rays.len() as f64;
        let percentage = (total / n_rays).clamp(-1.0, 1.0);
        self.turn_percentage(percentage)
    }

    /// Steer by a fraction of the maximum steering angle.
    pub fn turn_percentage(&mut self, percentage: f64) -> Result<(), SimError> {
        check_range("steering percentage", percentage, -1.0, 1.0)?;
        self.apply_turn(percentage * self.params.max_steering_angle);
        Ok(())
    }

    /// Steer by a fixed angle to one side.
    pub fn turn(&mut self, direction: Direction) {
        let angle = match direction {
            Direction::Left => -MANUAL_TURN_ANGLE,
            Direction::Right => MANUAL_TURN_ANGLE,
        };
        self.apply_turn(angle);
    }

    fn apply_turn(&mut self, angle: f64) {
        self.acceleration = DVec2::from_angle(angle)
            .rotate(self.velocity)
            .normalize_or_zero()
            * self.params.impulse;
        self.turn_rays();
    }

    /// Rebuild the rays around the current heading. Cached hits are dropped.
    fn turn_rays(&mut self) {
        let heading = self.heading();
        self.rays = self
            .params
            .ray_angles
            .iter()
            .map(|&angle| Ray::new(self.position, heading + angle))
            .collect();
    }

    fn sync_rays(&mut self) {
        for ray in &mut self.rays {
            ray.set_origin(self.position);
        }
    }

    /// Whether the body segment crosses any wall.
    pub fn collide(&self, walls: &[Wall]) -> bool {
        let half = self.velocity.normalize_or_zero() * (self.params.body_length / 2.0);
        let tail = self.position - half;
        let nose = self.position + half;
        walls
            .iter()
            .any(|wall| segments_intersect(wall.a(), wall.b(), tail, nose))
    }

    /// Cache the nearest wall hit of every ray.
    pub fn look(&mut self, walls: &[Wall]) {
        for ray in &mut self.rays {
            let hit = ray.closest_hit(walls);
            ray.set_hit_point(hit);
        }
    }

    /// Straight-line distance from the spawn point.
    pub fn fitness(&self) -> f64 {
        self.position.distance(self.starting_position)
    }

    /// One gene per ray, uniform in `[-1, 1]`.
    pub fn random_genes<R>(&mut self, rng: &mut R) -> Result<(), SimError>
    where
        R: Rng + ?Sized,
    {
        self.check_rays()?;
        let gene_dist = Uniform::new_inclusive(-1.0, 1.0)?;
        self.genes = (0..self.rays.len())
            .map(|_| gene_dist.sample(rng))
            .collect();
        Ok(())
    }

    /// Recombine the genomes of two parents into this agent.
    pub fn crossover_genes<R>(
        &mut self,
        p1: &Agent,
        p2: &Agent,
        mode: Crossover,
        rng: &mut R,
    ) -> Result<(), SimError>
    where
        R: Rng + ?Sized,
    {
        self.check_rays()?;
        for parent in [p1, p2] {
            self.check_genome_len(parent.genes.len())?;
        }

        let coin = Bernoulli::new(0.5)?;
        // Both modes draw one coin per gene.
        self.genes = p1
            .genes
            .iter()
            .zip(&p2.genes)
            .map(|(&g1, &g2)| {
                let from_p1 = coin.sample(rng);
                match mode {
                    Crossover::Uniform if !from_p1 => g2,
                    _ => g1,
                }
            })
            .collect();
        Ok(())
    }

    /// Replace each gene with probability `rate` by a fresh draw from `[0, 1)`.
    pub fn mutate_genes<R>(&mut self, rate: f64, rng: &mut R) -> Result<(), SimError>
    where
        R: Rng + ?Sized,
    {
        check_range("mutation rate", rate, 0.0, 1.0)?;
        let mut_dist = Bernoulli::new(rate)?;
        for gene in &mut self.genes {
            if mut_dist.sample(rng) {
                *gene = rng.random::<f64>();
            }
        }
        Ok(())
    }

    pub fn set_genes(&mut self, genes: Vec<f64>) -> Result<(), SimError> {
        self.check_genome_len(genes.len())?;
        self.genes = genes;
        Ok(())
    }

    pub fn copy_genes(&mut self, other: &Agent) -> Result<(), SimError> {
        self.set_genes(other.genes.clone())
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            position: self.position,
            heading: self.heading(),
            alive: self.alive,
            hit_points: self.rays.iter().map(Ray::hit_point).collect(),
        }
    }

    fn check_rays(&self) -> Result<(), SimError> {
        if self.rays.is_empty() {
            return Err(SimError::PreconditionViolation(
                "gene operation called before rays exist".into(),
            ));
        }
        Ok(())
    }

    fn check_genome_len(&self, len: usize) -> Result<(), SimError> {
        let n_rays = self.rays.len();
        if len != n_rays {
            return Err(SimError::PreconditionViolation(format!(
                "genome length must be {n_rays}, but is {len}"
            )));
        }
        Ok(())
    }
}
