//! Evolve sensor-steered vehicles around a closed circuit.
//!
//! Every [`agent::Agent`] casts a fan of rays at the track walls and turns by
//! the inverse ray distances weighted with its genome. A
//! [`population::Population`] runs the agents until all of them crash or run
//! out of time, then breeds the next generation by fitness-proportionate
//! selection, crossover and mutation.

pub mod agent;
pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod manager;
pub mod model;
pub mod population;
pub mod ray;
pub mod stats;
pub mod track;
