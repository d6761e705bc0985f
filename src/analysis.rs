use crate::model::GenerationRecord;
use crate::stats::Accumulator;
use anyhow::{Context, Result};
use rmp_serde::decode;
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter},
    path::Path,
};

pub trait Obs {
    fn update(&mut self, record: &GenerationRecord) -> Result<()>;
    fn report(&self) -> serde_json::Value;
}

pub struct BestFitness {
    acc: Accumulator,
    first: Option<f64>,
    last: Option<f64>,
}

impl BestFitness {
    pub fn new() -> Self {
        Self {
            acc: Accumulator::new(),
            first: None,
            last: None,
        }
    }
}

impl Obs for BestFitness {
    fn update(&mut self, record: &GenerationRecord) -> Result<()> {
        self.acc.add(record.best_fitness);
        self.first.get_or_insert(record.best_fitness);
        self.last = Some(record.best_fitness);
        Ok(())
    }

    fn report(&self) -> serde_json::Value {
        serde_json::json!({
            "best_fitness": {
                "stats": self.acc.report(),
                "first": self.first,
                "last": self.last,
            }
        })
    }
}

pub struct MeanFitness {
    acc: Accumulator,
}

impl MeanFitness {
    pub fn new() -> Self {
        Self {
            acc: Accumulator::new(),
        }
    }
}

impl Obs for MeanFitness {
    fn update(&mut self, record: &GenerationRecord) -> Result<()> {
        self.acc.add(record.mean_fitness);
        Ok(())
    }

    fn report(&self) -> serde_json::Value {
        serde_json::json!({ "mean_fitness": { "stats": self.acc.report() } })
    }
}

/// Fraction of each generation stopped by a wall rather than by its TTL.
pub struct CrashFraction {
    acc: Accumulator,
}

impl CrashFraction {
    pub fn new() -> Self {
        Self {
            acc: Accumulator::new(),
        }
    }
}

impl Obs for CrashFraction {
    fn update(&mut self, record: &GenerationRecord) -> Result<()> {
        let n_agt = record.n_crashed + record.n_expired;
        if n_agt == 0 {
            return Ok(());
        }
        self.acc.add(record.n_crashed as f64 / n_agt as f64);
        Ok(())
    }

    fn report(&self) -> serde_json::Value {
        serde_json::json!({ "crash_fraction": { "stats": self.acc.report() } })
    }
}

pub struct Analyzer {
    n_records: usize,
    obs_ptr_vec: Vec<Box<dyn Obs>>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        let obs_ptr_vec: Vec<Box<dyn Obs>> = vec![
            Box::new(BestFitness::new()),
            Box::new(MeanFitness::new()),
            Box::new(CrashFraction::new()),
        ];
        Self {
            n_records: 0,
            obs_ptr_vec,
        }
    }

    pub fn add_record(&mut self, record: &GenerationRecord) -> Result<()> {
        for obs in &mut self.obs_ptr_vec {
            obs.update(record).context("failed to update observable")?;
        }
        self.n_records += 1;
        Ok(())
    }

    /// Feed every record of a history file, up to its end.
    pub fn add_file<P: AsRef<Path>>(&mut self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        let mut reader = BufReader::new(file);

        while !reader.fill_buf().context("failed to read history")?.is_empty() {
            let record: GenerationRecord =
                decode::from_read(&mut reader).context("failed to read record")?;
            self.add_record(&record)?;
        }
        Ok(())
    }

    pub fn n_records(&self) -> usize {
        self.n_records
    }

    pub fn report(&self) -> serde_json::Value {
        let reports: Vec<_> = self.obs_ptr_vec.iter().map(|obs| obs.report()).collect();
        serde_json::json!({
            "n_generations": self.n_records,
            "observables": reports,
        })
    }

    pub fn save_results<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, &self.report()).context("failed to write results")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(generation: usize, best: f64, n_crashed: usize) -> GenerationRecord {
        GenerationRecord {
            generation,
            ticks: 100,
            best_fitness: best,
            mean_fitness: best / 2.0,
            std_dev_fitness: 1.0,
            n_crashed,
            n_expired: 10 - n_crashed,
        }
    }

    #[test]
    fn report_summarizes_records() {
        let mut analyzer = Analyzer::new();
        analyzer.add_record(&record(0, 10.0, 10)).unwrap();
        analyzer.add_record(&record(1, 30.0, 5)).unwrap();
        assert_eq!(analyzer.n_records(), 2);

        let report = analyzer.report();
        assert_eq!(report["n_generations"], 2);
        let best = &report["observables"][0]["best_fitness"];
        assert_eq!(best["first"], 10.0);
        assert_eq!(best["last"], 30.0);
        assert_eq!(best["stats"]["mean"], 20.0);
        let mean = &report["observables"][1]["mean_fitness"]["stats"];
        assert_eq!(mean["mean"], 10.0);
        assert_eq!(mean["n_vals"], 2);
        let crash = &report["observables"][2]["crash_fraction"]["stats"];
        assert_eq!(crash["mean"], 0.75);
    }
}
