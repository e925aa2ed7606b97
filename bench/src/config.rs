use anyhow::{ensure, Result};
use clap::{Parser, ValueEnum};

/// Measures the hashlab tables on shuffled integer keys.
#[derive(Parser, Debug, Clone)]
#[command(name = "hashlab-bench", version)]
pub struct BenchConfig {
    /// Number of keys inserted per trial.
    #[arg(long = "elements", default_value_t = 100_000)]
    pub element_count: usize,

    /// Initial bucket count of every table.
    #[arg(long, default_value_t = hashlab::DEFAULT_CAPACITY)]
    pub initial_capacity: usize,

    /// Load factor bound handed to every table.
    #[arg(long, default_value_t = hashlab::DEFAULT_MAX_LOAD_FACTOR)]
    pub max_load_factor: f64,

    /// Number of trials per scenario; trial `t` shuffles keys with `seed + t`.
    #[arg(long, default_value_t = 200)]
    pub trials: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Worker threads for scenarios that do not measure time.
    #[arg(long, default_value_t = default_threads())]
    pub threads: usize,

    #[arg(long, value_enum, default_value_t = Scenario::All)]
    pub scenario: Scenario,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    All,
    Generation,
    Insertion,
    LoadFactor,
    MeanLoadFactor,
    MaxChain,
    MinChainWithEmpty,
    MinChainWithoutEmpty,
    SearchCost,
    OpenAddressing,
    Baseline,
}

impl Scenario {
    pub const EACH: [Scenario; 10] = [
        Scenario::Generation,
        Scenario::Insertion,
        Scenario::LoadFactor,
        Scenario::MeanLoadFactor,
        Scenario::MaxChain,
        Scenario::MinChainWithEmpty,
        Scenario::MinChainWithoutEmpty,
        Scenario::SearchCost,
        Scenario::OpenAddressing,
        Scenario::Baseline,
    ];

    pub fn selected(self) -> Vec<Scenario> {
        match self {
            Scenario::All => Self::EACH.to_vec(),
            one => vec![one],
        }
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            element_count: 100_000,
            initial_capacity: hashlab::DEFAULT_CAPACITY,
            max_load_factor: hashlab::DEFAULT_MAX_LOAD_FACTOR,
            trials: 200,
            seed: 42,
            threads: default_threads(),
            scenario: Scenario::All,
        }
    }
}

impl BenchConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.element_count > 0, "element count must be positive");
        ensure!(self.trials > 0, "trials must be positive");
        ensure!(self.threads > 0, "threads must be positive");
        ensure!(
            i32::try_from(self.element_count).is_ok(),
            "element count must fit in a 32-bit key"
        );
        hashlab::TableConfig::default()
            .capacity(self.initial_capacity)
            .max_load_factor(self.max_load_factor)
            .validate()?;
        Ok(())
    }

    pub fn table_config(&self) -> hashlab::TableConfig {
        hashlab::TableConfig {
            capacity: self.initial_capacity,
            max_load_factor: self.max_load_factor,
        }
    }
}

fn default_threads() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults() {
        let cfg = BenchConfig::parse_from(["hashlab-bench"]);
        assert_eq!(cfg.element_count, 100_000);
        assert_eq!(cfg.initial_capacity, 16);
        assert_eq!(cfg.trials, 200);
        assert_eq!(cfg.scenario, Scenario::All);
        cfg.validate().unwrap();
    }

    #[test]
    fn parses_overrides() {
        let cfg = BenchConfig::parse_from([
            "hashlab-bench",
            "--elements",
            "500",
            "--max-load-factor",
            "0.5",
            "--scenario",
            "min-chain-without-empty",
        ]);
        assert_eq!(cfg.element_count, 500);
        assert_eq!(cfg.max_load_factor, 0.5);
        assert_eq!(cfg.scenario.selected(), vec![Scenario::MinChainWithoutEmpty]);
    }

    #[test]
    fn rejects_invalid_values() {
        let base = BenchConfig::default();
        for bad in [
            BenchConfig { trials: 0, ..base.clone() },
            BenchConfig { element_count: 0, ..base.clone() },
            BenchConfig { initial_capacity: 0, ..base.clone() },
            BenchConfig { max_load_factor: 1.0, ..base.clone() },
        ] {
            assert!(bad.validate().is_err());
        }
    }

    #[test]
    fn all_expands_to_every_scenario() {
        assert_eq!(Scenario::All.selected().len(), Scenario::EACH.len());
        assert!(!Scenario::EACH.contains(&Scenario::All));
    }
}
