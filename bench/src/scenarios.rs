use std::collections::HashMap;
use std::time::Instant;

use anyhow::{anyhow, Result};
use dashmap::DashMap;
use hashlab::hash::{Division, Multiplication};
use hashlab::probe::{DoubleHashing, LinearProbing, QuadraticProbing};
use hashlab::{ChainedHashTable, HashStrategy, Map, OpenAddressingTable, ProbingStrategy};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::{BenchConfig, Scenario};
use crate::report::{Report, Series};

const WARM_UP_KEYS: usize = 10_000;

/// A seeded shuffle of `0..n`.
pub fn make_keys(n: usize, seed: u64) -> Vec<i32> {
    let mut keys: Vec<i32> = (0..n as i32).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    keys.shuffle(&mut rng);
    keys
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Everything one chained-table trial can report.
#[derive(Debug, Clone, Copy)]
pub struct ChainTrial {
    pub insert_ms: f64,
    pub load_factor: f64,
    pub min_with_empty: usize,
    pub min_without_empty: usize,
    pub max_chain: usize,
}

pub fn chain_trial<H: HashStrategy<i32>>(
    hash: H,
    keys: &[i32],
    cfg: &BenchConfig,
) -> Result<ChainTrial> {
    let mut table = ChainedHashTable::with_config(hash, cfg.table_config())?;
    let start = Instant::now();
    for &k in keys {
        table.add_or_update(k, k);
    }
    let insert_ms = elapsed_ms(start);

    let with_empty = table.chain_length_stats(false);
    let without_empty = table.chain_length_stats(true);
    Ok(ChainTrial {
        insert_ms,
        load_factor: table.load_factor(),
        min_with_empty: with_empty.min,
        min_without_empty: without_empty.min,
        max_chain: with_empty.max,
    })
}

/// Mean key comparisons of a successful lookup of every key in `keys`.
pub fn mean_comparisons<M: Map<Key = i32>>(table: &M, keys: &[i32]) -> f64 {
    if keys.is_empty() {
        return 0.0;
    }
    let total: usize = keys.iter().map(|k| table.search(k).comparisons).sum();
    total as f64 / keys.len() as f64
}

/// Splits `data` into at most `num_partitions` contiguous chunks.
fn partition_data<T>(data: Vec<T>, num_partitions: usize) -> Vec<Vec<T>> {
    match num_partitions {
        0 | 1 => vec![data],
        n => {
            let partition_sz = data.len().div_ceil(n).max(1);
            let mut out = Vec::new();
            let mut buf = Vec::with_capacity(partition_sz);
            for item in data {
                buf.push(item);
                if buf.len() == partition_sz {
                    out.push(std::mem::replace(&mut buf, Vec::with_capacity(partition_sz)));
                }
            }
            if !buf.is_empty() {
                out.push(buf);
            }
            out
        }
    }
}

/// Runs `trial` for trial numbers `1..=cfg.trials` on up to `threads`
/// workers, returning results in trial order.
fn run_trials<R, F>(cfg: &BenchConfig, threads: usize, trial: F) -> Result<Vec<R>>
where
    R: Send,
    F: Fn(usize) -> Result<R> + Sync,
{
    let numbers: Vec<usize> = (1..=cfg.trials).collect();
    if threads <= 1 {
        return numbers.into_iter().map(&trial).collect();
    }

    let trial = &trial;
    let chunks = crossbeam::scope(|scope| {
        let handles: Vec<_> = partition_data(numbers, threads)
            .into_iter()
            .map(|chunk| {
                scope.spawn(move |_| chunk.into_iter().map(trial).collect::<Result<Vec<R>>>())
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().map_err(|_| anyhow!("trial worker panicked"))?)
            .collect::<Result<Vec<Vec<R>>>>()
    })
    .map_err(|_| anyhow!("trial scope panicked"))??;

    Ok(chunks.into_iter().flatten().collect())
}

fn warm_up(cfg: &BenchConfig) -> Result<()> {
    let keys = make_keys(cfg.element_count.min(WARM_UP_KEYS), cfg.seed);
    chain_trial(Division, &keys, cfg)?;
    chain_trial(Multiplication, &keys, cfg)?;
    Ok(())
}

fn trial_series<R>(
    results: &[(R, R)],
    labels: (&str, &str),
    f: impl Fn(&R) -> f64,
) -> Vec<Series> {
    vec![
        Series::new(labels.0, results.iter().map(|(a, _)| f(a)).collect()),
        Series::new(labels.1, results.iter().map(|(_, b)| f(b)).collect()),
    ]
}

const HASH_LABELS: (&str, &str) = ("division", "multiplication");

fn chain_trials(cfg: &BenchConfig, threads: usize) -> Result<Vec<(ChainTrial, ChainTrial)>> {
    warm_up(cfg)?;
    run_trials(cfg, threads, |t| {
        let keys = make_keys(cfg.element_count, cfg.seed + t as u64);
        let d = chain_trial(Division, &keys, cfg)?;
        let m = chain_trial(Multiplication, &keys, cfg)?;
        Ok((d, m))
    })
}

pub fn run(scenario: Scenario, cfg: &BenchConfig) -> Result<Report> {
    info!(
        ?scenario,
        trials = cfg.trials,
        elements = cfg.element_count,
        "running scenario"
    );
    let n = cfg.element_count;
    let report = match scenario {
        Scenario::All => return Err(anyhow!("`all` must be expanded before running")),
        Scenario::Generation => {
            let times = run_trials(cfg, 1, |t| {
                let start = Instant::now();
                let keys = make_keys(n, cfg.seed + t as u64);
                debug!(trial = t, len = keys.len(), "generated keys");
                Ok(elapsed_ms(start))
            })?;
            Report::new(
                format!("Generating {n} keys"),
                "ms",
                vec![Series::new("generation", times)],
            )
        }
        Scenario::Insertion => {
            let trials = chain_trials(cfg, 1)?;
            Report::new(
                format!("Inserting {n} elements"),
                "ms",
                trial_series(&trials, HASH_LABELS, |r| r.insert_ms),
            )
        }
        Scenario::LoadFactor => {
            let trials = chain_trials(cfg, cfg.threads)?;
            Report::new(
                format!("Load factor n/m ({n} elements)"),
                "alpha",
                trial_series(&trials, HASH_LABELS, |r| r.load_factor),
            )
        }
        Scenario::MeanLoadFactor => {
            let trials = chain_trials(cfg, cfg.threads)?;
            let series = trial_series(&trials, HASH_LABELS, |r| r.load_factor)
                .into_iter()
                .map(|s| Series::new(&s.label, vec![s.mean()]))
                .collect();
            Report::new(
                format!("Mean load factor over {} trials", cfg.trials),
                "alpha",
                series,
            )
        }
        Scenario::MaxChain => {
            let trials = chain_trials(cfg, cfg.threads)?;
            Report::new(
                format!("Longest chain ({n} elements)"),
                "nodes",
                trial_series(&trials, HASH_LABELS, |r| r.max_chain as f64),
            )
        }
        Scenario::MinChainWithEmpty => {
            let trials = chain_trials(cfg, cfg.threads)?;
            Report::new(
                "Shortest chain, empty buckets included",
                "nodes",
                trial_series(&trials, HASH_LABELS, |r| r.min_with_empty as f64),
            )
        }
        Scenario::MinChainWithoutEmpty => {
            let trials = chain_trials(cfg, cfg.threads)?;
            Report::new(
                "Shortest chain, empty buckets excluded",
                "nodes",
                trial_series(&trials, HASH_LABELS, |r| r.min_without_empty as f64),
            )
        }
        Scenario::SearchCost => {
            let trials = run_trials(cfg, cfg.threads, |t| {
                let keys = make_keys(n, cfg.seed + t as u64);
                let mut d = ChainedHashTable::with_config(Division, cfg.table_config())?;
                let mut m = ChainedHashTable::with_config(Multiplication, cfg.table_config())?;
                for &k in &keys {
                    d.add_or_update(k, k);
                    m.add_or_update(k, k);
                }
                Ok((mean_comparisons(&d, &keys), mean_comparisons(&m, &keys)))
            })?;
            Report::new(
                format!("Comparisons per successful search ({n} elements)"),
                "comparisons",
                trial_series(&trials, HASH_LABELS, |r| *r),
            )
        }
        Scenario::OpenAddressing => open_addressing(cfg)?,
        Scenario::Baseline => baseline(cfg)?,
    };
    Ok(report)
}

#[derive(Debug, Clone, Copy)]
struct ProbeTrial {
    insert_ms: f64,
    mean_probes: f64,
    mean_comparisons: f64,
}

fn probe_trial<P: ProbingStrategy<i32>>(
    probe: P,
    keys: &[i32],
    cfg: &BenchConfig,
) -> Result<ProbeTrial> {
    let mut table = OpenAddressingTable::with_config(probe, cfg.table_config())?;
    let start = Instant::now();
    for &k in keys {
        table.add_or_update(k, k);
    }
    let insert_ms = elapsed_ms(start);
    Ok(ProbeTrial {
        insert_ms,
        mean_probes: table.probe_length_stats().mean,
        mean_comparisons: mean_comparisons(&table, keys),
    })
}

fn open_addressing(cfg: &BenchConfig) -> Result<Report> {
    let linear = LinearProbing::new(Multiplication);
    let quadratic = QuadraticProbing::new(Multiplication, 1, 3)?;
    let double = DoubleHashing::new(Multiplication, Division);

    let trials = run_trials(cfg, 1, |t| {
        let keys = make_keys(cfg.element_count, cfg.seed + t as u64);
        Ok([
            probe_trial(&linear, &keys, cfg)?,
            probe_trial(&quadratic, &keys, cfg)?,
            probe_trial(&double, &keys, cfg)?,
        ])
    })?;

    let mut series = Vec::new();
    for (i, name) in ["linear", "quadratic", "double"].into_iter().enumerate() {
        let column = |f: fn(&ProbeTrial) -> f64| -> Vec<f64> {
            trials.iter().map(|r| f(&r[i])).collect()
        };
        series.push(Series::new(&format!("{name} insert ms"), column(|r| r.insert_ms)));
        series.push(Series::new(&format!("{name} probes"), column(|r| r.mean_probes)));
        series.push(Series::new(
            &format!("{name} comparisons"),
            column(|r| r.mean_comparisons),
        ));
    }
    Ok(Report::new(
        format!("Open addressing ({} elements)", cfg.element_count),
        "mixed",
        series,
    ))
}

macro_rules! bench {
    ($body: expr) => {{
        let now = Instant::now();
        $body;
        elapsed_ms(now)
    }};
}

fn baseline(cfg: &BenchConfig) -> Result<Report> {
    warm_up(cfg)?;
    let trials = run_trials(cfg, 1, |t| {
        let keys = make_keys(cfg.element_count, cfg.seed + t as u64);
        let chained = bench!({
            let mut map = ChainedHashTable::with_config(Multiplication, cfg.table_config())?;
            for &k in &keys {
                map.add_or_update(k, k);
            }
        });
        let std_map = bench!({
            let mut map = HashMap::with_capacity(cfg.initial_capacity);
            for &k in &keys {
                map.insert(k, k);
            }
        });
        let dash = bench!({
            let map = DashMap::with_capacity(cfg.initial_capacity);
            for &k in &keys {
                map.insert(k, k);
            }
        });
        Ok([chained, std_map, dash])
    })?;

    let series = ["ChainedHashTable", "std HashMap", "DashMap"]
        .into_iter()
        .enumerate()
        .map(|(i, name)| Series::new(name, trials.iter().map(|r| r[i]).collect()))
        .collect();
    Ok(Report::new(
        format!("Inserting {} elements, baseline maps", cfg.element_count),
        "ms",
        series,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> BenchConfig {
        BenchConfig {
            element_count: 1_000,
            trials: 4,
            threads: 2,
            ..BenchConfig::default()
        }
    }

    #[test]
    fn keys_are_a_seeded_permutation() {
        let a = make_keys(1_000, 7);
        let b = make_keys(1_000, 7);
        assert_eq!(a, b);
        assert_ne!(a, make_keys(1_000, 8));
        let mut sorted = a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..1_000).collect::<Vec<_>>());
    }

    #[test]
    fn partitions_cover_the_input() {
        let parts = partition_data((0..10).collect(), 3);
        assert_eq!(parts, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9]]);
        assert_eq!(partition_data(vec![1, 2], 1), vec![vec![1, 2]]);
        assert_eq!(partition_data(Vec::<u8>::new(), 4), Vec::<Vec<u8>>::new());
    }

    #[test]
    fn parallel_trials_keep_order() {
        let cfg = small();
        let out = run_trials(&cfg, 3, |t| Ok(t * 10)).unwrap();
        assert_eq!(out, vec![10, 20, 30, 40]);
    }

    #[test]
    fn chain_trial_respects_load_bound() {
        let cfg = small();
        let keys = make_keys(cfg.element_count, 1);
        let trial = chain_trial(Division, &keys, &cfg).unwrap();
        assert!(trial.load_factor <= cfg.max_load_factor);
        // Division over a permutation of 0..n spreads keys perfectly.
        assert_eq!(trial.max_chain, 1);
        assert!(trial.min_without_empty >= 1);
    }

    #[test]
    fn every_scenario_reports() {
        let cfg = BenchConfig {
            element_count: 200,
            trials: 2,
            ..small()
        };
        for scenario in Scenario::EACH {
            let report = run(scenario, &cfg).unwrap();
            assert!(!report.series.is_empty(), "{scenario:?}");
        }
        assert!(run(Scenario::All, &cfg).is_err());
    }
}
