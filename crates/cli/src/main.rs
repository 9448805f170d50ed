use anyhow::Context;
use deckopt_core::{OpponentMatrix, RngState};
use deckopt_data::{load_opponent_matrix, load_solver_settings};
use deckopt_search::{
    format_deck, run_strategy, write_json, BatchReport, RunOutcome, SolverSettings, Strategy,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

const DEFAULT_MATRIX_PATH: &str = "deck.csv";

#[derive(Debug, Clone)]
struct CliOptions {
    strategy: String,
    games: Option<u32>,
    seed: Option<u64>,
    matrix: PathBuf,
    settings: Option<PathBuf>,
    trace: Option<PathBuf>,
    out: Option<PathBuf>,
    ensemble: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            strategy: "beam".to_string(),
            games: None,
            seed: None,
            matrix: PathBuf::from(DEFAULT_MATRIX_PATH),
            settings: None,
            trace: None,
            out: None,
            ensemble: false,
        }
    }
}

fn print_usage() {
    eprintln!("usage: deckopt-cli [options]");
    eprintln!("  --strategy NAME   beam | mcts | anneal | genetic (default beam)");
    eprintln!("  --games N         runs per strategy (default 1)");
    eprintln!("  --seed N          base seed; omitted means a random seed");
    eprintln!("  --matrix PATH     opponent deck CSV (default {DEFAULT_MATRIX_PATH})");
    eprintln!("  --settings PATH   solver settings JSON");
    eprintln!("  --trace PATH      write the batch report as JSON");
    eprintln!("  --out PATH        write the ensemble report as JSON");
    eprintln!("  --ensemble        aggregate beam, mcts, and anneal batches");
}

fn parse_cli_options(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--strategy" | "-s" => options.strategy = required(&mut iter, arg)?,
            "--games" | "-g" => {
                options.games = Some(
                    required(&mut iter, arg)?
                        .parse()
                        .map_err(|_| format!("{arg}: expected a count"))?,
                )
            }
            "--seed" => {
                options.seed = Some(
                    required(&mut iter, arg)?
                        .parse()
                        .map_err(|_| format!("{arg}: expected an integer seed"))?,
                )
            }
            "--matrix" | "-m" => options.matrix = PathBuf::from(required(&mut iter, arg)?),
            "--settings" => options.settings = Some(PathBuf::from(required(&mut iter, arg)?)),
            "--trace" => options.trace = Some(PathBuf::from(required(&mut iter, arg)?)),
            "--out" => options.out = Some(PathBuf::from(required(&mut iter, arg)?)),
            "--ensemble" => options.ensemble = true,
            "--help" | "-h" => return Err(String::new()),
            other => return Err(format!("unknown option: {other}")),
        }
    }
    Ok(options)
}

fn required(
    iter: &mut std::slice::Iter<'_, String>,
    flag: &str,
) -> Result<String, String> {
    iter.next()
        .cloned()
        .ok_or_else(|| format!("{flag}: missing value"))
}

fn strategy_from_name(name: &str, settings: &SolverSettings) -> Result<Strategy, String> {
    match name {
        "beam" => Ok(Strategy::Beam(settings.beam)),
        "mcts" => Ok(Strategy::Mcts(settings.mcts)),
        "anneal" => Ok(Strategy::Anneal(settings.anneal)),
        "genetic" => Ok(Strategy::Genetic(settings.genetic)),
        other => Err(format!(
            "unknown strategy {other:?}; expected beam, mcts, anneal, or genetic"
        )),
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_cli_options(&args) {
        Ok(options) => options,
        Err(message) => {
            if !message.is_empty() {
                eprintln!("{message}");
            }
            print_usage();
            return ExitCode::FAILURE;
        }
    };
    match run(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(options: CliOptions) -> anyhow::Result<()> {
    let matrix = Arc::new(load_opponent_matrix(&options.matrix)?);
    let settings = match options.settings.as_deref() {
        Some(path) => load_solver_settings(path)?,
        None => SolverSettings::default(),
    };

    let seed = options
        .seed
        .or(settings.seed)
        .unwrap_or_else(|| RngState::from_entropy().seed());
    let games = options.games.or(settings.games).unwrap_or(1);
    println!("seed: {seed}");

    if options.ensemble {
        return run_ensemble(&options, &settings, matrix, seed, games);
    }

    let strategy =
        strategy_from_name(&options.strategy, &settings).map_err(anyhow::Error::msg)?;
    let report = run_batch(&strategy, &matrix, seed, games)?;
    if let Some(best) = report.best.as_ref() {
        println!("best score: {:.1}", best.score);
        println!("best deck: {}", format_deck(&best.deck));
        if let Some(tuned) = best.tuned.as_ref() {
            println!(
                "tuned parameters: start_temp={:.2} end_temp={:.2e} swap_rate={:.3}",
                tuned.start_temp, tuned.end_temp, tuned.swap_rate
            );
        }
    }
    if let Some(path) = options.trace.as_deref() {
        write_json(path, &report).with_context(|| format!("write {}", path.display()))?;
        println!("trace written to {}", path.display());
    }
    Ok(())
}

fn run_batch(
    strategy: &Strategy,
    matrix: &Arc<OpponentMatrix>,
    seed: u64,
    games: u32,
) -> anyhow::Result<BatchReport> {
    let started = Instant::now();
    let mut seeds = RngState::from_seed(seed);
    let mut runs = Vec::with_capacity(games as usize);
    for game in 0..games {
        let game_seed = seeds.next_u64();
        let outcome = run_strategy(strategy, Arc::clone(matrix), game_seed)
            .with_context(|| format!("{} game {}", strategy.label(), game + 1))?;
        println!(
            "game {}: {} score {:.1} in {} ms",
            game + 1,
            outcome.strategy,
            outcome.score,
            outcome.wall_ms
        );
        println!("  deck: {}", format_deck(&outcome.deck));
        runs.push(outcome);
    }
    Ok(BatchReport::from_runs(
        runs,
        started.elapsed().as_millis() as u64,
    ))
}

#[derive(Debug, Clone, Serialize)]
struct EnsembleReport {
    top: Vec<RunOutcome>,
    deck: Vec<i32>,
    score: f64,
}

fn run_ensemble(
    options: &CliOptions,
    settings: &SolverSettings,
    matrix: Arc<OpponentMatrix>,
    seed: u64,
    games: u32,
) -> anyhow::Result<()> {
    let strategies = [
        Strategy::Beam(settings.beam),
        Strategy::Mcts(settings.mcts),
        Strategy::Anneal(settings.anneal),
    ];

    let mut runs = Vec::new();
    for strategy in &strategies {
        println!("== {} ==", strategy.label());
        let report = run_batch(strategy, &matrix, seed, games)?;
        runs.extend(report.runs);
    }

    runs.sort_by(|a, b| b.score.total_cmp(&a.score));
    println!("high scores:");
    for run in runs.iter().take(10) {
        println!("  {:.1} ({}): {}", run.score, run.strategy, format_deck(&run.deck));
    }

    let n = matrix.size();
    let weights = position_weights(&runs, n);
    let deck = synthesize_deck(&weights);
    let score = matrix.score_deck(&deck);
    println!("ensemble deck: {}", format_deck(&deck));
    println!("ensemble score: {score:.1}");

    if let Some(path) = options.out.as_deref() {
        let report = EnsembleReport {
            top: runs.into_iter().take(10).collect(),
            deck,
            score,
        };
        let body = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, body).with_context(|| format!("write {}", path.display()))?;
        println!("ensemble report written to {}", path.display());
    }
    Ok(())
}

// Each finished deck votes for its card placements, weighted by how far its
// score sits above the historical baseline.
fn position_weights(runs: &[RunOutcome], n: usize) -> Vec<Vec<f64>> {
    let mut weights = vec![vec![0.0; n]; n];
    for run in runs {
        let scaled = (run.score - 1300.0) / 10.0;
        let weight = (scaled * scaled).max(0.0);
        for (position, &card) in run.deck.iter().take(n).enumerate() {
            if card >= 1 && card as usize <= n {
                weights[card as usize - 1][position] += weight;
            }
        }
    }
    weights
}

// Greedy assignment: each card takes its heaviest still-free position. Every
// card always finds a slot because there are exactly as many cards as
// positions.
fn synthesize_deck(weights: &[Vec<f64>]) -> Vec<i32> {
    let n = weights.len();
    let mut deck = vec![0i32; n];
    let mut used = vec![false; n];
    for card in 0..n {
        let mut positions: Vec<usize> = (0..n).collect();
        positions.sort_by(|&a, &b| {
            weights[card][b]
                .total_cmp(&weights[card][a])
                .then(a.cmp(&b))
        });
        for position in positions {
            if !used[position] {
                deck[position] = (card + 1) as i32;
                used[position] = true;
                break;
            }
        }
    }
    deck
}
